//! Typed access to the mirrored collections

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::Collection;
use shared::models::{Expense, PartnerAccount, Reservation, Revenue, SurfClass};

use super::MirrorState;

/// A record type held in one of the mirror's collections
pub trait MirrorRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Remote collection the record lives in
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn rows_mut(state: &mut MirrorState) -> &mut Vec<Self>;
}

macro_rules! mirror_record {
    ($ty:ty, $collection:ident, $field:ident) => {
        impl MirrorRecord for $ty {
            const COLLECTION: Collection = Collection::$collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn rows_mut(state: &mut MirrorState) -> &mut Vec<Self> {
                &mut state.$field
            }
        }
    };
}

mirror_record!(PartnerAccount, Partners, partners);
mirror_record!(SurfClass, Classes, classes);
mirror_record!(Reservation, Reservations, reservations);
mirror_record!(Expense, Expenses, expenses);
mirror_record!(Revenue, Revenues, revenues);
