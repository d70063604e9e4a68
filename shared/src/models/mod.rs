//! Data models
//!
//! Mirrored from the remote store. Rows travel as JSON objects with
//! camelCase keys and SCREAMING_SNAKE_CASE enum values.
//! All IDs are client-generated strings (see [`crate::util::new_id`]).

pub mod collection;
pub mod expense;
pub mod partner;
pub mod reservation;
pub mod revenue;
pub mod surf_class;

// Re-exports
pub use collection::*;
pub use expense::*;
pub use partner::*;
pub use reservation::*;
pub use revenue::*;
pub use surf_class::*;

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
