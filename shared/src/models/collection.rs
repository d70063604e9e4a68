//! Remote collections

use serde::{Deserialize, Serialize};

/// One of the five collections held by the remote store and the local mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Partners,
    Classes,
    Reservations,
    Expenses,
    Revenues,
}

impl Collection {
    /// Every collection, in resync order
    pub const ALL: [Collection; 5] = [
        Collection::Partners,
        Collection::Classes,
        Collection::Reservations,
        Collection::Expenses,
        Collection::Revenues,
    ];

    /// Remote table name
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Partners => "partners",
            Collection::Classes => "classes",
            Collection::Reservations => "reservations",
            Collection::Expenses => "expenses",
            Collection::Revenues => "revenues",
        }
    }

    /// Resolve a remote table name
    pub fn from_table(table: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.table() == table)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}
