//! Shared types for the Swell surf-school workspace
//!
//! Domain records mirrored from the remote store, their create payloads,
//! and the result types handed back to the UI layer.

pub mod models;
pub mod response;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::Collection;
pub use response::{ActionResult, AdminCheck, WebsiteSyncReport};
pub use types::{Language, RealtimeStatus};
