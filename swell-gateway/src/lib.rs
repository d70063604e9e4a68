//! Swell Gateway - remote store access for the sync engine
//!
//! Provides the [`RemoteStore`] seam the sync engine talks to, plus:
//! - [`RestStore`]: PostgREST over HTTP with a realtime websocket change feed
//! - [`MemoryStore`]: in-process authoritative store with fault injection
//! - [`WebsiteClient`]: booking import from the school website

pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod memory;
pub mod realtime;
pub mod store;
pub mod website;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, ChannelStatus, FeedMessage, FeedSender};
pub use http::RestStore;
pub use memory::{MemoryStore, StoreOp};
pub use store::RemoteStore;
pub use website::{BookingFeed, WebsiteClient};

// Re-export shared types for convenience
pub use shared::Collection;
