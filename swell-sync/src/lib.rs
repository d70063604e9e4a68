//! Swell Sync - local-first sync engine for the surf school
//!
//! # Architecture
//!
//! ```text
//! UI ──► SyncEngine ──► RemoteStore (PostgREST / in-memory)
//!            │                │
//!            ▼                ▼ change feed
//!       LocalMirror ◄── SyncController
//!            │
//!            ▼
//!      snapshot file
//! ```
//!
//! The UI renders from [`LocalMirror`] snapshots. Mutations apply
//! optimistically and reconcile with the authoritative store; the
//! [`SyncController`] keeps the mirror converged while it runs.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod logger;
pub mod mirror;

pub use config::{AdminConfig, SyncConfig};
pub use controller::{SyncController, SyncHandle};
pub use engine::{OpKind, PendingOp, SyncEngine, SyncMode};
pub use error::{MirrorError, SyncError, SyncResult};
pub use mirror::{
    FileSnapshotStore, LocalMirror, MemorySnapshotStore, MirrorRecord, MirrorState, SnapshotStore,
};
