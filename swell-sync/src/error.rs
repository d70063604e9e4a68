//! Sync engine error types

use swell_gateway::GatewayError;
use thiserror::Error;

/// Error raised by engine operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote store failure; displays the store's own message
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, SyncError::Gateway(e) if e.is_unreachable())
    }
}

/// Local snapshot persistence error
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type SyncResult<T> = Result<T, SyncError>;
