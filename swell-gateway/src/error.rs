//! Gateway error types

use thiserror::Error;

/// Postgres unique-violation code
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres insufficient-privilege code (row-level-security rejections)
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Gateway error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The store rejected the write (validation, permission, schema)
    #[error("{message}")]
    Rejected {
        code: Option<String>,
        message: String,
    },

    /// The store could not be reached
    #[error("Remote store unreachable: {0}")]
    Unreachable(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Change feed could not be opened
    #[error("Change feed error: {0}")]
    Feed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    /// Build a rejection with a Postgres error code
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Error code reported by the store, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(UNIQUE_VIOLATION)
    }

    /// Rejected by a row-level-security policy
    pub fn is_rls_violation(&self) -> bool {
        match self {
            Self::Rejected { code, message } => {
                code.as_deref() == Some(INSUFFICIENT_PRIVILEGE)
                    || message.contains("row-level security")
            }
            _ => false,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::InvalidResponse(e.to_string())
        } else {
            GatewayError::Unreachable(e.to_string())
        }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
