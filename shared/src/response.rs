//! Result types returned to the UI layer
//!
//! Mutations never panic or raise past their boundary for expected failures;
//! they hand back one of these so the UI can render an inline message.

use serde::{Deserialize, Serialize};

/// Outcome of a create-shaped mutation, login or registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    /// Human-readable error (the store's message when it rejected a write)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    /// Successful outcome
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed outcome with a message
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of the admin bootstrap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheck {
    pub success: bool,
    pub message: String,
    /// The store refused the insert because of a row-level-security policy
    #[serde(default)]
    pub is_rls_error: bool,
}

/// Counts from a website booking import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteSyncReport {
    pub added: u32,
    pub skipped: u32,
}
