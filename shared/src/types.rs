//! Common types for the shared crate

use serde::{Deserialize, Serialize};

/// UI language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Pt,
}

/// Health of the realtime change-feed channel, as rendered by the UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealtimeStatus {
    #[default]
    Connecting,
    Connected,
    Error,
}

impl std::fmt::Display for RealtimeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RealtimeStatus::Connecting => "connecting",
            RealtimeStatus::Connected => "connected",
            RealtimeStatus::Error => "error",
        };
        f.write_str(s)
    }
}
