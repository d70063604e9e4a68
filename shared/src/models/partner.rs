//! Partner Account Model

use serde::{Deserialize, Serialize};

use super::reservation::InternalSource;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Partner,
}

/// Staff or partner account (remote table `partners`)
///
/// Never hard-deleted. `username` is stored lowercased and is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAccount {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: UserRole,
    /// Credential secret; absent on session copies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Origin tag the partner's bookings are attributed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_origin: Option<InternalSource>,
}

impl PartnerAccount {
    /// Normalize a submitted username for lookup and storage
    pub fn normalize_username(username: &str) -> String {
        username.trim().to_lowercase()
    }

    /// Exact comparison against the stored secret
    pub fn matches_secret(&self, secret: &str) -> bool {
        self.password.as_deref() == Some(secret)
    }

    /// Copy suitable for holding as the current session
    pub fn without_secret(&self) -> Self {
        Self {
            password: None,
            ..self.clone()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerCreate {
    pub name: String,
    pub username: String,
    pub password: String,
    pub assigned_origin: Option<InternalSource>,
}

impl PartnerCreate {
    /// Build a PARTNER-role account with the given id
    pub fn into_account(self, id: String) -> PartnerAccount {
        PartnerAccount {
            id,
            username: PartnerAccount::normalize_username(&self.username),
            name: self.name,
            role: UserRole::Partner,
            password: Some(self.password),
            assigned_origin: self.assigned_origin,
        }
    }
}
