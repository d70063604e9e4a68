//! Session gate
//!
//! Credentials are checked against the partners table itself; the mirror
//! only ever holds the matched account without its secret.

use serde_json::Value;
use shared::models::{PartnerAccount, PartnerCreate, UserRole};
use shared::{ActionResult, AdminCheck, Collection, util};

use super::SyncEngine;
use crate::error::{SyncError, SyncResult};

const USERNAME_COLUMN: &str = "username";

impl SyncEngine {
    /// Sign in; username matching is case-insensitive, the secret is exact
    pub async fn login(&self, username: &str, password: &str) -> ActionResult {
        let account = match self.authenticate(username, password).await {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!(username = %username.trim(), "Login failed: {}", e);
                return ActionResult::failed(e.to_string());
            }
        };

        tracing::info!(username = %account.username, role = ?account.role, "Signed in");
        self.mirror.update(|s| s.session = Some(account.without_secret()));
        self.resync_quietly().await;
        ActionResult::ok()
    }

    async fn authenticate(&self, username: &str, password: &str) -> SyncResult<PartnerAccount> {
        let username = PartnerAccount::normalize_username(username);
        let rows = self
            .gateway
            .select_eq(Collection::Partners, USERNAME_COLUMN, &username)
            .await?;

        let [row] = <[Value; 1]>::try_from(rows).map_err(|_| SyncError::InvalidCredentials)?;
        let account: PartnerAccount = serde_json::from_value(row)?;
        if !account.matches_secret(password) {
            return Err(SyncError::InvalidCredentials);
        }
        Ok(account)
    }

    /// Create a partner account and sign in as it
    ///
    /// Nothing touches the mirror until the store accepts the account.
    pub async fn register(&self, create: PartnerCreate) -> ActionResult {
        let account = create.into_account(util::new_id());
        let record = match serde_json::to_value(&account) {
            Ok(record) => record,
            Err(e) => return ActionResult::failed(e.to_string()),
        };

        if let Err(e) = self.gateway.insert(Collection::Partners, record).await {
            tracing::warn!(username = %account.username, "Registration refused: {}", e);
            return ActionResult::failed(e.to_string());
        }

        tracing::info!(username = %account.username, "Partner registered");
        self.mirror.update(|s| s.session = Some(account.without_secret()));
        ActionResult::ok()
    }

    /// Make sure the bootstrap admin account exists
    pub async fn ensure_admin(&self) -> AdminCheck {
        let admin = &self.admin;

        match self
            .gateway
            .select_eq(Collection::Partners, USERNAME_COLUMN, &admin.username)
            .await
        {
            Ok(rows) if !rows.is_empty() => {
                return AdminCheck {
                    success: true,
                    message: "Admin account already exists".to_string(),
                    is_rls_error: false,
                };
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Admin lookup failed: {}", e);
                return AdminCheck {
                    success: false,
                    message: e.to_string(),
                    is_rls_error: e.is_rls_violation(),
                };
            }
        }

        let account = PartnerAccount {
            id: admin.id.clone(),
            username: admin.username.clone(),
            name: admin.name.clone(),
            role: UserRole::Admin,
            password: Some(admin.password.clone()),
            assigned_origin: None,
        };
        let record = match serde_json::to_value(&account) {
            Ok(record) => record,
            Err(e) => {
                return AdminCheck {
                    success: false,
                    message: e.to_string(),
                    is_rls_error: false,
                };
            }
        };

        if let Err(e) = self.gateway.insert(Collection::Partners, record).await {
            tracing::warn!("Admin bootstrap insert refused: {}", e);
            return AdminCheck {
                success: false,
                message: e.to_string(),
                is_rls_error: e.is_rls_violation(),
            };
        }

        tracing::info!(username = %admin.username, "Admin account created");
        self.resync_quietly().await;
        AdminCheck {
            success: true,
            message: "Admin account created".to_string(),
            is_rls_error: false,
        }
    }

    /// Forget the signed-in account; local only
    pub fn logout(&self) {
        self.mirror.update(|s| s.session = None);
    }

    /// Signed-in account, if any
    pub fn current_session(&self) -> Option<PartnerAccount> {
        self.mirror.snapshot().session.clone()
    }
}
