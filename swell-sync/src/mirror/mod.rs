//! Local mirror of the remote collections
//!
//! The mirror is what the UI renders from. It is replaced wholesale on every
//! change (copy, apply, swap) so readers always see a consistent snapshot,
//! persisted durably after each change, and observable through a watch
//! channel.

mod persist;
mod record;

pub use persist::{DEFAULT_STATE_KEY, FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use record::MirrorRecord;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared::models::{Expense, PartnerAccount, Reservation, Revenue, SurfClass};
use shared::{Language, RealtimeStatus};
use tokio::sync::watch;

/// Everything the UI needs to render offline
///
/// Connectivity fields are transient: they are never persisted and always
/// start from their defaults after a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MirrorState {
    /// Signed-in account, never carrying its secret
    #[serde(alias = "user")]
    pub session: Option<PartnerAccount>,
    pub classes: Vec<SurfClass>,
    pub reservations: Vec<Reservation>,
    pub expenses: Vec<Expense>,
    pub revenues: Vec<Revenue>,
    pub partners: Vec<PartnerAccount>,
    pub language: Language,
    pub website_api_url: String,
    /// RFC 3339 time of the last successful resync
    pub last_sync: Option<String>,

    #[serde(skip)]
    pub is_online: bool,
    #[serde(skip)]
    pub realtime_status: RealtimeStatus,
    #[serde(skip)]
    pub is_syncing: bool,
}

impl MirrorState {
    /// Classes still open for booking
    pub fn active_classes(&self) -> impl Iterator<Item = &SurfClass> {
        self.classes.iter().filter(|c| c.is_active())
    }

    /// Reservations booked on a class
    pub fn reservations_for_class<'a>(
        &'a self,
        class_id: &'a str,
    ) -> impl Iterator<Item = &'a Reservation> {
        self.reservations.iter().filter(move |r| r.class_id == class_id)
    }

    /// Revenue rows generated by a reservation
    pub fn revenues_for_reservation<'a>(
        &'a self,
        reservation_id: &'a str,
    ) -> impl Iterator<Item = &'a Revenue> {
        self.revenues.iter().filter(move |r| r.belongs_to(reservation_id))
    }
}

struct Slot {
    state: Arc<MirrorState>,
    /// Last serialized form handed to the store
    saved: Option<String>,
}

struct MirrorInner {
    slot: Mutex<Slot>,
    store: Box<dyn SnapshotStore>,
    watch_tx: watch::Sender<Arc<MirrorState>>,
}

/// Shared handle to the mirror
#[derive(Clone)]
pub struct LocalMirror {
    inner: Arc<MirrorInner>,
}

impl std::fmt::Debug for LocalMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalMirror")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl LocalMirror {
    /// Restore the mirror from `store`
    ///
    /// Never fails: a missing, unreadable or malformed snapshot yields the
    /// defaults.
    pub fn load(store: impl SnapshotStore + 'static) -> Self {
        let state = match store.load() {
            Ok(Some(raw)) => match serde_json::from_str::<MirrorState>(&raw) {
                Ok(state) => {
                    tracing::debug!(
                        classes = state.classes.len(),
                        reservations = state.reservations.len(),
                        "Mirror restored from snapshot"
                    );
                    state
                }
                Err(e) => {
                    tracing::warn!("Discarding malformed mirror snapshot: {}", e);
                    MirrorState::default()
                }
            },
            Ok(None) => MirrorState::default(),
            Err(e) => {
                tracing::warn!("Failed to read mirror snapshot: {}", e);
                MirrorState::default()
            }
        };

        // Baseline for skipping writes when only transient fields change
        let saved = serde_json::to_string(&state).ok();
        let state = Arc::new(state);
        let (watch_tx, _) = watch::channel(state.clone());
        Self {
            inner: Arc::new(MirrorInner {
                slot: Mutex::new(Slot { state, saved }),
                store: Box::new(store),
                watch_tx,
            }),
        }
    }

    /// Mirror that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::load(MemorySnapshotStore::new())
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<MirrorState> {
        self.inner.slot.lock().state.clone()
    }

    /// Observe every snapshot replacement
    pub fn subscribe(&self) -> watch::Receiver<Arc<MirrorState>> {
        self.inner.watch_tx.subscribe()
    }

    /// Apply `f` to a copy of the state and swap it in
    ///
    /// The new snapshot is persisted (when its durable part changed) and
    /// published before the lock is released, so observers and the snapshot
    /// file see changes in the order they were made.
    pub fn update<R>(&self, f: impl FnOnce(&mut MirrorState) -> R) -> R {
        let mut slot = self.inner.slot.lock();
        let mut next = MirrorState::clone(&slot.state);
        let result = f(&mut next);

        if next == *slot.state {
            return result;
        }

        match serde_json::to_string(&next) {
            Ok(raw) if slot.saved.as_deref() != Some(raw.as_str()) => {
                if let Err(e) = self.inner.store.save(&raw) {
                    tracing::warn!("Failed to persist mirror snapshot: {}", e);
                }
                slot.saved = Some(raw);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to serialize mirror snapshot: {}", e),
        }

        let next = Arc::new(next);
        slot.state = next.clone();
        self.inner.watch_tx.send_replace(next);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::UserRole;

    fn admin() -> PartnerAccount {
        PartnerAccount {
            id: "admin-fixed-id".to_string(),
            username: "admin".to_string(),
            name: "Surf School Admin".to_string(),
            role: UserRole::Admin,
            password: None,
            assigned_origin: None,
        }
    }

    #[test]
    fn test_transient_fields_are_not_persisted() {
        let store = Arc::new(MemorySnapshotStore::new());
        let mirror = LocalMirror::load(store.clone());

        mirror.update(|s| {
            s.language = Language::En;
            s.is_online = true;
            s.is_syncing = true;
            s.realtime_status = RealtimeStatus::Connected;
        });

        let raw = store.contents().unwrap();
        assert!(raw.contains("\"language\":\"en\""));
        assert!(!raw.contains("isOnline"));
        assert!(!raw.contains("isSyncing"));
        assert!(!raw.contains("realtimeStatus"));

        let restored = LocalMirror::load(MemorySnapshotStore::with_contents(raw)).snapshot();
        assert_eq!(restored.language, Language::En);
        assert!(!restored.is_online);
        assert!(!restored.is_syncing);
        assert_eq!(restored.realtime_status, RealtimeStatus::Connecting);
    }

    #[test]
    fn test_transient_only_change_skips_persist() {
        let store = Arc::new(MemorySnapshotStore::new());
        let mirror = LocalMirror::load(store.clone());

        mirror.update(|s| s.is_syncing = true);
        assert!(store.contents().is_none());
        assert!(mirror.snapshot().is_syncing);
    }

    #[test]
    fn test_malformed_snapshot_yields_defaults() {
        let mirror = LocalMirror::load(MemorySnapshotStore::with_contents("{not json"));
        assert_eq!(*mirror.snapshot(), MirrorState::default());

        let mirror = LocalMirror::load(MemorySnapshotStore::with_contents(
            r#"{"classes": "nope"}"#,
        ));
        assert!(mirror.snapshot().classes.is_empty());
    }

    #[test]
    fn test_legacy_user_key_restores_session() {
        let raw = serde_json::json!({
            "user": {"id": "admin-fixed-id", "username": "admin", "name": "Surf School Admin", "role": "ADMIN"},
            "language": "pt"
        })
        .to_string();

        let mirror = LocalMirror::load(MemorySnapshotStore::with_contents(raw));
        assert_eq!(mirror.snapshot().session, Some(admin()));
    }

    #[tokio::test]
    async fn test_subscribers_see_replacements() {
        let mirror = LocalMirror::in_memory();
        let mut rx = mirror.subscribe();

        mirror.update(|s| s.session = Some(admin()));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().session.is_some());

        // No-op updates do not wake observers
        mirror.update(|s| s.session = Some(admin()));
        assert!(!rx.has_changed().unwrap());
    }
}
