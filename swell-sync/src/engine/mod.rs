//! Sync engine
//!
//! Owns the local mirror and the remote store handle. Every operation the UI
//! performs goes through here:
//! - mutations: optimistic local change, then remote write
//! - session: credential checks against the partners table
//! - resync: replace the mirror from the authoritative store
//! - website import

mod indicator;
mod mutations;
pub mod pending;
mod session;
mod website;

pub use pending::{OpKind, PendingOp};

use std::sync::Arc;

use shared::models::{Expense, PartnerAccount, Reservation, Revenue, SurfClass};
use shared::{RealtimeStatus, util};
use swell_gateway::{BookingFeed, RemoteStore, RestStore, WebsiteClient};

use crate::config::{AdminConfig, SyncConfig};
use crate::error::SyncResult;
use crate::mirror::{FileSnapshotStore, LocalMirror, MirrorRecord, MirrorState};
use indicator::SyncIndicator;

/// Whether a resync is shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Raises the syncing indicator
    Visible,
    /// Background catch-up; failures are only logged
    Silent,
}

pub struct SyncEngine {
    gateway: Arc<dyn RemoteStore>,
    mirror: LocalMirror,
    indicator: SyncIndicator,
    admin: AdminConfig,
    bookings: Option<Arc<dyn BookingFeed>>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("mirror", &self.mirror)
            .field("admin", &self.admin.username)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    pub fn new(gateway: Arc<dyn RemoteStore>, mirror: LocalMirror, config: &SyncConfig) -> Self {
        Self {
            gateway,
            indicator: SyncIndicator::new(mirror.clone(), config.sync_indicator_delay()),
            mirror,
            admin: config.admin.clone(),
            bookings: None,
        }
    }

    /// Production wiring: PostgREST store, snapshot file, website client
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let gateway = RestStore::new(config.gateway_config())?;
        let mirror = LocalMirror::load(FileSnapshotStore::new(&config.data_dir, &config.state_key));
        let bookings = WebsiteClient::new(config.request_timeout_secs)?;

        if let Some(url) = &config.website_api_url {
            mirror.update(|s| s.website_api_url = url.clone());
        }

        Ok(Self::new(Arc::new(gateway), mirror, config).with_booking_feed(Arc::new(bookings)))
    }

    pub fn with_booking_feed(mut self, feed: Arc<dyn BookingFeed>) -> Self {
        self.bookings = Some(feed);
        self
    }

    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    pub fn gateway(&self) -> &Arc<dyn RemoteStore> {
        &self.gateway
    }

    /// Current mirror snapshot
    pub fn snapshot(&self) -> Arc<MirrorState> {
        self.mirror.snapshot()
    }

    /// User-initiated resync
    pub async fn refresh(&self) -> SyncResult<()> {
        self.resync(SyncMode::Visible).await
    }

    /// Replace every mirrored collection with the store's contents
    ///
    /// All five collections are fetched before anything is replaced; a
    /// failure on any of them leaves the mirror untouched apart from the
    /// online flag.
    pub async fn resync(&self, mode: SyncMode) -> SyncResult<()> {
        let _indicator = match mode {
            SyncMode::Visible => Some(self.indicator.begin()),
            SyncMode::Silent => None,
        };

        let fetched = tokio::try_join!(
            self.fetch::<PartnerAccount>(),
            self.fetch::<SurfClass>(),
            self.fetch::<Reservation>(),
            self.fetch::<Expense>(),
            self.fetch::<Revenue>(),
        );

        let (partners, classes, reservations, expenses, revenues) = match fetched {
            Ok(rows) => rows,
            Err(e) => {
                self.mirror.update(|s| s.is_online = false);
                return Err(e);
            }
        };

        tracing::debug!(
            mode = ?mode,
            partners = partners.len(),
            classes = classes.len(),
            reservations = reservations.len(),
            expenses = expenses.len(),
            revenues = revenues.len(),
            "Mirror resynchronized"
        );

        self.mirror.update(|s| {
            s.partners = partners.iter().map(PartnerAccount::without_secret).collect();
            s.classes = classes;
            s.reservations = reservations;
            s.expenses = expenses;
            s.revenues = revenues;
            s.last_sync = Some(util::now_rfc3339());
            s.is_online = true;
        });
        Ok(())
    }

    /// Silent resync whose failure is only logged; returns whether it completed
    pub(crate) async fn resync_quietly(&self) -> bool {
        match self.resync(SyncMode::Silent).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Background resync failed: {}", e);
                false
            }
        }
    }

    pub(crate) fn set_realtime_status(&self, status: RealtimeStatus) {
        self.mirror.update(|s| s.realtime_status = status);
    }

    /// Fetch and decode one collection, skipping rows that do not decode
    async fn fetch<T: MirrorRecord>(&self) -> SyncResult<Vec<T>> {
        let rows = self.gateway.select_all(T::COLLECTION).await?;
        let total = rows.len();

        let records: Vec<T> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(collection = %T::COLLECTION, "Skipping malformed row: {}", e);
                    None
                }
            })
            .collect();

        if records.len() != total {
            tracing::warn!(
                collection = %T::COLLECTION,
                skipped = total - records.len(),
                "Collection fetched with malformed rows"
            );
        }
        Ok(records)
    }
}
