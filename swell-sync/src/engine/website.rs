//! Booking import from the school website

use std::collections::HashSet;

use shared::WebsiteSyncReport;

use super::SyncEngine;
use crate::error::{SyncError, SyncResult};

impl SyncEngine {
    /// Import website bookings not yet mirrored
    ///
    /// Drafts are matched on `externalId`; each new one goes through
    /// [`SyncEngine::add_reservation`] so it gets its revenue row.
    pub async fn sync_with_website(&self) -> SyncResult<WebsiteSyncReport> {
        let snapshot = self.mirror.snapshot();
        let url = snapshot.website_api_url.trim();
        if url.is_empty() {
            return Ok(WebsiteSyncReport::default());
        }

        let feed = self
            .bookings
            .as_ref()
            .ok_or_else(|| SyncError::NotConfigured("booking feed".to_string()))?;
        let drafts = feed.fetch_bookings(url).await?;

        let mut known: HashSet<String> = snapshot
            .reservations
            .iter()
            .filter_map(|r| r.external_id.clone())
            .collect();
        let mut report = WebsiteSyncReport::default();

        for draft in drafts {
            if let Some(external_id) = &draft.external_id
                && !known.insert(external_id.clone())
            {
                report.skipped += 1;
                continue;
            }

            if self.add_reservation(draft).await.success {
                report.added += 1;
            } else {
                report.skipped += 1;
            }
        }

        tracing::info!(added = report.added, skipped = report.skipped, "Website import finished");
        Ok(report)
    }
}
