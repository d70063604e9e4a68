//! Domain mutations
//!
//! Create operations append optimistically and resync on rejection,
//! dropping the appended row themselves when that resync fails.
//! Update and remove operations record a [`PendingOp`] and restore it on
//! rejection, except where a fallback strategy applies.

use serde_json::json;
use shared::models::{
    Expense, ExpenseCreate, Reservation, ReservationCreate, ReservationStatus, Revenue,
    RevenueCreate, SurfClass, SurfClassCreate,
};
use shared::{ActionResult, Collection, Language, util};

use super::SyncEngine;
use super::pending::{OpKind, PendingOp};
use crate::error::SyncResult;
use crate::mirror::MirrorRecord;

/// Remote column holding the archive flag of a class
const ARCHIVED_COLUMN: &str = "isArchived";
/// Remote column linking a revenue row to its reservation
const RESERVATION_ID_COLUMN: &str = "reservationId";

impl SyncEngine {
    pub async fn add_class(&self, create: SurfClassCreate) -> ActionResult {
        self.create_record(create.into_class(util::new_id())).await
    }

    pub async fn add_expense(&self, create: ExpenseCreate) -> ActionResult {
        self.create_record(create.into_expense(util::new_id())).await
    }

    pub async fn add_revenue(&self, create: RevenueCreate) -> ActionResult {
        self.create_record(create.into_revenue(util::new_id())).await
    }

    /// Book a guest and record the school's income for it
    ///
    /// The revenue row is a second write issued only after the reservation
    /// is accepted. Its failure leaves the reservation in place; the resync
    /// that follows shows whatever the store holds.
    pub async fn add_reservation(&self, create: ReservationCreate) -> ActionResult {
        let reservation = create.into_reservation(util::new_id());
        let revenue = (!reservation.is_cancelled())
            .then(|| Revenue::for_reservation(util::new_id(), &reservation, util::today()));
        let reservation_id = reservation.id.clone();

        let result = self.create_record(reservation).await;
        if !result.success {
            return result;
        }

        if let Some(revenue) = revenue {
            match serde_json::to_value(&revenue) {
                Ok(record) => {
                    if let Err(e) = self.gateway.insert(Collection::Revenues, record).await {
                        tracing::warn!(
                            reservation_id = %reservation_id,
                            "Reservation revenue insert failed: {}",
                            e
                        );
                    }
                }
                Err(e) => tracing::warn!("Failed to encode reservation revenue: {}", e),
            }
        }

        self.resync_quietly().await;
        result
    }

    /// Append locally, then insert remotely
    async fn create_record<T: MirrorRecord>(&self, record: T) -> ActionResult {
        let payload = match serde_json::to_value(&record) {
            Ok(payload) => payload,
            Err(e) => return ActionResult::failed(e.to_string()),
        };
        let id = record.id().to_string();

        self.mirror.update(|s| T::rows_mut(s).push(record));

        match self.gateway.insert(T::COLLECTION, payload).await {
            Ok(()) => {
                tracing::debug!(collection = %T::COLLECTION, id = %id, "Record created");
                ActionResult::ok()
            }
            Err(e) => {
                tracing::warn!(collection = %T::COLLECTION, id = %id, "Insert rejected: {}", e);
                if !self.resync_quietly().await {
                    // The store never took the row
                    self.mirror.update(|s| T::rows_mut(s).retain(|r| r.id() != id));
                }
                ActionResult::failed(e.to_string())
            }
        }
    }

    /// Archive a class, deleting it outright if the store refuses the archive
    ///
    /// Fails (and restores the mirror) only when both strategies are refused.
    pub async fn remove_class(&self, id: &str) -> SyncResult<()> {
        let pending = PendingOp::<SurfClass>::apply(
            &self.mirror,
            OpKind::ArchiveClass { id: id.to_string() },
            id,
            |rows| {
                for class in rows.iter_mut().filter(|c| c.id == id) {
                    class.archived = true;
                }
            },
        );

        let patch = json!({ ARCHIVED_COLUMN: true });
        let Err(archive_err) = self.gateway.update(Collection::Classes, id, patch).await else {
            return Ok(());
        };
        tracing::warn!(class_id = %id, "Archive refused, deleting instead: {}", archive_err);

        if let Err(e) = self.gateway.delete(Collection::Classes, id).await {
            tracing::warn!(class_id = %id, "Class delete refused: {}", e);
            self.mirror.update(|s| pending.rollback(s));
            return Err(e.into());
        }
        Ok(())
    }

    /// Drop a reservation from the active list
    ///
    /// If the store refuses the delete, the reservation is forced to
    /// CANCELLED instead. The local removal is not rolled back; the closing
    /// resync shows whatever the store kept.
    pub async fn remove_reservation(&self, id: &str) {
        self.mirror.update(|s| s.reservations.retain(|r| r.id != id));

        let Err(delete_err) = self.gateway.delete(Collection::Reservations, id).await else {
            return;
        };
        tracing::warn!(reservation_id = %id, "Delete refused, cancelling instead: {}", delete_err);

        let patch = json!({ "status": ReservationStatus::Cancelled });
        match self.gateway.update(Collection::Reservations, id, patch).await {
            Ok(()) => self.delete_reservation_revenue(id).await,
            Err(e) => tracing::warn!(reservation_id = %id, "Cancellation refused: {}", e),
        }

        self.resync_quietly().await;
    }

    /// Change a reservation's status; cancelling also drops its revenue
    pub async fn update_reservation_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> SyncResult<()> {
        let pending = PendingOp::<Reservation>::apply(
            &self.mirror,
            OpKind::UpdateReservationStatus {
                id: id.to_string(),
                status,
            },
            id,
            |rows| {
                for reservation in rows.iter_mut().filter(|r| r.id == id) {
                    reservation.status = status;
                }
            },
        );

        let patch = json!({ "status": status });
        if let Err(e) = self.gateway.update(Collection::Reservations, id, patch).await {
            tracing::warn!(reservation_id = %id, status = ?status, "Status update refused: {}", e);
            self.mirror.update(|s| pending.rollback(s));
            return Err(e.into());
        }

        if status == ReservationStatus::Cancelled {
            self.delete_reservation_revenue(id).await;
        }
        Ok(())
    }

    pub async fn remove_expense(&self, id: &str) -> SyncResult<()> {
        self.remove_record::<Expense>(OpKind::RemoveExpense { id: id.to_string() }, id)
            .await
    }

    pub async fn remove_revenue(&self, id: &str) -> SyncResult<()> {
        self.remove_record::<Revenue>(OpKind::RemoveRevenue { id: id.to_string() }, id)
            .await
    }

    /// Remove locally, delete remotely, restore on refusal
    async fn remove_record<T: MirrorRecord>(&self, kind: OpKind, id: &str) -> SyncResult<()> {
        let pending =
            PendingOp::<T>::apply(&self.mirror, kind, id, |rows| rows.retain(|r| r.id() != id));

        if let Err(e) = self.gateway.delete(T::COLLECTION, id).await {
            tracing::warn!(collection = %T::COLLECTION, id = %id, "Delete refused: {}", e);
            self.mirror.update(|s| pending.rollback(s));
            return Err(e.into());
        }
        Ok(())
    }

    /// Fire-and-forget revenue cleanup for a cancelled reservation
    async fn delete_reservation_revenue(&self, reservation_id: &str) {
        if let Err(e) = self
            .gateway
            .delete_where(Collection::Revenues, RESERVATION_ID_COLUMN, reservation_id)
            .await
        {
            tracing::warn!(reservation_id = %reservation_id, "Revenue cleanup failed: {}", e);
        }
    }

    pub fn set_language(&self, language: Language) {
        self.mirror.update(|s| s.language = language);
    }

    pub fn set_website_api_url(&self, url: &str) {
        let url = url.trim().to_string();
        self.mirror.update(|s| s.website_api_url = url);
    }
}
