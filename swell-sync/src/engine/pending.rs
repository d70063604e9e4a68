//! Optimistic change records
//!
//! An optimistic removal or patch captures only the rows it touches, with
//! their positions. Rolling back puts those rows back and leaves every other
//! row alone, so changes that resolved in the meantime survive.

use crate::mirror::{LocalMirror, MirrorRecord, MirrorState};
use shared::models::ReservationStatus;

/// What an optimistic change did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpKind {
    ArchiveClass { id: String },
    UpdateReservationStatus { id: String, status: ReservationStatus },
    RemoveExpense { id: String },
    RemoveRevenue { id: String },
}

/// An applied, not yet confirmed, local change
#[derive(Debug, Clone)]
pub struct PendingOp<T: MirrorRecord> {
    pub kind: OpKind,
    /// Touched rows as they were, with their index at capture time
    previous: Vec<(usize, T)>,
}

impl<T: MirrorRecord> PendingOp<T> {
    /// Capture the rows with id `target`, then apply `change` to `T`'s collection
    pub fn apply(
        mirror: &LocalMirror,
        kind: OpKind,
        target: &str,
        change: impl FnOnce(&mut Vec<T>),
    ) -> Self {
        let previous = mirror.update(|state| {
            let rows = T::rows_mut(state);
            let previous: Vec<_> = rows
                .iter()
                .enumerate()
                .filter(|(_, row)| row.id() == target)
                .map(|(index, row)| (index, row.clone()))
                .collect();
            change(rows);
            previous
        });
        tracing::debug!(kind = ?kind, collection = %T::COLLECTION, "Optimistic change applied");
        Self { kind, previous }
    }

    /// Touched rows before the change
    pub fn previous(&self) -> impl Iterator<Item = &T> {
        self.previous.iter().map(|(_, row)| row)
    }

    /// Undo this change only
    ///
    /// A row still present is restored in place. A removed row is reinserted
    /// at its old index, clamped to the current length.
    pub fn rollback(self, state: &mut MirrorState) {
        tracing::debug!(kind = ?self.kind, collection = %T::COLLECTION, "Rolling back optimistic change");
        let rows = T::rows_mut(state);
        for (index, row) in self.previous {
            match rows.iter_mut().find(|r| r.id() == row.id()) {
                Some(current) => *current = row,
                None => rows.insert(index.min(rows.len()), row),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ClassType, Expense, PaymentMethod, Reservation, SurfLevel};

    fn expense(id: &str) -> Expense {
        Expense {
            id: id.to_string(),
            value: 12.5,
            date: "2026-07-01".to_string(),
            category: "Wax".to_string(),
            description: "Board wax".to_string(),
        }
    }

    fn reservation(id: &str) -> Reservation {
        Reservation {
            id: id.to_string(),
            external_id: None,
            class_id: "c-1".to_string(),
            guest_name: "Ana".to_string(),
            weight: 60.0,
            height: 170.0,
            level: SurfLevel::Beginner,
            source_id: "WhatsApp".to_string(),
            internal_source: None,
            booking_type: ClassType::Group,
            payment_method: PaymentMethod::Marcelo,
            status: ReservationStatus::Confirmed,
            price: 40.0,
            needs_pickup: false,
            notes: None,
        }
    }

    fn ids(mirror: &LocalMirror) -> Vec<String> {
        mirror.snapshot().expenses.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_rollback_restores_removed_row_at_its_index() {
        let mirror = LocalMirror::in_memory();
        mirror.update(|s| s.expenses = vec![expense("e-1"), expense("e-2"), expense("e-3")]);

        let pending = PendingOp::<Expense>::apply(
            &mirror,
            OpKind::RemoveExpense { id: "e-2".into() },
            "e-2",
            |rows| rows.retain(|e| e.id != "e-2"),
        );
        assert_eq!(ids(&mirror), ["e-1", "e-3"]);
        assert_eq!(pending.previous().count(), 1);

        mirror.update(|s| pending.rollback(s));
        assert_eq!(ids(&mirror), ["e-1", "e-2", "e-3"]);
    }

    #[test]
    fn test_rollback_keeps_rows_changed_meanwhile() {
        let mirror = LocalMirror::in_memory();
        mirror.update(|s| s.expenses = vec![expense("e-1"), expense("e-2")]);

        let pending = PendingOp::<Expense>::apply(
            &mirror,
            OpKind::RemoveExpense { id: "e-1".into() },
            "e-1",
            |rows| rows.retain(|e| e.id != "e-1"),
        );

        // Other work lands before the rejection arrives
        mirror.update(|s| {
            s.expenses.push(expense("e-3"));
            s.expenses.retain(|e| e.id != "e-2");
        });

        mirror.update(|s| pending.rollback(s));
        assert_eq!(ids(&mirror), ["e-1", "e-3"]);
    }

    #[test]
    fn test_rollback_restores_patched_record_only() {
        let mirror = LocalMirror::in_memory();
        mirror.update(|s| s.reservations = vec![reservation("r-1"), reservation("r-2")]);

        let pending = PendingOp::<Reservation>::apply(
            &mirror,
            OpKind::UpdateReservationStatus {
                id: "r-1".into(),
                status: ReservationStatus::Cancelled,
            },
            "r-1",
            |rows| {
                for r in rows.iter_mut().filter(|r| r.id == "r-1") {
                    r.status = ReservationStatus::Cancelled;
                }
            },
        );
        mirror.update(|s| s.reservations[1].status = ReservationStatus::Cancelled);

        mirror.update(|s| pending.rollback(s));
        let state = mirror.snapshot();
        assert_eq!(state.reservations.len(), 2);
        assert_eq!(state.reservations[0].status, ReservationStatus::Confirmed);
        assert_eq!(state.reservations[1].status, ReservationStatus::Cancelled);
    }
}
