//! Mutation engine integration tests against the in-memory store

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    class_draft, class_row, engine, engine_with, expense_row, reservation_draft, slow_engine,
};
use shared::Collection;
use shared::models::{
    ExpenseCreate, InternalSource, RESERVATION_REVENUE_CATEGORY, ReservationStatus, RevenueCreate,
};
use shared::util;
use swell_gateway::{MemoryStore, StoreOp};
use swell_sync::{LocalMirror, MemorySnapshotStore, MirrorState};

fn expense_draft() -> ExpenseCreate {
    ExpenseCreate {
        value: 12.0,
        date: "2026-07-02".to_string(),
        category: "Wax".to_string(),
        description: "Board wax".to_string(),
    }
}

#[tokio::test]
async fn test_reservation_revenue_from_partnership_is_net() {
    let (store, engine) = engine();

    let result = engine
        .add_reservation(reservation_draft("Ana", Some(InternalSource::Selina), 50.0))
        .await;
    assert!(result.success, "{:?}", result.error);

    let state = engine.snapshot();
    assert_eq!(state.reservations.len(), 1);
    assert_eq!(state.revenues.len(), 1);

    let reservation = &state.reservations[0];
    let revenue = &state.revenues[0];
    assert!((revenue.value - 40.0).abs() < 1e-9);
    assert_eq!(revenue.category, RESERVATION_REVENUE_CATEGORY);
    assert_eq!(revenue.date, util::today());
    assert_eq!(revenue.description.as_deref(), Some("Ana (Net 80%)"));
    assert_eq!(revenue.reservation_id.as_deref(), Some(reservation.id.as_str()));

    assert_eq!(store.rows(Collection::Revenues).len(), 1);
}

#[tokio::test]
async fn test_reservation_revenue_from_direct_booking_is_full_price() {
    let (_store, engine) = engine();

    for source in [None, Some(InternalSource::Instagram), Some(InternalSource::Website)] {
        let result = engine.add_reservation(reservation_draft("Rui", source, 45.0)).await;
        assert!(result.success);
    }

    let state = engine.snapshot();
    assert_eq!(state.revenues.len(), 3);
    for revenue in &state.revenues {
        assert_eq!(revenue.value, 45.0);
        assert_eq!(revenue.description.as_deref(), Some("Rui"));
    }
}

#[tokio::test]
async fn test_reservation_created_cancelled_has_no_revenue() {
    let (store, engine) = engine();

    let mut draft = reservation_draft("Ana", None, 45.0);
    draft.status = ReservationStatus::Cancelled;
    assert!(engine.add_reservation(draft).await.success);

    assert_eq!(store.rows(Collection::Reservations).len(), 1);
    assert!(store.rows(Collection::Revenues).is_empty());
}

#[tokio::test]
async fn test_revenue_insert_failure_keeps_reservation() {
    let (store, engine) = engine();
    store.reject(Collection::Revenues, StoreOp::Insert, "permission denied for table revenues");

    let result = engine.add_reservation(reservation_draft("Ana", None, 45.0)).await;
    assert!(result.success);

    let state = engine.snapshot();
    assert_eq!(state.reservations.len(), 1);
    assert!(state.revenues.is_empty());
    assert_eq!(store.count(StoreOp::Insert, Collection::Revenues), 1);
}

#[tokio::test]
async fn test_rejected_create_resyncs_and_reports_message() {
    let (store, engine) = engine();
    store.seed(Collection::Classes, vec![class_row("c-remote")]);
    store.reject(Collection::Classes, StoreOp::Insert, "column \"tideNote\" does not exist");

    let result = engine.add_class(class_draft()).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("column \"tideNote\" does not exist"));

    // Optimistic append discarded; mirror matches the store
    let state = engine.snapshot();
    assert_eq!(state.classes.len(), 1);
    assert_eq!(state.classes[0].id, "c-remote");
    assert!(state.is_online);
}

#[tokio::test]
async fn test_rejected_create_while_offline_drops_row() {
    let store = Arc::new(MemoryStore::new());
    let snapshots = Arc::new(MemorySnapshotStore::new());
    let engine = engine_with(store.clone(), LocalMirror::load(snapshots.clone()));
    store.set_offline(true);

    let result = engine.add_class(class_draft()).await;
    assert!(!result.success);
    assert!(engine.snapshot().classes.is_empty());
    assert!(!engine.snapshot().is_online);

    // Nothing the store never accepted survives a restart either
    let saved: MirrorState = serde_json::from_str(&snapshots.contents().unwrap()).unwrap();
    assert!(saved.classes.is_empty());
}

#[tokio::test]
async fn test_created_record_is_visible_before_confirmation() {
    let (store, engine) = engine();
    let mut rx = engine.mirror().subscribe();

    let result = engine.add_expense(expense_draft()).await;
    assert!(result.success);

    // Observers were notified of the optimistic append
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().expenses.len(), 1);
    assert_eq!(store.rows(Collection::Expenses).len(), 1);
}

#[tokio::test]
async fn test_cancellation_removes_reservation_revenue() {
    let (store, engine) = engine();
    engine.add_reservation(reservation_draft("Ana", None, 45.0)).await;
    engine.add_reservation(reservation_draft("Rui", None, 60.0)).await;
    let ana = engine
        .snapshot()
        .reservations
        .iter()
        .find(|r| r.guest_name == "Ana")
        .map(|r| r.id.clone())
        .unwrap();

    engine
        .update_reservation_status(&ana, ReservationStatus::Cancelled)
        .await
        .unwrap();

    assert_eq!(
        store.row(Collection::Reservations, &ana).unwrap()["status"],
        "CANCELLED"
    );
    engine.refresh().await.unwrap();
    let state = engine.snapshot();
    assert_eq!(state.revenues_for_reservation(&ana).count(), 0);
    assert_eq!(state.revenues.len(), 1);
}

#[tokio::test]
async fn test_status_update_rejection_rolls_back() {
    let (store, engine) = engine();
    engine.add_reservation(reservation_draft("Ana", None, 45.0)).await;
    let id = engine.snapshot().reservations[0].id.clone();
    store.reject(Collection::Reservations, StoreOp::Update, "permission denied");

    let err = engine
        .update_reservation_status(&id, ReservationStatus::Completed)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "permission denied");

    let state = engine.snapshot();
    assert_eq!(state.reservations[0].status, ReservationStatus::Confirmed);
    // Cascade never issued on the failure path
    assert_eq!(store.count(StoreOp::Delete, Collection::Revenues), 0);
}

#[tokio::test]
async fn test_archive_keeps_class_in_store() {
    let (store, engine) = engine();
    store.seed(Collection::Classes, vec![class_row("c-1")]);
    engine.refresh().await.unwrap();

    engine.remove_class("c-1").await.unwrap();
    assert!(engine.snapshot().classes[0].archived);

    engine.refresh().await.unwrap();
    let state = engine.snapshot();
    assert_eq!(state.classes.len(), 1);
    assert!(state.classes[0].archived);
    assert_eq!(state.active_classes().count(), 0);
    assert_eq!(store.row(Collection::Classes, "c-1").unwrap()["isArchived"], true);
}

#[tokio::test]
async fn test_archived_class_keeps_its_reservations() {
    let (store, engine) = engine();
    store.seed(Collection::Classes, vec![class_row("c-1"), class_row("c-2")]);
    engine.refresh().await.unwrap();
    engine.add_reservation(reservation_draft("Ana", None, 45.0)).await;
    engine.add_reservation(reservation_draft("Rui", None, 45.0)).await;

    engine.remove_class("c-1").await.unwrap();
    engine.refresh().await.unwrap();

    let state = engine.snapshot();
    let ids: Vec<_> = state.active_classes().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c-2"]);
    let guests: Vec<_> = state
        .reservations_for_class("c-1")
        .map(|r| r.guest_name.as_str())
        .collect();
    assert_eq!(guests, ["Ana", "Rui"]);
    assert_eq!(state.reservations_for_class("c-2").count(), 0);
}

#[tokio::test]
async fn test_archive_rejection_falls_back_to_delete() {
    let (store, engine) = engine();
    store.seed(Collection::Classes, vec![class_row("c-1"), class_row("c-2")]);
    engine.refresh().await.unwrap();
    store.reject(
        Collection::Classes,
        StoreOp::Update,
        "column \"isArchived\" of relation \"classes\" does not exist",
    );

    engine.remove_class("c-1").await.unwrap();

    engine.refresh().await.unwrap();
    let ids: Vec<_> = engine.snapshot().classes.iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids, ["c-2"]);
}

#[tokio::test]
async fn test_archive_and_delete_rejected_restores_mirror() {
    let (store, engine) = engine();
    store.seed(Collection::Classes, vec![class_row("c-1"), class_row("c-2")]);
    engine.refresh().await.unwrap();
    let before = engine.snapshot().classes.clone();

    store.reject(Collection::Classes, StoreOp::Update, "archive refused");
    store.reject(Collection::Classes, StoreOp::Delete, "delete refused");

    let err = engine.remove_class("c-1").await.unwrap_err();
    assert_eq!(err.to_string(), "delete refused");
    assert_eq!(engine.snapshot().classes, before);
}

#[tokio::test]
async fn test_reservation_delete_rejection_forces_cancellation() {
    let (store, engine) = engine();
    engine.add_reservation(reservation_draft("Ana", None, 45.0)).await;
    let id = engine.snapshot().reservations[0].id.clone();
    store.reject(Collection::Reservations, StoreOp::Delete, "delete refused");

    engine.remove_reservation(&id).await;

    let row = store.row(Collection::Reservations, &id).unwrap();
    assert_eq!(row["status"], "CANCELLED");
    assert!(store.rows(Collection::Revenues).is_empty());

    let state = engine.snapshot();
    assert!(state.reservations.iter().all(|r| r.is_cancelled()));
    assert!(state.revenues.is_empty());
}

#[tokio::test]
async fn test_reservation_delete_and_cancel_rejected_resyncs_row_back() {
    let (store, engine) = engine();
    engine.add_reservation(reservation_draft("Ana", None, 45.0)).await;
    let id = engine.snapshot().reservations[0].id.clone();
    store.reject(Collection::Reservations, StoreOp::Delete, "delete refused");
    store.reject(Collection::Reservations, StoreOp::Update, "update refused");

    engine.remove_reservation(&id).await;

    let state = engine.snapshot();
    assert_eq!(state.reservations.len(), 1);
    assert_eq!(state.reservations[0].id, id);
    assert_eq!(state.reservations[0].status, ReservationStatus::Confirmed);
    assert_eq!(state.revenues_for_reservation(&id).count(), 1);
    assert_eq!(store.count(StoreOp::Delete, Collection::Revenues), 0);
    assert_eq!(store.rows(Collection::Revenues).len(), 1);
}

#[tokio::test]
async fn test_reservation_delete_success() {
    let (store, engine) = engine();
    engine.add_reservation(reservation_draft("Ana", None, 45.0)).await;
    let id = engine.snapshot().reservations[0].id.clone();

    engine.remove_reservation(&id).await;

    assert!(engine.snapshot().reservations.is_empty());
    assert!(store.rows(Collection::Reservations).is_empty());
    assert_eq!(store.count(StoreOp::Update, Collection::Reservations), 0);
}

#[tokio::test]
async fn test_ledger_removal_rejection_restores_row() {
    let (store, engine) = engine();
    store.seed(Collection::Expenses, vec![expense_row("e-1"), expense_row("e-2")]);
    engine.refresh().await.unwrap();
    store.reject(Collection::Expenses, StoreOp::Delete, "permission denied");

    assert!(engine.remove_expense("e-1").await.is_err());
    let ids: Vec<_> = engine.snapshot().expenses.iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids, ["e-1", "e-2"]);

    store.clear_rejections();
    engine.remove_expense("e-1").await.unwrap();
    assert_eq!(engine.snapshot().expenses.len(), 1);
    assert!(store.row(Collection::Expenses, "e-1").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_removal_keeps_concurrent_create() {
    let (store, engine) = slow_engine(Duration::from_millis(50));
    store.seed(Collection::Expenses, vec![expense_row("e-1"), expense_row("e-2")]);
    engine.refresh().await.unwrap();
    store.reject(Collection::Expenses, StoreOp::Delete, "permission denied");

    let (removed, added) = tokio::join!(
        engine.remove_expense("e-1"),
        engine.add_expense(expense_draft())
    );
    assert!(removed.is_err());
    assert!(added.success);

    let mut mirrored: Vec<_> = engine.snapshot().expenses.iter().map(|e| e.id.clone()).collect();
    let mut stored: Vec<_> = store
        .rows(Collection::Expenses)
        .iter()
        .map(|row| row["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(mirrored.len(), 3);
    assert_eq!(&mirrored[..2], ["e-1", "e-2"]);
    mirrored.sort();
    stored.sort();
    assert_eq!(mirrored, stored);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_archive_keeps_concurrent_create() {
    let (store, engine) = slow_engine(Duration::from_millis(50));
    store.seed(Collection::Classes, vec![class_row("c-1")]);
    engine.refresh().await.unwrap();
    store.reject(Collection::Classes, StoreOp::Update, "archive refused");
    store.reject(Collection::Classes, StoreOp::Delete, "delete refused");

    let (removed, added) =
        tokio::join!(engine.remove_class("c-1"), engine.add_class(class_draft()));
    assert!(removed.is_err());
    assert!(added.success);

    let state = engine.snapshot();
    assert_eq!(state.classes.len(), 2);
    assert_eq!(state.classes[0].id, "c-1");
    assert!(!state.classes[0].archived);
    assert_eq!(state.active_classes().count(), 2);
    assert_eq!(store.rows(Collection::Classes).len(), 2);
}

#[tokio::test]
async fn test_manual_revenue_lifecycle() {
    let (store, engine) = engine();

    let result = engine
        .add_revenue(RevenueCreate {
            value: 120.0,
            date: "2026-07-03".to_string(),
            category: "Board rental".to_string(),
            description: None,
            reservation_id: None,
        })
        .await;
    assert!(result.success);
    let id = engine.snapshot().revenues[0].id.clone();

    store.reject(Collection::Revenues, StoreOp::Delete, "permission denied");
    assert!(engine.remove_revenue(&id).await.is_err());
    assert_eq!(engine.snapshot().revenues.len(), 1);

    store.clear_rejections();
    engine.remove_revenue(&id).await.unwrap();
    assert!(engine.snapshot().revenues.is_empty());
    assert!(store.rows(Collection::Revenues).is_empty());
}

#[tokio::test]
async fn test_local_settings_touch_no_store() {
    let (store, engine) = engine();

    engine.set_language(shared::Language::En);
    engine.set_website_api_url("  https://school.example/bookings.json ");

    let state = engine.snapshot();
    assert_eq!(state.language, shared::Language::En);
    assert_eq!(state.website_api_url, "https://school.example/bookings.json");
    assert!(store.operations().is_empty());
}
