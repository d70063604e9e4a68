//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use shared::Collection;
use shared::models::{
    ClassType, InternalSource, PaymentMethod, ReservationCreate, ReservationStatus, SurfClassCreate,
    SurfLevel,
};
use swell_gateway::{ChangeFeed, GatewayResult, MemoryStore, RemoteStore};
use swell_sync::{LocalMirror, SyncConfig, SyncEngine};

/// Engine over a fresh in-memory store and mirror
pub fn engine() -> (Arc<MemoryStore>, SyncEngine) {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_with(store.clone(), LocalMirror::in_memory());
    (store, engine)
}

pub fn engine_with(store: Arc<MemoryStore>, mirror: LocalMirror) -> SyncEngine {
    SyncEngine::new(store, mirror, &SyncConfig::default())
}

/// Engine whose remote updates and deletes take `delay` to resolve
pub fn slow_engine(delay: Duration) -> (Arc<MemoryStore>, SyncEngine) {
    let store = Arc::new(MemoryStore::new());
    let slow = Arc::new(SlowStore {
        inner: store.clone(),
        delay,
    });
    let engine = SyncEngine::new(slow, LocalMirror::in_memory(), &SyncConfig::default());
    (store, engine)
}

/// Delays updates and deletes before handing them to the in-memory store
pub struct SlowStore {
    inner: Arc<MemoryStore>,
    delay: Duration,
}

#[async_trait]
impl RemoteStore for SlowStore {
    async fn select_all(&self, collection: Collection) -> GatewayResult<Vec<Value>> {
        self.inner.select_all(collection).await
    }

    async fn select_eq(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
    ) -> GatewayResult<Vec<Value>> {
        self.inner.select_eq(collection, column, value).await
    }

    async fn insert(&self, collection: Collection, record: Value) -> GatewayResult<()> {
        self.inner.insert(collection, record).await
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> GatewayResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> GatewayResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete(collection, id).await
    }

    async fn delete_where(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
    ) -> GatewayResult<()> {
        self.inner.delete_where(collection, column, value).await
    }

    async fn subscribe(&self) -> GatewayResult<ChangeFeed> {
        self.inner.subscribe().await
    }
}

pub fn class_draft() -> SurfClassCreate {
    SurfClassCreate {
        date: "2026-07-01".to_string(),
        time: "09:00".to_string(),
        class_type: ClassType::Group,
        capacity: 8,
        tide_note: None,
    }
}

pub fn reservation_draft(
    guest: &str,
    source: Option<InternalSource>,
    price: f64,
) -> ReservationCreate {
    ReservationCreate {
        external_id: None,
        class_id: "c-1".to_string(),
        guest_name: guest.to_string(),
        weight: 70.0,
        height: 175.0,
        level: SurfLevel::Beginner,
        source_id: "front-desk".to_string(),
        internal_source: source,
        booking_type: ClassType::Group,
        payment_method: PaymentMethod::Marcelo,
        status: ReservationStatus::Confirmed,
        price,
        needs_pickup: false,
        notes: None,
    }
}

pub fn class_row(id: &str) -> Value {
    json!({
        "id": id,
        "date": "2026-07-01",
        "time": "09:00",
        "type": "GROUP",
        "maxSpots": 8,
        "isArchived": false
    })
}

pub fn expense_row(id: &str) -> Value {
    json!({
        "id": id,
        "value": 30.0,
        "date": "2026-07-01",
        "category": "Fuel",
        "description": "Van fuel"
    })
}

pub fn partner_row(id: &str, username: &str, password: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "name": "Selina Desk",
        "role": "PARTNER",
        "password": password,
        "assignedOrigin": "SELINA"
    })
}

/// Let spawned tasks run to their next suspension point
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
}
