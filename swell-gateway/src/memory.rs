//! In-process remote store
//!
//! Behaves like the hosted store for everything the sync engine relies on:
//! unique ids per collection, unique partner usernames, no-op success when
//! an update/delete matches nothing, and a change notification to every open
//! feed after each write. Rejections and outages can be injected per
//! (collection, operation) to exercise the engine's failure paths.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use shared::Collection;

use crate::error::{GatewayError, GatewayResult};
use crate::feed::{ChangeEvent, ChangeFeed, ChangeKind, ChannelStatus, FeedMessage, FeedSender};
use crate::store::RemoteStore;

const UNIQUE_VIOLATION: &str = "23505";
const NOT_NULL_VIOLATION: &str = "23502";

/// Store operation, as recorded in the operation log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
struct Rejection {
    code: Option<String>,
    message: String,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<Collection, Vec<Value>>,
    rejections: HashMap<(Collection, StoreOp), Rejection>,
    offline: bool,
    feeds: Vec<FeedSender>,
    log: Vec<(StoreOp, Collection)>,
}

impl Inner {
    /// Record the attempt, then apply injected failures
    fn check(&mut self, op: StoreOp, collection: Collection) -> GatewayResult<()> {
        self.log.push((op, collection));

        if self.offline {
            return Err(GatewayError::Unreachable("memory store is offline".to_string()));
        }
        if let Some(r) = self.rejections.get(&(collection, op)) {
            return Err(GatewayError::Rejected {
                code: r.code.clone(),
                message: r.message.clone(),
            });
        }
        Ok(())
    }

    fn table(&mut self, collection: Collection) -> &mut Vec<Value> {
        self.tables.entry(collection).or_default()
    }

    fn broadcast(&mut self, collection: Collection, kind: ChangeKind) {
        let msg = FeedMessage::Change(ChangeEvent { collection, kind });
        self.feeds.retain(|feed| feed.send(msg.clone()));
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn column_eq(row: &Value, column: &str, value: &str) -> bool {
    row.get(column).and_then(Value::as_str) == Some(value)
}

/// Authoritative store held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rows directly, bypassing failure injection and notifications
    pub fn seed(&self, collection: Collection, rows: Vec<Value>) {
        self.inner.lock().table(collection).extend(rows);
    }

    /// Current rows of a collection
    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.inner
            .lock()
            .tables
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Row with the given id
    pub fn row(&self, collection: Collection, id: &str) -> Option<Value> {
        self.inner
            .lock()
            .tables
            .get(&collection)?
            .iter()
            .find(|r| row_id(r) == Some(id))
            .cloned()
    }

    /// Reject every `op` on `collection` until cleared
    pub fn reject(&self, collection: Collection, op: StoreOp, message: impl Into<String>) {
        self.reject_with_code(collection, op, None, message);
    }

    /// Reject with a specific Postgres error code
    pub fn reject_with_code(
        &self,
        collection: Collection,
        op: StoreOp,
        code: Option<&str>,
        message: impl Into<String>,
    ) {
        self.inner.lock().rejections.insert(
            (collection, op),
            Rejection {
                code: code.map(str::to_string),
                message: message.into(),
            },
        );
    }

    pub fn clear_rejections(&self) {
        self.inner.lock().rejections.clear();
    }

    /// Simulate an unreachable store: every call fails, subscriptions included
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    /// Operations attempted so far, in order
    pub fn operations(&self) -> Vec<(StoreOp, Collection)> {
        self.inner.lock().log.clone()
    }

    /// Number of attempts of `op` on `collection`
    pub fn count(&self, op: StoreOp, collection: Collection) -> usize {
        self.inner
            .lock()
            .log
            .iter()
            .filter(|(o, c)| *o == op && *c == collection)
            .count()
    }

    /// Push a status transition to every open feed
    pub fn emit_status(&self, status: ChannelStatus) {
        self.inner.lock().feeds.retain(|feed| feed.status(status));
    }

    /// End every open feed, as a dropped connection would
    pub fn close_feeds(&self) {
        self.inner.lock().feeds.clear();
    }

    /// Feeds still attached
    pub fn open_feeds(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.feeds.retain(|feed| !feed.is_closed());
        inner.feeds.len()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select_all(&self, collection: Collection) -> GatewayResult<Vec<Value>> {
        let mut inner = self.inner.lock();
        inner.check(StoreOp::Select, collection)?;
        Ok(inner.table(collection).clone())
    }

    async fn select_eq(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
    ) -> GatewayResult<Vec<Value>> {
        let mut inner = self.inner.lock();
        inner.check(StoreOp::Select, collection)?;
        Ok(inner
            .table(collection)
            .iter()
            .filter(|r| column_eq(r, column, value))
            .cloned()
            .collect())
    }

    async fn insert(&self, collection: Collection, record: Value) -> GatewayResult<()> {
        let mut inner = self.inner.lock();
        inner.check(StoreOp::Insert, collection)?;

        let table_name = collection.table();
        let id = row_id(&record).ok_or_else(|| {
            GatewayError::rejected(
                NOT_NULL_VIOLATION,
                format!("null value in column \"id\" of relation \"{table_name}\""),
            )
        })?;

        let table = inner.table(collection);
        if table.iter().any(|r| row_id(r) == Some(id)) {
            return Err(GatewayError::rejected(
                UNIQUE_VIOLATION,
                format!("duplicate key value violates unique constraint \"{table_name}_pkey\""),
            ));
        }
        if collection == Collection::Partners
            && let Some(username) = record.get("username").and_then(Value::as_str)
            && table.iter().any(|r| column_eq(r, "username", username))
        {
            return Err(GatewayError::rejected(
                UNIQUE_VIOLATION,
                "duplicate key value violates unique constraint \"partners_username_key\"",
            ));
        }

        table.push(record);
        inner.broadcast(collection, ChangeKind::Insert);
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> GatewayResult<()> {
        let mut inner = self.inner.lock();
        inner.check(StoreOp::Update, collection)?;

        let Value::Object(fields) = patch else {
            return Err(GatewayError::InvalidResponse("patch must be a JSON object".into()));
        };

        let Some(row) = inner.table(collection).iter_mut().find(|r| row_id(r) == Some(id)) else {
            return Ok(());
        };
        if let Value::Object(existing) = row {
            existing.extend(fields);
        }
        inner.broadcast(collection, ChangeKind::Update);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> GatewayResult<()> {
        self.delete_where(collection, "id", id).await
    }

    async fn delete_where(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
    ) -> GatewayResult<()> {
        let mut inner = self.inner.lock();
        inner.check(StoreOp::Delete, collection)?;

        let table = inner.table(collection);
        let before = table.len();
        table.retain(|r| !column_eq(r, column, value));
        if table.len() != before {
            inner.broadcast(collection, ChangeKind::Delete);
        }
        Ok(())
    }

    async fn subscribe(&self) -> GatewayResult<ChangeFeed> {
        let mut inner = self.inner.lock();
        if inner.offline {
            return Err(GatewayError::Feed("memory store is offline".to_string()));
        }

        let (tx, feed) = ChangeFeed::channel();
        tx.status(ChannelStatus::Connecting);
        tx.status(ChannelStatus::Subscribed);
        inner.feeds.push(tx);
        Ok(feed)
    }
}
