//! Remote store seam

use async_trait::async_trait;
use serde_json::Value;
use shared::Collection;

use crate::error::GatewayResult;
use crate::feed::ChangeFeed;

/// Authoritative collection storage
///
/// Rows are exchanged as JSON objects; typed decoding happens in the caller
/// so one malformed row never poisons a whole collection.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Every row of a collection
    async fn select_all(&self, collection: Collection) -> GatewayResult<Vec<Value>>;

    /// Rows whose `column` equals `value`
    async fn select_eq(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
    ) -> GatewayResult<Vec<Value>>;

    /// Insert one row
    async fn insert(&self, collection: Collection, record: Value) -> GatewayResult<()>;

    /// Patch the row with the given id
    async fn update(&self, collection: Collection, id: &str, patch: Value) -> GatewayResult<()>;

    /// Delete the row with the given id
    async fn delete(&self, collection: Collection, id: &str) -> GatewayResult<()>;

    /// Delete every row whose `column` equals `value`
    async fn delete_where(&self, collection: Collection, column: &str, value: &str)
    -> GatewayResult<()>;

    /// Open a change feed covering every collection
    async fn subscribe(&self) -> GatewayResult<ChangeFeed>;
}
