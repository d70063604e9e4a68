//! PostgREST client for the remote store

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use shared::Collection;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::feed::ChangeFeed;
use crate::realtime;
use crate::store::RemoteStore;

/// HTTP client for the store's REST interface
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    config: GatewayConfig,
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

impl RestStore {
    /// Create a new client from configuration
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self { client, config })
    }

    /// Request with authentication headers
    fn request(&self, method: Method, collection: Collection) -> RequestBuilder {
        self.client
            .request(method, self.config.table_url(collection.table()))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// Send and map non-2xx responses to gateway errors
    async fn send(request: RequestBuilder) -> GatewayResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::rejection(status, &text));
        }

        Ok(response)
    }

    fn rejection(status: StatusCode, body: &str) -> GatewayError {
        match serde_json::from_str::<PostgrestError>(body) {
            Ok(err) => GatewayError::Rejected {
                code: err.code,
                message: err.message.unwrap_or_else(|| status.to_string()),
            },
            Err(_) if body.is_empty() => GatewayError::Rejected {
                code: None,
                message: status.to_string(),
            },
            Err(_) => GatewayError::Rejected {
                code: None,
                message: body.to_string(),
            },
        }
    }

    fn eq(value: &str) -> String {
        format!("eq.{value}")
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select_all(&self, collection: Collection) -> GatewayResult<Vec<Value>> {
        let request = self
            .request(Method::GET, collection)
            .query(&[("select", "*")]);
        let rows: Option<Vec<Value>> = Self::send(request).await?.json().await?;
        Ok(rows.unwrap_or_default())
    }

    async fn select_eq(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
    ) -> GatewayResult<Vec<Value>> {
        let request = self
            .request(Method::GET, collection)
            .query(&[("select", "*".to_string()), (column, Self::eq(value))]);
        let rows: Option<Vec<Value>> = Self::send(request).await?.json().await?;
        Ok(rows.unwrap_or_default())
    }

    async fn insert(&self, collection: Collection, record: Value) -> GatewayResult<()> {
        let request = self
            .request(Method::POST, collection)
            .header("Prefer", "return=minimal")
            .json(&record);
        Self::send(request).await?;
        tracing::debug!(table = %collection, "Row inserted");
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> GatewayResult<()> {
        let request = self
            .request(Method::PATCH, collection)
            .query(&[("id", Self::eq(id))])
            .header("Prefer", "return=minimal")
            .json(&patch);
        Self::send(request).await?;
        tracing::debug!(table = %collection, id = %id, "Row updated");
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
        let request = self
            .request(Method::DELETE, collection)
            .query(&[(column, Self::eq(value))]);
        Self::send(request).await?;
        tracing::debug!(table = %collection, column = %column, value = %value, "Rows deleted");
        Ok(())
    }

    async fn subscribe(&self) -> GatewayResult<ChangeFeed> {
        realtime::subscribe(&self.config)
    }
}
