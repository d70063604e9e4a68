//! Booking import from the school website

use async_trait::async_trait;
use reqwest::Client;
use shared::models::ReservationCreate;

use crate::error::{GatewayError, GatewayResult};

/// Source of reservation drafts published by the website
#[async_trait]
pub trait BookingFeed: Send + Sync {
    /// Fetch every booking currently listed at `url`
    async fn fetch_bookings(&self, url: &str) -> GatewayResult<Vec<ReservationCreate>>;
}

/// HTTP implementation: `GET url` returning a JSON array of drafts
#[derive(Debug, Clone)]
pub struct WebsiteClient {
    client: Client,
}

impl WebsiteClient {
    pub fn new(timeout_secs: u64) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BookingFeed for WebsiteClient {
    async fn fetch_bookings(&self, url: &str) -> GatewayResult<Vec<ReservationCreate>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Rejected {
                code: None,
                message: format!("Website returned {status}"),
            });
        }

        let bookings: Vec<ReservationCreate> = response.json().await?;
        tracing::debug!(count = bookings.len(), "Fetched website bookings");
        Ok(bookings)
    }
}
