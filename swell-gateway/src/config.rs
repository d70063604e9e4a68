//! Gateway configuration

use crate::error::{GatewayError, GatewayResult};

/// Realtime protocol version appended to the websocket URL
const REALTIME_VSN: &str = "1.0.0";

/// Connection settings for the remote store
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Project base URL (e.g., "https://abc.supabase.co")
    pub base_url: String,

    /// Publishable API key, sent as `apikey` and bearer token
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Realtime channel name
    pub channel: String,
}

impl GatewayConfig {
    /// Create a configuration with defaults for everything but the URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: String::new(),
            timeout: 30,
            channel: "instant-sync".to_string(),
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the realtime channel name
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// REST endpoint for a table
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    /// Websocket endpoint of the realtime service
    pub fn realtime_url(&self) -> GatewayResult<String> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| GatewayError::Feed(format!("Invalid base URL {}: {e}", self.base_url)))?;
        let scheme = match url.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => return Err(GatewayError::Feed(format!("Unsupported URL scheme: {other}"))),
        };
        url.set_scheme(scheme)
            .map_err(|()| GatewayError::Feed(format!("Cannot use {scheme} for {}", self.base_url)))?;

        let path = format!("{}/realtime/v1/websocket", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut()
            .clear()
            .append_pair("apikey", &self.api_key)
            .append_pair("vsn", REALTIME_VSN);

        Ok(url.to_string())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new("http://localhost:54321")
    }
}
