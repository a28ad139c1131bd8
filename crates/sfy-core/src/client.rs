//! HTTP client for the sfy data hub.
//!
//! # Example
//!
//! ```no_run
//! use sfy_core::{Hub, HubClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HubClient::new("https://wavebug.met.no/sfy", Some("secret"))?;
//!
//! for buoy in client.list_buoys().await? {
//!     println!("{buoy}");
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use sfy_types::{BuoyInfo, StorageInfo};

use crate::error::{Error, Result};
use crate::filter::TimeWindow;
use crate::hub::{Hub, RangeEntry};

/// Header carrying the read token.
pub const AUTH_HEADER: &str = "SFY_AUTH_TOKEN";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP client for the data hub.
#[derive(Debug, Clone)]
pub struct HubClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HubClient {
    /// Create a new hub client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the hub (e.g., "https://wavebug.met.no/sfy")
    /// * `token` - Read token, sent with every request when set
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the URL is not an http(s) URL.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Request)?;

        Self::with_client(base_url, token, client)
    }

    /// Create a client with a custom reqwest Client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the URL is not an http(s) URL.
    pub fn with_client(base_url: &str, token: Option<&str>, client: Client) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');

        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let base_url = Url::parse(trimmed).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()).map(String::from),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Build an endpoint URL, encoding each segment on its own.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was ruled out in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.header(AUTH_HEADER, token);
        }

        let response = request.send().await.map_err(|e| Error::NotReachable {
            url: url.to_string(),
            source: e,
        })?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        trace!("Response status {}", status);

        if status.is_success() {
            response.json().await.map_err(Error::Request)
        } else {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());

            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl Hub for HubClient {
    async fn list_buoys(&self) -> Result<Vec<BuoyInfo>> {
        self.get(self.url(&["buoys"])).await
    }

    async fn packet_files(&self, dev: &str) -> Result<Vec<String>> {
        self.get(self.url(&["buoys", dev])).await
    }

    async fn fetch_event(&self, dev: &str, file: &str) -> Result<Value> {
        self.get(self.url(&["buoys", dev, file])).await
    }

    async fn fetch_last(&self, dev: &str) -> Result<Option<Value>> {
        match self.get::<Value>(self.url(&["buoys", dev, "last"])).await {
            Ok(Value::Null) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(Error::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_storage_info(&self, dev: &str) -> Result<StorageInfo> {
        self.get(self.url(&["buoys", dev, "storage"])).await
    }

    async fn fetch_range(&self, dev: &str, window: &TimeWindow) -> Result<Vec<RangeEntry>> {
        let start = window.start_ms().to_string();
        let end = window.end_ms().to_string();
        self.get(self.url(&["buoys", dev, "from", &start, "to", &end]))
            .await
    }
}
