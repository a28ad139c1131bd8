//! Mock hub implementation for testing.
//!
//! This module provides an in-memory hub that can be used for unit testing
//! without network access.
//!
//! The [`MockHub`] implements the [`Hub`] trait, allowing it to be used
//! interchangeably with [`HubClient`](crate::HubClient) in generic code.
//!
//! # Features
//!
//! - **Canned data**: buoys, storage counters and events set up with a builder
//! - **Failure injection**: make every request fail with an API error
//! - **Request counting**: check how often the hub was asked

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use sfy_types::{BuoyInfo, StorageInfo};

use crate::error::{Error, Result};
use crate::filter::TimeWindow;
use crate::hub::{Hub, RangeEntry};

/// A mock hub for testing.
///
/// # Example
///
/// ```
/// use sfy_core::{Hub, MockHub, TimeWindow};
/// use serde_json::json;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let hub = MockHub::builder()
///         .buoy("dev:1", Some("WAVEBUG01"))
///         .event("dev:1", "1000-a.json", json!({
///             "file": "health.qo", "received": 1.0, "body": { "text": "boot" }
///         }))
///         .build();
///
///     let range = hub.fetch_range("dev:1", &TimeWindow::unbounded()).await.unwrap();
///     assert_eq!(range.len(), 1);
/// }
/// ```
pub struct MockHub {
    buoys: Vec<BuoyInfo>,
    storage: HashMap<String, StorageInfo>,
    events: HashMap<String, Vec<RangeEntry>>,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
    request_count: AtomicU32,
}

impl std::fmt::Debug for MockHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHub")
            .field("buoys", &self.buoys.len())
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .finish()
    }
}

impl MockHub {
    /// Start building a mock hub.
    pub fn builder() -> MockHubBuilder {
        MockHubBuilder::default()
    }

    /// Make every following request fail (or succeed again).
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Number of requests served so far.
    pub fn request_count(&self) -> u32 {
        self.request_count.load(Ordering::Relaxed)
    }

    async fn check_should_fail(&self) -> Result<()> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        if self.should_fail.load(Ordering::Relaxed) {
            Err(Error::Api {
                status: 500,
                message: self.fail_message.read().await.clone(),
            })
        } else {
            Ok(())
        }
    }

    fn entries(&self, dev: &str) -> Result<&[RangeEntry]> {
        if !self.buoys.iter().any(|b| b.dev == dev) {
            return Err(not_found(dev));
        }
        Ok(self.events.get(dev).map(Vec::as_slice).unwrap_or(&[]))
    }
}

fn not_found(what: &str) -> Error {
    Error::Api {
        status: 404,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl Hub for MockHub {
    async fn list_buoys(&self) -> Result<Vec<BuoyInfo>> {
        self.check_should_fail().await?;
        Ok(self.buoys.clone())
    }

    async fn packet_files(&self, dev: &str) -> Result<Vec<String>> {
        self.check_should_fail().await?;
        Ok(self
            .entries(dev)?
            .iter()
            .map(|e| e.file_name.clone())
            .collect())
    }

    async fn fetch_event(&self, dev: &str, file: &str) -> Result<Value> {
        self.check_should_fail().await?;
        let entry = self
            .entries(dev)?
            .iter()
            .find(|e| e.file_name == file)
            .ok_or_else(|| not_found(file))?;
        Ok(serde_json::from_str(&entry.event)?)
    }

    async fn fetch_last(&self, dev: &str) -> Result<Option<Value>> {
        self.check_should_fail().await?;
        match self.entries(dev)?.iter().max_by_key(|e| e.received_ms) {
            Some(entry) => Ok(Some(serde_json::from_str(&entry.event)?)),
            None => Ok(None),
        }
    }

    async fn fetch_storage_info(&self, dev: &str) -> Result<StorageInfo> {
        self.check_should_fail().await?;
        self.storage.get(dev).copied().ok_or_else(|| Error::Api {
            status: 500,
            message: format!("no storage info for {dev}"),
        })
    }

    async fn fetch_range(&self, dev: &str, window: &TimeWindow) -> Result<Vec<RangeEntry>> {
        self.check_should_fail().await?;
        let (start, end) = (window.start_ms(), window.end_ms());
        Ok(self
            .entries(dev)?
            .iter()
            .filter(|e| e.received_ms >= start && e.received_ms < end)
            .cloned()
            .collect())
    }
}

/// Builder for [`MockHub`].
#[derive(Debug, Default)]
pub struct MockHubBuilder {
    buoys: Vec<BuoyInfo>,
    storage: HashMap<String, StorageInfo>,
    events: HashMap<String, Vec<RangeEntry>>,
}

impl MockHubBuilder {
    /// Add a buoy.
    #[must_use]
    pub fn buoy(mut self, dev: &str, name: Option<&str>) -> Self {
        self.buoys.push(BuoyInfo::new(dev, name.map(String::from)));
        self
    }

    /// Set storage counters for a buoy.
    #[must_use]
    pub fn storage(mut self, dev: &str, info: StorageInfo) -> Self {
        self.storage.insert(dev.to_string(), info);
        self
    }

    /// Add an event. The receipt time is taken from its `received` field.
    ///
    /// Events are served in the order they were added, not sorted.
    #[must_use]
    pub fn event(self, dev: &str, file_name: &str, event: Value) -> Self {
        let received_ms = event
            .get("received")
            .and_then(Value::as_f64)
            .map(|s| (s * 1000.0).round() as i64)
            .unwrap_or(0);
        self.raw_event(dev, file_name, received_ms, &event.to_string())
    }

    /// Add an event as JSON text, which need not be valid.
    #[must_use]
    pub fn raw_event(mut self, dev: &str, file_name: &str, received_ms: i64, event: &str) -> Self {
        self.events
            .entry(dev.to_string())
            .or_default()
            .push(RangeEntry {
                received_ms,
                file_name: file_name.to_string(),
                event: event.to_string(),
            });
        self
    }

    /// Build the mock hub.
    pub fn build(self) -> MockHub {
        MockHub {
            buoys: self.buoys,
            storage: self.storage,
            events: self.events,
            should_fail: AtomicBool::new(false),
            fail_message: RwLock::new("Mock failure".to_string()),
            request_count: AtomicU32::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn hub() -> MockHub {
        MockHub::builder()
            .buoy("dev:1", None)
            .event(
                "dev:1",
                "1000-a.json",
                json!({ "file": "health.qo", "received": 1.0, "body": { "text": "a" } }),
            )
            .event(
                "dev:1",
                "3000-c.json",
                json!({ "file": "health.qo", "received": 3.0, "body": { "text": "c" } }),
            )
            .build()
    }

    #[tokio::test]
    async fn test_range_bounds() {
        let hub = hub();
        let window = TimeWindow::new(Some(datetime!(1970-01-01 0:00:01 UTC)), Some(datetime!(1970-01-01 0:00:03 UTC)));
        let range = hub.fetch_range("dev:1", &window).await.unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range[0].file_name, "1000-a.json");
    }

    #[tokio::test]
    async fn test_unknown_buoy() {
        let hub = hub();
        let err = hub.packet_files("dev:2").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_last_and_files() {
        let hub = hub();
        let last = hub.fetch_last("dev:1").await.unwrap().unwrap();
        assert_eq!(last["body"]["text"], "c");
        assert_eq!(hub.packet_files("dev:1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let hub = hub();
        hub.set_should_fail(true, Some("hub down")).await;

        let err = hub.list_buoys().await.unwrap_err();
        assert!(err.to_string().contains("hub down"));

        hub.set_should_fail(false, None).await;
        assert!(hub.list_buoys().await.is_ok());
        assert_eq!(hub.request_count(), 2);
    }
}
