//! Trait abstraction over the data hub.
//!
//! This module provides the [`Hub`] trait that abstracts over the real HTTP
//! hub ([`HubClient`](crate::HubClient)) and the in-memory
//! [`MockHub`](crate::MockHub) used in tests.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use sfy_types::{BuoyInfo, Packet, StorageInfo};

use crate::error::{Error, Result};
use crate::filter::TimeWindow;

/// One entry of a range query: `[received_ms, file, event_json]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(i64, String, String)")]
pub struct RangeEntry {
    /// Receipt time in epoch milliseconds.
    pub received_ms: i64,
    /// File name of the event on the hub.
    pub file_name: String,
    /// Event object as JSON text.
    pub event: String,
}

impl From<(i64, String, String)> for RangeEntry {
    fn from((received_ms, file_name, event): (i64, String, String)) -> Self {
        Self {
            received_ms,
            file_name,
            event,
        }
    }
}

impl RangeEntry {
    /// Parse the event into a typed packet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the event is malformed.
    pub fn to_packet(&self) -> Result<Packet> {
        Packet::from_json(&self.file_name, &self.event).map_err(|source| Error::Parse {
            file: self.file_name.clone(),
            source,
        })
    }
}

/// Read access to the buoy data hub.
///
/// Device ids are passed verbatim; implementations take care of any
/// encoding the transport needs.
///
/// # Example
///
/// ```
/// use sfy_core::{Hub, MockHub};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> sfy_core::Result<()> {
/// let hub = MockHub::builder().buoy("dev:864475044203262", Some("WAVEBUG01")).build();
/// let buoy = hub.find_buoy("WAVEBUG").await?;
/// assert_eq!(buoy.dev, "dev:864475044203262");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Hub: Send + Sync {
    /// List all buoys known to the hub.
    async fn list_buoys(&self) -> Result<Vec<BuoyInfo>>;

    /// File names of all packets stored for a buoy.
    async fn packet_files(&self, dev: &str) -> Result<Vec<String>>;

    /// Fetch one event as raw JSON.
    async fn fetch_event(&self, dev: &str, file: &str) -> Result<Value>;

    /// Fetch the most recent event, if the buoy has sent any.
    async fn fetch_last(&self, dev: &str) -> Result<Option<Value>>;

    /// SD-card storage counters of a buoy.
    async fn fetch_storage_info(&self, dev: &str) -> Result<StorageInfo>;

    /// Events received inside `window`, in the order the hub returns them.
    async fn fetch_range(&self, dev: &str, window: &TimeWindow) -> Result<Vec<RangeEntry>>;

    /// Resolve a user query to exactly one buoy.
    ///
    /// An exact device id wins. Otherwise the query must be contained in the
    /// device id or name of exactly one buoy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BuoyNotFound`] when nothing matches and
    /// [`Error::AmbiguousBuoy`] when several buoys match.
    async fn find_buoy(&self, query: &str) -> Result<BuoyInfo> {
        let buoys = self.list_buoys().await?;
        select_buoy(buoys, query)
    }
}

pub(crate) fn select_buoy(buoys: Vec<BuoyInfo>, query: &str) -> Result<BuoyInfo> {
    if let Some(exact) = buoys.iter().find(|b| b.dev == query) {
        return Ok(exact.clone());
    }

    let mut matches: Vec<BuoyInfo> = buoys
        .into_iter()
        .filter(|b| b.dev.contains(query) || b.name.as_deref().is_some_and(|n| n.contains(query)))
        .collect();

    match matches.len() {
        0 => Err(Error::BuoyNotFound(query.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::AmbiguousBuoy {
            query: query.to_string(),
            candidates: matches.into_iter().map(|b| b.dev).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buoys() -> Vec<BuoyInfo> {
        vec![
            BuoyInfo::new("dev:864475044203262", Some("WAVEBUG01".into())),
            BuoyInfo::new("dev:864475044204278", Some("WAVEBUG02".into())),
            BuoyInfo::new("dev:8644", None),
            BuoyInfo::new("lost+found", None),
        ]
    }

    #[test]
    fn test_select_exact_beats_substring() {
        let b = select_buoy(buoys(), "dev:8644").unwrap();
        assert_eq!(b.dev, "dev:8644");
    }

    #[test]
    fn test_select_by_name() {
        let b = select_buoy(buoys(), "BUG02").unwrap();
        assert_eq!(b.dev, "dev:864475044204278");
    }

    #[test]
    fn test_select_ambiguous() {
        let err = select_buoy(buoys(), "WAVEBUG").unwrap_err();
        match err {
            Error::AmbiguousBuoy { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_not_found() {
        let err = select_buoy(buoys(), "nothing").unwrap_err();
        assert!(matches!(err, Error::BuoyNotFound(q) if q == "nothing"));
    }

    #[test]
    fn test_range_entry_from_tuple() {
        let json = r#"[[1000, "1000-a.json", "{\"file\":\"health.qo\",\"received\":1.0,\"body\":{\"text\":\"hi\"}}"]]"#;
        let entries: Vec<RangeEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].received_ms, 1000);

        let packet = entries[0].to_packet().unwrap();
        assert_eq!(packet.file_name, "1000-a.json");
        assert_eq!(packet.health().unwrap().text, "hi");
    }

    #[test]
    fn test_range_entry_bad_event() {
        let entry = RangeEntry::from((1, "1-x.json".to_string(), "{}".to_string()));
        let err = entry.to_packet().unwrap_err();
        assert!(matches!(err, Error::Parse { file, .. } if file == "1-x.json"));
    }
}
