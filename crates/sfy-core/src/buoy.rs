//! Per-buoy view over a [`Hub`].
//!
//! A [`Buoy`] pairs a resolved [`BuoyInfo`] with the hub it came from and
//! offers typed, time-filtered access to its packets.

use std::sync::Arc;

use tracing::{debug, info, warn};

use sfy_types::{BuoyInfo, Packet, RawEvent, StorageInfo, seconds_to_datetime};
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::filter::{self, TimeWindow};
use crate::hub::Hub;

/// Progress of a packet download: `(parsed, total)`.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Options for fetching packets.
#[derive(Clone, Default)]
pub struct FetchOptions {
    /// Called after each packet is parsed.
    pub progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOptions")
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl FetchOptions {
    /// Set a progress callback.
    #[must_use]
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    fn report_progress(&self, done: usize, total: usize) {
        if let Some(cb) = &self.progress_callback {
            cb(done, total);
        }
    }
}

/// A buoy on a hub.
#[derive(Debug)]
pub struct Buoy<'h, H: Hub + ?Sized> {
    hub: &'h H,
    info: BuoyInfo,
}

impl<'h, H: Hub + ?Sized> Buoy<'h, H> {
    /// Wrap an already resolved buoy.
    pub fn new(hub: &'h H, info: BuoyInfo) -> Self {
        Self { hub, info }
    }

    /// Resolve `query` on the hub and wrap the result.
    ///
    /// # Errors
    ///
    /// See [`Hub::find_buoy`].
    pub async fn open(hub: &'h H, query: &str) -> Result<Self> {
        let info = hub.find_buoy(query).await?;
        debug!("Resolved '{}' to {}", query, info);
        Ok(Self::new(hub, info))
    }

    /// Device id and name.
    pub fn info(&self) -> &BuoyInfo {
        &self.info
    }

    /// Device id.
    pub fn dev(&self) -> &str {
        &self.info.dev
    }

    /// Whether this is the hub's lost+found pseudo-device.
    pub fn is_lost_and_found(&self) -> bool {
        self.info.is_lost_and_found()
    }

    /// SD-card storage counters.
    ///
    /// The lost+found pseudo-device has no storage; it reports empty counters
    /// without asking the hub.
    pub async fn storage_info(&self) -> Result<StorageInfo> {
        if self.is_lost_and_found() {
            return Ok(StorageInfo::empty());
        }
        self.hub.fetch_storage_info(self.dev()).await
    }

    /// Most recent packet, `None` for a buoy that never sent one and for
    /// the lost+found pseudo-device.
    pub async fn last_packet(&self) -> Result<Option<Packet>> {
        if self.is_lost_and_found() {
            return Ok(None);
        }
        match self.hub.fetch_last(self.dev()).await? {
            Some(event) => self.to_packet("last", event).map(Some),
            None => Ok(None),
        }
    }

    /// Receipt time of the most recent packet.
    ///
    /// Only the `received` field is read, so an event with a body this crate
    /// cannot parse still counts as contact. An event without a usable
    /// receipt time is logged and reported as `None`.
    pub async fn last_contact(&self) -> Result<Option<OffsetDateTime>> {
        if self.is_lost_and_found() {
            return Ok(None);
        }
        let Some(event) = self.hub.fetch_last(self.dev()).await? else {
            return Ok(None);
        };
        let received = event
            .get("received")
            .and_then(serde_json::Value::as_f64)
            .map(seconds_to_datetime);
        match received {
            Some(Ok(t)) => Ok(Some(t)),
            Some(Err(e)) => {
                warn!("Last event of {} has an invalid receipt time: {}", self.dev(), e);
                Ok(None)
            }
            None => {
                warn!("Last event of {} has no receipt time", self.dev());
                Ok(None)
            }
        }
    }

    /// File names of all packets.
    pub async fn packet_files(&self) -> Result<Vec<String>> {
        self.hub.packet_files(self.dev()).await
    }

    /// One packet by file name, as raw JSON.
    pub async fn event(&self, file: &str) -> Result<serde_json::Value> {
        self.hub.fetch_event(self.dev(), file).await
    }

    /// One packet by file name.
    pub async fn packet(&self, file: &str) -> Result<Packet> {
        let event = self.event(file).await?;
        self.to_packet(file, event)
    }

    /// All packets received in `window`, sorted by receipt time.
    ///
    /// Events the hub returns that cannot be parsed are skipped with a
    /// warning.
    pub async fn packets_in_range(
        &self,
        window: &TimeWindow,
        options: &FetchOptions,
    ) -> Result<Vec<Packet>> {
        info!("Fetching packets for {} in {:?}", self.dev(), window);
        let entries = self.hub.fetch_range(self.dev(), window).await?;
        let total = entries.len();
        options.report_progress(0, total);

        let mut packets = Vec::with_capacity(total);
        for (i, entry) in entries.iter().enumerate() {
            match entry.to_packet() {
                Ok(packet) => packets.push(packet),
                Err(e) => warn!(
                    error = &e as &dyn std::error::Error,
                    "Skipping packet {}",
                    entry.file_name
                ),
            }
            options.report_progress(i + 1, total);
        }

        let packets = filter::in_window(packets, window);
        debug!("{} of {} packets in window", packets.len(), total);
        Ok(packets)
    }

    /// Acceleration packets received in `window`.
    pub async fn axl_packets_in_range(
        &self,
        window: &TimeWindow,
        options: &FetchOptions,
    ) -> Result<Vec<Packet>> {
        Ok(filter::axl_only(
            self.packets_in_range(window, options).await?,
        ))
    }

    /// Packets with a position fix received in `window`.
    ///
    /// With `gps_only` set, tower and triangulated fixes are dropped.
    pub async fn position_packets_in_range(
        &self,
        window: &TimeWindow,
        gps_only: bool,
        options: &FetchOptions,
    ) -> Result<Vec<Packet>> {
        let packets = filter::with_position(self.packets_in_range(window, options).await?);
        Ok(if gps_only {
            filter::gps_only(packets)
        } else {
            packets
        })
    }

    /// Health/log packets received in `window`, sorted by device time.
    pub async fn log_packets_in_range(
        &self,
        window: &TimeWindow,
        options: &FetchOptions,
    ) -> Result<Vec<Packet>> {
        let mut packets = filter::health_only(self.packets_in_range(window, options).await?);
        filter::sort_by_when(&mut packets);
        Ok(packets)
    }

    fn to_packet(&self, file: &str, event: serde_json::Value) -> Result<Packet> {
        let raw: RawEvent = serde_json::from_value(event)?;
        Packet::from_event(file, raw).map_err(|source| Error::Parse {
            file: file.to_string(),
            source,
        })
    }
}
