//! Hub client and timeseries assembly for sfy wave buoys.
//!
//! This crate talks to the sfy data hub, filters the packets buoys have
//! sent, and assembles acceleration packets into a dataset that can be
//! exported as NetCDF.
//!
//! # Features
//!
//! - **Hub access**: list buoys, fetch packets by time range, storage counters
//! - **Buoy lookup**: by exact device id or unique part of id or name
//! - **Filtering**: half-open time windows, views by packet kind and fix type
//! - **Timeseries**: validated acceleration/position/receipt dataset
//! - **NetCDF**: write and read the dataset with CF-style metadata
//! - **Testing**: an in-memory [`MockHub`] behind the same [`Hub`] trait
//!
//! # Quick Start
//!
//! ```no_run
//! use sfy_core::{AxlTimeseries, Buoy, FetchOptions, HubClient, TimeWindow};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = HubClient::new("https://wavebug.met.no/sfy", Some("secret"))?;
//!     let buoy = Buoy::open(&hub, "WAVEBUG01").await?;
//!
//!     let packets = buoy
//!         .axl_packets_in_range(&TimeWindow::unbounded(), &FetchOptions::default())
//!         .await?;
//!
//!     let ts = AxlTimeseries::from_packets(buoy.info(), &packets, None)?;
//!     sfy_core::netcdf::write_netcdf(&ts, "wavebug01.nc")?;
//!     Ok(())
//! }
//! ```

pub mod buoy;
pub mod client;
pub mod error;
pub mod filter;
pub mod hub;
pub mod mock;
pub mod netcdf;
pub mod timeseries;

pub use buoy::{Buoy, FetchOptions, ProgressCallback};
pub use client::HubClient;
pub use error::{Error, Result};
pub use filter::TimeWindow;
pub use hub::{Hub, RangeEntry};
pub use mock::{MockHub, MockHubBuilder};
pub use timeseries::{AxlTimeseries, DatasetAttrs, TimeseriesParts};

// Re-export from sfy-types
pub use sfy_types::{BuoyInfo, FixType, Packet, PacketBody, PacketKind, PositionFix, StorageInfo};
