//! Platform-agnostic types for sfy wave buoy telemetry.
//!
//! This crate provides the data model shared by the hub client
//! (sfy-core) and the command-line interface (sfy-cli).
//!
//! # Features
//!
//! - Buoy listings and SD-card storage counters
//! - Typed packets: acceleration batches, position reports, health messages
//! - The raw hub event format and checked conversion into packets
//! - Error types for packet construction
//!
//! # Example
//!
//! ```
//! use sfy_types::{Packet, PacketKind};
//!
//! let json = r#"{
//!     "file": "health.qo",
//!     "received": 1639000000.5,
//!     "when": 1638999990,
//!     "body": { "text": "boot" }
//! }"#;
//!
//! let packet = Packet::from_json("1639000000500-health.json", json).unwrap();
//! assert_eq!(packet.kind(), PacketKind::Health);
//! assert_eq!(packet.health().unwrap().text, "boot");
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    AXL_FILE, AxlBatch, BuoyInfo, DEFAULT_FREQUENCY, FixType, HEALTH_FILE, HealthMessage,
    LOST_AND_FOUND, Packet, PacketBody, PacketKind, PositionFix, RawEvent, StorageInfo,
    TRACK_FILE, TrackReport, ms_to_datetime, seconds_to_datetime, unix_ms,
};
