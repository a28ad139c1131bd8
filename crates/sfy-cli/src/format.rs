//! Output formatting utilities for tables, JSON, and CSV output.

use std::fmt::Write as _;

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use sfy_types::{BuoyInfo, Packet, StorageInfo};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::cli::StyleMode;
use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Visual styling mode.
    pub style: StyleMode,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            no_color: false,
            style: StyleMode::Rich,
        }
    }
}

impl FormatOptions {
    pub fn new(no_color: bool, style: StyleMode) -> Self {
        // Plain mode automatically disables colors for pipe-friendliness
        let effective_no_color = no_color || style == StyleMode::Plain;
        Self {
            no_color: effective_no_color,
            style,
        }
    }

    /// Check if plain styling is enabled (no decorations).
    pub fn is_plain(&self) -> bool {
        self.style == StyleMode::Plain
    }

    /// Serialize value to pretty JSON.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)? + "\n")
    }

    fn header(&self, title: &str) -> String {
        if self.no_color || self.is_plain() {
            format!("{}\n", title)
        } else {
            format!("{}\n", title.bold())
        }
    }
}

/// Escape a string for CSV output.
/// Wraps the value in quotes if it contains commas, quotes, or newlines.
/// Double quotes are escaped by doubling them.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
#[must_use]
pub fn format_timestamp(t: OffsetDateTime) -> String {
    t.to_offset(time::UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_else(|_| "Unknown".to_string())
}

fn format_rfc3339(t: OffsetDateTime) -> String {
    t.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

fn opt_to_string<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

// ============================================================================
// Buoy list
// ============================================================================

/// One row of the buoy overview.
#[derive(Debug, Clone, PartialEq)]
pub struct BuoyRow {
    pub info: BuoyInfo,
    /// Receipt time of the most recent packet.
    pub last_contact: Option<OffsetDateTime>,
    pub storage: StorageInfo,
}

/// Sort buoys by last contact; buoys never heard from come first.
pub fn sort_by_last_contact(rows: &mut [BuoyRow]) {
    rows.sort_by_key(|r| r.last_contact.unwrap_or(OffsetDateTime::UNIX_EPOCH));
}

#[must_use]
pub fn format_buoy_table(rows: &[BuoyRow], opts: &FormatOptions) -> String {
    use tabled::builder::Builder;

    let mut builder = Builder::default();
    builder.push_record(["Buoys", "Name", "Last contact", "Current ID", "Sent ID"]);

    for row in rows {
        builder.push_record([
            row.info.dev.clone(),
            row.info.name_or_empty().to_string(),
            row.last_contact.map(format_timestamp).unwrap_or_default(),
            opt_to_string(row.storage.current_id),
            opt_to_string(row.storage.sent_id),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);
    let mut output = table.to_string();
    output.push('\n');
    output
}

// ============================================================================
// Acceleration packets
// ============================================================================

#[must_use]
pub fn format_axl_table(buoy: &BuoyInfo, packets: &[Packet], opts: &FormatOptions) -> String {
    use tabled::builder::Builder;

    if packets.is_empty() {
        return format!("No acceleration packets found for {}.\n", buoy);
    }

    let mut output = opts.header(&format!("Packets of {} ({}):", buoy, packets.len()));

    let mut builder = Builder::default();
    builder.push_record(["DataTime", "Lon", "Lat", "TxTime", "StID", "File"]);

    for packet in packets {
        let Some(axl) = packet.axl() else { continue };
        let (lon, lat) = match packet.position {
            Some(p) => (format!("{:.5}", p.lon), format!("{:.5}", p.lat)),
            None => (String::new(), String::new()),
        };
        builder.push_record([
            format_timestamp(axl.start),
            lon,
            lat,
            format_timestamp(packet.received),
            opt_to_string(axl.storage_id),
            packet.file_name.clone(),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

// ============================================================================
// Log messages
// ============================================================================

/// Format health messages. Packets are expected to be sorted by `when`.
#[must_use]
pub fn format_log_table(packets: &[Packet], opts: &FormatOptions) -> String {
    use tabled::builder::Builder;

    let mut builder = Builder::default();
    builder.push_record(["Time", "Message"]);

    for packet in packets {
        let Some(msg) = packet.health() else { continue };
        let when = OffsetDateTime::from_unix_timestamp(packet.when.unwrap_or(0))
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        builder.push_record([format_timestamp(when), msg.text.clone()]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);
    let mut output = table.to_string();
    output.push('\n');
    output
}

// ============================================================================
// Track
// ============================================================================

/// Header of the track CSV.
pub const TRACK_CSV_HEADER: &str =
    "Device,Time,Type,Longitude,Latitude,File,Bearing,Velocity,Distance,Temperature";

/// Format positions as CSV. Packets without a position fix are skipped.
#[must_use]
pub fn format_track_csv(dev: &str, packets: &[Packet]) -> String {
    let mut output = String::from(TRACK_CSV_HEADER);
    output.push('\n');

    let dev = csv_escape(dev);
    for packet in packets {
        let Some(pos) = packet.position else { continue };
        let track = packet.track().copied().unwrap_or_default();
        let _ = writeln!(
            output,
            "{},{},{},{},{},{},{},{},{},{}",
            dev,
            format_rfc3339(packet.best_position_time()),
            pos.fix_type,
            pos.lon,
            pos.lat,
            csv_escape(&packet.file_name),
            opt_to_string(track.bearing),
            opt_to_string(track.velocity),
            opt_to_string(track.distance),
            opt_to_string(track.temperature),
        );
    }
    output
}
