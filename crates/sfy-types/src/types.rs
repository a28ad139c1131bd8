//! Core types for sfy buoy telemetry.

use core::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{ParseError, ParseResult};

/// Substring identifying the hub's pseudo-device for unmatched events.
pub const LOST_AND_FOUND: &str = "lost+found";

/// Sample frequency assumed for acceleration batches that do not carry one.
pub const DEFAULT_FREQUENCY: f64 = 52.0;

/// Notefile carrying acceleration batches.
pub const AXL_FILE: &str = "axl.qo";

/// Notefile carrying periodic position reports.
pub const TRACK_FILE: &str = "_track.qo";

/// Notefile carrying health and log messages.
pub const HEALTH_FILE: &str = "health.qo";

/// A buoy as listed by the hub.
///
/// The hub lists buoys as `[dev, name]` pairs, where the name is optional
/// until the buoy has reported its serial number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, Option<String>)", into = "(String, Option<String>)")]
pub struct BuoyInfo {
    /// Device id assigned by the hub (e.g. `dev:864475044203262`).
    pub dev: String,
    /// Display name (serial number) of the buoy.
    pub name: Option<String>,
}

impl BuoyInfo {
    /// Create a new buoy description.
    pub fn new(dev: impl Into<String>, name: Option<String>) -> Self {
        Self {
            dev: dev.into(),
            name,
        }
    }

    /// Whether this is the hub's lost+found bucket rather than a real buoy.
    ///
    /// ```
    /// use sfy_types::BuoyInfo;
    ///
    /// assert!(BuoyInfo::new("lost+found", None).is_lost_and_found());
    /// assert!(!BuoyInfo::new("dev:864475044203262", None).is_lost_and_found());
    /// ```
    #[must_use]
    pub fn is_lost_and_found(&self) -> bool {
        self.dev.contains(LOST_AND_FOUND)
    }

    /// Name if known, otherwise the empty string.
    #[must_use]
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl From<(String, Option<String>)> for BuoyInfo {
    fn from((dev, name): (String, Option<String>)) -> Self {
        // the hub reports unnamed buoys with an empty string in some versions
        let name = name.filter(|n| !n.is_empty());
        Self { dev, name }
    }
}

impl From<BuoyInfo> for (String, Option<String>) {
    fn from(b: BuoyInfo) -> Self {
        (b.dev, b.name)
    }
}

impl fmt::Display for BuoyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", self.dev, name),
            None => write!(f, "{}", self.dev),
        }
    }
}

/// Storage counters of the buoy's SD-card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    /// ID of the package currently being written.
    #[serde(default)]
    pub current_id: Option<u32>,
    /// ID of the last package sent to the hub.
    #[serde(default)]
    pub sent_id: Option<u32>,
}

impl StorageInfo {
    /// Storage info with no counters, used for pseudo-devices.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// How a position fix was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum FixType {
    /// Satellite fix.
    Gps,
    /// Cell-tower location.
    Tower,
    /// Triangulated from Wi-Fi and cell towers.
    Triangulated,
    /// Any other location source reported by the hub.
    #[serde(other)]
    Unknown,
}

impl FixType {
    /// Name as used by the hub and in CSV output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FixType::Gps => "gps",
            FixType::Tower => "tower",
            FixType::Triangulated => "triangulated",
            FixType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position fix attached to a packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    /// Longitude in degrees east.
    pub lon: f64,
    /// Latitude in degrees north.
    pub lat: f64,
    /// Source of the fix.
    pub fix_type: FixType,
    /// Time of the fix, when known.
    pub time: Option<OffsetDateTime>,
}

impl PositionFix {
    /// Whether the fix came from a satellite receiver.
    #[must_use]
    pub fn is_gps(&self) -> bool {
        self.fix_type == FixType::Gps
    }
}

/// A batch of acceleration samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AxlBatch {
    /// Time of the first sample.
    pub start: OffsetDateTime,
    /// Sample frequency in Hz.
    pub frequency: f64,
    /// Offset of this chunk in the transmitted package.
    pub offset: Option<u32>,
    /// ID of the package on the buoy's SD-card.
    pub storage_id: Option<u32>,
    /// Horizontal x-axis acceleration (m/s^2).
    pub x: Vec<f32>,
    /// Horizontal y-axis acceleration (m/s^2).
    pub y: Vec<f32>,
    /// Vertical acceleration including gravity (m/s^2).
    pub z: Vec<f32>,
}

impl AxlBatch {
    /// Create a batch, checking that the axes line up.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::AxisLengthMismatch`] if the axes differ in length and
    /// [`ParseError::InvalidFrequency`] if `frequency` is not a positive number.
    pub fn new(
        start: OffsetDateTime,
        frequency: f64,
        x: Vec<f32>,
        y: Vec<f32>,
        z: Vec<f32>,
    ) -> ParseResult<Self> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(ParseError::AxisLengthMismatch {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(ParseError::InvalidFrequency(frequency));
        }

        Ok(Self {
            start,
            frequency,
            offset: None,
            storage_id: None,
            x,
            y,
            z,
        })
    }

    /// Set the SD-card storage id.
    #[must_use]
    pub fn with_storage_id(mut self, storage_id: Option<u32>) -> Self {
        self.storage_id = storage_id;
        self
    }

    /// Number of samples per axis.
    #[must_use]
    pub fn len(&self) -> usize {
        self.z.len()
    }

    /// Whether the batch holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    /// Sample interval in seconds.
    #[must_use]
    pub fn dt(&self) -> f64 {
        1.0 / self.frequency
    }

    /// Time of sample `i` in milliseconds since the epoch.
    #[must_use]
    pub fn sample_time_ms(&self, i: usize) -> f64 {
        unix_ms(self.start) + i as f64 * self.dt() * 1000.0
    }
}

/// Motion and environment values of a `_track.qo` report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    /// Bearing in degrees.
    #[serde(default)]
    pub bearing: Option<f64>,
    /// Velocity in m/s.
    #[serde(default)]
    pub velocity: Option<f64>,
    /// Distance since the last report in m.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Temperature in degrees Celsius.
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// A health or log message from the buoy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthMessage {
    /// Message text.
    pub text: String,
}

/// Kind-specific payload of a packet.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketBody {
    /// Acceleration batch (`axl.qo`).
    Axl(AxlBatch),
    /// Position report (`_track.qo`).
    Track(TrackReport),
    /// Health or log message (`health.qo`).
    Health(HealthMessage),
    /// Any other notefile; the body is kept as-is.
    Other(serde_json::Value),
}

/// Discriminant of [`PacketBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    /// Acceleration batch.
    Axl,
    /// Position report.
    Track,
    /// Health or log message.
    Health,
    /// Anything else.
    Other,
}

impl PacketKind {
    /// Packet kind carried by a notefile.
    ///
    /// ```
    /// use sfy_types::PacketKind;
    ///
    /// assert_eq!(PacketKind::from_file("axl.qo"), PacketKind::Axl);
    /// assert_eq!(PacketKind::from_file("_track.qo"), PacketKind::Track);
    /// assert_eq!(PacketKind::from_file("_session.qo"), PacketKind::Other);
    /// ```
    #[must_use]
    pub fn from_file(file: &str) -> Self {
        match file {
            AXL_FILE => PacketKind::Axl,
            TRACK_FILE => PacketKind::Track,
            HEALTH_FILE => PacketKind::Health,
            _ => PacketKind::Other,
        }
    }
}

/// One event received by the hub from a buoy.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    /// File name of the event on the hub (`<received_ms>-<event>.json`).
    pub file_name: String,
    /// Notefile the event was added to (e.g. `axl.qo`).
    pub file: String,
    /// Time the hub received the event.
    pub received: OffsetDateTime,
    /// Time the event was created on the buoy, in epoch seconds.
    pub when: Option<i64>,
    /// Best known position at the time of the event.
    pub position: Option<PositionFix>,
    /// Kind-specific payload.
    pub body: PacketBody,
}

impl Packet {
    /// Build a typed packet from a hub event.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the body does not match its notefile, or if
    /// timestamps or positions are malformed.
    pub fn from_event(file_name: impl Into<String>, event: RawEvent) -> ParseResult<Self> {
        let received = seconds_to_datetime(event.received)?;
        let position = event.position()?;

        let body = match PacketKind::from_file(&event.file) {
            PacketKind::Axl => {
                let axl: AxlBody = serde_json::from_value(event.body)?;
                let start = ms_to_datetime(axl.timestamp)?;
                let mut batch = AxlBatch::new(start, axl.freq, axl.x, axl.y, axl.z)?
                    .with_storage_id(axl.storage_id);
                batch.offset = axl.offset;
                PacketBody::Axl(batch)
            }
            PacketKind::Track => PacketBody::Track(serde_json::from_value(event.body)?),
            PacketKind::Health => {
                let text = event
                    .body
                    .get("text")
                    .and_then(|t| t.as_str())
                    .ok_or_else(|| ParseError::MissingField {
                        file: event.file.clone(),
                        field: "text",
                    })?;
                PacketBody::Health(HealthMessage {
                    text: text.to_string(),
                })
            }
            PacketKind::Other => PacketBody::Other(event.body),
        };

        Ok(Self {
            file_name: file_name.into(),
            file: event.file,
            received,
            when: event.when,
            position,
            body,
        })
    }

    /// Parse a packet from the JSON text of a hub event.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the text is not a valid event.
    pub fn from_json(file_name: impl Into<String>, json: &str) -> ParseResult<Self> {
        let event: RawEvent = serde_json::from_str(json)?;
        Self::from_event(file_name, event)
    }

    /// Kind of payload carried by this packet.
    #[must_use]
    pub fn kind(&self) -> PacketKind {
        match self.body {
            PacketBody::Axl(_) => PacketKind::Axl,
            PacketBody::Track(_) => PacketKind::Track,
            PacketBody::Health(_) => PacketKind::Health,
            PacketBody::Other(_) => PacketKind::Other,
        }
    }

    /// Acceleration batch, if this is an acceleration packet.
    #[must_use]
    pub fn axl(&self) -> Option<&AxlBatch> {
        match &self.body {
            PacketBody::Axl(axl) => Some(axl),
            _ => None,
        }
    }

    /// Track report, if this is a position report.
    #[must_use]
    pub fn track(&self) -> Option<&TrackReport> {
        match &self.body {
            PacketBody::Track(track) => Some(track),
            _ => None,
        }
    }

    /// Health message, if this is a log packet.
    #[must_use]
    pub fn health(&self) -> Option<&HealthMessage> {
        match &self.body {
            PacketBody::Health(msg) => Some(msg),
            _ => None,
        }
    }

    /// SD-card storage id, for packets that carry one.
    #[must_use]
    pub fn storage_id(&self) -> Option<u32> {
        self.axl().and_then(|a| a.storage_id)
    }

    /// Time of the position fix, falling back to the creation and receipt time.
    #[must_use]
    pub fn best_position_time(&self) -> OffsetDateTime {
        self.position
            .and_then(|p| p.time)
            .or_else(|| {
                self.when
                    .and_then(|w| OffsetDateTime::from_unix_timestamp(w).ok())
            })
            .unwrap_or(self.received)
    }
}

/// A hub event as transmitted over the wire.
///
/// Field names follow the Notehub event format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event id.
    #[serde(default)]
    pub event: String,
    /// Notefile name.
    pub file: String,
    /// Receipt time in epoch seconds.
    pub received: f64,
    /// Creation time on the device in epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<i64>,
    /// Best known longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_lon: Option<f64>,
    /// Best known latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_lat: Option<f64>,
    /// Source of the best known location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_location_type: Option<FixType>,
    /// Time of the best known location in epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_location_when: Option<i64>,
    /// Notefile-specific body.
    #[serde(default)]
    pub body: serde_json::Value,
}

impl RawEvent {
    fn position(&self) -> ParseResult<Option<PositionFix>> {
        match (self.best_lon, self.best_lat) {
            (Some(lon), Some(lat)) => {
                let time = self
                    .best_location_when
                    .map(|w| {
                        OffsetDateTime::from_unix_timestamp(w)
                            .map_err(|e| ParseError::InvalidTimestamp(e.to_string()))
                    })
                    .transpose()?;
                Ok(Some(PositionFix {
                    lon,
                    lat,
                    fix_type: self.best_location_type.unwrap_or(FixType::Unknown),
                    time,
                }))
            }
            (None, None) => Ok(None),
            _ => Err(ParseError::IncompletePosition),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AxlBody {
    timestamp: i64,
    #[serde(default)]
    offset: Option<u32>,
    #[serde(default)]
    storage_id: Option<u32>,
    #[serde(default = "default_frequency")]
    freq: f64,
    x: Vec<f32>,
    y: Vec<f32>,
    z: Vec<f32>,
}

fn default_frequency() -> f64 {
    DEFAULT_FREQUENCY
}

/// Convert epoch seconds (with fraction) to a UTC timestamp.
///
/// # Errors
///
/// Returns [`ParseError::InvalidTimestamp`] if the value is not finite or out of range.
pub fn seconds_to_datetime(seconds: f64) -> ParseResult<OffsetDateTime> {
    if !seconds.is_finite() {
        return Err(ParseError::InvalidTimestamp(seconds.to_string()));
    }
    let nanos = (seconds * 1e9).round() as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|e| ParseError::InvalidTimestamp(e.to_string()))
}

/// Convert epoch milliseconds to a UTC timestamp.
///
/// # Errors
///
/// Returns [`ParseError::InvalidTimestamp`] if the value is out of range.
pub fn ms_to_datetime(ms: i64) -> ParseResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .map_err(|e| ParseError::InvalidTimestamp(e.to_string()))
}

/// Milliseconds since the epoch as a float.
#[must_use]
pub fn unix_ms(t: OffsetDateTime) -> f64 {
    (t.unix_timestamp_nanos() / 1_000_000) as f64
}
