//! Acceleration timeseries assembled from a buoy's packets.
//!
//! An [`AxlTimeseries`] is a validated, immutable dataset with three axes:
//!
//! | Axis | Variables |
//! |------|-----------|
//! | `time` | `w_z`, `w_x`, `w_y`, one entry per sample |
//! | `position_time` | `lon`, `lat`, one entry per packet, null without a fix |
//! | `received` | `package_start`, `added`, `storage_id`, one entry per packet |
//!
//! Times are stored as milliseconds since the Unix epoch. The variable
//! layout and metadata are listed in [`VARIABLES`].
//!
//! # Example
//!
//! ```
//! use sfy_core::timeseries::{AxlTimeseries, TimeseriesParts};
//! use time::macros::datetime;
//!
//! let parts = TimeseriesParts {
//!     x: vec![vec![1.0, 2.0]],
//!     y: vec![vec![3.0, 4.0]],
//!     z: vec![vec![5.0, 6.0]],
//!     lon: vec![None],
//!     lat: vec![None],
//!     position_time: vec![None],
//!     package_start: vec![Some(datetime!(1970-01-01 0:01:40 UTC))],
//!     received: vec![datetime!(1970-01-01 0:01:41 UTC)],
//!     storage_id: vec![Some(7)],
//! };
//!
//! let ts = AxlTimeseries::new("dev:1", "WAVEBUG01", 2.0, 0.5, parts, None).unwrap();
//! assert_eq!(ts.time(), &[100_000.0, 100_500.0]);
//! ```

use std::collections::BTreeMap;

use time::OffsetDateTime;
use tracing::debug;

use sfy_types::{BuoyInfo, DEFAULT_FREQUENCY, Packet, unix_ms};

use crate::error::{Error, Result};

/// Project homepage recorded in every dataset.
pub const HOMEPAGE: &str = "https://github.com/gauteh/sfy";

/// Buoy type recorded in every dataset.
pub const BUOY_TYPE: &str = "sfy";

/// Units of every time variable.
pub const TIME_UNITS: &str = "milliseconds since 1970-01-01 00:00:00";

/// Global attributes set by the dataset itself.
pub const RESERVED_ATTRIBUTES: &[&str] = &[
    "frequency",
    "frequency:unit",
    "dt",
    "dt:unit",
    "homepage",
    "buoy_type",
    "buoy_device",
    "buoy_name",
];

/// Storage type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// 32-bit float.
    F32,
    /// 64-bit float, NaN for missing.
    F64,
    /// 32-bit integer, -1 for missing.
    I32,
}

/// Name, axis and metadata of a dataset variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableMeta {
    /// Variable name.
    pub name: &'static str,
    /// Axis the variable is indexed by.
    pub dimension: &'static str,
    /// Storage type.
    pub var_type: VarType,
    /// Whether entries may be missing.
    pub nullable: bool,
    /// String attributes.
    pub attrs: &'static [(&'static str, &'static str)],
}

/// Every variable of the dataset, coordinates first.
pub const VARIABLES: &[VariableMeta] = &[
    VariableMeta {
        name: "time",
        dimension: "time",
        var_type: VarType::F64,
        nullable: false,
        attrs: &[("units", TIME_UNITS), ("calendar", "standard")],
    },
    VariableMeta {
        name: "position_time",
        dimension: "position_time",
        var_type: VarType::F64,
        nullable: true,
        attrs: &[
            ("description", "Time of position fix for each package"),
            ("units", TIME_UNITS),
            ("calendar", "standard"),
        ],
    },
    VariableMeta {
        name: "received",
        dimension: "received",
        var_type: VarType::F64,
        nullable: false,
        attrs: &[
            ("description", "Time package was received by data-hub"),
            ("units", TIME_UNITS),
            ("calendar", "standard"),
        ],
    },
    VariableMeta {
        name: "w_z",
        dimension: "time",
        var_type: VarType::F32,
        nullable: false,
        attrs: &[
            ("unit", "m/s^2"),
            ("long_name", "sea_water_wave_z_acceleration"),
            ("description", "Vertical acceleration (including gravity)"),
        ],
    },
    VariableMeta {
        name: "w_x",
        dimension: "time",
        var_type: VarType::F32,
        nullable: false,
        attrs: &[
            ("unit", "m/s^2"),
            ("long_name", "sea_water_wave_x_acceleration"),
            ("description", "Horizontal x-axis acceleration"),
        ],
    },
    VariableMeta {
        name: "w_y",
        dimension: "time",
        var_type: VarType::F32,
        nullable: false,
        attrs: &[
            ("unit", "m/s^2"),
            ("long_name", "sea_water_wave_y_acceleration"),
            ("description", "Horizontal y-axis acceleration"),
        ],
    },
    VariableMeta {
        name: "lon",
        dimension: "position_time",
        var_type: VarType::F64,
        nullable: true,
        attrs: &[
            ("units", "degrees_east"),
            ("standard_name", "longitude"),
            ("long_name", "longitude"),
        ],
    },
    VariableMeta {
        name: "lat",
        dimension: "position_time",
        var_type: VarType::F64,
        nullable: true,
        attrs: &[
            ("units", "degrees_north"),
            ("standard_name", "latitude"),
            ("long_name", "latitude"),
        ],
    },
    VariableMeta {
        name: "package_start",
        dimension: "received",
        var_type: VarType::F64,
        nullable: true,
        attrs: &[
            (
                "description",
                "Timestamp at start of each batch (package) of samples.",
            ),
            ("units", TIME_UNITS),
            ("calendar", "standard"),
        ],
    },
    VariableMeta {
        name: "added",
        dimension: "received",
        var_type: VarType::F64,
        nullable: false,
        attrs: &[
            ("description", "Time package was added to notecard."),
            ("units", TIME_UNITS),
            ("calendar", "standard"),
        ],
    },
    VariableMeta {
        name: "storage_id",
        dimension: "received",
        var_type: VarType::I32,
        nullable: true,
        attrs: &[("description", "ID of packge on SD-card")],
    },
];

/// Look up a variable by name.
#[must_use]
pub fn variable(name: &str) -> Option<&'static VariableMeta> {
    VARIABLES.iter().find(|v| v.name == name)
}

/// A global attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Numeric attribute.
    Number(f64),
    /// Text attribute.
    Text(String),
}

/// Global attributes of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetAttrs {
    /// Sample frequency in Hz.
    pub frequency: f64,
    /// Sample interval in s.
    pub dt: f64,
    /// Device id of the buoy.
    pub buoy_device: String,
    /// Display name of the buoy.
    pub buoy_name: String,
    /// Caller-supplied attributes.
    pub extra: BTreeMap<String, String>,
}

impl DatasetAttrs {
    /// All global attributes in file order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, AttrValue)> {
        let text = |s: &str| AttrValue::Text(s.to_string());
        let mut pairs = vec![
            ("frequency".to_string(), AttrValue::Number(self.frequency)),
            ("frequency:unit".to_string(), text("Hz")),
            ("dt".to_string(), AttrValue::Number(self.dt)),
            ("dt:unit".to_string(), text("s")),
            ("homepage".to_string(), text(HOMEPAGE)),
            ("buoy_type".to_string(), text(BUOY_TYPE)),
            ("buoy_device".to_string(), text(&self.buoy_device)),
            ("buoy_name".to_string(), text(&self.buoy_name)),
        ];
        pairs.extend(
            self.extra
                .iter()
                .map(|(k, v)| (k.clone(), AttrValue::Text(v.clone()))),
        );
        pairs
    }
}

/// Parallel per-packet sequences to build a dataset from.
///
/// Every field holds one entry per packet. Packets without samples have
/// empty axis arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeseriesParts {
    /// x-axis samples per packet.
    pub x: Vec<Vec<f32>>,
    /// y-axis samples per packet.
    pub y: Vec<Vec<f32>>,
    /// z-axis samples per packet.
    pub z: Vec<Vec<f32>>,
    /// Longitude of the fix per packet.
    pub lon: Vec<Option<f64>>,
    /// Latitude of the fix per packet.
    pub lat: Vec<Option<f64>>,
    /// Time of the fix per packet.
    pub position_time: Vec<Option<OffsetDateTime>>,
    /// Time of the first sample per packet.
    pub package_start: Vec<Option<OffsetDateTime>>,
    /// Hub receipt time per packet.
    pub received: Vec<OffsetDateTime>,
    /// SD-card storage id per packet.
    pub storage_id: Vec<Option<u32>>,
}

/// An immutable acceleration dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct AxlTimeseries {
    attrs: DatasetAttrs,
    time: Vec<f64>,
    w_x: Vec<f32>,
    w_y: Vec<f32>,
    w_z: Vec<f32>,
    position_time: Vec<Option<f64>>,
    lon: Vec<Option<f64>>,
    lat: Vec<Option<f64>>,
    received: Vec<f64>,
    package_start: Vec<Option<f64>>,
    added: Vec<f64>,
    storage_id: Vec<Option<u32>>,
}

impl AxlTimeseries {
    /// Build a dataset from parallel per-packet sequences.
    ///
    /// # Errors
    ///
    /// Fails without building anything if the sequences do not line up
    /// ([`Error::DimensionMismatch`], [`Error::IncompletePosition`],
    /// [`Error::MissingBatchStart`]), if `frequency` and `dt` disagree
    /// ([`Error::InvalidFrequency`]), if batches overlap
    /// ([`Error::NonMonotonicTime`]) or if an extra attribute uses a fixed
    /// name ([`Error::ReservedAttribute`]).
    pub fn new(
        device: &str,
        name: &str,
        frequency: f64,
        dt: f64,
        parts: TimeseriesParts,
        extra_attrs: Option<BTreeMap<String, String>>,
    ) -> Result<Self> {
        check_frequency(frequency, dt)?;

        let n = parts.received.len();
        for (variable, actual) in [
            ("w_x", parts.x.len()),
            ("w_y", parts.y.len()),
            ("w_z", parts.z.len()),
            ("lon", parts.lon.len()),
            ("lat", parts.lat.len()),
            ("position_time", parts.position_time.len()),
            ("package_start", parts.package_start.len()),
            ("storage_id", parts.storage_id.len()),
        ] {
            check_len(variable, n, actual)?;
        }

        let extra = extra_attrs.unwrap_or_default();
        if let Some(key) = extra
            .keys()
            .find(|k| RESERVED_ATTRIBUTES.contains(&k.as_str()))
        {
            return Err(Error::ReservedAttribute(key.clone()));
        }

        let samples: usize = parts.z.iter().map(Vec::len).sum();
        let mut time = Vec::with_capacity(samples);
        let mut last_sample: Option<f64> = None;

        for i in 0..n {
            let len = parts.z[i].len();
            check_len("w_x", len, parts.x[i].len())?;
            check_len("w_y", len, parts.y[i].len())?;

            if parts.lon[i].is_some() != parts.lat[i].is_some() {
                return Err(Error::IncompletePosition(i));
            }

            if len == 0 {
                continue;
            }

            let start = unix_ms(parts.package_start[i].ok_or(Error::MissingBatchStart(i))?);
            if let Some(prev) = last_sample
                && start <= prev
            {
                return Err(Error::NonMonotonicTime { packet: i });
            }

            time.extend((0..len).map(|j| start + j as f64 * dt * 1000.0));
            last_sample = time.last().copied();
        }

        let received: Vec<f64> = parts.received.iter().map(|t| unix_ms(*t)).collect();

        debug!(
            "Assembled timeseries for {}: {} samples, {} packets",
            device,
            time.len(),
            n
        );

        Ok(Self {
            attrs: DatasetAttrs {
                frequency,
                dt,
                buoy_device: device.to_string(),
                buoy_name: name.to_string(),
                extra,
            },
            time,
            w_x: parts.x.concat(),
            w_y: parts.y.concat(),
            w_z: parts.z.concat(),
            position_time: parts
                .position_time
                .iter()
                .map(|t| t.map(unix_ms))
                .collect(),
            lon: parts.lon,
            lat: parts.lat,
            added: received.clone(),
            received,
            package_start: parts
                .package_start
                .iter()
                .map(|t| t.map(unix_ms))
                .collect(),
            storage_id: parts.storage_id,
        })
    }

    /// Build a dataset from a buoy's packets.
    ///
    /// Acceleration packets contribute samples; every packet contributes a
    /// position entry (null without a fix) and a received entry. Batches are
    /// put in order of their start time, so packages re-sent from the SD-card
    /// later land where they belong. A batch repeating the start time and
    /// storage id of another is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentFrequency`] if batches were sampled at
    /// different rates, and any error of [`AxlTimeseries::new`].
    pub fn from_packets(
        buoy: &BuoyInfo,
        packets: &[Packet],
        extra_attrs: Option<BTreeMap<String, String>>,
    ) -> Result<Self> {
        let frequency = common_frequency(packets)?;

        let mut parts = TimeseriesParts::default();
        for packet in order_batches(packets) {
            match packet.axl() {
                Some(axl) => {
                    parts.x.push(axl.x.clone());
                    parts.y.push(axl.y.clone());
                    parts.z.push(axl.z.clone());
                    parts.package_start.push(Some(axl.start));
                    parts.storage_id.push(axl.storage_id);
                }
                None => {
                    parts.x.push(Vec::new());
                    parts.y.push(Vec::new());
                    parts.z.push(Vec::new());
                    parts.package_start.push(None);
                    parts.storage_id.push(None);
                }
            }

            parts.lon.push(packet.position.map(|p| p.lon));
            parts.lat.push(packet.position.map(|p| p.lat));
            parts
                .position_time
                .push(packet.position.map(|_| packet.best_position_time()));
            parts.received.push(packet.received);
        }

        Self::new(
            &buoy.dev,
            buoy.name_or_empty(),
            frequency,
            1.0 / frequency,
            parts,
            extra_attrs,
        )
    }

    /// Rebuild a dataset from stored flat variables.
    ///
    /// Only the axis lengths are checked; the values are taken as stored.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_stored(
        attrs: DatasetAttrs,
        time: Vec<f64>,
        (w_x, w_y, w_z): (Vec<f32>, Vec<f32>, Vec<f32>),
        (position_time, lon, lat): (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>),
        received: Vec<f64>,
        package_start: Vec<Option<f64>>,
        added: Vec<f64>,
        storage_id: Vec<Option<u32>>,
    ) -> Result<Self> {
        for (variable, actual) in [("w_x", w_x.len()), ("w_y", w_y.len()), ("w_z", w_z.len())] {
            check_len(variable, time.len(), actual)?;
        }
        check_len("lon", position_time.len(), lon.len())?;
        check_len("lat", position_time.len(), lat.len())?;
        for (variable, actual) in [
            ("package_start", package_start.len()),
            ("added", added.len()),
            ("storage_id", storage_id.len()),
        ] {
            check_len(variable, received.len(), actual)?;
        }

        Ok(Self {
            attrs,
            time,
            w_x,
            w_y,
            w_z,
            position_time,
            lon,
            lat,
            received,
            package_start,
            added,
            storage_id,
        })
    }

    /// Global attributes.
    pub fn attrs(&self) -> &DatasetAttrs {
        &self.attrs
    }

    /// Sample times in epoch milliseconds.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Horizontal x-axis acceleration.
    pub fn w_x(&self) -> &[f32] {
        &self.w_x
    }

    /// Horizontal y-axis acceleration.
    pub fn w_y(&self) -> &[f32] {
        &self.w_y
    }

    /// Vertical acceleration.
    pub fn w_z(&self) -> &[f32] {
        &self.w_z
    }

    /// Position fix times in epoch milliseconds, one per packet.
    pub fn position_time(&self) -> &[Option<f64>] {
        &self.position_time
    }

    /// Longitudes, one per packet.
    pub fn lon(&self) -> &[Option<f64>] {
        &self.lon
    }

    /// Latitudes, one per packet.
    pub fn lat(&self) -> &[Option<f64>] {
        &self.lat
    }

    /// Hub receipt times in epoch milliseconds.
    pub fn received(&self) -> &[f64] {
        &self.received
    }

    /// Batch start times in epoch milliseconds.
    pub fn package_start(&self) -> &[Option<f64>] {
        &self.package_start
    }

    /// Time each package was added, in epoch milliseconds.
    pub fn added(&self) -> &[f64] {
        &self.added
    }

    /// SD-card storage ids.
    pub fn storage_id(&self) -> &[Option<u32>] {
        &self.storage_id
    }

    /// Number of packets with a position fix.
    pub fn fix_count(&self) -> usize {
        self.lon.iter().filter(|l| l.is_some()).count()
    }

    /// Non-null positions as `(time_ms, lon, lat)`.
    pub fn positions(&self) -> impl Iterator<Item = (Option<f64>, f64, f64)> + '_ {
        self.position_time
            .iter()
            .zip(self.lon.iter().zip(&self.lat))
            .filter_map(|(t, (lon, lat))| Some((*t, (*lon)?, (*lat)?)))
    }

    /// Length of the named axis.
    pub fn dimension_len(&self, dimension: &str) -> usize {
        match dimension {
            "time" => self.time.len(),
            "position_time" => self.position_time.len(),
            "received" => self.received.len(),
            _ => 0,
        }
    }
}

fn check_len(variable: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            variable: variable.to_string(),
            expected,
            actual,
        })
    }
}

fn check_frequency(frequency: f64, dt: f64) -> Result<()> {
    let valid = frequency.is_finite()
        && dt.is_finite()
        && frequency > 0.0
        && dt > 0.0
        && (frequency * dt - 1.0).abs() < 1e-6;
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidFrequency { frequency, dt })
    }
}

/// Sort acceleration packets by batch start within the slots they occupy.
/// Other packets keep their place.
fn order_batches(packets: &[Packet]) -> Vec<&Packet> {
    let batch_key = |p: &&Packet| p.axl().map(|a| (a.start, a.storage_id));

    let mut batches: Vec<&Packet> = packets.iter().filter(|p| p.axl().is_some()).collect();
    let total = batches.len();
    batches.sort_by_key(batch_key);
    batches.dedup_by_key(|p| batch_key(&*p));
    if batches.len() < total {
        debug!("Dropped {} repeated batches", total - batches.len());
    }

    let mut batches = batches.into_iter();
    packets
        .iter()
        .filter_map(|p| match p.axl() {
            Some(_) => batches.next(),
            None => Some(p),
        })
        .collect()
}

fn common_frequency(packets: &[Packet]) -> Result<f64> {
    let mut frequencies = packets.iter().filter_map(Packet::axl).map(|a| a.frequency);
    let Some(first) = frequencies.next() else {
        return Ok(DEFAULT_FREQUENCY);
    };
    for actual in frequencies {
        if (actual - first).abs() > f64::EPSILON * first {
            return Err(Error::InconsistentFrequency {
                expected: first,
                actual,
            });
        }
    }
    Ok(first)
}
