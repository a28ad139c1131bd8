//! Error types for sfy-core.
//!
//! This module defines the errors that can occur when talking to the data
//! hub and when assembling or exporting timeseries.
//!
//! # Recovery
//!
//! The client is a single-shot tool and does not retry on its own:
//!
//! | Error Type | Meaning |
//! |------------|---------|
//! | [`Error::NotReachable`] | Network failure, the hub could not be contacted |
//! | [`Error::Api`] | The hub answered with a non-success status |
//! | [`Error::BuoyNotFound`] / [`Error::AmbiguousBuoy`] | Query did not select exactly one buoy |
//! | [`Error::DimensionMismatch`] | Per-packet sequences did not line up; nothing was built |
//! | [`Error::NonMonotonicTime`] | Batches overlap or are out of order |
//! | [`Error::EmptyDimension`] | A dataset axis is empty and cannot be stored in NetCDF |
//! | [`Error::NetCdf`] | The archival file could not be written or read |

use thiserror::Error;

/// Errors that can occur in sfy-core.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The hub is not reachable.
    #[error("Hub not reachable at {url}")]
    NotReachable {
        /// URL of the failed request.
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed after a connection was made.
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    /// Invalid hub URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Hub returned an error response.
    #[error("Hub error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the hub, or the status text.
        message: String,
    },

    /// No buoy matched the query.
    #[error("No buoy matching '{0}'")]
    BuoyNotFound(String),

    /// More than one buoy matched the query.
    #[error("'{query}' matches several buoys: {}", .candidates.join(", "))]
    AmbiguousBuoy {
        /// The query given by the user.
        query: String,
        /// Device ids of matching buoys.
        candidates: Vec<String>,
    },

    /// A hub event could not be turned into a packet.
    #[error("Invalid packet {file}")]
    Parse {
        /// Hub file name of the event.
        file: String,
        #[source]
        source: sfy_types::ParseError,
    },

    /// JSON from the hub did not have the expected shape.
    #[error("Invalid JSON from hub")]
    Json(#[from] serde_json::Error),

    /// Per-packet or per-sample sequences have different lengths.
    #[error("Dimension mismatch for '{variable}': expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Variable whose length is wrong.
        variable: String,
        /// Length of the axis the variable belongs to.
        expected: usize,
        /// Length of the variable.
        actual: usize,
    },

    /// Only one of longitude/latitude is set for a packet.
    #[error("Packet {0} has a longitude or a latitude, but not both")]
    IncompletePosition(usize),

    /// Packet carries samples but no batch start time.
    #[error("Packet {0} has samples but no batch start time")]
    MissingBatchStart(usize),

    /// Sample frequency or interval is not a positive number.
    #[error("Invalid sample frequency {frequency} Hz / interval {dt} s")]
    InvalidFrequency {
        /// Frequency in Hz.
        frequency: f64,
        /// Sample interval in s.
        dt: f64,
    },

    /// Batches were sampled at different frequencies.
    #[error("Inconsistent sample frequency: {expected} Hz and {actual} Hz")]
    InconsistentFrequency {
        /// Frequency of the first batch.
        expected: f64,
        /// Frequency of the offending batch.
        actual: f64,
    },

    /// Sample times do not increase.
    #[error("Sample time not increasing at packet {packet}")]
    NonMonotonicTime {
        /// Index of the packet where the time axis went backwards.
        packet: usize,
    },

    /// A dataset axis has no entries.
    #[error("Dimension '{0}' is empty")]
    EmptyDimension(&'static str),

    /// Extra attribute collides with a fixed dataset attribute.
    #[error("Attribute '{0}' is reserved")]
    ReservedAttribute(String),

    /// NetCDF encoding or decoding failed.
    #[error("NetCDF error: {0}")]
    NetCdf(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using sfy-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
