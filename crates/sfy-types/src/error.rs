//! Error types for packet construction in sfy-types.

use thiserror::Error;

/// Errors that can occur when turning a hub event into a typed [`Packet`](crate::Packet).
///
/// This error type is transport-agnostic and does not include
/// HTTP errors (those belong in sfy-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Event or body JSON did not match the expected shape.
    #[error("Invalid JSON")]
    Json(#[from] serde_json::Error),

    /// The three acceleration axes of a batch have different lengths.
    #[error("Acceleration axes differ in length (x={x}, y={y}, z={z})")]
    AxisLengthMismatch {
        /// Number of x samples.
        x: usize,
        /// Number of y samples.
        y: usize,
        /// Number of z samples.
        z: usize,
    },

    /// Sample frequency is zero, negative or not finite.
    #[error("Invalid sample frequency: {0}")]
    InvalidFrequency(f64),

    /// Only one of longitude/latitude was present on the event.
    #[error("Incomplete position: longitude and latitude must both be present")]
    IncompletePosition,

    /// A timestamp was outside the representable range.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A field required by the packet kind was missing.
    #[error("Missing field '{field}' in {file} packet")]
    MissingField {
        /// Notefile the event belongs to.
        file: String,
        /// Name of the missing field.
        field: &'static str,
    },
}

/// Result type alias using sfy-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
