//! Error types for the telemetry engine.

use thiserror::Error;

/// Malformed, empty or out-of-range input handed to the engine.
///
/// Every engine error is reported synchronously to the immediate caller.
/// Nothing is retried and a failed call never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Leveling analysis needs at least one probe point.
    #[error("at least one probe point is required")]
    NoProbePoints,

    /// A probe point carried a NaN or infinite value.
    #[error("probe point {index} is not finite (x={x}, y={y}, z_offset={z_offset})")]
    NonFiniteProbePoint {
        index: usize,
        x: f64,
        y: f64,
        z_offset: f64,
    },

    /// `recent(0)` and friends.
    #[error("requested entry count must be positive")]
    ZeroCount,

    /// Tolerance outside `[0, max]` or not finite.
    #[error("tolerance {value} mm is outside the valid range [0, {max}] mm")]
    ToleranceOutOfRange { value: f64, max: f64 },

    /// Downsampling to zero points.
    #[error("max_points must be positive")]
    ZeroMaxPoints,

    /// Window whose start lies after its end.
    #[error("window start {start} ms is after window end {end} ms")]
    InvalidWindow { start: i64, end: i64 },

    /// A bounded buffer with no room at all.
    #[error("buffer capacity must be positive")]
    ZeroCapacity,
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, InputError>;
