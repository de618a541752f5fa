//! Error types for cairn core types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A bar that violates the OHLCV invariants.
///
/// Bars carrying one of these are rejected (and counted) by ingestion
/// and merge; they never enter a [`crate::Timeline`].
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvariantError {
    /// `high` is below `max(open, close)` (or not a number).
    #[error("bar at {timestamp}: high {high} is below max(open, close) = {body_max}")]
    HighBelowBody {
        /// Timestamp of the offending bar.
        timestamp: DateTime<Utc>,
        /// The bar's high.
        high: f64,
        /// `max(open, close)` of the bar.
        body_max: f64,
    },

    /// `low` is above `min(open, close)` (or not a number).
    #[error("bar at {timestamp}: low {low} is above min(open, close) = {body_min}")]
    LowAboveBody {
        /// Timestamp of the offending bar.
        timestamp: DateTime<Utc>,
        /// The bar's low.
        low: f64,
        /// `min(open, close)` of the bar.
        body_min: f64,
    },
}
