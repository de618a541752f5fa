//! OHLCV bar representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::InvariantError;

/// A single OHLCV bar.
///
/// The timestamp is the bar's *open time* (start of its interval) in the
/// canonical timezone, UTC. Source adapters convert every vendor convention
/// to this form before a bar enters a store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time (UTC).
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price during the period.
    pub high: f64,
    /// Lowest price during the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume during the period.
    pub volume: u64,
}

impl Bar {
    /// Creates a new bar.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Checks the OHLCV invariants: `high >= max(open, close)` and
    /// `low <= min(open, close)`.
    ///
    /// NaN prices fail both comparisons and are rejected here rather
    /// than poisoning downstream aggregation.
    ///
    /// # Errors
    ///
    /// Returns the violated invariant.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let body_max = self.open.max(self.close);
        let body_min = self.open.min(self.close);

        if !(self.high >= body_max) {
            return Err(InvariantError::HighBelowBody {
                timestamp: self.timestamp,
                high: self.high,
                body_max,
            });
        }
        if !(self.low <= body_min) {
            return Err(InvariantError::LowAboveBody {
                timestamp: self.timestamp,
                low: self.low,
                body_min,
            });
        }
        Ok(())
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Returns true if this is a bullish (green) bar.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns a copy with the given fixed offset added to all four prices.
    ///
    /// Used for contract-roll continuity adjustments; the timestamp is
    /// never touched.
    #[must_use]
    pub fn with_price_offset(mut self, offset: f64) -> Self {
        self.open += offset;
        self.high += offset;
        self.low += offset;
        self.close += offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_bar() -> Bar {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Bar::new(timestamp, 101.0, 103.5, 100.5, 102.0, 1_000)
    }

    #[test]
    fn test_valid_bar() {
        assert!(create_test_bar().validate().is_ok());
    }

    #[test]
    fn test_high_below_body() {
        let mut bar = create_test_bar();
        bar.high = 100.0;
        assert!(matches!(
            bar.validate(),
            Err(InvariantError::HighBelowBody { .. })
        ));
    }

    #[test]
    fn test_low_above_body() {
        let mut bar = create_test_bar();
        bar.low = 102.5;
        assert!(matches!(
            bar.validate(),
            Err(InvariantError::LowAboveBody { .. })
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let mut bar = create_test_bar();
        bar.high = f64::NAN;
        assert!(bar.validate().is_err());
    }

    #[test]
    fn test_range_and_body() {
        let bar = create_test_bar();
        assert!((bar.range() - 3.0).abs() < 1e-10);
        assert!((bar.body() - 1.0).abs() < 1e-10);
        assert!(bar.is_bullish());
    }

    #[test]
    fn test_price_offset_leaves_timestamp() {
        let bar = create_test_bar();
        let shifted = bar.with_price_offset(2.5);
        assert_eq!(shifted.timestamp, bar.timestamp);
        assert!((shifted.open - 103.5).abs() < 1e-10);
        assert!((shifted.high - 106.0).abs() < 1e-10);
        assert!((shifted.low - 103.0).abs() < 1e-10);
        assert!((shifted.close - 104.5).abs() < 1e-10);
        assert_eq!(shifted.volume, bar.volume);
    }
}
