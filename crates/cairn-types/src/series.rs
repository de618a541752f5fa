//! Series addressing.

use serde::{Deserialize, Serialize};

use crate::Timeframe;

/// Identifies one stored series: an explicit (ticker, timeframe) pair.
///
/// Every store, audit, and export operation takes a key; nothing is ever
/// inferred from ambient state such as the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Ticker symbol, stored uppercased.
    ticker: String,
    /// Bar granularity of the series.
    timeframe: Timeframe,
}

impl SeriesKey {
    /// Creates a new series key. The ticker is uppercased.
    #[must_use]
    pub fn new(ticker: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            timeframe,
        }
    }

    /// Returns the ticker symbol.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Returns the timeframe.
    #[must_use]
    pub const fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Returns a key for the same ticker at a different timeframe.
    #[must_use]
    pub fn at_timeframe(&self, timeframe: Timeframe) -> Self {
        Self {
            ticker: self.ticker.clone(),
            timeframe,
        }
    }

    /// Returns the `{TICKER}_{TIMEFRAME}` stem used for canonical store
    /// files and export directories.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.ticker, self.timeframe.as_str())
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ticker, self.timeframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_uppercased() {
        let key = SeriesKey::new("aapl", Timeframe::Minute1);
        assert_eq!(key.ticker(), "AAPL");
    }

    #[test]
    fn test_file_stem() {
        let key = SeriesKey::new("ES", Timeframe::Hour4);
        assert_eq!(key.file_stem(), "ES_h4");
    }

    #[test]
    fn test_at_timeframe() {
        let key = SeriesKey::new("ES", Timeframe::Minute1);
        let derived = key.at_timeframe(Timeframe::Day1);
        assert_eq!(derived.ticker(), "ES");
        assert_eq!(derived.timeframe(), Timeframe::Day1);
    }
}
