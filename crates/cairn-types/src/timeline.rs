//! Ordered, deduplicated bar sequences.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Bar;

/// An ordered, deduplicated sequence of bars for one (ticker, timeframe).
///
/// Timestamps are strictly increasing and unique; both properties are
/// structural, not checked after the fact: the only constructor funnels
/// every input through a map keyed by timestamp. Timelines are owned by
/// a store and rebuilt wholesale on merge; readers get `&[Bar]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline(Vec<Bar>);

impl Timeline {
    /// Creates an empty timeline.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a timeline from bars in any order.
    ///
    /// Duplicate timestamps collapse to the last occurrence
    /// (last-write-wins, matching merge semantics).
    #[must_use]
    pub fn from_bars(bars: impl IntoIterator<Item = Bar>) -> Self {
        let map: BTreeMap<DateTime<Utc>, Bar> =
            bars.into_iter().map(|b| (b.timestamp, b)).collect();
        Self(map.into_values().collect())
    }

    /// Returns the bars in ascending timestamp order.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.0
    }

    /// Returns the number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the timeline holds no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the oldest bar, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Bar> {
        self.0.first()
    }

    /// Returns the newest bar, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Bar> {
        self.0.last()
    }

    /// Returns the (oldest, newest) timestamps covered, if non-empty.
    #[must_use]
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.first()?.timestamp, self.last()?.timestamp))
    }

    /// Iterates over the bars in ascending timestamp order.
    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.0.iter()
    }

    /// Consumes the timeline, returning its bars.
    #[must_use]
    pub fn into_bars(self) -> Vec<Bar> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar_at(minute: u32, close: f64) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 9, minute, 0).unwrap();
        Bar::new(ts, close, close, close, close, 10)
    }

    #[test]
    fn test_from_bars_sorts() {
        let timeline = Timeline::from_bars([bar_at(5, 1.0), bar_at(1, 2.0), bar_at(3, 3.0)]);
        let minutes: Vec<_> = timeline
            .iter()
            .map(|b| b.timestamp.format("%M").to_string())
            .collect();
        assert_eq!(minutes, ["01", "03", "05"]);
    }

    #[test]
    fn test_from_bars_dedups_last_wins() {
        let timeline = Timeline::from_bars([bar_at(1, 1.0), bar_at(1, 2.0)]);
        assert_eq!(timeline.len(), 1);
        assert!((timeline.first().unwrap().close - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_span() {
        assert_eq!(Timeline::new().span(), None);
        let timeline = Timeline::from_bars([bar_at(1, 1.0), bar_at(9, 1.0)]);
        let (start, end) = timeline.span().unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 9, 1, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 1, 9, 9, 0).unwrap());
    }
}
