//! Read-only continuity scan over a timeline.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cairn_types::Timeline;

/// A continuity hole: two consecutive bars further apart than the
/// configured threshold.
///
/// Gaps are warnings, not errors — sessions close, exchanges halt. The
/// operator decides what a plausible gap looks like via `max_gap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    /// Timestamp of the last bar before the hole.
    pub start: DateTime<Utc>,
    /// Timestamp of the first bar after the hole.
    pub end: DateTime<Utc>,
}

impl Gap {
    /// Returns the gap's duration.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Structural breaches the store's invariants should make impossible.
///
/// A non-zero duplicate count or an ordering violation signals a bug
/// elsewhere in the pipeline; the auditor surfaces it as an error
/// rather than silently reporting gaps over broken data.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditError {
    /// The timeline contains repeated timestamps.
    #[error("timeline contains {count} duplicate timestamp(s), first at {first}")]
    DuplicateTimestamps {
        /// Number of repeated timestamps.
        count: usize,
        /// First repeated timestamp encountered.
        first: DateTime<Utc>,
    },

    /// The timeline is not sorted ascending.
    #[error("timeline ordering violation: {next} follows {prev}")]
    OutOfOrder {
        /// The earlier-positioned, later-valued timestamp.
        prev: DateTime<Utc>,
        /// The timestamp that went backward.
        next: DateTime<Utc>,
    },
}

/// Scans a timeline for continuity gaps.
///
/// Every consecutive timestamp delta greater than `max_gap` is reported
/// as a [`Gap`]. The scan never mutates its input.
///
/// # Errors
///
/// Returns an [`AuditError`] on duplicate or out-of-order timestamps.
pub fn audit(timeline: &Timeline, max_gap: TimeDelta) -> Result<Vec<Gap>, AuditError> {
    let mut gaps = Vec::new();
    let mut duplicates = 0usize;
    let mut first_duplicate = None;

    for pair in timeline.bars().windows(2) {
        let (prev, next) = (pair[0].timestamp, pair[1].timestamp);
        if next < prev {
            return Err(AuditError::OutOfOrder { prev, next });
        }
        if next == prev {
            duplicates += 1;
            first_duplicate.get_or_insert(next);
            continue;
        }
        if next - prev > max_gap {
            gaps.push(Gap {
                start: prev,
                end: next,
            });
        }
    }

    if let Some(first) = first_duplicate {
        return Err(AuditError::DuplicateTimestamps {
            count: duplicates,
            first,
        });
    }
    Ok(gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_types::Bar;
    use chrono::TimeZone;

    fn bar_at(minute: u32) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 9, minute, 0).unwrap();
        Bar::new(ts, 100.0, 101.0, 99.0, 100.5, 10)
    }

    #[test]
    fn test_gap_free_timeline_reports_nothing() {
        let timeline = Timeline::from_bars((0..10).map(bar_at));
        let gaps = audit(&timeline, TimeDelta::minutes(1)).unwrap();
        assert!(gaps.is_empty());
    }

    #[test]
    fn test_single_gap_reported_once() {
        // one hole of max_gap + 1
        let timeline = Timeline::from_bars([bar_at(0), bar_at(1), bar_at(3), bar_at(4)]);
        let gaps = audit(&timeline, TimeDelta::minutes(1)).unwrap();

        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].start, Utc.with_ymd_and_hms(2024, 1, 2, 9, 1, 0).unwrap());
        assert_eq!(gaps[0].end, Utc.with_ymd_and_hms(2024, 1, 2, 9, 3, 0).unwrap());
        assert_eq!(gaps[0].duration(), TimeDelta::minutes(2));
    }

    #[test]
    fn test_gap_exactly_at_threshold_not_reported() {
        let timeline = Timeline::from_bars([bar_at(0), bar_at(5)]);
        let gaps = audit(&timeline, TimeDelta::minutes(5)).unwrap();
        assert!(gaps.is_empty());
    }

    #[test]
    fn test_empty_and_single_bar_timelines() {
        assert!(audit(&Timeline::new(), TimeDelta::minutes(1)).unwrap().is_empty());
        let one = Timeline::from_bars([bar_at(0)]);
        assert!(audit(&one, TimeDelta::minutes(1)).unwrap().is_empty());
    }

    #[test]
    fn test_never_mutates() {
        let timeline = Timeline::from_bars([bar_at(0), bar_at(9)]);
        let before = timeline.clone();
        let _ = audit(&timeline, TimeDelta::minutes(1)).unwrap();
        assert_eq!(timeline, before);
    }
}
