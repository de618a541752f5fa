//! Pure chunk split and manifest derivation.

use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cairn_types::{Bar, SeriesKey, Timeframe, Timeline};

/// Metadata describing an exported timeline's chunk layout and coverage.
///
/// Always computed from the same timeline as the chunks themselves, so
/// the two cannot diverge. Field names are serialized camelCase for the
/// chart/backtest readers (`totalBars`, `numChunks`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Ticker symbol of the exported series.
    pub ticker: String,
    /// Timeframe of the exported series.
    pub timeframe: Timeframe,
    /// Total number of bars across all chunks.
    pub total_bars: usize,
    /// Number of chunk files.
    pub num_chunks: usize,
    /// Maximum bars per chunk (every chunk but the last is exactly
    /// this size).
    pub chunk_size: usize,
    /// Timestamp of the oldest bar, if any.
    pub start_time: Option<DateTime<Utc>>,
    /// Timestamp of the newest bar, if any.
    pub end_time: Option<DateTime<Utc>>,
}

impl Manifest {
    /// Returns the export directory name, `{TICKER}_{TIMEFRAME}`.
    #[must_use]
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.ticker, self.timeframe.as_str())
    }
}

/// A timeline split into ordered chunks plus its manifest.
///
/// Chunks borrow from the source timeline; index 0 is the oldest data
/// and ascending index moves forward in time. This ordering is part of
/// the reader contract and is fixed — it never varies by call site.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkedExport<'a> {
    /// Ordered chunk slices, oldest first.
    pub chunks: Vec<&'a [Bar]>,
    /// Manifest derived from the same timeline.
    pub manifest: Manifest,
}

/// Splits a timeline into chunks of `chunk_size` bars (the last chunk
/// may be smaller) and derives the matching manifest.
///
/// Pure function of its inputs: deterministic, idempotent, safe to
/// re-run. Concatenating the chunks in index order reconstructs the
/// timeline exactly.
#[must_use]
pub fn export<'a>(
    timeline: &'a Timeline,
    key: &SeriesKey,
    chunk_size: NonZeroUsize,
) -> ChunkedExport<'a> {
    let chunks: Vec<&[Bar]> = timeline.bars().chunks(chunk_size.get()).collect();
    let (start_time, end_time) = match timeline.span() {
        Some((start, end)) => (Some(start), Some(end)),
        None => (None, None),
    };

    let manifest = Manifest {
        ticker: key.ticker().to_string(),
        timeframe: key.timeframe(),
        total_bars: timeline.len(),
        num_chunks: chunks.len(),
        chunk_size: chunk_size.get(),
        start_time,
        end_time,
    };

    ChunkedExport { chunks, manifest }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timeline_of(n: u32) -> Timeline {
        Timeline::from_bars((0..n).map(|i| {
            let ts = Utc.with_ymd_and_hms(2024, 1, 2, 9 + i / 60, i % 60, 0).unwrap();
            Bar::new(ts, 100.0, 101.0, 99.0, 100.5, u64::from(i))
        }))
    }

    fn key() -> SeriesKey {
        SeriesKey::new("AAPL", Timeframe::Minute1)
    }

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_chunk_sizes_and_manifest() {
        // 25 bars at chunk_size 10: [10, 10, 5]
        let timeline = timeline_of(25);
        let export = export(&timeline, &key(), size(10));

        let sizes: Vec<_> = export.chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, [10, 10, 5]);
        assert_eq!(export.manifest.total_bars, 25);
        assert_eq!(export.manifest.num_chunks, 3);
        assert_eq!(export.manifest.chunk_size, 10);
        assert_eq!(export.manifest.start_time, timeline.span().map(|s| s.0));
        assert_eq!(export.manifest.end_time, timeline.span().map(|s| s.1));
    }

    #[test]
    fn test_chunk_zero_is_oldest() {
        let timeline = timeline_of(25);
        let export = export(&timeline, &key(), size(10));
        assert_eq!(export.chunks[0][0].timestamp, timeline.first().unwrap().timestamp);
        assert_eq!(
            export.chunks.last().unwrap().last().unwrap().timestamp,
            timeline.last().unwrap().timestamp
        );
    }

    #[test]
    fn test_concat_round_trip() {
        let timeline = timeline_of(25);
        for n in [1, 7, 10, 25, 100] {
            let export = export(&timeline, &key(), size(n));
            let rebuilt: Vec<Bar> = export.chunks.iter().flat_map(|c| c.iter().copied()).collect();
            assert_eq!(rebuilt, timeline.bars());
        }
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = Timeline::new();
        let export = export(&timeline, &key(), size(10));
        assert!(export.chunks.is_empty());
        assert_eq!(export.manifest.num_chunks, 0);
        assert_eq!(export.manifest.total_bars, 0);
        assert_eq!(export.manifest.start_time, None);
        assert_eq!(export.manifest.end_time, None);
    }

    #[test]
    fn test_manifest_serializes_camel_case() {
        let timeline = timeline_of(3);
        let export = export(&timeline, &key(), size(2));
        let json = serde_json::to_string(&export.manifest).unwrap();
        assert!(json.contains("\"totalBars\":3"));
        assert!(json.contains("\"numChunks\":2"));
        assert!(json.contains("\"chunkSize\":2"));
        assert!(json.contains("\"startTime\""));
        assert!(json.contains("\"endTime\""));
    }

    #[test]
    fn test_deterministic() {
        let timeline = timeline_of(25);
        let a = export(&timeline, &key(), size(10));
        let b = export(&timeline, &key(), size(10));
        assert_eq!(a, b);
    }
}
