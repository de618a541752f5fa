//! Window aggregation from a base timeline to a coarser granularity.

use chrono::{DateTime, Utc};

use cairn_types::{Bar, Timeframe, Timeline};

/// Derives a coarser timeline from a base timeline.
///
/// Base bars are partitioned into non-overlapping `[start,
/// start + granularity)` windows via [`Timeframe::align`] and each
/// non-empty window aggregates to one bar labeled by its window start
/// (open-time convention, matching ingestion's canonical labeling):
/// `open` of the first contributing bar, max of highs, min of lows,
/// `close` of the last, sum of volumes. Empty windows are omitted — a
/// sparse base yields a correspondingly sparse derivation, with no
/// synthetic fill.
///
/// Deterministic: the same base and target always produce identical
/// output, which downstream backtests rely on.
#[must_use]
pub fn derive(base: &Timeline, target: Timeframe) -> Timeline {
    let mut out: Vec<Bar> = Vec::new();
    let mut window: Option<WindowAgg> = None;

    for bar in base {
        let start = target.align(bar.timestamp);
        match window.take() {
            Some(mut agg) if agg.start == start => {
                agg.update(bar);
                window = Some(agg);
            }
            Some(agg) => {
                out.push(agg.finish());
                window = Some(WindowAgg::new(start, bar));
            }
            None => window = Some(WindowAgg::new(start, bar)),
        }
    }
    if let Some(agg) = window {
        out.push(agg.finish());
    }

    Timeline::from_bars(out)
}

/// Accumulator for one resample window.
#[derive(Debug)]
struct WindowAgg {
    start: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl WindowAgg {
    /// Seeds the window from its first contributing bar.
    const fn new(start: DateTime<Utc>, bar: &Bar) -> Self {
        Self {
            start,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }

    /// Folds a later bar of the same window into the accumulator.
    fn update(&mut self, bar: &Bar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
    }

    /// Finishes the window, labeled by its start.
    const fn finish(&self) -> Bar {
        Bar::new(
            self.start, self.open, self.high, self.low, self.close, self.volume,
        )
    }
}
