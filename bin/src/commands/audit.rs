//! Audit command implementation.

use std::path::Path;

use anyhow::{Context, Result, bail};
use cairn_lib::prelude::*;

use crate::display;

/// Audits one canonical series for continuity gaps.
pub(crate) fn audit_series(
    ticker: &str,
    timeframe: &str,
    data_dir: &Path,
    max_gap_bars: u32,
) -> Result<()> {
    let timeframe: Timeframe = timeframe.parse()?;
    let key = SeriesKey::new(ticker, timeframe);
    let store = Store::open(data_dir, key.clone())?;
    if store.state() == StoreState::Empty {
        bail!("no canonical file for {key} in '{}'", data_dir.display());
    }

    let max_gap = timeframe.duration() * max_gap_bars as i32;
    let gaps = audit(store.timeline(), max_gap).with_context(|| format!("auditing {key}"))?;
    display::print_gaps(&key, &gaps);
    Ok(())
}
