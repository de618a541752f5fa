//! Export command implementation.

use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::{Context, Result, bail};
use cairn_lib::prelude::*;

/// Re-exports one canonical series as chunked JSON artifacts.
pub(crate) fn export_series(
    ticker: &str,
    timeframe: &str,
    data_dir: &Path,
    out: &Path,
    chunk_size: usize,
) -> Result<()> {
    let timeframe: Timeframe = timeframe.parse()?;
    let chunk_size = NonZeroUsize::new(chunk_size).context("chunk size must be at least 1")?;
    let key = SeriesKey::new(ticker, timeframe);
    let store = Store::open(data_dir, key.clone())?;
    if store.state() == StoreState::Empty {
        bail!("no canonical file for {key} in '{}'", data_dir.display());
    }

    let chunked = export(store.timeline(), &key, chunk_size);
    let dir = write_to_dir(&chunked, out)?;
    println!(
        "{key}: exported {} bar(s) in {} chunk(s) to {}",
        chunked.manifest.total_bars,
        chunked.manifest.num_chunks,
        dir.display()
    );
    Ok(())
}
