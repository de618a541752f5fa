//! Info command implementation.

use std::path::Path;

use anyhow::{Result, bail};
use cairn_lib::prelude::*;

use crate::display;

/// Shows coverage of one canonical series.
pub(crate) fn show_info(ticker: &str, timeframe: &str, data_dir: &Path) -> Result<()> {
    let timeframe: Timeframe = timeframe.parse()?;
    let key = SeriesKey::new(ticker, timeframe);
    let store = Store::open(data_dir, key.clone())?;
    if store.state() == StoreState::Empty {
        bail!("no canonical file for {key} in '{}'", data_dir.display());
    }

    display::print_coverage(&key, store.timeline());
    println!("file: {}", store.path().display());
    Ok(())
}
