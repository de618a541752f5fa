//! Ingest command: the full merge, resample, audit, export pipeline.
//!
//! Stages run in a fixed order. A failure before persist leaves the
//! prior canonical files untouched; re-running the same ingestion is
//! safe because merge is idempotent.

use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::{Context, Result};
use cairn_lib::prelude::*;

use crate::display;

/// Runs the pipeline for one vendor file.
#[allow(clippy::too_many_arguments)]
pub(crate) fn ingest(
    ticker: &str,
    file: &Path,
    descriptor_path: &Path,
    timeframe: &str,
    data_dir: &Path,
    export_dir: &Path,
    chunk_size: usize,
    max_gap_bars: u32,
    skip_export: bool,
    quiet: bool,
) -> Result<()> {
    let timeframe: Timeframe = timeframe.parse()?;
    let chunk_size = NonZeroUsize::new(chunk_size).context("chunk size must be at least 1")?;
    let descriptor = SourceDescriptor::from_json_file(descriptor_path)?;
    let key = SeriesKey::new(ticker, timeframe);

    // Stage 1: normalize the vendor file into canonical bars.
    let spinner = display::stage_spinner("normalizing", quiet);
    let mut stream = normalize(file, &descriptor, timeframe)
        .with_context(|| format!("ingesting '{}'", file.display()))?;
    let mut bars = Vec::new();
    for bar in stream.by_ref() {
        bars.push(bar);
        spinner.inc(1);
    }
    spinner.finish_and_clear();
    display::print_ingest_report(&stream.report());

    // Stage 2: merge into the base series and persist atomically.
    let mut store = Store::open(data_dir, key.clone())?;
    let report = store.merge(bars);
    store.persist()?;
    display::print_merge_report(&key, &report);

    // Stage 3: re-derive every coarser timeframe from the base.
    let targets: Vec<Timeframe> = timeframe.derived().collect();
    let bar = display::step_bar(targets.len() as u64, "resampling", quiet);
    let mut series = vec![(key.clone(), store.timeline().clone())];
    for target in targets {
        let derived = derive(store.timeline(), target);
        let derived_key = key.at_timeframe(target);
        let mut derived_store = Store::open(data_dir, derived_key.clone())?;
        derived_store.replace(derived);
        derived_store.persist()?;
        series.push((derived_key, derived_store.timeline().clone()));
        bar.inc(1);
    }
    bar.finish_and_clear();

    // Stage 4: audit continuity. Gaps are warnings; duplicate or
    // out-of-order timestamps abort, since they mean a pipeline bug.
    for (series_key, timeline) in &series {
        let max_gap = series_key.timeframe().duration() * max_gap_bars as i32;
        let gaps = audit(timeline, max_gap)
            .with_context(|| format!("auditing {series_key}"))?;
        display::print_gaps(series_key, &gaps);
    }

    // Stage 5: publish chunked artifacts.
    if !skip_export {
        for (series_key, timeline) in &series {
            let chunked = export(timeline, series_key, chunk_size);
            let dir = write_to_dir(&chunked, export_dir)?;
            println!(
                "{series_key}: exported {} chunk(s) to {}",
                chunked.manifest.num_chunks,
                dir.display()
            );
        }
    }

    Ok(())
}
