//! Display utilities and output formatting for the cairn CLI.

use cairn_lib::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Creates a spinner for an open-ended stage (row counts unknown up
/// front).
pub(crate) fn stage_spinner(message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} ({pos} bars)")
            .expect("Invalid progress template"),
    );
    spinner.set_message(message);
    spinner
}

/// Creates a bar over a known number of steps (e.g., derived
/// timeframes).
pub(crate) fn step_bar(len: u64, message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .expect("Invalid progress template")
            .progress_chars("=>-"),
    );
    bar.set_message(message);
    bar
}

/// Prints the outcome of one normalization pass.
pub(crate) fn print_ingest_report(report: &IngestReport) {
    println!(
        "normalized {} bars ({} malformed rows skipped, {} invariant-violating bars rejected)",
        report.parsed, report.skipped_rows, report.rejected_bars
    );
}

/// Prints the outcome of one merge batch.
pub(crate) fn print_merge_report(key: &SeriesKey, report: &MergeReport) {
    println!(
        "{key}: {} added, {} updated, {} rejected",
        report.added, report.updated, report.rejected
    );
}

/// Prints continuity warnings for one series. Gaps are operator
/// information, not failures.
pub(crate) fn print_gaps(key: &SeriesKey, gaps: &[Gap]) {
    if gaps.is_empty() {
        println!("{key}: continuity ok");
        return;
    }
    println!("{key}: {} continuity gap(s)", gaps.len());
    for gap in gaps {
        println!(
            "  {} .. {} ({} min)",
            gap.start.format("%Y-%m-%d %H:%M"),
            gap.end.format("%Y-%m-%d %H:%M"),
            gap.duration().num_minutes()
        );
    }
}

/// Prints the coverage of a timeline.
pub(crate) fn print_coverage(key: &SeriesKey, timeline: &Timeline) {
    match timeline.span() {
        Some((start, end)) => println!(
            "{key}: {} bars, {} .. {}",
            timeline.len(),
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        ),
        None => println!("{key}: empty"),
    }
}
