//! cairn CLI - canonical, deduplicated, multi-timeframe OHLCV bar store.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "cairn")]
#[command(about = "Canonical multi-timeframe OHLCV bar store", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest one vendor file and run the full pipeline
    /// (merge, resample, audit, export)
    Ingest {
        /// Ticker symbol (e.g., ES, AAPL)
        ticker: String,

        /// Raw vendor file (delimited text)
        file: PathBuf,

        /// Source descriptor JSON describing the vendor's format
        #[arg(short, long)]
        descriptor: PathBuf,

        /// Timeframe of the bars in the file
        #[arg(short, long, default_value = "m1")]
        timeframe: String,

        /// Directory holding the canonical store files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Directory receiving chunked export artifacts
        #[arg(long, default_value = "exports")]
        export_dir: PathBuf,

        /// Bars per export chunk
        #[arg(long, default_value = "500")]
        chunk_size: usize,

        /// Continuity threshold, in bars of each series' granularity
        #[arg(long, default_value = "1")]
        max_gap_bars: u32,

        /// Merge and resample only; skip the export stage
        #[arg(long)]
        skip_export: bool,
    },

    /// Audit an existing canonical series for continuity gaps
    Audit {
        /// Ticker symbol
        ticker: String,

        /// Timeframe of the series
        timeframe: String,

        /// Directory holding the canonical store files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Continuity threshold, in bars of the series' granularity
        #[arg(long, default_value = "1")]
        max_gap_bars: u32,
    },

    /// Re-export a canonical series as chunked JSON artifacts
    Export {
        /// Ticker symbol
        ticker: String,

        /// Timeframe of the series
        timeframe: String,

        /// Directory holding the canonical store files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "exports")]
        out: PathBuf,

        /// Bars per export chunk
        #[arg(long, default_value = "500")]
        chunk_size: usize,
    },

    /// Show coverage of a canonical series
    Info {
        /// Ticker symbol
        ticker: String,

        /// Timeframe of the series
        timeframe: String,

        /// Directory holding the canonical store files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Ingest {
            ticker,
            file,
            descriptor,
            timeframe,
            data_dir,
            export_dir,
            chunk_size,
            max_gap_bars,
            skip_export,
        } => commands::ingest::ingest(
            &ticker,
            &file,
            &descriptor,
            &timeframe,
            &data_dir,
            &export_dir,
            chunk_size,
            max_gap_bars,
            skip_export,
            cli.quiet,
        ),
        Commands::Audit {
            ticker,
            timeframe,
            data_dir,
            max_gap_bars,
        } => commands::audit::audit_series(&ticker, &timeframe, &data_dir, max_gap_bars),
        Commands::Export {
            ticker,
            timeframe,
            data_dir,
            out,
            chunk_size,
        } => commands::export::export_series(&ticker, &timeframe, &data_dir, &out, chunk_size),
        Commands::Info {
            ticker,
            timeframe,
            data_dir,
        } => commands::info::show_info(&ticker, &timeframe, &data_dir),
    }
}
