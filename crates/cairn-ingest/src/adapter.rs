//! Normalization of raw vendor rows into canonical bars.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::StringRecord;
use thiserror::Error;

use cairn_types::{Bar, Timeframe};

use crate::SourceDescriptor;
use crate::descriptor::BarLabel;

/// Errors that abort a whole file's ingestion.
///
/// Row-level problems (malformed rows, invariant-violating bars) never
/// surface here; they are skipped and counted in the [`IngestReport`].
#[derive(Error, Debug)]
pub enum IngestError {
    /// I/O failure opening or reading the source file.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The descriptor file could not be parsed.
    #[error("failed to parse descriptor '{path}': {source}")]
    Descriptor {
        /// The descriptor file.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The file does not match the declared layout; nothing from it is
    /// merged.
    #[error("schema error in '{path}': {reason}")]
    Schema {
        /// The offending file.
        path: PathBuf,
        /// What did not line up.
        reason: String,
    },

    /// CSV-level read failure.
    #[error("failed to read '{path}': {source}")]
    Csv {
        /// The offending file.
        path: PathBuf,
        /// The underlying CSV error.
        source: csv::Error,
    },
}

/// Counters for one normalization pass over one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Rows successfully converted to canonical bars.
    pub parsed: usize,
    /// Malformed rows skipped (parse failures, short records,
    /// unresolvable local timestamps).
    pub skipped_rows: usize,
    /// Well-formed rows rejected for violating the OHLCV invariants.
    pub rejected_bars: usize,
}

/// Lazy stream of canonical bars read from one vendor file.
///
/// Finite and restartable: re-invoking [`normalize`] on the same file
/// yields the same sequence. Counters accumulate as the stream is
/// consumed; read them with [`BarStream::report`] after draining.
pub struct BarStream {
    records: csv::StringRecordsIntoIter<File>,
    descriptor: SourceDescriptor,
    granularity: Timeframe,
    report: IngestReport,
}

// The underlying CSV reader has no Debug representation.
impl std::fmt::Debug for BarStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarStream")
            .field("descriptor", &self.descriptor)
            .field("granularity", &self.granularity)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl BarStream {
    /// Returns the counters accumulated so far.
    #[must_use]
    pub const fn report(&self) -> IngestReport {
        self.report
    }
}

impl Iterator for BarStream {
    type Item = Bar;

    fn next(&mut self) -> Option<Bar> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(_) => {
                    self.report.skipped_rows += 1;
                    continue;
                }
            };
            match parse_row(&record, &self.descriptor, self.granularity) {
                Ok(bar) => {
                    if bar.validate().is_ok() {
                        self.report.parsed += 1;
                        return Some(bar);
                    }
                    self.report.rejected_bars += 1;
                }
                Err(_) => self.report.skipped_rows += 1,
            }
        }
    }
}

/// Opens one raw vendor file and returns a lazy stream of canonical bars.
///
/// All timestamps are resolved in the descriptor's timezone, converted
/// to UTC, and re-labeled to the open-time convention; the optional
/// price offset is applied to prices only. This is the single
/// timezone-normalization path in the pipeline.
///
/// # Errors
///
/// Returns [`IngestError::Schema`] if the file's header cannot satisfy
/// the declared column layout, or an I/O error if the file cannot be
/// opened. Nothing from a file that fails here is ever merged.
pub fn normalize(
    path: &Path,
    descriptor: &SourceDescriptor,
    granularity: Timeframe,
) -> Result<BarStream, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(descriptor.delimiter_byte())
        .has_headers(descriptor.has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    if descriptor.has_header {
        let headers = reader.headers().map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let required = descriptor.columns.required_width();
        if headers.len() < required {
            return Err(IngestError::Schema {
                path: path.to_path_buf(),
                reason: format!(
                    "header has {} columns, layout requires {required}",
                    headers.len()
                ),
            });
        }
    }

    Ok(BarStream {
        records: reader.into_records(),
        descriptor: descriptor.clone(),
        granularity,
        report: IngestReport::default(),
    })
}

/// Why one row could not become a bar. Rows failing here are skipped
/// and counted, never fatal.
enum RowError {
    ShortRecord,
    BadField,
    BadTimestamp,
}

fn parse_row(
    record: &StringRecord,
    descriptor: &SourceDescriptor,
    granularity: Timeframe,
) -> Result<Bar, RowError> {
    let columns = &descriptor.columns;
    if record.len() < columns.required_width() {
        return Err(RowError::ShortRecord);
    }

    let field = |idx: usize| record.get(idx).ok_or(RowError::ShortRecord);

    let mut timestamp = parse_timestamp(
        field(columns.date)?,
        columns.time.map(|t| field(t)).transpose()?,
        &descriptor.timestamp_format,
        descriptor.timezone,
    )?;
    if descriptor.bar_label == BarLabel::Close {
        timestamp -= granularity.duration();
    }

    let mut bar = Bar::new(
        timestamp,
        parse_price(field(columns.open)?)?,
        parse_price(field(columns.high)?)?,
        parse_price(field(columns.low)?)?,
        parse_price(field(columns.close)?)?,
        parse_volume(field(columns.volume)?)?,
    );
    if let Some(offset) = descriptor.price_offset {
        bar = bar.with_price_offset(offset);
    }
    Ok(bar)
}

/// Resolves a vendor-local timestamp to UTC.
///
/// Ambiguous or nonexistent local times (DST folds) are treated as
/// malformed rows rather than resolved arbitrarily, keeping
/// normalization deterministic.
fn parse_timestamp(
    date: &str,
    time: Option<&str>,
    format: &str,
    timezone: chrono_tz::Tz,
) -> Result<DateTime<Utc>, RowError> {
    let combined = match time {
        Some(time) => format!("{date} {time}"),
        None => date.to_string(),
    };

    let naive = NaiveDateTime::parse_from_str(&combined, format)
        .or_else(|_| {
            NaiveDate::parse_from_str(&combined, format)
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|_| RowError::BadTimestamp)?;

    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(..) | LocalResult::None => Err(RowError::BadTimestamp),
    }
}

fn parse_price(raw: &str) -> Result<f64, RowError> {
    let value: f64 = raw.parse().map_err(|_| RowError::BadField)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RowError::BadField)
    }
}

/// Parses a volume field, accepting both integer and integral-float
/// renderings ("1000" and "1000.0").
fn parse_volume(raw: &str) -> Result<u64, RowError> {
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }
    let value: f64 = raw.parse().map_err(|_| RowError::BadField)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(RowError::BadField)
    }
}
