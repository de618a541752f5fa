//! Declarative per-vendor source configuration.

use std::fs;
use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::IngestError;

/// Which end of the interval a vendor's timestamps label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BarLabel {
    /// Timestamp denotes the start of the bar's interval (canonical).
    #[default]
    Open,
    /// Timestamp denotes the end of the bar's interval; normalization
    /// shifts it backward by one granularity unit.
    Close,
}

/// Zero-based column indices for the fields of one vendor layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// Date column (or combined date-time column).
    pub date: usize,
    /// Separate time-of-day column, if the vendor splits date and time.
    #[serde(default)]
    pub time: Option<usize>,
    /// Open price column.
    pub open: usize,
    /// High price column.
    pub high: usize,
    /// Low price column.
    pub low: usize,
    /// Close price column.
    pub close: usize,
    /// Volume column.
    pub volume: usize,
}

impl ColumnLayout {
    /// Returns the minimum record width this layout requires.
    #[must_use]
    pub fn required_width(&self) -> usize {
        let mut max = self
            .date
            .max(self.open)
            .max(self.high)
            .max(self.low)
            .max(self.close)
            .max(self.volume);
        if let Some(t) = self.time {
            max = max.max(t);
        }
        max + 1
    }
}

/// Declarative description of one vendor's export format.
///
/// One descriptor per vendor replaces per-file branching on vendor
/// quirks; the adapter dispatches on the descriptor and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Vendor name, for reporting only.
    pub vendor: String,
    /// Field delimiter (must be a single ASCII character).
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Whether the file starts with a header row.
    #[serde(default)]
    pub has_header: bool,
    /// Column indices for each field.
    pub columns: ColumnLayout,
    /// strftime format for the (combined) timestamp field. When a
    /// separate time column is declared, date and time are joined with
    /// a single space before parsing. A date-only format yields
    /// midnight in the source timezone.
    pub timestamp_format: String,
    /// IANA timezone the vendor's timestamps are expressed in.
    pub timezone: Tz,
    /// Bar-labeling convention of the vendor's timestamps.
    #[serde(default)]
    pub bar_label: BarLabel,
    /// Fixed offset added to open/high/low/close for contract-roll
    /// continuity. Never applied to timestamps.
    #[serde(default)]
    pub price_offset: Option<f64>,
}

const fn default_delimiter() -> char {
    ','
}

impl SourceDescriptor {
    /// Loads a descriptor from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// descriptor declares a non-ASCII delimiter.
    pub fn from_json_file(path: &Path) -> Result<Self, IngestError> {
        let raw = fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let descriptor: Self =
            serde_json::from_str(&raw).map_err(|source| IngestError::Descriptor {
                path: path.to_path_buf(),
                source,
            })?;
        descriptor.validate(path)?;
        Ok(descriptor)
    }

    /// Checks descriptor-level requirements that serde cannot express.
    fn validate(&self, path: &Path) -> Result<(), IngestError> {
        if !self.delimiter.is_ascii() {
            return Err(IngestError::Schema {
                path: path.to_path_buf(),
                reason: format!("delimiter '{}' is not a single ASCII character", self.delimiter),
            });
        }
        if self.timestamp_format.is_empty() {
            return Err(IngestError::Schema {
                path: path.to_path_buf(),
                reason: "timestamp_format is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the delimiter as the byte the CSV reader expects.
    #[must_use]
    pub const fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ColumnLayout {
        ColumnLayout {
            date: 0,
            time: Some(1),
            open: 2,
            high: 3,
            low: 4,
            close: 5,
            volume: 6,
        }
    }

    #[test]
    fn test_required_width() {
        assert_eq!(layout().required_width(), 7);

        let compact = ColumnLayout {
            date: 0,
            time: None,
            open: 1,
            high: 2,
            low: 3,
            close: 4,
            volume: 5,
        };
        assert_eq!(compact.required_width(), 6);
    }

    #[test]
    fn test_descriptor_json_roundtrip() {
        let json = r#"{
            "vendor": "acme",
            "delimiter": ";",
            "has_header": true,
            "columns": {"date": 0, "time": 1, "open": 2, "high": 3, "low": 4, "close": 5, "volume": 6},
            "timestamp_format": "%Y-%m-%d %H:%M",
            "timezone": "America/Chicago",
            "bar_label": "close",
            "price_offset": 1.25
        }"#;
        let descriptor: SourceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.delimiter, ';');
        assert_eq!(descriptor.bar_label, BarLabel::Close);
        assert_eq!(descriptor.timezone, chrono_tz::America::Chicago);
        assert_eq!(descriptor.price_offset, Some(1.25));

        let back = serde_json::to_string(&descriptor).unwrap();
        let reparsed: SourceDescriptor = serde_json::from_str(&back).unwrap();
        assert_eq!(reparsed, descriptor);
    }

    #[test]
    fn test_defaults() {
        let json = r#"{
            "vendor": "plain",
            "columns": {"date": 0, "open": 1, "high": 2, "low": 3, "close": 4, "volume": 5},
            "timestamp_format": "%Y-%m-%d",
            "timezone": "UTC"
        }"#;
        let descriptor: SourceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.delimiter, ',');
        assert!(!descriptor.has_header);
        assert_eq!(descriptor.bar_label, BarLabel::Open);
        assert_eq!(descriptor.price_offset, None);
        assert_eq!(descriptor.columns.time, None);
    }
}
