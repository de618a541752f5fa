//! Per-series store: load, merge, atomic persist.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use cairn_types::{Bar, SeriesKey, Timeline};

use crate::timeline_io;

/// Errors that can occur loading or persisting a store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create the store directory.
    #[error("failed to create store directory '{path}': {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to open or read the canonical file.
    #[error("failed to read store file '{path}': {source}")]
    ReadFile {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failure during the atomic write; the prior persisted state is
    /// untouched and the store remains dirty, so the caller can retry.
    #[error("failed to persist store file '{path}': {source}")]
    Persist {
        /// The canonical path being replaced.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Arrow/Parquet encode or decode failure.
    #[error("columnar format error: {0}")]
    Columnar(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of one merge batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    /// Bars inserted at previously absent timestamps.
    pub added: usize,
    /// Bars that overwrote an existing timestamp (last-write-wins).
    pub updated: usize,
    /// Bars rejected for violating the OHLCV invariants.
    pub rejected: usize,
}

/// Lifecycle of a store instance.
///
/// `Empty -(open with no file)-> Empty`, `-(open with file)-> Loaded`,
/// `-(merge/replace)-> Dirty`, `-(persist ok)-> Persisted`. A failed
/// persist leaves the instance `Dirty`; retrying is safe because merge
/// is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No canonical file exists yet and nothing has been merged.
    Empty,
    /// The canonical file has been loaded and not modified since.
    Loaded,
    /// In-memory timeline differs from the persisted file.
    Dirty,
    /// In-memory timeline matches the persisted file.
    Persisted,
}

/// Owns the canonical timeline for one (ticker, timeframe).
///
/// Canonical path: `{root}/{TICKER}_{TIMEFRAME}.parquet`. The timeline
/// is mutated only through [`Store::merge`] (or replaced wholesale via
/// [`Store::replace`]) and written back with [`Store::persist`], which
/// stages the full file beside the canonical path and atomically
/// renames it into place — a concurrent reader sees either the
/// pre-merge or post-merge file, never an intermediate state.
///
/// Writers are single-per-series by contract: concurrent merges on the
/// same series must be serialized externally. Stores for distinct
/// series share no state and may be driven fully in parallel.
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    key: SeriesKey,
    timeline: Timeline,
    state: StoreState,
}

impl Store {
    /// File extension of canonical store files.
    pub const EXTENSION: &'static str = "parquet";

    /// Opens the store for one series, loading the canonical file if it
    /// exists. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created or an
    /// existing canonical file cannot be read.
    pub fn open(root: impl Into<PathBuf>, key: SeriesKey) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::CreateDir {
            path: root.clone(),
            source,
        })?;

        let path = canonical_path(&root, &key);
        let (timeline, state) = if path.exists() {
            let file = File::open(&path).map_err(|source| StoreError::ReadFile {
                path: path.clone(),
                source,
            })?;
            (timeline_io::read_parquet(file)?, StoreState::Loaded)
        } else {
            (Timeline::new(), StoreState::Empty)
        };

        Ok(Self {
            root,
            key,
            timeline,
            state,
        })
    }

    /// Returns the canonical file path for this series.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        canonical_path(&self.root, &self.key)
    }

    /// Returns the series key.
    #[must_use]
    pub const fn key(&self) -> &SeriesKey {
        &self.key
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> StoreState {
        self.state
    }

    /// Returns the current in-memory timeline.
    #[must_use]
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Merges a batch of bars into the timeline (last-write-wins on
    /// timestamp) and marks the store dirty.
    ///
    /// Invariant-violating bars are rejected and counted; they never
    /// abort the batch. Re-merging the same batch is idempotent, which
    /// makes re-ingesting a corrected vendor export a safe correction
    /// mechanism.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = Bar>) -> MergeReport {
        let (merged, report) = merge_bars(&self.timeline, incoming);
        self.timeline = merged;
        self.state = StoreState::Dirty;
        report
    }

    /// Replaces the timeline wholesale (purge + reimport, or writing a
    /// freshly derived series) and marks the store dirty.
    pub fn replace(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        self.state = StoreState::Dirty;
    }

    /// Atomically writes the full timeline to the canonical path.
    ///
    /// The file is staged as a temporary sibling and renamed over the
    /// canonical path, so a crash mid-write leaves the prior version
    /// intact.
    ///
    /// # Errors
    ///
    /// On failure the store stays dirty and the caller may retry.
    pub fn persist(&mut self) -> Result<()> {
        let path = self.path();
        let staged =
            tempfile::NamedTempFile::new_in(&self.root).map_err(|source| StoreError::Persist {
                path: path.clone(),
                source,
            })?;
        timeline_io::write_parquet(&self.timeline, staged.as_file())?;
        staged.persist(&path).map_err(|e| StoreError::Persist {
            path: path.clone(),
            source: e.error,
        })?;
        self.state = StoreState::Persisted;
        Ok(())
    }
}

/// Builds the canonical `{TICKER}_{TIMEFRAME}.parquet` path.
fn canonical_path(root: &Path, key: &SeriesKey) -> PathBuf {
    root.join(format!("{}.{}", key.file_stem(), Store::EXTENSION))
}

/// Merges a batch of bars into an existing timeline.
///
/// The result is seeded from `existing` as a map keyed by timestamp;
/// each valid incoming bar inserts (absent key) or overwrites (present
/// key). Uniqueness and ordering are structural — no separate dedup or
/// sort pass exists to get out of sync.
#[must_use]
pub fn merge_bars(
    existing: &Timeline,
    incoming: impl IntoIterator<Item = Bar>,
) -> (Timeline, MergeReport) {
    let mut map: BTreeMap<DateTime<Utc>, Bar> =
        existing.iter().map(|b| (b.timestamp, *b)).collect();
    let mut report = MergeReport::default();

    for bar in incoming {
        if bar.validate().is_err() {
            report.rejected += 1;
            continue;
        }
        match map.entry(bar.timestamp) {
            Entry::Vacant(entry) => {
                entry.insert(bar);
                report.added += 1;
            }
            Entry::Occupied(mut entry) => {
                entry.insert(bar);
                report.updated += 1;
            }
        }
    }

    (Timeline::from_bars(map.into_values()), report)
}
