//! Export directory layout and JSON artifact writing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::ChunkedExport;

/// Errors that can occur writing an export directory.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Failed to create the export directory.
    #[error("failed to create export directory '{path}': {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write an artifact file.
    #[error("failed to write '{path}': {source}")]
    WriteFile {
        /// The file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to serialize an artifact.
    #[error("failed to serialize '{path}': {source}")]
    Serialize {
        /// The file being produced.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Failed to remove a stale chunk from a previous, larger export.
    #[error("failed to remove stale chunk '{path}': {source}")]
    RemoveStale {
        /// The stale file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Manifest file name within an export directory.
pub const MANIFEST_FILE: &str = "meta.json";

/// Writes an export as `{root}/{TICKER}_{TIMEFRAME}/chunk_{N}.json`
/// plus `meta.json`, returning the export directory path.
///
/// Ascending `N` is ascending time (chunk 0 oldest). Each file is
/// staged to a temporary sibling and renamed into place. Chunk files
/// left over from a previous export with more chunks are removed so
/// the directory always matches the manifest.
///
/// # Errors
///
/// Returns an error on any directory, serialization, or file failure.
pub fn write_to_dir(export: &ChunkedExport<'_>, root: &Path) -> Result<PathBuf, ExportError> {
    let dir = root.join(export.manifest.dir_name());
    fs::create_dir_all(&dir).map_err(|source| ExportError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    for (index, chunk) in export.chunks.iter().enumerate() {
        write_json(&dir, &chunk_file_name(index), chunk)?;
    }
    remove_stale_chunks(&dir, export.manifest.num_chunks)?;
    write_json(&dir, MANIFEST_FILE, &export.manifest)?;

    Ok(dir)
}

/// Returns the file name of chunk `index`.
#[must_use]
pub fn chunk_file_name(index: usize) -> String {
    format!("chunk_{index}.json")
}

/// Stages `value` as JSON to a temporary file in `dir`, then renames it
/// to `name`.
fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<(), ExportError> {
    let path = dir.join(name);
    let staged = tempfile::NamedTempFile::new_in(dir).map_err(|source| ExportError::WriteFile {
        path: path.clone(),
        source,
    })?;
    serde_json::to_writer(staged.as_file(), value).map_err(|source| ExportError::Serialize {
        path: path.clone(),
        source,
    })?;
    staged.persist(&path).map_err(|e| ExportError::WriteFile {
        path,
        source: e.error,
    })?;
    Ok(())
}

/// Removes every `chunk_{i}.json` with `i >= num_chunks`.
///
/// A full directory scan, so a hole left by a damaged earlier export
/// never shields higher-numbered stale chunks from cleanup.
fn remove_stale_chunks(dir: &Path, num_chunks: usize) -> Result<(), ExportError> {
    let entries = fs::read_dir(dir).map_err(|source| ExportError::RemoveStale {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ExportError::RemoveStale {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if chunk_index(&path).is_some_and(|index| index >= num_chunks) {
            fs::remove_file(&path).map_err(|source| ExportError::RemoveStale { path, source })?;
        }
    }
    Ok(())
}

/// Parses the index out of a `chunk_{i}.json` path; `None` for any
/// other file.
fn chunk_index(path: &Path) -> Option<usize> {
    path.file_name()?
        .to_str()?
        .strip_prefix("chunk_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export;
    use cairn_types::{Bar, SeriesKey, Timeframe, Timeline};
    use chrono::{TimeZone, Utc};
    use std::num::NonZeroUsize;

    fn timeline_of(n: u32) -> Timeline {
        Timeline::from_bars((0..n).map(|i| {
            let ts = Utc.with_ymd_and_hms(2024, 1, 2, 9, i, 0).unwrap();
            Bar::new(ts, 100.0, 101.0, 99.0, 100.5, u64::from(i))
        }))
    }

    fn key() -> SeriesKey {
        SeriesKey::new("AAPL", Timeframe::Minute1)
    }

    #[test]
    fn test_write_layout() {
        let dir = tempfile::tempdir().unwrap();
        let timeline = timeline_of(25);
        let chunked = export(&timeline, &key(), NonZeroUsize::new(10).unwrap());

        let out = write_to_dir(&chunked, dir.path()).unwrap();
        assert_eq!(out, dir.path().join("AAPL_m1"));
        assert!(out.join("chunk_0.json").exists());
        assert!(out.join("chunk_1.json").exists());
        assert!(out.join("chunk_2.json").exists());
        assert!(!out.join("chunk_3.json").exists());
        assert!(out.join("meta.json").exists());
    }

    #[test]
    fn test_manifest_and_chunks_agree_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let timeline = timeline_of(25);
        let chunked = export(&timeline, &key(), NonZeroUsize::new(10).unwrap());
        let out = write_to_dir(&chunked, dir.path()).unwrap();

        let manifest: crate::Manifest =
            serde_json::from_str(&std::fs::read_to_string(out.join("meta.json")).unwrap())
                .unwrap();
        assert_eq!(manifest, chunked.manifest);

        let mut rebuilt = Vec::new();
        for i in 0..manifest.num_chunks {
            let chunk: Vec<Bar> = serde_json::from_str(
                &std::fs::read_to_string(out.join(chunk_file_name(i))).unwrap(),
            )
            .unwrap();
            rebuilt.extend(chunk);
        }
        assert_eq!(rebuilt, timeline.bars());
    }

    #[test]
    fn test_reexport_removes_stale_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let timeline = timeline_of(25);

        let fine = export(&timeline, &key(), NonZeroUsize::new(5).unwrap());
        let out = write_to_dir(&fine, dir.path()).unwrap();
        assert!(out.join("chunk_4.json").exists());

        let coarse = export(&timeline, &key(), NonZeroUsize::new(10).unwrap());
        write_to_dir(&coarse, dir.path()).unwrap();
        assert!(out.join("chunk_2.json").exists());
        assert!(!out.join("chunk_3.json").exists());
        assert!(!out.join("chunk_4.json").exists());
    }

    #[test]
    fn test_stale_chunks_removed_past_a_hole() {
        let dir = tempfile::tempdir().unwrap();
        let timeline = timeline_of(25);

        let fine = export(&timeline, &key(), NonZeroUsize::new(5).unwrap());
        let out = write_to_dir(&fine, dir.path()).unwrap();
        // a hole in the stale range must not shield chunk_4
        std::fs::remove_file(out.join("chunk_3.json")).unwrap();

        let coarse = export(&timeline, &key(), NonZeroUsize::new(10).unwrap());
        write_to_dir(&coarse, dir.path()).unwrap();
        assert!(out.join("chunk_2.json").exists());
        assert!(!out.join("chunk_3.json").exists());
        assert!(!out.join("chunk_4.json").exists());
    }
}
