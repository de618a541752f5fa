//! Canonical, deduplicated, multi-timeframe OHLCV bar store.
//!
//! This is a facade crate that re-exports functionality from the cairn
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use cairn_lib::prelude::*;
//! use std::num::NonZeroUsize;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let descriptor = SourceDescriptor::from_json_file("vendor.json".as_ref())?;
//!     let key = SeriesKey::new("ES", Timeframe::Minute1);
//!
//!     let mut store = Store::open("data", key.clone())?;
//!     let bars = normalize("export.csv".as_ref(), &descriptor, key.timeframe())?;
//!     let report = store.merge(bars);
//!     store.persist()?;
//!     println!("added {}, updated {}", report.added, report.updated);
//!
//!     let chunked = export(store.timeline(), &key, NonZeroUsize::new(500).unwrap());
//!     write_to_dir(&chunked, "exports".as_ref())?;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/cairnstore/cairn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use cairn_types::*;

// Re-export ingestion
#[cfg(feature = "ingest")]
pub use cairn_ingest::{
    BarLabel, BarStream, ColumnLayout, IngestError, IngestReport, SourceDescriptor, normalize,
};

// Re-export storage
#[cfg(feature = "store")]
pub use cairn_store::{MergeReport, Store, StoreError, StoreState, merge_bars};

// Re-export resampling
#[cfg(feature = "resample")]
pub use cairn_resample::derive;

// Re-export auditing
#[cfg(feature = "audit")]
pub use cairn_audit::{AuditError, Gap, audit};

// Re-export export
#[cfg(feature = "export")]
pub use cairn_export::{ChunkedExport, ExportError, Manifest, export, write_to_dir};

/// Prelude module for convenient imports.
///
/// ```
/// use cairn_lib::prelude::*;
/// ```
pub mod prelude {
    pub use cairn_types::{Bar, InvariantError, SeriesKey, Timeframe, Timeline};

    #[cfg(feature = "ingest")]
    pub use cairn_ingest::{BarLabel, IngestReport, SourceDescriptor, normalize};

    #[cfg(feature = "store")]
    pub use cairn_store::{MergeReport, Store, StoreState, merge_bars};

    #[cfg(feature = "resample")]
    pub use cairn_resample::derive;

    #[cfg(feature = "audit")]
    pub use cairn_audit::{Gap, audit};

    #[cfg(feature = "export")]
    pub use cairn_export::{Manifest, export, write_to_dir};
}
