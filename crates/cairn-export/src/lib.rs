//! Chunked export for cairn.
//!
//! This crate turns a timeline into consumable artifacts:
//!
//! - [`export`] - pure split into ordered chunks plus a [`Manifest`]
//! - [`write_to_dir`] - `{TICKER}_{TIMEFRAME}/chunk_{N}.json` layout
//!   with a `meta.json` manifest

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/cairnstore/cairn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod exporter;
mod writer;

pub use exporter::{ChunkedExport, Manifest, export};
pub use writer::{ExportError, write_to_dir};
