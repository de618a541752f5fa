//! Canonical bar storage for cairn.
//!
//! This crate owns the per-(ticker, timeframe) timeline:
//!
//! - [`Store`] - load / merge / persist state machine over one series
//! - [`merge_bars`] - the pure last-write-wins merge underneath it
//! - Columnar persistence as Parquet with atomic rename semantics

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/cairnstore/cairn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod store;
mod timeline_io;

pub use store::{MergeReport, Store, StoreError, StoreState, merge_bars};
