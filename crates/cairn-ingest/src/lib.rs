//! Vendor file normalization for cairn.
//!
//! This crate turns one raw vendor export into canonical bars:
//!
//! - [`SourceDescriptor`] - declarative per-vendor layout, timezone, and
//!   bar-label convention
//! - [`normalize`] - streaming conversion of one file into UTC
//!   open-labeled [`cairn_types::Bar`]s plus an [`IngestReport`]

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/cairnstore/cairn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod adapter;
mod descriptor;

pub use adapter::{BarStream, IngestError, IngestReport, normalize};
pub use descriptor::{BarLabel, ColumnLayout, SourceDescriptor};
