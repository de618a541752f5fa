//! Core types for the cairn canonical bar store.
//!
//! This crate provides the fundamental data structures used throughout cairn:
//!
//! - [`Bar`] - A single OHLCV bar with a canonical UTC open-time timestamp
//! - [`Timeframe`] - Bar granularity and window alignment
//! - [`SeriesKey`] - Explicit (ticker, timeframe) addressing for every series
//! - [`Timeline`] - Ordered, deduplicated sequence of bars for one series

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/cairnstore/cairn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod error;
mod series;
mod timeframe;
mod timeline;

pub use bar::Bar;
pub use error::InvariantError;
pub use series::SeriesKey;
pub use timeframe::{Timeframe, TimeframeParseError};
pub use timeline::Timeline;
