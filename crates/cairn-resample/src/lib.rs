//! Higher-timeframe derivation for cairn.
//!
//! This crate provides [`derive`], the deterministic window aggregation
//! that turns a base [`cairn_types::Timeline`] into a coarser one.

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/cairnstore/cairn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod resampler;

pub use resampler::derive;
