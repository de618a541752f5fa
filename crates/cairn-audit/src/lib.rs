//! Continuity auditing for cairn.
//!
//! This crate provides [`audit`], a read-only scan over a timeline:
//!
//! - [`Gap`] - a timestamp delta exceeding the configured threshold
//! - [`AuditError`] - duplicate or out-of-order timestamps, which the
//!   store's invariants should make impossible

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/cairnstore/cairn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod auditor;

pub use auditor::{AuditError, Gap, audit};
