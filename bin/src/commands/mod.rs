//! CLI command implementations.

pub(crate) mod audit;
pub(crate) mod export;
pub(crate) mod info;
pub(crate) mod ingest;
