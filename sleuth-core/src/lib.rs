//! Sleuth Core - domain model for handle investigation
//!
//! This crate provides:
//! - Site definitions, the queried handle and the site registry
//! - Similarity scoring for fuzzy search hits
//! - The deduplicating result aggregator shared by concurrent probes
//! - Result types for linked accounts and identity snapshots

pub mod aggregator;
pub mod error;
pub mod registry;
pub mod results;
pub mod similarity;
pub mod site;

pub use aggregator::*;
pub use error::*;
pub use registry::*;
pub use results::*;
pub use similarity::*;
pub use site::*;

/// Default number of sites probed concurrently
pub const DEFAULT_MAX_CONCURRENT: usize = 20;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
