//! Sleuth Net - fetching and HTML extraction
//!
//! Provides the network-facing half of probing:
//! - The [`Fetcher`] capability with reqwest-backed and in-memory implementations
//! - Client configuration (timeout, browser User-Agent, optional proxy)
//! - HTML helpers: visible text, links, tag+class queries
//! - Search-page hit extraction with the "no results" short-circuit

pub mod client;
pub mod document;
pub mod fetch;
pub mod search;

pub use client::*;
pub use document::*;
pub use fetch::*;
pub use search::*;
