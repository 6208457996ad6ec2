//! Sleuth Runtime - investigation orchestration

pub mod investigation;

pub use investigation::*;
