//! Sleuth Probe
//!
//! The three passes of an investigation:
//! - **Prober**: checks one site's profile URL and search page for the handle
//! - **LinkedAccountResolver**: follows outbound links on confirmed profiles to other registry sites
//! - **IdentityExtractor**: pulls peer address and profile fields from confirmed profiles

pub mod error;
pub mod identity;
pub mod linker;
pub mod prober;

pub use error::*;
pub use identity::*;
pub use linker::*;
pub use prober::*;
