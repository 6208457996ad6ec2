//! Result types produced by probing and correlation

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A fuzzy search hit with its similarity to the handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Absolute URL of the hit
    pub url: String,
    /// Visible text the score was computed from
    pub matched_text: String,
    /// Similarity in `[0, 1]`
    pub score: f64,
}

impl ScoredResult {
    pub fn new(url: &str, matched_text: &str, score: f64) -> Self {
        Self {
            url: url.to_string(),
            matched_text: matched_text.to_string(),
            score: score.clamp(0.0, 1.0),
        }
    }

    /// Score as a percentage, for reporting
    pub fn percent(&self) -> f64 {
        self.score * 100.0
    }
}

/// What probing one site found
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub category: String,
    pub site_name: String,
    /// Profile URL, when it answered with success
    pub exact_match: Option<String>,
    /// Accepted search hits, best first
    pub search_matches: Vec<ScoredResult>,
}

impl ProbeOutcome {
    pub fn new(category: &str, site_name: &str) -> Self {
        Self {
            category: category.to_string(),
            site_name: site_name.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exact_match.is_none() && self.search_matches.is_empty()
    }
}

/// A confirmed profile URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactMatch {
    pub category: String,
    pub site_name: String,
    pub url: String,
}

/// A recorded search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub site_name: String,
    pub result: ScoredResult,
}

/// Site name -> outbound profile URLs found on confirmed pages
pub type LinkedAccountMap = BTreeMap<String, BTreeSet<String>>;

/// Best-effort profile details for a confirmed match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    /// Peer address of the connection that served the page
    pub peer_address: Option<String>,
    pub real_name: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

impl IdentitySnapshot {
    /// Whether any profile field (not counting the peer address) was found
    pub fn has_profile_fields(&self) -> bool {
        self.real_name.is_some() || self.location.is_some() || self.bio.is_some()
    }
}

/// Site name -> identity snapshot
pub type IdentityMap = BTreeMap<String, IdentitySnapshot>;
