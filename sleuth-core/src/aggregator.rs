//! Deduplicating result store shared by concurrent probes
//!
//! All mutation goes through [`ResultAggregator::record_exact`] and
//! [`ResultAggregator::record_search`], each of which performs the membership
//! check and the insertion under a single lock acquisition.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::{ExactMatch, ScoredResult, SearchMatch};

/// Matches recorded for one category, in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryResults {
    /// `(site_name, url)`
    pub exact: Vec<(String, String)>,
    pub search: Vec<SearchMatch>,
}

impl CategoryResults {
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.search.is_empty()
    }
}

/// Everything recorded during a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedState {
    pub categories: BTreeMap<String, CategoryResults>,
    #[serde(skip)]
    seen_exact_urls: HashSet<String>,
    #[serde(skip)]
    seen_search_urls: HashSet<String>,
}

impl AggregatedState {
    /// All confirmed profile URLs, flattened across categories
    pub fn exact_matches(&self) -> Vec<ExactMatch> {
        self.categories
            .iter()
            .flat_map(|(category, results)| {
                results.exact.iter().map(move |(site_name, url)| ExactMatch {
                    category: category.clone(),
                    site_name: site_name.clone(),
                    url: url.clone(),
                })
            })
            .collect()
    }

    pub fn exact_count(&self) -> usize {
        self.categories.values().map(|c| c.exact.len()).sum()
    }

    pub fn search_count(&self) -> usize {
        self.categories.values().map(|c| c.search.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(CategoryResults::is_empty)
    }
}

/// Thread-safe, deduplicating store of exact and search matches
#[derive(Debug, Default)]
pub struct ResultAggregator {
    state: Mutex<AggregatedState>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed profile URL. Returns `false` if the URL was already recorded.
    pub fn record_exact(&self, category: &str, site_name: &str, url: &str) -> bool {
        let mut state = self.state.lock();
        if !state.seen_exact_urls.insert(url.to_string()) {
            return false;
        }
        state
            .categories
            .entry(category.to_string())
            .or_default()
            .exact
            .push((site_name.to_string(), url.to_string()));
        true
    }

    /// Record a search hit, keyed by its URL. Returns `false` if the URL was already recorded.
    pub fn record_search(&self, category: &str, site_name: &str, result: ScoredResult) -> bool {
        let mut state = self.state.lock();
        if !state.seen_search_urls.insert(result.url.clone()) {
            return false;
        }
        state
            .categories
            .entry(category.to_string())
            .or_default()
            .search
            .push(SearchMatch {
                site_name: site_name.to_string(),
                result,
            });
        true
    }

    /// Copy of the current state. Call once all probes have completed.
    pub fn snapshot(&self) -> AggregatedState {
        self.state.lock().clone()
    }

    /// Consume the aggregator, yielding its final state
    pub fn into_state(self) -> AggregatedState {
        self.state.into_inner()
    }
}
