//! Search-page result extraction
//!
//! Finds elements mentioning the handle on a site's search results page,
//! scores them against the handle and keeps the ones above the threshold.

use scraper::{ElementRef, Html};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use sleuth_core::{is_match, similarity, Handle, ScoredResult};

use crate::document::{is_hidden_tag, nearest_link, page_text, raw_text, visible_text};

/// Phrases meaning "no results"; any of them anywhere on the page voids it
pub const NO_RESULTS_PHRASES: &[&str] = &[
    "aucun",
    "no results found",
    "nobody",
    "sorry",
    "banned",
    "incorrect",
    "cannot be found",
    "404",
    "nothing",
];

/// Whether text contains one of the "no results" phrases (case-insensitive)
pub fn has_negative_signal(text: &str) -> bool {
    let lowered = text.to_lowercase();
    NO_RESULTS_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// Extract scored search hits for `handle` from a search results page.
///
/// Hits are sorted by score, best first, with one entry per URL.
pub fn extract_search_results(html: &str, search_url: &str, handle: &Handle) -> Vec<ScoredResult> {
    let document = Html::parse_document(html);

    if has_negative_signal(&page_text(&document)) {
        debug!("Search page {} reports no results", search_url);
        return Vec::new();
    }

    let Ok(base) = Url::parse(search_url) else {
        debug!("Cannot resolve links against {}", search_url);
        return Vec::new();
    };

    let needle = handle.as_str().to_lowercase();
    let mut results: Vec<ScoredResult> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| !is_hidden_tag(el.value().name()))
        .filter(|el| raw_text(*el).to_lowercase().contains(&needle))
        .filter_map(|el| score_candidate(el, &base, handle))
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut seen = HashSet::new();
    results.retain(|r| seen.insert(r.url.clone()));

    debug!("Search page {} yielded {} hits", search_url, results.len());
    results
}

fn score_candidate(element: ElementRef<'_>, base: &Url, handle: &Handle) -> Option<ScoredResult> {
    let href = nearest_link(element)?;
    let url = base.join(href.trim()).ok()?;

    let text = visible_text(element, "");
    let score = similarity(handle.as_str(), &text);
    if !is_match(score) {
        return None;
    }

    Some(ScoredResult::new(url.as_str(), &text, score))
}
