//! Linked-account resolution
//!
//! Re-fetches every confirmed profile page and follows its outbound links one
//! hop. A link counts as a linked account when:
//! - it points to a different host than the page it was found on
//! - the handle is a whole segment of its path (`/users/alice/posts`, not `/users/malice`)
//! - its host matches the profile host of a registry site (first site in registry order wins)

use futures::stream::{self, StreamExt};
use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use sleuth_core::{host_key, ExactMatch, Handle, LinkedAccountMap, SiteRegistry, DEFAULT_MAX_CONCURRENT};
use sleuth_net::{extract_links, SharedFetcher};

use crate::ProbeError;

/// Finds accounts on other registry sites linked from confirmed profiles
#[derive(Clone)]
pub struct LinkedAccountResolver {
    fetcher: SharedFetcher,
    max_concurrent: usize,
}

impl LinkedAccountResolver {
    pub fn new(fetcher: SharedFetcher) -> Self {
        Self {
            fetcher,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Resolve linked accounts for every exact match.
    ///
    /// A match whose page cannot be fetched is logged and skipped.
    pub async fn resolve(
        &self,
        exact_matches: &[ExactMatch],
        registry: &SiteRegistry,
        handle: &Handle,
    ) -> LinkedAccountMap {
        let found: Vec<Vec<(String, String)>> = stream::iter(exact_matches)
            .map(|m| async move {
                match self.links_for_match(m, registry, handle).await {
                    Ok(links) => links,
                    Err(e) => {
                        warn!("Linked account lookup failed for {}: {}", m.site_name, e);
                        Vec::new()
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut linked = LinkedAccountMap::new();
        for (site_name, url) in found.into_iter().flatten() {
            linked.entry(site_name).or_default().insert(url);
        }

        info!(
            "Found {} linked URLs across {} sites",
            linked.values().map(|urls| urls.len()).sum::<usize>(),
            linked.len()
        );
        linked
    }

    async fn links_for_match(
        &self,
        exact: &ExactMatch,
        registry: &SiteRegistry,
        handle: &Handle,
    ) -> Result<Vec<(String, String)>, ProbeError> {
        let page = self.fetcher.fetch(&exact.url).await?;
        if !page.is_success() {
            return Err(ProbeError::Status {
                url: exact.url.clone(),
                status: page.status,
            });
        }

        let links = linked_accounts_in_page(&page.body, &exact.url, registry, handle)?;
        debug!("{} links to {} registry profiles", exact.site_name, links.len());
        Ok(links)
    }
}

/// Linked `(site_name, url)` pairs found in one profile page
pub fn linked_accounts_in_page(
    html: &str,
    page_url: &str,
    registry: &SiteRegistry,
    handle: &Handle,
) -> Result<Vec<(String, String)>, ProbeError> {
    let base = Url::parse(page_url).map_err(|e| ProbeError::Parse(format!("{}: {}", page_url, e)))?;
    let base_host = host_key(&base);

    let document = Html::parse_document(html);
    let linked = extract_links(&document, &base)
        .into_iter()
        .filter_map(|link| {
            let host = host_key(&link)?;
            if Some(&host) == base_host.as_ref() || !has_handle_segment(&link, handle) {
                return None;
            }
            let site = registry.site_for_host(&host, handle)?;
            Some((site.name.clone(), link.to_string()))
        })
        .collect();

    Ok(linked)
}

/// Whether the handle is a whole segment of the URL path (case-insensitive).
/// Segments are percent-decoded first, so `jos%C3%A9` matches `josé`.
pub fn has_handle_segment(url: &Url, handle: &Handle) -> bool {
    let needle = handle.as_str().to_lowercase();
    let Some(mut segments) = url.path_segments() else {
        return false;
    };
    segments.any(|segment| {
        let decoded = urlencoding::decode_binary(segment.as_bytes());
        String::from_utf8_lossy(&decoded).to_lowercase() == needle
    })
}
