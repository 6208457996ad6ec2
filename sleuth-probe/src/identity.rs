//! Identity snapshot extraction
//!
//! Fetches each confirmed profile page once, keeps the peer address of the
//! connection when the transport reports it, and fills profile fields from a
//! small rule table (field -> tags -> class markers).

use futures::stream::{self, StreamExt};
use scraper::Html;
use tracing::{debug, info, warn};

use sleuth_core::{ExactMatch, IdentityMap, IdentitySnapshot, DEFAULT_MAX_CONCURRENT};
use sleuth_net::{DocumentQuery, FetchedPage, SharedFetcher};

use crate::ProbeError;

/// Profile fields that can be extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    RealName,
    Location,
    Bio,
}

/// Where to look for one profile field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: ProfileField,
    /// Element tags that may carry the field
    pub tags: &'static [&'static str],
    /// Class markers, tried in order
    pub markers: &'static [&'static str],
}

const PROFILE_TAGS: &[&str] = &["h1", "h2", "h3", "p"];

/// Default extraction rules
pub const PROFILE_RULES: &[FieldRule] = &[
    FieldRule {
        field: ProfileField::RealName,
        tags: PROFILE_TAGS,
        markers: &["name", "p-name"],
    },
    FieldRule {
        field: ProfileField::Location,
        tags: PROFILE_TAGS,
        markers: &["location", "p-locality"],
    },
    FieldRule {
        field: ProfileField::Bio,
        tags: PROFILE_TAGS,
        markers: &["bio", "p-note"],
    },
];

/// Fill `snapshot` from `document` using `rules`. Existing values are kept.
pub fn apply_rules(document: &impl DocumentQuery, rules: &[FieldRule], snapshot: &mut IdentitySnapshot) {
    for rule in rules {
        let slot = match rule.field {
            ProfileField::RealName => &mut snapshot.real_name,
            ProfileField::Location => &mut snapshot.location,
            ProfileField::Bio => &mut snapshot.bio,
        };
        if slot.is_some() {
            continue;
        }
        *slot = rule
            .markers
            .iter()
            .find_map(|marker| document.first_text(rule.tags, marker));
    }
}

/// Build a snapshot from a fetched profile page
pub fn snapshot_from_page(page: &FetchedPage, rules: &[FieldRule]) -> IdentitySnapshot {
    let mut snapshot = IdentitySnapshot {
        peer_address: page.peer_address().map(str::to_string),
        ..Default::default()
    };
    let document = Html::parse_document(&page.body);
    apply_rules(&document, rules, &mut snapshot);
    snapshot
}

/// Extracts identity snapshots from confirmed profile pages
#[derive(Clone)]
pub struct IdentityExtractor {
    fetcher: SharedFetcher,
    max_concurrent: usize,
}

impl IdentityExtractor {
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

    /// One snapshot per exact match, keyed by site name.
    ///
    /// Matches whose page cannot be fetched get no entry at all.
    pub async fn extract(&self, exact_matches: &[ExactMatch]) -> IdentityMap {
        let snapshots: Vec<Option<(String, IdentitySnapshot)>> = stream::iter(exact_matches)
            .map(|m| async move {
                match self.snapshot_for(m).await {
                    Ok(snapshot) => Some((m.site_name.clone(), snapshot)),
                    Err(e) => {
                        warn!("Identity lookup failed for {}: {}", m.site_name, e);
                        None
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let identities: IdentityMap = snapshots.into_iter().flatten().collect();
        info!("Extracted {} identity snapshots", identities.len());
        identities
    }

    async fn snapshot_for(&self, exact: &ExactMatch) -> Result<IdentitySnapshot, ProbeError> {
        let page = self.fetcher.fetch(&exact.url).await?;
        let snapshot = snapshot_from_page(&page, PROFILE_RULES);

        if snapshot.peer_address.is_none() {
            debug!("No peer address available for {}", exact.url);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleuth_net::StaticFetcher;
    use std::sync::Arc;

    /// Document stand-in: `(tag, class, text)` in document order
    struct FakeDocument(Vec<(&'static str, &'static str, &'static str)>);

    impl DocumentQuery for FakeDocument {
        fn first_text(&self, tags: &[&str], class: &str) -> Option<String> {
            self.0
                .iter()
                .find(|(tag, marker, _)| tags.contains(tag) && *marker == class)
                .map(|(_, _, text)| text.to_string())
        }
    }

    const PROFILE_PAGE: &str = r#"
        <html><body>
            <h1 class="name">Alice Liddell</h1>
            <p class="location">Oxford</p>
            <p class="bio">Follows white rabbits.</p>
            <p class="bio">Second bio paragraph.</p>
        </body></html>
    "#;

    fn exact(site_name: &str, url: &str) -> ExactMatch {
        ExactMatch {
            category: "social".to_string(),
            site_name: site_name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_rules_against_fake_document() {
        let document = FakeDocument(vec![
            ("h2", "p-name", "Alice L."),
            ("p", "location", "Oxford"),
            ("div", "bio", "ignored: div is not a profile tag"),
        ]);
        let mut snapshot = IdentitySnapshot::default();
        apply_rules(&document, PROFILE_RULES, &mut snapshot);

        assert_eq!(snapshot.real_name.as_deref(), Some("Alice L."));
        assert_eq!(snapshot.location.as_deref(), Some("Oxford"));
        assert_eq!(snapshot.bio, None);
    }

    #[test]
    fn test_first_match_wins() {
        let page = FetchedPage {
            url: "https://example.com/alice".to_string(),
            status: 200,
            body: PROFILE_PAGE.to_string(),
            peer_address: None,
        };
        let snapshot = snapshot_from_page(&page, PROFILE_RULES);

        assert_eq!(snapshot.real_name.as_deref(), Some("Alice Liddell"));
        assert_eq!(snapshot.location.as_deref(), Some("Oxford"));
        assert_eq!(snapshot.bio.as_deref(), Some("Follows white rabbits."));
        assert!(snapshot.peer_address.is_none());
    }

    #[tokio::test]
    async fn test_extract_with_peer_and_failures() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .page("https://example.com/alice", 200, PROFILE_PAGE)
                .peer("https://example.com/alice", "93.184.216.34")
                .page("https://bare.example/alice", 200, "<p>nothing here</p>"),
        );
        let extractor = IdentityExtractor::new(fetcher).with_max_concurrent(2);

        let matches = vec![
            exact("ExampleSite", "https://example.com/alice"),
            exact("Bare", "https://bare.example/alice"),
            exact("Down", "https://down.example/alice"),
        ];
        let identities = extractor.extract(&matches).await;

        assert_eq!(identities.len(), 2);
        assert!(!identities.contains_key("Down"));

        let example = &identities["ExampleSite"];
        assert_eq!(example.peer_address.as_deref(), Some("93.184.216.34"));
        assert_eq!(example.real_name.as_deref(), Some("Alice Liddell"));

        let bare = &identities["Bare"];
        assert!(bare.peer_address.is_none());
        assert!(!bare.has_profile_fields());
    }
}
