//! Site definitions and the queried handle
//!
//! A site definition carries URL patterns containing [`SUBSTITUTION_TOKEN`],
//! which is replaced with the handle at probe time.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::CoreError;

/// Literal token replaced with the handle in URL patterns
pub const SUBSTITUTION_TOKEN: &str = "$pseudo";

/// The handle under investigation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Create a handle, trimming surrounding whitespace
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyHandle);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute this handle into a URL pattern
    pub fn substitute(&self, pattern: &str) -> String {
        pattern.replace(SUBSTITUTION_TOKEN, &self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single site entry from the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDefinition {
    /// Registry category (e.g. "social", "forums")
    pub category: String,
    /// Human-readable site name
    pub name: String,
    /// Profile URL pattern containing the substitution token
    pub url_pattern: String,
    /// Optional search URL pattern containing the substitution token
    pub search_url: Option<String>,
}

impl SiteDefinition {
    pub fn new(category: &str, name: &str, url_pattern: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            url_pattern: url_pattern.to_string(),
            search_url: None,
        }
    }

    pub fn with_search_url(mut self, search_url: &str) -> Self {
        self.search_url = Some(search_url.to_string()).filter(|s| !s.trim().is_empty());
        self
    }

    /// Profile URL for a handle (not validated)
    pub fn exact_url(&self, handle: &Handle) -> String {
        handle.substitute(&self.url_pattern)
    }

    /// Search URL for a handle, if this site has one
    pub fn search_url_for(&self, handle: &Handle) -> Option<String> {
        self.search_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| handle.substitute(s))
    }

    /// Network location of this site's profile URL for a handle
    pub fn host_for(&self, handle: &Handle) -> Option<String> {
        parse_absolute_url(&self.exact_url(handle)).and_then(|u| host_key(&u))
    }
}

/// Parse a URL, accepting it only if it has both a scheme and a host
pub fn parse_absolute_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    if url.scheme().is_empty() || url.host_str().map_or(true, str::is_empty) {
        return None;
    }
    Some(url)
}

/// Whether a string is a well-formed absolute URL
pub fn is_valid_url(raw: &str) -> bool {
    parse_absolute_url(raw).is_some()
}

/// Lowercased `host[:port]` of a URL, used for host comparisons
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_trims_and_rejects_empty() {
        assert_eq!(Handle::new("  alice ").unwrap().as_str(), "alice");
        assert!(matches!(Handle::new("   "), Err(CoreError::EmptyHandle)));
    }

    #[test]
    fn test_substitution() {
        let handle = Handle::new("alice").unwrap();
        let site = SiteDefinition::new("social", "ExampleSite", "https://example.com/$pseudo")
            .with_search_url("https://example.com/search?q=$pseudo");

        assert_eq!(site.exact_url(&handle), "https://example.com/alice");
        assert_eq!(
            site.search_url_for(&handle).as_deref(),
            Some("https://example.com/search?q=alice")
        );
    }

    #[test]
    fn test_empty_search_url_is_none() {
        let handle = Handle::new("alice").unwrap();
        let site = SiteDefinition::new("social", "ExampleSite", "https://example.com/$pseudo")
            .with_search_url("");
        assert!(site.search_url.is_none());
        assert!(site.search_url_for(&handle).is_none());
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://example.com/alice"));
        assert!(!is_valid_url("example.com/alice"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("mailto:alice@example.com"));
    }

    #[test]
    fn test_host_key() {
        let url = Url::parse("https://Example.COM:8443/alice").unwrap();
        assert_eq!(host_key(&url).as_deref(), Some("example.com:8443"));

        let handle = Handle::new("alice").unwrap();
        let site = SiteDefinition::new("dev", "Sub", "https://$pseudo.example.org/");
        assert_eq!(site.host_for(&handle).as_deref(), Some("alice.example.org"));
    }
}
