//! Site registry
//!
//! Loads the ordered list of site definitions from a JSON or TOML document
//! shaped as `{ "<category>": [ { name, url_pattern, search_url? }, ... ] }`.
//! Category and entry order follow the file and are preserved.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::{is_valid_url, CoreError, Handle, SiteDefinition};

/// Raw entry as written in the registry file
#[derive(Debug, Clone, Deserialize)]
struct SiteEntry {
    name: String,
    url_pattern: String,
    #[serde(default)]
    search_url: Option<String>,
}

/// Ordered, read-only collection of site definitions
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: Vec<SiteDefinition>,
}

impl SiteRegistry {
    pub fn new(sites: Vec<SiteDefinition>) -> Self {
        Self { sites }
    }

    /// Load a registry file, choosing the format by extension (`.toml` or JSON)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let registry = if is_toml {
            Self::from_toml_str(&contents)?
        } else {
            Self::from_json_str(&contents)?
        };

        info!("Loaded {} sites from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// Parse a JSON registry document
    pub fn from_json_str(contents: &str) -> Result<Self, CoreError> {
        let document: serde_json::Map<String, serde_json::Value> = serde_json::from_str(contents)?;

        let mut sites = Vec::new();
        for (category, entries) in document {
            let entries: Vec<SiteEntry> = serde_json::from_value(entries)?;
            sites.extend(entries.into_iter().map(|e| e.into_definition(&category)));
        }

        Self::non_empty(sites)
    }

    /// Parse a TOML registry document
    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let document: toml::Table = contents.parse()?;

        let mut sites = Vec::new();
        for (category, entries) in document {
            let entries: Vec<SiteEntry> = entries.try_into()?;
            sites.extend(entries.into_iter().map(|e| e.into_definition(&category)));
        }

        Self::non_empty(sites)
    }

    fn non_empty(sites: Vec<SiteDefinition>) -> Result<Self, CoreError> {
        if sites.is_empty() {
            return Err(CoreError::EmptyRegistry);
        }
        debug!("Registry parsed with {} entries", sites.len());
        Ok(Self { sites })
    }

    pub fn sites(&self) -> &[SiteDefinition] {
        &self.sites
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiteDefinition> {
        self.sites.iter()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Number of sites per category, in category order
    pub fn category_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for site in &self.sites {
            match counts.iter_mut().find(|(c, _)| *c == site.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((&site.category, 1)),
            }
        }
        counts
    }

    /// Sites whose substituted profile URL is not a well-formed absolute URL
    pub fn invalid_sites(&self, handle: &Handle) -> Vec<&SiteDefinition> {
        self.sites
            .iter()
            .filter(|s| !is_valid_url(&s.exact_url(handle)))
            .collect()
    }

    /// Name of the first site whose profile host (handle substituted) equals `host`.
    ///
    /// Registry order is the tie-break when several sites share a host.
    pub fn site_for_host(&self, host: &str, handle: &Handle) -> Option<&SiteDefinition> {
        self.sites
            .iter()
            .find(|site| site.host_for(handle).as_deref() == Some(host))
    }
}

impl SiteEntry {
    fn into_definition(self, category: &str) -> SiteDefinition {
        let definition = SiteDefinition::new(category, &self.name, &self.url_pattern);
        match self.search_url {
            Some(search_url) => definition.with_search_url(&search_url),
            None => definition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const JSON: &str = r#"{
        "social": [
            {"name": "ExampleSite", "url_pattern": "https://example.com/$pseudo", "search_url": ""},
            {"name": "Other", "url_pattern": "https://other.net/u/$pseudo", "search_url": "https://other.net/search?q=$pseudo"}
        ],
        "code": [
            {"name": "Forge", "url_pattern": "https://forge.dev/$pseudo"},
            {"name": "ForgeMirror", "url_pattern": "https://forge.dev/mirror/$pseudo"}
        ]
    }"#;

    #[test]
    fn test_json_preserves_order() {
        let registry = SiteRegistry::from_json_str(JSON).unwrap();
        let names: Vec<_> = registry.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["ExampleSite", "Other", "Forge", "ForgeMirror"]);
        assert_eq!(registry.sites()[0].category, "social");
        assert!(registry.sites()[0].search_url.is_none());
        assert!(registry.sites()[1].search_url.is_some());
        assert_eq!(registry.category_counts(), vec![("social", 2), ("code", 2)]);
    }

    #[test]
    fn test_toml_registry() {
        let toml = r#"
            [[forums]]
            name = "Board"
            url_pattern = "https://board.example/member/$pseudo"

            [[forums]]
            name = "Chat"
            url_pattern = "https://chat.example/@$pseudo"
            search_url = "https://chat.example/find?q=$pseudo"
        "#;
        let registry = SiteRegistry::from_toml_str(toml).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.sites()[1].name, "Chat");
        assert_eq!(registry.sites()[1].category, "forums");
    }

    #[test]
    fn test_empty_registry_is_error() {
        assert!(matches!(
            SiteRegistry::from_json_str("{}"),
            Err(CoreError::EmptyRegistry)
        ));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(SiteRegistry::from_json_str("{\"social\": [{\"name\": 1}]}").is_err());
    }

    #[test]
    fn test_site_for_host_first_wins() {
        let registry = SiteRegistry::from_json_str(JSON).unwrap();
        let handle = Handle::new("alice").unwrap();
        let site = registry.site_for_host("forge.dev", &handle).unwrap();
        assert_eq!(site.name, "Forge");
        assert!(registry.site_for_host("unknown.org", &handle).is_none());
    }

    #[test]
    fn test_invalid_sites() {
        let registry = SiteRegistry::new(vec![
            SiteDefinition::new("x", "Good", "https://good.example/$pseudo"),
            SiteDefinition::new("x", "Bad", "good.example/$pseudo"),
        ]);
        let handle = Handle::new("alice").unwrap();
        let invalid = registry.invalid_sites(&handle);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].name, "Bad");
    }

    #[test]
    fn test_load_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(JSON.as_bytes()).unwrap();
        let registry = SiteRegistry::load(file.path()).unwrap();
        assert_eq!(registry.len(), 4);

        let missing = SiteRegistry::load("/definitely/not/here.json");
        assert!(matches!(missing, Err(CoreError::Io { .. })));
    }
}
