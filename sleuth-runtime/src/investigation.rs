//! Investigation Coordinator
//!
//! Runs one handle through the whole pipeline:
//! - Probe every registry site, at most `max_concurrent` at a time
//! - Wait for every probe to finish (the only barrier)
//! - Resolve linked accounts and extract identities from the frozen exact
//!   matches, both passes running concurrently

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use sleuth_core::{
    AggregatedState, Handle, IdentityMap, LinkedAccountMap, ProbeOutcome, ResultAggregator,
    SiteRegistry, DEFAULT_MAX_CONCURRENT,
};
use sleuth_net::{HttpConfig, HttpFetcher, SharedFetcher};
use sleuth_probe::{IdentityExtractor, LinkedAccountResolver, Prober};

/// Investigation configuration
#[derive(Debug, Clone)]
pub struct InvestigationConfig {
    /// Maximum sites probed at once (and matches re-fetched at once)
    pub max_concurrent: usize,
    /// Run the linked-account pass
    pub resolve_links: bool,
    /// Run the identity pass
    pub extract_identity: bool,
}

impl Default for InvestigationConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            resolve_links: true,
            extract_identity: true,
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub sites_probed: usize,
    pub sites_with_hits: usize,
    pub exact_matches: usize,
    pub search_matches: usize,
    pub elapsed_ms: u128,
}

/// Everything an investigation found
#[derive(Debug, Clone, Serialize)]
pub struct InvestigationReport {
    pub handle: Handle,
    pub results: AggregatedState,
    pub linked_accounts: LinkedAccountMap,
    pub identities: IdentityMap,
    pub stats: RunStats,
}

/// Probes a registry for a handle and correlates the matches
pub struct Investigation {
    registry: Arc<SiteRegistry>,
    fetcher: SharedFetcher,
    config: InvestigationConfig,
}

impl Investigation {
    pub fn new(registry: Arc<SiteRegistry>, fetcher: SharedFetcher, config: InvestigationConfig) -> Self {
        Self {
            registry,
            fetcher,
            config,
        }
    }

    /// Load the registry at `registry_path` and fetch over HTTP
    pub fn from_registry_path(
        registry_path: impl AsRef<Path>,
        http: &HttpConfig,
        config: InvestigationConfig,
    ) -> Result<Self, anyhow::Error> {
        let registry = SiteRegistry::load(registry_path)?;
        let fetcher = HttpFetcher::shared(http)?;
        Ok(Self::new(Arc::new(registry), fetcher, config))
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// Run the investigation. Per-site failures are logged, never returned.
    pub async fn run(&self, handle: &Handle) -> InvestigationReport {
        let start = Instant::now();
        let max_concurrent = self.config.max_concurrent.max(1);

        info!(
            "Probing {} sites for '{}' ({} at a time)",
            self.registry.len(),
            handle,
            max_concurrent
        );

        let aggregator = ResultAggregator::new();
        let prober = Prober::new(self.fetcher.clone());

        let outcomes: Vec<ProbeOutcome> = stream::iter(self.registry.iter())
            .map(|site| prober.probe(site, handle, &aggregator))
            .buffer_unordered(max_concurrent)
            .collect()
            .await;

        // Every probe has completed; results are frozen from here on
        let results = aggregator.into_state();
        let exact_matches = results.exact_matches();

        info!(
            "Probing done: {} exact, {} search matches",
            results.exact_count(),
            results.search_count()
        );

        let links = async {
            if !self.config.resolve_links || exact_matches.is_empty() {
                return LinkedAccountMap::new();
            }
            LinkedAccountResolver::new(self.fetcher.clone())
                .with_max_concurrent(max_concurrent)
                .resolve(&exact_matches, &self.registry, handle)
                .await
        };

        let identities = async {
            if !self.config.extract_identity || exact_matches.is_empty() {
                return IdentityMap::new();
            }
            IdentityExtractor::new(self.fetcher.clone())
                .with_max_concurrent(max_concurrent)
                .extract(&exact_matches)
                .await
        };

        let (linked_accounts, identities) = tokio::join!(links, identities);

        let stats = RunStats {
            sites_probed: outcomes.len(),
            sites_with_hits: outcomes.iter().filter(|o| !o.is_empty()).count(),
            exact_matches: results.exact_count(),
            search_matches: results.search_count(),
            elapsed_ms: start.elapsed().as_millis(),
        };

        info!(
            "Investigation of '{}' finished in {} ms",
            handle, stats.elapsed_ms
        );

        InvestigationReport {
            handle: handle.clone(),
            results,
            linked_accounts,
            identities,
            stats,
        }
    }
}
