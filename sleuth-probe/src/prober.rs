//! Prober
//!
//! Checks one site for the handle:
//! 1. substitute the handle into the profile pattern and validate the URL
//! 2. fetch it; a 2xx answer is an exact match
//! 3. if the site has a search URL, fetch it and record scored hits
//!
//! Each fetch is attempted once. A transport failure ends the site's probe
//! with whatever was found so far.

use tracing::{debug, warn};

use sleuth_core::{is_valid_url, Handle, ProbeOutcome, ResultAggregator, SiteDefinition};
use sleuth_net::{extract_search_results, FetchedPage, SharedFetcher};

use crate::ProbeError;

/// Probes sites and feeds the aggregator
#[derive(Clone)]
pub struct Prober {
    fetcher: SharedFetcher,
}

impl Prober {
    pub fn new(fetcher: SharedFetcher) -> Self {
        Self { fetcher }
    }

    /// Probe one site, recording matches into `aggregator`.
    ///
    /// Failures are logged here and never returned; the outcome carries
    /// whatever was found before the failure.
    pub async fn probe(
        &self,
        site: &SiteDefinition,
        handle: &Handle,
        aggregator: &ResultAggregator,
    ) -> ProbeOutcome {
        let mut outcome = ProbeOutcome::new(&site.category, &site.name);

        match self.try_probe(site, handle, aggregator, &mut outcome).await {
            Ok(()) => {}
            Err(ProbeError::InvalidTargetUrl(url)) => {
                warn!("Skipping {} - {}: invalid URL {}", site.category, site.name, url);
            }
            Err(e) => {
                warn!("Error while checking {} - {}: {}", site.category, site.name, e);
            }
        }

        outcome
    }

    async fn try_probe(
        &self,
        site: &SiteDefinition,
        handle: &Handle,
        aggregator: &ResultAggregator,
        outcome: &mut ProbeOutcome,
    ) -> Result<(), ProbeError> {
        let exact_url = site.exact_url(handle);
        if !is_valid_url(&exact_url) {
            return Err(ProbeError::InvalidTargetUrl(exact_url));
        }

        let page = self.fetch(&exact_url).await?;
        if page.is_success() {
            if aggregator.record_exact(&site.category, &site.name, &exact_url) {
                debug!("Exact match on {}: {}", site.name, exact_url);
            }
            outcome.exact_match = Some(exact_url);
        } else {
            debug!("{} answered {} for {}", site.name, page.status, exact_url);
        }

        let Some(search_url) = site.search_url_for(handle) else {
            return Ok(());
        };

        let page = self.fetch(&search_url).await?;
        if !page.is_success() {
            debug!("{} search answered {}", site.name, page.status);
            return Ok(());
        }

        let hits = extract_search_results(&page.body, &search_url, handle);
        for hit in &hits {
            if aggregator.record_search(&site.category, &site.name, hit.clone()) {
                debug!("Search hit on {}: {} ({:.2})", site.name, hit.url, hit.score);
            }
        }
        outcome.search_matches = hits;

        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, ProbeError> {
        Ok(self.fetcher.fetch(url).await?)
    }
}
