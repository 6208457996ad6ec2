//! The fetch capability
//!
//! Probing only needs "GET this URL and give me status and body", plus the
//! peer address of the connection when the transport can report it.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use sleuth_core::parse_absolute_url;

use crate::{create_client, HttpConfig, NetError};

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,
    /// HTTP status code of the final response
    pub status: u16,
    pub body: String,
    /// Remote IP of the connection, if the transport exposes it
    pub peer_address: Option<String>,
}

impl FetchedPage {
    /// Whether the response counts as "found" (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Peer address, or `None` when the transport gave no introspection
    pub fn peer_address(&self) -> Option<&str> {
        self.peer_address.as_deref()
    }
}

/// Something that can GET a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL once. Non-2xx statuses are returned as pages, not errors.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, NetError>;
}

/// Shared fetcher handle
pub type SharedFetcher = Arc<dyn Fetcher>;

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, NetError> {
        Ok(Self {
            client: create_client(config)?,
        })
    }

    pub fn shared(config: &HttpConfig) -> Result<SharedFetcher, NetError> {
        Ok(Arc::new(Self::new(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, NetError> {
        if parse_absolute_url(url).is_none() {
            return Err(NetError::InvalidUrl(url.to_string()));
        }

        debug!("Fetching: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let peer_address = response.remote_addr().map(|addr| addr.ip().to_string());
        let body = response.text().await?;

        debug!("{} -> {} ({} bytes)", url, status, body.len());

        Ok(FetchedPage {
            url: url.to_string(),
            status,
            body,
            peer_address,
        })
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    body: String,
    peer_address: Option<String>,
}

/// In-memory fetcher serving canned pages.
///
/// Unknown URLs fail with [`NetError::Connection`]. Every request is counted,
/// so callers can check how often a URL was fetched.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, CannedResponse>,
    requests: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with `status` for `url`
    pub fn page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            CannedResponse {
                status,
                body: body.to_string(),
                peer_address: None,
            },
        );
        self
    }

    /// Report `addr` as the peer address for `url` (which must already be served)
    pub fn peer(mut self, url: &str, addr: &str) -> Self {
        if let Some(response) = self.pages.get_mut(url) {
            response.peer_address = Some(addr.to_string());
        }
        self
    }

    /// How many times `url` was requested
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().get(url).copied().unwrap_or(0)
    }

    /// Total number of requests served or refused
    pub fn total_requests(&self) -> usize {
        self.requests.lock().values().sum()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, NetError> {
        *self.requests.lock().entry(url.to_string()).or_default() += 1;

        let response = self
            .pages
            .get(url)
            .ok_or_else(|| NetError::Connection(format!("no route to {}", url)))?;

        Ok(FetchedPage {
            url: url.to_string(),
            status: response.status,
            body: response.body.clone(),
            peer_address: response.peer_address.clone(),
        })
    }
}
