//! HTTP client configuration
//!
//! Builds reqwest clients with a fixed timeout, a browser-like User-Agent and
//! optional proxy routing (e.g. `socks5h://127.0.0.1:9050` for Tor).

use reqwest::{Client, Proxy};
use std::time::Duration;
use thiserror::Error;

use sleuth_core::DEFAULT_TIMEOUT_SECS;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Fixed User-Agent; a random browser one is picked when unset
    pub user_agent: Option<String>,
    /// Proxy URL applied to every request
    pub proxy: Option<String>,
    /// Accept self-signed or otherwise invalid certificates
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            proxy: None,
            accept_invalid_certs: false,
        }
    }
}

impl HttpConfig {
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_proxy(mut self, proxy: &str) -> Self {
        self.proxy = Some(proxy.to_string());
        self
    }
}

/// Errors from fetching
#[derive(Debug, Error)]
pub enum NetError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:137.0) Gecko/20100101 Firefox/137.0",
];

/// Get a random user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Create an HTTP client from configuration
pub fn create_client(config: &HttpConfig) -> Result<Client, NetError> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| random_user_agent().to_string());

    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(user_agent)
        .danger_accept_invalid_certs(config.accept_invalid_certs);

    if let Some(proxy) = &config.proxy {
        let proxy = Proxy::all(proxy).map_err(|e| NetError::ClientBuild(e.to_string()))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| NetError::ClientBuild(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.proxy.is_none());
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_random_user_agent() {
        let ua = random_user_agent();
        assert!(ua.contains("Mozilla"));
    }

    #[test]
    fn test_create_client() {
        assert!(create_client(&HttpConfig::default()).is_ok());
        let proxied = HttpConfig::default().with_proxy("socks5h://127.0.0.1:9050");
        assert!(create_client(&proxied).is_ok());
    }
}
