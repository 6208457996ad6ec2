use sleuth_net::NetError;
use thiserror::Error;

/// Errors from probing a single site or match. Never escapes a per-site task.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Invalid target URL: {0}")]
    InvalidTargetUrl(String),

    #[error("Transport failure: {0}")]
    Transport(#[from] NetError),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Unexpected document: {0}")]
    Parse(String),
}
