use thiserror::Error;

/// Errors from registry loading and input validation
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Failed to read registry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON registry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML registry: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Registry contains no sites")]
    EmptyRegistry,

    #[error("Handle must not be empty")]
    EmptyHandle,
}
