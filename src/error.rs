use thiserror::Error;

/// Errors that can occur while serving a request from the upstream repository
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Upstream {url} returned {status}: {message}")]
    UpstreamStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Rate limited by upstream: {message}")]
    RateLimited { message: String },

    #[error("Invalid listing: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no download url for index.html")]
    MissingIndex,

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, ProxyError>;
