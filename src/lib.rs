//! dirmap: a directory-index tree mapper
//!
//! This crate crawls auto-generated HTTP directory listings (Apache/nginx style),
//! rebuilds the remote folder/file hierarchy as a tree, and reports crawl statistics.

pub mod config;
pub mod crawler;
pub mod output;
pub mod tree;
pub mod url;

use thiserror::Error;

/// Main error type for dirmap operations
#[derive(Debug, Error)]
pub enum DirmapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl task failed: {0}")]
    TaskFailed(String),

    #[error("Crawl interrupted")]
    Interrupted,
}

/// Classified failure of a single page fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Timeout")]
    Timeout,

    #[error("Request error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),
}

impl FetchError {
    /// Timeouts and transport failures may succeed on a later attempt;
    /// HTTP status errors are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Transport(_))
    }
}

/// Link extraction errors
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error("Failed to parse listing at {url}: {message}")]
    Parse { url: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for dirmap operations
pub type Result<T> = std::result::Result<T, DirmapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Crawler, StatsSnapshot};
pub use tree::TreeNode;
