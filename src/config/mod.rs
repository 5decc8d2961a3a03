//! Configuration module for dirmap
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and layering command-line overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use dirmap::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("dirmap.toml")).unwrap();
//! println!("Crawler will use {} workers per folder", config.crawler.max_concurrency);
//! ```

mod overrides;
mod parser;
mod types;
mod validation;

// Re-export types
pub use overrides::ConfigOverrides;
pub use types::{Config, CrawlerConfig, LoggingConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    load_config, load_config_or_default, load_or_create_config, parse_config, write_config,
};
