use crate::config::types::Config;
use crate::config::validation::{normalize, validate};
use crate::ConfigError;

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub tree_path: Option<String>,
    pub max_concurrency: Option<u32>,
    pub max_retries: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub sequential: bool,
}

impl Config {
    /// Applies command-line overrides and re-validates the result
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(url) = &overrides.base_url {
            self.crawler.base_url = url.clone();
        }
        if let Some(path) = &overrides.tree_path {
            self.output.tree_path = path.clone();
        }
        if let Some(threads) = overrides.max_concurrency {
            self.crawler.max_concurrency = threads;
        }
        if let Some(retries) = overrides.max_retries {
            self.crawler.max_retries = retries;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.crawler.timeout_secs = timeout;
        }
        if overrides.sequential {
            self.crawler.parallel = false;
        }

        normalize(self);
        validate(self)
    }
}
