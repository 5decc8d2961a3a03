use crate::config::types::Config;
use crate::config::validation::{normalize, validate};
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Missing sections and keys fall back to their defaults. The base URL is
/// normalized to end with a slash before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use dirmap::config::load_config;
///
/// let config = load_config(Path::new("dirmap.toml")).unwrap();
/// println!("Crawling: {}", config.crawler.base_url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(content)?;
    normalize(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration, writing the defaults to `path` first if it does not exist
///
/// # Returns
///
/// * `Ok((Config, true))` - The file was missing and has been created
/// * `Ok((Config, false))` - The existing file was loaded
/// * `Err(ConfigError)` - Failed to read, write, parse, or validate
pub fn load_or_create_config(path: &Path) -> Result<(Config, bool), ConfigError> {
    if path.exists() {
        return Ok((load_config(path)?, false));
    }

    let config = Config::default();
    write_config(&config, path)?;
    tracing::info!("Created default config file: {}", path.display());
    Ok((config, true))
}

/// Loads the configuration if `path` exists, otherwise uses the defaults
///
/// Never writes to disk, for commands that only read.
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!("No config file at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

/// Serializes a configuration to a TOML file
pub fn write_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
