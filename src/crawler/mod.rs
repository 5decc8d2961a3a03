//! Crawler module for directory index traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeouts and retry
//! - Link extraction and size/date heuristics for listing pages
//! - Thread-safe crawl statistics
//! - Recursive, bounded-parallel crawl orchestration

mod extractor;
mod fetcher;
mod hints;
mod orchestrator;
mod retry;
mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use extractor::{listing_entries, HtmlListingExtractor, LinkExtractor, ListingEntry, RawEntry};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use hints::{modified_hint, size_hint};
pub use orchestrator::{CrawlMode, CrawlReport, CrawlSettings, Crawler};
pub use retry::{RetryDecision, RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
pub use stats::{Counter, CrawlStats, StatsSnapshot};

use crate::config::Config;
use crate::DirmapError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use url::Url;

/// Runs a complete crawl of the configured base URL
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client from the user agent settings
/// 2. Crawl the tree below `crawler.base-url`
/// 3. Return the tree together with the final statistics
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `interrupted` - Set to stop dispatching new folders
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed; failed folders are error nodes
/// * `Err(DirmapError)` - Setup failed or the crawl was interrupted
pub async fn crawl(
    config: &Config,
    interrupted: Arc<AtomicBool>,
) -> Result<CrawlReport, DirmapError> {
    let root = Url::parse(&config.crawler.base_url)?;
    let crawler = Crawler::from_config(config)?.with_interrupt_flag(interrupted);
    crawler.crawl(&root).await
}
