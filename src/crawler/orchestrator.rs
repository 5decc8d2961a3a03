//! Crawl orchestration - recursive descent over a directory index
//!
//! This module contains the recursive folder crawl, including:
//! - Fetching each listing through the retry policy
//! - Turning listing entries into file nodes and subfolder work
//! - Fanning subfolders out to a bounded pool per folder and joining them
//! - Converting every subtree failure into an error folder node
//! - Stopping dispatch when the crawl is interrupted

use crate::config::{Config, CrawlerConfig};
use crate::crawler::extractor::{listing_entries, HtmlListingExtractor, LinkExtractor};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::retry::RetryPolicy;
use crate::crawler::stats::{Counter, CrawlStats, StatsSnapshot};
use crate::tree::{FolderNode, TreeNode};
use crate::url::path_string;
use crate::DirmapError;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use url::Url;

/// How subfolders of a folder are crawled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Subfolders are dispatched to a bounded pool and joined
    Parallel,
    /// Subfolders are crawled one at a time, depth-first
    Sequential,
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => write!(f, "parallel"),
            Self::Sequential => write!(f, "sequential"),
        }
    }
}

/// Tuning for a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Pool size of each folder's subfolder crawls
    pub max_concurrency: usize,
    pub mode: CrawlMode,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

impl CrawlSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            retry: RetryPolicy::new(
                config.max_retries,
                Duration::from_millis(config.retry_delay_ms),
            ),
            max_concurrency: config.max_concurrency.max(1) as usize,
            mode: if config.parallel {
                CrawlMode::Parallel
            } else {
                CrawlMode::Sequential
            },
        }
    }
}

/// Result of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Root folder of the reconstructed tree
    pub tree: TreeNode,
    pub stats: StatsSnapshot,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Directory index crawler
///
/// Cloning is cheap; clones share the fetcher, extractor and interrupt flag.
#[derive(Clone)]
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    settings: CrawlSettings,
    interrupted: Arc<AtomicBool>,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a crawler with the HTTP fetcher and HTML listing extractor
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(DirmapError)` - The HTTP client could not be built
    pub fn from_config(config: &Config) -> Result<Self, DirmapError> {
        let fetcher = HttpFetcher::from_config(&config.user_agent)?;
        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(HtmlListingExtractor),
            CrawlSettings::from_config(&config.crawler),
        ))
    }

    /// Uses `flag` as the interrupt signal instead of a private one
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    /// Flag that stops dispatching new folders once set
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawls the whole tree below `root`
    ///
    /// Failures anywhere in the tree become error folders; the only error
    /// returned is [`DirmapError::Interrupted`], in which case the partial
    /// tree is discarded.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirmap::{Config, Crawler};
    /// use url::Url;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = Crawler::from_config(&Config::default())?;
    /// let report = crawler.crawl(&Url::parse("http://localhost:8080/")?).await?;
    /// println!("{} files", report.stats.files_found);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, root: &Url) -> Result<CrawlReport, DirmapError> {
        let stats = Arc::new(CrawlStats::new());

        tracing::info!(
            "Starting crawl of {} (mode: {}, max concurrency: {})",
            root,
            self.settings.mode,
            self.settings.max_concurrency
        );

        let tree = self
            .crawl_folder(root.clone(), Vec::new(), Arc::clone(&stats))
            .await;

        if self.is_interrupted() {
            tracing::warn!("Crawl of {} interrupted, discarding partial tree", root);
            return Err(DirmapError::Interrupted);
        }

        let report = CrawlReport {
            tree,
            stats: stats.snapshot(),
            started_at: stats.started_at(),
            elapsed: stats.elapsed(),
        };

        tracing::info!(
            "Crawl completed: {} folders, {} files, {} errors in {:?}",
            report.stats.folders_visited,
            report.stats.files_found,
            report.stats.errors_encountered,
            report.elapsed
        );

        Ok(report)
    }

    /// Crawls one folder and everything beneath it
    ///
    /// Always produces a folder node: a folder that cannot be listed, or whose
    /// crawl task fails, becomes an error folder with no children.
    pub async fn crawl_folder(
        &self,
        url: Url,
        path: Vec<String>,
        stats: Arc<CrawlStats>,
    ) -> TreeNode {
        let task = FolderCrawl {
            crawler: self.clone(),
            stats,
        };
        let joined = tokio::spawn(task.clone().visit(url.clone(), path.clone())).await;
        task.settle(&path, &url, joined)
    }
}

/// A subfolder waiting to be crawled
struct Subfolder {
    name: String,
    url: Url,
    path: Vec<String>,
}

/// Per-run crawl state handed to every folder task
#[derive(Clone)]
struct FolderCrawl {
    crawler: Crawler,
    stats: Arc<CrawlStats>,
}

impl FolderCrawl {
    /// Lists `url`, then crawls its subfolders according to the crawl mode
    fn visit(self, url: Url, path: Vec<String>) -> BoxFuture<'static, TreeNode> {
        async move {
            let (mut folder, subfolders) = match self.list_folder(&url, &path).await {
                Ok(listing) => listing,
                Err(error_node) => return error_node,
            };

            match self.crawler.settings.mode {
                CrawlMode::Parallel => self.crawl_parallel(&mut folder, subfolders).await,
                CrawlMode::Sequential => self.crawl_sequential(&mut folder, subfolders).await,
            }

            TreeNode::Folder(folder)
        }
        .boxed()
    }

    /// Fetches and parses one listing
    ///
    /// Files go straight into the returned folder; subfolders are returned as
    /// work. On failure the error folder for `url` is returned instead.
    async fn list_folder(
        &self,
        url: &Url,
        path: &[String],
    ) -> Result<(FolderNode, Vec<Subfolder>), TreeNode> {
        tracing::debug!("Crawling URL: {}", url);

        let settings = &self.crawler.settings;
        let body = match settings
            .retry
            .fetch_with_retry(
                self.crawler.fetcher.as_ref(),
                url,
                settings.timeout,
                &self.crawler.interrupted,
            )
            .await
        {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to fetch {}: {}", url, e);
                return Err(self.error_node(url, e.to_string()));
            }
        };

        let raw = match self.crawler.extractor.extract_entries(&body, url) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Failed to extract entries from {}: {}", url, e);
                return Err(self.error_node(url, e.to_string()));
            }
        };

        self.stats.increment(Counter::FoldersVisited);

        let mut folder = FolderNode {
            url: url.to_string(),
            ..FolderNode::default()
        };
        let mut subfolders = Vec::new();

        for entry in listing_entries(raw, url) {
            if entry.is_folder {
                let mut child_path = path.to_vec();
                child_path.push(entry.name.clone());
                subfolders.push(Subfolder {
                    name: entry.name,
                    url: entry.url,
                    path: child_path,
                });
            } else {
                self.stats.increment(Counter::FilesFound);
                tracing::debug!(
                    "Found file: {} ({})",
                    entry.name,
                    entry.size.as_deref().unwrap_or("unknown size")
                );
                let file = TreeNode::file(entry.url.as_str(), entry.size, entry.modified);
                if folder.insert_child(entry.name, file).is_some() {
                    tracing::debug!("Duplicate entry name in {}, keeping the last one", url);
                }
            }
        }

        Ok((folder, subfolders))
    }

    /// Dispatches subfolders to a pool of `max_concurrency` and joins them all
    ///
    /// Each task holds its permit for its whole subtree. The pool belongs to
    /// this folder only, so nested folders each get their own.
    async fn crawl_parallel(&self, folder: &mut FolderNode, subfolders: Vec<Subfolder>) {
        if subfolders.is_empty() {
            return;
        }

        let pool = Arc::new(Semaphore::new(self.crawler.settings.max_concurrency));
        let mut pending = FuturesUnordered::new();

        for subfolder in subfolders {
            if self.crawler.is_interrupted() {
                tracing::warn!("Interrupted, not dispatching {}", path_string(&subfolder.path));
                break;
            }

            let permit = match Arc::clone(&pool).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!("Cannot dispatch {}: {}", subfolder.url, e);
                    let message = DirmapError::TaskFailed(e.to_string()).to_string();
                    let node = self.error_node(&subfolder.url, message);
                    folder.insert_child(subfolder.name, node);
                    continue;
                }
            };

            // The wait for a permit can outlast an interrupt
            if self.crawler.is_interrupted() {
                drop(permit);
                tracing::warn!("Interrupted, not dispatching {}", path_string(&subfolder.path));
                break;
            }

            tracing::debug!("Dispatching folder: {}", path_string(&subfolder.path));
            let task = self.clone().visit(subfolder.url.clone(), subfolder.path.clone());
            let handle = tokio::spawn(async move {
                let _permit = permit;
                task.await
            });
            pending.push(async move { (subfolder, handle.await) });
        }

        while let Some((subfolder, joined)) = pending.next().await {
            let node = self.settle(&subfolder.path, &subfolder.url, joined);
            folder.insert_child(subfolder.name, node);
        }
    }

    /// Crawls subfolders one after another, depth-first
    async fn crawl_sequential(&self, folder: &mut FolderNode, subfolders: Vec<Subfolder>) {
        for subfolder in subfolders {
            if self.crawler.is_interrupted() {
                tracing::warn!("Interrupted, not crawling {}", path_string(&subfolder.path));
                break;
            }

            tracing::debug!("Crawling folder: {}", path_string(&subfolder.path));
            // Run as its own task so a panicking subtree is contained the same
            // way as in parallel mode; it is awaited before the next one starts.
            let joined = tokio::spawn(
                self.clone()
                    .visit(subfolder.url.clone(), subfolder.path.clone()),
            )
            .await;
            let node = self.settle(&subfolder.path, &subfolder.url, joined);
            folder.insert_child(subfolder.name, node);
        }
    }

    /// Turns a joined folder task into the node stored by its parent
    fn settle(&self, path: &[String], url: &Url, joined: Result<TreeNode, JoinError>) -> TreeNode {
        match joined {
            Ok(node) => {
                if node.is_error() {
                    tracing::info!("Failed folder: {}", path_string(path));
                } else {
                    tracing::info!("Completed folder: {}", path_string(path));
                }
                node
            }
            Err(e) => {
                tracing::error!("Error processing folder {}: {}", path_string(path), e);
                self.error_node(url, DirmapError::TaskFailed(e.to_string()).to_string())
            }
        }
    }

    /// Counts an error and builds the terminal node for `url`
    fn error_node(&self, url: &Url, message: String) -> TreeNode {
        self.stats.increment(Counter::ErrorsEncountered);
        TreeNode::error_folder(url.as_str(), message)
    }
}
