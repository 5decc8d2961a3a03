//! Crawl statistics shared by all concurrent folder crawls

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Counters tracked during a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    FoldersVisited,
    FilesFound,
    ErrorsEncountered,
}

/// Point-in-time copy of the crawl counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub folders_visited: u64,
    pub files_found: u64,
    pub errors_encountered: u64,
}

impl StatsSnapshot {
    /// Average time per visited folder, if any folder was visited
    pub fn seconds_per_folder(&self, elapsed: Duration) -> Option<f64> {
        if self.folders_visited == 0 {
            None
        } else {
            Some(elapsed.as_secs_f64() / self.folders_visited as f64)
        }
    }
}

/// Thread-safe crawl statistics
///
/// One instance lives for a single crawl run. All counters sit behind one
/// lock so a snapshot never mixes values from different moments.
#[derive(Debug)]
pub struct CrawlStats {
    counters: Mutex<StatsSnapshot>,
    started_at: DateTime<Utc>,
    start: Instant,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStats {
    /// Creates zeroed counters and records the crawl start
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(StatsSnapshot::default()),
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }

    pub fn increment(&self, counter: Counter) {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        match counter {
            Counter::FoldersVisited => counters.folders_visited += 1,
            Counter::FilesFound => counters.files_found += 1,
            Counter::ErrorsEncountered => counters.errors_encountered += 1,
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        *self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wall-clock time the crawl started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
