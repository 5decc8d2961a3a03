//! Statistics reports for crawls and exported trees
//!
//! This module renders the end-of-crawl statistics and the counts
//! recomputed from a previously exported tree file.

use crate::crawler::StatsSnapshot;
use crate::output::load_tree;
use crate::tree::TreeNode;
use crate::DirmapError;
use std::fmt::Write;
use std::path::Path;
use std::time::Duration;

/// Counts recomputed from an exported tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStatistics {
    /// URL of the root folder
    pub root_url: String,

    /// Folders that were listed successfully
    pub folders: u64,

    pub files: u64,

    /// Folders recorded with an error
    pub errors: u64,

    /// Error of the root folder, if the crawl failed at the root
    pub root_error: Option<String>,
}

impl TreeStatistics {
    pub fn from_tree(tree: &TreeNode) -> Self {
        let counts = tree.counts();
        Self {
            root_url: tree.url().to_string(),
            folders: counts.folders,
            files: counts.files,
            errors: counts.errors,
            root_error: tree.error().map(str::to_string),
        }
    }
}

/// Loads an exported tree and computes its statistics
///
/// # Arguments
///
/// * `path` - Path of the tree JSON file
///
/// # Returns
///
/// * `Ok(TreeStatistics)` - Successfully loaded statistics
/// * `Err(DirmapError)` - The file could not be read or parsed
pub fn load_statistics(path: &Path) -> Result<TreeStatistics, DirmapError> {
    let tree = load_tree(path)?;
    Ok(TreeStatistics::from_tree(&tree))
}

/// Renders the end-of-crawl statistics report
pub fn format_statistics(stats: &StatsSnapshot, elapsed: Duration) -> String {
    let mut report = String::new();

    let _ = writeln!(report, "=== Crawl Statistics ===\n");
    let _ = writeln!(report, "  Folders: {}", stats.folders_visited);
    let _ = writeln!(report, "  Files: {}", stats.files_found);
    let _ = writeln!(report, "  Errors: {}", stats.errors_encountered);
    let _ = writeln!(report, "  Time: {:.2} seconds", elapsed.as_secs_f64());

    if let Some(per_folder) = stats.seconds_per_folder(elapsed) {
        let _ = writeln!(report, "  Speed: {:.2} sec/folder", per_folder);
    }

    report
}

/// Prints the end-of-crawl statistics to stdout
///
/// # Arguments
///
/// * `stats` - Final counter values
/// * `elapsed` - Wall-clock duration of the crawl
pub fn print_statistics(stats: &StatsSnapshot, elapsed: Duration) {
    print!("{}", format_statistics(stats, elapsed));
}

/// Renders the statistics of an exported tree
pub fn format_tree_statistics(stats: &TreeStatistics) -> String {
    let mut report = String::new();

    let _ = writeln!(report, "=== Tree Statistics ===\n");
    let _ = writeln!(report, "Root: {}", stats.root_url);
    let _ = writeln!(report, "  Folders: {}", stats.folders);
    let _ = writeln!(report, "  Files: {}", stats.files);
    let _ = writeln!(report, "  Errors: {}", stats.errors);

    if let Some(error) = &stats.root_error {
        let _ = writeln!(report, "\nThe root folder could not be listed: {}", error);
    }

    report
}

pub fn print_tree_statistics(stats: &TreeStatistics) {
    print!("{}", format_tree_statistics(stats));
}
