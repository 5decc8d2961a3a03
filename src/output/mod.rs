//! Output module for crawl results
//!
//! This module handles:
//! - Exporting the crawled tree as pretty-printed JSON
//! - Re-importing a previously exported tree
//! - Printing crawl and tree statistics

pub mod stats;

pub use stats::{
    format_statistics, format_tree_statistics, load_statistics, print_statistics,
    print_tree_statistics, TreeStatistics,
};

use crate::tree::TreeNode;
use crate::DirmapError;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes the tree to `path` as pretty-printed UTF-8 JSON
///
/// Parent directories are created as needed. Non-ASCII names are written
/// verbatim rather than escaped.
///
/// # Arguments
///
/// * `tree` - Root of the tree to export
/// * `path` - Destination file, overwritten if it exists
///
/// # Returns
///
/// * `Ok(())` - Tree written
/// * `Err(DirmapError)` - Failed to create or write the file
pub fn save_tree(tree: &TreeNode, path: &Path) -> Result<(), DirmapError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, tree)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Tree saved to {}", path.display());
    Ok(())
}

/// Reads a tree previously written by [`save_tree`]
///
/// # Returns
///
/// * `Ok(TreeNode)` - The re-imported tree
/// * `Err(DirmapError)` - The file is missing or not a valid tree export
pub fn load_tree(path: &Path) -> Result<TreeNode, DirmapError> {
    let reader = BufReader::new(File::open(path)?);
    let tree = serde_json::from_reader(reader)?;
    tracing::debug!("Tree loaded from {}", path.display());
    Ok(tree)
}
