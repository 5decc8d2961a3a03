//! Tree node definitions for the reconstructed directory hierarchy
//!
//! The serialized form is the export format:
//!
//! ```json
//! {
//!   "type": "folder",
//!   "url": "http://example.com/files/",
//!   "children": {
//!     "a.txt": { "type": "file", "url": "...", "size": "10 MB", "last_modified": null }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of the reconstructed tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Folder(FolderNode),
    File(FileNode),
}

/// A folder listing and everything beneath it
///
/// A folder with `error` set represents a subtree that could not be crawled;
/// its `children` are always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub url: String,

    /// Entries keyed by decoded name; sorted so exports are deterministic
    #[serde(default)]
    pub children: BTreeMap<String, TreeNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A file entry with the raw hints shown by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub url: String,

    /// Size text as listed (e.g. "1.4 GB"), unit not normalized
    #[serde(default)]
    pub size: Option<String>,

    /// Modification time text as listed, format not normalized
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// Aggregate counts over a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeCounts {
    /// Folders that were listed successfully
    pub folders: u64,
    pub files: u64,
    /// Folders that carry an error
    pub errors: u64,
}

impl TreeNode {
    /// Creates an empty, successfully listed folder
    pub fn folder(url: impl Into<String>) -> Self {
        Self::Folder(FolderNode {
            url: url.into(),
            children: BTreeMap::new(),
            error: None,
        })
    }

    /// Creates a terminal folder for a subtree that failed
    pub fn error_folder(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Folder(FolderNode {
            url: url.into(),
            children: BTreeMap::new(),
            error: Some(error.into()),
        })
    }

    /// Creates a file entry
    pub fn file(url: impl Into<String>, size: Option<String>, last_modified: Option<String>) -> Self {
        Self::File(FileNode {
            url: url.into(),
            size,
            last_modified,
        })
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.url,
            Self::File(file) => &file.url,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Returns true for folders that carry an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Folder(FolderNode { error: Some(_), .. }))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Folder(folder) => folder.error.as_deref(),
            Self::File(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Self::File(file) => Some(file),
            Self::Folder(_) => None,
        }
    }

    /// Children of a folder; files have none
    pub fn children(&self) -> Option<&BTreeMap<String, TreeNode>> {
        self.as_folder().map(|folder| &folder.children)
    }

    /// Looks up a descendant by its path of decoded names
    ///
    /// An empty path returns the node itself.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&TreeNode> {
        let mut node = self;
        for name in path {
            node = node.children()?.get(name.as_ref())?;
        }
        Some(node)
    }

    /// Counts listed folders, files and error folders in this subtree
    pub fn counts(&self) -> TreeCounts {
        let mut counts = TreeCounts::default();
        self.accumulate(&mut counts);
        counts
    }

    fn accumulate(&self, counts: &mut TreeCounts) {
        match self {
            Self::File(_) => counts.files += 1,
            Self::Folder(folder) if folder.error.is_some() => counts.errors += 1,
            Self::Folder(folder) => {
                counts.folders += 1;
                for child in folder.children.values() {
                    child.accumulate(counts);
                }
            }
        }
    }
}

impl FolderNode {
    /// Inserts a child, replacing any previous entry with the same name
    ///
    /// Returns the replaced entry, if any.
    pub fn insert_child(&mut self, name: impl Into<String>, node: TreeNode) -> Option<TreeNode> {
        self.children.insert(name.into(), node)
    }
}
