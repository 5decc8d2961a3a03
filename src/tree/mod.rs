//! Tree model for crawl results
//!
//! A crawl produces a single root [`TreeNode::Folder`]. Folders own their
//! children by decoded name; failed subtrees are kept as error folders so the
//! rest of the tree stays usable.

mod node;

pub use node::{FileNode, FolderNode, TreeCounts, TreeNode};
