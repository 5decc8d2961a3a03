//! URL handling module for dirmap
//!
//! This module provides the href conventions of directory index pages:
//! navigation-link filtering, folder detection, resolution against the
//! listing URL, and percent-decoding of entry names.

mod href;
mod name;

// Re-export main functions
pub use href::{is_folder_href, is_navigation_href, is_self_or_ancestor, resolve_href};
pub use name::{decode_name, entry_name, path_string};
