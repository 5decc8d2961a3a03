//! Link extraction for directory index pages
//!
//! This module turns a listing page into directory entries:
//! - [`LinkExtractor`] produces raw link candidates with their row text
//! - [`HtmlListingExtractor`] is the `scraper`-based implementation
//! - [`listing_entries`] filters navigation links and derives names and hints

use crate::crawler::hints::{modified_hint, size_hint};
use crate::url::{entry_name, is_folder_href, is_navigation_href, is_self_or_ancestor, resolve_href};
use crate::ExtractError;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// A link found on a listing page, before filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// The href attribute as written in the page
    pub href_raw: String,

    /// The href resolved against the listing URL
    pub resolved_url: Url,

    /// Whether the raw href ends with a path separator
    pub is_folder_hint: bool,

    /// Text surrounding the link on its row, excluding the link text
    pub row_text: String,
}

/// A directory entry ready to become a tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Percent-decoded display name
    pub name: String,
    pub url: Url,
    pub is_folder: bool,
    pub size: Option<String>,
    pub modified: Option<String>,
}

/// Extracts link candidates from a fetched listing page
pub trait LinkExtractor: Send + Sync {
    fn extract_entries(&self, body: &str, base_url: &Url) -> Result<Vec<RawEntry>, ExtractError>;
}

/// Extracts `<a href>` links from Apache/nginx style index pages
///
/// Row text comes from the enclosing `<tr>` for table listings, and from the
/// text following the link up to the end of its line for `<pre>` listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlListingExtractor;

impl LinkExtractor for HtmlListingExtractor {
    fn extract_entries(&self, body: &str, base_url: &Url) -> Result<Vec<RawEntry>, ExtractError> {
        let document = Html::parse_document(body);
        let selector = Selector::parse("a[href]").map_err(|e| ExtractError::Parse {
            url: base_url.to_string(),
            message: format!("invalid link selector: {:?}", e),
        })?;

        let mut entries = Vec::new();
        for anchor in document.select(&selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            let Some(resolved_url) = resolve_href(base_url, href) else {
                tracing::trace!("Skipping unresolvable href {:?} on {}", href, base_url);
                continue;
            };

            entries.push(RawEntry {
                href_raw: href.to_string(),
                resolved_url,
                is_folder_hint: is_folder_href(href),
                row_text: row_text(anchor),
            });
        }

        Ok(entries)
    }
}

/// Turns raw links into directory entries for the folder at `folder_url`
///
/// Drops navigation links (`../`, `./`, `/`, sort links, anchors) and links
/// back to the folder itself or its ancestors. Names are percent-decoded;
/// size and date hints are scanned from the row text.
pub fn listing_entries(raw: Vec<RawEntry>, folder_url: &Url) -> Vec<ListingEntry> {
    raw.into_iter()
        .filter(|entry| !is_navigation_href(&entry.href_raw))
        .filter(|entry| !is_self_or_ancestor(folder_url, &entry.resolved_url))
        .filter_map(|entry| {
            let name = entry_name(&entry.href_raw)?;
            Some(ListingEntry {
                name,
                size: size_hint(&entry.row_text),
                modified: modified_hint(&entry.row_text),
                url: entry.resolved_url,
                is_folder: entry.is_folder_hint,
            })
        })
        .collect()
}

/// Collects the text describing the same entry as `anchor`
fn row_text(anchor: ElementRef) -> String {
    let row = anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| matches!(element.value().name(), "tr" | "li"));

    match row {
        Some(row) => text_outside(row, anchor),
        None => trailing_line_text(anchor),
    }
}

/// Text of `container` with the text of `anchor` left out
fn text_outside(container: ElementRef, anchor: ElementRef) -> String {
    let mut parts = Vec::new();
    for node in container.descendants() {
        if let Node::Text(text) = node.value() {
            if node.ancestors().any(|ancestor| ancestor.id() == anchor.id()) {
                continue;
            }
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text);
            }
        }
    }
    parts.join(" ")
}

/// Text after `anchor` up to the next line break or link
fn trailing_line_text(anchor: ElementRef) -> String {
    let mut line = String::new();

    for sibling in anchor.next_siblings() {
        match sibling.value() {
            Node::Text(text) => {
                let text: &str = text;
                if let Some(end) = text.find('\n') {
                    line.push_str(&text[..end]);
                    break;
                }
                line.push_str(text);
            }
            Node::Element(element) => {
                if matches!(element.name(), "a" | "br" | "tr" | "li") {
                    break;
                }
                if let Some(element) = ElementRef::wrap(sibling) {
                    line.extend(element.text());
                }
            }
            _ => {}
        }
    }

    line.trim().to_string()
}
