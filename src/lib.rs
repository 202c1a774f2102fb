//! # rs-mainbody
//!
//! Main-content extraction for noisy HTML.
//!
//! A document is parsed into an arena [`Tree`], cleaned, pruned by link
//! density and rebuilt element by element into a small output vocabulary
//! (`p`, `head`, `list`/`item`, `quote`, `code`, `table`/`row`/`cell`,
//! `hi`, `ref`, `lb`, `graphic`). When that yields too little text the
//! extractor falls back to a baseline pass over the untouched tree, then to
//! a baseline scoped to the likely content area.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_mainbody::extract;
//!
//! let paragraph = "Rivers across the valley rose overnight after a week of rain. ".repeat(4);
//! let html = format!(
//!     "<html><head><title>Flood watch</title></head>\
//!      <body><nav><a href='/'>Home</a></nav><article><p>{paragraph}</p></article></body></html>"
//! );
//!
//! let document = extract(&html)?;
//! assert_eq!(document.metadata.title.as_deref(), Some("Flood watch"));
//! assert!(document.text.starts_with("Rivers across the valley"));
//! assert!(!document.text.contains("Home"));
//! # Ok::<(), rs_mainbody::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Content Extraction**: Rebuilds the main content as a structured tree
//! - **Fallbacks**: Baseline and smart-baseline passes when the main pass is short
//! - **Comments**: Optional extraction of the comment section
//! - **Deduplication**: LRU fingerprint cache, per document or per batch
//! - **Metadata**: Title, author, description, site name, URL and language

mod error;
mod extract;
mod options;
mod result;

/// Arena element tree with the text/tail model.
pub mod tree;

/// HTML parsing into the element tree.
pub mod dom;

/// Text normalization and boilerplate line filters.
pub mod text;

/// LRU cache for text deduplication.
pub mod lru;

/// Selector rules for content areas, comments and discardable sections.
pub mod selector;

/// Tree cleaning, tag conversion and pruning.
pub mod html_processing;

/// Link density testing for boilerplate detection.
pub mod link_density;

/// Main content extraction (tag catalogs, state, handlers, fallbacks).
pub mod extractor;

/// Metadata extraction (JSON-LD, HTML meta tags, Open Graph).
pub mod metadata;

/// Character encoding detection and transcoding.
pub mod encoding;

pub use error::{Error, Result};
pub use extract::Extractor;
pub use lru::DedupCache;
pub use options::{DedupScope, Focus, Options};
pub use result::{Document, DocumentMetadata, ExtractionResult};
pub use tree::{NodeId, Tree};

/// Extracts main content from an HTML document using default options.
///
/// Returns [`Error::NoContent`] when no stage yields enough text.
///
/// # Example
///
/// ```rust
/// use rs_mainbody::{extract, Error};
///
/// let html = "<html><body><article>Content</article></body></html>";
/// assert!(matches!(extract(html), Err(Error::NoContent)));
/// ```
pub fn extract(html: &str) -> Result<Document> {
    extract_with_options(html, &Options::default())
}

/// Extracts main content from an HTML document with custom options.
///
/// # Example
///
/// ```rust
/// use rs_mainbody::{extract_with_options, Focus, Options};
///
/// let html = "<html><body><article><p>Short, but kept.</p></article></body></html>";
/// let options = Options {
///     focus: Focus::Precision,
///     ..Options::default()
/// };
/// let document = extract_with_options(html, &options)?;
/// assert_eq!(document.text, "Short, but kept.");
/// # Ok::<(), rs_mainbody::Error>(())
/// ```
pub fn extract_with_options(html: &str, options: &Options) -> Result<Document> {
    Extractor::new(options.clone())?.extract(html)
}

/// Extracts main content from HTML bytes with automatic encoding detection.
///
/// # Character Encoding
///
/// The charset is taken from a byte order mark, `<meta charset="...">` or
/// `<meta http-equiv="Content-Type" content="...; charset=...">`, and
/// defaults to UTF-8. Undecodable bytes yield [`Error::EncodingError`].
///
/// # Example
///
/// ```rust
/// use rs_mainbody::{extract_bytes_with_options, Focus, Options};
///
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body><p>Caf\xE9 cr\xE8me</p></body></html>";
/// let options = Options { focus: Focus::Precision, ..Options::default() };
/// let document = extract_bytes_with_options(html, &options)?;
/// assert!(document.text.contains("Café"));
/// # Ok::<(), rs_mainbody::Error>(())
/// ```
pub fn extract_bytes(html: &[u8]) -> Result<Document> {
    extract_bytes_with_options(html, &Options::default())
}

/// Extracts main content from HTML bytes with custom options and automatic
/// encoding detection.
pub fn extract_bytes_with_options(html: &[u8], options: &Options) -> Result<Document> {
    Extractor::new(options.clone())?.extract_bytes(html)
}

/// Extracts main content from an already-parsed tree. The tree is not
/// modified.
pub fn extract_tree(tree: &Tree, options: &Options) -> Result<Document> {
    Extractor::new(options.clone())?.extract_tree(tree)
}
