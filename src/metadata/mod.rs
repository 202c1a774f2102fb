//! Metadata extraction module.
//!
//! Gathers title, author, description, site name, URL, hostname and language
//! from the pristine tree. Sources in priority order: JSON-LD, `<meta>`
//! tags, then document elements.

pub mod json_ld;
pub mod meta_tags;

use url::Url;

use crate::result::DocumentMetadata;
use crate::tree::Tree;
use crate::Options;

pub use json_ld::extract_json_ld;
pub use meta_tags::{examine_document, examine_meta};

/// Extract all metadata from a document.
///
/// The configured `url` takes precedence over any URL found in the page.
#[must_use]
pub fn extract_metadata(tree: &Tree, opts: &Options) -> DocumentMetadata {
    let mut metadata = DocumentMetadata {
        url: opts.url.clone(),
        ..DocumentMetadata::default()
    };

    extract_json_ld(tree, &mut metadata);
    examine_meta(tree, &mut metadata);
    examine_document(tree, &mut metadata);

    let base = opts.base_url();
    if let Some(url) = metadata.url.take() {
        metadata.url = resolve(&url, base.as_ref());
    }
    metadata.hostname = metadata
        .url
        .as_deref()
        .and_then(|u| Url::parse(u).ok())
        .and_then(|u| u.host_str().map(str::to_string));
    metadata
}

/// Absolute form of a page URL, or `None` when it cannot be made absolute.
fn resolve(url: &str, base: Option<&Url>) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => Some(parsed.to_string()),
        Err(_) => base.and_then(|b| b.join(url).ok()).map(|u| u.to_string()),
    }
}
