//! Configuration options for content extraction.
//!
//! The `Options` struct controls extraction behavior, allowing users to
//! tune the precision/recall tradeoff and enable/disable specific output
//! structures. It deserializes from JSON with every field optional.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Precision/recall tradeoff applied by every heuristic in the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    /// Prefer discarding borderline content.
    Precision,
    /// Prefer keeping borderline content.
    Recall,
    /// Default heuristics.
    #[default]
    Balanced,
}

/// Lifetime of the deduplication cache held by an [`Extractor`](crate::Extractor).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupScope {
    /// The cache is cleared before every document.
    #[default]
    Document,
    /// The cache persists across documents extracted by the same `Extractor`,
    /// so boilerplate repeated across a batch is only kept once.
    Batch,
}

/// Configuration options for content extraction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_mainbody::{Focus, Options};
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     include_comments: true,
///     focus: Focus::Precision,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Precision/recall tradeoff.
    ///
    /// Default: `Focus::Balanced`
    pub focus: Focus,

    /// Include table content in extraction.
    ///
    /// Default: `true`
    pub include_tables: bool,

    /// Include `graphic` elements for images.
    ///
    /// Default: `false`
    pub include_images: bool,

    /// Keep inline formatting as `hi` elements carrying a `rend` attribute.
    ///
    /// Default: `false`
    pub include_formatting: bool,

    /// Keep links as `ref` elements carrying a `target` attribute.
    ///
    /// Default: `false`
    pub include_links: bool,

    /// Extract the comments section into `Document::comments_body`.
    ///
    /// Default: `false`
    pub include_comments: bool,

    /// Drop repeated text fragments using an LRU fingerprint cache.
    ///
    /// Default: `false`
    pub deduplicate: bool,

    /// Capacity of the deduplication cache (number of fingerprints).
    ///
    /// Default: `1000`
    pub dedup_cache_size: usize,

    /// Whether the deduplication cache survives between documents.
    ///
    /// Default: `DedupScope::Document`
    pub dedup_scope: DedupScope,

    /// Minimum main-content length (characters) accepted without fallback.
    ///
    /// Default: `200`
    pub min_extracted_size: usize,

    /// Minimum comments length (characters) for comments to be kept.
    ///
    /// Default: `1`
    pub min_extracted_comment_size: usize,

    /// Skip the handler pipeline and go straight to baseline extraction.
    ///
    /// Default: `false`
    pub fast: bool,

    /// Disable the baseline and smart-baseline fallbacks.
    ///
    /// Default: `false`
    pub no_fallback: bool,

    /// Source URL, used as base for relative image and link URLs and for
    /// `metadata.hostname`.
    ///
    /// Default: `None`
    pub url: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            focus: Focus::Balanced,
            include_tables: true,
            include_images: false,
            include_formatting: false,
            include_links: false,
            include_comments: false,
            deduplicate: false,
            dedup_cache_size: 1000,
            dedup_scope: DedupScope::Document,
            min_extracted_size: 200,
            min_extracted_comment_size: 1,
            fast: false,
            no_fallback: false,
            url: None,
        }
    }
}

impl Options {
    /// Returns `true` in precision focus.
    #[inline]
    #[must_use]
    pub fn favor_precision(&self) -> bool {
        self.focus == Focus::Precision
    }

    /// Returns `true` in recall focus.
    #[inline]
    #[must_use]
    pub fn favor_recall(&self) -> bool {
        self.focus == Focus::Recall
    }

    /// Parsed base URL, if one was configured and it parses.
    #[must_use]
    pub fn base_url(&self) -> Option<Url> {
        self.url.as_deref().and_then(|u| Url::parse(u).ok())
    }

    /// Checks the option values and normalizes the ones that can be repaired.
    ///
    /// A zero `dedup_cache_size` is raised to 1. An unparsable `url` is an error.
    pub fn validate(mut self) -> Result<Self> {
        if let Some(raw) = self.url.as_deref() {
            Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
        }
        self.dedup_cache_size = self.dedup_cache_size.max(1);
        Ok(self)
    }
}
