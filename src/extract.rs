//! Extraction orchestrator.
//!
//! Drives one document through the stage machine
//! `Start → Cleaned → MainExtracted → (Accepted | BaselineFallback) →
//! (Accepted | SmartBaselineFallback) → (Accepted | Failed)`.
//! The pristine tree is never mutated: cleaning works on a deep copy and the
//! baseline stages read the original.

use tracing::debug;

use crate::dom;
use crate::encoding;
use crate::error::{Error, Result};
use crate::extractor::comments::{extract_comments, remove_comment_sections};
use crate::extractor::fallback::{baseline, smart_baseline};
use crate::extractor::pipeline::extract_content;
use crate::html_processing::{convert_tags, tree_cleaning};
use crate::lru::DedupCache;
use crate::metadata;
use crate::options::{DedupScope, Options};
use crate::result::{Document, ExtractionResult};
use crate::tree::Tree;

/// Orchestrator states.
#[derive(Debug)]
enum Stage {
    Start,
    Cleaned(Tree),
    MainExtracted(ExtractionResult),
    BaselineFallback,
    SmartBaselineFallback,
    Accepted(ExtractionResult),
    Failed,
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Cleaned(_) => "cleaned",
            Self::MainExtracted(_) => "main-extracted",
            Self::BaselineFallback => "baseline-fallback",
            Self::SmartBaselineFallback => "smart-baseline-fallback",
            Self::Accepted(_) => "accepted",
            Self::Failed => "failed",
        }
    }
}

/// One run over one pristine tree.
struct Run<'a> {
    pristine: &'a Tree,
    cache: &'a mut DedupCache,
    opts: &'a Options,
    comments: Option<ExtractionResult>,
}

impl<'a> Run<'a> {
    fn new(pristine: &'a Tree, cache: &'a mut DedupCache, opts: &'a Options) -> Self {
        Self {
            pristine,
            cache,
            opts,
            comments: None,
        }
    }

    fn accepts_main(&self, result: &ExtractionResult) -> bool {
        result.length >= self.opts.min_extracted_size
            || (self.opts.favor_precision() && result.length > 0)
    }

    fn step(&mut self, stage: Stage) -> Stage {
        let min = self.opts.min_extracted_size;
        match stage {
            Stage::Start => {
                let mut cleaned = self.pristine.clone();
                tree_cleaning(&mut cleaned, self.opts);
                convert_tags(&mut cleaned, self.opts);
                Stage::Cleaned(cleaned)
            }
            Stage::Cleaned(mut cleaned) => {
                if self.opts.include_comments {
                    self.comments = extract_comments(&mut cleaned, self.cache, self.opts);
                } else if self.opts.favor_precision() {
                    remove_comment_sections(&mut cleaned);
                }
                if self.opts.fast {
                    debug!("fast mode, skipping the handler pipeline");
                    return Stage::BaselineFallback;
                }
                Stage::MainExtracted(extract_content(&cleaned, self.cache, self.opts))
            }
            Stage::MainExtracted(result) => {
                debug!(length = result.length, min, "main extraction finished");
                if self.accepts_main(&result) {
                    Stage::Accepted(result)
                } else if self.opts.no_fallback {
                    Stage::Failed
                } else {
                    Stage::BaselineFallback
                }
            }
            Stage::BaselineFallback => {
                let result = baseline(self.pristine);
                if result.length >= min {
                    Stage::Accepted(result)
                } else {
                    Stage::SmartBaselineFallback
                }
            }
            Stage::SmartBaselineFallback => {
                let result = smart_baseline(self.pristine);
                if result.length >= min {
                    Stage::Accepted(result)
                } else {
                    debug!(length = result.length, min, "every stage fell short");
                    Stage::Failed
                }
            }
            terminal @ (Stage::Accepted(_) | Stage::Failed) => terminal,
        }
    }

    /// Steps from `stage` until a terminal state.
    fn drive(&mut self, mut stage: Stage) -> Option<ExtractionResult> {
        loop {
            let next = self.step(stage);
            debug!(stage = next.name(), "orchestrator transition");
            stage = match next {
                Stage::Accepted(result) => return Some(result),
                Stage::Failed => return None,
                other => other,
            };
        }
    }
}

/// Reusable extraction handle.
///
/// Holds validated options and the deduplication cache. With
/// [`DedupScope::Document`] the cache is cleared before every document;
/// with [`DedupScope::Batch`] it persists across documents, so boilerplate
/// repeated across a batch is only kept once.
///
/// # Example
///
/// ```rust
/// use rs_mainbody::{DedupScope, Extractor, Options};
///
/// let mut extractor = Extractor::new(Options {
///     deduplicate: true,
///     dedup_scope: DedupScope::Batch,
///     ..Options::default()
/// })?;
/// let html = "<html><body><p>Short page.</p></body></html>";
/// assert!(extractor.extract(html).is_err());
/// # Ok::<(), rs_mainbody::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    options: Options,
    cache: DedupCache,
}

impl Extractor {
    /// Creates an extractor after validating the options.
    pub fn new(options: Options) -> Result<Self> {
        let options = options.validate()?;
        let cache = DedupCache::new(options.dedup_cache_size);
        Ok(Self { options, cache })
    }

    /// The validated options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Empties the deduplication cache.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Extracts from an HTML string.
    pub fn extract(&mut self, html: &str) -> Result<Document> {
        let tree = dom::parse(html)?;
        self.extract_tree(&tree)
    }

    /// Extracts from raw bytes, detecting and converting the charset first.
    pub fn extract_bytes(&mut self, html: &[u8]) -> Result<Document> {
        let html = encoding::transcode_to_utf8(html)?;
        self.extract(&html)
    }

    /// Extracts from an already-parsed tree. The tree is not modified.
    pub fn extract_tree(&mut self, tree: &Tree) -> Result<Document> {
        if self.options.dedup_scope == DedupScope::Document {
            self.cache.clear();
        }
        let metadata = metadata::extract_metadata(tree, &self.options);

        let mut run = Run::new(tree, &mut self.cache, &self.options);
        let Some(main) = run.drive(Stage::Start) else {
            return Err(Error::NoContent);
        };
        let comments = run.comments.take();
        Ok(Document::new(metadata, main, comments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Focus;
    use pretty_assertions::assert_eq;

    fn sentence(seed: &str, times: usize) -> String {
        format!("{seed} sentence that reads like proper article text for testing. ").repeat(times)
    }

    fn fabricated(text: &str) -> ExtractionResult {
        let mut body = Tree::new("body");
        let root = body.root();
        let p = body.sub_element(root, "p");
        body.set_text(p, text);
        ExtractionResult::from_body(body)
    }

    #[test]
    fn test_short_main_result_falls_back_to_smart_baseline() {
        let html = format!(
            r#"<html><body><article class="share-box"><p>{}</p></article><p>{}</p></body></html>"#,
            sentence("Area", 4),
            sentence("Outside", 1),
        );
        let pristine = dom::parse(&html).unwrap();
        let opts = Options::default();
        let mut cache = DedupCache::default();
        let main = fabricated(&"x".repeat(50));
        assert_eq!(main.length, 50);

        let mut run = Run::new(&pristine, &mut cache, &opts);
        let result = run.drive(Stage::MainExtracted(main)).unwrap();
        let smart = smart_baseline(&pristine);
        assert!(baseline(&pristine).length < opts.min_extracted_size);
        assert_eq!(result.text, smart.text);
    }

    #[test]
    fn test_precision_accepts_short_main_result() {
        let pristine = dom::parse("<html><body></body></html>").unwrap();
        let opts = Options {
            focus: Focus::Precision,
            ..Options::default()
        };
        let mut cache = DedupCache::default();
        let mut run = Run::new(&pristine, &mut cache, &opts);
        let result = run.drive(Stage::MainExtracted(fabricated("short but real"))).unwrap();
        assert_eq!(result.text, "short but real");
    }

    #[test]
    fn test_no_fallback_fails_on_short_result() {
        let html = format!("<html><body><p>{}</p></body></html>", sentence("Long", 5));
        let pristine = dom::parse(&html).unwrap();
        let opts = Options {
            no_fallback: true,
            ..Options::default()
        };
        let mut cache = DedupCache::default();
        let mut run = Run::new(&pristine, &mut cache, &opts);
        assert!(run.drive(Stage::MainExtracted(fabricated("tiny"))).is_none());
    }

    #[test]
    fn test_fast_mode_uses_baseline() {
        let html = format!("<html><body><div><p>{}</p></div></body></html>", sentence("Fast", 4));
        let mut extractor = Extractor::new(Options {
            fast: true,
            ..Options::default()
        })
        .unwrap();
        let doc = extractor.extract(&html).unwrap();
        assert_eq!(doc.text, sentence("Fast", 4).trim());
    }

    #[test]
    fn test_batch_scope_keeps_cache() {
        let shared = "Weekly river valley dispatch, compiled by the regional desk";
        let page = |seed: &str| {
            format!(
                "<html><body><article><p>{}</p><p>{shared}</p></article></body></html>",
                sentence(seed, 4)
            )
        };

        let mut batch = Extractor::new(Options {
            deduplicate: true,
            dedup_scope: DedupScope::Batch,
            ..Options::default()
        })
        .unwrap();
        assert!(batch.extract(&page("First")).unwrap().text.contains(shared));
        assert!(!batch.extract(&page("Second")).unwrap().text.contains(shared));

        let mut per_document = Extractor::new(Options {
            deduplicate: true,
            ..Options::default()
        })
        .unwrap();
        assert!(per_document.extract(&page("First")).unwrap().text.contains(shared));
        assert!(per_document.extract(&page("Second")).unwrap().text.contains(shared));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = Extractor::new(Options {
            url: Some("not a url".to_string()),
            ..Options::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
