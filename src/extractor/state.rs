//! Per-pass extraction state.
//!
//! `ExtractionState` carries what every handler needs besides the source
//! tree: the set of tags accepted in the current context, the output arena
//! that handlers build new elements in, and the deduplication cache. The
//! "already consumed" marker lives on the source nodes themselves
//! ([`Tree::mark_processed`]).

use std::collections::HashSet;

use super::tags::TAG_CATALOG;
use crate::lru::DedupCache;
use crate::tree::{NodeId, Tree};
use crate::Options;

/// State threaded through one handler-dispatch pass.
pub struct ExtractionState<'a> {
    /// Tag names accepted by the generic handler in this pass
    potential_tags: HashSet<String>,

    /// Output arena; its root is the `body` being built
    out: Tree,

    /// Fingerprints of text already emitted
    cache: &'a mut DedupCache,
}

impl<'a> ExtractionState<'a> {
    /// Creates state with the default catalog adjusted by `opts`:
    /// `table` when tables are on, `graphic` for images, `ref` for links.
    pub fn new(opts: &Options, cache: &'a mut DedupCache) -> Self {
        let mut state = Self {
            potential_tags: TAG_CATALOG.iter().map(|s| (*s).to_string()).collect(),
            out: Tree::new("body"),
            cache,
        };
        if opts.include_tables {
            state.add_potential_tag("table");
        }
        if opts.include_images {
            state.add_potential_tag("graphic");
        }
        if opts.include_links {
            state.add_potential_tag("ref");
        }
        state
    }

    /// Check if a tag is accepted in this pass
    #[must_use]
    pub fn is_potential_tag(&self, tag: &str) -> bool {
        self.potential_tags.contains(tag)
    }

    /// Add a tag to the accepted set
    pub fn add_potential_tag(&mut self, tag: &str) {
        self.potential_tags.insert(tag.to_string());
    }

    /// Remove a tag from the accepted set
    pub fn remove_potential_tag(&mut self, tag: &str) {
        self.potential_tags.remove(tag);
    }

    /// Output arena
    #[must_use]
    pub fn out(&self) -> &Tree {
        &self.out
    }

    /// Output arena, mutable
    pub fn out_mut(&mut self) -> &mut Tree {
        &mut self.out
    }

    /// Root of the body being built
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.out.root()
    }

    /// Returns `true` if the text was already emitted. Only consulted when
    /// deduplication is enabled.
    pub fn is_duplicate(&mut self, text: &str, opts: &Options) -> bool {
        opts.deduplicate && self.cache.is_duplicate(text)
    }

    /// Consumes the state, returning the output tree.
    #[must_use]
    pub fn into_output(self) -> Tree {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_potential_tags_default() {
        let mut cache = DedupCache::default();
        let opts = Options {
            include_tables: false,
            ..Options::default()
        };
        let state = ExtractionState::new(&opts, &mut cache);

        assert!(state.is_potential_tag("p"));
        assert!(state.is_potential_tag("head"));
        assert!(state.is_potential_tag("list"));
        assert!(!state.is_potential_tag("table"));
        assert!(!state.is_potential_tag("graphic"));
        assert!(!state.is_potential_tag("ref"));
        assert!(!state.is_potential_tag("div"));
    }

    #[test]
    fn test_configure_all_options() {
        let mut cache = DedupCache::default();
        let opts = Options {
            include_tables: true,
            include_images: true,
            include_links: true,
            ..Options::default()
        };
        let state = ExtractionState::new(&opts, &mut cache);

        assert!(state.is_potential_tag("table"));
        assert!(state.is_potential_tag("graphic"));
        assert!(state.is_potential_tag("ref"));
    }

    #[test]
    fn test_add_remove_potential_tag() {
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&Options::default(), &mut cache);

        state.add_potential_tag("div");
        assert!(state.is_potential_tag("div"));
        state.remove_potential_tag("div");
        assert!(!state.is_potential_tag("div"));
    }

    #[test]
    fn test_duplicate_check_respects_option() {
        let mut cache = DedupCache::default();
        let text = "A repeated sentence of boilerplate";
        {
            let opts = Options::default();
            let mut state = ExtractionState::new(&opts, &mut cache);
            assert!(!state.is_duplicate(text, &opts));
            assert!(!state.is_duplicate(text, &opts));
        }
        assert!(cache.is_empty());

        let opts = Options {
            deduplicate: true,
            ..Options::default()
        };
        let mut state = ExtractionState::new(&opts, &mut cache);
        assert!(!state.is_duplicate(text, &opts));
        assert!(state.is_duplicate(text, &opts));
    }

    #[test]
    fn test_output_starts_as_empty_body() {
        let mut cache = DedupCache::default();
        let state = ExtractionState::new(&Options::default(), &mut cache);
        assert_eq!(state.out().tag(state.body()), "body");
        assert!(!state.out().has_children(state.body()));
    }
}
