//! Comment Extraction
//!
//! Locates the comment section of a cleaned tree with the comment rules,
//! collects its text blocks into a separate body, and removes the section
//! so the main extraction does not see it.

use tracing::debug;

use super::handlers::copy_element;
use super::state::ExtractionState;
use super::tags::TAG_CATALOG;
use crate::dom;
use crate::html_processing::{handle_text_node, prune_unwanted_nodes, sanitize_output};
use crate::lru::DedupCache;
use crate::result::ExtractionResult;
use crate::selector::{self, comments};
use crate::tree::{NodeId, SubtreeScope, Tree};
use crate::Options;

fn process_comments_node(
    area: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> Option<NodeId> {
    if !TAG_CATALOG.contains(&area.tag(id)) {
        return None;
    }
    if !handle_text_node(area, id, state, opts, true, false) {
        return None;
    }
    let out = state.out_mut();
    let copy = copy_element(area, id, out);
    for node in out.iter(copy) {
        out.clear_attributes(node);
    }
    area.mark_subtree_processed(id);
    Some(copy)
}

/// Extracts the comment section from `cleaned`.
///
/// The comment rules are tried in order. The first area yielding at least
/// one block wins and is removed from `cleaned` (tail included). Returns
/// `None` when no area yields text or the text is shorter than
/// `min_extracted_comment_size`.
pub fn extract_comments(
    cleaned: &mut Tree,
    cache: &mut DedupCache,
    opts: &Options,
) -> Option<ExtractionResult> {
    let body = dom::body(cleaned);
    let mut state = ExtractionState::new(opts, cache);

    for (index, rule) in comments::COMMENTS.iter().enumerate() {
        let Some(section) = selector::query(cleaned, body, *rule) else {
            continue;
        };

        let mut area = cleaned.subtree(section);
        let area_root = area.root();
        prune_unwanted_nodes(&mut area, area_root, comments::DISCARDED_COMMENTS, false);
        area.strip_tags(area_root, &["a", "ref", "span"]);

        let mut scope = SubtreeScope::new(&area, area_root);
        for node in area.descendants(area_root) {
            if area.is_processed(node) || !scope.contains(&area, node) {
                continue;
            }
            if let Some(block) = process_comments_node(&mut area, node, &mut state, opts) {
                let out_body = state.body();
                state.out_mut().append(out_body, block);
            }
        }

        if state.out().has_children(state.body()) {
            debug!(rule = index + 1, "comment section found");
            cleaned.remove(section, false);
            break;
        }
    }

    let mut out = state.into_output();
    sanitize_output(&mut out);
    let result = ExtractionResult::from_body(out);
    if result.length == 0 || result.length < opts.min_extracted_comment_size {
        return None;
    }
    Some(result)
}

/// Removes whole comment sections from the main content. Used in precision
/// focus when comments are not extracted.
pub fn remove_comment_sections(cleaned: &mut Tree) {
    let body = dom::body(cleaned);
    prune_unwanted_nodes(cleaned, body, comments::REMOVED_COMMENTS, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html_processing::{convert_tags, tree_cleaning};
    use pretty_assertions::assert_eq;

    fn cleaned(html: &str, opts: &Options) -> Tree {
        let mut tree = dom::parse(html).unwrap();
        tree_cleaning(&mut tree, opts);
        convert_tags(&mut tree, opts);
        tree
    }

    const PAGE: &str = r#"<html><body>
        <article><p>The article itself.</p></article>
        <div id="comments">
            <h3 id="reply-title">Leave a reply</h3>
            <p>First comment from a reader.</p>
            <p>Second comment, <a href="/u/2">with a link</a>.</p>
        </div></body></html>"#;

    #[test]
    fn test_comments_extracted_and_removed() {
        let opts = Options {
            include_comments: true,
            ..Options::default()
        };
        let mut tree = cleaned(PAGE, &opts);
        let mut cache = DedupCache::default();

        let result = extract_comments(&mut tree, &mut cache, &opts).unwrap();
        assert_eq!(
            result.text,
            "First comment from a reader. Second comment, with a link."
        );
        assert!(!result.text.contains("Leave a reply"));

        let body = dom::body(&tree);
        let remaining = tree.iter_text(body, " ");
        assert!(remaining.contains("The article itself."));
        assert!(!remaining.contains("First comment"));
    }

    #[test]
    fn test_no_comment_section() {
        let opts = Options::default();
        let mut tree = cleaned("<html><body><p>Only an article here.</p></body></html>", &opts);
        let mut cache = DedupCache::default();
        assert!(extract_comments(&mut tree, &mut cache, &opts).is_none());
    }

    #[test]
    fn test_minimum_comment_size() {
        let opts = Options {
            min_extracted_comment_size: 500,
            ..Options::default()
        };
        let mut tree = cleaned(PAGE, &opts);
        let mut cache = DedupCache::default();
        assert!(extract_comments(&mut tree, &mut cache, &opts).is_none());
    }

    #[test]
    fn test_remove_comment_sections() {
        let opts = Options::default();
        let mut tree = cleaned(PAGE, &opts);
        remove_comment_sections(&mut tree);
        let text = tree.iter_text(dom::body(&tree), " ");
        assert!(!text.contains("comment from a reader"));
        assert!(text.contains("The article itself."));
    }
}
