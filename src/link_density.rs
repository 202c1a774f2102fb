//! Link Density Testing
//!
//! Decides whether a section should be removed because its text is mostly
//! link text (navigation menus, tag clouds, "related" blocks). Anchors are
//! counted under both their source name `a` and their converted name `ref`,
//! so the tests work before and after tag conversion.

use std::collections::{HashMap, HashSet};

use crate::text;
use crate::tree::{NodeId, Tree};

const ANCHOR_TAGS: [&str; 2] = ["ref", "a"];

/// Anchors shorter than this count as "short" links.
const SHORT_LINK_LEN: usize = 10;

/// Link statistics for one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkInfo {
    /// Number of anchor descendants, empty ones included.
    pub n_links: usize,
    /// Summed character length of non-empty anchor texts.
    pub link_len: usize,
    /// Anchors with non-empty text.
    pub n_non_empty: usize,
    /// Non-empty anchors shorter than 10 characters.
    pub n_short: usize,
    /// Text length of the first anchor.
    pub first_link_len: usize,
}

/// Collects anchor statistics for the subtree rooted at `id`.
#[must_use]
pub fn collect_link_info(tree: &Tree, id: NodeId) -> LinkInfo {
    let mut info = LinkInfo::default();
    for link in tree.descendants(id) {
        if !tree.is_tag(link, &ANCHOR_TAGS) {
            continue;
        }
        info.n_links += 1;
        let len = text::text_len(&tree.text_content(link));
        if info.n_links == 1 {
            info.first_link_len = len;
        }
        if len == 0 {
            continue;
        }
        info.link_len += len;
        info.n_non_empty += 1;
        if len < SHORT_LINK_LEN {
            info.n_short += 1;
        }
    }
    info
}

/// Elements of the subtree at `root` (the root included) that hold at least
/// one anchor, empty anchors included. Elements outside this set always
/// pass [`link_density_test`].
#[must_use]
pub fn nodes_with_anchors(tree: &Tree, root: NodeId) -> HashSet<NodeId> {
    let mut linked = HashSet::new();
    for link in tree.iter_tags(root, &ANCHOR_TAGS) {
        if link == root {
            continue;
        }
        for ancestor in tree.ancestors(link) {
            if !linked.insert(ancestor) || ancestor == root {
                break;
            }
        }
    }
    linked
}

/// Anchor statistics and collapsed text length of one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Anchors below the element.
    pub info: LinkInfo,
    /// Collapsed length of the element's text, tail excluded.
    pub text_len: usize,
}

/// Measures [`LinkStats`] for the subtree rooted at `id`.
#[must_use]
pub fn link_stats(tree: &Tree, id: NodeId) -> LinkStats {
    LinkStats {
        info: collect_link_info(tree, id),
        text_len: text::text_len(&tree.text_content(id)),
    }
}

/// Memoized [`LinkStats`] for one bottom-up pass.
///
/// An element whose only content is a single child measured earlier in the
/// pass (no text of its own, no tail after the child, the child not an
/// anchor) has the child's figures, so chains of wrappers are measured
/// once. Entries must not outlive edits below the measured elements.
#[derive(Debug, Default)]
pub struct LinkStatsCache {
    measured: HashMap<NodeId, LinkStats>,
}

impl LinkStatsCache {
    /// Figures for `id`, reusing a wrapped child's when possible.
    pub fn stats(&mut self, tree: &Tree, id: NodeId) -> LinkStats {
        let stats = self.wrapped(tree, id).unwrap_or_else(|| link_stats(tree, id));
        self.measured.insert(id, stats);
        stats
    }

    fn wrapped(&self, tree: &Tree, id: NodeId) -> Option<LinkStats> {
        let &[child] = tree.children(id) else {
            return None;
        };
        if !tree.text(id).trim().is_empty()
            || !tree.tail(child).trim().is_empty()
            || tree.is_tag(child, &ANCHOR_TAGS)
        {
            return None;
        }
        self.measured.get(&child).copied()
    }
}

/// Outcome of [`link_density_test`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDensity {
    /// The element is link-dominated and should be removed.
    pub is_high_density: bool,
    /// The element holds at least one anchor with text.
    pub has_non_empty_links: bool,
}

/// Link density test for paragraphs, lists and containers.
///
/// - a single anchor longer than 10 (precision) or 100 characters that makes
///   up over 90% of the text is boilerplate
/// - otherwise only elements under a size ceiling are tested: 30/60
///   characters for `p`, 100/300 for anything else, the lower value applying
///   when the element has a following sibling
/// - below the ceiling the element is boilerplate when it has no non-empty
///   anchor, when anchor text exceeds 80% of its text, or when more than 80%
///   of several anchors are short
#[must_use]
pub fn link_density_test(tree: &Tree, id: NodeId, favor_precision: bool) -> LinkDensity {
    let info = collect_link_info(tree, id);
    let elem_len = if info.n_links == 0 {
        0
    } else {
        text::text_len(&tree.text_content(id))
    };
    judge(tree, id, info, elem_len, favor_precision)
}

/// [`link_density_test`] on figures measured beforehand.
#[must_use]
pub fn link_density_test_stats(tree: &Tree, id: NodeId, stats: LinkStats, favor_precision: bool) -> LinkDensity {
    judge(tree, id, stats.info, stats.text_len, favor_precision)
}

fn judge(tree: &Tree, id: NodeId, info: LinkInfo, elem_len: usize, favor_precision: bool) -> LinkDensity {
    let mut result = LinkDensity {
        is_high_density: false,
        has_non_empty_links: info.n_non_empty > 0,
    };
    if info.n_links == 0 {
        return result;
    }

    if info.n_links == 1 {
        let threshold = if favor_precision { 10 } else { 100 };
        let link_len = info.first_link_len;
        if link_len > threshold && (link_len as f64) > (elem_len as f64) * 0.9 {
            result.is_high_density = true;
            return result;
        }
    }

    let has_next_sibling = tree.next_sibling(id).is_some();
    let limit_len = match (tree.tag(id) == "p", has_next_sibling) {
        (true, true) => 30,
        (true, false) => 60,
        (false, true) => 100,
        (false, false) => 300,
    };

    if elem_len < limit_len {
        result.is_high_density = info.n_non_empty == 0
            || (info.link_len as f64) > (elem_len as f64) * 0.8
            || (info.n_non_empty > 1 && (info.n_short as f64) / (info.n_non_empty as f64) > 0.8);
    }
    result
}

/// Link density test for tables: only tables of 200 characters or more are
/// tested, with an 80% link-text threshold below 1000 characters and 50%
/// above.
#[must_use]
pub fn link_density_test_tables(tree: &Tree, id: NodeId) -> bool {
    let info = collect_link_info(tree, id);
    if info.n_links == 0 {
        return false;
    }
    let elem_len = text::text_len(&tree.text_content(id));
    if elem_len < 200 {
        return false;
    }
    if info.n_non_empty == 0 {
        return true;
    }
    let ratio = if elem_len < 1000 { 0.8 } else { 0.5 };
    (info.link_len as f64) > (elem_len as f64) * ratio
}
