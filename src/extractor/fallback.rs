//! Baseline extraction.
//!
//! A structure-agnostic fallback run on the pristine tree when the handler
//! pipeline yields too little: after dropping unambiguous junk it collects
//! long paragraphs, list items, quotes and code blocks, and leaf `div`s when
//! those are not enough.

use std::collections::HashSet;

use tracing::debug;

use super::tags::is_block_tag;
use crate::dom;
use crate::result::ExtractionResult;
use crate::selector::{self, content::BASELINE_CONTENT_AREA};
use crate::text;
use crate::tree::{NodeId, SubtreeScope, Tree};

/// A content area yielding at least this many characters is returned by
/// [`smart_baseline`] without trying the whole tree.
pub const SMART_BASELINE_MIN_LEN: usize = 200;

/// Elements dropped before collecting.
const JUNK_TAGS: [&str; 13] = [
    "script", "style", "noscript", "template", "iframe", "svg", "canvas", "object", "embed",
    "nav", "aside", "footer", "header",
];

/// Class or id substrings marking an element as junk.
const JUNK_MARKERS: [&str; 9] = [
    "advertisement", "sponsor", "cookie", "consent", "newsletter", "popup", "share", "social",
    "sidebar",
];

const PARAGRAPH_MIN_LEN: usize = 50;
const ITEM_MIN_LEN: usize = 30;
const QUOTE_MIN_LEN: usize = 40;
const CODE_MIN_LEN: usize = 20;
const DIV_MIN_LEN: usize = 50;
/// Leaf `div`s are only collected while the other blocks total less.
const DIV_TRIGGER_LEN: usize = 200;

fn is_junk(tree: &Tree, id: NodeId) -> bool {
    if tree.is_tag(id, &JUNK_TAGS) {
        return true;
    }
    let markers = dom::class_and_id(tree, id);
    JUNK_MARKERS.iter().any(|m| markers.contains(m))
}

/// Drops junk descendants of the root. The root itself always stays.
fn drop_junk(tree: &mut Tree) {
    let root = tree.root();
    let mut scope = SubtreeScope::new(tree, root);
    for node in tree.descendants(root) {
        if scope.contains(tree, node) && is_junk(tree, node) {
            tree.remove(node, false);
        }
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Paragraph,
    Item,
    Quote,
    Code,
}

/// Blocks collected so far, by kind.
#[derive(Default)]
struct Collector {
    /// Collected blocks and everything below them.
    taken: HashSet<NodeId>,
    /// Ancestors of collected blocks.
    above_taken: HashSet<NodeId>,
    paragraphs: Vec<String>,
    items: Vec<String>,
    quotes: Vec<String>,
    code: Vec<String>,
    divs: Vec<String>,
    total: usize,
}

impl Collector {
    /// Returns `true` if the node overlaps a block collected earlier.
    fn overlaps(&self, id: NodeId) -> bool {
        self.taken.contains(&id) || self.above_taken.contains(&id)
    }

    fn take(&mut self, tree: &Tree, id: NodeId) {
        self.taken.extend(tree.iter(id));
        for ancestor in tree.ancestors(id) {
            if !self.above_taken.insert(ancestor) {
                break;
            }
        }
    }

    fn bucket(&mut self, kind: Kind) -> &mut Vec<String> {
        match kind {
            Kind::Paragraph => &mut self.paragraphs,
            Kind::Item => &mut self.items,
            Kind::Quote => &mut self.quotes,
            Kind::Code => &mut self.code,
        }
    }

    /// Collects every element with a tag in `tags` whose text reaches
    /// `min_len`. Code keeps its inner whitespace.
    fn collect(&mut self, tree: &Tree, kind: Kind, tags: &[&str], min_len: usize) {
        for node in tree.iter_tags(tree.root(), tags) {
            if self.overlaps(node) {
                continue;
            }
            let content = if matches!(kind, Kind::Code) {
                tree.text_content(node).trim().to_string()
            } else {
                text::trim(&tree.text_content(node))
            };
            let length = content.chars().count();
            if length < min_len {
                continue;
            }
            self.take(tree, node);
            self.total += length;
            self.bucket(kind).push(content);
        }
    }

    fn collect_leaf_divs(&mut self, tree: &Tree) {
        for node in tree.iter_tags(tree.root(), &["div"]) {
            let is_leaf = tree.children(node).iter().all(|&c| !is_block_tag(tree.tag(c)));
            if !is_leaf || self.overlaps(node) {
                continue;
            }
            let content = text::trim(&tree.text_content(node));
            let length = content.chars().count();
            if length >= DIV_MIN_LEN {
                self.take(tree, node);
                self.total += length;
                self.divs.push(content);
            }
        }
    }

    fn into_body(self) -> Tree {
        let mut out = Tree::new("body");
        let body = out.root();
        for content in self.paragraphs {
            let p = out.sub_element(body, "p");
            out.set_text(p, content);
        }
        if !self.items.is_empty() {
            let list = out.sub_element(body, "list");
            for content in self.items {
                let item = out.sub_element(list, "item");
                out.set_text(item, content);
            }
        }
        for content in self.quotes {
            let quote = out.sub_element(body, "quote");
            out.set_text(quote, content);
        }
        for content in self.code {
            let code = out.sub_element(body, "code");
            out.set_text(code, content);
        }
        for content in self.divs {
            let p = out.sub_element(body, "p");
            out.set_text(p, content);
        }
        out
    }
}

fn baseline_at(tree: &Tree, root: NodeId) -> ExtractionResult {
    let mut work = tree.subtree(root);
    drop_junk(&mut work);

    let mut collector = Collector::default();
    collector.collect(&work, Kind::Paragraph, &["p"], PARAGRAPH_MIN_LEN);
    collector.collect(&work, Kind::Item, &["li", "item"], ITEM_MIN_LEN);
    collector.collect(&work, Kind::Quote, &["blockquote", "q", "quote"], QUOTE_MIN_LEN);
    collector.collect(&work, Kind::Code, &["pre", "code"], CODE_MIN_LEN);
    if collector.total < DIV_TRIGGER_LEN {
        collector.collect_leaf_divs(&work);
    }

    let result = ExtractionResult::from_body(collector.into_body());
    debug!(length = result.length, "baseline extraction");
    result
}

/// Baseline extraction over the `body` of a pristine tree.
#[must_use]
pub fn baseline(tree: &Tree) -> ExtractionResult {
    baseline_at(tree, dom::body(tree))
}

/// Baseline extraction scoped to the first common content area.
///
/// An area yielding at least [`SMART_BASELINE_MIN_LEN`] characters is
/// returned as is; otherwise the whole-tree baseline is computed too and
/// the longer result wins, the whole tree on a tie.
#[must_use]
pub fn smart_baseline(tree: &Tree) -> ExtractionResult {
    let body = dom::body(tree);
    let area = BASELINE_CONTENT_AREA
        .iter()
        .find_map(|rule| selector::query(tree, body, *rule));
    let Some(area) = area else {
        return baseline(tree);
    };

    let scoped = baseline_at(tree, area);
    if scoped.length >= SMART_BASELINE_MIN_LEN {
        return scoped;
    }
    let whole = baseline(tree);
    if scoped.length > whole.length {
        scoped
    } else {
        whole
    }
}
