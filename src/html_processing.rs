//! HTML Processing and Pruning
//!
//! Functions that prepare the parsed tree for extraction and clean up after
//! it:
//!
//! - [`tree_cleaning`] and [`prune_html`] drop denylisted and empty elements
//! - [`convert_tags`] maps source HTML onto the output vocabulary
//! - [`prune_unwanted_sections`] removes boilerplate from a content subtree
//! - [`process_node`] and [`handle_text_node`] are the generic text-node
//!   primitives every handler builds on
//! - [`sanitize_output`] enforces the output vocabulary on a finished body

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};
use url::Url;

use crate::extractor::state::ExtractionState;
use crate::extractor::tags::{
    is_output_tag, rend_for, EMPTY_TAGS_TO_REMOVE, FORMAT_TAGS, IMAGE_CONTAINER_TAGS,
    TABLE_CLEAN_TAGS, TAGS_TO_CLEAN, TAGS_TO_STRIP, XML_DEL_TAGS, XML_HEAD_TAGS, XML_LB_TAGS,
    XML_ITEM_TAGS, XML_LIST_TAGS, XML_QUOTE_TAGS,
};
use crate::link_density::{
    link_density_test_stats, link_density_test_tables, nodes_with_anchors, LinkStatsCache,
};
use crate::options::Options;
use crate::selector::{self, discard, Rule};
use crate::text;
use crate::tree::{NodeId, SubtreeScope, Tree};

/// Image sources recognized by their file extension.
#[allow(clippy::expect_used)]
static RE_IMAGE_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[^\s]+\.(avif|bmp|gif|hei[cf]|jpe?g|png|svg|webp)(\b|$)")
        .expect("RE_IMAGE_FILE regex")
});

/// Longest attribute value tested as an image source.
const MAX_IMAGE_SRC_LEN: usize = 8192;

// === Document Cleaning ===

/// Removes denylisted elements and strips purely presentational wrappers.
///
/// With tables on, a `figure` holding a table becomes a `div`; with images
/// on, image containers survive and `img` is not stripped. Removed elements
/// keep their tail unless precision is favored.
///
/// In recall focus the cleaning is rolled back when it would delete every
/// paragraph of the document; only denylisted elements holding no paragraph
/// are then removed.
pub fn tree_cleaning(tree: &mut Tree, opts: &Options) {
    let root = tree.root();
    let mut cleaning: Vec<&str> = TAGS_TO_CLEAN.to_vec();
    let mut stripping: Vec<&str> = TAGS_TO_STRIP.to_vec();

    if opts.include_tables {
        for figure in tree.iter_tags(root, &["figure"]) {
            if tree.find(figure, &["table"]).is_some() {
                tree.set_tag(figure, "div");
            }
        }
    } else {
        cleaning.extend(TABLE_CLEAN_TAGS);
    }
    if opts.include_images {
        cleaning.retain(|tag| !IMAGE_CONTAINER_TAGS.contains(tag));
        stripping.retain(|tag| *tag != "img");
    }

    tree.strip_tags(root, &stripping);

    let keep_tail = !opts.favor_precision();
    if opts.favor_recall() && tree.find(root, &["p"]).is_some() {
        let backup = tree.clone();
        tree.strip_elements(root, &cleaning, keep_tail);
        if tree.find(root, &["p"]).is_none() {
            debug!("cleaning would remove every paragraph, rolling back");
            *tree = backup;
            let mut scope = SubtreeScope::new(tree, root);
            for node in tree.descendants(root) {
                if tree.is_tag(node, &cleaning)
                    && scope.contains(tree, node)
                    && tree.find(node, &["p"]).is_none()
                {
                    tree.remove(node, keep_tail);
                }
            }
        }
    } else {
        tree.strip_elements(root, &cleaning, keep_tail);
    }

    prune_html(tree, opts);
}

/// Removes elements from [`EMPTY_TAGS_TO_REMOVE`] that hold no text and no
/// children. Runs bottom-up, so wrappers emptied by the pass go too.
pub fn prune_html(tree: &mut Tree, opts: &Options) {
    let keep_tail = !opts.favor_precision();
    let root = tree.root();
    for node in tree.descendants(root).into_iter().rev() {
        if tree.is_tag(node, &EMPTY_TAGS_TO_REMOVE)
            && !tree.has_children(node)
            && tree.text(node).trim().is_empty()
        {
            tree.remove(node, keep_tail);
        }
    }
}

// === Tag Conversion ===

/// Converts source HTML tags to the output vocabulary, in place.
pub fn convert_tags(tree: &mut Tree, opts: &Options) {
    let root = tree.root();
    convert_links(tree, root, opts);

    if opts.include_formatting {
        for node in tree.iter_tags(root, &FORMAT_TAGS) {
            if let Some(rend) = rend_for(tree.tag(node)) {
                tree.clear_attributes(node);
                tree.set(node, "rend", rend);
                tree.set_tag(node, "hi");
            }
        }
    } else {
        tree.strip_tags(root, &FORMAT_TAGS);
    }

    for node in tree.iter(root) {
        let tag = tree.tag(node).to_string();
        match tag.as_str() {
            t if XML_LIST_TAGS.contains(&t) => convert_list(tree, node),
            t if XML_HEAD_TAGS.contains(&t) => {
                tree.set(node, "rend", tag.as_str());
                tree.set_tag(node, "head");
            }
            t if XML_LB_TAGS.contains(&t) => tree.set_tag(node, "lb"),
            t if XML_QUOTE_TAGS.contains(&t) => convert_quote(tree, node),
            t if XML_DEL_TAGS.contains(&t) => {
                tree.set_tag(node, "del");
                tree.set(node, "rend", "overstrike");
            }
            "details" => {
                tree.set_tag(node, "div");
                for summary in tree.iter_tags(node, &["summary"]) {
                    tree.set_tag(summary, "head");
                }
            }
            "img" if opts.include_images => tree.set_tag(node, "graphic"),
            _ => {}
        }
    }
}

/// With links on, every anchor becomes a `ref` whose only attribute is the
/// resolved `target`. With links off, anchors inside text containers are
/// kept as `ref` for the link-density tests and all others are stripped.
fn convert_links(tree: &mut Tree, root: NodeId, opts: &Options) {
    if opts.include_links {
        let base = opts.base_url();
        for node in tree.iter_tags(root, &["a", "ref"]) {
            let href = tree.attr(node, "href").trim().to_string();
            tree.clear_attributes(node);
            tree.set_tag(node, "ref");
            if !href.is_empty() {
                tree.set(node, "target", resolve_url(&href, base.as_ref()));
            }
        }
        return;
    }

    let mut containers = vec!["div", "li", "p"];
    if opts.include_tables {
        containers.push("table");
    }
    for node in tree.iter_tags(root, &["a"]) {
        let contained = tree.ancestors(node).any(|a| tree.is_tag(a, &containers));
        if contained {
            tree.set_tag(node, "ref");
        }
    }
    tree.strip_tags(root, &["a"]);
}

fn convert_list(tree: &mut Tree, list: NodeId) {
    let source = tree.tag(list).to_string();
    tree.set(list, "rend", source);
    tree.set_tag(list, "list");
    let mut counter = 1;
    for entry in tree.iter_tags(list, &XML_ITEM_TAGS) {
        let tag = tree.tag(entry).to_string();
        if tag != "li" {
            tree.set(entry, "rend", format!("{tag}-{counter}"));
            if tag == "dd" {
                counter += 1;
            }
        }
        tree.set_tag(entry, "item");
    }
}

/// `pre` holding a single `span` or highlight.js spans is code, everything
/// else a quote.
fn convert_quote(tree: &mut Tree, node: NodeId) {
    let mut is_code = false;
    if tree.tag(node) == "pre" {
        let children = tree.children(node);
        if children.len() == 1 && tree.tag(children[0]) == "span" {
            is_code = true;
        }
        let hljs: Vec<NodeId> = tree
            .iter_tags(node, &["span"])
            .into_iter()
            .filter(|&s| tree.attr(s, "class").starts_with("hljs"))
            .collect();
        if !hljs.is_empty() {
            is_code = true;
            for span in hljs {
                tree.clear_attributes(span);
            }
        }
    }
    tree.set_tag(node, if is_code { "code" } else { "quote" });
}

/// Resolves `href` against the base URL. Without a base, a protocol-relative
/// URL is given the `http:` scheme and anything else is returned unchanged.
#[must_use]
pub fn resolve_url(href: &str, base: Option<&Url>) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    match base {
        Some(base) => base
            .join(href)
            .map_or_else(|_| href.to_string(), String::from),
        None if href.starts_with("//") => format!("http:{href}"),
        None => href.to_string(),
    }
}

// === Section Pruning ===

/// Removes every descendant of `root` matching one of the rules, keeping
/// tails. With `with_backup`, the pass is undone when it leaves a seventh
/// or less of the original text.
pub fn prune_unwanted_nodes(tree: &mut Tree, root: NodeId, rules: &[Rule], with_backup: bool) {
    let backup = with_backup.then(|| (tree.clone(), tree.text_content(root).chars().count()));

    for rule in rules {
        let mut scope = SubtreeScope::new(tree, root);
        for node in selector::query_all(tree, root, *rule) {
            if scope.contains(tree, node) {
                trace!(tag = tree.tag(node), "discard rule matched");
                tree.remove(node, true);
            }
        }
    }

    if let Some((backup, old_len)) = backup {
        let new_len = tree.text_content(root).chars().count();
        if new_len <= old_len / 7 {
            debug!(old_len, new_len, "discard rules removed too much, restoring");
            *tree = backup;
        }
    }
}

/// Deletes link-dominated descendants of `root` with a tag in `tags`,
/// bottom-up.
///
/// With `backtracking`, short elements holding links and several children
/// are deleted as well: under 200 characters with at least one child in
/// precision focus, under 100 with at least three otherwise.
pub fn delete_by_link_density(
    tree: &mut Tree,
    root: NodeId,
    tags: &[&str],
    backtracking: bool,
    favor_precision: bool,
) {
    let len_threshold = if favor_precision { 200 } else { 100 };
    let child_limit = if favor_precision { 1 } else { 3 };

    let linked = nodes_with_anchors(tree, root);
    let mut scope = SubtreeScope::new(tree, root);
    let mut measured = LinkStatsCache::default();
    for node in tree.iter_tags(root, tags).into_iter().rev() {
        if !linked.contains(&node) || !scope.contains(tree, node) {
            continue;
        }
        let stats = measured.stats(tree, node);
        let density = link_density_test_stats(tree, node, stats, favor_precision);
        let len = stats.text_len;
        let remove = density.is_high_density
            || (backtracking
                && density.has_non_empty_links
                && len > 0
                && len < len_threshold
                && tree.children(node).len() >= child_limit);
        if remove {
            debug!(tag = tree.tag(node), "link density: removing element");
            tree.remove(node, true);
        }
    }
}

/// Prunes boilerplate from the content subtree at `root`: discard rules,
/// link-dense containers, lists and paragraphs, link-dense tables, and in
/// precision focus trailing titles and link-dense headings and quotes.
pub fn prune_unwanted_sections(
    tree: &mut Tree,
    root: NodeId,
    state: &ExtractionState<'_>,
    opts: &Options,
) {
    let favor_precision = opts.favor_precision();

    prune_unwanted_nodes(tree, root, discard::OVERALL_DISCARDED_CONTENT, true);
    if !state.is_potential_tag("graphic") {
        prune_unwanted_nodes(tree, root, discard::DISCARDED_IMAGE_CONTENT, false);
    }
    if !opts.favor_recall() {
        prune_unwanted_nodes(tree, root, discard::TEASER_DISCARDED_CONTENT, false);
        if favor_precision {
            prune_unwanted_nodes(tree, root, discard::PRECISION_DISCARDED_CONTENT, false);
        }
    }

    for _ in 0..2 {
        delete_by_link_density(tree, root, &["div"], true, favor_precision);
        delete_by_link_density(tree, root, &["list", "ul"], false, favor_precision);
        delete_by_link_density(tree, root, &["p"], false, favor_precision);
    }

    if state.is_potential_tag("table") || favor_precision {
        let mut scope = SubtreeScope::new(tree, root);
        for table in tree.iter_tags(root, &["table"]).into_iter().rev() {
            if scope.contains(tree, table) && link_density_test_tables(tree, table) {
                debug!("link density: removing table");
                tree.remove(table, false);
            }
        }
    }

    if favor_precision {
        while let Some(&last) = tree.children(root).last() {
            if tree.tag(last) != "head" {
                break;
            }
            tree.remove(last, false);
        }
        delete_by_link_density(tree, root, &["head"], false, true);
        delete_by_link_density(tree, root, &["quote"], false, true);
    }
}

// === Output Sanitation ===

/// Strips tags outside the output vocabulary (content kept) and removes
/// elements left with no text and no children, except `lb` and `graphic`.
pub fn sanitize_output(tree: &mut Tree) {
    let body = tree.root();
    for node in tree.descendants(body).into_iter().rev() {
        if !is_output_tag(tree.tag(node)) {
            tree.strip(node);
            continue;
        }
        if !tree.is_tag(node, &["lb", "graphic"])
            && !tree.has_children(node)
            && tree.text(node).trim().is_empty()
        {
            tree.remove(node, true);
        }
    }
}

// === Generic Text Nodes ===

/// Returns `true` if the value looks like the path of an image file.
#[must_use]
pub fn is_image_file(src: &str) -> bool {
    !src.is_empty() && src.len() <= MAX_IMAGE_SRC_LEN && RE_IMAGE_FILE.is_match(src)
}

/// Returns `true` if `src` or a `data-src*` attribute holds an image file.
#[must_use]
pub fn is_image_element(tree: &Tree, id: NodeId) -> bool {
    tree.attributes(id)
        .iter()
        .any(|(k, v)| (k == "src" || k.starts_with("data-src")) && is_image_file(v))
}

fn is_empty_node(tree: &Tree, id: NodeId) -> bool {
    !tree.has_children(id) && tree.text(id).is_empty() && tree.tail(id).is_empty()
}

/// Fingerprints the element's own text. Text of children is tested when the
/// children are handled.
fn duplicate_test(tree: &Tree, id: NodeId, state: &mut ExtractionState<'_>, opts: &Options) -> bool {
    let content = text::trim(tree.text(id));
    if state.is_duplicate(&content, opts) {
        debug!(tag = tree.tag(id), "duplicate text discarded");
        return true;
    }
    false
}

/// Light text-node check used inside structured handlers.
///
/// Trims text and tail, moves a hanging tail into the text of an empty
/// element other than `lb`, and rejects boilerplate and duplicate text.
/// Returns `false` when the node should be discarded.
pub fn process_node(
    tree: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> bool {
    if tree.is_processed(id) || is_empty_node(tree, id) {
        return false;
    }

    let mut own = text::trim(tree.text(id));
    let mut tail = text::trim(tree.tail(id));
    if tree.tag(id) != "lb" && own.is_empty() && !tail.is_empty() && !tree.has_children(id) {
        std::mem::swap(&mut own, &mut tail);
    }
    tree.set_text(id, own.as_str());
    tree.set_tail(id, tail.as_str());

    if !own.is_empty() || !tail.is_empty() {
        let sample = if own.is_empty() { &tail } else { &own };
        if text::text_filter(sample) {
            debug!(tag = tree.tag(id), "text filter rejected node");
            return false;
        }
        if duplicate_test(tree, id, state, opts) {
            return false;
        }
    }
    true
}

/// Full text-node check used by the dispatcher.
///
/// `fix_comments` turns a bare line break carrying tail text into a
/// paragraph; otherwise line breaks pass untouched. `preserve_spaces` keeps
/// the text as is instead of trimming it. Returns `false` when the node
/// should be discarded.
pub fn handle_text_node(
    tree: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
    fix_comments: bool,
    preserve_spaces: bool,
) -> bool {
    prepare_text_node(tree, id, fix_comments, preserve_spaces)
        && !duplicate_test(tree, id, state, opts)
}

/// [`handle_text_node`] without the duplicate test, for inline children of
/// a paragraph whose whole text was already tested.
pub fn prepare_text_node(
    tree: &mut Tree,
    id: NodeId,
    fix_comments: bool,
    preserve_spaces: bool,
) -> bool {
    if tree.tag(id) == "graphic" && is_image_element(tree, id) {
        return true;
    }
    if tree.is_processed(id) || is_empty_node(tree, id) {
        return false;
    }

    if !fix_comments && tree.tag(id) == "lb" {
        if !preserve_spaces {
            let tail = text::trim(tree.tail(id));
            tree.set_tail(id, tail);
        }
        return true;
    }

    if tree.text(id).is_empty() && !tree.has_children(id) {
        let tail = tree.tail(id).to_string();
        tree.set_text(id, tail);
        tree.set_tail(id, "");
        if fix_comments && tree.tag(id) == "lb" {
            tree.set_tag(id, "p");
        }
    }

    if !preserve_spaces {
        let own = text::trim(tree.text(id));
        let tail = text::trim(tree.tail(id));
        tree.set_text(id, own);
        tree.set_tail(id, tail);
    }

    let own = tree.text(id).trim().to_string();
    if (!own.is_empty() || !tree.has_children(id)) && text::text_filter(&own) {
        debug!(tag = tree.tag(id), "text filter rejected node");
        return false;
    }
    true
}
