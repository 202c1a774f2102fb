//! Element handlers.
//!
//! Each handler reads one element of the cleaned source tree, builds its
//! output in the state's output arena and returns the new, detached element,
//! or `None` when the element contributes nothing. Source nodes a handler
//! consumes are marked processed so the sweep does not emit them twice.
//!
//! Handlers never recurse on source depth: nested content is rebuilt with an
//! explicit stack. Only nested lists recurse, and they stop at
//! [`MAX_NESTING_DEPTH`].

use std::collections::BTreeSet;

use tracing::debug;

use super::pipeline::handle_text_elem;
use super::state::ExtractionState;
use super::tags::{FORMATTING_PROTECTED, TABLE_TAGS_TO_STRIP, XML_CELL_TAGS};
use crate::html_processing::{
    handle_text_node, is_image_file, prepare_text_node, process_node, resolve_url,
};
use crate::link_density::link_density_test_tables;
use crate::text;
use crate::tree::{join_text, NodeId, SubtreeScope, Tree};
use crate::Options;

/// Lists nested deeper than this are flattened into a single item.
pub const MAX_NESTING_DEPTH: usize = 200;

/// Upper bound for a parsed `colspan`.
const MAX_COLSPAN: usize = 1000;

/// Check if the output element holds any real text.
#[must_use]
pub fn is_text_element(out: &Tree, id: NodeId) -> bool {
    text::text_chars_test(&out.iter_text(id, ""))
}

fn has_graphic(out: &Tree, id: NodeId) -> bool {
    out.iter(id).into_iter().any(|n| out.tag(n) == "graphic")
}

fn copy_rend(src: &Tree, from: NodeId, out: &mut Tree, to: NodeId) {
    if let Some(rend) = src.get(from, "rend") {
        out.set(to, "rend", rend);
    }
}

/// Deep-copies a source element into `out`, keeping only the attributes the
/// output vocabulary carries.
pub(crate) fn copy_element(src: &Tree, id: NodeId, out: &mut Tree) -> NodeId {
    let copy = src.copy_subtree(id, out);
    for node in out.iter(copy) {
        let allowed: &[&str] = if out.tag(node) == "graphic" {
            &["src", "alt", "title"]
        } else {
            &["rend", "target", "role"]
        };
        let kept: Vec<(String, String)> = out
            .attributes(node)
            .iter()
            .filter(|(k, _)| allowed.contains(&k.as_str()))
            .cloned()
            .collect();
        out.clear_attributes(node);
        for (name, value) in kept {
            out.set(node, &name, value);
        }
    }
    copy
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    /// [`process_node`]
    Light,
    /// [`handle_text_node`] with trimming; nested lists go to [`handle_lists`]
    TextNode,
}

/// Rebuilds the children of `from` under `dest`, keeping their nesting and
/// order. A node failing the check loses its subtree but keeps its tail.
/// Every visited node ends up processed.
fn rebuild_children(
    src: &mut Tree,
    from: NodeId,
    dest: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
    check: Check,
    depth: usize,
) {
    let mut stack: Vec<(NodeId, NodeId)> = src.children(from).iter().rev().map(|&c| (c, dest)).collect();

    while let Some((node, parent)) = stack.pop() {
        if src.is_processed(node) {
            continue;
        }
        if check == Check::TextNode && src.tag(node) == "list" {
            if let Some(list) = handle_lists_at(src, node, state, opts, depth + 1) {
                state.out_mut().append(parent, list);
            }
            src.mark_subtree_processed(node);
            continue;
        }

        let keep = match check {
            Check::Light => process_node(src, node, state, opts),
            Check::TextNode => handle_text_node(src, node, state, opts, false, false),
        };
        if !keep {
            let tail = text::trim(src.tail(node));
            src.mark_subtree_processed(node);
            state.out_mut().append_text(parent, &tail);
            continue;
        }

        src.mark_processed(node);
        let out = state.out_mut();
        let copy = out.sub_element(parent, src.tag(node));
        copy_rend(src, node, out, copy);
        if let Some(target) = src.get(node, "target") {
            out.set(copy, "target", target);
        }
        out.set_text(copy, src.text(node));
        out.set_tail(copy, src.tail(node));
        for &child in src.children(node).iter().rev() {
            stack.push((child, copy));
        }
    }
}

// === Titles and inline elements ===

/// Headings.
///
/// A heading with children is rebuilt node by node; a bare heading is
/// checked and copied. Headings that are empty or read as boilerplate are
/// dropped.
pub fn handle_titles(
    src: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> Option<NodeId> {
    let title = if src.has_children(id) {
        let out = state.out_mut();
        let title = out.element("head");
        copy_rend(src, id, out, title);
        out.set_text(title, text::trim(src.text(id)));
        rebuild_children(src, id, title, state, opts, Check::TextNode, 0);
        title
    } else {
        if !process_node(src, id, state, opts) {
            src.mark_processed(id);
            return None;
        }
        copy_element(src, id, state.out_mut())
    };
    src.mark_subtree_processed(id);

    let out = state.out_mut();
    out.set_tail(title, text::trim(src.tail(id)));
    let content = text::trim(&out.iter_text(title, " "));
    if text::text_chars_test(&content) && !text::is_boilerplate_line(&content) {
        Some(title)
    } else {
        debug!("discarding empty or boilerplate heading");
        None
    }
}

/// Inline formatting (`hi`, `ref`, `span`) met outside a paragraph.
///
/// The element is wrapped in a `p` unless it already sits in a container
/// that may hold inline content.
pub fn handle_formatting(
    src: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> Option<NodeId> {
    let accepted = process_node(src, id, state, opts);
    src.mark_subtree_processed(id);
    if !accepted {
        return None;
    }

    let formatting = copy_element(src, id, state.out_mut());
    let context = src.parent(id).or_else(|| src.previous_sibling(id));
    if context.is_some_and(|c| FORMATTING_PROTECTED.contains(&src.tag(c))) {
        return Some(formatting);
    }
    let out = state.out_mut();
    let paragraph = out.element("p");
    out.append(paragraph, formatting);
    Some(paragraph)
}

// === Code and quotes ===

/// Returns `true` if the element looks like a block of source code.
#[must_use]
pub fn is_code_block_element(tree: &Tree, id: NodeId) -> bool {
    if tree.get(id, "lang").is_some() || tree.tag(id) == "code" {
        return true;
    }
    if tree.parent(id).is_some_and(|p| tree.attr(p, "class").contains("highlight")) {
        return true;
    }
    let children = tree.children(id);
    children.len() == 1 && tree.tag(children[0]) == "code"
}

/// Copies a code block verbatim as a `code` element without attributes.
pub fn handle_code_blocks(src: &mut Tree, id: NodeId, state: &mut ExtractionState<'_>) -> NodeId {
    let out = state.out_mut();
    let code = src.copy_subtree(id, out);
    out.set_tag(code, "code");
    out.strip_tags(code, &["code"]);
    for node in out.iter(code) {
        out.clear_attributes(node);
    }
    src.mark_subtree_processed(id);
    code
}

/// Quotes and code blocks.
pub fn handle_quotes(
    src: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> Option<NodeId> {
    if is_code_block_element(src, id) {
        return Some(handle_code_blocks(src, id, state));
    }

    let quote = state.out_mut().element(src.tag(id));
    if process_node(src, id, state, opts) {
        let out = state.out_mut();
        out.set_text(quote, src.text(id));
        out.set_tail(quote, src.tail(id));
    }
    rebuild_children(src, id, quote, state, opts, Check::Light, 0);
    src.mark_subtree_processed(id);

    let out = state.out_mut();
    if !is_text_element(out, quote) {
        debug!("discarding empty quote");
        return None;
    }
    out.strip_tags(quote, &["quote"]);
    Some(quote)
}

// === Lists ===

/// Lists: every `item` of the list becomes an output item, nested lists
/// included.
pub fn handle_lists(
    src: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> Option<NodeId> {
    handle_lists_at(src, id, state, opts, 0)
}

fn handle_lists_at(
    src: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
    depth: usize,
) -> Option<NodeId> {
    if depth >= MAX_NESTING_DEPTH {
        return flatten_list(src, id, state);
    }

    let out = state.out_mut();
    let list = out.element("list");
    copy_rend(src, id, out, list);
    let own = text::trim(src.text(id));
    if !own.is_empty() {
        let first = out.sub_element(list, "item");
        out.set_text(first, own);
    }

    for item in src.iter_tags(id, &["item"]) {
        if src.is_processed(item) {
            continue;
        }
        let new_item = state.out_mut().element("item");

        if src.has_children(item) {
            state.out_mut().set_text(new_item, text::trim(src.text(item)));
            rebuild_children(src, item, new_item, state, opts, Check::TextNode, depth);
            let tail = text::trim(src.tail(item));
            let out = state.out_mut();
            match out.children(new_item).last().copied() {
                Some(last) => {
                    let joined = join_text(out.tail(last), &tail);
                    out.set_tail(last, joined);
                }
                None => out.append_text(new_item, &tail),
            }
        } else if process_node(src, item, state, opts) {
            let content = join_text(src.text(item), src.tail(item));
            state.out_mut().set_text(new_item, content);
        }

        let out = state.out_mut();
        if !out.text(new_item).is_empty() || out.has_children(new_item) {
            copy_rend(src, item, out, new_item);
            out.append(list, new_item);
        }
        src.mark_subtree_processed(item);
    }
    src.mark_processed(id);

    let out = state.out_mut();
    if !is_text_element(out, list) {
        debug!("discarding list without text");
        return None;
    }
    out.set_tail(list, text::trim(src.tail(id)));
    Some(list)
}

fn flatten_list(src: &mut Tree, id: NodeId, state: &mut ExtractionState<'_>) -> Option<NodeId> {
    let content = text::trim(&src.iter_text(id, " "));
    src.mark_subtree_processed(id);
    if !text::text_chars_test(&content) {
        return None;
    }
    debug!(depth = MAX_NESTING_DEPTH, "list nesting limit reached, flattening");
    let out = state.out_mut();
    let list = out.element("list");
    let item = out.sub_element(list, "item");
    out.set_text(item, content);
    Some(list)
}

// === Paragraphs ===

/// Paragraphs.
///
/// Direct children are rebuilt one level deep: inline elements keep their
/// text, nested paragraphs are merged into the text, images go through
/// [`handle_image`]. A child whose tag is not accepted loses its content
/// but its tail stays in the paragraph.
pub fn handle_paragraphs(
    src: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> Option<NodeId> {
    src.clear_attributes(id);

    if !src.has_children(id) {
        let keep = process_node(src, id, state, opts);
        src.mark_processed(id);
        if !keep {
            return None;
        }
        return Some(copy_element(src, id, state.out_mut()));
    }

    let whole = text::trim(&src.iter_text(id, " "));
    if state.is_duplicate(&whole, opts) {
        debug!("duplicate paragraph discarded");
        src.mark_subtree_processed(id);
        return None;
    }

    let paragraph = state.out_mut().element("p");
    state.out_mut().set_text(paragraph, text::trim(src.text(id)));

    for child in src.children(id).to_vec() {
        if src.is_processed(child) {
            continue;
        }
        let tag = src.tag(child).to_string();

        if !state.is_potential_tag(&tag) {
            debug!(tag = %tag, "unexpected element in paragraph");
            let tail = text::trim(src.tail(child));
            src.mark_subtree_processed(child);
            state.out_mut().append_text(paragraph, &tail);
            continue;
        }

        if tag == "graphic" {
            match handle_image(src, child, state, opts) {
                Some(image) => state.out_mut().append(paragraph, image),
                None => {
                    let tail = text::trim(src.tail(child));
                    state.out_mut().append_text(paragraph, &tail);
                }
            }
            src.mark_subtree_processed(child);
            continue;
        }

        if !prepare_text_node(src, child, false, true) {
            let tail = text::trim(src.tail(child));
            src.mark_subtree_processed(child);
            state.out_mut().append_text(paragraph, &tail);
            continue;
        }

        let content = text::trim(&src.iter_text(child, " "));
        let tail = text::trim(src.tail(child));
        let out = state.out_mut();
        match tag.as_str() {
            "p" => {
                out.append_text(paragraph, &content);
                out.append_text(paragraph, &tail);
            }
            "lb" => {
                let lb = out.sub_element(paragraph, "lb");
                out.set_tail(lb, tail);
            }
            _ => {
                let inline = out.sub_element(paragraph, &tag);
                copy_rend(src, child, out, inline);
                if let Some(target) = src.get(child, "target") {
                    out.set(inline, "target", target);
                }
                out.set_text(inline, content);
                out.set_tail(inline, tail);
            }
        }
        src.mark_subtree_processed(child);
    }
    src.mark_subtree_processed(id);

    let out = state.out_mut();
    if let Some(last) = out.children(paragraph).last().copied() {
        if out.tag(last) == "lb" && out.tail(last).is_empty() {
            out.remove(last, false);
        }
    }
    if is_text_element(out, paragraph) || has_graphic(out, paragraph) {
        out.set_tail(paragraph, text::trim(src.tail(id)));
        Some(paragraph)
    } else {
        debug!("discarding empty paragraph");
        None
    }
}

// === Tables ===

/// Nearest `table` ancestor of a node.
fn owning_table(tree: &Tree, id: NodeId) -> Option<NodeId> {
    tree.ancestors(id).find(|&a| tree.tag(a) == "table")
}

fn colspan(tree: &Tree, cell: NodeId) -> usize {
    tree.attr(cell, "colspan")
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|&span| span > 0)
        .unwrap_or(1)
        .min(MAX_COLSPAN)
}

/// Widest row (sum of colspans) and the distinct colspans seen.
fn column_layout(tree: &Tree, rows: &[NodeId]) -> (usize, BTreeSet<usize>) {
    let mut max_cols = 0;
    let mut spans = BTreeSet::new();
    for &row in rows {
        let mut width = 0;
        for &cell in tree.children(row) {
            if tree.is_tag(cell, &XML_CELL_TAGS) {
                let span = colspan(tree, cell);
                spans.insert(span);
                width += span;
            }
        }
        max_cols = max_cols.max(width);
    }
    (max_cols, spans)
}

/// Marks everything owned by `table` as processed; nested tables stay
/// available to the sweep.
fn mark_table_processed(tree: &mut Tree, table: NodeId) {
    tree.mark_processed(table);
    for node in tree.descendants(table) {
        if tree.tag(node) != "table" && owning_table(tree, node) == Some(table) {
            tree.mark_processed(node);
        }
    }
}

fn handle_cell(
    src: &mut Tree,
    cell: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
    is_header: bool,
) -> Option<NodeId> {
    let new_cell = state.out_mut().element("cell");
    if is_header {
        state.out_mut().set(new_cell, "role", "head");
    }

    if src.has_children(cell) {
        state.out_mut().set_text(new_cell, text::trim(src.text(cell)));
        let div_was_accepted = state.is_potential_tag("div");
        state.add_potential_tag("div");
        let mut scope = SubtreeScope::new(src, cell);
        for child in src.descendants(cell) {
            if src.is_processed(child) || !scope.contains(src, child) {
                continue;
            }
            let handled = handle_text_elem(src, child, state, opts);
            src.mark_processed(child);
            if let Some(node) = handled {
                state.out_mut().append(new_cell, node);
            }
        }
        if !div_was_accepted {
            state.remove_potential_tag("div");
        }
    } else if process_node(src, cell, state, opts) {
        state.out_mut().set_text(new_cell, src.text(cell));
    }
    src.mark_subtree_processed(cell);

    let out = state.out();
    (is_text_element(out, new_cell) || has_graphic(out, new_cell)).then_some(new_cell)
}

/// Tables.
///
/// Rows become `row`, cells become `cell` (with `role="head"` for header
/// cells of the first header row). Rows of a table with mixed colspans
/// carry the table width in `span`. A cell holding a nested table ends its
/// row; the nested table is left for the sweep.
pub fn handle_table(
    src: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> Option<NodeId> {
    src.strip_tags(id, &TABLE_TAGS_TO_STRIP);
    if link_density_test_tables(src, id) {
        debug!("link density: skipping table");
        mark_table_processed(src, id);
        return None;
    }

    let rows: Vec<NodeId> = src
        .iter_tags(id, &["tr"])
        .into_iter()
        .filter(|&tr| owning_table(src, tr) == Some(id))
        .collect();
    let (max_cols, spans) = column_layout(src, &rows);
    let row_span = (spans.len() > 1 && max_cols > 1).then_some(max_cols);

    let table = state.out_mut().element("table");
    let mut seen_header_row = false;
    for row in rows {
        let new_row = state.out_mut().element("row");
        if let Some(span) = row_span {
            state.out_mut().set(new_row, "span", span.to_string());
        }

        let mut seen_header = false;
        for cell in src.children(row).to_vec() {
            if !src.is_tag(cell, &XML_CELL_TAGS) {
                continue;
            }
            if src.find(cell, &["table"]).is_some() {
                debug!("nested table ends the row");
                break;
            }
            let is_header = src.tag(cell) == "th" && !seen_header_row;
            seen_header |= is_header;
            if let Some(new_cell) = handle_cell(src, cell, state, opts, is_header) {
                state.out_mut().append(new_row, new_cell);
            }
        }
        seen_header_row |= seen_header;

        let out = state.out_mut();
        if out.has_children(new_row) {
            out.append(table, new_row);
        }
    }
    mark_table_processed(src, id);

    let out = state.out_mut();
    if !out.has_children(table) {
        debug!("discarding table without rows");
        return None;
    }
    out.set_tail(table, text::trim(src.tail(id)));
    Some(table)
}

// === Images ===

/// Images: the first usable source among `data-src`, `src` and other
/// `data-src*` attributes, resolved against the base URL.
pub fn handle_image(
    src: &Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> Option<NodeId> {
    let source = ["data-src", "src"]
        .iter()
        .filter_map(|name| src.get(id, name))
        .map(str::trim)
        .find(|value| is_image_file(value))
        .or_else(|| {
            src.attributes(id)
                .iter()
                .filter(|(name, _)| name.starts_with("data-src"))
                .map(|(_, value)| value.trim())
                .find(|value| is_image_file(value))
        });
    let Some(source) = source else {
        debug!("discarding image without a usable source");
        return None;
    };

    let base = opts.base_url();
    let out = state.out_mut();
    let graphic = out.element("graphic");
    out.set(graphic, "src", resolve_url(source, base.as_ref()));
    for name in ["alt", "title"] {
        if let Some(value) = src.get(id, name) {
            out.set(graphic, name, value);
        }
    }
    out.set_tail(graphic, text::trim(src.tail(id)));
    Some(graphic)
}

// === Everything else ===

/// Generic handler for accepted tags without a dedicated handler. A `div`
/// is emitted as a paragraph; only the element's own text is taken, its
/// children are left to the sweep.
pub fn handle_other_elements(
    src: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> Option<NodeId> {
    let tag = src.tag(id).to_string();
    if tag == "div" && src.attr(id, "class").contains("w3-code") {
        return Some(handle_code_blocks(src, id, state));
    }
    if !state.is_potential_tag(&tag) {
        debug!(tag = %tag, "discarding element");
        return None;
    }
    if !handle_text_node(src, id, state, opts, false, true) {
        return None;
    }

    let own = text::trim(src.text(id));
    if !text::text_chars_test(&own) {
        return None;
    }
    let out = state.out_mut();
    let element = out.element(if tag == "div" { "p" } else { tag.as_str() });
    copy_rend(src, id, out, element);
    out.set_text(element, own);
    out.set_tail(element, text::trim(src.tail(id)));
    Some(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::html_processing::{convert_tags, tree_cleaning};
    use crate::lru::DedupCache;
    use pretty_assertions::assert_eq;

    fn prepared(html: &str, opts: &Options) -> Tree {
        let mut tree = dom::parse(html).unwrap();
        tree_cleaning(&mut tree, opts);
        convert_tags(&mut tree, opts);
        tree
    }

    fn first(tree: &Tree, tag: &str) -> NodeId {
        tree.find(tree.root(), &[tag]).unwrap()
    }

    #[test]
    fn test_paragraph_keeps_tail_of_rejected_child() {
        let opts = Options::default();
        let mut tree = dom::parse("<p>before<span>gone</span>after</p>").unwrap();
        let p = first(&tree, "p");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_paragraphs(&mut tree, p, &mut state, &opts).unwrap();
        assert_eq!(state.out().iter_text(out, ""), "before after");
        assert!(tree.is_processed(p));
        assert!(tree.iter(p).into_iter().all(|n| tree.is_processed(n)));
    }

    #[test]
    fn test_paragraph_keeps_formatting() {
        let opts = Options {
            include_formatting: true,
            ..Options::default()
        };
        let mut tree = prepared("<p>Some <b>bold</b> words</p>", &opts);
        let p = first(&tree, "p");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_paragraphs(&mut tree, p, &mut state, &opts).unwrap();
        assert_eq!(state.out().to_xml(out), r##"<p>Some<hi rend="#b">bold</hi>words</p>"##);
    }

    #[test]
    fn test_fully_formatted_paragraph_survives_dedup() {
        let opts = Options {
            include_formatting: true,
            deduplicate: true,
            ..Options::default()
        };
        let mut tree = prepared("<p><b>Every word of this paragraph is bold</b></p>", &opts);
        let p = first(&tree, "p");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_paragraphs(&mut tree, p, &mut state, &opts).unwrap();
        assert_eq!(
            state.out().to_xml(out),
            r##"<p><hi rend="#b">Every word of this paragraph is bold</hi></p>"##
        );
    }

    #[test]
    fn test_paragraph_drops_trailing_break() {
        let opts = Options::default();
        let mut tree = prepared("<p>line one<br>line two<br></p>", &opts);
        let p = first(&tree, "p");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_paragraphs(&mut tree, p, &mut state, &opts).unwrap();
        assert_eq!(state.out().to_xml(out), "<p>line one<lb/>line two</p>");
    }

    #[test]
    fn test_title_rejects_boilerplate() {
        let opts = Options::default();
        let mut tree = prepared("<h2>Facebook</h2><h2>Results of the survey</h2>", &opts);
        let heads = tree.iter_tags(tree.root(), &["head"]);
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        assert!(handle_titles(&mut tree, heads[0], &mut state, &opts).is_none());
        let kept = handle_titles(&mut tree, heads[1], &mut state, &opts).unwrap();
        assert_eq!(state.out().iter_text(kept, ""), "Results of the survey");
        assert_eq!(state.out().attr(kept, "rend"), "h2");
    }

    #[test]
    fn test_formatting_wrapped_in_paragraph() {
        let opts = Options {
            include_formatting: true,
            ..Options::default()
        };
        let mut tree = prepared("<div><b>Standalone bold text</b></div>", &opts);
        let hi = first(&tree, "hi");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_formatting(&mut tree, hi, &mut state, &opts).unwrap();
        assert_eq!(state.out().to_xml(out), r##"<p><hi rend="#b">Standalone bold text</hi></p>"##);
    }

    #[test]
    fn test_formatting_inside_cell_is_not_wrapped() {
        let opts = Options {
            include_formatting: true,
            ..Options::default()
        };
        let mut tree = prepared("<table><tr><td>Price: <b>10</b> EUR</td></tr></table>", &opts);
        let table = first(&tree, "table");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_table(&mut tree, table, &mut state, &opts).unwrap();
        let xml = state.out().to_xml(out);
        assert!(xml.contains(r##"<hi rend="#b">10</hi>"##), "{xml}");
        assert!(!xml.contains("<p>"), "{xml}");
    }

    #[test]
    fn test_code_block_detection() {
        let tree = prepared(r#"<pre><code>fn main() {}</code></pre><pre lang="rust">x</pre><blockquote>said</blockquote>"#, &Options::default());
        let quotes = tree.iter_tags(tree.root(), &["quote"]);
        assert!(is_code_block_element(&tree, quotes[0]));
        assert!(is_code_block_element(&tree, quotes[1]));
        assert!(!is_code_block_element(&tree, quotes[2]));
    }

    #[test]
    fn test_code_block_copied_verbatim() {
        let opts = Options::default();
        let mut tree = prepared(r#"<pre class="src"><code>let x = 1;</code></pre>"#, &opts);
        let quote = first(&tree, "quote");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_quotes(&mut tree, quote, &mut state, &opts).unwrap();
        assert_eq!(state.out().to_xml(out), "<code>let x = 1;</code>");
    }

    #[test]
    fn test_quote_flattens_nested_quotes() {
        let opts = Options::default();
        let mut tree = prepared(
            "<blockquote>Outer words here<blockquote>inner words here</blockquote></blockquote>",
            &opts,
        );
        let quote = first(&tree, "quote");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_quotes(&mut tree, quote, &mut state, &opts).unwrap();
        let out_tree = state.out();
        assert!(out_tree.find(out, &["quote"]).is_none());
        assert_eq!(text::trim(&out_tree.iter_text(out, " ")), "Outer words here inner words here");
    }

    #[test]
    fn test_nested_lists() {
        let opts = Options::default();
        let mut tree = prepared(
            "<ul><li>first entry</li><li>second entry<ul><li>nested entry</li></ul></li></ul>",
            &opts,
        );
        let list = first(&tree, "list");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_lists(&mut tree, list, &mut state, &opts).unwrap();
        assert_eq!(
            state.out().to_xml(out),
            "<list><item>first entry</item><item>second entry<list><item>nested entry</item></list></item></list>"
        );
    }

    #[test]
    fn test_deep_lists_flattened() {
        let opts = Options::default();
        let depth = MAX_NESTING_DEPTH + 20;
        let html = format!("{}deep text{}", "<ul><li>".repeat(depth), "</li></ul>".repeat(depth));
        let mut tree = prepared(&html, &opts);
        let list = first(&tree, "list");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_lists(&mut tree, list, &mut state, &opts).unwrap();
        assert_eq!(text::trim(&state.out().iter_text(out, " ")), "deep text");
        assert!(tree.iter(list).into_iter().all(|n| tree.is_processed(n)));
    }

    #[test]
    fn test_table_colspan_and_header() {
        let opts = Options::default();
        let mut tree = prepared(
            r#"<table><tr><th colspan="2">A</th></tr><tr><td>B</td><td>C</td></tr></table>"#,
            &opts,
        );
        let table = first(&tree, "table");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_table(&mut tree, table, &mut state, &opts).unwrap();
        let out_tree = state.out();
        let rows = out_tree.children(out);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|&r| out_tree.attr(r, "span") == "2"));
        let header = out_tree.children(rows[0])[0];
        assert_eq!(out_tree.attr(header, "role"), "head");
        assert_eq!(out_tree.text(header), "A");
        let cells: Vec<&str> = out_tree.children(rows[1]).iter().map(|&c| out_tree.text(c)).collect();
        assert_eq!(cells, vec!["B", "C"]);
    }

    #[test]
    fn test_single_letter_cells_are_kept() {
        let opts = Options::default();
        let mut tree = prepared(
            "<table><tr><th>H1</th><th>H2</th></tr><tr><th>R1</th><td>x</td></tr></table>",
            &opts,
        );
        let table = first(&tree, "table");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_table(&mut tree, table, &mut state, &opts).unwrap();
        let out_tree = state.out();
        let rows = out_tree.children(out);
        assert_eq!(rows.len(), 2);
        let cells: Vec<&str> = out_tree.children(rows[1]).iter().map(|&c| out_tree.text(c)).collect();
        assert_eq!(cells, vec!["R1", "x"]);
    }

    #[test]
    fn test_uniform_table_has_no_span() {
        let opts = Options::default();
        let mut tree = prepared("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>", &opts);
        let table = first(&tree, "table");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_table(&mut tree, table, &mut state, &opts).unwrap();
        let out_tree = state.out();
        assert!(out_tree.children(out).iter().all(|&r| out_tree.get(r, "span").is_none()));
    }

    #[test]
    fn test_nested_table_left_for_sweep() {
        let opts = Options::default();
        let mut tree = prepared(
            "<table><tr><td>left</td><td><table><tr><td>inner</td></tr></table></td><td>after</td></tr></table>",
            &opts,
        );
        let tables = tree.iter_tags(tree.root(), &["table"]);
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_table(&mut tree, tables[0], &mut state, &opts).unwrap();
        assert_eq!(text::trim(&state.out().iter_text(out, " ")), "left");
        assert!(!tree.is_processed(tables[1]));
    }

    #[test]
    fn test_image_source_resolution() {
        let opts = Options {
            include_images: true,
            url: Some("https://example.org/blog/post".to_string()),
            ..Options::default()
        };
        let mut tree = dom::parse(r#"<graphic data-src="/img/a.jpg" src="data:," alt="A"/>"#).unwrap();
        let graphic = first(&tree, "graphic");
        tree.set_tail(graphic, "");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        let out = handle_image(&tree, graphic, &mut state, &opts).unwrap();
        assert_eq!(state.out().attr(out, "src"), "https://example.org/img/a.jpg");
        assert_eq!(state.out().attr(out, "alt"), "A");
    }

    #[test]
    fn test_image_without_source() {
        let opts = Options::default();
        let tree = dom::parse(r#"<graphic src="pixel"/>"#).unwrap();
        let graphic = first(&tree, "graphic");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);
        assert!(handle_image(&tree, graphic, &mut state, &opts).is_none());
    }

    #[test]
    fn test_other_div_becomes_paragraph() {
        let opts = Options::default();
        let mut tree = prepared("<div>Loose text in a block</div>", &opts);
        let div = first(&tree, "div");
        let mut cache = DedupCache::default();
        let mut state = ExtractionState::new(&opts, &mut cache);

        assert!(handle_other_elements(&mut tree, div, &mut state, &opts).is_none());
        state.add_potential_tag("div");
        let out = handle_other_elements(&mut tree, div, &mut state, &opts).unwrap();
        assert_eq!(state.out().to_xml(out), "<p>Loose text in a block</p>");
    }
}
