//! Content extraction pipeline.
//!
//! Finds the content area of a cleaned tree, prunes it, and sweeps its
//! descendants in document order through [`handle_text_elem`]. When the
//! sweep yields too little, a second sweep over an untouched copy of the
//! cleaned tree recovers loose paragraphs, quotes and tables.

use tracing::debug;

use super::handlers::{
    handle_formatting, handle_image, handle_lists, handle_other_elements, handle_paragraphs,
    handle_quotes, handle_table, handle_titles,
};
use super::state::ExtractionState;
use super::tags::{CODES_QUOTES, FORMATTING, NOT_AT_THE_END};
use crate::dom;
use crate::html_processing::{process_node, prune_unwanted_sections, sanitize_output};
use crate::lru::DedupCache;
use crate::result::ExtractionResult;
use crate::selector::{self, content::CONTENT};
use crate::text;
use crate::tree::{NodeId, SubtreeScope, Tree};
use crate::Options;

/// Routes one source element to its handler.
pub fn handle_text_elem(
    src: &mut Tree,
    id: NodeId,
    state: &mut ExtractionState<'_>,
    opts: &Options,
) -> Option<NodeId> {
    let tag = src.tag(id).to_string();
    match tag.as_str() {
        "list" => handle_lists(src, id, state, opts),
        t if CODES_QUOTES.contains(&t) => handle_quotes(src, id, state, opts),
        "head" => handle_titles(src, id, state, opts),
        "p" => handle_paragraphs(src, id, state, opts),
        "lb" => {
            if !text::text_chars_test(src.tail(id)) || !process_node(src, id, state, opts) {
                return None;
            }
            let out = state.out_mut();
            let paragraph = out.element("p");
            out.set_text(paragraph, src.tail(id));
            Some(paragraph)
        }
        t if FORMATTING.contains(&t) => handle_formatting(src, id, state, opts),
        "table" if state.is_potential_tag("table") => handle_table(src, id, state, opts),
        "graphic" if state.is_potential_tag("graphic") => handle_image(src, id, state, opts),
        _ => handle_other_elements(src, id, state, opts),
    }
}

/// Dispatches every unprocessed descendant of `root` that is still attached
/// and appends the results to the output body.
pub fn sweep(src: &mut Tree, root: NodeId, state: &mut ExtractionState<'_>, opts: &Options) {
    let mut scope = SubtreeScope::new(src, root);
    for node in src.descendants(root) {
        if src.is_processed(node) || !scope.contains(src, node) {
            continue;
        }
        if let Some(result) = handle_text_elem(src, node, state, opts) {
            let body = state.body();
            state.out_mut().append(body, result);
        }
        src.mark_processed(node);
    }
}

/// Drops headings and links left dangling at the end of the body.
fn remove_trailing_elements(out: &mut Tree) {
    let body = out.root();
    while let Some(last) = out.children(body).last().copied() {
        if !out.is_tag(last, &NOT_AT_THE_END) {
            break;
        }
        out.remove(last, false);
    }
}

fn paragraph_text_len(tree: &Tree, root: NodeId) -> usize {
    tree.iter_tags(root, &["p"])
        .into_iter()
        .map(|p| text::text_len(&tree.text_content(p)))
        .sum()
}

fn extract_area(work: &mut Tree, area: NodeId, state: &mut ExtractionState<'_>, opts: &Options) {
    prune_unwanted_sections(work, area, state, opts);

    let factor = if opts.favor_precision() { 1 } else { 3 };
    if paragraph_text_len(work, area) < opts.min_extracted_size * factor {
        state.add_potential_tag("div");
    }
    if !state.is_potential_tag("ref") {
        work.strip_tags(area, &["ref"]);
    }
    if !state.is_potential_tag("span") {
        work.strip_tags(area, &["span"]);
    }

    sweep(work, area, state, opts);
    remove_trailing_elements(state.out_mut());
}

/// Main extraction over a cleaned tree.
///
/// The first content rules are tried in order; the sweep of a matching
/// area stops the search once the body holds more than one element. With no
/// matching area the whole `body` is swept. Text recovery runs when the
/// result is empty or shorter than `min_extracted_size`, and the longer of
/// the two bodies is kept.
pub fn extract_content(cleaned: &Tree, cache: &mut DedupCache, opts: &Options) -> ExtractionResult {
    let before = cache.clone();
    let mut work = cleaned.clone();
    let body = dom::body(&work);

    let mut state = ExtractionState::new(opts, cache);
    if opts.favor_recall() {
        state.add_potential_tag("div");
    }

    let mut found_area = false;
    for (index, rule) in CONTENT.iter().enumerate() {
        let Some(area) = selector::query(&work, body, *rule) else {
            continue;
        };
        found_area = true;
        debug!(rule = index + 1, tag = work.tag(area), "content area found");
        extract_area(&mut work, area, &mut state, opts);
        if state.out().children(state.body()).len() > 1 {
            break;
        }
    }
    if !found_area {
        debug!("no content area matched, sweeping the whole body");
        extract_area(&mut work, body, &mut state, opts);
    }

    let mut result = state.into_output();
    let length = text::text_len(&result.iter_text(result.root(), " "));
    if !result.has_children(result.root()) || length < opts.min_extracted_size {
        debug!(length, "main sweep too short, recovering loose text");
        let after_sweep = std::mem::replace(cache, before);
        let recovered = recover_wild_text(cleaned, cache, opts);
        let recovered_length = text::text_len(&recovered.iter_text(recovered.root(), " "));
        if recovered_length > length {
            result = recovered;
        } else {
            *cache = after_sweep;
        }
    }

    sanitize_output(&mut result);
    remove_trailing_elements(&mut result);
    ExtractionResult::from_body(result)
}

/// Second sweep over a fresh copy of the cleaned tree, restricted to
/// paragraphs, quotes, code and tables (plus `div`, `lb` and lists in
/// recall focus).
pub fn recover_wild_text(cleaned: &Tree, cache: &mut DedupCache, opts: &Options) -> Tree {
    let mut search = cleaned.clone();
    let body = dom::body(&search);
    let mut state = ExtractionState::new(opts, cache);

    let mut targets = vec!["code", "p", "quote", "table"];
    if opts.favor_recall() {
        state.add_potential_tag("div");
        state.add_potential_tag("lb");
        targets.extend(["div", "lb", "list"]);
    }

    prune_unwanted_sections(&mut search, body, &state, opts);
    if state.is_potential_tag("ref") {
        search.strip_tags(body, &["span"]);
    } else {
        search.strip_tags(body, &["a", "ref", "span"]);
    }

    let mut scope = SubtreeScope::new(&search, body);
    for node in search.descendants(body) {
        let wanted = search.is_tag(node, &targets)
            || (search.tag(node) == "div" && search.attr(node, "class").contains("w3-code"));
        if !wanted || search.is_processed(node) || !scope.contains(&search, node) {
            continue;
        }
        if let Some(result) = handle_text_elem(&mut search, node, &mut state, opts) {
            let out_body = state.body();
            state.out_mut().append(out_body, result);
        }
        search.mark_processed(node);
    }

    let mut out = state.into_output();
    remove_trailing_elements(&mut out);
    out
}
