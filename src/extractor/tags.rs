//! Tag catalogs.
//!
//! Source-side lists drive cleaning and conversion; the converted-side
//! catalogs drive handler dispatch and the output vocabulary check. Arrays
//! are for iteration and `strip_tags` calls, `HashSet`s for lookup.

use std::collections::HashSet;
use std::sync::LazyLock;

// === Cleaning ===

/// Tags removed with their whole subtree during cleaning.
pub static TAGS_TO_CLEAN: [&str; 50] = [
    // important
    "aside", "embed", "footer", "form", "head", "iframe", "menu", "object", "script",
    // other content
    "applet", "audio", "canvas", "figure", "map", "picture", "svg", "video",
    // secondary
    "area", "blink", "button", "datalist", "dialog", "frame", "frameset", "fieldset",
    "link", "input", "ins", "label", "legend", "marquee", "math", "menuitem", "nav",
    "noscript", "optgroup", "option", "output", "param", "progress", "rp", "rt", "rtc",
    "select", "source", "style", "track", "textarea", "time", "use",
];

/// Tags removed but kept when images are extracted.
pub static IMAGE_CONTAINER_TAGS: [&str; 3] = ["figure", "picture", "source"];

/// Tags removed when tables are not extracted.
pub static TABLE_CLEAN_TAGS: [&str; 4] = ["table", "td", "th", "tr"];

/// Tags whose element disappears while text and children stay in place.
pub static TAGS_TO_STRIP: [&str; 20] = [
    "abbr", "acronym", "address", "bdi", "bdo", "big", "cite", "data", "dfn", "font",
    "hgroup", "img", "mark", "meta", "ruby", "small", "tbody", "template", "tfoot", "thead",
];

/// Tags removed when they hold nothing at all.
pub static EMPTY_TAGS_TO_REMOVE: [&str; 22] = [
    "article", "b", "blockquote", "dd", "div", "dt", "em",
    "h1", "h2", "h3", "h4", "h5", "h6", "i", "li", "main",
    "p", "pre", "q", "section", "span", "strong",
];

/// Table structure wrappers stripped by the table handler.
pub static TABLE_TAGS_TO_STRIP: [&str; 3] = ["tbody", "tfoot", "thead"];

// === Conversion ===

/// Source list containers.
pub static XML_LIST_TAGS: [&str; 3] = ["ul", "ol", "dl"];

/// Source list entries.
pub static XML_ITEM_TAGS: [&str; 3] = ["dd", "dt", "li"];

/// Source quote-like blocks.
pub static XML_QUOTE_TAGS: [&str; 3] = ["blockquote", "pre", "q"];

/// Source headings.
pub static XML_HEAD_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Source line breaks.
pub static XML_LB_TAGS: [&str; 2] = ["br", "hr"];

/// Source deletions.
pub static XML_DEL_TAGS: [&str; 3] = ["del", "s", "strike"];

/// Source cells.
pub static XML_CELL_TAGS: [&str; 2] = ["td", "th"];

/// Inline formatting tags and the `rend` value they convert to.
pub static REND_TAG_MAPPING: [(&str, &str); 11] = [
    ("em", "#i"),
    ("i", "#i"),
    ("b", "#b"),
    ("strong", "#b"),
    ("u", "#u"),
    ("kbd", "#t"),
    ("samp", "#t"),
    ("tt", "#t"),
    ("var", "#t"),
    ("sub", "#sub"),
    ("sup", "#sup"),
];

/// Source formatting tag names, from [`REND_TAG_MAPPING`].
pub static FORMAT_TAGS: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| REND_TAG_MAPPING.iter().map(|(tag, _)| *tag).collect());

// === Dispatch (converted names) ===

/// Tags accepted by default during the handler sweep.
pub static TAG_CATALOG: [&str; 10] = [
    "blockquote", "code", "del", "head", "hi", "lb", "list", "p", "pre", "quote",
];

/// Quote and code blocks.
pub static CODES_QUOTES: [&str; 2] = ["code", "quote"];

/// Inline elements handled by the formatting handler.
pub static FORMATTING: [&str; 3] = ["hi", "ref", "span"];

/// Containers an inline element may sit in without a paragraph wrapper.
pub static FORMATTING_PROTECTED: [&str; 10] = [
    "code", "head", "hi", "item", "list", "p", "quote", "ref", "td", "th",
];

/// Elements dropped from the end of a body.
pub static NOT_AT_THE_END: [&str; 2] = ["head", "ref"];

/// Block-level source tags; a `div` containing any of them is not a leaf.
pub static BLOCK_TAGS: [&str; 22] = [
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "main", "ol", "p", "ul",
];

/// The closed output vocabulary of an extracted body.
pub static OUTPUT_TAGS: [&str; 15] = [
    "body", "head", "p", "list", "item", "quote", "code", "table", "row", "cell",
    "graphic", "hi", "ref", "lb", "del",
];

/// `OUTPUT_TAGS` as a `HashSet`
pub static OUTPUT_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| OUTPUT_TAGS.into_iter().collect());

/// `BLOCK_TAGS` as a `HashSet`
pub static BLOCK_TAG_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| BLOCK_TAGS.into_iter().collect());

/// Returns the `rend` value for a source formatting tag.
#[inline]
#[must_use]
pub fn rend_for(tag: &str) -> Option<&'static str> {
    REND_TAG_MAPPING
        .iter()
        .find(|(source, _)| *source == tag)
        .map(|(_, rend)| *rend)
}

/// Check if tag belongs to the output vocabulary
#[inline]
#[must_use]
pub fn is_output_tag(tag: &str) -> bool {
    OUTPUT_TAG_SET.contains(tag)
}

/// Check if tag is a block-level source tag
#[inline]
#[must_use]
pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAG_SET.contains(tag)
}
