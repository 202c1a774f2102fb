//! Text utilities shared by every stage of the pipeline.
//!
//! Whitespace collapsing, the "has real characters" test, cleanup of
//! control characters and stray entities, and the boilerplate line filter.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

/// Lines that are nothing but a sharing button, a social network name or a
/// "more on this" teaser.
static RE_FILTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\W*(drucken|e-?mail|facebook|flipboard|google|instagram|linkedin|mail|pdf|pinterest|pocket|print|qq|reddit|twitter|wechat|weibo|whatsapp|xing|mehr zum thema:?|more on this.{0,8})\W*$",
    )
    .expect("RE_FILTER regex")
});

/// Newsletter and subscription call-to-action lines.
static RE_CTA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\W*(sign up|subscribe)( now| today)?( to| for)?( our| the)? (newsletter|updates)\W*$")
        .expect("RE_CTA regex")
});

/// Entities that survived parsing, usually because the source was escaped twice.
static RE_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|nbsp|amp|lt|gt|quot|apos);")
        .expect("RE_ENTITY regex")
});

/// Collapses every whitespace run to a single space and trims both ends.
#[must_use]
pub fn trim(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `true` if the text contains at least one alphanumeric character.
#[inline]
#[must_use]
pub fn text_chars_test(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Character length of the collapsed text.
#[must_use]
pub fn text_len(text: &str) -> usize {
    trim(text).chars().count()
}

/// Removes control characters (keeping newlines and tabs), zero-width marks,
/// and decodes entities left over in already-parsed text.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let decoded = if text.contains('&') {
        RE_ENTITY
            .replace_all(text, |caps: &regex::Captures<'_>| decode_entity(&caps[1]))
            .into_owned()
    } else {
        text.to_string()
    };
    decoded
        .chars()
        .filter_map(|c| match c {
            '\n' | '\t' => Some(c),
            '\u{a0}' => Some(' '),
            '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

fn decode_entity(name: &str) -> String {
    let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    if let Some(code) = code {
        return char::from_u32(code).map(String::from).unwrap_or_default();
    }
    match name {
        "nbsp" => " ",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => "",
    }
    .to_string()
}

/// Returns `true` if the line is a share button or a similar UI leftover.
#[must_use]
pub fn is_boilerplate_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && (RE_FILTER.is_match(line) || RE_CTA.is_match(line))
}

/// Text filter: rejects text with no real characters or containing a
/// boilerplate line.
#[must_use]
pub fn text_filter(text: &str) -> bool {
    !text_chars_test(text) || text.lines().any(is_boilerplate_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_collapses_whitespace() {
        assert_eq!(trim("  a \n\t b   c "), "a b c");
        assert_eq!(trim("   "), "");
    }

    #[test]
    fn test_text_chars_test() {
        assert!(text_chars_test("abc"));
        assert!(text_chars_test("  1 "));
        assert!(text_chars_test("日本"));
        assert!(!text_chars_test(" -- | ... "));
        assert!(!text_chars_test(""));
    }

    #[test]
    fn test_sanitize_strips_controls_and_entities() {
        assert_eq!(sanitize("a\u{0007}b\u{200b}c"), "abc");
        assert_eq!(sanitize("fish &amp; chips"), "fish & chips");
        assert_eq!(sanitize("x&#160;y"), "x y");
        assert_eq!(sanitize("&#x41;"), "A");
        assert_eq!(sanitize("line\nnext"), "line\nnext");
    }

    #[test]
    fn test_boilerplate_lines() {
        assert!(is_boilerplate_line("Facebook"));
        assert!(is_boilerplate_line("  » Print"));
        assert!(is_boilerplate_line("More on this topic"));
        assert!(is_boilerplate_line("Subscribe to our newsletter"));
        assert!(!is_boilerplate_line("Facebook reported earnings on Tuesday."));
        assert!(!is_boilerplate_line(""));
    }

    #[test]
    fn test_short_data_values_are_not_boilerplate() {
        for value in ["x", "X", "Share", "tweet", "12 x 30"] {
            assert!(!is_boilerplate_line(value), "{value:?}");
            assert!(!text_filter(value), "{value:?}");
        }
    }

    #[test]
    fn test_text_filter() {
        assert!(text_filter("..."));
        assert!(text_filter("Real text\nTwitter"));
        assert!(!text_filter("A real sentence about the topic."));
    }
}
