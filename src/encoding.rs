//! Character encoding detection and transcoding for byte input.
//!
//! Detection order: byte-order mark, `<meta charset>`, `<meta http-equiv>`
//! content type, then UTF-8. Only the first 1024 bytes are examined, as in
//! the HTML prescan.

use std::sync::LazyLock;

use encoding_rs::{Encoding, REPLACEMENT, UTF_8};
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

const PRESCAN_LEN: usize = 1024;

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>/;]+)"#).expect("valid regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">` tag
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#).expect("valid regex")
});

/// Detects the character encoding of an HTML byte buffer.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(PRESCAN_LEN)]);
    let declared = capture(&CHARSET_META_RE, &head).or_else(|| capture(&CONTENT_TYPE_CHARSET_RE, &head));

    declared
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Transcodes HTML bytes to a UTF-8 string.
///
/// Malformed sequences become U+FFFD. A declared charset that maps to the
/// WHATWG "replacement" encoding (for example ISO-2022-KR) would turn the
/// whole document into a single replacement character and is reported as
/// [`Error::EncodingError`] instead.
///
/// # Examples
///
/// ```
/// use rs_mainbody::encoding::transcode_to_utf8;
///
/// let html = b"<html><body>Hello, World!</body></html>";
/// let utf8_str = transcode_to_utf8(html)?;
/// assert!(utf8_str.contains("Hello, World!"));
/// # Ok::<(), rs_mainbody::Error>(())
/// ```
pub fn transcode_to_utf8(html: &[u8]) -> Result<String> {
    let encoding = detect_encoding(html);
    if encoding == REPLACEMENT {
        return Err(Error::EncodingError(
            "declared charset is not decodable".to_string(),
        ));
    }

    let (decoded, used, had_errors) = encoding.decode(html);
    if had_errors {
        debug!(encoding = used.name(), "malformed byte sequences replaced");
    }
    Ok(decoded.into_owned())
}
