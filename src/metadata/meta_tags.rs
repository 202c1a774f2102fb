//! HTML Meta Tag Extraction
//!
//! Standard `<meta>` tags, Open Graph and Twitter cards, plus the few
//! document elements that carry metadata: `<title>`, the first `<h1>`,
//! `<link rel="canonical">` and `<html lang>`.

use crate::result::DocumentMetadata;
use crate::text;
use crate::tree::Tree;

fn fill(slot: &mut Option<String>, value: &str) {
    let value = text::trim(value);
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value);
    }
}

/// Fills `metadata` fields still empty from `<meta>` tags.
pub fn examine_meta(tree: &Tree, metadata: &mut DocumentMetadata) {
    for meta in tree.iter_tags(tree.root(), &["meta"]) {
        let key = ["name", "property", "itemprop"]
            .iter()
            .find_map(|attr| tree.get(meta, attr))
            .unwrap_or_default()
            .to_lowercase();
        let content = tree.attr(meta, "content");
        if key.is_empty() || content.trim().is_empty() {
            continue;
        }

        match key.as_str() {
            "og:title" | "twitter:title" | "dc.title" => fill(&mut metadata.title, content),
            "author" | "article:author" | "dc.creator" | "byl" | "parsely-author" => {
                fill(&mut metadata.author, content);
            }
            "description" | "og:description" | "twitter:description" | "dc.description" => {
                fill(&mut metadata.description, content);
            }
            "og:site_name" | "application-name" | "publisher" | "dc.publisher" => {
                fill(&mut metadata.sitename, content);
            }
            "og:url" | "twitter:url" => fill(&mut metadata.url, content),
            _ => {}
        }
    }
}

/// Fills title, canonical URL and language from document elements.
pub fn examine_document(tree: &Tree, metadata: &mut DocumentMetadata) {
    let root = tree.root();
    if metadata.title.is_none() {
        if let Some(title) = tree.find(root, &["title"]) {
            fill(&mut metadata.title, &tree.text_content(title));
        }
    }
    if metadata.title.is_none() {
        if let Some(h1) = tree.find(root, &["h1"]) {
            fill(&mut metadata.title, &tree.text_content(h1));
        }
    }

    if metadata.url.is_none() {
        let canonical = tree
            .iter_tags(root, &["link"])
            .into_iter()
            .find(|&link| tree.attr(link, "rel").eq_ignore_ascii_case("canonical"));
        if let Some(link) = canonical {
            fill(&mut metadata.url, tree.attr(link, "href"));
        }
    }

    if metadata.language.is_none() {
        fill(&mut metadata.language, tree.attr(root, "lang"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_open_graph_and_meta() {
        let tree = dom::parse(
            r#"<html><head>
            <meta property="og:title" content=" OG  Title ">
            <meta name="author" content="Jane Doe">
            <meta name="description" content="About things">
            <meta property="og:site_name" content="Example News">
            </head><body></body></html>"#,
        )
        .unwrap();
        let mut metadata = DocumentMetadata::default();
        examine_meta(&tree, &mut metadata);

        assert_eq!(metadata.title.as_deref(), Some("OG Title"));
        assert_eq!(metadata.author.as_deref(), Some("Jane Doe"));
        assert_eq!(metadata.description.as_deref(), Some("About things"));
        assert_eq!(metadata.sitename.as_deref(), Some("Example News"));
    }

    #[test]
    fn test_document_elements() {
        let tree = dom::parse(
            r#"<html lang="de"><head><link rel="canonical" href="https://example.de/a"></head>
            <body><h1>Überschrift</h1></body></html>"#,
        )
        .unwrap();
        let mut metadata = DocumentMetadata::default();
        examine_document(&tree, &mut metadata);

        assert_eq!(metadata.title.as_deref(), Some("Überschrift"));
        assert_eq!(metadata.url.as_deref(), Some("https://example.de/a"));
        assert_eq!(metadata.language.as_deref(), Some("de"));
    }

    #[test]
    fn test_title_element_before_heading() {
        let tree = dom::parse("<html><head><title>Page</title></head><body><h1>Heading</h1></body></html>").unwrap();
        let mut metadata = DocumentMetadata::default();
        examine_document(&tree, &mut metadata);
        assert_eq!(metadata.title.as_deref(), Some("Page"));
    }
}
