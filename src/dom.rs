//! HTML Parsing Adapter
//!
//! Turns raw markup into the extraction [`Tree`] using the `dom_query` crate
//! (html5ever underneath). Only elements and text survive the conversion;
//! comments, doctypes and processing instructions are dropped. Text is
//! passed through [`text::sanitize`](crate::text::sanitize) on the way in.

use dom_query::{Document, NodeRef};

use crate::error::{Error, Result};
use crate::text;
use crate::tree::{NodeId, Tree};

/// Parses an HTML string into a [`Tree`] rooted at `html`.
///
/// The conversion walks the DOM with an explicit stack, so arbitrarily deep
/// markup cannot overflow the call stack.
pub fn parse(html: &str) -> Result<Tree> {
    let doc = Document::from(html);
    let html_sel = doc.select("html");
    let Some(html_node) = html_sel.nodes().first() else {
        return Err(Error::ParseError("document has no root element".to_string()));
    };

    let mut tree = Tree::new("html");
    let root = tree.root();
    copy_attributes(html_node, &mut tree, root);

    let mut stack: Vec<(NodeRef<'_>, NodeId)> = html_node
        .children()
        .into_iter()
        .rev()
        .map(|child| (child, root))
        .collect();

    while let Some((node, parent)) = stack.pop() {
        if node.is_text() {
            let content = text::sanitize(&node.text());
            tree.push_text(parent, &content);
        } else if node.is_element() {
            let Some(name) = node.node_name() else {
                continue;
            };
            let id = tree.sub_element(parent, &name.to_ascii_lowercase());
            copy_attributes(&node, &mut tree, id);
            for child in node.children().into_iter().rev() {
                stack.push((child, id));
            }
        }
    }

    Ok(tree)
}

fn copy_attributes(node: &NodeRef<'_>, tree: &mut Tree, id: NodeId) {
    for attr in node.attrs() {
        tree.set(id, &attr.name.local.to_ascii_lowercase(), attr.value.to_string());
    }
}

/// Returns the `body` element, or the root when the tree has none.
#[must_use]
pub fn body(tree: &Tree) -> NodeId {
    let root = tree.root();
    if tree.tag(root) == "body" {
        return root;
    }
    tree.find(root, &["body"]).unwrap_or(root)
}

/// Concatenated class and id attributes, lowercased, for substring rules.
#[must_use]
pub fn class_and_id(tree: &Tree, id: NodeId) -> String {
    format!("{} {}", tree.attr(id, "class"), tree.attr(id, "id")).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_builds_text_and_tail() {
        let tree = parse("<html><body><p>before<span>gone</span>after</p></body></html>").unwrap();
        let body = body(&tree);
        let p = tree.children(body)[0];
        assert_eq!(tree.tag(p), "p");
        assert_eq!(tree.text(p), "before");
        let span = tree.children(p)[0];
        assert_eq!(tree.text(span), "gone");
        assert_eq!(tree.tail(span), "after");
    }

    #[test]
    fn test_parse_keeps_attributes_and_drops_comments() {
        let tree =
            parse(r#"<div class="Main" data-x="1">a<!-- hidden -->b</div>"#).unwrap();
        let div = tree.find(tree.root(), &["div"]).unwrap();
        assert_eq!(tree.get(div, "class"), Some("Main"));
        assert_eq!(tree.get(div, "data-x"), Some("1"));
        assert_eq!(tree.text(div), "ab");
        assert_eq!(class_and_id(&tree, div).trim(), "main");
    }

    #[test]
    fn test_parse_empty_input_has_body() {
        let tree = parse("").unwrap();
        assert_eq!(tree.tag(body(&tree)), "body");
    }

    #[test]
    fn test_parse_sanitizes_text() {
        let tree = parse("<p>a\u{200b}b&amp;amp;c</p>").unwrap();
        let p = tree.find(tree.root(), &["p"]).unwrap();
        assert_eq!(tree.text(p), "ab&c");
    }

    #[test]
    fn test_parse_deep_nesting() {
        let html = format!("{}deep{}", "<div>".repeat(5000), "</div>".repeat(5000));
        let tree = parse(&html).unwrap();
        assert_eq!(tree.text_content(body(&tree)), "deep");
    }
}
