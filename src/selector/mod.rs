//! Selector Infrastructure
//!
//! Rules are plain predicate functions over a tree node, grouped into
//! ordered lists: content-area rules (which subtree holds the article),
//! discard rules (boilerplate sections to prune) and comment-area rules.
//!
//! Rules see the tree after tag conversion, so lists and items are matched
//! under both their source (`ul`, `li`) and converted (`list`, `item`) names.

use crate::tree::{NodeId, Tree};

pub mod comments;
pub mod content;
pub mod discard;

/// A selector rule that tests if a node matches certain criteria
pub type Rule = fn(&Tree, NodeId) -> bool;

/// First descendant of `root` (in document order) matching the rule.
#[must_use]
pub fn query(tree: &Tree, root: NodeId, rule: Rule) -> Option<NodeId> {
    tree.descendants(root).into_iter().find(|&n| rule(tree, n))
}

/// All descendants of `root` matching the rule, in document order.
#[must_use]
pub fn query_all(tree: &Tree, root: NodeId, rule: Rule) -> Vec<NodeId> {
    tree.descendants(root)
        .into_iter()
        .filter(|&n| rule(tree, n))
        .collect()
}

/// Lowercased class attribute.
#[must_use]
pub(crate) fn class(tree: &Tree, id: NodeId) -> String {
    tree.attr(id, "class").to_lowercase()
}

/// Lowercased id attribute.
#[must_use]
pub(crate) fn id_attr(tree: &Tree, id: NodeId) -> String {
    tree.attr(id, "id").to_lowercase()
}

/// Lowercased id and class, concatenated.
#[must_use]
pub(crate) fn id_class(tree: &Tree, id: NodeId) -> String {
    format!("{}{}", id_attr(tree, id), class(tree, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    fn has_item_class(tree: &Tree, id: NodeId) -> bool {
        class(tree, id).contains("item")
    }

    #[test]
    fn test_query_returns_first_in_document_order() {
        let tree = dom::parse(
            r#"<div><p class="Item" id="a">1</p><section><p class="item">2</p></section></div>"#,
        )
        .unwrap();
        let first = query(&tree, tree.root(), has_item_class).unwrap();
        assert_eq!(tree.attr(first, "id"), "a");
        assert_eq!(query_all(&tree, tree.root(), has_item_class).len(), 2);
    }

    #[test]
    fn test_query_excludes_root() {
        let tree = dom::parse(r#"<p class="item">x</p>"#).unwrap();
        let p = tree.find(tree.root(), &["p"]).unwrap();
        assert!(query(&tree, p, has_item_class).is_none());
    }

    #[test]
    fn test_id_class() {
        let tree = dom::parse(r#"<div id="Main" class="Post Body">x</div>"#).unwrap();
        let div = tree.find(tree.root(), &["div"]).unwrap();
        assert_eq!(id_class(&tree, div), "mainpost body");
    }
}
