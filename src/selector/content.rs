//! Content-area rules.
//!
//! [`CONTENT`] is tried in order by the main extractor: the first rule that
//! matches anything selects the subtree to extract from. [`BASELINE_CONTENT_AREA`]
//! is the shorter list used by the smart baseline.

use super::{class, id_attr, Rule};
use crate::tree::{NodeId, Tree};

/// Ordered content-area rules for the main extractor.
pub static CONTENT: &[Rule] = &[
    content_rule_1,
    content_rule_2,
    content_rule_3,
    content_rule_4,
    content_rule_5,
];

/// Ordered content-area rules for the smart baseline.
pub static BASELINE_CONTENT_AREA: &[Rule] = &[
    is_article,
    is_main,
    has_main_role,
    has_content_id,
    has_content_class,
];

fn is_block_container(tree: &Tree, id: NodeId) -> bool {
    tree.is_tag(id, &["article", "div", "main", "section"])
}

/// Rule 1: explicit article-body markers on a block container.
#[must_use]
pub fn content_rule_1(tree: &Tree, id: NodeId) -> bool {
    if !is_block_container(tree, id) {
        return false;
    }
    let raw_class = tree.attr(id, "class");
    let class = class(tree, id);
    let ident = id_attr(tree, id);
    raw_class == "post"
        || raw_class == "entry"
        || tree.attr(id, "itemprop") == "articleBody"
        || [
            "post-text", "post_text", "post-body", "post-entry", "postentry",
            "post-content", "post_content", "postcontent", "article-text", "articletext",
            "entry-content", "article-content", "article__content", "article-body",
            "article__body", "articlebody", "page-content", "text-content", "body-text",
            "article__container", "art-content",
        ]
        .iter()
        .any(|p| class.contains(p))
        || [
            "entry-content", "article-content", "article__content", "article-body",
            "article__body", "articlebody", "body-text", "art-content",
        ]
        .iter()
        .any(|p| ident.contains(p))
}

/// Rule 2: the first `article` element.
#[must_use]
pub fn content_rule_2(tree: &Tree, id: NodeId) -> bool {
    tree.tag(id) == "article"
}

/// Rule 3: story and blog layouts.
#[must_use]
pub fn content_rule_3(tree: &Tree, id: NodeId) -> bool {
    if !is_block_container(tree, id) {
        return false;
    }
    let raw_class = tree.attr(id, "class");
    let class = class(tree, id);
    let ident = id_attr(tree, id);
    [
        "post-bodycopy", "storycontent", "story-content", "theme-content", "blog-content",
        "section-content", "single-content", "single-post", "main-column", "wpb_text_column",
        "story-body", "field-body", "fulltext",
    ]
    .iter()
    .any(|p| class.contains(p))
        || matches!(raw_class, "postarea" | "art-postcontent" | "text" | "cell" | "story")
        || class.starts_with("article ")
        || ident.starts_with("primary")
        || matches!(ident.as_str(), "article" | "story")
        || ident.contains("story-body")
        || tree.attr(id, "role") == "article"
}

/// Rule 4: generic main-content ids and classes.
#[must_use]
pub fn content_rule_4(tree: &Tree, id: NodeId) -> bool {
    if !is_block_container(tree, id) {
        return false;
    }
    let class = class(tree, id);
    let ident = id_attr(tree, id);
    ["content-main", "content_main", "content-body", "content__body", "main-content", "page-content"]
        .iter()
        .any(|p| class.contains(p))
        || ["content-main", "content-body", "contentbody", "main-content"]
            .iter()
            .any(|p| ident.contains(p))
        || ident == "content"
        || class == "content"
}

/// Rule 5: anything announcing itself as "main".
#[must_use]
pub fn content_rule_5(tree: &Tree, id: NodeId) -> bool {
    if tree.tag(id) == "main" {
        return true;
    }
    tree.is_tag(id, &["article", "div", "section"])
        && (class(tree, id).starts_with("main")
            || id_attr(tree, id).starts_with("main")
            || tree.attr(id, "role").starts_with("main"))
}

fn is_article(tree: &Tree, id: NodeId) -> bool {
    tree.tag(id) == "article"
}

fn is_main(tree: &Tree, id: NodeId) -> bool {
    tree.tag(id) == "main"
}

fn has_main_role(tree: &Tree, id: NodeId) -> bool {
    tree.attr(id, "role") == "main"
}

fn has_content_id(tree: &Tree, id: NodeId) -> bool {
    matches!(
        id_attr(tree, id).as_str(),
        "content" | "main-content" | "maincontent" | "article" | "post" | "story"
    )
}

fn has_content_class(tree: &Tree, id: NodeId) -> bool {
    class(tree, id).split_whitespace().any(|c| {
        matches!(
            c,
            "content" | "main-content" | "post-content" | "entry-content" | "article-body"
                | "article-content" | "story-body"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::selector::query;

    #[test]
    fn test_rule_1_matches_entry_content() {
        let tree = dom::parse(r#"<div><div class="wrap entry-content">x</div></div>"#).unwrap();
        let hit = query(&tree, tree.root(), content_rule_1).unwrap();
        assert!(tree.attr(hit, "class").contains("entry-content"));
    }

    #[test]
    fn test_rule_1_ignores_inline_tags() {
        let tree = dom::parse(r#"<span class="post-content">x</span>"#).unwrap();
        assert!(query(&tree, tree.root(), content_rule_1).is_none());
    }

    #[test]
    fn test_rule_5_main() {
        let tree = dom::parse(r#"<div id="sidebar">a</div><main>b</main>"#).unwrap();
        let hit = query(&tree, tree.root(), content_rule_5).unwrap();
        assert_eq!(tree.tag(hit), "main");
    }

    #[test]
    fn test_baseline_area_order() {
        let tree = dom::parse(r#"<div id="content"><article>x</article></div>"#).unwrap();
        let first_hit = BASELINE_CONTENT_AREA
            .iter()
            .find_map(|rule| query(&tree, tree.root(), *rule))
            .unwrap();
        assert_eq!(tree.tag(first_hit), "article");
    }

    #[test]
    fn test_content_class_token_match() {
        let tree = dom::parse(r#"<div class="page content">x</div><div class="contentinfo">y</div>"#).unwrap();
        let hits: Vec<_> = crate::selector::query_all(&tree, tree.root(), has_content_class);
        assert_eq!(hits.len(), 1);
    }
}
