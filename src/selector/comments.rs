//! Comment Selectors
//!
//! Rules for locating a comment section, cleaning debris inside it, and
//! removing it from the main content.

use super::{class, id_attr, Rule};
use crate::tree::{NodeId, Tree};

const LIST_CONTAINERS: [&str; 6] = ["div", "dl", "list", "ol", "section", "ul"];

/// Comment section rules, tried in order.
pub static COMMENTS: &[Rule] = &[
    comments_rule_1,
    comments_rule_2,
    comments_rule_3,
    comments_rule_4,
];

/// Debris inside a comment section.
pub static DISCARDED_COMMENTS: &[Rule] = &[
    discarded_comments_rule_1,
    discarded_comments_rule_2,
    discarded_comments_rule_3,
];

/// Comment sections removed from the main content in precision focus.
pub static REMOVED_COMMENTS: &[Rule] = &[removed_comments_rule_1];

/// Rule 1: comment list containers.
#[must_use]
pub fn comments_rule_1(tree: &Tree, id: NodeId) -> bool {
    if !tree.is_tag(id, &LIST_CONTAINERS) {
        return false;
    }
    let class_val = class(tree, id);
    let id_class = format!("{}{class_val}", id_attr(tree, id));
    id_class.contains("commentlist")
        || id_class.contains("comment-list")
        || class_val.contains("comment-page")
        || class_val.contains("comments-content")
        || class_val.contains("post-comments")
}

/// Rule 2: comment section containers.
#[must_use]
pub fn comments_rule_2(tree: &Tree, id: NodeId) -> bool {
    if !tree.is_tag(id, &LIST_CONTAINERS) {
        return false;
    }
    let class_val = class(tree, id);
    let id_val = id_attr(tree, id);
    id_val.starts_with("comments")
        || class_val.starts_with("comments")
        || id_val.starts_with("comment-")
        || class_val.starts_with("comment-")
        || class_val.contains("article-comments")
}

/// Rule 3: third-party comment systems.
#[must_use]
pub fn comments_rule_3(tree: &Tree, id: NodeId) -> bool {
    if !tree.is_tag(id, &LIST_CONTAINERS) {
        return false;
    }
    let id_val = id_attr(tree, id);
    ["comol", "disqus_thread", "dsq_comments", "dsq-comments"]
        .iter()
        .any(|p| id_val.starts_with(p))
}

/// Rule 4: generic comment markers.
#[must_use]
pub fn comments_rule_4(tree: &Tree, id: NodeId) -> bool {
    tree.is_tag(id, &["div", "section"])
        && (id_attr(tree, id).starts_with("social") || class(tree, id).contains("comment"))
}

/// Reply forms.
#[must_use]
pub fn discarded_comments_rule_1(tree: &Tree, id: NodeId) -> bool {
    tree.is_tag(id, &["div", "section"]) && id_attr(tree, id).starts_with("respond")
}

/// Quoted parent comments.
#[must_use]
pub fn discarded_comments_rule_2(tree: &Tree, id: NodeId) -> bool {
    tree.is_tag(id, &["cite", "quote"])
}

/// Comment UI: titles, reply links, sign-in prompts, spam filter markers.
#[must_use]
pub fn discarded_comments_rule_3(tree: &Tree, id: NodeId) -> bool {
    let class_val = class(tree, id);
    let id_class = format!("{}{class_val}", id_attr(tree, id));
    let style = tree.attr(id, "style");
    class_val.contains("comments-title")
        || class_val.contains("nocomments")
        || id_class.starts_with("reply-")
        || class_val.contains("-reply-")
        || class_val.contains("message")
        || class_val.contains("signin")
        || id_class.contains("akismet")
        || style.contains("display:none")
}

/// Whole comment sections.
#[must_use]
pub fn removed_comments_rule_1(tree: &Tree, id: NodeId) -> bool {
    if !tree.is_tag(id, &LIST_CONTAINERS) {
        return false;
    }
    let class_val = class(tree, id);
    let id_val = id_attr(tree, id);
    id_val.starts_with("comment")
        || class_val.starts_with("comment")
        || class_val.contains("article-comments")
        || class_val.contains("post-comments")
        || ["comol", "disqus_thread", "dsq-comments"]
            .iter()
            .any(|p| id_val.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::selector::query;

    fn first_match(html: &str, rules: &[Rule]) -> Option<String> {
        let tree = dom::parse(html).unwrap();
        rules
            .iter()
            .find_map(|rule| query(&tree, tree.root(), *rule))
            .map(|n| tree.attr(n, "id").to_string())
    }

    #[test]
    fn test_comment_list_has_priority() {
        let html = r#"<div id="comments"><ol id="list" class="commentlist"><li>c</li></ol></div>"#;
        assert_eq!(first_match(html, COMMENTS).as_deref(), Some("list"));
    }

    #[test]
    fn test_comment_section_case_insensitive() {
        let html = r#"<section id="x" class="Comments-area">c</section>"#;
        assert_eq!(first_match(html, COMMENTS).as_deref(), Some("x"));
    }

    #[test]
    fn test_disqus() {
        assert!(first_match(r#"<div id="disqus_thread"></div>"#, COMMENTS).is_some());
    }

    #[test]
    fn test_no_comments() {
        assert!(first_match(r#"<div class="content"><p>text</p></div>"#, COMMENTS).is_none());
    }

    #[test]
    fn test_debris() {
        assert!(first_match(r#"<div id="respond">form</div>"#, DISCARDED_COMMENTS).is_some());
        assert!(first_match(r#"<h3 id="reply-title">Leave a reply</h3>"#, DISCARDED_COMMENTS).is_some());
    }

    #[test]
    fn test_removed_comments() {
        assert!(first_match(r#"<div id="CommentArea">c</div>"#, REMOVED_COMMENTS).is_some());
        assert!(first_match(r#"<p class="comment">c</p>"#, REMOVED_COMMENTS).is_none());
    }
}
