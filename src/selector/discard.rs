//! Discard Patterns
//!
//! Identifies boilerplate sections (navigation, sharing widgets, bylines,
//! related-post teasers, cookie and newsletter banners, hidden elements)
//! that are pruned from a content subtree before dispatch.

use super::{class, id_attr, id_class, Rule};
use crate::tree::{NodeId, Tree};

/// Discarded in every focus mode.
pub static OVERALL_DISCARDED_CONTENT: &[Rule] = &[
    overall_discarded_content_rule_1,
    overall_discarded_content_rule_2,
    overall_discarded_content_rule_3,
];

/// Discarded unless recall is favored.
pub static TEASER_DISCARDED_CONTENT: &[Rule] = &[teaser_rule_1];

/// Discarded only when precision is favored.
pub static PRECISION_DISCARDED_CONTENT: &[Rule] = &[precision_discard_rule_1];

/// Discarded when images are not extracted.
pub static DISCARDED_IMAGE_CONTENT: &[Rule] = &[image_caption_rule];

fn any_in(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Rule 1: navigation, sharing, related content, bylines, widgets, ads,
/// paywalls.
///
/// **Tags**: `div`, `dd`, `dt`, `li`/`item`, `ul`/`ol`/`dl`/`list`, `p`,
/// `section`, `span`
#[must_use]
pub fn overall_discarded_content_rule_1(tree: &Tree, id: NodeId) -> bool {
    if !tree.is_tag(
        id,
        &["div", "dd", "dt", "li", "item", "ul", "ol", "dl", "list", "p", "section", "span"],
    ) {
        return false;
    }
    let id_val = id_attr(tree, id);
    let class_val = class(tree, id);
    let id_class = id_class(tree, id);
    let role = tree.attr(id, "role").to_lowercase();

    any_in(&id_class, &["footer", "viral", "social", "syndication", "newsletter", "cookie",
        "breadcrumb", "bread-crumb", "author", "button", "banner", "message-container"])
        // "related_post" singular is often the post itself
        || (id_class.contains("related")
            && !id_class.contains("related_post")
            && !id_class.contains("related-post"))
        || id_class.starts_with("shar")
        || id_val.contains("share")
        || any_in(&class_val, &["share-", "sociable", "subnav", "tag-list", "toolbar", "navbar",
            "topbar", "navbox", "avigation", "byline", "rating", "attachment", "timestamp",
            "user-info", "user-profile", "-ad-", "-icon", "article-infos", "outbrain", "taboola",
            "criteo", "consent", "modal-content", " ad ", "permission", "next-", "-stories",
            "most-popular", "slick-", "carousel", "swiper", "overlay", "paid-content",
            "paidcontent", "login", "signin", "sign-in", "signup", "sign-up", "subscribe",
            "subscription", "trending", "most-read", "top-stories"])
        || id_class.contains("tags")
        || (id_class.contains("sidebar") && !class_val.contains("with-sidebar"))
        || (class_val.contains("widget") && !class_val.contains("elementor-widget"))
        || class_val.contains("meta")
        || id_val.contains("menu")
        || (class_val.contains("menu") && !class_val.contains("contextmenu"))
        || id_val.contains("nav")
        || role.contains("nav")
        || class_val.starts_with("nav")
        || class_val.starts_with("post-nav")
        || id_val.contains("premium")
}

/// Rule 2: comment debris and hidden elements, any tag.
#[must_use]
pub fn overall_discarded_content_rule_2(tree: &Tree, id: NodeId) -> bool {
    let id_val = id_attr(tree, id);
    let class_val = class(tree, id);
    let id_class = id_class(tree, id);
    let style = tree.attr(id, "style").to_lowercase();

    any_in(&class_val, &["comments-title", "nocomments", "-reply-", "akismet", "suggest-links",
        "-hide-", "hide-print", " hidden", " hide", "noprint", "notloaded"])
        || id_class.starts_with("reply-")
        || class_val.starts_with("hide-")
        || class_val == "hidden"
        || id_val.contains("akismet")
        || id_val.contains("reader-comments")
        || id_val.contains("hidden")
        || style.contains("display:none")
        || style.contains("display: none")
        || style.contains("visibility:hidden")
        || tree.attr(id, "aria-hidden") == "true"
        || tree.get(id, "hidden").is_some()
}

/// Rule 3: page headers and stray navigation landmarks.
#[must_use]
pub fn overall_discarded_content_rule_3(tree: &Tree, id: NodeId) -> bool {
    tree.is_tag(id, &["header", "nav", "aside"])
}

/// Teasers: excerpts and promoted links to other content.
#[must_use]
pub fn teaser_rule_1(tree: &Tree, id: NodeId) -> bool {
    if !tree.is_tag(id, &["div", "item", "li", "list", "ul", "p", "section", "span"]) {
        return false;
    }
    let class_val = class(tree, id);
    let id_class = format!("{}{class_val}", id_attr(tree, id));
    any_in(&class_val, &["teaser", "excerpt", "promoted", "sponsored"])
        || any_in(&id_class, &["promo", "recommend"])
}

/// Precision-only patterns.
#[must_use]
pub fn precision_discard_rule_1(tree: &Tree, id: NodeId) -> bool {
    let class_val = class(tree, id);
    let id_class = format!("{}{class_val}", id_attr(tree, id));
    (tree.is_tag(id, &["h1", "h2", "h3", "h4", "h5", "h6", "head"]) && id_class.contains("title"))
        || id_class.contains("fs-headline")
        || any_in(&class_val, &["read-more", "bottom", "jumbotron"])
}

/// Image captions and figure credits.
#[must_use]
pub fn image_caption_rule(tree: &Tree, id: NodeId) -> bool {
    tree.tag(id) == "figcaption"
        || (tree.is_tag(id, &["div", "item", "list", "p", "section", "span"])
            && (id_attr(tree, id).contains("caption") || class(tree, id).contains("caption")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::selector::{query, query_all};

    fn matches(html: &str, rule: Rule) -> bool {
        let tree = dom::parse(html).unwrap();
        query(&tree, tree.root(), rule).is_some()
    }

    #[test]
    fn test_discard_footer() {
        assert!(matches(r#"<div class="footer">content</div>"#, overall_discarded_content_rule_1));
        assert!(matches(r#"<div id="pageFooter">content</div>"#, overall_discarded_content_rule_1));
    }

    #[test]
    fn test_discard_respects_tag_filter() {
        assert!(!matches(r#"<article class="footer">content</article>"#, overall_discarded_content_rule_1));
    }

    #[test]
    fn test_related_post_singular_kept() {
        assert!(!matches(r#"<div class="related-post">x</div>"#, overall_discarded_content_rule_1));
        assert!(matches(r#"<div class="related-articles">x</div>"#, overall_discarded_content_rule_1));
    }

    #[test]
    fn test_sidebar_exception() {
        assert!(matches(r#"<div id="sidebar">x</div>"#, overall_discarded_content_rule_1));
        assert!(!matches(r#"<div class="with-sidebar">x</div>"#, overall_discarded_content_rule_1));
    }

    #[test]
    fn test_hidden_elements() {
        assert!(matches(r#"<p style="display: none">x</p>"#, overall_discarded_content_rule_2));
        assert!(matches(r#"<p aria-hidden="true">x</p>"#, overall_discarded_content_rule_2));
        assert!(matches(r#"<p hidden>x</p>"#, overall_discarded_content_rule_2));
        assert!(!matches(r#"<p class="lead">x</p>"#, overall_discarded_content_rule_2));
    }

    #[test]
    fn test_structural_boilerplate() {
        let tree = dom::parse("<header>a</header><nav>b</nav><p>c</p>").unwrap();
        assert_eq!(query_all(&tree, tree.root(), overall_discarded_content_rule_3).len(), 2);
    }

    #[test]
    fn test_teaser_and_precision() {
        assert!(matches(r#"<div class="post-teaser">x</div>"#, teaser_rule_1));
        assert!(matches(r#"<div class="read-more">x</div>"#, precision_discard_rule_1));
        assert!(!matches(r#"<div class="story">x</div>"#, precision_discard_rule_1));
    }

    #[test]
    fn test_image_captions() {
        assert!(matches(r#"<p class="wp-caption-text">x</p>"#, image_caption_rule));
        assert!(matches("<figcaption>x</figcaption>", image_caption_rule));
    }
}
