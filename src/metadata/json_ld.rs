//! JSON-LD Metadata Parsing
//!
//! Reads Schema.org JSON-LD blocks (`<script type="application/ld+json">`)
//! for the article headline, its author and the publisher name. Blocks that
//! fail to parse are skipped.

use serde_json::{Map, Value};
use tracing::trace;

use crate::result::DocumentMetadata;
use crate::tree::Tree;

/// Schema objects worth reading, flattened out of `@graph` arrays and
/// top-level arrays.
fn schema_objects(tree: &Tree) -> Vec<Map<String, Value>> {
    let mut objects = Vec::new();
    for script in tree.iter_tags(tree.root(), &["script"]) {
        if !tree.attr(script, "type").eq_ignore_ascii_case("application/ld+json") {
            continue;
        }
        let raw = tree.text_content(script);
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(err) => {
                trace!(%err, "skipping invalid JSON-LD block");
                continue;
            }
        };

        let mut stack = vec![value];
        while let Some(value) = stack.pop() {
            match value {
                Value::Array(items) => stack.extend(items.into_iter().rev()),
                Value::Object(mut map) => {
                    if let Some(graph) = map.remove("@graph") {
                        stack.push(graph);
                    }
                    objects.push(map);
                }
                _ => {}
            }
        }
    }
    objects
}

fn types(object: &Map<String, Value>) -> Vec<String> {
    match object.get("@type") {
        Some(Value::String(t)) => vec![t.to_lowercase()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect(),
        _ => Vec::new(),
    }
}

fn is_article_type(types: &[String]) -> bool {
    types.iter().any(|t| {
        t.ends_with("article") || matches!(t.as_str(), "blogposting" | "report" | "webpage")
    })
}

fn single_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Names from a value that may be a string, a `{"name": ..}` object or an
/// array of either, joined with "; ".
fn names(value: &Value) -> Option<String> {
    let collected: Vec<String> = match value {
        Value::String(s) => vec![s.trim().to_string()],
        Value::Object(map) => single_string(map, "name").into_iter().collect(),
        Value::Array(items) => items.iter().filter_map(names).collect(),
        _ => Vec::new(),
    };
    let collected: Vec<String> = collected.into_iter().filter(|n| !n.is_empty()).collect();
    (!collected.is_empty()).then(|| collected.join("; "))
}

/// Fills `metadata` fields still empty from JSON-LD.
pub fn extract_json_ld(tree: &Tree, metadata: &mut DocumentMetadata) {
    for object in schema_objects(tree) {
        let types = types(&object);
        if !is_article_type(&types) {
            continue;
        }
        if metadata.title.is_none() {
            metadata.title = single_string(&object, "headline").or_else(|| single_string(&object, "name"));
        }
        if metadata.author.is_none() {
            metadata.author = object.get("author").and_then(names);
        }
        if metadata.description.is_none() {
            metadata.description = single_string(&object, "description");
        }
        if metadata.sitename.is_none() {
            metadata.sitename = object.get("publisher").and_then(names);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use pretty_assertions::assert_eq;

    fn metadata_of(html: &str) -> DocumentMetadata {
        let tree = dom::parse(html).unwrap();
        let mut metadata = DocumentMetadata::default();
        extract_json_ld(&tree, &mut metadata);
        metadata
    }

    #[test]
    fn test_simple_article_schema() {
        let metadata = metadata_of(
            r#"<html><head><script type="application/ld+json">
            {"@type": "NewsArticle", "headline": "Rivers rise", "author": {"@type": "Person", "name": "Ada Byron"},
             "publisher": {"@type": "Organization", "name": "Daily Example"}}
            </script></head><body></body></html>"#,
        );
        assert_eq!(metadata.title.as_deref(), Some("Rivers rise"));
        assert_eq!(metadata.author.as_deref(), Some("Ada Byron"));
        assert_eq!(metadata.sitename.as_deref(), Some("Daily Example"));
    }

    #[test]
    fn test_graph_and_multiple_authors() {
        let metadata = metadata_of(
            r#"<html><head><script type="application/ld+json">
            {"@graph": [{"@type": "WebSite", "name": "Site"},
                        {"@type": ["BlogPosting"], "headline": "Post", "author": [{"name": "A"}, "B"]}]}
            </script></head><body></body></html>"#,
        );
        assert_eq!(metadata.title.as_deref(), Some("Post"));
        assert_eq!(metadata.author.as_deref(), Some("A; B"));
    }

    #[test]
    fn test_invalid_json_skipped() {
        let metadata = metadata_of(
            r#"<html><head><script type="application/ld+json">{"headline": </script></head><body></body></html>"#,
        );
        assert_eq!(metadata, DocumentMetadata::default());
    }
}
