//! Flattening document trees into dotted key-value pairs.

use crate::document::Node;

/// Flatten a document tree into dotted key-value pairs in document order.
///
/// Tables are recursed into, building dotted keys:
/// `{"redis": {"host": "h"}}` → `[("redis.host", Some("h"))]`. Nulls (unset
/// references) are reported as `(key, None)`. Lists and empty tables are
/// leaves.
pub fn flatten(node: &Node) -> Vec<(String, Option<Node>)> {
    let mut out = Vec::new();
    match node {
        Node::Object(object) => {
            for (key, value) in object {
                walk(value, key.clone(), &mut out);
            }
        }
        other => walk(other, String::new(), &mut out),
    }
    out
}

fn walk(node: &Node, prefix: String, out: &mut Vec<(String, Option<Node>)>) {
    match node {
        Node::Object(object) if !object.is_empty() => {
            for (key, value) in object {
                walk(value, format!("{prefix}.{key}"), out);
            }
        }
        Node::Null => out.push((prefix, None)),
        other => out.push((prefix, Some(other.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flat_keys() {
        let pairs = flatten(&json!({"host": "localhost", "port": 8080}));
        assert_eq!(
            pairs,
            [
                ("host".to_string(), Some(json!("localhost"))),
                ("port".to_string(), Some(json!(8080))),
            ]
        );
    }

    #[test]
    fn nested_keys_are_dotted() {
        let pairs = flatten(&json!({"redis": {"host": "h", "db": 1}, "name": "x"}));
        let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["redis.host", "redis.db", "name"]);
    }

    #[test]
    fn nulls_are_reported_as_unset() {
        let pairs = flatten(&json!({"redis": null}));
        assert_eq!(pairs, [("redis".to_string(), None)]);
    }

    #[test]
    fn lists_and_empty_tables_are_leaves() {
        let pairs = flatten(&json!({"hosts": ["a", "b"], "extra": {}}));
        assert_eq!(
            pairs,
            [
                ("hosts".to_string(), Some(json!(["a", "b"]))),
                ("extra".to_string(), Some(json!({}))),
            ]
        );
    }
}
