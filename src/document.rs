//! Projection between record graphs and document trees.
//!
//! Every format is parsed into, and rendered from, the same intermediate
//! tree ([`Node`]). Records become objects keyed by the active identifier
//! tag, in field declaration order.

use crate::classify::classify;
use crate::descriptor::FieldPath;
use crate::driver::Driver;
use crate::error::TagfigError;
use crate::reflect::Reflect;
use crate::tag::TagSchema;

/// Intermediate document tree.
pub type Node = serde_json::Value;

/// Context for turning values into nodes.
#[derive(Debug, Clone, Copy)]
pub struct EncodeCx<'s> {
    schema: &'s TagSchema,
}

impl<'s> EncodeCx<'s> {
    pub fn new(schema: &'s TagSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s TagSchema {
        self.schema
    }
}

/// Context for overlaying nodes onto values.
///
/// In strict mode, document keys that match no field are collected and
/// reported together once decoding finishes.
#[derive(Debug)]
pub struct DecodeCx<'s> {
    schema: &'s TagSchema,
    strict: bool,
    unknown: Vec<String>,
}

impl<'s> DecodeCx<'s> {
    pub fn new(schema: &'s TagSchema, strict: bool) -> Self {
        Self {
            schema,
            strict,
            unknown: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'s TagSchema {
        self.schema
    }

    /// A driver for text conversion during decoding.
    pub fn driver(&self) -> Driver<'s> {
        Driver::new(self.schema)
    }

    pub fn note_unknown(&mut self, path: &FieldPath) {
        if self.strict {
            self.unknown.push(path.to_string());
        }
    }

    pub fn finish(self) -> Result<(), TagfigError> {
        if self.unknown.is_empty() {
            Ok(())
        } else {
            Err(TagfigError::UnknownKeys(self.unknown))
        }
    }
}

/// Project a record graph to a document tree.
pub fn to_document<T: Reflect>(source: &T, schema: &TagSchema) -> Result<Node, TagfigError> {
    ensure_record::<T>()?;
    classify::<T>(schema)?;
    source.to_node(&EncodeCx::new(schema))
}

/// Overlay a document tree onto a record graph.
///
/// Keys absent from the document leave the corresponding fields untouched.
pub fn from_document<T: Reflect>(
    node: &Node,
    target: &mut T,
    schema: &TagSchema,
    strict: bool,
) -> Result<(), TagfigError> {
    ensure_record::<T>()?;
    classify::<T>(schema)?;
    let mut cx = DecodeCx::new(schema, strict);
    target.from_node(node, &mut cx, &FieldPath::root())?;
    cx.finish()
}

fn ensure_record<T: Reflect>() -> Result<(), TagfigError> {
    if T::shape().is_record_like() {
        Ok(())
    } else {
        Err(TagfigError::InvalidTarget {
            type_name: std::any::type_name::<T>(),
            reason: "not a record",
        })
    }
}

pub(crate) fn type_mismatch(path: &FieldPath, expected: &str, found: &Node) -> TagfigError {
    let found = match found {
        Node::Null => "null",
        Node::Bool(_) => "a boolean",
        Node::Number(_) => "a number",
        Node::String(_) => "a string",
        Node::Array(_) => "a list",
        Node::Object(_) => "a table",
    };
    TagfigError::Decode {
        path: path.to_string(),
        reason: format!("expected {expected}, found {found}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fixtures::test::{LocalConf, Redis};

    fn schema() -> TagSchema {
        TagSchema::default()
    }

    #[test]
    fn records_project_in_declaration_order() {
        let redis = Redis {
            host: "db".into(),
            port: 1,
            db: 2,
            enable: true,
        };
        let node = to_document(&redis, &schema()).unwrap();
        let keys: Vec<_> = node.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["host", "port", "db", "enable"]);
        assert_eq!(node["port"], json!(1));
    }

    #[test]
    fn identifiers_follow_the_schema() {
        let redis = Redis::zero();
        let node = to_document(&redis, &schema().with_ident_key("json")).unwrap();
        assert!(node.get("DB").is_some());
        assert!(node.get("db").is_none());
    }

    #[test]
    fn readonly_fields_are_not_projected() {
        let node = to_document(&LocalConf::zero(), &schema()).unwrap();
        assert!(node.get("cfg_file").is_none());
        assert!(node.get("appName").is_some());
    }

    #[test]
    fn overlay_keeps_absent_fields() {
        let mut redis = Redis {
            host: "keep".into(),
            port: 1,
            db: 0,
            enable: false,
        };
        from_document(&json!({"port": 6380}), &mut redis, &schema(), false).unwrap();
        assert_eq!(redis.host, "keep");
        assert_eq!(redis.port, 6380);
    }

    #[test]
    fn strings_are_parsed_for_scalars() {
        let mut redis = Redis::zero();
        from_document(
            &json!({"port": "6380", "enable": "true"}),
            &mut redis,
            &schema(),
            false,
        )
        .unwrap();
        assert_eq!(redis.port, 6380);
        assert!(redis.enable);
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        let mut redis = Redis::zero();
        let err = from_document(&json!({"db": 1000}), &mut redis, &schema(), false).unwrap_err();
        match err {
            TagfigError::Decode { path, reason } => {
                assert_eq!(path, "db");
                assert!(reason.contains("out of range"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mismatched_types_name_both_sides() {
        let mut redis = Redis::zero();
        let err = from_document(&json!({"enable": [1]}), &mut redis, &schema(), false)
            .unwrap_err();
        assert!(err.to_string().contains("expected a boolean, found a list"));
    }

    #[test]
    fn strict_mode_collects_unknown_keys() {
        let mut conf = LocalConf::zero();
        let doc = json!({
            "appName": "x",
            "typo": 1,
            "redis": {"hots": "h"},
        });
        from_document(&doc, &mut conf, &schema(), false).unwrap();

        let mut conf = LocalConf::zero();
        match from_document(&doc, &mut conf, &schema(), true).unwrap_err() {
            TagfigError::UnknownKeys(keys) => assert_eq!(keys, ["redis.hots", "typo"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
