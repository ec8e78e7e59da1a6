//! Document formats.
//!
//! A [`Format`] picks both the grammar used to read and write documents and
//! the tag key fields are identified by. Grammar work is delegated to
//! `serde_json`, `serde_yaml` and `toml`; the record graph itself is
//! projected through [`document`](crate::document).

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::FieldPath;
use crate::document::{self, Node};
use crate::error::TagfigError;
use crate::reflect::Reflect;
use crate::tag::TagSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    #[default]
    Yaml,
    Toml,
}

impl Format {
    /// Tag key holding field identifiers for this format.
    pub fn ident_key(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// Parse a document into a tree.
    pub fn parse(self, bytes: &[u8]) -> Result<Node, TagfigError> {
        let syntax = |reason: String| TagfigError::Syntax {
            format: self,
            reason,
        };
        match self {
            Format::Json => serde_json::from_slice(bytes).map_err(|e| syntax(e.to_string())),
            Format::Yaml => {
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Node::Object(serde_json::Map::new()));
                }
                serde_yaml::from_slice(bytes).map_err(|e| syntax(e.to_string()))
            }
            Format::Toml => {
                let text = std::str::from_utf8(bytes).map_err(|e| syntax(e.to_string()))?;
                toml::from_str(text).map_err(|e| syntax(e.to_string()))
            }
        }
    }

    /// Render a tree as a document.
    pub fn render(self, node: &Node) -> Result<Vec<u8>, TagfigError> {
        let encode = |reason: String| TagfigError::Encode { reason };
        match self {
            Format::Json => {
                let mut bytes = serde_json::to_vec_pretty(node).map_err(|e| encode(e.to_string()))?;
                bytes.push(b'\n');
                Ok(bytes)
            }
            Format::Yaml => serde_yaml::to_string(node)
                .map(String::into_bytes)
                .map_err(|e| encode(e.to_string())),
            Format::Toml => {
                let Some(table) = strip_nulls(node, &FieldPath::root())? else {
                    return Err(encode("TOML documents must be tables".into()));
                };
                if !table.is_object() {
                    return Err(encode("TOML documents must be tables".into()));
                }
                toml::to_string_pretty(&table)
                    .map(String::into_bytes)
                    .map_err(|e| encode(e.to_string()))
            }
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
        })
    }
}

/// TOML has no null. Unset entries are dropped from tables; an unset list
/// element cannot be dropped without shifting its siblings, so it is an
/// error.
fn strip_nulls(node: &Node, path: &FieldPath) -> Result<Option<Node>, TagfigError> {
    match node {
        Node::Null => Ok(None),
        Node::Object(object) => {
            let mut table = serde_json::Map::new();
            for (key, value) in object {
                if let Some(value) = strip_nulls(value, &path.child(key.as_str()))? {
                    table.insert(key.clone(), value);
                }
            }
            Ok(Some(Node::Object(table)))
        }
        Node::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let child = path.child(index.to_string());
                let Some(item) = strip_nulls(item, &child)? else {
                    return Err(TagfigError::Encode {
                        reason: format!("unset list element at '{child}' has no TOML form"),
                    });
                };
                list.push(item);
            }
            Ok(Some(Node::Array(list)))
        }
        other => Ok(Some(other.clone())),
    }
}

/// Decode `bytes` onto `target` without applying defaults.
pub fn decode<T: Reflect>(
    format: Format,
    bytes: &[u8],
    target: &mut T,
    schema: &TagSchema,
    strict: bool,
) -> Result<(), TagfigError> {
    let node = format.parse(bytes)?;
    document::from_document(&node, target, schema, strict)?;
    debug!(%format, bytes = bytes.len(), "decoded document");
    Ok(())
}

/// Encode `source` in `format`.
pub fn encode<T: Reflect>(
    format: Format,
    source: &T,
    schema: &TagSchema,
) -> Result<Vec<u8>, TagfigError> {
    let node = document::to_document(source, schema)?;
    format.render(&node)
}
