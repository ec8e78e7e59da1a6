//! Config operations: template generation, key lookup, listing, and result types.
//!
//! These sit on top of the engine: a template is a fully defaulted record
//! rendered in the active format, and lookups work on the rendered tree so
//! keys match what a user sees in their document.

use std::fmt;
use std::path::PathBuf;

use toml_edit::{DocumentMut, Item, Table};

use crate::descriptor::{self, FieldInfo};
use crate::document::{self, Node};
use crate::driver;
use crate::error::TagfigError;
use crate::flatten;
use crate::format::Format;
use crate::reflect::Reflect;
use crate::tag::TagSchema;

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// A generated template document.
    Template(String),
    /// Confirmation that a template was written to a file.
    TemplateWritten { path: PathBuf },
    /// A key's value and its description.
    KeyValue {
        key: String,
        value: String,
        doc: Vec<String>,
    },
    /// All key-value pairs, flattened.
    Listing { entries: Vec<(String, String)> },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Template(t) => write!(f, "{t}"),
            ConfigResult::TemplateWritten { path } => {
                write!(f, "Config template written to {}", path.display())
            }
            ConfigResult::KeyValue { key, value, doc } => {
                for line in doc {
                    writeln!(f, "# {line}")?;
                }
                write!(f, "{key} = {value}")
            }
            ConfigResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
        }
    }
}

/// Render a fully defaulted `T` as a document in `format`.
///
/// TOML templates carry each field's description tag as a comment above
/// the key or table it belongs to.
pub fn generate_template<T: Reflect>(
    format: Format,
    schema: &TagSchema,
) -> Result<String, TagfigError> {
    let defaults: T = driver::materialize(schema)?;
    let node = document::to_document(&defaults, schema)?;
    let rendered = String::from_utf8(format.render(&node)?).map_err(|e| TagfigError::Encode {
        reason: e.to_string(),
    })?;
    match format {
        Format::Toml => annotate_toml(&rendered, &descriptor::describe::<T>(schema)?),
        _ => Ok(rendered),
    }
}

fn annotate_toml(rendered: &str, fields: &[FieldInfo]) -> Result<String, TagfigError> {
    let mut doc: DocumentMut = rendered.parse().map_err(|e: toml_edit::TomlError| {
        TagfigError::Encode {
            reason: e.to_string(),
        }
    })?;
    annotate_table(doc.as_table_mut(), fields);
    Ok(doc.to_string())
}

fn annotate_table(table: &mut Table, fields: &[FieldInfo]) {
    for field in fields {
        let ident = field.tags.ident.as_str();
        let comment = comment_lines(&field.tags.describe);

        if let Some(Item::Table(nested)) = table.get_mut(ident) {
            if !comment.is_empty() {
                nested.decor_mut().set_prefix(format!("\n{comment}"));
            }
            annotate_table(nested, &field.children);
            continue;
        }
        if comment.is_empty() {
            continue;
        }
        if let Some(Item::ArrayOfTables(array)) = table.get_mut(ident) {
            if let Some(first) = array.get_mut(0) {
                first.decor_mut().set_prefix(format!("\n{comment}"));
            }
            continue;
        }
        if let Some(mut key) = table.key_mut(ident) {
            key.leaf_decor_mut().set_prefix(comment);
        }
    }
}

fn comment_lines(describe: &str) -> String {
    describe
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("# {}\n", line.trim()))
        .collect()
}

/// Get a value by dotted key, including its description.
pub fn get_value<T: Reflect>(
    config: &T,
    key: &str,
    schema: &TagSchema,
) -> Result<ConfigResult, TagfigError> {
    let node = document::to_document(config, schema)?;
    let value = node_get(&node, key).ok_or_else(|| TagfigError::KeyNotFound(key.into()))?;

    let fields = descriptor::describe::<T>(schema)?;
    let doc = descriptor::find_field(&fields, key)
        .map(|field| {
            field
                .tags
                .describe
                .lines()
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(ConfigResult::KeyValue {
        key: key.into(),
        value: format_value(value),
        doc,
    })
}

/// List every value as flattened dotted key-value pairs.
pub fn list_values<T: Reflect>(config: &T, schema: &TagSchema) -> Result<ConfigResult, TagfigError> {
    let node = document::to_document(config, schema)?;
    let entries = flatten::flatten(&node)
        .into_iter()
        .map(|(key, value)| {
            let display = match value {
                Some(v) => format_value(&v),
                None => "<not set>".to_string(),
            };
            (key, display)
        })
        .collect();
    Ok(ConfigResult::Listing { entries })
}

/// Navigate a document tree by dotted key (e.g. `"redis.host"`). Numeric
/// segments index into lists.
pub fn node_get<'a>(node: &'a Node, dotted_key: &str) -> Option<&'a Node> {
    dotted_key.split('.').try_fold(node, |current, segment| match current {
        Node::Object(object) => object.get(segment),
        Node::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    })
}

fn format_value(value: &Node) -> String {
    match value {
        Node::String(s) => s.clone(),
        other => other.to_string(),
    }
}
