use std::path::PathBuf;
use thiserror::Error;

use crate::descriptor::FieldPath;
use crate::format::Format;

/// Boxed error used for causes coming from arbitrary parsers and validators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum TagfigError {
    #[error("Invalid target {type_name}: {reason}")]
    InvalidTarget {
        type_name: &'static str,
        reason: &'static str,
    },

    #[error("Type of field '{path}' ({type_name}) is not supported")]
    UnsupportedType { path: String, type_name: String },

    #[error("Schema error at '{path}': {violation}")]
    Schema {
        path: String,
        violation: SchemaViolation,
    },

    #[error("Error parsing value for '{path}': {source}")]
    Parse { path: String, source: ParseError },

    #[error("Unsupported map key type {type_name} at '{path}'")]
    UnsupportedKeyType { path: String, type_name: String },

    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Loading from {0} is not implemented")]
    NotImplemented(&'static str),

    #[error("Failed to parse {format} document: {reason}")]
    Syntax { format: Format, reason: String },

    #[error("Failed to encode document: {reason}")]
    Encode { reason: String },

    #[error("Invalid value for '{path}': {reason}")]
    Decode { path: String, reason: String },

    #[error("Unknown keys in document: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    #[error("Key not found: {0}")]
    KeyNotFound(String),
}

/// A tag or document value that could not be converted to its target type.
#[derive(Debug, Error)]
#[error("cannot parse '{value}' as {target}: {cause}")]
pub struct ParseError {
    pub value: String,
    pub target: &'static str,
    #[source]
    pub cause: BoxError,
}

impl ParseError {
    pub fn new(value: &str, target: &'static str, cause: impl Into<BoxError>) -> Self {
        Self {
            value: value.to_string(),
            target,
            cause: cause.into(),
        }
    }

    /// Attach the field path the value was destined for.
    pub fn at(self, path: &FieldPath) -> TagfigError {
        TagfigError::Parse {
            path: path.to_string(),
            source: self,
        }
    }
}

/// Ways a record type can be structurally unusable, independent of any data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("default value specified for nested value")]
    DefaultOnParent,

    #[error("duplicate identifier '{0}' among sibling fields")]
    DuplicateIdent(String),

    #[error("type {0} contains itself")]
    CyclicType(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_type_names_path_and_type() {
        let err = TagfigError::UnsupportedType {
            path: "redis.initial".into(),
            type_name: "char".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("redis.initial"));
        assert!(msg.contains("char"));
    }

    #[test]
    fn parse_error_carries_value_and_target() {
        let cause = "300".parse::<i8>().unwrap_err();
        let err = TagfigError::Parse {
            path: "redis.db".into(),
            source: ParseError::new("300", "i8", cause),
        };
        let msg = err.to_string();
        assert!(msg.contains("redis.db"));
        assert!(msg.contains("'300'"));
        assert!(msg.contains("i8"));
    }

    #[test]
    fn schema_violation_formats() {
        let err = TagfigError::Schema {
            path: "redis".into(),
            violation: SchemaViolation::DefaultOnParent,
        };
        assert!(err.to_string().contains("nested value"));
    }

    #[test]
    fn unknown_keys_are_listed() {
        let err = TagfigError::UnknownKeys(vec!["redis.hots".into(), "typo".into()]);
        assert_eq!(
            err.to_string(),
            "Unknown keys in document: redis.hots, typo"
        );
    }
}
