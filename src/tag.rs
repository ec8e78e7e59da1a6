//! Field tag metadata.
//!
//! Every record field carries one raw tag string in the conventional
//! `key:"value"` form, for example
//!
//! ```text
//! json:"host" yaml:"host" default:"127.0.0.1" desc:"Server address"
//! ```
//!
//! A [`TagSchema`] names which tag keys play which role. The same raw tag
//! can therefore serve several formats: switching the identifier key from
//! `yaml` to `json` changes the document key a field is read from without
//! touching the record definition.

use std::borrow::Cow;

use crate::shape::FieldMeta;

/// The tag keys the engine reads from each field.
///
/// Immutable once built; clone it when a one-off override is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSchema {
    /// Key holding the field's document identifier.
    pub ident_key: String,
    /// Key holding the textual default value.
    pub default_key: String,
    /// Key holding the allowed-options list.
    pub option_key: String,
    /// Key holding the human-readable description.
    pub describe_key: String,
    /// Key holding the validation expression.
    pub valid_key: String,
}

impl Default for TagSchema {
    fn default() -> Self {
        Self {
            ident_key: "yaml".into(),
            default_key: "default".into(),
            option_key: "option".into(),
            describe_key: "desc".into(),
            valid_key: "valid".into(),
        }
    }
}

impl TagSchema {
    /// Return a copy of this schema reading identifiers from `key`.
    pub fn with_ident_key(&self, key: impl Into<String>) -> Self {
        Self {
            ident_key: key.into(),
            ..self.clone()
        }
    }
}

/// A raw field tag, e.g. `json:"name,omitempty" default:"x"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a>(pub &'a str);

impl<'a> Tag<'a> {
    /// Value stored under `key`, or `None` when the key is absent.
    ///
    /// Scanning stops at the first malformed entry; everything after it is
    /// treated as absent.
    pub fn lookup(&self, key: &str) -> Option<Cow<'a, str>> {
        let mut rest = self.0;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                return None;
            }

            let bytes = rest.as_bytes();
            let mut i = 0;
            while i < bytes.len()
                && bytes[i] > b' '
                && bytes[i] != b':'
                && bytes[i] != b'"'
                && bytes[i] != 0x7f
            {
                i += 1;
            }
            if i == 0 || i + 1 >= bytes.len() || bytes[i] != b':' || bytes[i + 1] != b'"' {
                return None;
            }
            let name = &rest[..i];
            rest = &rest[i + 1..];

            // Scan the quoted value, honoring backslash escapes.
            let bytes = rest.as_bytes();
            let mut j = 1;
            while j < bytes.len() && bytes[j] != b'"' {
                if bytes[j] == b'\\' {
                    j += 1;
                }
                j += 1;
            }
            if j >= bytes.len() {
                return None;
            }
            let quoted = &rest[1..j];
            rest = &rest[j + 1..];

            if name == key {
                return Some(unescape(quoted));
            }
        }
    }

    /// Value under `key`, or the empty string when absent.
    pub fn get(&self, key: &str) -> Cow<'a, str> {
        self.lookup(key).unwrap_or(Cow::Borrowed(""))
    }
}

fn unescape(quoted: &str) -> Cow<'_, str> {
    if !quoted.contains('\\') {
        return Cow::Borrowed(quoted);
    }
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Tag values resolved for one field under one [`TagSchema`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagValues {
    /// Document identifier; falls back to the lowercased field name.
    pub ident: String,
    /// Textual default. `Some("")` is a present-but-empty default.
    pub default: Option<String>,
    pub option: String,
    pub describe: String,
    pub valid: String,
}

impl TagValues {
    pub fn resolve(field: &FieldMeta, schema: &TagSchema) -> Self {
        let tag = Tag(field.tag);
        let ident = tag
            .lookup(&schema.ident_key)
            .and_then(|raw| raw.split(',').next().map(str::to_string))
            .filter(|ident| !ident.is_empty())
            .unwrap_or_else(|| field.name.to_lowercase());

        Self {
            ident,
            default: tag.lookup(&schema.default_key).map(Cow::into_owned),
            option: tag.get(&schema.option_key).into_owned(),
            describe: tag.get(&schema.describe_key).into_owned(),
            valid: tag.get(&schema.valid_key).into_owned(),
        }
    }

    pub fn default_is_set(&self) -> bool {
        self.default.is_some()
    }
}
