//! Tag-driven defaults and document codecs for Rust configuration structs.
//!
//! Tagfig fills the unset fields of a configuration struct from default
//! values written in per-field tag strings, reads and writes the struct as
//! JSON, YAML or TOML, and keeps validated snapshots of it across reloads.
//!
//! ```ignore
//! #[derive(Debug, Clone, PartialEq)]
//! pub struct Redis {
//!     pub host: String,
//!     pub port: u16,
//! }
//!
//! tagfig::record! {
//!     Redis {
//!         host: r#"yaml:"host" json:"host" default:"127.0.0.1""#,
//!         port: r#"yaml:"port" json:"port" default:"6379" desc:"Server port""#,
//!     }
//! }
//!
//! let redis: Redis = Tagfig::builder().load(b"port: 7000\n")?;
//! assert_eq!(redis.host, "127.0.0.1");
//! ```
//!
//! # Design: tags as source of truth
//!
//! A record's tag strings carry everything the engine needs to know about a
//! field:
//!
//! - **`default:"..."`** is the text the field is parsed from when it holds
//!   its zero value. Sequences and maps take a comma-separated list; the
//!   value `-` means "no default".
//! - **`yaml:"..."` / `json:"..."` / `toml:"..."`** name the field in
//!   documents of that format. A field without one is named by its
//!   lowercased Rust name.
//! - **`desc:"..."`** becomes a comment in generated TOML templates and the
//!   description shown by [`TagfigBuilder::get`].
//! - **`option:"..."`** and **`valid:"..."`** are carried through to
//!   [`describe`] for tools built on top.
//!
//! The tag keys themselves are configurable through [`TagSchema`], so the
//! same struct can be read with a different vocabulary.
//!
//! # Populating defaults
//!
//! [`populate_defaults`] walks a record depth first. Each settable field
//! that still holds its zero value is parsed from its default tag; a field
//! that already holds something is left exactly as it is. Along the way:
//!
//! - `Option<T>` and `Box<T>` fields are allocated before they are filled,
//!   so an unset `Option<Redis>` comes back as a fully defaulted `Some`.
//! - A `Vec<Record>` with default `"0,1,2"` becomes three defaulted
//!   records. The tokens only count elements.
//! - A `HashMap<String, Record>` or `BTreeMap<i32, Record>` with default
//!   `"a,b"` gets one defaulted record per key.
//! - Fields marked `#[readonly]` in [`record!`] are never touched.
//!
//! Populating is idempotent: a second pass over the result changes nothing.
//!
//! # Classification
//!
//! Before any walk, a record type is checked once: unsupported field types
//! (such as `char`), map keys that are neither strings nor integers, default
//! tags on nested records, duplicate sibling identifiers and self-containing
//! records are rejected with a path to the offending field. A target that
//! fails classification is never modified.
//!
//! # Documents
//!
//! Decoding is an overlay: fields absent from the document keep whatever
//! the target already held, and defaults are not applied. Use
//! [`TagfigBuilder::load`] for decode-then-populate. In strict mode, keys
//! that match no field are collected and reported together.
//!
//! ```text
//! Zero value           T::zero()
//!        ↑ overlaid by
//! Document             decode / import_file
//!        ↑ filled by
//! Default tags         populate_defaults
//! ```
//!
//! Encoded documents list fields in declaration order and map entries in
//! key order, so output is byte-for-byte reproducible. File exports are
//! atomic and readable by the owner only.
//!
//! # Snapshots
//!
//! [`VersionedCache`] keeps a bounded history of [`Validate`]d values.
//! Each successful load becomes the current snapshot under a new version;
//! a rejected candidate leaves the cache untouched.
//!
//! # Custom field types
//!
//! Any type that can be written as text can be a field: implement
//! [`TextDecode`] and register it with [`reflect_text!`]. Addresses and
//! paths are supported out of the box, and [`Bytes`] holds base64 data.

pub mod error;
pub mod types;
pub mod versioned;

mod builder;
mod classify;
mod collection;
mod containers;
mod descriptor;
mod document;
mod driver;
mod file;
mod flatten;
mod format;
mod ops;
mod record;
mod reflect;
mod scalar;
mod shape;
mod tag;
mod text;

#[cfg(test)]
mod fixtures;

pub use builder::{Tagfig, TagfigBuilder};
pub use classify::classify;
pub use collection::{parse_map_default, parse_sequence_default, read_csv};
pub use descriptor::{FieldDescriptor, FieldFlags, FieldInfo, FieldPath, describe, find_field};
pub use document::{DecodeCx, EncodeCx, Node, from_document, to_document};
pub use driver::{Driver, UNSET, materialize, populate_defaults};
pub use error::{BoxError, ParseError, SchemaViolation, TagfigError};
pub use file::{export_file, import_file};
pub use format::{Format, decode, encode};
pub use ops::{ConfigResult, generate_template, get_value, list_values};
pub use record::{Record, RecordMut};
pub use reflect::Reflect;
pub use scalar::parse_scalar;
pub use shape::{FieldMeta, FloatWidth, IntWidth, TypeShape};
pub use tag::{Tag, TagSchema, TagValues};
pub use text::TextDecode;
pub use types::Bytes;
pub use versioned::{Validate, VersionedCache};

/// Support code for the exported macros. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use crate::record::{
        field_shape, materialize_record, record_from_node, record_is_deep_zero, record_to_node,
    };
    pub use crate::text::{decode_text, text_from_node};
}
