//! Field paths and descriptors.
//!
//! The driver builds a short-lived [`FieldDescriptor`] for each field it
//! visits; it borrows the field's storage for the duration of that visit.
//! [`describe`] produces the owned counterpart, a [`FieldInfo`] tree, for
//! documentation and lookups where no instance is involved.

use std::fmt;

use crate::classify::classify;
use crate::error::TagfigError;
use crate::reflect::Reflect;
use crate::shape::{FieldMeta, TypeShape};
use crate::tag::{TagSchema, TagValues};

/// Identifier path from the root record to a field, e.g. `redis.host`.
///
/// Sequence elements are addressed by index and map entries by key text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFlags {
    /// A record, or a single reference to one.
    pub is_parent: bool,
    pub is_map: bool,
    pub is_slice: bool,
    pub is_settable: bool,
}

impl FieldFlags {
    pub fn of(meta: &FieldMeta) -> Self {
        let shape = (meta.shape)();
        Self {
            is_parent: shape.is_parent(),
            is_map: matches!(shape, TypeShape::Map { .. }),
            is_slice: matches!(shape, TypeShape::Sequence(_)),
            is_settable: meta.settable,
        }
    }
}

/// One field of a live record, as seen by the driver.
pub struct FieldDescriptor<'a> {
    pub path: FieldPath,
    pub tags: TagValues,
    pub storage: &'a mut dyn Reflect,
    pub flags: FieldFlags,
}

impl<'a> FieldDescriptor<'a> {
    pub fn new(
        meta: &FieldMeta,
        storage: &'a mut dyn Reflect,
        parent: &FieldPath,
        schema: &TagSchema,
    ) -> Self {
        let tags = TagValues::resolve(meta, schema);
        Self {
            path: parent.child(tags.ident.as_str()),
            tags,
            storage,
            flags: FieldFlags::of(meta),
        }
    }
}

impl fmt::Debug for FieldDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("path", &self.path)
            .field("tags", &self.tags)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Owned description of a field and, for parents, its children.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub path: FieldPath,
    /// Field name as declared in the record.
    pub name: &'static str,
    pub tags: TagValues,
    pub type_name: String,
    pub flags: FieldFlags,
    pub children: Vec<FieldInfo>,
}

/// Describe the fields of record type `T` in declaration order.
pub fn describe<T: Reflect>(schema: &TagSchema) -> Result<Vec<FieldInfo>, TagfigError> {
    let Some(fields) = record_fields(T::shape()) else {
        return Err(TagfigError::InvalidTarget {
            type_name: std::any::type_name::<T>(),
            reason: "not a record",
        });
    };
    classify::<T>(schema)?;
    Ok(describe_fields(fields, &FieldPath::root(), schema))
}

/// Find the field at a dotted identifier path.
pub fn find_field<'a>(fields: &'a [FieldInfo], dotted: &str) -> Option<&'a FieldInfo> {
    let mut current = fields;
    let mut found = None;
    for segment in dotted.split('.') {
        let field = current.iter().find(|f| f.tags.ident == segment)?;
        current = &field.children;
        found = Some(field);
    }
    found
}

/// Fields of a record, looking through any references to it.
pub(crate) fn record_fields(shape: &'static TypeShape) -> Option<&'static [FieldMeta]> {
    match shape {
        TypeShape::Record { fields, .. } => Some(*fields),
        TypeShape::Pointer(target) => record_fields(target()),
        _ => None,
    }
}

fn describe_fields(
    fields: &'static [FieldMeta],
    parent: &FieldPath,
    schema: &TagSchema,
) -> Vec<FieldInfo> {
    fields
        .iter()
        .map(|meta| {
            let tags = TagValues::resolve(meta, schema);
            let path = parent.child(tags.ident.as_str());
            let shape = (meta.shape)();
            let children = match record_fields(shape) {
                Some(nested) if shape.is_parent() => describe_fields(nested, &path, schema),
                _ => Vec::new(),
            };
            FieldInfo {
                name: meta.name,
                type_name: shape.describe(),
                flags: FieldFlags::of(meta),
                tags,
                path,
                children,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{LocalConf, Redis};

    #[test]
    fn path_joins_with_dots() {
        let path = FieldPath::root().child("redis").child("host");
        assert_eq!(path.to_string(), "redis.host");
        assert!(!path.is_root());
        assert!(FieldPath::root().is_root());
    }

    #[test]
    fn describe_lists_fields_in_order() {
        let fields = describe::<Redis>(&TagSchema::default()).unwrap();
        let idents: Vec<_> = fields.iter().map(|f| f.tags.ident.as_str()).collect();
        assert_eq!(idents, ["host", "port", "db", "enable"]);
        assert_eq!(fields[2].type_name, "i8");
        assert_eq!(fields[0].tags.default.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn describe_nests_parents() {
        let fields = describe::<LocalConf>(&TagSchema::default()).unwrap();
        let redis = find_field(&fields, "redis").unwrap();
        assert!(redis.flags.is_parent);
        assert_eq!(redis.children.len(), 4);

        let port = find_field(&fields, "redis.port").unwrap();
        assert_eq!(port.path.to_string(), "redis.port");
        assert_eq!(port.tags.describe, "Redis port");
    }

    #[test]
    fn describe_sets_collection_flags() {
        let fields = describe::<LocalConf>(&TagSchema::default()).unwrap();
        assert!(find_field(&fields, "logMap").unwrap().flags.is_map);
        assert!(find_field(&fields, "whiteIP").unwrap().flags.is_slice);
        assert!(!find_field(&fields, "cfg_file").unwrap().flags.is_settable);
    }

    #[test]
    fn describe_rejects_non_records() {
        let err = describe::<u32>(&TagSchema::default()).unwrap_err();
        assert!(matches!(err, TagfigError::InvalidTarget { .. }));
    }

    #[test]
    fn find_field_misses_unknown_keys() {
        let fields = describe::<Redis>(&TagSchema::default()).unwrap();
        assert!(find_field(&fields, "nope").is_none());
        assert!(find_field(&fields, "host.deeper").is_none());
    }
}
