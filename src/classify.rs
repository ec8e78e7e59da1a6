//! Up-front checks on a record type.
//!
//! Before the driver touches an instance, the whole type graph is walked
//! once to reject fields of unsupported types, map keys that are neither
//! strings nor integers, default tags on records behind any number of
//! references, sibling fields
//! sharing an identifier, and records that contain themselves. Failing here
//! means the target is never partially written.
//!
//! Accepted types are remembered per identifier and default key, so the walk
//! runs once per type and schema for the life of the process.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::LazyLock;

use parking_lot::RwLock;
use tracing::trace;

use crate::descriptor::FieldPath;
use crate::error::{SchemaViolation, TagfigError};
use crate::reflect::Reflect;
use crate::shape::{FieldMeta, TypeShape};
use crate::tag::{TagSchema, TagValues};

type VerdictKey = (TypeId, String, String);

static ACCEPTED: LazyLock<RwLock<HashSet<VerdictKey>>> =
    LazyLock::new(|| RwLock::new(HashSet::new()));

/// Check that `T` can be handled under `schema`.
pub fn classify<T: Reflect>(schema: &TagSchema) -> Result<(), TagfigError> {
    let key = (
        TypeId::of::<T>(),
        schema.ident_key.clone(),
        schema.default_key.clone(),
    );
    if ACCEPTED.read().contains(&key) {
        return Ok(());
    }

    Classifier {
        schema,
        open: Vec::new(),
    }
    .check(T::shape(), &FieldPath::root())?;

    trace!(type_name = std::any::type_name::<T>(), "type accepted");
    ACCEPTED.write().insert(key);
    Ok(())
}

struct Classifier<'s> {
    schema: &'s TagSchema,
    /// Records currently being walked, innermost last.
    open: Vec<&'static TypeShape>,
}

impl Classifier<'_> {
    fn check(&mut self, shape: &'static TypeShape, path: &FieldPath) -> Result<(), TagfigError> {
        match shape {
            TypeShape::Unsupported { type_name } => Err(TagfigError::UnsupportedType {
                path: path.to_string(),
                type_name: (*type_name).to_string(),
            }),
            TypeShape::Pointer(target) | TypeShape::Sequence(target) => {
                self.check(target(), path)
            }
            TypeShape::Map { key, value } => {
                let key = key();
                if !key.is_key() {
                    return Err(TagfigError::UnsupportedKeyType {
                        path: path.to_string(),
                        type_name: key.describe(),
                    });
                }
                self.check(value(), path)
            }
            TypeShape::Record { type_name, fields } => {
                self.check_record(shape, *type_name, *fields, path)
            }
            _ => Ok(()),
        }
    }

    fn check_record(
        &mut self,
        shape: &'static TypeShape,
        type_name: &'static str,
        fields: &'static [FieldMeta],
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        if self.open.iter().any(|open| std::ptr::eq(*open, shape)) {
            return Err(TagfigError::Schema {
                path: path.to_string(),
                violation: SchemaViolation::CyclicType(type_name),
            });
        }
        self.open.push(shape);

        let mut idents = HashSet::new();
        for meta in fields {
            let tags = TagValues::resolve(meta, self.schema);
            let child = path.child(tags.ident.as_str());
            if !idents.insert(tags.ident.clone()) {
                return Err(TagfigError::Schema {
                    path: child.to_string(),
                    violation: SchemaViolation::DuplicateIdent(tags.ident),
                });
            }
            let field_shape = (meta.shape)();
            if tags.default_is_set() && field_shape.is_record_like() {
                return Err(TagfigError::Schema {
                    path: child.to_string(),
                    violation: SchemaViolation::DefaultOnParent,
                });
            }
            self.check(field_shape, &child)?;
        }

        self.open.pop();
        Ok(())
    }
}
