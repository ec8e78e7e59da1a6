//! The defaulting driver.
//!
//! [`populate_defaults`] walks a record field by field in declaration order.
//! For each settable field it first allocates unset references and descends
//! into nested records, then applies the field's default tag, but only when
//! the field is still zero after that. Values already present, whether
//! decoded from a document or set by hand, are never overwritten, which
//! makes a second pass a no-op.

use tracing::{debug, trace};

use crate::classify::classify;
use crate::descriptor::{FieldDescriptor, FieldPath};
use crate::error::{SchemaViolation, TagfigError};
use crate::record::RecordMut;
use crate::reflect::Reflect;
use crate::tag::TagSchema;

/// Default literal meaning "no default".
pub const UNSET: &str = "-";

/// Carries the tag schema through a defaulting pass.
#[derive(Debug, Clone, Copy)]
pub struct Driver<'s> {
    schema: &'s TagSchema,
}

impl<'s> Driver<'s> {
    pub fn new(schema: &'s TagSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s TagSchema {
        self.schema
    }

    /// Populate every field of `record`, stopping at the first failure.
    pub fn populate_record(
        &self,
        record: RecordMut<'_>,
        parent: &FieldPath,
    ) -> Result<(), TagfigError> {
        for (meta, storage) in record.fields.iter().zip(record.values) {
            self.apply(FieldDescriptor::new(meta, storage, parent, self.schema))?;
        }
        Ok(())
    }

    fn apply(&self, field: FieldDescriptor<'_>) -> Result<(), TagfigError> {
        let FieldDescriptor {
            path,
            tags,
            storage,
            flags,
        } = field;

        if !flags.is_settable {
            trace!(path = %path, "skipping non-settable field");
            return Ok(());
        }

        storage.populate(self, &path)?;

        let Some(default) = tags.default.as_deref() else {
            return Ok(());
        };
        if flags.is_parent {
            return Err(TagfigError::Schema {
                path: path.to_string(),
                violation: SchemaViolation::DefaultOnParent,
            });
        }
        if default == UNSET {
            return Ok(());
        }
        if !storage.is_deep_zero() {
            trace!(path = %path, "keeping existing value");
            return Ok(());
        }

        storage.set_text(default, self, &path)?;
        debug!(path = %path, default, "applied default");
        Ok(())
    }
}

/// Fill every unset reference and every zero-valued field that carries a
/// default tag, throughout the record graph rooted at `target`.
///
/// `target` must be a record, or a non-empty reference to one.
///
/// ```ignore
/// let mut conf = LocalConf::zero();
/// tagfig::populate_defaults(&mut conf, &TagSchema::default())?;
/// assert_eq!(conf.app_name, "demoApp");
/// ```
pub fn populate_defaults<T: Reflect>(target: &mut T, schema: &TagSchema) -> Result<(), TagfigError> {
    let type_name = std::any::type_name::<T>();
    if !T::shape().is_record_like() {
        return Err(TagfigError::InvalidTarget {
            type_name,
            reason: "not a record",
        });
    }
    classify::<T>(schema)?;

    let Some(record) = target.record_mut() else {
        return Err(TagfigError::InvalidTarget {
            type_name,
            reason: "empty reference",
        });
    };
    debug!(type_name, "populating defaults");
    Driver::new(schema).populate_record(record, &FieldPath::root())
}

/// Build a fresh `T` with every reference allocated and every default applied.
pub fn materialize<T: Reflect>(schema: &TagSchema) -> Result<T, TagfigError> {
    classify::<T>(schema)?;
    T::materialize(&Driver::new(schema), &FieldPath::root())
}
