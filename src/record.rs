//! Records: structs whose fields the engine walks.
//!
//! A record is declared as an ordinary struct and registered with the
//! [`record!`](crate::record!) macro, which pairs every field with its raw
//! tag string:
//!
//! ```ignore
//! #[derive(Debug, Clone, PartialEq)]
//! pub struct Redis {
//!     pub host: String,
//!     pub port: i64,
//!     secret: String,
//! }
//!
//! tagfig::record! {
//!     Redis {
//!         host: r#"yaml:"host" default:"127.0.0.1""#,
//!         port: r#"yaml:"port" default:"6379" desc:"Server port""#,
//!         #[readonly]
//!         secret: "",
//!     }
//! }
//! ```
//!
//! Every field must be listed, in declaration order. `#[readonly]` marks a
//! field the engine must never write; it is skipped by the driver and left
//! out of encoded documents.

use crate::descriptor::FieldPath;
use crate::document::{DecodeCx, EncodeCx, Node, type_mismatch};
use crate::driver::Driver;
use crate::error::TagfigError;
use crate::reflect::Reflect;
use crate::shape::{FieldMeta, TypeShape};
use crate::tag::TagValues;

pub trait Record: Reflect + Sized {
    /// Field metadata in declaration order.
    const FIELDS: &'static [FieldMeta];

    /// Field storage, parallel to [`FIELDS`](Record::FIELDS).
    fn values(&self) -> Vec<&dyn Reflect>;

    fn values_mut(&mut self) -> Vec<&mut dyn Reflect>;
}

/// Mutable field access to one record instance.
pub struct RecordMut<'a> {
    pub type_name: &'static str,
    pub fields: &'static [FieldMeta],
    pub values: Vec<&'a mut dyn Reflect>,
}

impl<'a> RecordMut<'a> {
    pub fn new<R: Record>(record: &'a mut R) -> Self {
        Self {
            type_name: std::any::type_name::<R>(),
            fields: R::FIELDS,
            values: record.values_mut(),
        }
    }
}

/// Implement [`Record`](crate::Record) and [`Reflect`](crate::Reflect) for
/// a struct. See the [`record`](crate::record) module docs.
#[macro_export]
macro_rules! record {
    (
        $name:ident {
            $( $(#[$flag:ident])? $field:ident : $tag:literal ),* $(,)?
        }
    ) => {
        impl $crate::Record for $name {
            const FIELDS: &'static [$crate::FieldMeta] = &[
                $(
                    $crate::FieldMeta {
                        name: stringify!($field),
                        tag: $tag,
                        settable: $crate::__settable!($($flag)?),
                        shape: {
                            fn shape() -> &'static $crate::TypeShape {
                                $crate::__private::field_shape(|record: &$name| &record.$field)
                            }
                            shape
                        },
                    },
                )*
            ];

            fn values(&self) -> ::std::vec::Vec<&dyn $crate::Reflect> {
                ::std::vec![$(&self.$field as &dyn $crate::Reflect),*]
            }

            fn values_mut(&mut self) -> ::std::vec::Vec<&mut dyn $crate::Reflect> {
                ::std::vec![$(&mut self.$field as &mut dyn $crate::Reflect),*]
            }
        }

        impl $crate::Reflect for $name {
            fn shape() -> &'static $crate::TypeShape {
                static SHAPE: $crate::TypeShape = $crate::TypeShape::Record {
                    type_name: stringify!($name),
                    fields: <$name as $crate::Record>::FIELDS,
                };
                &SHAPE
            }

            fn zero() -> Self {
                $name {
                    $($field: $crate::Reflect::zero(),)*
                }
            }

            fn materialize(
                driver: &$crate::Driver<'_>,
                parent: &$crate::FieldPath,
            ) -> ::std::result::Result<Self, $crate::TagfigError> {
                $crate::__private::materialize_record(driver, parent)
            }

            fn type_shape(&self) -> &'static $crate::TypeShape {
                <Self as $crate::Reflect>::shape()
            }

            fn is_deep_zero(&self) -> bool {
                $crate::__private::record_is_deep_zero(self)
            }

            fn populate(
                &mut self,
                driver: &$crate::Driver<'_>,
                path: &$crate::FieldPath,
            ) -> ::std::result::Result<(), $crate::TagfigError> {
                driver.populate_record($crate::RecordMut::new(self), path)
            }

            fn set_text(
                &mut self,
                _text: &str,
                _driver: &$crate::Driver<'_>,
                path: &$crate::FieldPath,
            ) -> ::std::result::Result<(), $crate::TagfigError> {
                Err($crate::TagfigError::Schema {
                    path: path.to_string(),
                    violation: $crate::SchemaViolation::DefaultOnParent,
                })
            }

            fn to_node(
                &self,
                cx: &$crate::EncodeCx<'_>,
            ) -> ::std::result::Result<$crate::Node, $crate::TagfigError> {
                $crate::__private::record_to_node(self, cx)
            }

            fn from_node(
                &mut self,
                node: &$crate::Node,
                cx: &mut $crate::DecodeCx<'_>,
                path: &$crate::FieldPath,
            ) -> ::std::result::Result<(), $crate::TagfigError> {
                $crate::__private::record_from_node(self, node, cx, path)
            }

            fn record_mut(&mut self) -> ::std::option::Option<$crate::RecordMut<'_>> {
                Some($crate::RecordMut::new(self))
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __settable {
    () => {
        true
    };
    (readonly) => {
        false
    };
}

/// Shape of the field selected by `project`; lets the macro name a field's
/// type without spelling it out.
pub fn field_shape<R, T, P>(_project: P) -> &'static TypeShape
where
    T: Reflect,
    P: Fn(&R) -> &T,
{
    T::shape()
}

pub fn materialize_record<R: Record>(
    driver: &Driver<'_>,
    parent: &FieldPath,
) -> Result<R, TagfigError> {
    let mut record = R::zero();
    driver.populate_record(RecordMut::new(&mut record), parent)?;
    Ok(record)
}

pub fn record_is_deep_zero<R: Record>(record: &R) -> bool {
    record.values().iter().all(|value| value.is_deep_zero())
}

pub fn record_to_node<R: Record>(record: &R, cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
    let mut object = serde_json::Map::new();
    for (meta, value) in R::FIELDS.iter().zip(record.values()) {
        if !meta.settable {
            continue;
        }
        let tags = TagValues::resolve(meta, cx.schema());
        object.insert(tags.ident, value.to_node(cx)?);
    }
    Ok(Node::Object(object))
}

pub fn record_from_node<R: Record>(
    record: &mut R,
    node: &Node,
    cx: &mut DecodeCx<'_>,
    path: &FieldPath,
) -> Result<(), TagfigError> {
    let object = match node {
        Node::Object(object) => object,
        Node::Null => return Ok(()),
        other => return Err(type_mismatch(path, "a table", other)),
    };

    let mut known = Vec::with_capacity(R::FIELDS.len());
    for (meta, value) in R::FIELDS.iter().zip(record.values_mut()) {
        if !meta.settable {
            continue;
        }
        let tags = TagValues::resolve(meta, cx.schema());
        if let Some(item) = object.get(&tags.ident) {
            value.from_node(item, cx, &path.child(tags.ident.as_str()))?;
        }
        known.push(tags.ident);
    }

    for key in object.keys() {
        if !known.contains(key) {
            cx.note_unknown(&path.child(key.as_str()));
        }
    }
    Ok(())
}
