//! Runtime type descriptions.
//!
//! A [`TypeShape`] is the engine's view of a type: which category it falls in
//! and, for composites, the shapes of its parts. Child shapes are held as
//! function pointers and resolved on demand, so a record that refers to
//! itself can still be described (and then rejected by classification)
//! without building an infinite structure.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::RwLock;

/// Lazily resolved shape of a child type.
pub type ShapeFn = fn() -> &'static TypeShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    /// Platform word size (`isize`/`usize`).
    Native,
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::Native => usize::BITS,
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

#[derive(Debug)]
pub enum TypeShape {
    Bool,
    Int { signed: bool, width: IntWidth },
    Float(FloatWidth),
    String,
    /// Byte buffer, written as base64 text.
    Bytes,
    /// A type that decodes itself from text.
    Text { type_name: &'static str },
    /// Free-form slot holding whatever the document or default supplies.
    Any,
    Record {
        type_name: &'static str,
        fields: &'static [FieldMeta],
    },
    /// Nullable reference to a value of the target shape.
    Pointer(ShapeFn),
    Sequence(ShapeFn),
    Map { key: ShapeFn, value: ShapeFn },
    Unsupported { type_name: &'static str },
}

impl TypeShape {
    /// Whether values of this shape have member fields of their own.
    ///
    /// True for records and for references to records, but only one level
    /// deep: a reference to a reference to a record is not a parent.
    pub fn is_parent(&self) -> bool {
        match self {
            TypeShape::Record { .. } => true,
            TypeShape::Pointer(target) => matches!(target(), TypeShape::Record { .. }),
            _ => false,
        }
    }

    /// Whether this is a record behind any number of references.
    pub fn is_record_like(&self) -> bool {
        match self {
            TypeShape::Record { .. } => true,
            TypeShape::Pointer(target) => target().is_record_like(),
            _ => false,
        }
    }

    /// Whether this shape may be used as a map key.
    pub fn is_key(&self) -> bool {
        matches!(self, TypeShape::String | TypeShape::Int { .. })
    }

    /// Human-readable type description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            TypeShape::Bool => "bool".into(),
            TypeShape::Int { signed, width } => {
                let sign = if *signed { 'i' } else { 'u' };
                match width {
                    IntWidth::Native => format!("{sign}size"),
                    other => format!("{sign}{}", other.bits()),
                }
            }
            TypeShape::Float(FloatWidth::F32) => "f32".into(),
            TypeShape::Float(FloatWidth::F64) => "f64".into(),
            TypeShape::String => "string".into(),
            TypeShape::Bytes => "bytes".into(),
            TypeShape::Any => "any".into(),
            TypeShape::Text { type_name }
            | TypeShape::Record { type_name, .. }
            | TypeShape::Unsupported { type_name } => (*type_name).into(),
            TypeShape::Pointer(target) => format!("Option<{}>", target().describe()),
            TypeShape::Sequence(element) => format!("Vec<{}>", element().describe()),
            TypeShape::Map { key, value } => {
                format!("Map<{}, {}>", key().describe(), value().describe())
            }
        }
    }
}

/// Static description of one record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    /// Field name as declared.
    pub name: &'static str,
    /// Raw tag string.
    pub tag: &'static str,
    /// Whether the engine may write this field.
    pub settable: bool,
    pub shape: ShapeFn,
}

static SHAPES: LazyLock<RwLock<HashMap<TypeId, &'static TypeShape>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Shape for a generic type, built once per concrete `T` and kept for the
/// life of the process.
pub fn cached<T: 'static>(build: impl FnOnce() -> TypeShape) -> &'static TypeShape {
    let id = TypeId::of::<T>();
    if let Some(shape) = SHAPES.read().get(&id) {
        return shape;
    }
    *SHAPES
        .write()
        .entry(id)
        .or_insert_with(|| Box::leak(Box::new(build())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reflect;

    #[test]
    fn describe_names_integers_by_width() {
        assert_eq!(i8::shape().describe(), "i8");
        assert_eq!(u64::shape().describe(), "u64");
        assert_eq!(isize::shape().describe(), "isize");
    }

    #[test]
    fn describe_composites() {
        assert_eq!(<Vec<Option<String>>>::shape().describe(), "Vec<Option<string>>");
        assert_eq!(
            <std::collections::BTreeMap<i32, f64>>::shape().describe(),
            "Map<i32, f64>"
        );
    }

    #[test]
    fn cached_shape_is_shared() {
        let a = <Vec<u16>>::shape();
        let b = <Vec<u16>>::shape();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn parent_is_one_level_deep() {
        use crate::fixtures::test::Redis;
        assert!(Redis::shape().is_parent());
        assert!(<Option<Redis>>::shape().is_parent());
        assert!(!<Option<Option<Redis>>>::shape().is_parent());
        assert!(<Option<Option<Redis>>>::shape().is_record_like());
        assert!(!<Vec<Redis>>::shape().is_parent());
    }
}
