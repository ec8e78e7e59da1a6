//! The [`Reflect`] trait and its implementations for scalar types.
//!
//! `Reflect` is how the engine sees into a value at runtime. It splits into
//! two halves:
//!
//! - **Static** functions (`shape`, `zero`, `materialize`) describe and build
//!   values of a concrete type. They are only callable on sized types and are
//!   what collections use to manufacture fresh elements.
//! - **Object-safe** methods operate on an existing value through
//!   `&mut dyn Reflect`: zero-checks, walking into children, applying a
//!   textual default, and projecting to and from a document tree.
//!
//! Records get their implementation from the [`record!`](crate::record!)
//! macro, self-decoding types from [`reflect_text!`](crate::reflect_text!).
//! Containers live in [`containers`](crate::containers).

use std::any::Any;

use crate::descriptor::FieldPath;
use crate::document::{DecodeCx, EncodeCx, Node, type_mismatch};
use crate::driver::Driver;
use crate::error::TagfigError;
use crate::record::RecordMut;
use crate::scalar;
use crate::shape::{FloatWidth, IntWidth, TypeShape};
use crate::types::Bytes;

pub trait Reflect: Any {
    /// Shape of this type.
    fn shape() -> &'static TypeShape
    where
        Self: Sized;

    /// The zero value: empty, false, 0, `None`.
    fn zero() -> Self
    where
        Self: Sized;

    /// A fresh value with every reference allocated and every reachable
    /// record defaulted. `parent` is the path the value will live under.
    fn materialize(driver: &Driver<'_>, parent: &FieldPath) -> Result<Self, TagfigError>
    where
        Self: Sized,
    {
        let _ = (driver, parent);
        Ok(Self::zero())
    }

    /// Shape of this value's type, callable through a trait object.
    fn type_shape(&self) -> &'static TypeShape;

    /// Zero in the structural sense: every leaf holds its zero value and
    /// every collection is empty. Unset references count as zero.
    fn is_deep_zero(&self) -> bool;

    /// Allocate unset references and run the driver over nested records.
    fn populate(&mut self, driver: &Driver<'_>, path: &FieldPath) -> Result<(), TagfigError> {
        let _ = (driver, path);
        Ok(())
    }

    /// Replace this value with one decoded from a default literal.
    fn set_text(
        &mut self,
        text: &str,
        driver: &Driver<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError>;

    fn to_node(&self, cx: &EncodeCx<'_>) -> Result<Node, TagfigError>;

    /// Overlay the contents of `node` onto this value.
    fn from_node(
        &mut self,
        node: &Node,
        cx: &mut DecodeCx<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError>;

    /// Field access when this value is, or refers to, a record.
    fn record_mut(&mut self) -> Option<RecordMut<'_>> {
        None
    }
}

macro_rules! reflect_int {
    ($($ty:ty => $signed:literal, $width:ident;)*) => {$(
        impl Reflect for $ty {
            fn shape() -> &'static TypeShape {
                &TypeShape::Int { signed: $signed, width: IntWidth::$width }
            }

            fn zero() -> Self {
                0
            }

            fn type_shape(&self) -> &'static TypeShape {
                <Self as Reflect>::shape()
            }

            fn is_deep_zero(&self) -> bool {
                *self == 0
            }

            fn set_text(
                &mut self,
                text: &str,
                _driver: &Driver<'_>,
                path: &FieldPath,
            ) -> Result<(), TagfigError> {
                *self = scalar::parse_number(text).map_err(|e| e.at(path))?;
                Ok(())
            }

            fn to_node(&self, _cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
                Ok(Node::from(*self))
            }

            fn from_node(
                &mut self,
                node: &Node,
                cx: &mut DecodeCx<'_>,
                path: &FieldPath,
            ) -> Result<(), TagfigError> {
                match node {
                    Node::Number(n) => {
                        let wide = n
                            .as_i64()
                            .map(i128::from)
                            .or_else(|| n.as_u64().map(i128::from))
                            .ok_or_else(|| type_mismatch(path, "an integer", node))?;
                        *self = <$ty>::try_from(wide).map_err(|_| TagfigError::Decode {
                            path: path.to_string(),
                            reason: format!("{wide} is out of range for {}", stringify!($ty)),
                        })?;
                        Ok(())
                    }
                    Node::String(text) => self.set_text(text, &cx.driver(), path),
                    other => Err(type_mismatch(path, "an integer", other)),
                }
            }
        }
    )*};
}

reflect_int! {
    i8 => true, W8;
    i16 => true, W16;
    i32 => true, W32;
    i64 => true, W64;
    isize => true, Native;
    u8 => false, W8;
    u16 => false, W16;
    u32 => false, W32;
    u64 => false, W64;
    usize => false, Native;
}

macro_rules! reflect_float {
    ($($ty:ty => $width:ident;)*) => {$(
        impl Reflect for $ty {
            fn shape() -> &'static TypeShape {
                &TypeShape::Float(FloatWidth::$width)
            }

            fn zero() -> Self {
                0.0
            }

            fn type_shape(&self) -> &'static TypeShape {
                <Self as Reflect>::shape()
            }

            fn is_deep_zero(&self) -> bool {
                *self == 0.0
            }

            fn set_text(
                &mut self,
                text: &str,
                _driver: &Driver<'_>,
                path: &FieldPath,
            ) -> Result<(), TagfigError> {
                *self = scalar::parse_float(text).map_err(|e| e.at(path))?;
                Ok(())
            }

            fn to_node(&self, _cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
                serde_json::Number::from_f64(f64::from(*self))
                    .map(Node::Number)
                    .ok_or_else(|| TagfigError::Encode {
                        reason: format!("{} is not representable in a document", self),
                    })
            }

            fn from_node(
                &mut self,
                node: &Node,
                cx: &mut DecodeCx<'_>,
                path: &FieldPath,
            ) -> Result<(), TagfigError> {
                match node {
                    Node::Number(n) => {
                        let value = n
                            .as_f64()
                            .ok_or_else(|| type_mismatch(path, "a number", node))?;
                        let narrowed = value as $ty;
                        if value.is_finite() && !narrowed.is_finite() {
                            return Err(TagfigError::Decode {
                                path: path.to_string(),
                                reason: format!("{value} is out of range for {}", stringify!($ty)),
                            });
                        }
                        *self = narrowed;
                        Ok(())
                    }
                    Node::String(text) => self.set_text(text, &cx.driver(), path),
                    other => Err(type_mismatch(path, "a number", other)),
                }
            }
        }
    )*};
}

reflect_float! {
    f32 => F32;
    f64 => F64;
}

impl Reflect for bool {
    fn shape() -> &'static TypeShape {
        &TypeShape::Bool
    }

    fn zero() -> Self {
        false
    }

    fn type_shape(&self) -> &'static TypeShape {
        <Self as Reflect>::shape()
    }

    fn is_deep_zero(&self) -> bool {
        !*self
    }

    fn set_text(
        &mut self,
        text: &str,
        _driver: &Driver<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        *self = scalar::parse_bool(text).map_err(|e| e.at(path))?;
        Ok(())
    }

    fn to_node(&self, _cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
        Ok(Node::Bool(*self))
    }

    fn from_node(
        &mut self,
        node: &Node,
        cx: &mut DecodeCx<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        match node {
            Node::Bool(b) => {
                *self = *b;
                Ok(())
            }
            Node::String(text) => self.set_text(text, &cx.driver(), path),
            other => Err(type_mismatch(path, "a boolean", other)),
        }
    }
}

impl Reflect for String {
    fn shape() -> &'static TypeShape {
        &TypeShape::String
    }

    fn zero() -> Self {
        String::new()
    }

    fn type_shape(&self) -> &'static TypeShape {
        <Self as Reflect>::shape()
    }

    fn is_deep_zero(&self) -> bool {
        self.is_empty()
    }

    fn set_text(
        &mut self,
        text: &str,
        _driver: &Driver<'_>,
        _path: &FieldPath,
    ) -> Result<(), TagfigError> {
        text.clone_into(self);
        Ok(())
    }

    fn to_node(&self, _cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
        Ok(Node::String(self.clone()))
    }

    fn from_node(
        &mut self,
        node: &Node,
        _cx: &mut DecodeCx<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        match node {
            Node::String(s) => s.clone_into(self),
            // YAML readily yields numbers and booleans for unquoted text.
            Node::Number(n) => *self = n.to_string(),
            Node::Bool(b) => *self = b.to_string(),
            other => return Err(type_mismatch(path, "a string", other)),
        }
        Ok(())
    }
}

impl Reflect for Bytes {
    fn shape() -> &'static TypeShape {
        &TypeShape::Bytes
    }

    fn zero() -> Self {
        Bytes::default()
    }

    fn type_shape(&self) -> &'static TypeShape {
        <Self as Reflect>::shape()
    }

    fn is_deep_zero(&self) -> bool {
        self.is_empty()
    }

    fn set_text(
        &mut self,
        text: &str,
        _driver: &Driver<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        *self = Bytes(scalar::parse_bytes(text).map_err(|e| e.at(path))?);
        Ok(())
    }

    fn to_node(&self, _cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
        Ok(Node::String(self.to_base64()))
    }

    fn from_node(
        &mut self,
        node: &Node,
        cx: &mut DecodeCx<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        match node {
            Node::String(text) => self.set_text(text, &cx.driver(), path),
            Node::Array(items) => {
                let mut bytes = Vec::with_capacity(items.len());
                for item in items {
                    let byte = item
                        .as_u64()
                        .and_then(|b| u8::try_from(b).ok())
                        .ok_or_else(|| type_mismatch(path, "a byte", item))?;
                    bytes.push(byte);
                }
                *self = Bytes(bytes);
                Ok(())
            }
            other => Err(type_mismatch(path, "base64 text", other)),
        }
    }
}

/// A free-form slot: takes a default as a plain string and a document value
/// as-is.
impl Reflect for Node {
    fn shape() -> &'static TypeShape {
        &TypeShape::Any
    }

    fn zero() -> Self {
        Node::Null
    }

    fn type_shape(&self) -> &'static TypeShape {
        <Self as Reflect>::shape()
    }

    fn is_deep_zero(&self) -> bool {
        self.is_null()
    }

    fn set_text(
        &mut self,
        text: &str,
        _driver: &Driver<'_>,
        _path: &FieldPath,
    ) -> Result<(), TagfigError> {
        *self = Node::String(text.to_string());
        Ok(())
    }

    fn to_node(&self, _cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
        Ok(self.clone())
    }

    fn from_node(
        &mut self,
        node: &Node,
        _cx: &mut DecodeCx<'_>,
        _path: &FieldPath,
    ) -> Result<(), TagfigError> {
        *self = node.clone();
        Ok(())
    }
}

/// Types that can sit in a record but that the engine refuses to handle.
/// Classification reports them before anything is written.
macro_rules! reflect_unsupported {
    ($($ty:ty),* $(,)?) => {$(
        impl Reflect for $ty {
            fn shape() -> &'static TypeShape {
                &TypeShape::Unsupported { type_name: stringify!($ty) }
            }

            fn zero() -> Self {
                Default::default()
            }

            fn type_shape(&self) -> &'static TypeShape {
                <Self as Reflect>::shape()
            }

            fn is_deep_zero(&self) -> bool {
                *self == <$ty>::default()
            }

            fn set_text(
                &mut self,
                _text: &str,
                _driver: &Driver<'_>,
                path: &FieldPath,
            ) -> Result<(), TagfigError> {
                Err(unsupported(path, stringify!($ty)))
            }

            fn to_node(&self, _cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
                Err(TagfigError::Encode {
                    reason: format!("{} values cannot be encoded", stringify!($ty)),
                })
            }

            fn from_node(
                &mut self,
                _node: &Node,
                _cx: &mut DecodeCx<'_>,
                path: &FieldPath,
            ) -> Result<(), TagfigError> {
                Err(unsupported(path, stringify!($ty)))
            }
        }
    )*};
}

reflect_unsupported!(char, i128, u128, ());

fn unsupported(path: &FieldPath, type_name: &str) -> TagfigError {
    TagfigError::UnsupportedType {
        path: path.to_string(),
        type_name: type_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagSchema;

    fn set<T: Reflect>(text: &str) -> Result<T, TagfigError> {
        let schema = TagSchema::default();
        let mut value = T::zero();
        value.set_text(text, &Driver::new(&schema), &FieldPath::root().child("v"))?;
        Ok(value)
    }

    #[test]
    fn integers_respect_width() {
        assert_eq!(set::<i8>("-128").unwrap(), -128);
        assert_eq!(set::<i16>("300").unwrap(), 300);
        assert!(matches!(set::<i8>("300"), Err(TagfigError::Parse { .. })));
        assert!(matches!(set::<u8>("-1"), Err(TagfigError::Parse { .. })));
        assert_eq!(set::<u64>("18446744073709551615").unwrap(), u64::MAX);
    }

    #[test]
    fn parse_error_names_field_path() {
        let err = set::<u16>("abc").unwrap_err();
        assert!(err.to_string().contains("'v'"));
    }

    #[test]
    fn booleans_are_strict() {
        assert!(set::<bool>("true").unwrap());
        assert!(!set::<bool>("false").unwrap());
        assert!(set::<bool>("yes").is_err());
        assert!(set::<bool>("1").is_err());
    }

    #[test]
    fn floats_parse_scientific_notation() {
        assert_eq!(set::<f64>("1.5e3").unwrap(), 1500.0);
        assert_eq!(set::<f32>("0.25").unwrap(), 0.25);
    }

    #[test]
    fn float_overflow_is_a_parse_error() {
        let checks = [
            ("1e300", "f32", set::<f32>("1e300").map(drop)),
            ("1e400", "f64", set::<f64>("1e400").map(drop)),
        ];
        for (text, target, result) in checks {
            match result.unwrap_err() {
                TagfigError::Parse { path, source } => {
                    assert_eq!(path, "v");
                    assert_eq!(source.value, text);
                    assert_eq!(source.target, target);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn narrowing_document_floats_checks_range() {
        let schema = TagSchema::default();
        let mut cx = DecodeCx::new(&schema, false);
        let path = FieldPath::root().child("ratio");
        let mut value = 0.0f32;

        let err = value
            .from_node(&serde_json::json!(1e300), &mut cx, &path)
            .unwrap_err();
        assert!(err.to_string().contains("out of range for f32"), "{err}");
        assert_eq!(value, 0.0);

        value.from_node(&serde_json::json!(2.5), &mut cx, &path).unwrap();
        assert_eq!(value, 2.5);
    }

    #[test]
    fn strings_are_taken_verbatim() {
        assert_eq!(set::<String>(" a,b ").unwrap(), " a,b ");
    }

    #[test]
    fn bytes_decode_base64() {
        assert_eq!(set::<Bytes>("aGVsbG8=").unwrap(), Bytes(b"hello".to_vec()));
        assert!(set::<Bytes>("not base64!").is_err());
    }

    #[test]
    fn free_form_slot_stores_text() {
        assert_eq!(set::<Node>("anything").unwrap(), Node::String("anything".into()));
    }

    #[test]
    fn unsupported_types_refuse_text() {
        assert!(matches!(
            set::<char>("x"),
            Err(TagfigError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn zero_checks() {
        assert!(0i32.is_deep_zero());
        assert!(!7u8.is_deep_zero());
        assert!(String::new().is_deep_zero());
        assert!(false.is_deep_zero());
        assert!(Node::Null.is_deep_zero());
    }
}
