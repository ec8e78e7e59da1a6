//! Types that decode themselves from text.
//!
//! Implement [`TextDecode`] for a type and invoke
//! [`reflect_text!`](crate::reflect_text!) on it to use it as a record
//! field. Defaults and document strings are handed to
//! [`TextDecode::decode_text`] untouched, which takes priority over any
//! other interpretation of the value.
//!
//! ```ignore
//! impl TextDecode for Level {
//!     fn decode_text(text: &str) -> Result<Self, BoxError> { ... }
//!     fn encode_text(&self) -> String { ... }
//!     fn zero() -> Self { Level::Off }
//!     fn is_zero(&self) -> bool { *self == Level::Off }
//! }
//! tagfig::reflect_text!(Level);
//! ```

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use crate::descriptor::FieldPath;
use crate::document::{DecodeCx, Node, type_mismatch};
use crate::error::{BoxError, ParseError, TagfigError};

pub trait TextDecode: Sized {
    fn decode_text(text: &str) -> Result<Self, BoxError>;

    fn encode_text(&self) -> String;

    fn zero() -> Self;

    fn is_zero(&self) -> bool;
}

/// Implement [`Reflect`](crate::Reflect) for types implementing
/// [`TextDecode`].
#[macro_export]
macro_rules! reflect_text {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::Reflect for $ty {
            fn shape() -> &'static $crate::TypeShape {
                static SHAPE: $crate::TypeShape = $crate::TypeShape::Text {
                    type_name: stringify!($ty),
                };
                &SHAPE
            }

            fn zero() -> Self {
                <$ty as $crate::TextDecode>::zero()
            }

            fn type_shape(&self) -> &'static $crate::TypeShape {
                <Self as $crate::Reflect>::shape()
            }

            fn is_deep_zero(&self) -> bool {
                $crate::TextDecode::is_zero(self)
            }

            fn set_text(
                &mut self,
                text: &str,
                _driver: &$crate::Driver<'_>,
                path: &$crate::FieldPath,
            ) -> ::std::result::Result<(), $crate::TagfigError> {
                *self = $crate::__private::decode_text::<$ty>(text, path)?;
                Ok(())
            }

            fn to_node(
                &self,
                _cx: &$crate::EncodeCx<'_>,
            ) -> ::std::result::Result<$crate::Node, $crate::TagfigError> {
                Ok($crate::Node::String($crate::TextDecode::encode_text(self)))
            }

            fn from_node(
                &mut self,
                node: &$crate::Node,
                cx: &mut $crate::DecodeCx<'_>,
                path: &$crate::FieldPath,
            ) -> ::std::result::Result<(), $crate::TagfigError> {
                $crate::__private::text_from_node(self, node, cx, path)
            }
        }
    )*};
}

pub fn decode_text<T: TextDecode>(text: &str, path: &FieldPath) -> Result<T, TagfigError> {
    T::decode_text(text).map_err(|cause| {
        ParseError::new(text, std::any::type_name::<T>(), cause).at(path)
    })
}

/// Decode a document value onto a text-decoded field. Numbers are accepted
/// through their textual form; null leaves the field alone.
pub fn text_from_node<T: TextDecode>(
    target: &mut T,
    node: &Node,
    _cx: &mut DecodeCx<'_>,
    path: &FieldPath,
) -> Result<(), TagfigError> {
    match node {
        Node::Null => Ok(()),
        Node::String(text) => {
            *target = decode_text(text, path)?;
            Ok(())
        }
        Node::Number(number) => {
            *target = decode_text(&number.to_string(), path)?;
            Ok(())
        }
        other => Err(type_mismatch(path, "a string", other)),
    }
}

impl TextDecode for PathBuf {
    fn decode_text(text: &str) -> Result<Self, BoxError> {
        Ok(PathBuf::from(text))
    }

    fn encode_text(&self) -> String {
        self.to_string_lossy().into_owned()
    }

    fn zero() -> Self {
        PathBuf::new()
    }

    fn is_zero(&self) -> bool {
        self.as_os_str().is_empty()
    }
}

macro_rules! text_via_from_str {
    ($($ty:ty => $zero:expr, $is_zero:expr;)*) => {$(
        impl TextDecode for $ty {
            fn decode_text(text: &str) -> Result<Self, BoxError> {
                Ok(text.parse::<$ty>()?)
            }

            fn encode_text(&self) -> String {
                self.to_string()
            }

            fn zero() -> Self {
                $zero
            }

            fn is_zero(&self) -> bool {
                let check: fn(&$ty) -> bool = $is_zero;
                check(self)
            }
        }
    )*};
}

text_via_from_str! {
    IpAddr => IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ip| ip.is_unspecified();
    Ipv4Addr => Ipv4Addr::UNSPECIFIED, |ip| ip.is_unspecified();
    Ipv6Addr => Ipv6Addr::UNSPECIFIED, |ip| ip.is_unspecified();
    SocketAddr => SocketAddr::from(([0, 0, 0, 0], 0)),
        |addr| addr.ip().is_unspecified() && addr.port() == 0;
}

crate::reflect_text!(PathBuf, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);
