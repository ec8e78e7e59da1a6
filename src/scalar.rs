//! Text to scalar conversion.
//!
//! Used for default literals and for document strings landing in
//! non-string slots. Every parser returns a [`ParseError`] carrying the
//! offending text and the target type; callers attach the field path.

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::descriptor::FieldPath;
use crate::driver::Driver;
use crate::error::{BoxError, ParseError, TagfigError};
use crate::reflect::Reflect;
use crate::tag::TagSchema;

/// Parse `true` or `false`. Nothing else is accepted.
pub fn parse_bool(text: &str) -> Result<bool, ParseError> {
    text.parse::<bool>()
        .map_err(|e| ParseError::new(text, "bool", e))
}

/// Parse a decimal number, rejecting values outside the range of `T`.
pub fn parse_number<T>(text: &str) -> Result<T, ParseError>
where
    T: FromStr,
    T::Err: Into<BoxError>,
{
    text.parse::<T>()
        .map_err(|e| ParseError::new(text, std::any::type_name::<T>(), e))
}

/// Parse a floating point number. Finite text that overflows the range of
/// `T` is an error; only an explicit `inf` or `infinity` yields infinity.
pub fn parse_float<T>(text: &str) -> Result<T, ParseError>
where
    T: FromStr + Into<f64> + Copy,
    T::Err: Into<BoxError>,
{
    let value = parse_number::<T>(text)?;
    if value.into().is_infinite() && !names_infinity(text) {
        return Err(ParseError::new(
            text,
            std::any::type_name::<T>(),
            "value out of range",
        ));
    }
    Ok(value)
}

fn names_infinity(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Decode standard (padded) base64.
pub fn parse_bytes(text: &str) -> Result<Vec<u8>, ParseError> {
    STANDARD
        .decode(text)
        .map_err(|e| ParseError::new(text, "bytes", e))
}

pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Overwrite `target` with the value decoded from `text`.
///
/// Scalars parse directly; a reference is allocated first and the text
/// applied to its target.
pub fn parse_scalar(
    target: &mut dyn Reflect,
    text: &str,
    schema: &TagSchema,
) -> Result<(), TagfigError> {
    target.set_text(text, &Driver::new(schema), &FieldPath::root())
}
