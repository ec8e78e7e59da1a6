//! Comma-separated defaults for sequences and maps.
//!
//! A default literal for a collection is read as a single CSV record, so
//! quoting works as usual: `"a,b",c` is two tokens. For a sequence every
//! token becomes one element. For a map every token becomes one key, and
//! the value under each key is a freshly materialized value (a fully
//! defaulted record when the value type is a record).

use tracing::trace;

use crate::classify::classify;
use crate::descriptor::FieldPath;
use crate::driver::Driver;
use crate::error::{ParseError, TagfigError};
use crate::reflect::Reflect;
use crate::tag::TagSchema;

/// Split `text` into the fields of a single CSV record.
///
/// Empty text yields no tokens. Line breaks are only allowed inside quoted
/// fields; a literal holding a second record is rejected.
pub fn read_csv(text: &str) -> Result<Vec<String>, ParseError> {
    const TARGET: &str = "comma-separated list";
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();
    let tokens = match records.next() {
        None => return Ok(Vec::new()),
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        Some(Err(e)) => return Err(ParseError::new(text, TARGET, e)),
    };
    match records.next() {
        None => Ok(tokens),
        Some(Err(e)) => Err(ParseError::new(text, TARGET, e)),
        Some(Ok(_)) => Err(ParseError::new(text, TARGET, "more than one line")),
    }
}

/// Parse a sequence default into `Vec<T>`.
pub fn parse_sequence_default<T: Reflect>(
    text: &str,
    schema: &TagSchema,
) -> Result<Vec<T>, TagfigError> {
    classify::<T>(schema)?;
    sequence_from_csv(text, &Driver::new(schema), &FieldPath::root())
}

/// Parse a map default into any map type built from `(K, V)` pairs.
pub fn parse_map_default<K, V, M>(text: &str, schema: &TagSchema) -> Result<M, TagfigError>
where
    K: Reflect,
    V: Reflect,
    M: FromIterator<(K, V)>,
{
    classify::<V>(schema)?;
    map_from_csv(text, &Driver::new(schema), &FieldPath::root())
}

pub(crate) fn sequence_from_csv<T: Reflect>(
    text: &str,
    driver: &Driver<'_>,
    path: &FieldPath,
) -> Result<Vec<T>, TagfigError> {
    let tokens = read_csv(text).map_err(|e| e.at(path))?;
    let consumes_text = !T::shape().is_record_like();
    let mut elements = Vec::with_capacity(tokens.len());
    for (index, token) in tokens.iter().enumerate() {
        let element_path = path.child(index.to_string());
        let mut element = T::materialize(driver, &element_path)?;
        if consumes_text {
            element.set_text(token, driver, &element_path)?;
        }
        elements.push(element);
    }
    trace!(path = %path, count = elements.len(), "parsed sequence default");
    Ok(elements)
}

pub(crate) fn map_from_csv<K, V, M>(
    text: &str,
    driver: &Driver<'_>,
    path: &FieldPath,
) -> Result<M, TagfigError>
where
    K: Reflect,
    V: Reflect,
    M: FromIterator<(K, V)>,
{
    let key_shape = K::shape();
    if !key_shape.is_key() {
        return Err(TagfigError::UnsupportedKeyType {
            path: path.to_string(),
            type_name: key_shape.describe(),
        });
    }
    let tokens = read_csv(text).map_err(|e| e.at(path))?;
    let mut entries = Vec::with_capacity(tokens.len());
    for token in tokens {
        let entry_path = path.child(token.as_str());
        let mut key = K::zero();
        key.set_text(&token, driver, &entry_path)?;
        let value = V::materialize(driver, &entry_path)?;
        entries.push((key, value));
    }
    trace!(path = %path, count = entries.len(), "parsed map default");
    Ok(entries.into_iter().collect())
}
