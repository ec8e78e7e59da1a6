//! [`Reflect`] for references and collections.
//!
//! `Option<T>` is the nullable reference: walking a record allocates every
//! `None` it meets. `Box<T>` is transparent and shares the shape of `T`.
//! `Vec<T>` and the two standard maps take comma-separated defaults.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use tracing::trace;

use crate::collection;
use crate::descriptor::FieldPath;
use crate::document::{DecodeCx, EncodeCx, Node, type_mismatch};
use crate::driver::Driver;
use crate::error::TagfigError;
use crate::record::RecordMut;
use crate::reflect::Reflect;
use crate::shape::{self, TypeShape};

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> &'static TypeShape {
        shape::cached::<Self>(|| TypeShape::Pointer(T::shape))
    }

    fn zero() -> Self {
        None
    }

    fn materialize(driver: &Driver<'_>, parent: &FieldPath) -> Result<Self, TagfigError> {
        trace!(path = %parent, "allocating reference");
        Ok(Some(T::materialize(driver, parent)?))
    }

    fn type_shape(&self) -> &'static TypeShape {
        Self::shape()
    }

    fn is_deep_zero(&self) -> bool {
        self.as_ref().is_none_or(|value| value.is_deep_zero())
    }

    fn populate(&mut self, driver: &Driver<'_>, path: &FieldPath) -> Result<(), TagfigError> {
        match self {
            Some(value) => value.populate(driver, path),
            None => {
                *self = Self::materialize(driver, path)?;
                Ok(())
            }
        }
    }

    fn set_text(
        &mut self,
        text: &str,
        driver: &Driver<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        let value = match self.take() {
            Some(value) => value,
            None => T::materialize(driver, path)?,
        };
        self.insert(value).set_text(text, driver, path)
    }

    fn to_node(&self, cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
        match self {
            Some(value) => value.to_node(cx),
            None => Ok(Node::Null),
        }
    }

    fn from_node(
        &mut self,
        node: &Node,
        cx: &mut DecodeCx<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        if node.is_null() {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(T::zero).from_node(node, cx, path)
    }

    fn record_mut(&mut self) -> Option<RecordMut<'_>> {
        self.as_mut().and_then(|value| value.record_mut())
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> &'static TypeShape {
        T::shape()
    }

    fn zero() -> Self {
        Box::new(T::zero())
    }

    fn materialize(driver: &Driver<'_>, parent: &FieldPath) -> Result<Self, TagfigError> {
        T::materialize(driver, parent).map(Box::new)
    }

    fn type_shape(&self) -> &'static TypeShape {
        (**self).type_shape()
    }

    fn is_deep_zero(&self) -> bool {
        (**self).is_deep_zero()
    }

    fn populate(&mut self, driver: &Driver<'_>, path: &FieldPath) -> Result<(), TagfigError> {
        (**self).populate(driver, path)
    }

    fn set_text(
        &mut self,
        text: &str,
        driver: &Driver<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        (**self).set_text(text, driver, path)
    }

    fn to_node(&self, cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
        (**self).to_node(cx)
    }

    fn from_node(
        &mut self,
        node: &Node,
        cx: &mut DecodeCx<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        (**self).from_node(node, cx, path)
    }

    fn record_mut(&mut self) -> Option<RecordMut<'_>> {
        (**self).record_mut()
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> &'static TypeShape {
        shape::cached::<Self>(|| TypeShape::Sequence(T::shape))
    }

    fn zero() -> Self {
        Vec::new()
    }

    fn type_shape(&self) -> &'static TypeShape {
        Self::shape()
    }

    fn is_deep_zero(&self) -> bool {
        self.is_empty()
    }

    fn populate(&mut self, driver: &Driver<'_>, path: &FieldPath) -> Result<(), TagfigError> {
        for (index, element) in self.iter_mut().enumerate() {
            element.populate(driver, &path.child(index.to_string()))?;
        }
        Ok(())
    }

    fn set_text(
        &mut self,
        text: &str,
        driver: &Driver<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        *self = collection::sequence_from_csv(text, driver, path)?;
        Ok(())
    }

    fn to_node(&self, cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
        self.iter()
            .map(|element| element.to_node(cx))
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Array)
    }

    fn from_node(
        &mut self,
        node: &Node,
        cx: &mut DecodeCx<'_>,
        path: &FieldPath,
    ) -> Result<(), TagfigError> {
        match node {
            Node::Array(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let mut element = T::zero();
                    element.from_node(item, cx, &path.child(index.to_string()))?;
                    elements.push(element);
                }
                *self = elements;
                Ok(())
            }
            Node::String(text) => self.set_text(text, &cx.driver(), path),
            Node::Null => {
                self.clear();
                Ok(())
            }
            other => Err(type_mismatch(path, "a list", other)),
        }
    }
}

/// Document text for a map key.
fn key_text<K: Reflect>(key: &K, cx: &EncodeCx<'_>) -> Result<String, TagfigError> {
    Ok(match key.to_node(cx)? {
        Node::String(text) => text,
        other => other.to_string(),
    })
}

macro_rules! reflect_map {
    ($map:ident, [$($bound:tt)+], sort_keys = $sort:literal) => {
        impl<K, V> Reflect for $map<K, V>
        where
            K: Reflect + $($bound)+,
            V: Reflect,
        {
            fn shape() -> &'static TypeShape {
                shape::cached::<Self>(|| TypeShape::Map {
                    key: K::shape,
                    value: V::shape,
                })
            }

            fn zero() -> Self {
                $map::new()
            }

            fn type_shape(&self) -> &'static TypeShape {
                Self::shape()
            }

            fn is_deep_zero(&self) -> bool {
                self.is_empty()
            }

            fn populate(
                &mut self,
                driver: &Driver<'_>,
                path: &FieldPath,
            ) -> Result<(), TagfigError> {
                let cx = EncodeCx::new(driver.schema());
                for (key, value) in self.iter_mut() {
                    value.populate(driver, &path.child(key_text(key, &cx)?))?;
                }
                Ok(())
            }

            fn set_text(
                &mut self,
                text: &str,
                driver: &Driver<'_>,
                path: &FieldPath,
            ) -> Result<(), TagfigError> {
                *self = collection::map_from_csv(text, driver, path)?;
                Ok(())
            }

            fn to_node(&self, cx: &EncodeCx<'_>) -> Result<Node, TagfigError> {
                let mut entries = Vec::with_capacity(self.len());
                for (key, value) in self.iter() {
                    entries.push((key_text(key, cx)?, value.to_node(cx)?));
                }
                if $sort {
                    entries.sort_by(|a, b| a.0.cmp(&b.0));
                }
                Ok(Node::Object(entries.into_iter().collect()))
            }

            fn from_node(
                &mut self,
                node: &Node,
                cx: &mut DecodeCx<'_>,
                path: &FieldPath,
            ) -> Result<(), TagfigError> {
                let object = match node {
                    Node::Object(object) => object,
                    Node::String(text) => return self.set_text(text, &cx.driver(), path),
                    Node::Null => {
                        self.clear();
                        return Ok(());
                    }
                    other => return Err(type_mismatch(path, "a table", other)),
                };
                let key_shape = K::shape();
                if !key_shape.is_key() {
                    return Err(TagfigError::UnsupportedKeyType {
                        path: path.to_string(),
                        type_name: key_shape.describe(),
                    });
                }
                for (text, item) in object {
                    let child = path.child(text.as_str());
                    let mut key = K::zero();
                    key.set_text(text, &cx.driver(), &child)?;
                    match self.get_mut(&key) {
                        Some(existing) => existing.from_node(item, cx, &child)?,
                        None => {
                            let mut value = V::zero();
                            value.from_node(item, cx, &child)?;
                            self.insert(key, value);
                        }
                    }
                }
                Ok(())
            }
        }
    };
}

reflect_map!(HashMap, [Eq + Hash], sort_keys = true);
reflect_map!(BTreeMap, [Ord], sort_keys = false);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagSchema;

    #[test]
    fn option_materializes_to_some() {
        let schema = TagSchema::default();
        let value = <Option<Option<u8>>>::materialize(&Driver::new(&schema), &FieldPath::root())
            .unwrap();
        assert_eq!(value, Some(Some(0)));
    }

    #[test]
    fn option_zero_tracks_target() {
        assert!(None::<u8>.is_deep_zero());
        assert!(Some(0u8).is_deep_zero());
        assert!(!Some(3u8).is_deep_zero());
    }

    #[test]
    fn option_set_text_allocates() {
        let schema = TagSchema::default();
        let mut value: Option<Vec<String>> = None;
        value
            .set_text("a,b", &Driver::new(&schema), &FieldPath::root())
            .unwrap();
        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn box_shares_target_shape() {
        assert!(std::ptr::eq(<Box<u32>>::shape(), u32::shape()));
    }

    #[test]
    fn hash_map_encodes_sorted_keys() {
        let schema = TagSchema::default();
        let map: HashMap<String, u8> =
            [("b".to_string(), 2), ("a".to_string(), 1), ("c".to_string(), 3)]
                .into_iter()
                .collect();
        let node = map.to_node(&EncodeCx::new(&schema)).unwrap();
        let keys: Vec<_> = node.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn map_decode_parses_integer_keys() {
        let schema = TagSchema::default();
        let mut cx = DecodeCx::new(&schema, false);
        let mut map: BTreeMap<i32, String> = BTreeMap::new();
        map.from_node(&serde_json::json!({"2": "two", "10": "ten"}), &mut cx, &FieldPath::root())
            .unwrap();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [2, 10]);
    }

    #[test]
    fn sequence_decode_accepts_comma_text() {
        let schema = TagSchema::default();
        let mut cx = DecodeCx::new(&schema, false);
        let mut ports: Vec<u16> = Vec::new();
        ports
            .from_node(&Node::String("80,443".into()), &mut cx, &FieldPath::root())
            .unwrap();
        assert_eq!(ports, [80, 443]);
    }
}
