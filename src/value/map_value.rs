use std::collections::BTreeMap;

use crate::value::{DocstoreValue, ValueKind};

/// An ordered map of field names to values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapValue {
    fields: BTreeMap<String, DocstoreValue>,
}

impl MapValue {
    pub fn new(fields: BTreeMap<String, DocstoreValue>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &BTreeMap<String, DocstoreValue> {
        &self.fields
    }

    /// Looks up a nested value by path segments, descending through child
    /// maps. Returns `None` when any intermediate segment is missing or not a
    /// map.
    pub fn value_at(&self, segments: &[String]) -> Option<&DocstoreValue> {
        let (first, rest) = segments.split_first()?;
        let value = self.fields.get(first)?;
        if rest.is_empty() {
            Some(value)
        } else if let ValueKind::Map(child) = value.kind() {
            child.value_at(rest)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MapValue {
        let mut nested = BTreeMap::new();
        nested.insert("bar".to_string(), DocstoreValue::from_integer(7));
        let mut fields = BTreeMap::new();
        fields.insert("foo".to_string(), DocstoreValue::from_map(nested));
        fields.insert("top".to_string(), DocstoreValue::from_bool(true));
        MapValue::new(fields)
    }

    #[test]
    fn stores_map_entries() {
        let map = sample();
        assert_eq!(
            map.fields().get("top"),
            Some(&DocstoreValue::from_bool(true))
        );
    }

    #[test]
    fn nested_lookup() {
        let map = sample();
        let segments = vec!["foo".to_string(), "bar".to_string()];
        assert_eq!(
            map.value_at(&segments),
            Some(&DocstoreValue::from_integer(7))
        );
    }

    #[test]
    fn lookup_through_non_map_fails() {
        let map = sample();
        let segments = vec!["top".to_string(), "bar".to_string()];
        assert_eq!(map.value_at(&segments), None);
    }
}
