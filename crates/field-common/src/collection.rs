//! Collections of fields keyed by name.

use std::collections::BTreeMap;

use crate::error::{FieldError, FieldResult};
use crate::field::Field;

/// The set of fields produced for one forecast lead time.
///
/// Names are unique; inserting a field with an existing name replaces it.
/// Iteration is in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldCollection {
    fields: BTreeMap<String, Field>,
}

impl FieldCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning any field it replaced.
    pub fn insert(&mut self, field: Field) -> Option<Field> {
        self.fields.insert(field.name().to_string(), field)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Look up a field by name, failing with `FieldNotFound`.
    pub fn extract(&self, name: &str) -> FieldResult<&Field> {
        self.get(name)
            .ok_or_else(|| FieldError::FieldNotFound(name.to_string()))
    }

    pub fn remove(&mut self, name: &str) -> Option<Field> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<Field> for FieldCollection {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut collection = Self::new();
        for field in iter {
            collection.insert(field);
        }
        collection
    }
}

impl IntoIterator for FieldCollection {
    type Item = Field;
    type IntoIter = std::collections::btree_map::IntoValues<String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    fn scalar(name: &str, value: f32) -> Field {
        Field::new(name, ArrayD::from_elem(IxDyn(&[]), value), vec![]).unwrap()
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut fields = FieldCollection::new();
        assert!(fields.insert(scalar("a", 1.0)).is_none());
        let old = fields.insert(scalar("a", 2.0)).unwrap();

        assert_eq!(old.data()[IxDyn(&[])], 1.0);
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_extract_missing() {
        let fields: FieldCollection = vec![scalar("b", 0.0), scalar("a", 0.0)].into_iter().collect();
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(matches!(
            fields.extract("c"),
            Err(FieldError::FieldNotFound(name)) if name == "c"
        ));
    }
}
