//! Source record type.

use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

/// Name of the field used as the document primary key.
pub const ID_FIELD: &str = "id";

/// One row of the source file: an ordered mapping of field name to value.
///
/// Fields keep the order of the source header. Inserting a field that already
/// exists replaces its value in place, so a record never holds duplicate names.
/// A record is serialized as a JSON object and uploaded to the engine as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(name, value)` pairs, in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.insert(name, value);
        }
        record
    }

    /// Set a field, replacing the existing value if the name is already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// The record identifier, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD).filter(|id| !id.is_empty())
    }

    /// Assign a random v4 UUID as `id` when the record has none.
    ///
    /// Returns `true` if an identifier was generated. Generated identifiers are
    /// not derived from the record content, so two loads of the same row get
    /// different values.
    pub fn ensure_id(&mut self) -> bool {
        if self.id().is_some() {
            return false;
        }
        self.insert(ID_FIELD, Uuid::new_v4().to_string());
        true
    }

    /// Iterate over `(name, value)` pairs in field order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::from_pairs([("item_name", "Aspirin"), ("brand", "ABC")]);
        record.insert("item_name", "Paracetamol");

        let fields: Vec<_> = record.fields().collect();
        assert_eq!(fields, vec![("item_name", "Paracetamol"), ("brand", "ABC")]);
    }

    #[test]
    fn test_ensure_id_generates_when_missing() {
        let mut record = Record::from_pairs([("item_name", "Aspirin")]);

        assert!(record.ensure_id());
        let id = record.id().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(record.fields().last().unwrap().0, ID_FIELD);
    }

    #[test]
    fn test_ensure_id_generates_when_blank() {
        let mut record = Record::from_pairs([("id", ""), ("item_name", "Aspirin")]);

        assert!(record.ensure_id());
        assert!(!record.id().unwrap().is_empty());
        // Blank column is filled, not duplicated
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_ensure_id_keeps_natural_key() {
        let mut record = Record::from_pairs([("id", "SKU-1")]);

        assert!(!record.ensure_id());
        assert_eq!(record.id(), Some("SKU-1"));
    }

    #[test]
    fn test_serializes_in_field_order() {
        let record = Record::from_pairs([("id", "1"), ("item_name", "Aspirin"), ("brand", "ABC")]);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":"1","item_name":"Aspirin","brand":"ABC"}"#);
    }
}
