//! Core data models used throughout Brand Pipeline.
//!
//! A [`RawRecord`] is whatever arrived from the source file or the document
//! store; a [`CanonicalRecord`] is the normalized brand with exactly four
//! business fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity key of a stored document.
pub const ID_FIELD: &str = "_id";
/// Creation timestamp stamped by the store.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Last-update timestamp stamped by the store.
pub const UPDATED_AT_FIELD: &str = "updatedAt";
/// Schema version key carried by seeded documents.
pub const VERSION_FIELD: &str = "__v";

/// Keys a canonical stored document may carry. Anything else is legacy.
pub const ALLOWED_FIELDS: [&str; 8] = [
    ID_FIELD,
    "brandName",
    "yearFounded",
    "headquarters",
    "numberOfLocations",
    CREATED_AT_FIELD,
    UPDATED_AT_FIELD,
    VERSION_FIELD,
];

/// Display identity used when a record has no usable `_id`.
pub const UNIDENTIFIED: &str = "<unidentified>";

/// One loosely-typed input document.
///
/// No invariants: any field may be absent, null, wrongly typed, or named
/// differently from one source to the next.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build a record from a JSON value. Returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// The record identity, if `_id` holds something usable.
    ///
    /// Strings are taken as-is, MongoDB extended JSON `{"$oid": "..."}` is
    /// flattened to its hex string, and numbers are rendered in decimal.
    pub fn identity(&self) -> Option<String> {
        match self.0.get(ID_FIELD)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(obj) => match obj.get("$oid") {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                _ => None,
            },
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Identity for log lines; never empty.
    pub fn display_id(&self) -> String {
        self.identity().unwrap_or_else(|| UNIDENTIFIED.to_string())
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The four business fields of a canonical brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalField {
    BrandName,
    YearFounded,
    Headquarters,
    NumberOfLocations,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 4] = [
        CanonicalField::BrandName,
        CanonicalField::YearFounded,
        CanonicalField::Headquarters,
        CanonicalField::NumberOfLocations,
    ];

    /// Document key of this field.
    pub fn key(&self) -> &'static str {
        match self {
            CanonicalField::BrandName => "brandName",
            CanonicalField::YearFounded => "yearFounded",
            CanonicalField::Headquarters => "headquarters",
            CanonicalField::NumberOfLocations => "numberOfLocations",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A normalized brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub brand_name: String,
    pub year_founded: i32,
    pub headquarters: String,
    pub number_of_locations: i64,
}

impl CanonicalRecord {
    /// The four fields as a JSON object, ready for an update's `set` part.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            CanonicalField::BrandName.key().to_string(),
            Value::String(self.brand_name.clone()),
        );
        map.insert(
            CanonicalField::YearFounded.key().to_string(),
            Value::from(self.year_founded),
        );
        map.insert(
            CanonicalField::Headquarters.key().to_string(),
            Value::String(self.headquarters.clone()),
        );
        map.insert(
            CanonicalField::NumberOfLocations.key().to_string(),
            Value::from(self.number_of_locations),
        );
        map
    }

    /// A fresh document for this brand, as a model save would produce it.
    pub fn to_document(&self) -> RawRecord {
        let mut map = self.to_fields();
        map.insert(VERSION_FIELD.to_string(), Value::from(0));
        RawRecord(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        RawRecord::from_value(value).unwrap()
    }

    #[test]
    fn identity_from_string() {
        assert_eq!(record(json!({"_id": "abc"})).identity().as_deref(), Some("abc"));
    }

    #[test]
    fn identity_from_extended_json() {
        let r = record(json!({"_id": {"$oid": "64f1c0ffee"}}));
        assert_eq!(r.identity().as_deref(), Some("64f1c0ffee"));
    }

    #[test]
    fn identity_from_number() {
        assert_eq!(record(json!({"_id": 42})).identity().as_deref(), Some("42"));
    }

    #[test]
    fn missing_identity_has_placeholder() {
        let r = record(json!({"brandName": "X"}));
        assert_eq!(r.identity(), None);
        assert_eq!(r.display_id(), UNIDENTIFIED);
    }

    #[test]
    fn canonical_serializes_camel_case() {
        let c = CanonicalRecord {
            brand_name: "Acme".into(),
            year_founded: 1901,
            headquarters: "Springfield".into(),
            number_of_locations: 3,
        };
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(
            v,
            json!({
                "brandName": "Acme",
                "yearFounded": 1901,
                "headquarters": "Springfield",
                "numberOfLocations": 3
            })
        );
        assert_eq!(Value::Object(c.to_fields()), v);
    }

    #[test]
    fn document_carries_version() {
        let c = CanonicalRecord {
            brand_name: "Acme".into(),
            year_founded: 1901,
            headquarters: "Springfield".into(),
            number_of_locations: 3,
        };
        assert_eq!(c.to_document().get(VERSION_FIELD), Some(&json!(0)));
    }
}
