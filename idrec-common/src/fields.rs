//! Identity document field schema
//!
//! Every extractor result is validated into a [`FieldMapping`] keyed by the
//! closed [`FieldName`] enumeration. Untyped JSON only enters through
//! [`FieldMapping::from_json`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Known identity document fields
///
/// Declaration order is the order fields are listed in prompts and
/// serialized in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    IssuingCountry,
    Authority,
    CardType,
    FullName,
    Surname,
    Sex,
    DateOfBirth,
    Age,
    Nationality,
    IdNumber,
    IssuingDate,
    ExpiryDate,
    SignaturePresent,
}

impl FieldName {
    /// All schema fields in declaration order
    pub const ALL: [FieldName; 13] = [
        FieldName::IssuingCountry,
        FieldName::Authority,
        FieldName::CardType,
        FieldName::FullName,
        FieldName::Surname,
        FieldName::Sex,
        FieldName::DateOfBirth,
        FieldName::Age,
        FieldName::Nationality,
        FieldName::IdNumber,
        FieldName::IssuingDate,
        FieldName::ExpiryDate,
        FieldName::SignaturePresent,
    ];

    /// Fields compared as calendar dates rather than strings
    pub const DATE_FIELDS: [FieldName; 3] = [
        FieldName::DateOfBirth,
        FieldName::IssuingDate,
        FieldName::ExpiryDate,
    ];

    /// Wire name (snake_case)
    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::IssuingCountry => "issuing_country",
            FieldName::Authority => "authority",
            FieldName::CardType => "card_type",
            FieldName::FullName => "full_name",
            FieldName::Surname => "surname",
            FieldName::Sex => "sex",
            FieldName::DateOfBirth => "date_of_birth",
            FieldName::Age => "age",
            FieldName::Nationality => "nationality",
            FieldName::IdNumber => "id_number",
            FieldName::IssuingDate => "issuing_date",
            FieldName::ExpiryDate => "expiry_date",
            FieldName::SignaturePresent => "signature_present",
        }
    }

    /// Look up a field by wire name
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.as_str() == key)
    }

    /// Whether the field uses date-aware comparison
    pub fn is_date(self) -> bool {
        matches!(
            self,
            FieldName::DateOfBirth | FieldName::IssuingDate | FieldName::ExpiryDate
        )
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar value extracted for a field
///
/// Absence (JSON `null` or a missing key) is modelled as `Option::None`
/// around this type, never as a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl FieldValue {
    /// Build a text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Comparison form: string form, lowercased, surrounding whitespace removed
    pub fn normalized(&self) -> String {
        self.to_string().trim().to_lowercase()
    }
}

/// String form: text as-is, numbers in JSON notation, booleans as `true`/`false`
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

/// Errors raised when untyped JSON cannot be read as a field mapping
#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    /// Top-level value was not a JSON object
    #[error("expected a JSON object of fields, got {0}")]
    NotAnObject(&'static str),

    /// A field held an array or nested object
    #[error("field '{field}' holds an unsupported {kind} value")]
    UnsupportedValue { field: FieldName, kind: &'static str },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fields extracted from one document
///
/// A key may be missing altogether or present with a `None` value; the
/// reconciler iterates over present keys only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldMapping {
    fields: BTreeMap<FieldName, Option<FieldValue>>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate untrusted JSON into a mapping
    ///
    /// Keys outside the schema are dropped. Arrays and nested objects are
    /// rejected because no schema field can hold them.
    pub fn from_json(value: Value) -> Result<Self, MappingError> {
        let object = match value {
            Value::Object(object) => object,
            other => return Err(MappingError::NotAnObject(json_kind(&other))),
        };

        let mut mapping = FieldMapping::new();
        for (key, raw) in object {
            let Some(field) = FieldName::from_key(&key) else {
                tracing::debug!(key = %key, "Ignoring field outside the identity schema");
                continue;
            };

            let value = match raw {
                Value::Null => None,
                Value::Bool(b) => Some(FieldValue::Bool(b)),
                Value::Number(n) => Some(FieldValue::Number(n)),
                Value::String(s) => Some(FieldValue::Text(s)),
                other => {
                    return Err(MappingError::UnsupportedValue {
                        field,
                        kind: json_kind(&other),
                    })
                }
            };
            mapping.fields.insert(field, value);
        }

        Ok(mapping)
    }

    /// Set a field (a `None` value records the key as present but null)
    pub fn insert(&mut self, field: FieldName, value: Option<FieldValue>) {
        self.fields.insert(field, value);
    }

    /// Builder-style [`insert`](Self::insert) of a non-null value
    pub fn with(mut self, field: FieldName, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field, Some(value.into()));
        self
    }

    /// Whether the key is present (null or not)
    pub fn contains(&self, field: FieldName) -> bool {
        self.fields.contains_key(&field)
    }

    /// Value of a field; `None` when missing or null
    pub fn value(&self, field: FieldName) -> Option<&FieldValue> {
        self.fields.get(&field).and_then(Option::as_ref)
    }

    /// Present keys in schema order
    pub fn keys(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, Option<&FieldValue>)> {
        self.fields.iter().map(|(name, value)| (*name, value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(FieldName, Option<FieldValue>)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (FieldName, Option<FieldValue>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for FieldMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        FieldMapping::from_json(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names_round_trip() {
        for field in FieldName::ALL {
            assert_eq!(FieldName::from_key(field.as_str()), Some(field));
            let serialized = serde_json::to_value(field).unwrap();
            assert_eq!(serialized, json!(field.as_str()));
        }
        assert_eq!(FieldName::from_key("eye_colour"), None);
    }

    #[test]
    fn test_date_fields_fixed() {
        let dates: Vec<_> = FieldName::ALL.into_iter().filter(|f| f.is_date()).collect();
        assert_eq!(dates, FieldName::DATE_FIELDS.to_vec());
    }

    #[test]
    fn test_from_json_keeps_nulls_and_drops_unknown_keys() {
        let mapping = FieldMapping::from_json(json!({
            "full_name": "Jane Roe",
            "age": 41,
            "signature_present": true,
            "surname": null,
            "hair_colour": "brown"
        }))
        .unwrap();

        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping.value(FieldName::FullName), Some(&FieldValue::text("Jane Roe")));
        assert_eq!(mapping.value(FieldName::Age), Some(&FieldValue::from(41)));
        assert!(mapping.contains(FieldName::Surname));
        assert_eq!(mapping.value(FieldName::Surname), None);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = FieldMapping::from_json(json!(["full_name"])).unwrap_err();
        assert_eq!(err, MappingError::NotAnObject("array"));
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        let err = FieldMapping::from_json(json!({"full_name": {"first": "Jane"}})).unwrap_err();
        assert_eq!(
            err,
            MappingError::UnsupportedValue {
                field: FieldName::FullName,
                kind: "object"
            }
        );
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut mapping = FieldMapping::new().with(FieldName::Sex, "F");
        mapping.insert(FieldName::IdNumber, None);

        let value = serde_json::to_value(&mapping).unwrap();
        assert_eq!(value, json!({"sex": "F", "id_number": null}));
    }

    #[test]
    fn test_string_form_and_normalization() {
        assert_eq!(FieldValue::from(true).to_string(), "true");
        assert_eq!(FieldValue::from(30).to_string(), "30");
        assert_eq!(FieldValue::text("  John DOE ").normalized(), "john doe");
    }
}
