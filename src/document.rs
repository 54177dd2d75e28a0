//! Search-index documents
//!
//! A [`Document`] is the flat field map submitted to Solr. Field values are
//! strings, integers, floats or string lists; anything else a fetched
//! document carries is kept verbatim so it survives a fetch/re-submit cycle.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Suffix of the un-analyzed copy of a field
pub const STR_SUFFIX: &str = "_str";
/// Suffix of the OCR-tolerant copy of a field
pub const OCR_SUFFIX: &str = "_ocr";
/// Index-internal optimistic-locking field, removed before re-submission
pub const VERSION_FIELD: &str = "_version_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
    Other(Value),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value, integers included
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Set a field and its `_str` companion to the same value
    pub fn set_with_str(&mut self, field: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        self.fields
            .insert(format!("{field}{STR_SUFFIX}"), value.clone());
        self.fields.insert(field.to_string(), value);
    }

    /// Remove a field and its `_str` companion
    pub fn remove_with_str(&mut self, field: &str) {
        self.fields.remove(field);
        self.fields.remove(&format!("{field}{STR_SUFFIX}"));
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    pub fn get_list(&self, field: &str) -> Option<&[String]> {
        self.get(field).and_then(FieldValue::as_list)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(FieldValue::as_i64)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_f64)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_companion() {
        let mut doc = Document::new();
        doc.set_with_str("pref_label", "ada lovelace");
        assert_eq!(doc.get_str("pref_label"), doc.get_str("pref_label_str"));

        doc.remove_with_str("pref_label");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_deserialize_solr_document() {
        let doc: Document = serde_json::from_str(
            r#"{"id": "http://dbpedia.org/resource/Ada_Lovelace",
                "ambig": 0,
                "dbo_type_person": 0.93,
                "alt_label": ["ada king"],
                "_version_": 1612345678901234567,
                "flags": [1, 2]}"#,
        )
        .unwrap();

        assert_eq!(doc.id(), Some("http://dbpedia.org/resource/Ada_Lovelace"));
        assert_eq!(doc.get_i64("ambig"), Some(0));
        assert_eq!(doc.get_f64("dbo_type_person"), Some(0.93));
        assert_eq!(doc.get_list("alt_label"), Some(&["ada king".to_string()][..]));
        assert!(matches!(doc.get("flags"), Some(FieldValue::Other(_))));
        assert!(doc.contains(VERSION_FIELD));
    }

    #[test]
    fn test_serializes_flat() {
        let mut doc = Document::new();
        doc.set("id", "x");
        doc.set("inlinks", 3i64);
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            serde_json::json!({"id": "x", "inlinks": 3})
        );
    }
}
