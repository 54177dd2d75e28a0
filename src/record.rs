//! Raw predicate → values records
//!
//! A [`RawRecord`] holds everything retrieved for one subject, keyed by
//! predicate IRI (or synthetic slot name, see [`crate::vocab::slot`]). Values
//! keep retrieval order and duplicates. A predicate with no values is simply
//! absent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    values: BTreeMap<String, Vec<String>>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value to a predicate
    pub fn push(&mut self, predicate: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(predicate.into())
            .or_default()
            .push(value.into());
    }

    /// Append values to a predicate. An empty list leaves the record unchanged.
    pub fn extend<I, S>(&mut self, predicate: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = values.into_iter().map(Into::into).peekable();
        if values.peek().is_none() {
            return;
        }
        self.values
            .entry(predicate.to_string())
            .or_default()
            .extend(values);
    }

    /// Values of a predicate, empty when absent
    pub fn get(&self, predicate: &str) -> &[String] {
        self.values
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn first(&self, predicate: &str) -> Option<&str> {
        self.get(predicate).first().map(String::as_str)
    }

    pub fn contains(&self, predicate: &str) -> bool {
        self.values.contains_key(predicate)
    }

    pub fn remove(&mut self, predicate: &str) -> Option<Vec<String>> {
        self.values.remove(predicate)
    }

    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<P, V> FromIterator<(P, V)> for RawRecord
where
    P: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (P, V)>>(iter: T) -> Self {
        let mut record = RawRecord::new();
        for (predicate, value) in iter {
            record.push(predicate, value);
        }
        record
    }
}

/// Merge records predicate-wise by concatenation.
///
/// Values keep their order (records in argument order, values in record
/// order); nothing is deduplicated.
pub fn merge<I>(records: I) -> RawRecord
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut merged = RawRecord::new();
    for record in records {
        for (predicate, values) in record.values {
            merged.values.entry(predicate).or_default().extend(values);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_concatenates_in_order() {
        let a: RawRecord = [("p", "a")].into_iter().collect();
        let b: RawRecord = [("p", "b")].into_iter().collect();

        let merged = merge([a, b]);
        assert_eq!(merged.get("p"), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_merge_keeps_duplicates_and_disjoint_predicates() {
        let a: RawRecord = [("p", "x"), ("q", "1")].into_iter().collect();
        let b: RawRecord = [("p", "x"), ("r", "2")].into_iter().collect();

        let merged = merge([a, b]);
        assert_eq!(merged.get("p"), ["x".to_string(), "x".to_string()]);
        assert_eq!(merged.get("q"), ["1".to_string()]);
        assert_eq!(merged.get("r"), ["2".to_string()]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        assert!(merge(Vec::new()).is_empty());
    }

    #[test]
    fn test_absent_predicate_reads_as_empty() {
        let mut record = RawRecord::new();
        assert!(record.get("p").is_empty());
        record.extend("p", Vec::<String>::new());
        assert!(!record.contains("p"));
        record.extend("p", ["v"]);
        assert_eq!(record.first("p"), Some("v"));
    }
}
