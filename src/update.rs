//! Update operations
//!
//! Narrow patches re-deriving one field group of an already indexed
//! document. Every operation fetches the current document by id, applies
//! its transformation and returns `Some(document)` for re-submission, or
//! `None` when the document needs no change. Applying an operation twice in
//! a row gives the same document as applying it once.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::builder::{filter_alt_labels, set_ocr_variants, wikidata_id};
use crate::document::Document;
use crate::error::{AuxiliaryServiceError, IndexerError};
use crate::last_name::get_last_part;
use crate::normalize::{normalize_consonants, tokenize_sentences};
use crate::services::{round3, TopicService, VectorService};
use crate::solr::DocumentIndex;

/// Persons without a `dbo_type` need at least this classifier score
pub const PERSON_SCORE_THRESHOLD: f64 = 0.75;
/// Sentences of the abstract that feed `abstract_norm`
const ABSTRACT_SENTENCES: usize = 5;
const MAX_ABSTRACT_TOKENS: usize = 15;
/// `abstract_token` entries are longer than this
const ABSTRACT_TOKEN_MIN_EXCLUSIVE: usize = 5;
/// Tokens sent to the vector service are at least this long
const VECTOR_TOKEN_MIN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateAction {
    Ocr,
    Topics,
    LastPart,
    RemoveLastPart,
    NormalizeConsonants,
    Abstract,
    AbstractTokens,
    Vectors,
    VectorsBin,
    RemoveVectorsBin,
}

impl UpdateAction {
    pub const ALL: &'static [UpdateAction] = &[
        UpdateAction::Ocr,
        UpdateAction::Topics,
        UpdateAction::LastPart,
        UpdateAction::RemoveLastPart,
        UpdateAction::NormalizeConsonants,
        UpdateAction::Abstract,
        UpdateAction::AbstractTokens,
        UpdateAction::Vectors,
        UpdateAction::VectorsBin,
        UpdateAction::RemoveVectorsBin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateAction::Ocr => "ocr",
            UpdateAction::Topics => "topics",
            UpdateAction::LastPart => "last-part",
            UpdateAction::RemoveLastPart => "remove-last-part",
            UpdateAction::NormalizeConsonants => "normalize-consonants",
            UpdateAction::Abstract => "abstract",
            UpdateAction::AbstractTokens => "abstract-tokens",
            UpdateAction::Vectors => "vectors",
            UpdateAction::VectorsBin => "vectors-bin",
            UpdateAction::RemoveVectorsBin => "remove-vectors-bin",
        }
    }
}

impl fmt::Display for UpdateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UpdateAction::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown update action '{s}'"))
    }
}

/// Applies update operations against the index
pub struct Updater {
    index: Arc<dyn DocumentIndex>,
    topics: Option<Arc<dyn TopicService>>,
    vectors: Option<Arc<dyn VectorService>>,
    unwanted_tokens: HashSet<String>,
}

impl Updater {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self {
            index,
            topics: None,
            vectors: None,
            unwanted_tokens: HashSet::new(),
        }
    }

    pub fn with_topics(mut self, service: Arc<dyn TopicService>) -> Self {
        self.topics = Some(service);
        self
    }

    pub fn with_vectors(
        mut self,
        service: Arc<dyn VectorService>,
        unwanted_tokens: impl IntoIterator<Item = String>,
    ) -> Self {
        self.vectors = Some(service);
        self.unwanted_tokens = unwanted_tokens.into_iter().collect();
        self
    }

    /// Fetch the document `id` and apply `action` to it
    pub async fn apply(
        &self,
        action: UpdateAction,
        id: &str,
    ) -> Result<Option<Document>, IndexerError> {
        let mut doc = self.index.get_document(id).await?;
        debug!(id, %action, "applying update");

        let changed = match action {
            UpdateAction::Ocr => {
                set_ocr_variants(&mut doc);
                true
            }
            UpdateAction::Topics => {
                let service = required(&self.topics, "topics")?;
                service.scores(id).await?.apply(&mut doc);
                true
            }
            UpdateAction::LastPart => add_last_part(&mut doc),
            UpdateAction::RemoveLastPart => remove_last_part(&mut doc),
            UpdateAction::NormalizeConsonants => {
                normalize_label_consonants(&mut doc);
                true
            }
            UpdateAction::Abstract => {
                default_abstract(&mut doc);
                true
            }
            UpdateAction::AbstractTokens => abstract_tokens(&mut doc),
            UpdateAction::Vectors => {
                self.attach_vectors(&mut doc, VectorEncoding::Json).await?;
                true
            }
            UpdateAction::VectorsBin => {
                self.attach_vectors(&mut doc, VectorEncoding::Binary).await?;
                true
            }
            UpdateAction::RemoveVectorsBin => {
                remove_vectors_bin(&mut doc);
                true
            }
        };

        Ok(changed.then_some(doc))
    }

    async fn attach_vectors(
        &self,
        doc: &mut Document,
        encoding: VectorEncoding,
    ) -> Result<(), IndexerError> {
        let service = required(&self.vectors, "vectors")?;

        let qid = doc.get_str("uri_wd").and_then(wikidata_id).map(str::to_string);
        if let Some(qid) = qid {
            if let Some(vector) = service.vectors(&qid).await?.first() {
                doc.set(encoding.field("vector"), encoding.encode(vector));
            }
        }

        let tokens = vector_tokens(doc, &self.unwanted_tokens);
        if !tokens.is_empty() {
            let vectors = service.vectors(&tokens.join(" ")).await?;
            if !vectors.is_empty() {
                let encoded: Vec<String> = vectors.iter().map(|v| encoding.encode(v)).collect();
                doc.set(encoding.field("abstract_vector"), encoded);
            }
        }
        Ok(())
    }
}

fn required<'a, T: ?Sized>(
    service: &'a Option<Arc<T>>,
    name: &'static str,
) -> Result<&'a Arc<T>, AuxiliaryServiceError> {
    service
        .as_ref()
        .ok_or_else(|| AuxiliaryServiceError::new(name, "service not configured"))
}

#[derive(Debug, Clone, Copy)]
enum VectorEncoding {
    /// JSON list of floats rounded to three decimals
    Json,
    /// Base64 of big-endian IEEE-754 doubles
    Binary,
}

impl VectorEncoding {
    fn field(&self, base: &str) -> String {
        match self {
            VectorEncoding::Json => base.to_string(),
            VectorEncoding::Binary => format!("{base}_bin"),
        }
    }

    fn encode(&self, vector: &[f64]) -> String {
        match self {
            VectorEncoding::Json => encode_vector_json(vector),
            VectorEncoding::Binary => encode_vector_bin(vector),
        }
    }
}

pub fn encode_vector_json(vector: &[f64]) -> String {
    let rounded: Vec<f64> = vector.iter().map(|&f| round3(f)).collect();
    serde_json::Value::from(rounded).to_string()
}

pub fn encode_vector_bin(vector: &[f64]) -> String {
    let bytes: Vec<u8> = vector.iter().flat_map(|f| f.to_be_bytes()).collect();
    BASE64.encode(bytes)
}

/// Abstract and keyword tokens worth a vector lookup: not part of the
/// preferred label, not unwanted, long enough, each once
fn vector_tokens(doc: &Document, unwanted: &HashSet<String>) -> Vec<String> {
    let label_words: HashSet<&str> = doc
        .get_str("pref_label")
        .map(|label| label.split_whitespace().collect())
        .unwrap_or_default();

    let candidates = ["abstract_token", "keyword"]
        .into_iter()
        .filter_map(|field| doc.get_list(field))
        .flatten();

    let mut tokens: Vec<String> = Vec::new();
    for token in candidates {
        if token.chars().count() >= VECTOR_TOKEN_MIN
            && !label_words.contains(token.as_str())
            && !unwanted.contains(token)
            && !tokens.contains(token)
        {
            tokens.push(token.clone());
        }
    }
    tokens
}

/// Add `last_part` to a document likely describing a person. Returns
/// whether the document changed.
pub fn add_last_part(doc: &mut Document) -> bool {
    if doc.contains("last_part") {
        return false;
    }

    let is_person = match doc.get_list("dbo_type") {
        Some(types) => types.iter().any(|t| t == "Person"),
        None => doc
            .get_f64("dbo_type_person")
            .is_some_and(|score| score >= PERSON_SCORE_THRESHOLD),
    };
    if !is_person {
        return false;
    }

    let Some(last_part) = doc
        .get_str("pref_label")
        .and_then(|label| get_last_part(label, true))
    else {
        return false;
    };
    doc.set_with_str("last_part", last_part);
    set_ocr_variants(doc);
    true
}

/// Drop the last-name fields of a document typed as something other than a
/// person. Returns whether the document changed.
pub fn remove_last_part(doc: &mut Document) -> bool {
    let typed_non_person = doc
        .get_list("dbo_type")
        .is_some_and(|types| !types.iter().any(|t| t == "Person"));
    if !doc.contains("last_part") || !typed_non_person {
        return false;
    }

    doc.remove_with_str("last_part");
    doc.remove_with_str("last_name");
    doc.remove("last_part_ocr");
    doc.remove("last_part_str_ocr");
    true
}

/// Collapse doubled trailing consonants in every label field and refresh
/// the OCR variants.
///
/// Folded alternative labels go through the alt-label filter again, since
/// folding can make them equal `pref_label` or each other. A list left
/// empty is removed together with its copies.
pub fn normalize_label_consonants(doc: &mut Document) {
    for field in ["pref_label", "last_part"] {
        if let Some(value) = doc.get_str(field) {
            let value = normalize_consonants(value);
            doc.set_with_str(field, value);
        }
    }
    let pref_label = doc.get_str("pref_label").unwrap_or_default().to_string();
    for field in ["alt_label", "wd_alt_label"] {
        let Some(values) = doc.get_list(field) else {
            continue;
        };
        let folded = values.iter().map(|v| normalize_consonants(v));
        let values = filter_alt_labels(&pref_label, folded);
        if values.is_empty() {
            doc.remove_with_str(field);
            doc.remove(&format!("{field}_ocr"));
            doc.remove(&format!("{field}_str_ocr"));
        } else {
            doc.set_with_str(field, values);
        }
    }
    set_ocr_variants(doc);
}

pub fn default_abstract(doc: &mut Document) {
    if !doc.contains("abstract") {
        doc.set("abstract", ".");
    }
}

/// Derive `abstract_norm` and `abstract_token` from the abstract. Returns
/// whether the document has an abstract.
pub fn abstract_tokens(doc: &mut Document) -> bool {
    let Some(text) = doc.get_str("abstract") else {
        return false;
    };
    let bow = tokenize_sentences(text, ABSTRACT_SENTENCES);

    let mut tokens: Vec<String> = Vec::new();
    for token in &bow {
        if tokens.len() == MAX_ABSTRACT_TOKENS {
            break;
        }
        if token.chars().count() > ABSTRACT_TOKEN_MIN_EXCLUSIVE && !tokens.contains(token) {
            tokens.push(token.clone());
        }
    }

    doc.set("abstract_norm", bow.join(" "));
    doc.set("abstract_token", tokens);
    true
}

pub fn remove_vectors_bin(doc: &mut Document) {
    doc.remove("vector_bin");
    doc.remove("abstract_vector_bin");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(pairs: &[(&str, &str)]) -> Document {
        let mut doc = Document::new();
        for (field, value) in pairs {
            doc.set(*field, *value);
        }
        doc
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in UpdateAction::ALL {
            assert_eq!(action.as_str().parse::<UpdateAction>(), Ok(*action));
        }
        assert!("rebuild".parse::<UpdateAction>().is_err());
    }

    #[test]
    fn test_add_last_part_by_score() {
        let mut d = doc(&[("pref_label", "johan van der berg")]);
        d.set("dbo_type_person", 0.8);
        assert!(add_last_part(&mut d));
        assert_eq!(d.get_str("last_part_str"), Some("van der berg"));
        assert_eq!(d.get_str("last_part_str_ocr"), Some("van der berg"));
        assert!(!add_last_part(&mut d));

        let mut low = doc(&[("pref_label", "johan van der berg")]);
        low.set("dbo_type_person", 0.5);
        assert!(!add_last_part(&mut low));
    }

    #[test]
    fn test_add_last_part_respects_types() {
        let mut place = doc(&[("pref_label", "bergen op zoom")]);
        place.set("dbo_type", vec!["Place".to_string()]);
        place.set("dbo_type_person", 0.9);
        assert!(!add_last_part(&mut place));
    }

    #[test]
    fn test_remove_last_part() {
        let mut d = doc(&[("pref_label", "bergen op zoom")]);
        d.set_with_str("last_part", "zoom");
        d.set("dbo_type", vec!["Place".to_string()]);
        set_ocr_variants(&mut d);

        assert!(remove_last_part(&mut d));
        assert!(!d.contains("last_part"));
        assert!(!d.contains("last_part_str_ocr"));
        assert!(!remove_last_part(&mut d));
    }

    #[test]
    fn test_normalize_consonants_idempotent() {
        let mut d = doc(&[("pref_label", "bob ross")]);
        d.set_with_str("alt_label", vec!["robert norman ross".to_string()]);

        normalize_label_consonants(&mut d);
        let once = d.clone();
        normalize_label_consonants(&mut d);

        assert_eq!(d, once);
        assert_eq!(d.get_str("pref_label_str"), Some("bob ros"));
        assert_eq!(d.get_str("pref_label_ocr"), Some("bob ros"));
        assert_eq!(
            d.get_list("alt_label").map(|l| l[0].as_str()),
            Some("robert norman ros")
        );
    }

    #[test]
    fn test_folded_alt_labels_are_filtered_again() {
        let mut d = doc(&[("pref_label", "jan smit")]);
        d.set_with_str(
            "alt_label",
            vec!["jan smitt".to_string(), "jan smittt".to_string()],
        );
        set_ocr_variants(&mut d);

        normalize_label_consonants(&mut d);

        assert_eq!(d.get_str("pref_label"), Some("jan smit"));
        assert!(!d.contains("alt_label"));
        assert!(!d.contains("alt_label_str"));
        assert!(!d.contains("alt_label_ocr"));
        assert!(!d.contains("alt_label_str_ocr"));

        let mut d = doc(&[("pref_label", "jan smit")]);
        d.set_with_str(
            "wd_alt_label",
            vec![
                "johannes smitt".to_string(),
                "jan smitt".to_string(),
                "johannes smittt".to_string(),
            ],
        );

        normalize_label_consonants(&mut d);
        let expected = vec!["johannes smit".to_string()];
        assert_eq!(d.get_list("wd_alt_label"), Some(&expected[..]));
        assert_eq!(d.get_list("wd_alt_label_str"), Some(&expected[..]));
    }

    #[test]
    fn test_abstract_tokens() {
        let mut d = doc(&[(
            "abstract",
            "Augusta Ada King was an English mathematician. She worked on Babbage's engine! \
             Her notes matter. A. B. C. Mathematician again.",
        )]);
        assert!(abstract_tokens(&mut d));

        let tokens = d.get_list("abstract_token").unwrap().to_vec();
        assert!(tokens.contains(&"augusta".to_string()));
        assert!(tokens.contains(&"mathematician".to_string()));
        assert!(!tokens.contains(&"again".to_string()));
        assert_eq!(tokens.iter().filter(|t| *t == "mathematician").count(), 1);

        assert!(!abstract_tokens(&mut Document::new()));
    }

    #[test]
    fn test_default_abstract() {
        let mut d = Document::new();
        default_abstract(&mut d);
        assert_eq!(d.get_str("abstract"), Some("."));

        let mut d = doc(&[("abstract", "Text.")]);
        default_abstract(&mut d);
        assert_eq!(d.get_str("abstract"), Some("Text."));
    }

    #[test]
    fn test_vector_encodings() {
        assert_eq!(encode_vector_json(&[0.12345, 1.0, -2.5]), "[0.123,1.0,-2.5]");
        assert_eq!(encode_vector_bin(&[1.0]), "P/AAAAAAAAA=");
    }

    #[test]
    fn test_vector_tokens() {
        let mut d = doc(&[("pref_label", "ada lovelace")]);
        d.set(
            "abstract_token",
            vec!["lovelace".to_string(), "mathematician".to_string(), "poetry".to_string()],
        );
        d.set("keyword", vec!["mathematician".to_string(), "women".to_string()]);

        let unwanted: HashSet<String> = ["poetry".to_string()].into_iter().collect();
        assert_eq!(
            vector_tokens(&d, &unwanted),
            vec!["mathematician".to_string(), "women".to_string()]
        );
    }
}
