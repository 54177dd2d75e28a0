//! Document building
//!
//! Derives the flat search document from one merged [`RawRecord`]. Apart from
//! the optional topic and alias lookups the derivation is a pure function of
//! the record and the identifier.
//!
//! | Field | Derived from |
//! |---|---|
//! | `id`, `lang` | identifier and its edition |
//! | `label` | first `rdfs:label` (required) |
//! | `pref_label` | normalized label without qualifier |
//! | `ambig`, `spec` | identifier qualifier |
//! | `alt_label` | other labels, names and redirects |
//! | `keyword` | category links of the primary edition |
//! | `dbo_type`, `schema_type` | `rdf:type` |
//! | `last_part`, `last_name` | `pref_label`, persons only |
//! | `birth_year`, `death_year` | earliest birth and latest death date |
//! | `birth_place`, `death_place` | place resources |
//! | `inlinks`, `outlinks` | link counts |
//! | `abstract`, `uri_wd` | collapsed abstract, Wikidata `owl:sameAs` |
//! | `*_ocr` | OCR-folded label fields |

use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use crate::document::{Document, OCR_SUFFIX, STR_SUFFIX};
use crate::error::{IndexerError, MissingFieldError};
use crate::last_name::get_last_part;
use crate::normalize::{normalize, normalize_ocr};
use crate::record::RawRecord;
use crate::services::{AliasService, TopicService};
use crate::uri::{has_qualifier, strip_qualifier, uri_to_string, Editions, LanguageEdition};
use crate::vocab::{dbo, owl, rdf, rdfs, schema, slot, wikidata};

/// Shortest keyword kept from a category name
const MIN_KEYWORD_LEN: usize = 5;

/// Label fields that carry `_str` and OCR companions
pub const LABEL_FIELDS: &[&str] = &["pref_label", "alt_label", "last_part"];

pub struct DocumentBuilder {
    editions: Editions,
    topics: Option<Arc<dyn TopicService>>,
    aliases: Option<Arc<dyn AliasService>>,
    topics_mandatory: bool,
}

impl DocumentBuilder {
    pub fn new(editions: Editions) -> Self {
        Self {
            editions,
            topics: None,
            aliases: None,
            topics_mandatory: false,
        }
    }

    pub fn with_topics(mut self, service: Arc<dyn TopicService>, mandatory: bool) -> Self {
        self.topics = Some(service);
        self.topics_mandatory = mandatory;
        self
    }

    pub fn with_aliases(mut self, service: Arc<dyn AliasService>) -> Self {
        self.aliases = Some(service);
        self
    }

    /// Build the document for `identifier` from its merged record
    pub async fn transform(
        &self,
        record: &RawRecord,
        identifier: &str,
    ) -> Result<Document, IndexerError> {
        let mut doc = Document::new();
        doc.set("id", identifier);
        doc.set("lang", self.editions.lang_of(identifier));

        let label = record.first(rdfs::LABEL).ok_or_else(|| MissingFieldError {
            identifier: identifier.to_string(),
            predicate: rdfs::LABEL.to_string(),
        })?;
        doc.set("label", label);

        let pref_label = normalize(strip_qualifier(label));
        doc.set_with_str("pref_label", pref_label.as_str());

        if has_qualifier(identifier) {
            doc.set("ambig", 1i64);
            if let Some(qualifier) = uri_to_string(identifier, true) {
                doc.set("spec", normalize(&qualifier));
            }
        } else {
            doc.set("ambig", 0i64);
        }

        if let Some(text) = record.first(slot::ABSTRACT) {
            doc.set("abstract", text);
        }

        let alt_labels = filter_alt_labels(&pref_label, alt_label_candidates(record));
        if !alt_labels.is_empty() {
            doc.set_with_str("alt_label", alt_labels);
        }

        let keywords = self.keywords(record, &pref_label);
        if !keywords.is_empty() {
            doc.set("keyword", keywords);
        }

        let dbo_types = type_segments(record, dbo::NAMESPACE);
        let schema_types = type_segments(record, schema::NAMESPACE);
        let is_person = dbo_types.iter().chain(&schema_types).any(|t| t == "Person");
        if !dbo_types.is_empty() {
            doc.set("dbo_type", dbo_types);
        }
        if !schema_types.is_empty() {
            doc.set("schema_type", schema_types);
        }

        if is_person {
            if let Some(last_part) = get_last_part(&pref_label, true) {
                doc.set_with_str("last_part", last_part.as_str());
                doc.set_with_str("last_name", last_part);
            }
        }

        if let Some(year) = years(record, dbo::BIRTH_DATE).min() {
            doc.set("birth_year", year);
        }
        if let Some(year) = years(record, dbo::DEATH_DATE).max() {
            doc.set("death_year", year);
        }

        let birth_places = self.places(record, dbo::BIRTH_PLACE);
        if !birth_places.is_empty() {
            doc.set("birth_place", birth_places);
        }
        let death_places = self.places(record, dbo::DEATH_PLACE);
        if !death_places.is_empty() {
            doc.set("death_place", death_places);
        }

        doc.set("inlinks", inlinks(record));
        doc.set("outlinks", outlinks(record));

        let wikidata_uri = record
            .get(owl::SAME_AS)
            .iter()
            .find(|uri| uri.starts_with(wikidata::ENTITY_PREFIX));
        if let Some(uri) = wikidata_uri {
            doc.set("uri_wd", uri.as_str());
        }

        set_ocr_variants(&mut doc);

        self.add_topics(&mut doc, identifier).await?;
        if let Some(uri) = wikidata_uri {
            self.add_aliases(&mut doc, identifier, uri, &pref_label).await;
        }

        Ok(doc)
    }

    fn keywords(&self, record: &RawRecord, pref_label: &str) -> Vec<String> {
        let label_words: HashSet<&str> = pref_label.split_whitespace().collect();
        let mut keywords: Vec<String> = Vec::new();

        for link in record.get(dbo::WIKI_PAGE_WIKI_LINK) {
            let Some(category) = self.editions.primary.category_name(link) else {
                continue;
            };
            for word in normalize(&category).split_whitespace() {
                if word.chars().count() >= MIN_KEYWORD_LEN
                    && !label_words.contains(word)
                    && !keywords.iter().any(|k| k == word)
                {
                    keywords.push(word.to_string());
                }
            }
        }
        keywords
    }

    /// Normalized primary-edition places, or secondary-edition places when
    /// the record has no primary ones
    fn places(&self, record: &RawRecord, predicate: &str) -> Vec<String> {
        let values = record.get(predicate);
        let primary = places_in(values, &self.editions.primary);
        if !primary.is_empty() {
            return primary;
        }
        places_in(values, &self.editions.secondary)
    }

    async fn add_topics(&self, doc: &mut Document, identifier: &str) -> Result<(), IndexerError> {
        let Some(service) = &self.topics else {
            return Ok(());
        };
        match service.scores(identifier).await {
            Ok(scores) => scores.apply(doc),
            Err(e) if self.topics_mandatory => return Err(e.into()),
            Err(e) => warn!(identifier, error = %e, "topic scores unavailable"),
        }
        Ok(())
    }

    async fn add_aliases(
        &self,
        doc: &mut Document,
        identifier: &str,
        wikidata_uri: &str,
        pref_label: &str,
    ) {
        let Some(service) = &self.aliases else {
            return;
        };
        let Some(qid) = wikidata_id(wikidata_uri) else {
            return;
        };
        match service.aliases(qid).await {
            Ok(aliases) => {
                let aliases = filter_alt_labels(pref_label, aliases);
                if !aliases.is_empty() {
                    doc.set_with_str("wd_alt_label", aliases);
                }
            }
            Err(e) => warn!(identifier, error = %e, "aliases unavailable"),
        }
    }
}

/// Final segment of a Wikidata entity IRI
pub fn wikidata_id(uri: &str) -> Option<&str> {
    uri.rsplit('/').next().filter(|id| !id.is_empty())
}

/// Raw alternative-label candidates: extra labels, collapsed names and the
/// decoded redirects
fn alt_label_candidates(record: &RawRecord) -> Vec<String> {
    let labels = record.get(rdfs::LABEL).iter().skip(1).cloned();
    let names = record.get(slot::NAME).iter().cloned();
    let redirects = record
        .get(slot::REDIRECTS)
        .iter()
        .filter_map(|uri| uri_to_string(uri, false));
    labels.chain(names).chain(redirects).collect()
}

/// Normalize candidates and keep those adding words beyond `pref_label`.
///
/// Candidates containing `/` or `|` are dropped, as are duplicates and any
/// candidate whose words all occur in `pref_label`.
pub fn filter_alt_labels<I, S>(pref_label: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pref_words: HashSet<&str> = pref_label.split_whitespace().collect();
    let mut kept: Vec<String> = Vec::new();

    for candidate in candidates {
        let candidate = candidate.as_ref();
        if candidate.contains('/') || candidate.contains('|') {
            continue;
        }
        let label = normalize(candidate);
        if label.is_empty() || label == pref_label || kept.contains(&label) {
            continue;
        }
        if label.split_whitespace().all(|w| pref_words.contains(w)) {
            continue;
        }
        kept.push(label);
    }
    kept
}

fn places_in(values: &[String], edition: &LanguageEdition) -> Vec<String> {
    let mut places: Vec<String> = Vec::new();
    for uri in values.iter().filter(|uri| edition.contains(uri)) {
        let Some(name) = uri_to_string(uri, false) else {
            continue;
        };
        let name = normalize(&name);
        if !name.is_empty() && !places.contains(&name) {
            places.push(name);
        }
    }
    places
}

/// Final segments of `rdf:type` values in `namespace`, first-seen order
fn type_segments(record: &RawRecord, namespace: &str) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for value in record.get(rdf::TYPE) {
        let Some(local) = value.strip_prefix(namespace) else {
            continue;
        };
        let segment = local.rsplit('/').next().unwrap_or(local);
        if segment.is_empty() || segment.contains(':') {
            continue;
        }
        if !types.iter().any(|t| t == segment) {
            types.push(segment.to_string());
        }
    }
    types
}

/// Leading four-digit years of the date values that have one
fn years<'a>(record: &'a RawRecord, predicate: &str) -> impl Iterator<Item = i64> + 'a {
    record
        .get(predicate)
        .iter()
        .filter_map(|date| date.get(..4)?.parse::<i64>().ok())
}

fn inlinks(record: &RawRecord) -> i64 {
    record
        .get(slot::INLINKS)
        .iter()
        .filter_map(|count| count.trim().parse::<i64>().ok())
        .max()
        .unwrap_or(0)
}

fn outlinks(record: &RawRecord) -> i64 {
    let distinct: HashSet<&String> = record.get(dbo::WIKI_PAGE_WIKI_LINK).iter().collect();
    distinct.len() as i64
}

/// (Re)derive the `_ocr` and `_str_ocr` companions of every label field
/// present in `doc`.
pub fn set_ocr_variants(doc: &mut Document) {
    for field in LABEL_FIELDS {
        let ocr_field = format!("{field}{OCR_SUFFIX}");
        let str_ocr_field = format!("{field}{STR_SUFFIX}{OCR_SUFFIX}");

        if let Some(value) = doc.get_str(field) {
            let folded = normalize_ocr(value);
            doc.set(str_ocr_field, folded.as_str());
            doc.set(ocr_field, folded);
        } else if let Some(values) = doc.get_list(field) {
            let folded: Vec<String> = values.iter().map(|v| normalize_ocr(v)).collect();
            doc.set(str_ocr_field, folded.clone());
            doc.set(ocr_field, folded);
        }
    }
}
