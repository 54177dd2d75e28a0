//! Fact retrieval
//!
//! Fetches everything a triple store knows about one subject and shapes it
//! into a [`RawRecord`]:
//!
//! 1. all `?p ?o` pairs with the subject, limited to literals and objects
//!    matching the allow-listed IRI patterns
//! 2. `redirects`: subjects that redirect to it
//! 3. `disambiguates`: targets of its disambiguation links
//! 4. `inlinks`: a single count of subjects linking to it
//!
//! Synonymous predicates are then collapsed onto the slots listed in
//! [`COLLAPSED_SLOTS`].

use std::sync::Arc;
use tracing::debug;

use crate::error::RetrieverError;
use crate::record::RawRecord;
use crate::sparql::{check_iri, TripleStore};
use crate::vocab::{dbo, slot, COLLAPSED_SLOTS};

pub struct FactRetriever {
    store: Arc<dyn TripleStore>,
    object_filter: String,
}

impl FactRetriever {
    pub fn new(store: Arc<dyn TripleStore>, allowed_object_patterns: &[String]) -> Self {
        Self {
            store,
            object_filter: object_filter(allowed_object_patterns),
        }
    }

    /// Retrieve the raw record of one identifier
    pub async fn get_record(&self, identifier: &str) -> Result<RawRecord, RetrieverError> {
        let uri = check_iri(identifier)?;

        let mut record = RawRecord::new();
        let query = format!(
            "SELECT ?p ?o WHERE {{ <{uri}> ?p ?o . FILTER({}) }}",
            self.object_filter
        );
        for row in self.store.select(&query).await? {
            if let (Some(p), Some(o)) = (row.get("p"), row.get("o")) {
                record.push(p.value(), o.value());
            }
        }

        let redirects = self
            .column(
                &format!("SELECT ?s WHERE {{ ?s <{}> <{uri}> }}", dbo::WIKI_PAGE_REDIRECTS),
                "s",
            )
            .await?;
        record.extend(slot::REDIRECTS, redirects);

        let disambiguates = self
            .column(
                &format!(
                    "SELECT ?o WHERE {{ <{uri}> <{}> ?o }}",
                    dbo::WIKI_PAGE_DISAMBIGUATES
                ),
                "o",
            )
            .await?;
        record.extend(slot::DISAMBIGUATES, disambiguates);

        let inlinks = self.inlink_count(uri).await?;
        record.push(slot::INLINKS, inlinks.to_string());

        collapse_synonyms(&mut record);

        debug!(identifier, predicates = record.len(), "retrieved record");
        Ok(record)
    }

    async fn column(&self, query: &str, var: &str) -> Result<Vec<String>, RetrieverError> {
        Ok(self
            .store
            .select(query)
            .await?
            .iter()
            .filter_map(|row| row.get(var).map(|term| term.value().to_string()))
            .collect())
    }

    async fn inlink_count(&self, uri: &str) -> Result<u64, RetrieverError> {
        let query = format!(
            "SELECT (COUNT(DISTINCT ?s) AS ?count) WHERE {{ ?s <{}> <{uri}> }}",
            dbo::WIKI_PAGE_WIKI_LINK
        );
        let rows = self.store.select(&query).await?;
        match rows.first().and_then(|row| row.get("count")) {
            Some(term) => term.value().trim().parse().map_err(|_| {
                RetrieverError::Parse(format!("non-numeric inlink count '{}'", term.value()))
            }),
            None => Ok(0),
        }
    }
}

/// Move the values of synonymous predicates onto their canonical slot, in
/// priority order, and drop the originals.
pub fn collapse_synonyms(record: &mut RawRecord) {
    for (slot_name, predicates) in COLLAPSED_SLOTS {
        let values: Vec<String> = predicates
            .iter()
            .filter_map(|p| record.remove(p))
            .flatten()
            .collect();
        record.extend(slot_name, values);
    }
}

fn object_filter(patterns: &[String]) -> String {
    let mut clauses = vec!["isLiteral(?o)".to_string()];
    clauses.extend(
        patterns
            .iter()
            .map(|p| format!("regex(str(?o), \"{}\")", escape_literal(p))),
    );
    clauses.join(" || ")
}

fn escape_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
