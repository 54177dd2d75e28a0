//! Cross-lingual merging
//!
//! A secondary-edition record is merged with the records of every
//! primary-edition resource it is `owl:sameAs` linked to. Primary-edition
//! records are returned as retrieved.

use tracing::debug;

use crate::error::RetrieverError;
use crate::record::{merge, RawRecord};
use crate::retriever::FactRetriever;
use crate::uri::{EditionRole, Editions};
use crate::vocab::owl;

pub struct CrossLingualMerger {
    retriever: FactRetriever,
    editions: Editions,
}

impl CrossLingualMerger {
    pub fn new(retriever: FactRetriever, editions: Editions) -> Self {
        Self {
            retriever,
            editions,
        }
    }

    pub fn editions(&self) -> &Editions {
        &self.editions
    }

    /// Retrieve `identifier` and merge in its primary-edition equivalents
    pub async fn merged_record(&self, identifier: &str) -> Result<RawRecord, RetrieverError> {
        let record = self.retriever.get_record(identifier).await?;
        if self.editions.role_of(identifier) != Some(EditionRole::Secondary) {
            return Ok(record);
        }

        let linked = self.linked_primary(&record);
        if linked.is_empty() {
            return Ok(record);
        }
        debug!(identifier, linked = ?linked, "merging linked records");

        let mut records = Vec::with_capacity(linked.len() + 1);
        records.push(record);
        for uri in linked {
            records.push(self.retriever.get_record(&uri).await?);
        }
        Ok(merge(records))
    }

    /// Primary-edition `owl:sameAs` targets, each once, in record order
    fn linked_primary(&self, record: &RawRecord) -> Vec<String> {
        let mut linked: Vec<String> = Vec::new();
        for uri in record.get(owl::SAME_AS) {
            if self.editions.primary.contains(uri) && !linked.contains(uri) {
                linked.push(uri.clone());
            }
        }
        linked
    }
}
