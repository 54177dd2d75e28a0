//! Full document build
//!
//! Wires the retriever, merger and builder into one `build(identifier)` call
//! and constructs every service client from configuration.

use std::sync::Arc;
use tracing::info;

use crate::builder::DocumentBuilder;
use crate::config::IndexerConfig;
use crate::document::Document;
use crate::error::{ConfigError, IndexerError};
use crate::merger::CrossLingualMerger;
use crate::retriever::FactRetriever;
use crate::services::{
    AliasService, HttpAliasService, HttpTopicService, HttpVectorService, TopicService,
    VectorService,
};
use crate::solr::{DocumentIndex, HttpSolrIndex};
use crate::sparql::{HttpTripleStore, TripleStore};
use crate::update::Updater;

/// Every external collaborator, behind its trait
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn TripleStore>,
    pub index: Arc<dyn DocumentIndex>,
    pub topics: Option<Arc<dyn TopicService>>,
    pub aliases: Option<Arc<dyn AliasService>>,
    pub vectors: Option<Arc<dyn VectorService>>,
}

impl Services {
    /// HTTP clients for every configured endpoint
    pub fn from_config(config: &IndexerConfig) -> Result<Self, ConfigError> {
        let timeout = config.services.timeout_secs;
        let topics = match &config.services.topics_url {
            Some(url) => {
                Some(Arc::new(HttpTopicService::new(url, timeout)?) as Arc<dyn TopicService>)
            }
            None => None,
        };
        let aliases = match &config.services.alias_url {
            Some(url) => {
                Some(Arc::new(HttpAliasService::new(url, timeout)?) as Arc<dyn AliasService>)
            }
            None => None,
        };
        let vectors = match &config.services.vectors_url {
            Some(url) => {
                Some(Arc::new(HttpVectorService::new(url, timeout)?) as Arc<dyn VectorService>)
            }
            None => None,
        };

        info!(
            sparql = %config.sparql.endpoint,
            solr = %config.solr.url,
            topics = topics.is_some(),
            aliases = aliases.is_some(),
            vectors = vectors.is_some(),
            "services configured"
        );

        Ok(Self {
            store: Arc::new(HttpTripleStore::new(&config.sparql)?),
            index: Arc::new(HttpSolrIndex::new(&config.solr)?),
            topics,
            aliases,
            vectors,
        })
    }
}

/// Retriever → merger → builder
pub struct Pipeline {
    merger: CrossLingualMerger,
    builder: DocumentBuilder,
}

impl Pipeline {
    pub fn new(merger: CrossLingualMerger, builder: DocumentBuilder) -> Self {
        Self { merger, builder }
    }

    pub fn from_services(config: &IndexerConfig, services: &Services) -> Self {
        let retriever = FactRetriever::new(
            services.store.clone(),
            &config.sparql.allowed_object_patterns,
        );
        let merger = CrossLingualMerger::new(retriever, config.editions.clone());

        let mut builder = DocumentBuilder::new(config.editions.clone());
        if let Some(topics) = &services.topics {
            builder = builder.with_topics(topics.clone(), config.services.topics_mandatory);
        }
        if let Some(aliases) = &services.aliases {
            builder = builder.with_aliases(aliases.clone());
        }

        Self::new(merger, builder)
    }

    /// Build the finished document of one identifier
    pub async fn build(&self, identifier: &str) -> Result<Document, IndexerError> {
        let record = self.merger.merged_record(identifier).await?;
        self.builder.transform(&record, identifier).await
    }
}

impl Updater {
    pub fn from_services(config: &IndexerConfig, services: &Services) -> Self {
        let mut updater = Updater::new(services.index.clone());
        if let Some(topics) = &services.topics {
            updater = updater.with_topics(topics.clone());
        }
        if let Some(vectors) = &services.vectors {
            updater = updater.with_vectors(vectors.clone(), config.vectors.unwanted_tokens.clone());
        }
        updater
    }
}
