//! DBpedia Indexer
//!
//! Builds a Solr search index of DBpedia entities. For each resource
//! identifier the facts of both language editions are retrieved from a
//! SPARQL endpoint, merged, and turned into one flat document of normalized,
//! search-ready fields.
//!
//! ## Architecture
//!
//! ```text
//! identifier
//!     │
//!     ▼
//! FactRetriever ──► CrossLingualMerger ──► DocumentBuilder ──► DocumentIndex
//!  (sparql)          (owl:sameAs)           (normalize, uri,     (solr)
//!                                            last_name, services)
//!
//! DocumentIndex ──► Updater ──► DocumentIndex      (incremental field updates)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dbpedia_indexer::config::IndexerConfig;
//! use dbpedia_indexer::pipeline::{Pipeline, Services};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = IndexerConfig::from_file("config/indexer.yaml")?;
//! let services = Services::from_config(&config)?;
//! let pipeline = Pipeline::from_services(&config, &services);
//!
//! let doc = pipeline.build("http://nl.dbpedia.org/resource/Albert_Einstein").await?;
//! println!("{}", serde_json::to_string_pretty(&doc)?);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;
pub mod config;

// Text and identifier handling
pub mod last_name;
pub mod normalize;
pub mod uri;
pub mod vocab;

// Records and retrieval
pub mod merger;
pub mod record;
pub mod retriever;
pub mod sparql;

// Documents
pub mod builder;
pub mod document;
pub mod services;
pub mod solr;
pub mod update;

// Orchestration
pub mod batch;
pub mod listing;
pub mod pipeline;

// HTTP lookup adapter (when enabled)
#[cfg(feature = "server")]
pub mod server;

pub use builder::DocumentBuilder;
pub use config::IndexerConfig;
pub use document::{Document, FieldValue};
pub use error::{IndexerError, Result};
pub use pipeline::{Pipeline, Services};
pub use record::RawRecord;
pub use update::{UpdateAction, Updater};
