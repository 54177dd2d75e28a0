//! Indexer configuration
//!
//! Loads endpoint and batch settings from YAML and provides strongly-typed
//! access to them. Every field has a default, so an empty file (or no file)
//! yields a working local setup. Selected endpoints can be overridden from
//! the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `SPARQL_ENDPOINT` | `sparql.endpoint` |
//! | `SOLR_URL` | `solr.url` |
//! | `TOPICS_URL` | `services.topics_url` |
//! | `ALIAS_URL` | `services.alias_url` |
//! | `VECTORS_URL` | `services.vectors_url` |

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::sparql::ResultFormat;
use crate::uri::Editions;
use crate::vocab::DEFAULT_ALLOWED_OBJECT_PATTERNS;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub sparql: SparqlConfig,
    pub editions: Editions,
    pub solr: SolrConfig,
    pub services: ServicesConfig,
    pub batch: BatchConfig,
    pub vectors: VectorsConfig,
}

/// Triple-store connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SparqlConfig {
    pub endpoint: String,
    pub default_graph: Option<String>,
    pub format: ResultFormat,
    pub timeout_secs: u64,
    /// Regex patterns an object IRI must match to be retrieved (literals
    /// are always retrieved)
    pub allowed_object_patterns: Vec<String>,
}

impl Default for SparqlConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8890/sparql".to_string(),
            default_graph: Some("http://dbpedia.org".to_string()),
            format: ResultFormat::Json,
            timeout_secs: 30,
            allowed_object_patterns: DEFAULT_ALLOWED_OBJECT_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Solr core connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolrConfig {
    /// Core base URL, e.g. `http://localhost:8983/solr/dbpedia`
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8983/solr/dbpedia".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Auxiliary classification, alias and vector services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub topics_url: Option<String>,
    pub alias_url: Option<String>,
    pub vectors_url: Option<String>,
    pub timeout_secs: u64,
    /// Fail the document build when the topic service fails
    pub topics_mandatory: bool,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            topics_url: None,
            alias_url: None,
            vectors_url: None,
            timeout_secs: 300,
            topics_mandatory: false,
        }
    }
}

/// Batch loader behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    /// Commit after this many successful writes
    pub commit_every: usize,
    pub failure_log: String,
    /// Page size of the listing query
    pub listing_page_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay_ms: 1000,
            commit_every: 100,
            failure_log: "failures.txt".to_string(),
            listing_page_size: 1_000_000,
        }
    }
}

/// Vector update settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorsConfig {
    /// Tokens never sent to the vector service
    pub unwanted_tokens: Vec<String>,
}

impl IndexerConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: IndexerConfig = serde_yaml::from_str(content)?;
        config.check_urls()?;
        Ok(config)
    }

    /// Apply endpoint overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SPARQL_ENDPOINT") {
            self.sparql.endpoint = v;
        }
        if let Some(v) = lookup("SOLR_URL") {
            self.solr.url = v;
        }
        if let Some(v) = lookup("TOPICS_URL") {
            self.services.topics_url = Some(v);
        }
        if let Some(v) = lookup("ALIAS_URL") {
            self.services.alias_url = Some(v);
        }
        if let Some(v) = lookup("VECTORS_URL") {
            self.services.vectors_url = Some(v);
        }
    }

    /// Check the final configuration, after environment overrides.
    ///
    /// Every configured endpoint must be a valid URL, and a mandatory topic
    /// service needs an endpoint to call.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_urls()?;
        if self.services.topics_mandatory && self.services.topics_url.is_none() {
            return Err(ConfigError::MissingEndpoint {
                flag: "services.topics_mandatory",
                field: "services.topics_url",
            });
        }
        Ok(())
    }

    fn check_urls(&self) -> Result<(), ConfigError> {
        check_url("sparql.endpoint", &self.sparql.endpoint)?;
        check_url("solr.url", &self.solr.url)?;
        let optional = [
            ("services.topics_url", &self.services.topics_url),
            ("services.alias_url", &self.services.alias_url),
            ("services.vectors_url", &self.services.vectors_url),
        ];
        for (field, value) in optional {
            if let Some(value) = value {
                check_url(field, value)?;
            }
        }
        Ok(())
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        })
}
