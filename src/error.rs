//! Error types for the indexing pipeline
//!
//! One enum per failure kind, wrapped by [`IndexerError`]. The batch loader
//! inspects [`IndexerError::is_retryable`] to decide between another attempt
//! and logging the identifier to the failure file.

use thiserror::Error;

/// Main error type for the indexer
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Retriever error: {0}")]
    Retriever(#[from] RetrieverError),

    #[error("Missing field: {0}")]
    MissingField(#[from] MissingFieldError),

    #[error("Auxiliary service error: {0}")]
    Auxiliary(#[from] AuxiliaryServiceError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("Index read error: {0}")]
    IndexRead(#[from] IndexReadError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexerError {
    /// Whether another attempt could succeed. Missing labels, absent
    /// documents and malformed identifiers are never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            IndexerError::Retriever(RetrieverError::InvalidIdentifier { .. }) => false,
            IndexerError::Retriever(_) => true,
            IndexerError::MissingField(_) => false,
            IndexerError::Auxiliary(_) => true,
            IndexerError::NotFound(_) => false,
            IndexerError::IndexRead(_) => true,
            IndexerError::Write(_) => true,
            IndexerError::Config(_) => false,
            IndexerError::Io(_) => false,
        }
    }

    /// Short tag written next to the identifier in the failure file
    pub fn kind(&self) -> &'static str {
        match self {
            IndexerError::Retriever(_) => "retriever",
            IndexerError::MissingField(_) => "missing-field",
            IndexerError::Auxiliary(_) => "auxiliary",
            IndexerError::NotFound(_) => "not-found",
            IndexerError::IndexRead(_) => "index-read",
            IndexerError::Write(_) => "write",
            IndexerError::Config(_) => "config",
            IndexerError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexerError>;

/// Triple-store failures
#[derive(Error, Debug)]
pub enum RetrieverError {
    #[error("SPARQL request failed: {0}")]
    Transport(String),

    #[error("SPARQL endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unparseable SPARQL response: {0}")]
    Parse(String),

    #[error("Identifier '{identifier}' cannot be embedded in a query")]
    InvalidIdentifier { identifier: String },
}

impl From<reqwest::Error> for RetrieverError {
    fn from(error: reqwest::Error) -> Self {
        RetrieverError::Transport(error.to_string())
    }
}

/// A required predicate had no values
#[derive(Error, Debug)]
#[error("record for '{identifier}' has no values for <{predicate}>")]
pub struct MissingFieldError {
    pub identifier: String,
    pub predicate: String,
}

/// A mandatory auxiliary call failed
#[derive(Error, Debug)]
#[error("{service} service failed: {message}")]
pub struct AuxiliaryServiceError {
    pub service: &'static str,
    pub message: String,
}

impl AuxiliaryServiceError {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

/// No indexed document carries the requested id
#[derive(Error, Debug)]
#[error("no indexed document with id '{id}'")]
pub struct NotFoundError {
    pub id: String,
}

/// Document-index read path failures other than not-found
#[derive(Error, Debug)]
pub enum IndexReadError {
    #[error("Solr query failed: {0}")]
    Transport(String),

    #[error("Unparseable Solr response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for IndexReadError {
    fn from(error: reqwest::Error) -> Self {
        IndexReadError::Transport(error.to_string())
    }
}

/// Document-index write path failures
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Solr update failed: {0}")]
    Transport(String),

    #[error("Solr update returned status {status}: {body}")]
    Status { status: i64, body: String },
}

impl From<reqwest::Error> for WriteError {
    fn from(error: reqwest::Error) -> Self {
        WriteError::Transport(error.to_string())
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{flag} is set but {field} is not configured")]
    MissingEndpoint {
        flag: &'static str,
        field: &'static str,
    },

    #[error("Cannot build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let transport: IndexerError = RetrieverError::Transport("timeout".into()).into();
        assert!(transport.is_retryable());

        let invalid: IndexerError = RetrieverError::InvalidIdentifier {
            identifier: "x>y".into(),
        }
        .into();
        assert!(!invalid.is_retryable());

        let missing: IndexerError = MissingFieldError {
            identifier: "http://dbpedia.org/resource/X".into(),
            predicate: "label".into(),
        }
        .into();
        assert!(!missing.is_retryable());
        assert_eq!(missing.kind(), "missing-field");

        let write: IndexerError = WriteError::Status {
            status: 400,
            body: "bad".into(),
        }
        .into();
        assert!(write.is_retryable());
    }
}
