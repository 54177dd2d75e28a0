//! Triple-store access
//!
//! This module provides:
//! - [`TripleStore`], the seam the retriever and listing code query through
//! - [`HttpTripleStore`], a SPARQL-protocol client for Virtuoso-style endpoints
//! - Parsers for the SPARQL Results JSON and XML formats

pub mod client;
pub mod results;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::RetrieverError;

pub use client::HttpTripleStore;
pub use results::{parse_json_results, parse_xml_results};

/// A single RDF term in a result binding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfTerm {
    Iri(String),
    BlankNode(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl RdfTerm {
    /// Lexical value (IRI, blank node label or literal text)
    pub fn value(&self) -> &str {
        match self {
            RdfTerm::Iri(v) | RdfTerm::BlankNode(v) => v,
            RdfTerm::Literal { value, .. } => value,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        RdfTerm::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }
}

/// One solution row: variable name → bound term
pub type Solution = HashMap<String, RdfTerm>;

/// Encoding requested from the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    #[default]
    Json,
    Xml,
}

impl ResultFormat {
    /// Value of the `format` request parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            ResultFormat::Json => "json",
            ResultFormat::Xml => "xml",
        }
    }

    pub fn accept_header(&self) -> &'static str {
        match self {
            ResultFormat::Json => "application/sparql-results+json",
            ResultFormat::Xml => "application/sparql-results+xml",
        }
    }

    pub fn parse(&self, body: &str) -> Result<Vec<Solution>, RetrieverError> {
        match self {
            ResultFormat::Json => parse_json_results(body),
            ResultFormat::Xml => parse_xml_results(body),
        }
    }
}

/// SELECT access to a triple store
#[async_trait]
pub trait TripleStore: Send + Sync {
    /// Run a SELECT query and return its solutions in endpoint order
    async fn select(&self, query: &str) -> Result<Vec<Solution>, RetrieverError>;
}

/// Reject identifiers that would break out of an IRI reference in a query
pub fn check_iri(identifier: &str) -> Result<&str, RetrieverError> {
    let invalid = identifier.is_empty()
        || identifier.chars().any(|c| {
            c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
        });
    if invalid {
        return Err(RetrieverError::InvalidIdentifier {
            identifier: identifier.to_string(),
        });
    }
    Ok(identifier)
}
