//! SPARQL protocol client
//!
//! Sends SELECT queries as GET requests with the Virtuoso-style
//! `default-graph-uri`, `format` and `query` parameters.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{ResultFormat, Solution, TripleStore};
use crate::config::SparqlConfig;
use crate::error::{ConfigError, RetrieverError};

pub struct HttpTripleStore {
    http: Client,
    endpoint: String,
    default_graph: Option<String>,
    format: ResultFormat,
}

impl HttpTripleStore {
    pub fn new(config: &SparqlConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            default_graph: config.default_graph.clone(),
            format: config.format,
        })
    }

    pub fn format(&self) -> ResultFormat {
        self.format
    }
}

#[async_trait]
impl TripleStore for HttpTripleStore {
    async fn select(&self, query: &str) -> Result<Vec<Solution>, RetrieverError> {
        let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
        debug!(endpoint = %self.endpoint, %query, "SPARQL select");

        let mut params: Vec<(&str, &str)> = Vec::with_capacity(3);
        if let Some(graph) = &self.default_graph {
            params.push(("default-graph-uri", graph.as_str()));
        }
        params.push(("format", self.format.as_param()));
        params.push(("query", query.as_str()));

        let response = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .header("Accept", self.format.accept_header())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RetrieverError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        self.format.parse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: String, format: ResultFormat) -> SparqlConfig {
        SparqlConfig {
            endpoint,
            default_graph: Some("http://dbpedia.org".to_string()),
            format,
            ..SparqlConfig::default()
        }
    }

    #[tokio::test]
    async fn test_select_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("format", "json"))
            .and(query_param("default-graph-uri", "http://dbpedia.org"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"results": {"bindings": [{"count": {"type": "literal", "value": "42"}}]}}"#,
            ))
            .mount(&server)
            .await;

        let store =
            HttpTripleStore::new(&config(format!("{}/sparql", server.uri()), ResultFormat::Json))
                .unwrap();
        let rows = store.select("SELECT (COUNT(?s) AS ?count) WHERE { ?s ?p ?o }").await.unwrap();
        assert_eq!(rows[0]["count"].value(), "42");
    }

    #[tokio::test]
    async fn test_select_xml() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("format", "xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<sparql><results><result><binding name="s"><uri>http://x</uri></binding></result></results></sparql>"#,
            ))
            .mount(&server)
            .await;

        let store =
            HttpTripleStore::new(&config(format!("{}/sparql", server.uri()), ResultFormat::Xml))
                .unwrap();
        let rows = store.select("SELECT ?s WHERE { ?s ?p ?o }").await.unwrap();
        assert_eq!(rows[0]["s"].value(), "http://x");
    }

    #[tokio::test]
    async fn test_select_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Virtuoso 42000 Error"))
            .mount(&server)
            .await;

        let store =
            HttpTripleStore::new(&config(format!("{}/sparql", server.uri()), ResultFormat::Json))
                .unwrap();
        let err = store.select("SELECT ?s WHERE { ?s ?p ?o }").await.unwrap_err();
        assert!(matches!(err, RetrieverError::Status { status: 500, .. }));
    }
}
