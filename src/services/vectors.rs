//! Word-embedding vector service

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{get_json, http_client};
use crate::error::{AuxiliaryServiceError, ConfigError};

const SERVICE: &str = "vectors";

#[async_trait]
pub trait VectorService: Send + Sync {
    /// Vectors for `source`: a Wikidata id or space-separated tokens. An
    /// unknown source yields an empty list.
    async fn vectors(&self, source: &str) -> Result<Vec<Vec<f64>>, AuxiliaryServiceError>;
}

#[derive(Deserialize)]
struct VectorResponse {
    #[serde(default)]
    vectors: Vec<Vec<f64>>,
}

pub struct HttpVectorService {
    http: Client,
    url: String,
}

impl HttpVectorService {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            http: http_client(timeout_secs)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl VectorService for HttpVectorService {
    async fn vectors(&self, source: &str) -> Result<Vec<Vec<f64>>, AuxiliaryServiceError> {
        let response: VectorResponse =
            get_json(&self.http, SERVICE, &self.url, &[("source", source)]).await?;
        Ok(response.vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_vectors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("source", "Q7259"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "vectors": [[0.25, -1.5]]
            })))
            .mount(&server)
            .await;

        let service = HttpVectorService::new(server.uri(), 5).unwrap();
        assert_eq!(service.vectors("Q7259").await.unwrap(), vec![vec![0.25, -1.5]]);
    }
}
