//! External alias source keyed by Wikidata id

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{get_json, http_client};
use crate::error::{AuxiliaryServiceError, ConfigError};

const SERVICE: &str = "aliases";

#[async_trait]
pub trait AliasService: Send + Sync {
    /// Alternative names of the entity with Wikidata id `wikidata_id` (e.g. `Q7259`)
    async fn aliases(&self, wikidata_id: &str) -> Result<Vec<String>, AuxiliaryServiceError>;
}

#[derive(Deserialize)]
struct AliasResponse {
    #[serde(default)]
    aliases: Vec<String>,
}

pub struct HttpAliasService {
    http: Client,
    url: String,
}

impl HttpAliasService {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            http: http_client(timeout_secs)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AliasService for HttpAliasService {
    async fn aliases(&self, wikidata_id: &str) -> Result<Vec<String>, AuxiliaryServiceError> {
        let response: AliasResponse =
            get_json(&self.http, SERVICE, &self.url, &[("id", wikidata_id)]).await?;
        Ok(response.aliases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_aliases() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("id", "Q7259"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "aliases": ["Augusta Ada King", "Ada Byron"]
            })))
            .mount(&server)
            .await;

        let service = HttpAliasService::new(server.uri(), 5).unwrap();
        assert_eq!(
            service.aliases("Q7259").await.unwrap(),
            vec!["Augusta Ada King".to_string(), "Ada Byron".to_string()]
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html/>"))
            .mount(&server)
            .await;

        let service = HttpAliasService::new(server.uri(), 5).unwrap();
        assert!(service.aliases("Q1").await.is_err());
    }
}
