//! Topic and type classification service

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::{get_json, http_client, round3};
use crate::document::Document;
use crate::error::{AuxiliaryServiceError, ConfigError};

const SERVICE: &str = "topics";

/// Named scores returned for one identifier
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopicScores {
    #[serde(default)]
    pub topics: BTreeMap<String, f64>,
    #[serde(default)]
    pub types: BTreeMap<String, f64>,
}

impl TopicScores {
    /// Write `topic_<name>` and `dbo_type_<name>` fields, rounded to three
    /// decimals
    pub fn apply(&self, doc: &mut Document) {
        for (name, score) in &self.topics {
            doc.set(format!("topic_{name}"), round3(*score));
        }
        for (name, score) in &self.types {
            doc.set(format!("dbo_type_{name}"), round3(*score));
        }
    }
}

#[async_trait]
pub trait TopicService: Send + Sync {
    async fn scores(&self, identifier: &str) -> Result<TopicScores, AuxiliaryServiceError>;
}

pub struct HttpTopicService {
    http: Client,
    url: String,
}

impl HttpTopicService {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            http: http_client(timeout_secs)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl TopicService for HttpTopicService {
    async fn scores(&self, identifier: &str) -> Result<TopicScores, AuxiliaryServiceError> {
        get_json(&self.http, SERVICE, &self.url, &[("url", identifier)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_scores_applied_rounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("url", "http://dbpedia.org/resource/Ada_Lovelace"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "topics": {"science": 0.81234},
                "types": {"person": 0.97777, "location": 0.0001}
            })))
            .mount(&server)
            .await;

        let service = HttpTopicService::new(server.uri(), 5).unwrap();
        let scores = service
            .scores("http://dbpedia.org/resource/Ada_Lovelace")
            .await
            .unwrap();

        let mut doc = Document::new();
        scores.apply(&mut doc);
        assert_eq!(doc.get_f64("topic_science"), Some(0.812));
        assert_eq!(doc.get_f64("dbo_type_person"), Some(0.978));
        assert_eq!(doc.get_f64("dbo_type_location"), Some(0.0));
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let service = HttpTopicService::new(server.uri(), 5).unwrap();
        let err = service.scores("http://x").await.unwrap_err();
        assert_eq!(err.service, "topics");
        assert!(err.message.contains("503"));
    }
}
