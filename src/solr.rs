//! Document-index access
//!
//! [`DocumentIndex`] is the seam between the indexer and Solr: an exact id
//! lookup on the read path, and single-document add, delete and explicit
//! commit on the write path.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::SolrConfig;
use crate::document::{Document, VERSION_FIELD};
use crate::error::{ConfigError, IndexReadError, IndexerError, NotFoundError, WriteError};

#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// First document whose `id` equals `id`, without the `_version_` field
    async fn get_document(&self, id: &str) -> Result<Document, IndexerError>;

    async fn add_document(&self, doc: &Document) -> Result<(), WriteError>;

    async fn delete(&self, id: &str) -> Result<(), WriteError>;

    async fn commit(&self) -> Result<(), WriteError>;
}

pub struct HttpSolrIndex {
    http: Client,
    base_url: String,
}

impl HttpSolrIndex {
    pub fn new(config: &SolrConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn update_url(&self) -> String {
        format!("{}/update", self.base_url)
    }

    /// POST a JSON update command and check Solr's response status
    async fn post_update(&self, body: &Value) -> Result<(), WriteError> {
        let response = self.http.post(self.update_url()).json(body).send().await?;
        check_update_response(response).await
    }
}

#[async_trait]
impl DocumentIndex for HttpSolrIndex {
    async fn get_document(&self, id: &str) -> Result<Document, IndexerError> {
        let query = format!("id:\"{}\"", escape_phrase(id));
        let response = self
            .http
            .get(format!("{}/select", self.base_url))
            .query(&[("q", query.as_str()), ("wt", "json"), ("rows", "1")])
            .send()
            .await
            .map_err(IndexReadError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexReadError::Transport(format!("HTTP {}", status.as_u16())).into());
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| IndexReadError::Parse(e.to_string()))?;

        let first = body
            .pointer("/response/docs")
            .and_then(Value::as_array)
            .ok_or_else(|| IndexReadError::Parse("missing 'response.docs'".to_string()))?
            .first()
            .cloned();
        let Some(first) = first else {
            return Err(NotFoundError { id: id.to_string() }.into());
        };

        let mut doc: Document =
            serde_json::from_value(first).map_err(|e| IndexReadError::Parse(e.to_string()))?;
        doc.remove(VERSION_FIELD);
        Ok(doc)
    }

    async fn add_document(&self, doc: &Document) -> Result<(), WriteError> {
        debug!(id = doc.id().unwrap_or_default(), "adding document");
        self.post_update(&json!([doc])).await
    }

    async fn delete(&self, id: &str) -> Result<(), WriteError> {
        debug!(id, "deleting document");
        self.post_update(&json!({ "delete": id })).await
    }

    async fn commit(&self) -> Result<(), WriteError> {
        let response = self
            .http
            .get(self.update_url())
            .query(&[("commit", "true"), ("wt", "json")])
            .send()
            .await?;
        check_update_response(response).await
    }
}

async fn check_update_response(response: reqwest::Response) -> Result<(), WriteError> {
    let http_status = response.status();
    let body = response.text().await?;
    if !http_status.is_success() {
        return Err(WriteError::Status {
            status: i64::from(http_status.as_u16()),
            body: truncate(&body),
        });
    }

    let status = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.pointer("/responseHeader/status").and_then(Value::as_i64));
    match status {
        Some(0) => Ok(()),
        Some(status) => Err(WriteError::Status {
            status,
            body: truncate(&body),
        }),
        None => Err(WriteError::Status {
            status: -1,
            body: truncate(&body),
        }),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Escape a value for use inside a quoted Solr phrase
fn escape_phrase(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
