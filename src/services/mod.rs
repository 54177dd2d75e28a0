//! Auxiliary services
//!
//! Three optional HTTP services enrich documents:
//! - [`TopicService`]: topic and type scores keyed by identifier
//! - [`AliasService`]: alternative names keyed by Wikidata id
//! - [`VectorService`]: word-embedding vectors keyed by a source string
//!
//! All of them answer JSON and are called with a generous timeout.

pub mod aliases;
pub mod topics;
pub mod vectors;

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{AuxiliaryServiceError, ConfigError};

pub use aliases::{AliasService, HttpAliasService};
pub use topics::{HttpTopicService, TopicScores, TopicService};
pub use vectors::{HttpVectorService, VectorService};

/// Round a score to three decimals
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn http_client(timeout_secs: u64) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// GET `url` with `params` and decode a JSON body
async fn get_json<T: DeserializeOwned>(
    http: &Client,
    service: &'static str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<T, AuxiliaryServiceError> {
    let response = http
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(|e| AuxiliaryServiceError::new(service, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AuxiliaryServiceError::new(
            service,
            format!("HTTP {}", status.as_u16()),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| AuxiliaryServiceError::new(service, format!("invalid response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.123456), 0.123);
        assert_eq!(round3(0.9996), 1.0);
        assert_eq!(round3(-0.0004), -0.0);
    }
}
