//! Single-identifier lookup over HTTP
//!
//! `GET /?uri=<identifier>` builds the document of one identifier and
//! returns it as JSON without writing it to the index.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::{IndexerError, RetrieverError};
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub uri: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(lookup))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn lookup(State(state): State<AppState>, Query(query): Query<LookupQuery>) -> Response {
    let Some(uri) = query.uri.filter(|uri| !uri.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing 'uri' parameter").into_response();
    };

    match state.pipeline.build(&uri).await {
        Ok(doc) => Json(doc).into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                warn!(uri, error = %e, "lookup failed");
            }
            (status, e.to_string()).into_response()
        }
    }
}

fn status_for(error: &IndexerError) -> StatusCode {
    match error {
        IndexerError::MissingField(_) | IndexerError::NotFound(_) => StatusCode::NOT_FOUND,
        IndexerError::Retriever(RetrieverError::InvalidIdentifier { .. }) => {
            StatusCode::BAD_REQUEST
        }
        IndexerError::Config(_) | IndexerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuxiliaryServiceError, MissingFieldError};

    #[test]
    fn test_status_mapping() {
        let missing: IndexerError = MissingFieldError {
            identifier: "x".into(),
            predicate: "label".into(),
        }
        .into();
        assert_eq!(status_for(&missing), StatusCode::NOT_FOUND);

        let upstream: IndexerError = RetrieverError::Transport("timeout".into()).into();
        assert_eq!(status_for(&upstream), StatusCode::BAD_GATEWAY);

        let topics: IndexerError = AuxiliaryServiceError::new("topics", "HTTP 500").into();
        assert_eq!(status_for(&topics), StatusCode::BAD_GATEWAY);

        let invalid: IndexerError =
            RetrieverError::InvalidIdentifier { identifier: "a b".into() }.into();
        assert_eq!(status_for(&invalid), StatusCode::BAD_REQUEST);
    }
}
