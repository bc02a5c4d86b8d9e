//! HTTP surface: the form page and the JSON detection endpoint.

use std::sync::Arc;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use crate::error::CountError;
use crate::pipeline::{DetectResponse, PersonCounter};

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Clone)]
pub struct AppState {
    counter: Arc<PersonCounter>,
    strict_status: bool,
}

impl AppState {
    pub fn new(counter: PersonCounter) -> Self {
        Self {
            counter: Arc::new(counter),
            strict_status: false,
        }
    }

    /// Report failures with a matching HTTP status instead of always 200.
    /// The body shape does not change.
    pub fn with_strict_status(mut self, strict: bool) -> Self {
        self.strict_status = strict;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct DetectQuery {
    image_url: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/detect/", get(detect))
        .route("/detect", get(detect))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn detect(State(state): State<AppState>, Query(query): Query<DetectQuery>) -> Response {
    let Some(image_url) = query.image_url else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": [{
                    "loc": ["query", "image_url"],
                    "msg": "field required",
                    "type": "value_error.missing",
                }]
            })),
        )
            .into_response();
    };

    let counter = state.counter.clone();
    let url = image_url.clone();
    let result = tokio::task::spawn_blocking(move || counter.count_from_url(&url))
        .await
        .unwrap_or_else(|err| Err(CountError::Worker(err.to_string())));

    let status = match &result {
        Ok(count) => {
            tracing::info!(image_url = %image_url, count, "counted people");
            StatusCode::OK
        }
        Err(err) => {
            tracing::error!(error_kind = err.kind(), image_url = %image_url, error = %err, "error processing image");
            if state.strict_status {
                strict_status_code(err)
            } else {
                StatusCode::OK
            }
        }
    };

    (status, Json(DetectResponse::new(image_url, &result))).into_response()
}

fn strict_status_code(err: &CountError) -> StatusCode {
    match err {
        CountError::Fetch(_) => StatusCode::BAD_GATEWAY,
        CountError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CountError::Inference(_) | CountError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
