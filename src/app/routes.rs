//! HTTP handlers.
//!
//! Failures are reported as `{"error": "..."}` with status 200, matching what
//! existing clients of `/predict` and `/news` parse. Clients therefore have to
//! inspect the body to tell success from failure.

use crate::app::state::AppState;
use crate::domain::model::NewsArticle;
use crate::utils::error::ServiceError;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Ok(T),
    Error { error: String },
}

impl<T> ApiResponse<T> {
    fn from_result(context: &str, result: crate::utils::error::Result<T>) -> Self {
        match result {
            Ok(value) => ApiResponse::Ok(value),
            Err(e) => {
                log_request_error(context, &e);
                ApiResponse::Error {
                    error: e.to_string(),
                }
            }
        }
    }
}

fn log_request_error(context: &str, error: &ServiceError) {
    tracing::warn!(
        "{} failed: {} (Category: {:?}, Severity: {:?})",
        context,
        error,
        error.category(),
        error.severity()
    );
}

#[derive(Debug, Serialize)]
pub struct NewsResults {
    pub results: Vec<NewsArticle>,
}

/// A body axum refuses to buffer (over the size limit, aborted upload) is
/// answered like any other invalid body.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Json<ApiResponse<crate::domain::model::PricePrediction>> {
    let result = body
        .map_err(|rejection| ServiceError::ValidationError {
            message: rejection.body_text(),
        })
        .and_then(|body| state.predictor.predict_body(&body));
    Json(ApiResponse::from_result("predict", result))
}

pub async fn news(State(state): State<AppState>) -> Json<ApiResponse<NewsResults>> {
    let result = state
        .news
        .latest()
        .await
        .map(|results| NewsResults { results });
    Json(ApiResponse::from_result("news", result))
}

pub async fn health() -> &'static str {
    "OK"
}
