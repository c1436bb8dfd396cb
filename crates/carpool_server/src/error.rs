use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use carpool_core::optimizer::OptimizeError;
use carpool_core::store::StoreError;

/// Failures the HTTP layer maps onto status codes. Missing or malformed
/// path/query parameters are rejected by the extractors before a handler
/// runs and surface as 400 on their own.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("optimization failed: {0}")]
    Optimize(#[from] OptimizeError),

    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
