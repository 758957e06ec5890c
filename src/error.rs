use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::services::completion::ServiceUnavailable;

/// Service-wide error taxonomy. Every variant maps to exactly one response
/// envelope: `{"error": {"category", "message", ["field"]}}`. Internal
/// detail (store errors, provider bodies) goes to the logs, never to the
/// caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("summary not found")]
    NotFound,
    #[error("external LLM service unavailable")]
    ServiceUnavailable,
    #[error("storage error")]
    Store(#[from] sqlx::Error),
}

impl From<ServiceUnavailable> for AppError {
    fn from(_: ServiceUnavailable) -> AppError {
        AppError::ServiceUnavailable
    }
}

impl AppError {
    fn category(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound => "not_found",
            AppError::ServiceUnavailable => "service_unavailable",
            AppError::Store(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = json!({ "category": self.category() });

        match &self {
            AppError::Validation { field, message } => {
                body["field"] = json!(field);
                body["message"] = json!(message);
            }
            AppError::NotFound => {
                body["message"] = json!("Summary not found");
            }
            AppError::ServiceUnavailable => {
                body["message"] = json!("External LLM service unavailable");
            }
            AppError::Store(err) => {
                error!(error = %err, "database error");
                body["message"] = json!("Internal database error");
            }
        }

        (self.status(), Json(json!({ "error": body }))).into_response()
    }
}
