use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::AppState;
use crate::core::validation::{validate_input_text, validate_summary_text};
use crate::error::AppError;
use crate::models::summary::Summary;
use crate::repositories::summaries as repo;

#[derive(Debug, Deserialize)]
struct CreateSummaryRequest {
    input_text: String,
}

#[derive(Debug, Deserialize)]
struct UpdateSummaryRequest {
    summary_text: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summaries", post(create_summary))
        .route(
            "/summaries/{id}",
            get(get_summary).put(update_summary).delete(delete_summary),
        )
}

async fn create_summary(
    State(state): State<AppState>,
    Json(req): Json<CreateSummaryRequest>,
) -> Result<(StatusCode, Json<Summary>), AppError> {
    validate_input_text(&req.input_text)?;

    let summary_text = state.summarizer.summarize(&req.input_text).await?;

    let record = Summary::new(
        req.input_text,
        summary_text,
        state.summarizer.provider_name().to_string(),
    );
    repo::create_summary(&state.pool, &record).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Summary>, AppError> {
    let record = repo::get_summary_by_id(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(record))
}

async fn update_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSummaryRequest>,
) -> Result<Json<Summary>, AppError> {
    validate_summary_text(&req.summary_text)?;

    repo::get_summary_by_id(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let updated_at = chrono::Utc::now().to_rfc3339();
    repo::update_summary_text(&state.pool, &id, &req.summary_text, &updated_at).await?;

    let record = repo::get_summary_by_id(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(record))
}

async fn delete_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = repo::delete_summary(&state.pool, &id).await?;
    if removed == 0 {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
