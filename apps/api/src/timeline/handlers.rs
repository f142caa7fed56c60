//! Axum route handlers for the Timeline API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::recommend::handlers::GuidanceRequest;
use crate::state::AppState;
use crate::timeline::synthesizer::{fetch_timeline, get_stored_timeline, Timeline};

/// POST /api/v1/timeline
///
/// Runs recommendation, colleges and timeline for a finished quiz and stores
/// the result.
pub async fn handle_timeline(
    State(state): State<AppState>,
    Json(request): Json<GuidanceRequest>,
) -> Result<Json<Timeline>, AppError> {
    let timeline = fetch_timeline(
        state.store.as_ref(),
        state.llm.as_ref(),
        state.dataset.as_ref(),
        request.user_id,
        request.quiz_id,
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(timeline))
}

/// GET /api/v1/timeline/:user_id
pub async fn handle_stored_timeline(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Timeline>, AppError> {
    let timeline = get_stored_timeline(state.store.as_ref(), user_id).await?;
    Ok(Json(timeline))
}
