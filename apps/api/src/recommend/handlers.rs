//! Axum route handlers for the Recommendation API.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::recommend::synthesizer::{fetch_recommendations, RecommendationResult};
use crate::state::AppState;

/// Body shared by every endpoint that runs the pipeline for a finished quiz.
#[derive(Debug, Deserialize)]
pub struct GuidanceRequest {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
}

/// POST /api/v1/recommend
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<GuidanceRequest>,
) -> Result<Json<RecommendationResult>, AppError> {
    let result = fetch_recommendations(
        state.store.as_ref(),
        state.llm.as_ref(),
        request.user_id,
        request.quiz_id,
    )
    .await?;
    Ok(Json(result))
}
