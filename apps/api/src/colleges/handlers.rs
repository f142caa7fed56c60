//! Axum route handlers for the College API.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::colleges::aggregator::{search_colleges, CollegeBundle, CollegeSearch};
use crate::errors::AppError;
use crate::pipeline::fetch_colleges;
use crate::recommend::handlers::GuidanceRequest;
use crate::state::AppState;

/// POST /api/v1/colleges
pub async fn handle_colleges(
    State(state): State<AppState>,
    Json(request): Json<GuidanceRequest>,
) -> Result<Json<CollegeBundle>, AppError> {
    let bundle = fetch_colleges(
        state.store.as_ref(),
        state.llm.as_ref(),
        state.dataset.as_ref(),
        request.user_id,
        request.quiz_id,
    )
    .await?;
    Ok(Json(bundle))
}

/// GET /api/v1/colleges/search/:field/:location_type/:location
pub async fn handle_search_colleges(
    State(state): State<AppState>,
    Path((field, location_type, location)): Path<(String, String, String)>,
) -> Result<Json<CollegeSearch>, AppError> {
    let result = search_colleges(state.dataset.as_ref(), &field, &location_type, &location).await?;
    Ok(Json(result))
}
