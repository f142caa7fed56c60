//! Axum route handlers for the Profile API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::MaybeAuthUser;
use crate::errors::AppError;
use crate::models::profile::{Profile, ProfileInput};
use crate::models::quiz::Question;
use crate::pipeline::require_profile;
use crate::profile::validation::validate_profile;
use crate::quiz::engine;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileCreated {
    pub profile: Profile,
    pub quiz_id: Uuid,
    pub question: Question,
    pub question_number: u32,
    pub total_questions: u32,
}

/// POST /api/v1/profile
///
/// Identity comes from the bearer token when one is sent; anonymous callers
/// get a fresh id. A token that is sent but does not verify fails the request.
/// The first quiz question is returned with the profile.
pub async fn handle_create_profile(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Json(input): Json<ProfileInput>,
) -> Result<Json<ProfileCreated>, AppError> {
    validate_profile(&input)?;

    let user_id = caller
        .map(|identity| identity.user_id)
        .unwrap_or_else(Uuid::new_v4);

    if state.store.get_profile(user_id).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Profile for user {user_id} already exists"
        )));
    }

    let profile = Profile::from_input(user_id, input);
    state.store.insert_profile(&profile).await?;
    info!(
        "Created profile for user {} (class {})",
        user_id, profile.class_level
    );

    let started = engine::start_for_profile(
        state.store.as_ref(),
        state.llm.as_ref(),
        &profile,
        state.config.quiz_max_questions,
    )
    .await?;

    Ok(Json(ProfileCreated {
        profile,
        quiz_id: started.quiz_id,
        question: started.question,
        question_number: started.question_number,
        total_questions: started.total_questions,
    }))
}

/// GET /api/v1/profile/:user_id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Profile>, AppError> {
    let profile = require_profile(state.store.as_ref(), user_id).await?;
    Ok(Json(profile))
}

/// PUT /api/v1/profile/:user_id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<Profile>, AppError> {
    validate_profile(&input)?;

    let updated = Profile::from_input(user_id, input);
    if !state.store.update_profile(&updated).await? {
        return Err(AppError::NotFound(format!("Profile {user_id} not found")));
    }

    // Re-read to return the stored creation time.
    let profile = require_profile(state.store.as_ref(), user_id).await?;
    Ok(Json(profile))
}
