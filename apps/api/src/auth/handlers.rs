//! Axum route handlers for accounts and the caller's identity.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{bearer_token, AuthIdentity, AuthSession, AuthUser, SessionTokens};
use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub profile_exists: bool,
}

#[derive(Debug, Serialize)]
pub struct UserProfileStatus {
    pub profile_exists: bool,
    pub profile: Option<Profile>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub profile_exists: bool,
    pub profile: Option<Profile>,
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if !email.contains('@') {
        return Err(AppError::Validation("email must be a valid address".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("password cannot be empty".to_string()));
    }
    Ok(())
}

/// A failed profile lookup only hides the onboarding hint; sign-in still succeeds.
async fn profile_exists(state: &AppState, user_id: Uuid) -> bool {
    match state.store.get_profile(user_id).await {
        Ok(profile) => profile.is_some(),
        Err(e) => {
            warn!("Profile lookup for {user_id} failed during sign-in: {e}");
            false
        }
    }
}

async fn auth_response(state: &AppState, session: AuthSession) -> AuthResponse {
    let AuthSession { identity, tokens } = session;
    AuthResponse {
        user_id: identity.user_id,
        profile_exists: profile_exists(state, identity.user_id).await,
        email: identity.email,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }
}

/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = request.email.trim();
    validate_credentials(email, &request.password)?;
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let session = state
        .auth
        .sign_up(email, &request.password, request.name.trim())
        .await?;
    Ok(Json(auth_response(&state, session).await))
}

/// POST /api/v1/auth/signin
pub async fn handle_signin(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = request.email.trim();
    validate_credentials(email, &request.password)?;

    let session = state.auth.sign_in(email, &request.password).await?;
    info!("User {} signed in", session.identity.user_id);
    Ok(Json(auth_response(&state, session).await))
}

/// POST /api/v1/auth/logout
///
/// Revokes the session of the bearer token sent with the request.
pub async fn handle_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    state.auth.sign_out(token).await?;
    Ok(Json(json!({ "message": "Successfully signed out" })))
}

/// POST /api/v1/auth/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    if request.refresh_token.trim().is_empty() {
        return Err(AppError::Unauthorized);
    }
    let tokens = state.auth.refresh(request.refresh_token.trim()).await?;
    Ok(Json(tokens))
}

/// GET /api/v1/auth/user/:user_id
pub async fn handle_user_status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfileStatus>, AppError> {
    let profile = state.store.get_profile(user_id).await?;
    Ok(Json(UserProfileStatus {
        profile_exists: profile.is_some(),
        profile,
    }))
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let AuthIdentity { user_id, email } = identity;
    let profile = state.store.get_profile(user_id).await?;

    Ok(Json(MeResponse {
        user_id,
        email,
        profile_exists: profile.is_some(),
        profile,
    }))
}
