//! Account and bearer-credential handling, delegated to the hosted auth service.
//!
//! `AppState` holds an `Arc<dyn AuthProvider>`: `AuthClient` in production.

pub mod client;
pub mod handlers;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub use client::AuthClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthIdentity {
    #[serde(rename = "id")]
    pub user_id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// A signed-in account: who it is plus the tokens the client keeps.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub identity: AuthIdentity,
    pub tokens: SessionTokens,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth service unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("an account with this email already exists")]
    AlreadyRegistered,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("invalid or expired access token")]
    InvalidToken,

    #[error("account created but no session was issued; confirm the email address and sign in")]
    SessionNotIssued,

    #[error("auth service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected auth service payload: {0}")]
    Payload(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AlreadyRegistered => {
                AppError::Conflict("User with this email already exists".to_string())
            }
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::InvalidToken => AppError::Unauthorized,
            AuthError::SessionNotIssued | AuthError::Rejected { .. } => {
                AppError::Validation(err.to_string())
            }
            AuthError::Payload(_) => AppError::UpstreamContract(err.to_string()),
            AuthError::Http(_) | AuthError::Unavailable { .. } => {
                AppError::UpstreamUnavailable(err.to_string())
            }
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AuthError>;

    /// Revokes the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    async fn verify(&self, access_token: &str) -> Result<AuthIdentity, AuthError>;
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verified caller identity. Rejects with 401 when the header is missing or
/// the token is refused.
pub struct AuthUser(pub AuthIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let identity = state.auth.verify(token).await?;
        Ok(AuthUser(identity))
    }
}

/// Identity for endpoints that also serve anonymous callers.
///
/// No `Authorization` header yields `None`. A header that is present must
/// verify: a malformed or refused credential rejects the request, and an
/// unreachable auth service surfaces as 503.
pub struct MaybeAuthUser(pub Option<AuthIdentity>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(MaybeAuthUser(None));
        }
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let identity = state.auth.verify(token).await?;
        Ok(MaybeAuthUser(Some(identity)))
    }
}
