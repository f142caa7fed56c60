//! `AuthProvider` over the hosted auth REST API (`{SUPABASE_URL}/auth/v1/*`).

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::{AuthError, AuthIdentity, AuthProvider, AuthSession, SessionTokens};

/// Which call failed; the same status means different things per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthCall {
    SignUp,
    SignIn,
    Refresh,
    SignOut,
    Verify,
}

/// Token grant reply. Sign-up without auto-confirm returns a bare user, so
/// every part is optional.
#[derive(Debug, Deserialize)]
struct SessionReply {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<AuthIdentity>,
}

impl SessionReply {
    fn into_session(self) -> Result<AuthSession, AuthError> {
        match (self.access_token, self.refresh_token, self.user) {
            (Some(access_token), Some(refresh_token), Some(identity)) => Ok(AuthSession {
                identity,
                tokens: SessionTokens {
                    access_token,
                    refresh_token,
                },
            }),
            _ => Err(AuthError::SessionNotIssued),
        }
    }
}

#[derive(Clone)]
pub struct AuthClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn new(base_url: &str, api_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    async fn post_json(
        &self,
        call: AuthCall,
        path: &str,
        body: &Value,
    ) -> Result<Response, AuthError> {
        let response = self
            .http
            .post(self.url(path))
            .header("apikey", &self.api_key)
            .json(body)
            .send()
            .await?;
        ensure_success(call, response).await
    }

    async fn grant(
        &self,
        call: AuthCall,
        grant_type: &str,
        body: Value,
    ) -> Result<AuthSession, AuthError> {
        let response = self
            .post_json(call, &format!("token?grant_type={grant_type}"), &body)
            .await?;
        read_session(response).await
    }
}

async fn ensure_success(call: AuthCall, response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("Auth service rejected {call:?} with {status}");
    Err(classify_failure(call, status, &body))
}

async fn read_session(response: Response) -> Result<AuthSession, AuthError> {
    response
        .json::<SessionReply>()
        .await
        .map_err(|e| AuthError::Payload(e.to_string()))?
        .into_session()
}

/// Human-readable message from a GoTrue error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["msg", "error_description", "message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn classify_failure(call: AuthCall, status: StatusCode, body: &str) -> AuthError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return AuthError::Unavailable {
            status: status.as_u16(),
            message: error_message(body),
        };
    }

    let lowered = body.to_lowercase();
    let already_registered =
        lowered.contains("already registered") || lowered.contains("user_already_exists");
    match call {
        AuthCall::SignUp if already_registered => AuthError::AlreadyRegistered,
        AuthCall::SignUp => AuthError::Rejected {
            status: status.as_u16(),
            message: error_message(body),
        },
        AuthCall::SignIn => AuthError::InvalidCredentials,
        AuthCall::Refresh => AuthError::InvalidRefreshToken,
        AuthCall::SignOut | AuthCall::Verify => AuthError::InvalidToken,
    }
}

#[async_trait]
impl AuthProvider for AuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "name": name }
        });
        let response = self.post_json(AuthCall::SignUp, "signup", &body).await?;
        let session = read_session(response).await?;
        info!("Registered account {}", session.identity.user_id);
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = json!({ "email": email, "password": password });
        self.grant(AuthCall::SignIn, "password", body).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AuthError> {
        let body = json!({ "refresh_token": refresh_token });
        let session = self.grant(AuthCall::Refresh, "refresh_token", body).await?;
        Ok(session.tokens)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        ensure_success(AuthCall::SignOut, response).await?;
        Ok(())
    }

    async fn verify(&self, access_token: &str) -> Result<AuthIdentity, AuthError> {
        let response = self
            .http
            .get(self.url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        ensure_success(AuthCall::Verify, response)
            .await?
            .json::<AuthIdentity>()
            .await
            .map_err(|e| AuthError::Payload(e.to_string()))
    }
}
