//! In-memory fakes for the collaborator seams, shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::{AuthError, AuthIdentity, AuthProvider, AuthSession, SessionTokens};
use crate::colleges::dataset::{CollegeDataset, CollegeRecord, DatasetError};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::profile::{Location, Profile};

enum Reply {
    Text(String),
    Unavailable,
}

/// Replays queued replies in order. An exhausted script answers "unavailable".
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.push(Reply::Text(text.into()));
        self
    }

    pub fn then_json(self, value: Value) -> Self {
        self.then_text(value.to_string())
    }

    pub fn then_unavailable(self) -> Self {
        self.push(Reply::Unavailable);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }

    fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Unavailable) | None => Err(LlmError::Api {
                status: 503,
                message: "scripted outage".to_string(),
            }),
        }
    }
}

/// Serves dataset files from memory. Unknown files answer 404.
#[derive(Default)]
pub struct StaticDataset {
    files: HashMap<String, Option<Vec<CollegeRecord>>>,
    fetches: AtomicUsize,
}

impl StaticDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, filename: &str, rows: Value) -> Self {
        let records = match rows {
            Value::Array(rows) => rows
                .into_iter()
                .filter_map(|r| match r {
                    Value::Object(o) => Some(o),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        self.files.insert(filename.to_string(), Some(records));
        self
    }

    /// Every fetch of this file fails as if the host were unreachable.
    pub fn with_broken_file(mut self, filename: &str) -> Self {
        self.files.insert(filename.to_string(), None);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollegeDataset for StaticDataset {
    async fn fetch(&self, filename: &str) -> Result<Vec<CollegeRecord>, DatasetError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.files.get(filename) {
            Some(Some(records)) => Ok(records.clone()),
            Some(None) => Err(DatasetError::Status {
                filename: filename.to_string(),
                status: 503,
            }),
            None => Err(DatasetError::Status {
                filename: filename.to_string(),
                status: 404,
            }),
        }
    }
}

/// Accounts and sessions held in memory. Tokens are opaque random strings.
#[derive(Default)]
pub struct StaticAuth {
    accounts: Mutex<HashMap<String, (String, AuthIdentity)>>,
    access: Mutex<HashMap<String, AuthIdentity>>,
    refresh: Mutex<HashMap<String, AuthIdentity>>,
    outage: bool,
}

impl StaticAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the auth service answered 503.
    pub fn unreachable() -> Self {
        Self {
            outage: true,
            ..Self::default()
        }
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        let identity = AuthIdentity {
            user_id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), identity));
        self
    }

    /// Issues a live access token for `identity`.
    pub fn session_for(&self, identity: &AuthIdentity) -> SessionTokens {
        let tokens = SessionTokens {
            access_token: format!("access-{}", Uuid::new_v4()),
            refresh_token: format!("refresh-{}", Uuid::new_v4()),
        };
        self.access
            .lock()
            .unwrap()
            .insert(tokens.access_token.clone(), identity.clone());
        self.refresh
            .lock()
            .unwrap()
            .insert(tokens.refresh_token.clone(), identity.clone());
        tokens
    }

    fn check_outage(&self) -> Result<(), AuthError> {
        if self.outage {
            return Err(AuthError::Unavailable {
                status: 503,
                message: "scripted outage".to_string(),
            });
        }
        Ok(())
    }

    fn open_session(&self, identity: AuthIdentity) -> AuthSession {
        let tokens = self.session_for(&identity);
        AuthSession { identity, tokens }
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _name: &str,
    ) -> Result<AuthSession, AuthError> {
        self.check_outage()?;
        let identity = {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                return Err(AuthError::AlreadyRegistered);
            }
            let identity = AuthIdentity {
                user_id: Uuid::new_v4(),
                email: Some(email.to_string()),
            };
            accounts.insert(email.to_string(), (password.to_string(), identity.clone()));
            identity
        };
        Ok(self.open_session(identity))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.check_outage()?;
        let identity = match self.accounts.lock().unwrap().get(email) {
            Some((stored, identity)) if stored == password => identity.clone(),
            _ => return Err(AuthError::InvalidCredentials),
        };
        Ok(self.open_session(identity))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AuthError> {
        self.check_outage()?;
        let identity = self
            .refresh
            .lock()
            .unwrap()
            .remove(refresh_token)
            .ok_or(AuthError::InvalidRefreshToken)?;
        Ok(self.session_for(&identity))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.check_outage()?;
        self.access
            .lock()
            .unwrap()
            .remove(access_token)
            .map(|_| ())
            .ok_or(AuthError::InvalidToken)
    }

    async fn verify(&self, access_token: &str) -> Result<AuthIdentity, AuthError> {
        self.check_outage()?;
        self.access
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// A Bangalore student at the given class level.
pub fn profile(class_level: u8) -> Profile {
    Profile {
        user_id: Uuid::new_v4(),
        name: "Asha".to_string(),
        age: 14 + class_level.saturating_sub(9),
        gender: "female".to_string(),
        class_level,
        stream: (class_level >= 11).then(|| "Science (PCM)".to_string()),
        location: Location {
            state: "Karnataka".to_string(),
            city: "Bangalore".to_string(),
        },
        language_preference: "English".to_string(),
        budget_range: "1-3 lakh".to_string(),
        reservation_category: "General".to_string(),
        mobility: "within_state".to_string(),
        created_at: Utc::now(),
    }
}

/// A shape-valid generated question.
pub fn question_json(id: &str) -> Value {
    serde_json::json!({
        "id": id,
        "type": "mcq",
        "text": format!("Generated question {id}"),
        "options": ["A", "B", "C", "D"],
        "language": "English"
    })
}

/// `n` dataset rows located in the given state/city.
pub fn college_rows(prefix: &str, n: usize, state: &str, city: &str) -> Vec<Value> {
    (0..n)
        .map(|i| {
            serde_json::json!({
                "name": format!("{prefix} College {i}"),
                "state": state,
                "city": city,
                "rank": i + 1
            })
        })
        .collect()
}
