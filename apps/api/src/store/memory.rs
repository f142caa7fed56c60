use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::profile::Profile;
use crate::models::quiz::QuizSession;
use crate::store::{GuidanceStore, StoreError};

/// In-process store with the same semantics as `PgStore`. Used by tests.
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<Uuid, Profile>>,
    quizzes: RwLock<HashMap<Uuid, QuizSession>>,
    colleges: RwLock<HashMap<Uuid, Value>>,
    timelines: RwLock<HashMap<Uuid, Value>>,
    /// When set, every document write (colleges, timelines) fails.
    fail_document_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_document_writes(&self, fail: bool) {
        self.fail_document_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn stored_colleges(&self, user_id: Uuid) -> Option<Value> {
        self.colleges.read().await.get(&user_id).cloned()
    }

    fn check_document_write(&self) -> Result<(), StoreError> {
        if self.fail_document_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl GuidanceStore for MemoryStore {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn update_profile(&self, profile: &Profile) -> Result<bool, StoreError> {
        let mut profiles = self.profiles.write().await;
        match profiles.get_mut(&profile.user_id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = profile.clone();
                existing.created_at = created_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn insert_quiz(&self, session: &QuizSession) -> Result<(), StoreError> {
        self.quizzes
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn update_quiz(&self, session: &QuizSession) -> Result<(), StoreError> {
        if let Some(existing) = self.quizzes.write().await.get_mut(&session.id) {
            *existing = session.clone();
        }
        Ok(())
    }

    async fn get_quiz(&self, quiz_id: Uuid) -> Result<Option<QuizSession>, StoreError> {
        Ok(self.quizzes.read().await.get(&quiz_id).cloned())
    }

    async fn upsert_colleges(&self, user_id: Uuid, colleges: &Value) -> Result<(), StoreError> {
        self.check_document_write()?;
        self.colleges
            .write()
            .await
            .insert(user_id, colleges.clone());
        Ok(())
    }

    async fn upsert_timeline(&self, user_id: Uuid, timeline: &Value) -> Result<(), StoreError> {
        self.check_document_write()?;
        self.timelines
            .write()
            .await
            .insert(user_id, timeline.clone());
        Ok(())
    }

    async fn get_timeline(&self, user_id: Uuid) -> Result<Option<Value>, StoreError> {
        Ok(self.timelines.read().await.get(&user_id).cloned())
    }
}
