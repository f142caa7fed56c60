//! Guidance Store: the narrow repository seam over the hosted database.
//!
//! Every operation re-fetches current state by key; nothing is cached across
//! calls. Writes are upserts by key with last-write-wins semantics.
//!
//! `AppState` holds an `Arc<dyn GuidanceStore>`: `PgStore` in production,
//! `MemoryStore` in tests.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::profile::Profile;
use crate::models::quiz::QuizSession;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait GuidanceStore: Send + Sync {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    /// Replaces the mutable attributes. Returns false when no profile has this key.
    async fn update_profile(&self, profile: &Profile) -> Result<bool, StoreError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;

    async fn insert_quiz(&self, session: &QuizSession) -> Result<(), StoreError>;

    async fn update_quiz(&self, session: &QuizSession) -> Result<(), StoreError>;

    async fn get_quiz(&self, quiz_id: Uuid) -> Result<Option<QuizSession>, StoreError>;

    async fn upsert_colleges(&self, user_id: Uuid, colleges: &Value) -> Result<(), StoreError>;

    async fn upsert_timeline(&self, user_id: Uuid, timeline: &Value) -> Result<(), StoreError>;

    async fn get_timeline(&self, user_id: Uuid) -> Result<Option<Value>, StoreError>;
}
