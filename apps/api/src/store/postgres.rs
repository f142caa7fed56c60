use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::profile::{Profile, ProfileRow};
use crate::models::quiz::{QuizRow, QuizSession};
use crate::store::{GuidanceStore, StoreError};

/// PostgreSQL-backed store. Documents live in JSONB columns keyed by user or quiz id.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuidanceStore for PgStore {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profiles
                (user_id, name, age, gender, class_level, stream, location,
                 language_preference, budget_range, reservation_category, mobility, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.name)
        .bind(profile.age as i16)
        .bind(&profile.gender)
        .bind(profile.class_level as i16)
        .bind(&profile.stream)
        .bind(Json(&profile.location))
        .bind(&profile.language_preference)
        .bind(&profile.budget_range)
        .bind(&profile.reservation_category)
        .bind(&profile.mobility)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_profile(&self, profile: &Profile) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                name = $2, age = $3, gender = $4, class_level = $5, stream = $6,
                location = $7, language_preference = $8, budget_range = $9,
                reservation_category = $10, mobility = $11
            WHERE user_id = $1
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.name)
        .bind(profile.age as i16)
        .bind(&profile.gender)
        .bind(profile.class_level as i16)
        .bind(&profile.stream)
        .bind(Json(&profile.location))
        .bind(&profile.language_preference)
        .bind(&profile.budget_range)
        .bind(&profile.reservation_category)
        .bind(&profile.mobility)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| Profile::try_from(r).map_err(|e| StoreError::Corrupt(e.to_string())))
            .transpose()
    }

    async fn insert_quiz(&self, session: &QuizSession) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO quizzes (id, user_id, quiz_json, source, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(Json(session.document()))
        .bind(session.source.as_str())
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_quiz(&self, session: &QuizSession) -> Result<(), StoreError> {
        sqlx::query("UPDATE quizzes SET quiz_json = $2 WHERE id = $1")
            .bind(session.id)
            .bind(Json(session.document()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_quiz(&self, quiz_id: Uuid) -> Result<Option<QuizSession>, StoreError> {
        let row = sqlx::query_as::<_, QuizRow>("SELECT * FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(QuizSession::from))
    }

    async fn upsert_colleges(&self, user_id: Uuid, colleges: &Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO colleges (user_id, colleges_json, source, updated_at)
            VALUES ($1, $2, 'college_api', now())
            ON CONFLICT (user_id)
            DO UPDATE SET colleges_json = EXCLUDED.colleges_json, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(colleges)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_timeline(&self, user_id: Uuid, timeline: &Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO timelines (user_id, timeline_json, source, updated_at)
            VALUES ($1, $2, 'timeline_agent', now())
            ON CONFLICT (user_id)
            DO UPDATE SET timeline_json = EXCLUDED.timeline_json, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(timeline)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_timeline(&self, user_id: Uuid) -> Result<Option<Value>, StoreError> {
        Ok(
            sqlx::query_scalar::<_, Value>("SELECT timeline_json FROM timelines WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}
