use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Where the student lives. Both parts drive the college location filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
}

/// A student's static attributes. Immutable for the duration of a quiz session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub name: String,
    pub age: u8,
    pub gender: String,
    /// 9–12. Drives the stream (9, 10) vs course (11, 12) branch.
    pub class_level: u8,
    /// Populated once class_level ≥ 11.
    pub stream: Option<String>,
    pub location: Location,
    pub language_preference: String,
    pub budget_range: String,
    pub reservation_category: String,
    pub mobility: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Class 9 and 10 students get stream guidance, everyone else course guidance.
    pub fn wants_streams(&self) -> bool {
        matches!(self.class_level, 9 | 10)
    }

    pub fn from_input(user_id: Uuid, input: ProfileInput) -> Self {
        Self {
            user_id,
            name: input.name,
            age: input.age,
            gender: input.gender,
            class_level: input.class_level,
            stream: input.stream,
            location: input.location,
            language_preference: input.language_preference,
            budget_range: input.budget_range,
            reservation_category: input.reservation_category,
            mobility: input.mobility,
            created_at: Utc::now(),
        }
    }
}

/// Request body for profile create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub age: u8,
    pub gender: String,
    pub class_level: u8,
    pub stream: Option<String>,
    pub location: Location,
    pub language_preference: String,
    pub budget_range: String,
    pub reservation_category: String,
    pub mobility: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub user_id: Uuid,
    pub name: String,
    pub age: i16,
    pub gender: String,
    pub class_level: i16,
    pub stream: Option<String>,
    pub location: Json<Location>,
    pub language_preference: String,
    pub budget_range: String,
    pub reservation_category: String,
    pub mobility: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = anyhow::Error;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            user_id: row.user_id,
            name: row.name,
            age: u8::try_from(row.age)?,
            gender: row.gender,
            class_level: u8::try_from(row.class_level)?,
            stream: row.stream,
            location: row.location.0,
            language_preference: row.language_preference,
            budget_range: row.budget_range,
            reservation_category: row.reservation_category,
            mobility: row.mobility,
            created_at: row.created_at,
        })
    }
}
