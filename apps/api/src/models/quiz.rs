use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Number of options every multiple-choice question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// The only question type the quiz serves.
pub const MULTIPLE_CHOICE: &str = "mcq";

/// A single multiple-choice quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub options: Vec<String>,
    pub language: String,
}

/// One answered question. `question_number` starts at 1 and increases by 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizTurn {
    pub question: Question,
    pub answer: String,
    pub question_number: u32,
}

/// Lifecycle of a quiz session. There is no cancelled state: an abandoned
/// session simply stops being advanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    #[default]
    AwaitingFirstQuestion,
    InProgress,
    Complete,
}

/// Where the first question of a session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Gemini,
    Fallback,
}

impl QuestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionSource::Gemini => "gemini",
            QuestionSource::Fallback => "fallback",
        }
    }
}

/// A quiz session as the core sees it. Owned by the store; re-fetched on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub history: Vec<QuizTurn>,
    /// None before the first question and after completion.
    pub current_question: Option<Question>,
    pub question_count: u32,
    pub total_questions: u32,
    pub state: QuizState,
    pub source: QuestionSource,
    pub created_at: DateTime<Utc>,
}

/// The mutable part of a session, persisted as the `quiz_json` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDocument {
    #[serde(default)]
    pub history: Vec<QuizTurn>,
    pub current_question: Option<Question>,
    #[serde(default)]
    pub question_count: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub state: QuizState,
}

#[derive(Debug, Clone, FromRow)]
pub struct QuizRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_json: Json<QuizDocument>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl QuizSession {
    pub fn document(&self) -> QuizDocument {
        QuizDocument {
            history: self.history.clone(),
            current_question: self.current_question.clone(),
            question_count: self.question_count,
            total_questions: self.total_questions,
            state: self.state,
        }
    }
}

impl From<QuizRow> for QuizSession {
    fn from(row: QuizRow) -> Self {
        let doc = row.quiz_json.0;
        let source = if row.source == QuestionSource::Gemini.as_str() {
            QuestionSource::Gemini
        } else {
            QuestionSource::Fallback
        };
        QuizSession {
            id: row.id,
            user_id: row.user_id,
            history: doc.history,
            current_question: doc.current_question,
            question_count: doc.question_count,
            total_questions: doc.total_questions,
            state: doc.state,
            source,
            created_at: row.created_at,
        }
    }
}
