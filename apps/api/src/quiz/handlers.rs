//! Axum route handlers for the Quiz API.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::quiz::engine::{self, QuizStart, SubmitResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub quiz_id: Uuid,
    pub answer: String,
    pub max_questions: Option<u32>,
}

/// POST /api/v1/quiz/start
pub async fn handle_start_quiz(
    State(state): State<AppState>,
    Json(request): Json<StartQuizRequest>,
) -> Result<Json<QuizStart>, AppError> {
    let started = engine::start(
        state.store.as_ref(),
        state.llm.as_ref(),
        request.user_id,
        state.config.quiz_max_questions,
    )
    .await?;
    Ok(Json(started))
}

/// POST /api/v1/quiz/submit
///
/// Records the answer to the pending question and returns either the next
/// question or `done: true`.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitResult>, AppError> {
    if request.answer.trim().is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }

    let result = engine::submit(
        state.store.as_ref(),
        state.llm.as_ref(),
        request.quiz_id,
        request.answer.trim(),
        request.max_questions,
    )
    .await?;
    Ok(Json(result))
}
