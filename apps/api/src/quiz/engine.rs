//! Quiz State Machine: one adaptive quiz session from first question to completion.
//!
//! States: AwaitingFirstQuestion → InProgress → Complete.
//!
//! Question generation never fails past this module: any generator error or
//! shape violation is replaced by the fallback question for that position.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::fill_template;
use crate::llm_client::{generate_json, LlmError, TextGenerator};
use crate::models::profile::Profile;
use crate::models::quiz::{
    Question, QuestionSource, QuizSession, QuizState, QuizTurn, MULTIPLE_CHOICE,
    OPTIONS_PER_QUESTION,
};
use crate::pipeline::require_profile;
use crate::quiz::fallback::fallback_question;
use crate::quiz::prompts::{FIRST_QUESTION_NOTE, QUESTION_PROMPT_TEMPLATE, QUESTION_SYSTEM};
use crate::store::GuidanceStore;

// ────────────────────────────────────────────────────────────────────────────
// Session transitions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("quiz {0} is already complete")]
    AlreadyComplete(Uuid),

    #[error("quiz {0} has no pending question")]
    NoPendingQuestion(Uuid),
}

impl From<QuizError> for AppError {
    fn from(err: QuizError) -> Self {
        AppError::Conflict(err.to_string())
    }
}

/// What happens after an answer is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Finished,
    NeedsNext { next_number: u32 },
}

impl QuizSession {
    pub fn new(user_id: Uuid, total_questions: u32, source: QuestionSource) -> Self {
        QuizSession {
            id: Uuid::new_v4(),
            user_id,
            history: Vec::new(),
            current_question: None,
            question_count: 0,
            total_questions,
            state: QuizState::AwaitingFirstQuestion,
            source,
            created_at: Utc::now(),
        }
    }

    /// Makes `question` the pending one. Returns its 1-based number.
    pub fn issue(&mut self, question: Question) -> Result<u32, QuizError> {
        if self.state == QuizState::Complete {
            return Err(QuizError::AlreadyComplete(self.id));
        }
        self.question_count += 1;
        self.current_question = Some(question);
        self.state = QuizState::InProgress;
        Ok(self.question_count)
    }

    /// Appends the pending question and its answer to the history. The
    /// session completes once `max_questions` answers have been recorded.
    pub fn record_answer(
        &mut self,
        answer: &str,
        max_questions: u32,
    ) -> Result<AnswerOutcome, QuizError> {
        if self.state == QuizState::Complete {
            return Err(QuizError::AlreadyComplete(self.id));
        }
        let question = self
            .current_question
            .take()
            .ok_or(QuizError::NoPendingQuestion(self.id))?;

        self.history.push(QuizTurn {
            question,
            answer: answer.to_string(),
            question_number: self.question_count,
        });

        if self.question_count >= max_questions {
            self.state = QuizState::Complete;
            Ok(AnswerOutcome::Finished)
        } else {
            Ok(AnswerOutcome::NeedsNext {
                next_number: self.question_count + 1,
            })
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == QuizState::Complete
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Question generation
// ────────────────────────────────────────────────────────────────────────────

/// Profile attributes embedded in the question prompt.
fn profile_context(profile: &Profile) -> serde_json::Value {
    serde_json::json!({
        "class_level": profile.class_level,
        "stream": profile.stream,
        "age": profile.age,
        "gender": profile.gender,
        "language_preference": profile.language_preference,
        "budget_range": profile.budget_range,
        "reservation_category": profile.reservation_category,
        "mobility": profile.mobility,
        "location": profile.location,
    })
}

/// "Q{n}: {text} - Answer: {answer}" per turn, one per line.
pub fn render_transcript(history: &[QuizTurn]) -> String {
    if history.is_empty() {
        return FIRST_QUESTION_NOTE.to_string();
    }
    let lines: Vec<String> = history
        .iter()
        .map(|turn| {
            format!(
                "Q{}: {} - Answer: {}",
                turn.question_number, turn.question.text, turn.answer
            )
        })
        .collect();
    format!("Previous Q&A:\n{}", lines.join("\n"))
}

pub fn build_question_prompt(profile: &Profile, history: &[QuizTurn], position: u32) -> String {
    let profile_json = profile_context(profile).to_string();
    let transcript = render_transcript(history);
    let position = position.to_string();
    fill_template(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("profile_json", profile_json.as_str()),
            ("transcript", transcript.as_str()),
            ("language", profile.language_preference.as_str()),
            ("position", position.as_str()),
        ],
    )
}

/// Rejects anything that is not a 4-option multiple-choice question with visible text.
pub fn validate_question(question: Question) -> Result<Question, LlmError> {
    if question.kind != MULTIPLE_CHOICE {
        return Err(LlmError::Contract(format!(
            "question type must be \"{MULTIPLE_CHOICE}\", got \"{}\"",
            question.kind
        )));
    }
    if question.options.len() != OPTIONS_PER_QUESTION {
        return Err(LlmError::Contract(format!(
            "question must have exactly {OPTIONS_PER_QUESTION} options, got {}",
            question.options.len()
        )));
    }
    if question.text.trim().is_empty() {
        return Err(LlmError::Contract("question text is empty".to_string()));
    }
    Ok(question)
}

async fn generate_question(
    llm: &dyn TextGenerator,
    profile: &Profile,
    history: &[QuizTurn],
    position: u32,
) -> Result<Question, LlmError> {
    let prompt = build_question_prompt(profile, history, position);
    let question: Question = generate_json(llm, &prompt, QUESTION_SYSTEM).await?;
    validate_question(question)
}

/// Generated question for `position`, or the fallback for that position.
pub async fn next_question(
    llm: &dyn TextGenerator,
    profile: &Profile,
    history: &[QuizTurn],
    position: u32,
) -> (Question, QuestionSource) {
    match generate_question(llm, profile, history, position).await {
        Ok(question) => (question, QuestionSource::Gemini),
        Err(e) => {
            warn!(
                "Question {position} generation failed for user {}: {e}. Using fallback.",
                profile.user_id
            );
            (fallback_question(position), QuestionSource::Fallback)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct QuizStart {
    pub quiz_id: Uuid,
    pub question: Question,
    pub question_number: u32,
    pub total_questions: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResult {
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_number: Option<u32>,
    pub total_questions: u32,
}

/// Starts a session for an existing profile.
pub async fn start_for_profile(
    store: &dyn GuidanceStore,
    llm: &dyn TextGenerator,
    profile: &Profile,
    total_questions: u32,
) -> Result<QuizStart, AppError> {
    let (question, source) = next_question(llm, profile, &[], 1).await;

    let mut session = QuizSession::new(profile.user_id, total_questions, source);
    let question_number = session.issue(question.clone())?;
    store.insert_quiz(&session).await?;

    info!(
        "Quiz {} started for user {} (source: {})",
        session.id,
        profile.user_id,
        source.as_str()
    );

    Ok(QuizStart {
        quiz_id: session.id,
        question,
        question_number,
        total_questions,
    })
}

/// startQuiz
pub async fn start(
    store: &dyn GuidanceStore,
    llm: &dyn TextGenerator,
    user_id: Uuid,
    total_questions: u32,
) -> Result<QuizStart, AppError> {
    let profile = require_profile(store, user_id).await?;
    start_for_profile(store, llm, &profile, total_questions).await
}

/// submitAnswer. `max_questions` overrides the session's length when present.
pub async fn submit(
    store: &dyn GuidanceStore,
    llm: &dyn TextGenerator,
    quiz_id: Uuid,
    answer: &str,
    max_questions: Option<u32>,
) -> Result<SubmitResult, AppError> {
    if max_questions == Some(0) {
        return Err(AppError::Validation(
            "max_questions must be at least 1".to_string(),
        ));
    }

    let mut session = store
        .get_quiz(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz {quiz_id} not found")))?;
    if session.is_complete() {
        return Err(QuizError::AlreadyComplete(quiz_id).into());
    }

    if let Some(max) = max_questions {
        session.total_questions = max;
    }
    let total_questions = session.total_questions;

    match session.record_answer(answer, total_questions)? {
        AnswerOutcome::Finished => {
            store.update_quiz(&session).await?;
            info!(
                "Quiz {quiz_id} complete after {} answers",
                session.history.len()
            );
            Ok(SubmitResult {
                done: true,
                question: None,
                question_number: None,
                total_questions,
            })
        }
        AnswerOutcome::NeedsNext { next_number } => {
            let profile = require_profile(store, session.user_id).await?;
            let (question, _) = next_question(llm, &profile, &session.history, next_number).await;
            let question_number = session.issue(question.clone())?;
            store.update_quiz(&session).await?;
            Ok(SubmitResult {
                done: false,
                question: Some(question),
                question_number: Some(question_number),
                total_questions,
            })
        }
    }
}
