//! Recommendation Synthesizer: streams for class 9–10, courses and careers for 11–12.
//!
//! The generated reply must satisfy the path's required keys. A reply that does
//! not parse is surfaced to the caller as an upstream contract violation; there
//! is no fallback at this stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::colleges::field_mapper::{map_courses, map_streams, FieldSet};
use crate::errors::AppError;
use crate::llm_client::prompts::{
    fill_template, render_profile_block, COUNSELOR_PERSONA, JSON_ONLY_SYSTEM,
};
use crate::llm_client::{generate_json, LlmError, TextGenerator};
use crate::models::profile::Profile;
use crate::models::quiz::{QuizSession, QuizTurn};
use crate::pipeline::{require_profile, require_session};
use crate::recommend::catalog::{course_resources, stream_careers, stream_courses, Resource};
use crate::recommend::prompts::{COURSE_PROMPT_TEMPLATE, STREAM_PROMPT_TEMPLATE};
use crate::store::GuidanceStore;

/// Generated lists are cut to this length.
pub const MAX_RECOMMENDATIONS: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Generated reply contracts
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StreamReply {
    streams: Vec<String>,
    reasons: BTreeMap<String, String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CourseReply {
    courses: Vec<String>,
    careers: BTreeMap<String, Vec<String>>,
    reasons: BTreeMap<String, String>,
    message: String,
}

fn top_names(mut names: Vec<String>, key: &str) -> Result<Vec<String>, LlmError> {
    names.retain(|name| !name.trim().is_empty());
    if names.is_empty() {
        return Err(LlmError::Contract(format!("'{key}' list is empty")));
    }
    names.truncate(MAX_RECOMMENDATIONS);
    Ok(names)
}

// ────────────────────────────────────────────────────────────────────────────
// Result types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamPath {
    pub courses: Vec<String>,
    pub example_careers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRecommendation {
    pub streams: Vec<String>,
    pub reasons: BTreeMap<String, String>,
    pub detailed_paths: BTreeMap<String, StreamPath>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub courses: Vec<String>,
    pub careers: BTreeMap<String, Vec<String>>,
    pub reasons: BTreeMap<String, String>,
    pub additional_resources: BTreeMap<String, Vec<Resource>>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecommendationResult {
    Streams(StreamRecommendation),
    Courses(CourseRecommendation),
}

impl RecommendationResult {
    pub fn streams(&self) -> &[String] {
        match self {
            RecommendationResult::Streams(r) => &r.streams,
            RecommendationResult::Courses(_) => &[],
        }
    }

    pub fn courses(&self) -> &[String] {
        match self {
            RecommendationResult::Streams(_) => &[],
            RecommendationResult::Courses(r) => &r.courses,
        }
    }

    /// Streams or courses, whichever this variant carries.
    pub fn names(&self) -> &[String] {
        match self {
            RecommendationResult::Streams(r) => &r.streams,
            RecommendationResult::Courses(r) => &r.courses,
        }
    }

    pub fn reasons(&self) -> &BTreeMap<String, String> {
        match self {
            RecommendationResult::Streams(r) => &r.reasons,
            RecommendationResult::Courses(r) => &r.reasons,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RecommendationResult::Streams(r) => &r.message,
            RecommendationResult::Courses(r) => &r.message,
        }
    }

    pub fn fields(&self) -> FieldSet {
        match self {
            RecommendationResult::Streams(r) => map_streams(r.streams.as_slice()),
            RecommendationResult::Courses(r) => map_courses(r.courses.as_slice()),
        }
    }
}

/// One answered question as embedded in prompts.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub question: String,
    pub answer: String,
    pub question_number: u32,
}

pub fn flatten_history(history: &[QuizTurn]) -> Vec<TranscriptEntry> {
    history
        .iter()
        .map(|turn| TranscriptEntry {
            question: turn.question.text.clone(),
            answer: turn.answer.clone(),
            question_number: turn.question_number,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Synthesis
// ────────────────────────────────────────────────────────────────────────────

fn build_prompt(profile: &Profile, session: &QuizSession) -> Result<String, serde_json::Error> {
    let quiz_responses = serde_json::to_string_pretty(&flatten_history(&session.history))?;
    let template = if profile.wants_streams() {
        STREAM_PROMPT_TEMPLATE
    } else {
        COURSE_PROMPT_TEMPLATE
    };
    let class_level = profile.class_level.to_string();
    let profile_block = render_profile_block(profile);
    Ok(fill_template(
        template,
        &[
            ("persona", COUNSELOR_PERSONA),
            ("class_level", class_level.as_str()),
            ("stream", profile.stream.as_deref().unwrap_or("Not specified")),
            ("profile_block", profile_block.as_str()),
            ("quiz_responses", quiz_responses.as_str()),
        ],
    ))
}

async fn recommend_streams(
    llm: &dyn TextGenerator,
    prompt: &str,
) -> Result<StreamRecommendation, LlmError> {
    let reply: StreamReply = generate_json(llm, prompt, JSON_ONLY_SYSTEM).await?;
    let streams = top_names(reply.streams, "streams")?;

    let detailed_paths = streams
        .iter()
        .map(|stream| {
            let path = StreamPath {
                courses: stream_courses(stream),
                example_careers: stream_careers(stream),
            };
            (stream.clone(), path)
        })
        .collect();

    Ok(StreamRecommendation {
        streams,
        reasons: reply.reasons,
        detailed_paths,
        message: reply.message,
    })
}

async fn recommend_courses(
    llm: &dyn TextGenerator,
    prompt: &str,
) -> Result<CourseRecommendation, LlmError> {
    let reply: CourseReply = generate_json(llm, prompt, JSON_ONLY_SYSTEM).await?;
    let courses = top_names(reply.courses, "courses")?;

    let additional_resources = courses
        .iter()
        .map(|course| {
            let careers = reply.careers.get(course).map(Vec::as_slice).unwrap_or(&[]);
            (course.clone(), course_resources(course, careers))
        })
        .collect();

    Ok(CourseRecommendation {
        courses,
        careers: reply.careers,
        reasons: reply.reasons,
        additional_resources,
        message: reply.message,
    })
}

/// Branches on class level and asks the generator for a recommendation.
pub async fn synthesize(
    llm: &dyn TextGenerator,
    profile: &Profile,
    session: &QuizSession,
) -> Result<RecommendationResult, AppError> {
    let prompt = build_prompt(profile, session).map_err(|e| AppError::Internal(e.into()))?;

    let result = if profile.wants_streams() {
        RecommendationResult::Streams(recommend_streams(llm, &prompt).await?)
    } else {
        RecommendationResult::Courses(recommend_courses(llm, &prompt).await?)
    };

    info!(
        "Recommendations for user {} (quiz {}): {:?}",
        profile.user_id,
        session.id,
        result.names()
    );
    Ok(result)
}

/// getRecommendations
pub async fn fetch_recommendations(
    store: &dyn GuidanceStore,
    llm: &dyn TextGenerator,
    user_id: Uuid,
    quiz_id: Uuid,
) -> Result<RecommendationResult, AppError> {
    let profile = require_profile(store, user_id).await?;
    let session = require_session(store, user_id, quiz_id).await?;
    synthesize(llm, &profile, &session).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colleges::field_mapper::FieldTag;
    use crate::models::quiz::QuestionSource;
    use crate::quiz::fallback::fallback_question;
    use crate::store::MemoryStore;
    use crate::testing::{profile, ScriptedGenerator};
    use serde_json::json;

    fn answered_session(profile: &Profile) -> QuizSession {
        let mut session = QuizSession::new(profile.user_id, 2, QuestionSource::Fallback);
        session.issue(fallback_question(1)).unwrap();
        session.record_answer("Mathematics", 2).unwrap();
        session.issue(fallback_question(2)).unwrap();
        session.record_answer("Laboratory", 2).unwrap();
        session
    }

    async fn seeded(class_level: u8) -> (MemoryStore, Profile, QuizSession) {
        let store = MemoryStore::new();
        let student = profile(class_level);
        let session = answered_session(&student);
        store.insert_profile(&student).await.unwrap();
        store.insert_quiz(&session).await.unwrap();
        (store, student, session)
    }

    #[tokio::test]
    async fn test_class_10_gets_streams_with_paths() {
        let (store, student, session) = seeded(10).await;
        let llm = ScriptedGenerator::new().then_text(format!(
            "```json\n{}\n```",
            json!({
                "streams": [
                    "Science (PCM)",
                    "Commerce",
                    "Arts/Humanities",
                    "Vocational/Skill-based courses"
                ],
                "reasons": {"Science (PCM)": "Strong in maths"},
                "message": "Great options"
            })
        ));

        let result = fetch_recommendations(&store, &llm, student.user_id, session.id)
            .await
            .unwrap();

        let RecommendationResult::Streams(streams) = &result else {
            panic!("expected streams, got {result:?}");
        };
        assert_eq!(streams.streams.len(), MAX_RECOMMENDATIONS);
        assert_eq!(
            streams.detailed_paths["Science (PCM)"].courses[0],
            "B.Tech"
        );
        assert_eq!(streams.detailed_paths["Commerce"].example_careers[0], "Accountant");
        assert!(result.courses().is_empty());
        assert_eq!(
            result.fields(),
            [FieldTag::Engineering, FieldTag::Law, FieldTag::Management].into()
        );
    }

    #[tokio::test]
    async fn test_prompt_embeds_profile_and_transcript() {
        let (store, student, session) = seeded(9).await;
        let llm = ScriptedGenerator::new().then_json(json!({
            "streams": ["Commerce"], "reasons": {}, "message": "ok"
        }));
        fetch_recommendations(&store, &llm, student.user_id, session.id)
            .await
            .unwrap();

        let prompt = llm.prompt(0);
        assert!(prompt.contains("Class 9 student"));
        assert!(prompt.contains("- Budget: 1-3 lakh"));
        assert!(prompt.contains("\"answer\": \"Laboratory\""));
        assert!(prompt.contains("\"question_number\": 2"));
    }

    #[test]
    fn test_stream_with_placeholder_text_is_not_expanded() {
        let mut student = profile(12);
        student.stream = Some("PCM {quiz_responses}".to_string());
        let session = answered_session(&student);

        let prompt = build_prompt(&student, &session).unwrap();
        assert!(prompt.contains("PCM {quiz_responses}"));
        assert!(prompt.contains("\"answer\": \"Laboratory\""));
    }

    #[tokio::test]
    async fn test_class_12_gets_courses_with_resources() {
        let (store, student, session) = seeded(12).await;
        let llm = ScriptedGenerator::new().then_json(json!({
            "courses": ["B.Tech Computer Science", "MBBS", "BBA"],
            "careers": {
                "B.Tech Computer Science": ["Software Engineer", "Data Scientist"],
                "MBBS": ["Doctor"]
            },
            "reasons": {"MBBS": "Likes biology"},
            "message": "Three strong paths"
        }));

        let result = fetch_recommendations(&store, &llm, student.user_id, session.id)
            .await
            .unwrap();

        let RecommendationResult::Courses(courses) = &result else {
            panic!("expected courses, got {result:?}");
        };
        assert_eq!(courses.additional_resources.len(), 3);
        assert_eq!(courses.additional_resources["BBA"].len(), 1);
        assert_eq!(courses.additional_resources["MBBS"][1].title, "NEET Examination");
        assert_eq!(
            result.fields(),
            [FieldTag::Engineering, FieldTag::Management, FieldTag::Medical].into()
        );
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_contract_violation() {
        let (store, student, session) = seeded(10).await;
        let llm = ScriptedGenerator::new().then_text("I think Science suits this student best.");

        let result = fetch_recommendations(&store, &llm, student.user_id, session.id).await;
        assert!(matches!(result, Err(AppError::UpstreamContract(_))));
    }

    #[tokio::test]
    async fn test_missing_required_key_is_contract_violation() {
        let (store, student, session) = seeded(11).await;
        let llm = ScriptedGenerator::new().then_json(json!({
            "courses": ["B.Tech"], "reasons": {}, "message": "no careers key"
        }));

        let result = fetch_recommendations(&store, &llm, student.user_id, session.id).await;
        assert!(matches!(result, Err(AppError::UpstreamContract(_))));
    }

    #[tokio::test]
    async fn test_empty_stream_list_is_contract_violation() {
        let (store, student, session) = seeded(10).await;
        let llm = ScriptedGenerator::new().then_json(json!({
            "streams": [], "reasons": {}, "message": "none"
        }));

        let result = fetch_recommendations(&store, &llm, student.user_id, session.id).await;
        assert!(matches!(result, Err(AppError::UpstreamContract(_))));
    }

    #[tokio::test]
    async fn test_generator_outage_is_unavailable() {
        let (store, student, session) = seeded(10).await;
        let llm = ScriptedGenerator::new().then_unavailable();

        let result = fetch_recommendations(&store, &llm, student.user_id, session.id).await;
        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_quiz_is_not_found() {
        let (store, student, _) = seeded(10).await;
        let llm = ScriptedGenerator::new();

        let result = fetch_recommendations(&store, &llm, student.user_id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(llm.calls(), 0);
    }

    #[test]
    fn test_untagged_result_round_trips_variant() {
        let value = json!({
            "courses": ["BBA"], "careers": {}, "reasons": {},
            "additional_resources": {}, "message": "m"
        });
        let parsed: RecommendationResult = serde_json::from_value(value).unwrap();
        assert!(matches!(parsed, RecommendationResult::Courses(_)));
    }
}
