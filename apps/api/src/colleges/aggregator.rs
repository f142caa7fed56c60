//! College Aggregator: per-field dataset matches plus a generated ranking.
//!
//! Flow: recommendation → field set → concurrent per-field dataset queries →
//!       ranking generation (deterministic fallback) → best-effort persist.
//!
//! Dataset failures degrade a field to empty lists. Ranking failures fall back.
//! Neither reaches the caller.

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::colleges::dataset::{
    dataset_file, filter_by_location, query_field, CollegeDataset, CollegeRecord, LocationKind,
};
use crate::colleges::field_mapper::{FieldSet, FieldTag};
use crate::colleges::prompts::RANKING_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, render_profile_block, JSON_ONLY_SYSTEM};
use crate::llm_client::{generate_json, LlmError, TextGenerator};
use crate::models::profile::{Location, Profile};
use crate::models::quiz::QuizSession;
use crate::recommend::synthesizer::{flatten_history, RecommendationResult};
use crate::store::GuidanceStore;

/// State matches kept per field.
pub const STATE_LIMIT: usize = 10;
/// City matches kept per field.
pub const CITY_LIMIT: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Per-field matches
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldColleges {
    pub state_colleges: Vec<CollegeRecord>,
    pub city_colleges: Vec<CollegeRecord>,
    /// Matches before truncation.
    pub total_state: usize,
    pub total_city: usize,
    pub recommendation_source: Vec<String>,
}

impl FieldColleges {
    fn from_matches(
        mut state: Vec<CollegeRecord>,
        mut city: Vec<CollegeRecord>,
        source: &[String],
    ) -> Self {
        let total_state = state.len();
        let total_city = city.len();
        state.truncate(STATE_LIMIT);
        city.truncate(CITY_LIMIT);
        Self {
            state_colleges: state,
            city_colleges: city,
            total_state,
            total_city,
            recommendation_source: source.to_vec(),
        }
    }

    fn empty(source: &[String]) -> Self {
        Self::from_matches(Vec::new(), Vec::new(), source)
    }

    pub fn total(&self) -> usize {
        self.total_state + self.total_city
    }
}

/// One fetch per field, filtered once by state and once by city.
async fn gather_field(
    dataset: &dyn CollegeDataset,
    field: FieldTag,
    location: &Location,
    source: &[String],
) -> FieldColleges {
    if location.state.trim().is_empty() && location.city.trim().is_empty() {
        return FieldColleges::empty(source);
    }

    match dataset.fetch(dataset_file(field)).await {
        Ok(records) => {
            let state = filter_by_location(&records, field, LocationKind::State, &location.state);
            let city = filter_by_location(&records, field, LocationKind::City, &location.city);
            info!(
                "Found {} {field} colleges in {} and {} in {}",
                state.len(),
                location.state,
                city.len(),
                location.city
            );
            FieldColleges::from_matches(state, city, source)
        }
        Err(e) => {
            warn!("Dataset query for {field} failed: {e}. Using empty result.");
            FieldColleges::empty(source)
        }
    }
}

/// Queries every field concurrently. The map orders results by field name.
pub async fn gather_colleges(
    dataset: &dyn CollegeDataset,
    fields: &FieldSet,
    location: &Location,
    source: &[String],
) -> BTreeMap<FieldTag, FieldColleges> {
    let queries = fields.iter().map(|&field| async move {
        (field, gather_field(dataset, field, location, source).await)
    });
    join_all(queries).await.into_iter().collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking
// ────────────────────────────────────────────────────────────────────────────

fn rank_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn unit_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(f64::deserialize(deserializer)?.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCollege {
    pub name: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub location: String,
    /// NIRF rank as text; numbers are stringified.
    #[serde(default, deserialize_with = "rank_text")]
    pub rank: String,
    pub reason: String,
    #[serde(default, deserialize_with = "unit_score")]
    pub fit_score: f64,
    #[serde(default)]
    pub estimated_fees: String,
    #[serde(default)]
    pub admission_requirements: String,
    #[serde(default)]
    pub considerations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionTimeline {
    pub immediate: String,
    pub short_term: String,
    pub application_period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeRanking {
    pub top_colleges: Vec<RankedCollege>,
    pub budget_strategy: String,
    pub location_advice: String,
    pub admission_timeline: AdmissionTimeline,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingSource {
    Generated,
    Fallback,
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Advice built only from profile attributes and the recommended names.
pub fn fallback_ranking(
    profile: &Profile,
    recommendation: &RecommendationResult,
) -> CollegeRanking {
    let state = or_placeholder(&profile.location.state, "your state");
    CollegeRanking {
        top_colleges: Vec::new(),
        budget_strategy: format!(
            "Plan for {} budget considering your {} category benefits",
            profile.budget_range, profile.reservation_category
        ),
        location_advice: format!(
            "Focus on colleges in {state} based on your {} mobility preference",
            profile.mobility
        ),
        admission_timeline: AdmissionTimeline {
            immediate: format!(
                "Research entrance exams for Class {} students",
                profile.class_level
            ),
            short_term: "Prepare for entrance tests in your recommended fields".to_string(),
            application_period: "Apply according to your class level timeline".to_string(),
        },
        next_steps: vec![
            format!(
                "Focus on {} related entrance exams",
                recommendation.names().join(", ")
            ),
            format!(
                "Research colleges within {} budget in {}",
                profile.budget_range,
                or_placeholder(&profile.location.state, "your area")
            ),
            "Prepare documents considering your reservation category benefits".to_string(),
        ],
    }
}

fn build_ranking_prompt(
    profile: &Profile,
    session: &QuizSession,
    recommendation: &RecommendationResult,
    college_data: &BTreeMap<FieldTag, FieldColleges>,
) -> Result<String, serde_json::Error> {
    let profile_block = render_profile_block(profile);
    let quiz_responses = serde_json::to_string_pretty(&flatten_history(&session.history))?;
    let recommendations = serde_json::to_string_pretty(recommendation)?;
    let college_data = serde_json::to_string_pretty(college_data)?;
    Ok(fill_template(
        RANKING_PROMPT_TEMPLATE,
        &[
            ("profile_block", profile_block.as_str()),
            ("quiz_responses", quiz_responses.as_str()),
            ("recommendations", recommendations.as_str()),
            ("college_data", college_data.as_str()),
        ],
    ))
}

async fn generate_ranking(
    llm: &dyn TextGenerator,
    profile: &Profile,
    session: &QuizSession,
    recommendation: &RecommendationResult,
    college_data: &BTreeMap<FieldTag, FieldColleges>,
) -> Result<CollegeRanking, LlmError> {
    let prompt = build_ranking_prompt(profile, session, recommendation, college_data)?;
    generate_json(llm, &prompt, JSON_ONLY_SYSTEM).await
}

// ────────────────────────────────────────────────────────────────────────────
// Bundle
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleProfileContext {
    pub class_level: u8,
    pub stream: Option<String>,
    pub budget_range: String,
    pub mobility: String,
    pub reservation_category: String,
    pub language_preference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecommendations {
    pub streams: Vec<String>,
    pub courses: Vec<String>,
    pub reasons: BTreeMap<String, String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeBundle {
    pub college_data: BTreeMap<FieldTag, FieldColleges>,
    pub intelligent_recommendations: CollegeRanking,
    pub ranking_source: RankingSource,
    pub location: Location,
    pub profile_context: BundleProfileContext,
    pub source_recommendations: SourceRecommendations,
    pub field_mapping: Vec<FieldTag>,
    pub total_colleges_found: usize,
}

/// Builds the bundle for one profile, session and recommendation. Does not persist.
pub async fn assemble(
    llm: &dyn TextGenerator,
    dataset: &dyn CollegeDataset,
    profile: &Profile,
    session: &QuizSession,
    recommendation: &RecommendationResult,
) -> CollegeBundle {
    let fields = recommendation.fields();
    info!(
        "Mapped {:?} to fields {:?} for user {}",
        recommendation.names(),
        fields,
        profile.user_id
    );

    let college_data =
        gather_colleges(dataset, &fields, &profile.location, recommendation.names()).await;

    let (intelligent_recommendations, ranking_source) =
        match generate_ranking(llm, profile, session, recommendation, &college_data).await {
            Ok(ranking) => (ranking, RankingSource::Generated),
            Err(e) => {
                warn!(
                    "College ranking failed for user {}: {e}. Using fallback.",
                    profile.user_id
                );
                (fallback_ranking(profile, recommendation), RankingSource::Fallback)
            }
        };

    let total_colleges_found = college_data.values().map(FieldColleges::total).sum();

    CollegeBundle {
        field_mapping: fields.into_iter().collect(),
        total_colleges_found,
        college_data,
        intelligent_recommendations,
        ranking_source,
        location: profile.location.clone(),
        profile_context: BundleProfileContext {
            class_level: profile.class_level,
            stream: profile.stream.clone(),
            budget_range: profile.budget_range.clone(),
            mobility: profile.mobility.clone(),
            reservation_category: profile.reservation_category.clone(),
            language_preference: profile.language_preference.clone(),
        },
        source_recommendations: SourceRecommendations {
            streams: recommendation.streams().to_vec(),
            courses: recommendation.courses().to_vec(),
            reasons: recommendation.reasons().clone(),
            message: recommendation.message().to_string(),
        },
    }
}

/// Upserts the bundle by user. Failures are logged and dropped.
pub async fn persist_bundle(store: &dyn GuidanceStore, user_id: Uuid, bundle: &CollegeBundle) {
    let document = match serde_json::to_value(bundle) {
        Ok(document) => document,
        Err(e) => {
            warn!("Could not serialize college bundle for user {user_id}: {e}");
            return;
        }
    };
    if let Err(e) = store.upsert_colleges(user_id, &document).await {
        warn!("Failed to store colleges for user {user_id}: {e}");
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Search
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CollegeSearch {
    pub colleges: Vec<CollegeRecord>,
    pub count: usize,
}

/// searchColleges. Bad field or location type is a validation error; dataset
/// failures yield an empty list.
pub async fn search_colleges(
    dataset: &dyn CollegeDataset,
    field: &str,
    location_type: &str,
    location: &str,
) -> Result<CollegeSearch, AppError> {
    let field: FieldTag = field.parse().map_err(AppError::Validation)?;
    let kind: LocationKind = location_type.parse().map_err(AppError::Validation)?;

    let colleges = query_field(dataset, field, kind, location)
        .await
        .unwrap_or_else(|e| {
            warn!("College search for {field} in {location} failed: {e}");
            Vec::new()
        });

    Ok(CollegeSearch {
        count: colleges.len(),
        colleges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::QuestionSource;
    use crate::pipeline::fetch_colleges;
    use crate::quiz::fallback::fallback_question;
    use crate::recommend::synthesizer::StreamRecommendation;
    use crate::store::MemoryStore;
    use crate::testing::{college_rows, profile, ScriptedGenerator, StaticDataset};
    use serde_json::json;

    fn streams(names: &[&str]) -> RecommendationResult {
        RecommendationResult::Streams(StreamRecommendation {
            streams: names.iter().map(|s| s.to_string()).collect(),
            reasons: BTreeMap::new(),
            detailed_paths: BTreeMap::new(),
            message: "Good fit".to_string(),
        })
    }

    fn session_for(profile: &Profile) -> QuizSession {
        let mut session = QuizSession::new(profile.user_id, 1, QuestionSource::Fallback);
        session.issue(fallback_question(1)).unwrap();
        session.record_answer("Mathematics", 1).unwrap();
        session
    }

    fn ranking_json() -> Value {
        json!({
            "top_colleges": [{
                "name": "RV College of Engineering",
                "field": "engineering",
                "location": "Bangalore, Karnataka",
                "rank": 89,
                "reason": "Close to home",
                "fit_score": 1.4,
                "estimated_fees": "2-3 lakh",
                "admission_requirements": "KCET",
                "considerations": ["Hostel fees"]
            }],
            "budget_strategy": "Apply for merit scholarships",
            "location_advice": "Stay in Bangalore",
            "admission_timeline": {
                "immediate": "Pick PCM",
                "short_term": "Start JEE basics",
                "application_period": "Class 12"
            },
            "next_steps": ["Enroll in coaching"]
        })
    }

    #[tokio::test]
    async fn test_truncates_and_keeps_totals() {
        let mut rows = college_rows("Mysore", 16, "Karnataka", "Mysore");
        rows.extend(college_rows("Bangalore", 7, "Karnataka", "Bangalore"));
        rows.extend(college_rows("Chennai", 4, "Tamil Nadu", "Chennai"));
        let dataset =
            StaticDataset::new().with_file("engineering_ranking.json", Value::Array(rows));
        let student = profile(10);
        let source = vec!["Science (PCM)".to_string()];

        let data = gather_colleges(
            &dataset,
            &[FieldTag::Engineering].into(),
            &student.location,
            &source,
        )
        .await;

        let engineering = &data[&FieldTag::Engineering];
        assert_eq!(engineering.total_state, 23);
        assert_eq!(engineering.total_city, 7);
        assert_eq!(engineering.state_colleges.len(), STATE_LIMIT);
        assert_eq!(engineering.city_colleges.len(), CITY_LIMIT);
        assert_eq!(engineering.state_colleges[0]["name"], "Mysore College 0");
        assert_eq!(engineering.recommendation_source, source);
        assert_eq!(dataset.fetches(), 1);
    }

    #[tokio::test]
    async fn test_failed_field_degrades_to_empty() {
        let dataset = StaticDataset::new()
            .with_broken_file("law_ranking.json")
            .with_file(
                "management_ranking.json",
                Value::Array(college_rows("IIM", 2, "Karnataka", "Bangalore")),
            );
        let student = profile(10);
        let fields: FieldSet = [FieldTag::Law, FieldTag::Management].into();

        let data = gather_colleges(&dataset, &fields, &student.location, &[]).await;

        let law = &data[&FieldTag::Law];
        assert_eq!((law.total_state, law.total_city), (0, 0));
        assert!(law.state_colleges.is_empty() && law.city_colleges.is_empty());
        assert_eq!(data[&FieldTag::Management].total(), 4);
        let order: Vec<FieldTag> = data.keys().copied().collect();
        assert_eq!(order, vec![FieldTag::Law, FieldTag::Management]);
    }

    #[tokio::test]
    async fn test_empty_location_skips_fetch() {
        let dataset = StaticDataset::new();
        let nowhere = Location::default();
        let data = gather_colleges(&dataset, &[FieldTag::Dental].into(), &nowhere, &[]).await;
        assert_eq!(data[&FieldTag::Dental].total(), 0);
        assert_eq!(dataset.fetches(), 0);
    }

    #[tokio::test]
    async fn test_generated_ranking_is_parsed() {
        let student = profile(10);
        let session = session_for(&student);
        let dataset = StaticDataset::new().with_file(
            "engineering_ranking.json",
            Value::Array(college_rows("RV", 3, "Karnataka", "Bangalore")),
        );
        let llm = ScriptedGenerator::new().then_text(format!("```json\n{}\n```", ranking_json()));

        let rec = streams(&["Science (PCM)"]);
        let bundle = assemble(&llm, &dataset, &student, &session, &rec).await;

        assert_eq!(bundle.ranking_source, RankingSource::Generated);
        let top = &bundle.intelligent_recommendations.top_colleges[0];
        assert_eq!(top.rank, "89");
        assert_eq!(top.fit_score, 1.0);
        assert_eq!(bundle.total_colleges_found, 6);
        assert!(llm.prompt(0).contains("RV College 0"));
    }

    #[tokio::test]
    async fn test_unparseable_ranking_falls_back() {
        let student = profile(10);
        let session = session_for(&student);
        let dataset = StaticDataset::new();
        let llm = ScriptedGenerator::new().then_text("Here are some colleges you might like!");
        let recommendation = streams(&["Commerce", "Arts/Humanities"]);

        let bundle = assemble(&llm, &dataset, &student, &session, &recommendation).await;

        assert_eq!(bundle.ranking_source, RankingSource::Fallback);
        let ranking = &bundle.intelligent_recommendations;
        assert!(ranking.top_colleges.is_empty());
        assert_eq!(
            ranking.next_steps[0],
            "Focus on Commerce, Arts/Humanities related entrance exams"
        );
        assert_eq!(
            ranking.location_advice,
            "Focus on colleges in Karnataka based on your within_state mobility preference"
        );
        assert_eq!(bundle.field_mapping, vec![FieldTag::Law, FieldTag::Management]);
    }

    #[tokio::test]
    async fn test_ranking_missing_key_falls_back() {
        let student = profile(12);
        let session = session_for(&student);
        let mut reply = ranking_json();
        reply.as_object_mut().unwrap().remove("next_steps");
        let llm = ScriptedGenerator::new().then_json(reply);

        let bundle = assemble(
            &llm,
            &StaticDataset::new(),
            &student,
            &session,
            &streams(&["Science (PCB)"]),
        )
        .await;
        assert_eq!(bundle.ranking_source, RankingSource::Fallback);
    }

    #[tokio::test]
    async fn test_round_trip_for_bangalore_pcm_student() {
        let store = MemoryStore::new();
        let student = profile(10);
        let session = session_for(&student);
        store.insert_profile(&student).await.unwrap();
        store.insert_quiz(&session).await.unwrap();

        let mut rows = college_rows("Karnataka", 4, "Karnataka", "Mysore");
        rows.extend(college_rows("Bangalore", 3, "Karnataka", "Bangalore"));
        rows.extend(college_rows("Pune", 5, "Maharashtra", "Pune"));
        let dataset =
            StaticDataset::new().with_file("engineering_ranking.json", Value::Array(rows));
        let llm = ScriptedGenerator::new()
            .then_json(json!({
                "streams": ["Science (PCM)"],
                "reasons": {"Science (PCM)": "Enjoys maths"},
                "message": "PCM fits"
            }))
            .then_json(ranking_json());

        let bundle = fetch_colleges(&store, &llm, &dataset, student.user_id, session.id)
            .await
            .unwrap();

        assert_eq!(bundle.field_mapping, vec![FieldTag::Engineering]);
        let engineering = &bundle.college_data[&FieldTag::Engineering];
        assert_eq!(engineering.total_state, 7);
        assert_eq!(engineering.total_city, 3);
        assert_eq!(
            bundle.total_colleges_found,
            engineering.total_state + engineering.total_city
        );
        assert_eq!(bundle.source_recommendations.streams, vec!["Science (PCM)"]);

        let stored = store.stored_colleges(student.user_id).await.unwrap();
        assert_eq!(stored["field_mapping"], json!(["engineering"]));
        assert_eq!(stored["ranking_source"], "generated");
    }

    #[tokio::test]
    async fn test_persistence_failure_is_swallowed() {
        let store = MemoryStore::new();
        store.fail_document_writes(true);
        let student = profile(10);
        let session = session_for(&student);
        store.insert_profile(&student).await.unwrap();
        store.insert_quiz(&session).await.unwrap();
        let llm = ScriptedGenerator::new().then_json(json!({
            "streams": ["Commerce"], "reasons": {}, "message": "ok"
        }));

        let dataset = StaticDataset::new();
        let bundle = fetch_colleges(&store, &llm, &dataset, student.user_id, session.id)
            .await
            .unwrap();

        assert_eq!(bundle.ranking_source, RankingSource::Fallback);
        assert!(store.stored_colleges(student.user_id).await.is_none());
    }

    #[tokio::test]
    async fn test_recommendation_failure_propagates() {
        let store = MemoryStore::new();
        let student = profile(10);
        let session = session_for(&student);
        store.insert_profile(&student).await.unwrap();
        store.insert_quiz(&session).await.unwrap();
        let llm = ScriptedGenerator::new().then_text("not json");

        let result =
            fetch_colleges(&store, &llm, &StaticDataset::new(), student.user_id, session.id).await;
        assert!(matches!(result, Err(AppError::UpstreamContract(_))));
    }

    #[tokio::test]
    async fn test_search_filters_by_city() {
        let dataset = StaticDataset::new().with_file(
            "allAgriculture.json",
            json!([
                {"Name": "UAS", "State": "Karnataka", "City": "Bangalore"},
                {"Name": "TNAU", "State": "Tamil Nadu", "City": "Coimbatore"}
            ]),
        );
        let result = search_colleges(&dataset, "agriculture", "city", "bangalore")
            .await
            .unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.colleges[0]["Name"], "UAS");
    }

    #[tokio::test]
    async fn test_search_rejects_unknown_field_and_location_type() {
        let dataset = StaticDataset::new();
        let field = search_colleges(&dataset, "astrology", "state", "Goa").await;
        assert!(matches!(field, Err(AppError::Validation(_))));
        let kind = search_colleges(&dataset, "law", "district", "Goa").await;
        assert!(matches!(kind, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_dataset_failure_is_empty() {
        let dataset = StaticDataset::new().with_broken_file("pharmacy_ranking.json");
        let result = search_colleges(&dataset, "pharmacy", "state", "Goa").await.unwrap();
        assert_eq!(result.count, 0);
    }
}
