//! Timeline Synthesizer: dated milestones plus a generated action plan.
//!
//! Consumes the recommendation and college bundle of the same run. Their
//! failures propagate; a failed plan generation falls back to a fixed plan.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::colleges::aggregator::{CollegeBundle, RankedCollege};
use crate::colleges::dataset::CollegeDataset;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, render_profile_block, JSON_ONLY_SYSTEM};
use crate::llm_client::{generate_json, LlmError, TextGenerator};
use crate::models::profile::{Location, Profile};
use crate::pipeline::GuidanceRun;
use crate::recommend::synthesizer::RecommendationResult;
use crate::store::{GuidanceStore, StoreError};
use crate::timeline::milestones::{build_milestones, Milestone};
use crate::timeline::prompts::PLAN_PROMPT_TEMPLATE;

/// Ranked colleges carried into the timeline context.
const CONTEXT_COLLEGE_LIMIT: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Generated plan contract
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmediateAction {
    pub action: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPlan {
    pub current_month: Vec<String>,
    pub next_3_months: Vec<String>,
    pub next_6_months: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamEntry {
    pub exam_name: String,
    #[serde(default)]
    pub registration_deadline: String,
    #[serde(default)]
    pub exam_date: String,
    #[serde(default)]
    pub relevance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalDeadline {
    pub event: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePlan {
    pub immediate_actions: Vec<ImmediateAction>,
    pub monthly_plan: MonthlyPlan,
    pub exam_calendar: Vec<ExamEntry>,
    pub critical_deadlines: Vec<CriticalDeadline>,
    pub progress_tracking: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSource {
    Generated,
    Fallback,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn fallback_plan(class_level: u8) -> TimelinePlan {
    TimelinePlan {
        immediate_actions: vec![ImmediateAction {
            action: format!(
                "Focus on Class {class_level} studies with emphasis on recommended subjects"
            ),
            deadline: "Daily".to_string(),
            priority: "high".to_string(),
            reason: "Build foundation for recommended streams/courses".to_string(),
        }],
        monthly_plan: MonthlyPlan {
            current_month: strings(&["Complete current syllabus", "Research recommended fields"]),
            next_3_months: strings(&[
                "Entrance exam preparation",
                "College research from recommendations",
            ]),
            next_6_months: strings(&["Application preparation", "Final exam readiness"]),
        },
        exam_calendar: Vec::new(),
        critical_deadlines: vec![CriticalDeadline {
            event: format!("Class {class_level} academic year completion"),
            deadline: "March".to_string(),
            impact: "Progression to next academic level".to_string(),
        }],
        progress_tracking: vec![
            format!("Achieve 85%+ in Class {class_level}"),
            "Complete preparation for recommended entrance exams".to_string(),
            "Research and shortlist colleges from recommendations".to_string(),
        ],
    }
}

async fn generate_plan(
    llm: &dyn TextGenerator,
    profile: &Profile,
    recommendation: &RecommendationResult,
    colleges: &CollegeBundle,
    milestones: &[Milestone],
) -> Result<TimelinePlan, LlmError> {
    let profile_block = render_profile_block(profile);
    let recommendations = serde_json::to_string_pretty(recommendation)?;
    let college_ranking = serde_json::to_string_pretty(&colleges.intelligent_recommendations)?;
    let milestones = serde_json::to_string_pretty(milestones)?;
    let prompt = fill_template(
        PLAN_PROMPT_TEMPLATE,
        &[
            ("profile_block", profile_block.as_str()),
            ("recommendations", recommendations.as_str()),
            ("college_ranking", college_ranking.as_str()),
            ("milestones", milestones.as_str()),
        ],
    );
    generate_json(llm, &prompt, JSON_ONLY_SYSTEM).await
}

// ────────────────────────────────────────────────────────────────────────────
// Timeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineProfileContext {
    pub class_level: u8,
    pub age: u8,
    /// "2026-2027"
    pub current_academic_year: String,
    pub location: Location,
    pub budget_range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsContext {
    pub streams: Vec<String>,
    pub courses: Vec<String>,
    pub colleges_found: usize,
    pub top_colleges: Vec<RankedCollege>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicPlan {
    pub current_focus: String,
    pub next_milestone: Option<Milestone>,
    pub target_goal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub timeline_milestones: Vec<Milestone>,
    pub intelligent_timeline: TimelinePlan,
    pub plan_source: PlanSource,
    pub profile_context: TimelineProfileContext,
    pub recommendations_context: RecommendationsContext,
    pub academic_plan: AcademicPlan,
}

fn target_goal(recommendation: &RecommendationResult) -> String {
    recommendation
        .courses()
        .first()
        .or_else(|| recommendation.streams().first())
        .cloned()
        .unwrap_or_else(|| "Academic Success".to_string())
}

/// Builds the timeline from already computed stages. Does not persist.
pub async fn compose(
    llm: &dyn TextGenerator,
    profile: &Profile,
    recommendation: &RecommendationResult,
    colleges: &CollegeBundle,
    today: NaiveDate,
) -> Timeline {
    let top_colleges = &colleges.intelligent_recommendations.top_colleges;
    let milestones = build_milestones(
        profile.class_level,
        recommendation.names(),
        top_colleges,
        today,
    );

    let (intelligent_timeline, plan_source) =
        match generate_plan(llm, profile, recommendation, colleges, &milestones).await {
            Ok(plan) => (plan, PlanSource::Generated),
            Err(e) => {
                warn!(
                    "Timeline plan generation failed for user {}: {e}. Using fallback.",
                    profile.user_id
                );
                (fallback_plan(profile.class_level), PlanSource::Fallback)
            }
        };

    let year = today.year();
    Timeline {
        academic_plan: AcademicPlan {
            current_focus: format!("Class {} completion", profile.class_level),
            next_milestone: milestones.first().cloned(),
            target_goal: target_goal(recommendation),
        },
        timeline_milestones: milestones,
        intelligent_timeline,
        plan_source,
        profile_context: TimelineProfileContext {
            class_level: profile.class_level,
            age: profile.age,
            current_academic_year: format!("{year}-{}", year + 1),
            location: profile.location.clone(),
            budget_range: profile.budget_range.clone(),
        },
        recommendations_context: RecommendationsContext {
            streams: recommendation.streams().to_vec(),
            courses: recommendation.courses().to_vec(),
            colleges_found: colleges.total_colleges_found,
            top_colleges: top_colleges
                .iter()
                .take(CONTEXT_COLLEGE_LIMIT)
                .cloned()
                .collect(),
        },
    }
}

async fn persist_timeline(store: &dyn GuidanceStore, user_id: Uuid, timeline: &Timeline) {
    let document = match serde_json::to_value(timeline) {
        Ok(document) => document,
        Err(e) => {
            warn!("Could not serialize timeline for user {user_id}: {e}");
            return;
        }
    };
    if let Err(e) = store.upsert_timeline(user_id, &document).await {
        warn!("Failed to store timeline for user {user_id}: {e}");
    }
}

/// getTimeline
pub async fn fetch_timeline(
    store: &dyn GuidanceStore,
    llm: &dyn TextGenerator,
    dataset: &dyn CollegeDataset,
    user_id: Uuid,
    quiz_id: Uuid,
    today: NaiveDate,
) -> Result<Timeline, AppError> {
    let run = GuidanceRun::new(store, llm, dataset, user_id, quiz_id);
    let profile = run.profile().await?;
    let recommendation = run.recommendation().await?;
    let colleges = run.colleges().await?;

    let timeline = compose(llm, profile, recommendation, colleges, today).await;
    info!(
        "Timeline for user {}: {} milestones ({:?} plan)",
        user_id,
        timeline.timeline_milestones.len(),
        timeline.plan_source
    );
    persist_timeline(store, user_id, &timeline).await;
    Ok(timeline)
}

/// getStoredTimeline
pub async fn get_stored_timeline(
    store: &dyn GuidanceStore,
    user_id: Uuid,
) -> Result<Timeline, AppError> {
    let document = store
        .get_timeline(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No timeline stored for user {user_id}")))?;
    let timeline = serde_json::from_value(document).map_err(StoreError::from)?;
    Ok(timeline)
}
