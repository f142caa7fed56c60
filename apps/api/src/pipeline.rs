//! Request-scoped memoization of the guidance pipeline.
//!
//! A `GuidanceRun` lives for one top-level call. Each stage is computed at most
//! once per run, so the timeline does not re-run recommendation or college
//! stages it has already consumed. Nothing outlives the request.

use tokio::sync::OnceCell;
use tracing::info;
use uuid::Uuid;

use crate::colleges::aggregator::{assemble, persist_bundle, CollegeBundle};
use crate::colleges::dataset::CollegeDataset;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::profile::Profile;
use crate::models::quiz::QuizSession;
use crate::recommend::synthesizer::{synthesize, RecommendationResult};
use crate::store::GuidanceStore;

pub async fn require_profile(
    store: &dyn GuidanceStore,
    user_id: Uuid,
) -> Result<Profile, AppError> {
    store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {user_id} not found")))
}

/// The session must exist and belong to `user_id`.
pub async fn require_session(
    store: &dyn GuidanceStore,
    user_id: Uuid,
    quiz_id: Uuid,
) -> Result<QuizSession, AppError> {
    match store.get_quiz(quiz_id).await? {
        Some(session) if session.user_id == user_id => Ok(session),
        _ => Err(AppError::NotFound(format!(
            "Quiz {quiz_id} not found for user {user_id}"
        ))),
    }
}

pub struct GuidanceRun<'a> {
    store: &'a dyn GuidanceStore,
    llm: &'a dyn TextGenerator,
    dataset: &'a dyn CollegeDataset,
    user_id: Uuid,
    quiz_id: Uuid,
    profile: OnceCell<Profile>,
    session: OnceCell<QuizSession>,
    recommendation: OnceCell<RecommendationResult>,
    colleges: OnceCell<CollegeBundle>,
}

impl<'a> GuidanceRun<'a> {
    pub fn new(
        store: &'a dyn GuidanceStore,
        llm: &'a dyn TextGenerator,
        dataset: &'a dyn CollegeDataset,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Self {
        Self {
            store,
            llm,
            dataset,
            user_id,
            quiz_id,
            profile: OnceCell::new(),
            session: OnceCell::new(),
            recommendation: OnceCell::new(),
            colleges: OnceCell::new(),
        }
    }

    pub async fn profile(&self) -> Result<&Profile, AppError> {
        self.profile
            .get_or_try_init(|| require_profile(self.store, self.user_id))
            .await
    }

    pub async fn session(&self) -> Result<&QuizSession, AppError> {
        self.session
            .get_or_try_init(|| require_session(self.store, self.user_id, self.quiz_id))
            .await
    }

    pub async fn recommendation(&self) -> Result<&RecommendationResult, AppError> {
        self.recommendation
            .get_or_try_init(|| async {
                let profile = self.profile().await?;
                let session = self.session().await?;
                synthesize(self.llm, profile, session).await
            })
            .await
    }

    /// Bundle for this run. Persisted once, when first computed.
    pub async fn colleges(&self) -> Result<&CollegeBundle, AppError> {
        self.colleges
            .get_or_try_init(|| async {
                let profile = self.profile().await?;
                let session = self.session().await?;
                let recommendation = self.recommendation().await?;
                let bundle =
                    assemble(self.llm, self.dataset, profile, session, recommendation).await;
                info!(
                    "Found {} colleges across {} fields for user {}",
                    bundle.total_colleges_found,
                    bundle.field_mapping.len(),
                    self.user_id
                );
                persist_bundle(self.store, self.user_id, &bundle).await;
                Ok(bundle)
            })
            .await
    }
}

/// getColleges
pub async fn fetch_colleges(
    store: &dyn GuidanceStore,
    llm: &dyn TextGenerator,
    dataset: &dyn CollegeDataset,
    user_id: Uuid,
    quiz_id: Uuid,
) -> Result<CollegeBundle, AppError> {
    let run = GuidanceRun::new(store, llm, dataset, user_id, quiz_id);
    run.colleges().await.cloned()
}
