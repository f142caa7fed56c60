use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::colleges::dataset::CollegeDataset;
use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::store::GuidanceStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// PgStore in production.
    pub store: Arc<dyn GuidanceStore>,
    pub llm: Arc<dyn TextGenerator>,
    pub dataset: Arc<dyn CollegeDataset>,
    pub auth: Arc<dyn AuthProvider>,
    pub config: Config,
}
