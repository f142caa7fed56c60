pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{auth, colleges, profile, quiz, recommend, timeline};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/signup", post(auth::handlers::handle_signup))
        .route("/api/v1/auth/signin", post(auth::handlers::handle_signin))
        .route("/api/v1/auth/logout", post(auth::handlers::handle_logout))
        .route("/api/v1/auth/refresh", post(auth::handlers::handle_refresh))
        .route("/api/v1/auth/me", get(auth::handlers::handle_me))
        .route(
            "/api/v1/auth/user/:user_id",
            get(auth::handlers::handle_user_status),
        )
        // Profile
        .route(
            "/api/v1/profile",
            post(profile::handlers::handle_create_profile),
        )
        .route(
            "/api/v1/profile/:user_id",
            get(profile::handlers::handle_get_profile)
                .put(profile::handlers::handle_update_profile),
        )
        // Quiz
        .route("/api/v1/quiz/start", post(quiz::handlers::handle_start_quiz))
        .route(
            "/api/v1/quiz/submit",
            post(quiz::handlers::handle_submit_answer),
        )
        // Guidance pipeline
        .route(
            "/api/v1/recommend",
            post(recommend::handlers::handle_recommend),
        )
        .route("/api/v1/colleges", post(colleges::handlers::handle_colleges))
        .route(
            "/api/v1/colleges/search/:field/:location_type/:location",
            get(colleges::handlers::handle_search_colleges),
        )
        .route("/api/v1/timeline", post(timeline::handlers::handle_timeline))
        .route(
            "/api/v1/timeline/:user_id",
            get(timeline::handlers::handle_stored_timeline),
        )
        .with_state(state)
}
