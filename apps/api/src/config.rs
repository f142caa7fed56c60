use anyhow::{Context, Result};

pub const DEFAULT_COLLEGE_DATA_BASE_URL: &str =
    "https://raw.githubusercontent.com/Clueless-Community/collegeAPI/main/data";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub supabase_url: String,
    pub supabase_api_key: String,
    pub college_data_base_url: String,
    pub dataset_timeout_secs: u64,
    /// Default quiz length when a submit request does not override it.
    pub quiz_max_questions: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            supabase_url: require_env("SUPABASE_URL")?,
            supabase_api_key: require_env("SUPABASE_API_KEY")?,
            college_data_base_url: std::env::var("COLLEGE_DATA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_COLLEGE_DATA_BASE_URL.to_string()),
            dataset_timeout_secs: parse_env("DATASET_TIMEOUT_SECS", 15)?,
            quiz_max_questions: parse_env("QUIZ_MAX_QUESTIONS", 10)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
