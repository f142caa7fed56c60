pub mod engine;
pub mod fallback;
pub mod handlers;
pub mod prompts;
