pub mod handlers;
pub mod milestones;
pub mod prompts;
pub mod synthesizer;
