pub mod aggregator;
pub mod dataset;
pub mod field_mapper;
pub mod handlers;
pub mod prompts;
