// Resume review pipeline.
// Implements: prompt building, structured-output parsing, review orchestration.
// All model calls go through llm_client — no direct endpoint calls here.

pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
