// Proposal pipeline: fingerprinting, duplicate detection, generation,
// score parsing, history grouping.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod dedup;
pub mod fingerprint;
pub mod generator;
pub mod grouping;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod score;
