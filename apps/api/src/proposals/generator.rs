//! Proposal generation: pluggable, trait-based seam over the language model.
//!
//! Default: `GeminiGenerator` (wraps `llm_client::GeminiClient`).
//! `AppState` holds an `Arc<dyn ProposalGenerator>`; tests substitute scripted fakes.

use async_trait::async_trait;

use crate::llm_client::{GeminiClient, LlmError};
use crate::proposals::prompts::build_system_instruction;

/// Produces proposal text for a job description.
///
/// `context` is the concatenated knowledge base (possibly empty). `credential` is the
/// already-resolved API key; `None` must fail with `LlmError::MissingCredential`.
#[async_trait]
pub trait ProposalGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        context: &str,
        credential: Option<&str>,
    ) -> Result<String, LlmError>;
}

pub struct GeminiGenerator(pub GeminiClient);

#[async_trait]
impl ProposalGenerator for GeminiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        context: &str,
        credential: Option<&str>,
    ) -> Result<String, LlmError> {
        let api_key = credential.ok_or(LlmError::MissingCredential)?;
        let system = build_system_instruction(context);
        self.0.call_text(prompt, &system, api_key).await
    }
}
