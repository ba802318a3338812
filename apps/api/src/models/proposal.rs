use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A saved job posting and the proposal generated for it.
/// Immutable after insert; only deletion is supported.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProposalRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_description: String,
    /// Full generated text, score line included.
    pub proposal_text: String,
    /// Verbatim first line of `proposal_text` when it starts with `Match Score:`.
    pub match_score: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub user_id: Uuid,
    pub job_description: String,
    pub proposal_text: String,
    pub match_score: Option<String>,
}
