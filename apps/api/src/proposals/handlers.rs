//! Axum route handlers for the Proposals API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::errors::AppError;
use crate::models::proposal::ProposalRow;
use crate::proposals::dedup::is_duplicate;
use crate::proposals::fingerprint::fingerprint;
use crate::proposals::grouping::{group_records, GroupMode, HistoryBucket};
use crate::proposals::orchestrator::{SubmitRequest, Submission};
use crate::proposals::score::{parse_score, score_headline, score_percent, ParsedProposal};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DuplicateCheckRequest {
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct DuplicateCheckResponse {
    pub is_duplicate: bool,
    pub fingerprint: String,
}

/// A history entry with its score badge pre-computed.
#[derive(Debug, Serialize)]
pub struct ProposalListItem {
    #[serde(flatten)]
    pub proposal: ProposalRow,
    pub score_headline: Option<String>,
    pub score_percent: Option<u8>,
}

impl From<ProposalRow> for ProposalListItem {
    fn from(proposal: ProposalRow) -> Self {
        let score_headline = proposal
            .match_score
            .as_deref()
            .map(|s| score_headline(s).to_string());
        let score_percent = proposal.match_score.as_deref().and_then(score_percent);
        Self {
            proposal,
            score_headline,
            score_percent,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProposalDetailResponse {
    pub proposal: ProposalRow,
    pub parsed: ParsedProposal,
}

#[derive(Debug, Serialize)]
pub struct GenerationStatusResponse {
    pub generating: bool,
}

#[derive(Debug, Deserialize)]
pub struct GroupedHistoryQuery {
    #[serde(default)]
    pub mode: GroupMode,
    /// Viewer's offset from UTC in minutes, east positive (UTC+2 → 120).
    #[serde(default)]
    pub tz_offset_minutes: i32,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/proposals
///
/// Runs the full pipeline: duplicate check → generate → parse score → save.
/// Generation failures come back as `status: "failed"` with an `Error: ...` message.
///
/// The submission runs on its own task: a client that disconnects mid-generation
/// does not cancel the model call, and the result is still saved.
pub async fn handle_submit(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<Submission>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let orchestrator = state.orchestrator.clone();
    let submission =
        tokio::spawn(async move { orchestrator.submit(user.user_id, request).await })
            .await
            .map_err(|e| anyhow::anyhow!("submission task failed: {e}"))?;
    Ok(Json(submission))
}

/// GET /api/v1/proposals/status
///
/// Is a submission for this user still running?
pub async fn handle_status(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Json<GenerationStatusResponse> {
    Json(GenerationStatusResponse {
        generating: state.orchestrator.in_flight().is_active(user.user_id),
    })
}

/// POST /api/v1/proposals/duplicate-check
pub async fn handle_duplicate_check(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<DuplicateCheckRequest>,
) -> Result<Json<DuplicateCheckResponse>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let is_duplicate =
        is_duplicate(state.store.as_ref(), user.user_id, &request.job_description).await;
    Ok(Json(DuplicateCheckResponse {
        is_duplicate,
        fingerprint: fingerprint(&request.job_description).to_string(),
    }))
}

/// GET /api/v1/proposals (newest first)
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<Json<Vec<ProposalListItem>>, AppError> {
    let rows = state.store.list_proposals(user.user_id).await?;
    Ok(Json(rows.into_iter().map(ProposalListItem::from).collect()))
}

/// GET /api/v1/proposals/grouped?mode=day|week|month&tz_offset_minutes=N
pub async fn handle_grouped(
    State(state): State<AppState>,
    user: AuthedUser,
    Query(query): Query<GroupedHistoryQuery>,
) -> Result<Json<Vec<HistoryBucket>>, AppError> {
    let offset = query
        .tz_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "tz_offset_minutes out of range: {}",
                query.tz_offset_minutes
            ))
        })?;

    let rows = state.store.list_proposals(user.user_id).await?;
    let now = Utc::now().with_timezone(&offset);
    Ok(Json(group_records(rows, query.mode, &now)))
}

/// GET /api/v1/proposals/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProposalDetailResponse>, AppError> {
    let proposal = state
        .store
        .get_proposal(user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Proposal {id} not found")))?;
    let parsed = parse_score(&proposal.proposal_text);
    Ok(Json(ProposalDetailResponse { proposal, parsed }))
}

/// DELETE /api/v1/proposals/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_proposal(user.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Proposal {id} not found")))
    }
}
