//! Proposal Orchestration: one submission from pasted job post to saved proposal.
//!
//! Flow: Idle → Checking → (DuplicateFound | Generating) → Parsing → Persisting → Idle,
//!       with Generating → Failed → Idle on any generation error.
//!
//! One submission may be in flight per user. A second submission while one is running
//! is ignored, not queued. Generation errors become the visible result
//! (`"Error: ..."`) and are never retried. A failed save is reported separately and
//! never hides the generated text.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::resolve_credential;
use crate::knowledge::context::build_knowledge_context;
use crate::models::proposal::{NewProposal, ProposalRow};
use crate::proposals::dedup::is_duplicate;
use crate::proposals::fingerprint::fingerprint;
use crate::proposals::generator::ProposalGenerator;
use crate::proposals::score::parse_score;
use crate::store::ProposalStore;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub job_description: String,
    /// Skip the duplicate check (the user chose to continue anyway).
    #[serde(default)]
    pub override_duplicate: bool,
    /// Per-request API key; preferred over the server's ambient key.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalPhase {
    Idle,
    Checking,
    DuplicateFound,
    Generating,
    Parsing,
    Persisting,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    EmptyInput,
    Busy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PersistenceOutcome {
    Saved { record: ProposalRow },
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Ignored {
        reason: IgnoreReason,
    },
    DuplicateFound {
        fingerprint: String,
    },
    Failed {
        message: String,
    },
    Completed {
        proposal_text: String,
        match_score: Option<String>,
        body: String,
        persistence: PersistenceOutcome,
    },
}

/// Outcome plus the phases the submission passed through.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    #[serde(flatten)]
    pub outcome: SubmitOutcome,
    pub trail: Vec<ProposalPhase>,
}

// ────────────────────────────────────────────────────────────────────────────
// In-flight registry
// ────────────────────────────────────────────────────────────────────────────

/// Users with a submission currently running.
#[derive(Clone, Default)]
pub struct InFlight(Arc<Mutex<HashSet<Uuid>>>);

/// Clears the user's in-flight flag when dropped, whatever the outcome.
pub struct InFlightGuard {
    registry: InFlight,
    user_id: Uuid,
}

impl InFlight {
    pub fn try_acquire(&self, user_id: Uuid) -> Option<InFlightGuard> {
        let inserted = self
            .0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(user_id);
        inserted.then(|| InFlightGuard {
            registry: self.clone(),
            user_id,
        })
    }

    pub fn is_active(&self, user_id: Uuid) -> bool {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&user_id)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry
            .0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.user_id);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct ProposalOrchestrator {
    store: Arc<dyn ProposalStore>,
    generator: Arc<dyn ProposalGenerator>,
    ambient_credential: Option<String>,
    in_flight: InFlight,
}

/// Phase bookkeeping for a single submission.
struct Attempt {
    user_id: Uuid,
    trail: Vec<ProposalPhase>,
}

impl Attempt {
    fn enter(&mut self, phase: ProposalPhase) {
        debug!("Proposal for user {} → {:?}", self.user_id, phase);
        self.trail.push(phase);
    }

    fn finish(mut self, outcome: SubmitOutcome) -> Submission {
        self.enter(ProposalPhase::Idle);
        Submission {
            outcome,
            trail: self.trail,
        }
    }
}

impl ProposalOrchestrator {
    pub fn new(
        store: Arc<dyn ProposalStore>,
        generator: Arc<dyn ProposalGenerator>,
        ambient_credential: Option<String>,
    ) -> Self {
        Self {
            store,
            generator,
            ambient_credential,
            in_flight: InFlight::default(),
        }
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Runs one submission to completion.
    ///
    /// Steps:
    /// 1. ignore blank input or a second submission while one is running
    /// 2. duplicate check (skipped with `override_duplicate`)
    /// 3. load knowledge base → context, resolve credential, generate
    /// 4. split the score line from the body
    /// 5. save the proposal (failure is reported, not raised)
    pub async fn submit(&self, user_id: Uuid, request: SubmitRequest) -> Submission {
        if request.job_description.trim().is_empty() {
            return ignored(IgnoreReason::EmptyInput);
        }
        let Some(_guard) = self.in_flight.try_acquire(user_id) else {
            debug!("Ignoring submission for user {user_id}: generation already in flight");
            return ignored(IgnoreReason::Busy);
        };

        let mut attempt = Attempt {
            user_id,
            trail: Vec::new(),
        };

        // Step 2: duplicate check
        attempt.enter(ProposalPhase::Checking);
        if request.override_duplicate {
            info!("Duplicate check overridden for user {user_id}");
        } else if is_duplicate(self.store.as_ref(), user_id, &request.job_description).await {
            attempt.enter(ProposalPhase::DuplicateFound);
            return attempt.finish(SubmitOutcome::DuplicateFound {
                fingerprint: fingerprint(&request.job_description).to_string(),
            });
        }

        // Step 3: generate
        attempt.enter(ProposalPhase::Generating);
        let context = self.load_context(user_id).await;
        let credential = resolve_credential(
            request.api_key.as_deref(),
            self.ambient_credential.as_deref(),
        );
        let generated = match self
            .generator
            .generate(&request.job_description, &context, credential.as_deref())
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!("Proposal generation failed for user {user_id}: {e}");
                attempt.enter(ProposalPhase::Failed);
                return attempt.finish(SubmitOutcome::Failed {
                    message: format!("Error: {e}"),
                });
            }
        };

        // Step 4: parse
        attempt.enter(ProposalPhase::Parsing);
        let parsed = parse_score(&generated);

        // Step 5: persist
        attempt.enter(ProposalPhase::Persisting);
        let persistence = match self
            .store
            .insert_proposal(NewProposal {
                user_id,
                job_description: request.job_description,
                proposal_text: generated.clone(),
                match_score: parsed.score.clone(),
            })
            .await
        {
            Ok(record) => {
                info!("Saved proposal {} for user {}", record.id, user_id);
                PersistenceOutcome::Saved { record }
            }
            Err(e) => {
                error!("Failed to save proposal for user {user_id}: {e}");
                PersistenceOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        attempt.finish(SubmitOutcome::Completed {
            proposal_text: generated,
            match_score: parsed.score,
            body: parsed.body,
            persistence,
        })
    }

    /// Knowledge base as generation context. A read failure degrades to no context.
    async fn load_context(&self, user_id: Uuid) -> String {
        match self.store.list_knowledge_items(user_id).await {
            Ok(items) => build_knowledge_context(&items),
            Err(e) => {
                warn!("Could not load knowledge base for user {user_id}, generating without it: {e}");
                String::new()
            }
        }
    }
}

fn ignored(reason: IgnoreReason) -> Submission {
    Submission {
        outcome: SubmitOutcome::Ignored { reason },
        trail: Vec::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
