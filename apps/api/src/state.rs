use std::sync::Arc;

use crate::config::Config;
use crate::proposals::generator::ProposalGenerator;
use crate::proposals::orchestrator::ProposalOrchestrator;
use crate::store::ProposalStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable store. PgStore in production, InMemoryStore without DATABASE_URL.
    pub store: Arc<dyn ProposalStore>,
    /// Owns the generator and the per-user in-flight flags.
    pub orchestrator: Arc<ProposalOrchestrator>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ProposalStore>,
        generator: Arc<dyn ProposalGenerator>,
        config: Config,
    ) -> Self {
        let orchestrator = Arc::new(ProposalOrchestrator::new(
            store.clone(),
            generator,
            config.gemini_api_key.clone(),
        ));
        Self {
            store,
            orchestrator,
            config,
        }
    }
}
