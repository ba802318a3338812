use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::store::{InMemoryStore, PgStore, ProposalStore};

const MAX_CONNECTIONS: u32 = 10;

/// Picks the store backend: PostgreSQL when `DATABASE_URL` is set, otherwise the
/// in-memory store (history and knowledge base are lost on restart).
pub async fn connect_store(config: &Config) -> Result<Arc<dyn ProposalStore>> {
    match &config.database_url {
        Some(url) => {
            info!("Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .connect(url)
                .await
                .context("Failed to connect to DATABASE_URL")?;
            info!("PostgreSQL connection pool established");
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store. Persistence will not survive a restart.");
            let store = InMemoryStore::new();
            if let Some(token) = &config.dev_session_token {
                let user_id = Uuid::new_v4();
                store.add_session(token, user_id, None).await;
                info!("Seeded development session for user {user_id}");
            }
            Ok(Arc::new(store))
        }
    }
}
