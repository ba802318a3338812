//! Persistence seam: job history, knowledge base and sessions.
//!
//! `AppState` holds an `Arc<dyn ProposalStore>`. `PgStore` is the production backend;
//! `InMemoryStore` is selected when no `DATABASE_URL` is configured and backs the tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::knowledge::{KnowledgeItemRow, NewKnowledgeItem};
use crate::models::proposal::{NewProposal, ProposalRow};

pub mod memory;
pub mod postgres;
#[cfg(test)]
pub mod testing;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create/read/delete over the two record collections plus session lookup.
/// Every collection call is scoped to the owning user.
#[async_trait]
pub trait ProposalStore: Send + Sync {
    async fn insert_proposal(&self, proposal: NewProposal) -> Result<ProposalRow, StoreError>;

    /// All of the user's proposals, newest first.
    async fn list_proposals(&self, user_id: Uuid) -> Result<Vec<ProposalRow>, StoreError>;

    async fn get_proposal(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ProposalRow>, StoreError>;

    /// Returns false when nothing was deleted.
    async fn delete_proposal(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError>;

    /// True when any of the user's proposals has a `job_description` starting with
    /// `prefix`, compared case-insensitively. The prefix is matched literally.
    async fn has_description_prefix(
        &self,
        user_id: Uuid,
        prefix: &str,
    ) -> Result<bool, StoreError>;

    async fn insert_knowledge_items(
        &self,
        user_id: Uuid,
        items: Vec<NewKnowledgeItem>,
    ) -> Result<Vec<KnowledgeItemRow>, StoreError>;

    /// Knowledge items in upload order.
    async fn list_knowledge_items(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<KnowledgeItemRow>, StoreError>;

    async fn delete_knowledge_item(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError>;

    /// Resolves a bearer token to its user. Unknown or expired tokens yield `None`.
    async fn resolve_session(&self, token: &str) -> Result<Option<Uuid>, StoreError>;
}

/// Escapes `%`, `_` and `\` so the text matches literally inside `LIKE`/`ILIKE`.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
