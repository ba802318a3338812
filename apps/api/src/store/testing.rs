//! Test doubles for the store seam.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::knowledge::{KnowledgeItemRow, NewKnowledgeItem};
use crate::models::proposal::{NewProposal, ProposalRow};
use crate::store::{InMemoryStore, ProposalStore, StoreError};

/// Wraps an `InMemoryStore` and fails proposal reads, proposal writes or knowledge
/// reads on demand.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: InMemoryStore,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub fail_knowledge_reads: bool,
}

fn outage() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl ProposalStore for FaultyStore {
    async fn insert_proposal(&self, proposal: NewProposal) -> Result<ProposalRow, StoreError> {
        if self.fail_writes {
            return Err(outage());
        }
        self.inner.insert_proposal(proposal).await
    }

    async fn list_proposals(&self, user_id: Uuid) -> Result<Vec<ProposalRow>, StoreError> {
        if self.fail_reads {
            return Err(outage());
        }
        self.inner.list_proposals(user_id).await
    }

    async fn get_proposal(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ProposalRow>, StoreError> {
        if self.fail_reads {
            return Err(outage());
        }
        self.inner.get_proposal(user_id, id).await
    }

    async fn delete_proposal(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        if self.fail_writes {
            return Err(outage());
        }
        self.inner.delete_proposal(user_id, id).await
    }

    async fn has_description_prefix(
        &self,
        user_id: Uuid,
        prefix: &str,
    ) -> Result<bool, StoreError> {
        if self.fail_reads {
            return Err(outage());
        }
        self.inner.has_description_prefix(user_id, prefix).await
    }

    async fn insert_knowledge_items(
        &self,
        user_id: Uuid,
        items: Vec<NewKnowledgeItem>,
    ) -> Result<Vec<KnowledgeItemRow>, StoreError> {
        self.inner.insert_knowledge_items(user_id, items).await
    }

    async fn list_knowledge_items(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<KnowledgeItemRow>, StoreError> {
        if self.fail_knowledge_reads {
            return Err(outage());
        }
        self.inner.list_knowledge_items(user_id).await
    }

    async fn delete_knowledge_item(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        self.inner.delete_knowledge_item(user_id, id).await
    }

    async fn resolve_session(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        self.inner.resolve_session(token).await
    }
}
