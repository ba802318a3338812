use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::knowledge::{KnowledgeItemRow, NewKnowledgeItem};
use crate::models::proposal::{NewProposal, ProposalRow};
use crate::models::session::SessionRow;
use crate::store::{ProposalStore, StoreError};

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    // insertion order
    proposals: Vec<ProposalRow>,
    knowledge: Vec<KnowledgeItemRow>,
    sessions: HashMap<String, SessionRow>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_session(&self, token: &str, user_id: Uuid, expires_at: Option<DateTime<Utc>>) {
        let session = SessionRow {
            token: token.to_string(),
            user_id,
            expires_at,
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .sessions
            .insert(token.to_string(), session);
    }
}

#[async_trait]
impl ProposalStore for InMemoryStore {
    async fn insert_proposal(&self, proposal: NewProposal) -> Result<ProposalRow, StoreError> {
        let row = ProposalRow {
            id: Uuid::new_v4(),
            user_id: proposal.user_id,
            job_description: proposal.job_description,
            proposal_text: proposal.proposal_text,
            match_score: proposal.match_score,
            created_at: Utc::now(),
        };
        self.inner.write().await.proposals.push(row.clone());
        Ok(row)
    }

    async fn list_proposals(&self, user_id: Uuid) -> Result<Vec<ProposalRow>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<ProposalRow> = inner
            .proposals
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        // stable: ties keep newest-inserted first
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_proposal(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ProposalRow>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .proposals
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn delete_proposal(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.proposals.len();
        inner
            .proposals
            .retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(inner.proposals.len() < before)
    }

    async fn has_description_prefix(
        &self,
        user_id: Uuid,
        prefix: &str,
    ) -> Result<bool, StoreError> {
        let prefix = prefix.to_lowercase();
        let inner = self.inner.read().await;
        Ok(inner
            .proposals
            .iter()
            .filter(|p| p.user_id == user_id)
            .any(|p| p.job_description.to_lowercase().starts_with(&prefix)))
    }

    async fn insert_knowledge_items(
        &self,
        user_id: Uuid,
        items: Vec<NewKnowledgeItem>,
    ) -> Result<Vec<KnowledgeItemRow>, StoreError> {
        let rows: Vec<KnowledgeItemRow> = items
            .into_iter()
            .map(|item| KnowledgeItemRow {
                id: Uuid::new_v4(),
                user_id,
                name: item.name,
                content: item.content,
                mime_type: item.mime_type,
                created_at: Utc::now(),
            })
            .collect();
        self.inner
            .write()
            .await
            .knowledge
            .extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn list_knowledge_items(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<KnowledgeItemRow>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .knowledge
            .iter()
            .filter(|k| k.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_knowledge_item(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.knowledge.len();
        inner
            .knowledge
            .retain(|k| !(k.id == id && k.user_id == user_id));
        Ok(inner.knowledge.len() < before)
    }

    async fn resolve_session(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sessions
            .get(token)
            .filter(|s| s.is_active(Utc::now()))
            .map(|s| s.user_id))
    }
}
