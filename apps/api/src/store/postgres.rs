use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::knowledge::{KnowledgeItemRow, NewKnowledgeItem};
use crate::models::proposal::{NewProposal, ProposalRow};
use crate::models::session::SessionRow;
use crate::store::{escape_like, ProposalStore, StoreError};

/// PostgreSQL backend. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProposalStore for PgStore {
    async fn insert_proposal(&self, proposal: NewProposal) -> Result<ProposalRow, StoreError> {
        let row = sqlx::query_as::<_, ProposalRow>(
            r#"
            INSERT INTO proposals (id, user_id, job_description, proposal_text, match_score)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(proposal.user_id)
        .bind(&proposal.job_description)
        .bind(&proposal.proposal_text)
        .bind(&proposal.match_score)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_proposals(&self, user_id: Uuid) -> Result<Vec<ProposalRow>, StoreError> {
        Ok(sqlx::query_as::<_, ProposalRow>(
            "SELECT * FROM proposals WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_proposal(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ProposalRow>, StoreError> {
        Ok(sqlx::query_as::<_, ProposalRow>(
            "SELECT * FROM proposals WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_proposal(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn has_description_prefix(
        &self,
        user_id: Uuid,
        prefix: &str,
    ) -> Result<bool, StoreError> {
        let pattern = format!("{}%", escape_like(prefix));
        let found: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM proposals
            WHERE user_id = $1 AND job_description ILIKE $2 ESCAPE '\'
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    async fn insert_knowledge_items(
        &self,
        user_id: Uuid,
        items: Vec<NewKnowledgeItem>,
    ) -> Result<Vec<KnowledgeItemRow>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let row = sqlx::query_as::<_, KnowledgeItemRow>(
                r#"
                INSERT INTO knowledge_items (id, user_id, name, content, mime_type)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&item.name)
            .bind(&item.content)
            .bind(&item.mime_type)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }

    async fn list_knowledge_items(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<KnowledgeItemRow>, StoreError> {
        Ok(sqlx::query_as::<_, KnowledgeItemRow>(
            "SELECT * FROM knowledge_items WHERE user_id = $1 ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_knowledge_item(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM knowledge_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn resolve_session(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        let session: Option<SessionRow> =
            sqlx::query_as("SELECT * FROM sessions WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(session
            .filter(|s| s.is_active(chrono::Utc::now()))
            .map(|s| s.user_id))
    }
}
