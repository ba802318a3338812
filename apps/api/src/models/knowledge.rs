use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KnowledgeItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewKnowledgeItem {
    pub name: String,
    pub content: String,
    #[serde(rename = "type", default = "default_mime_type")]
    pub mime_type: String,
}

pub fn default_mime_type() -> String {
    "text/plain".to_string()
}
