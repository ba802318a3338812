use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::errors::AppError;
use crate::knowledge::extract::extract_text_blocking;
use crate::models::knowledge::{default_mime_type, KnowledgeItemRow, NewKnowledgeItem};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddKnowledgeRequest {
    pub items: Vec<NewKnowledgeItem>,
}

/// GET /api/v1/knowledge
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<Json<Vec<KnowledgeItemRow>>, AppError> {
    Ok(Json(state.store.list_knowledge_items(user.user_id).await?))
}

/// POST /api/v1/knowledge
pub async fn handle_add(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(req): Json<AddKnowledgeRequest>,
) -> Result<(StatusCode, Json<Vec<KnowledgeItemRow>>), AppError> {
    if req.items.is_empty() {
        return Err(AppError::Validation("items cannot be empty".to_string()));
    }
    if req.items.iter().any(|i| i.name.trim().is_empty()) {
        return Err(AppError::Validation(
            "every knowledge item needs a name".to_string(),
        ));
    }

    let rows = state
        .store
        .insert_knowledge_items(user.user_id, req.items)
        .await?;
    info!("Added {} knowledge items for user {}", rows.len(), user.user_id);
    Ok((StatusCode::CREATED, Json(rows)))
}

/// POST /api/v1/knowledge/upload (multipart/form-data, one part per file)
///
/// Files that cannot be read are skipped with a warning; the rest are saved.
pub async fn handle_upload(
    State(state): State<AppState>,
    user: AuthedUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<KnowledgeItemRow>>), AppError> {
    let mut items = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(default_mime_type);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;

        match extract_text_blocking(name.clone(), mime_type.clone(), data).await {
            Ok(content) => items.push(NewKnowledgeItem {
                name,
                content,
                mime_type,
            }),
            Err(e) => warn!("Skipping knowledge upload '{name}': {e}"),
        }
    }

    if items.is_empty() {
        return Err(AppError::Validation(
            "no readable files in upload".to_string(),
        ));
    }

    let rows = state
        .store
        .insert_knowledge_items(user.user_id, items)
        .await?;
    info!("Uploaded {} knowledge files for user {}", rows.len(), user.user_id);
    Ok((StatusCode::CREATED, Json(rows)))
}

/// DELETE /api/v1/knowledge/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_knowledge_item(user.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Knowledge item {id} not found")))
    }
}
