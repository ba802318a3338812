use crate::models::knowledge::KnowledgeItemRow;

/// Concatenates knowledge items into one context block, one file header per item.
/// An empty knowledge base yields an empty string.
pub fn build_knowledge_context(items: &[KnowledgeItemRow]) -> String {
    items
        .iter()
        .map(|item| format!("--- FILE: {} ---\n{}", item.name, item.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
