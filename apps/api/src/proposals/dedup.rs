//! Duplicate detection: has this job posting been answered before?
//!
//! Compares the first 100 characters of the new description against the user's
//! history, case-insensitively. Fail-open: a store outage reports "not a duplicate"
//! so the user is never blocked from generating.

use tracing::warn;
use uuid::Uuid;

use crate::proposals::fingerprint::fingerprint;
use crate::store::ProposalStore;

pub async fn is_duplicate(store: &dyn ProposalStore, user_id: Uuid, text: &str) -> bool {
    let prefix = fingerprint(text);
    if prefix.is_empty() {
        return false;
    }

    match store.has_description_prefix(user_id, prefix).await {
        Ok(found) => found,
        Err(e) => {
            warn!("Duplicate check failed for user {user_id}, treating as unique: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::proposal::NewProposal;
    use crate::store::testing::FaultyStore;
    use crate::store::InMemoryStore;

    fn long_description() -> String {
        "We are a fast-growing DTC wellness brand looking for an experienced TikTok Shop \
         operator to run affiliate outreach, manage our storefront and scale our Meta Ads."
            .to_string()
    }

    async fn store_with(user_id: Uuid, description: &str) -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .insert_proposal(NewProposal {
                user_id,
                job_description: description.to_string(),
                proposal_text: "Hi".to_string(),
                match_score: None,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_identical_description_is_duplicate() {
        let user = Uuid::new_v4();
        let text = long_description();
        assert!(text.chars().count() > 100);
        let store = store_with(user, &text).await;

        assert!(is_duplicate(&store, user, &text).await);
    }

    #[tokio::test]
    async fn test_change_after_100th_char_is_still_duplicate() {
        let user = Uuid::new_v4();
        let text = long_description();
        let store = store_with(user, &text).await;

        let mut edited: String = text.chars().take(100).collect();
        edited.push_str(" Budget is flexible for the right partner.");
        assert!(is_duplicate(&store, user, &edited).await);
    }

    #[tokio::test]
    async fn test_change_within_first_100_chars_is_not_duplicate() {
        let user = Uuid::new_v4();
        let text = long_description();
        let store = store_with(user, &text).await;

        let edited = text.replacen("fast-growing", "slow-growing", 1);
        assert!(!is_duplicate(&store, user, &edited).await);
    }

    #[tokio::test]
    async fn test_case_differences_still_match() {
        let user = Uuid::new_v4();
        let text = long_description();
        let store = store_with(user, &text).await;

        assert!(is_duplicate(&store, user, &text.to_uppercase()).await);
    }

    #[tokio::test]
    async fn test_other_users_history_is_ignored() {
        let text = long_description();
        let store = store_with(Uuid::new_v4(), &text).await;

        assert!(!is_duplicate(&store, Uuid::new_v4(), &text).await);
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let store = FaultyStore {
            fail_reads: true,
            ..Default::default()
        };
        assert!(!is_duplicate(&store, Uuid::new_v4(), &long_description()).await);
    }
}
