pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::knowledge::handlers as knowledge;
use crate::proposals::handlers as proposals;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Proposals API
        .route(
            "/api/v1/proposals",
            get(proposals::handle_list).post(proposals::handle_submit),
        )
        .route(
            "/api/v1/proposals/duplicate-check",
            post(proposals::handle_duplicate_check),
        )
        .route("/api/v1/proposals/grouped", get(proposals::handle_grouped))
        .route("/api/v1/proposals/status", get(proposals::handle_status))
        .route(
            "/api/v1/proposals/:id",
            get(proposals::handle_get).delete(proposals::handle_delete),
        )
        // Knowledge base API
        .route(
            "/api/v1/knowledge",
            get(knowledge::handle_list).post(knowledge::handle_add),
        )
        .route("/api/v1/knowledge/upload", post(knowledge::handle_upload))
        .route("/api/v1/knowledge/:id", delete(knowledge::handle_delete))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::util::ServiceExt; // for `oneshot`
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::LlmError;
    use crate::proposals::generator::ProposalGenerator;
    use crate::store::{InMemoryStore, ProposalStore};

    const TOKEN: &str = "test-session";

    struct EchoGenerator;

    #[async_trait]
    impl ProposalGenerator for EchoGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _context: &str,
            credential: Option<&str>,
        ) -> Result<String, LlmError> {
            credential.ok_or(LlmError::MissingCredential)?;
            Ok(format!(
                "Match Score: 91% — Direct overlap\n\nProposal for: {prompt}"
            ))
        }
    }

    /// Parks inside `generate` until released.
    #[derive(Default)]
    struct GatedGenerator {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ProposalGenerator for GatedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _context: &str,
            _credential: Option<&str>,
        ) -> Result<String, LlmError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(format!("Match Score: 77% — Late reply\n\nProposal for: {prompt}"))
        }
    }

    fn test_config(api_key: Option<&str>) -> Config {
        Config {
            database_url: None,
            gemini_api_key: api_key.map(str::to_string),
            dev_session_token: None,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }

    async fn setup_app(api_key: Option<&str>) -> Router {
        let (app, _, _) = setup_app_with(Arc::new(EchoGenerator), api_key).await;
        app
    }

    async fn setup_app_with(
        generator: Arc<dyn ProposalGenerator>,
        api_key: Option<&str>,
    ) -> (Router, Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let user_id = Uuid::new_v4();
        store.add_session(TOKEN, user_id, None).await;
        let state = AppState::new(store.clone(), generator, test_config(api_key));
        (build_router(state), store, user_id)
    }

    fn authed(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn extract_json(body: Body) -> Value {
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Should read body");
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    }

    fn job_post() -> String {
        "Looking for a Meta Ads buyer to scale a beauty brand from $20k to $100k monthly spend \
         while keeping blended ROAS above 2.5x across prospecting and retargeting."
            .to_string()
    }

    #[tokio::test]
    async fn test_health_needs_no_auth() {
        let app = setup_app(Some("server-key")).await;
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ambient_credential"], true);
    }

    #[tokio::test]
    async fn test_requests_without_session_are_rejected() {
        let app = setup_app(None).await;
        let request = Request::builder()
            .uri("/api/v1/proposals")
            .header(header::AUTHORIZATION, "Bearer nope")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_submit_then_list_and_group() {
        let app = setup_app(Some("server-key")).await;

        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/api/v1/proposals",
                Some(json!({ "job_description": job_post() })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "completed");
        assert_eq!(body["match_score"], "Match Score: 91% — Direct overlap");
        assert_eq!(body["persistence"]["state"], "saved");
        let id = body["persistence"]["record"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(authed("GET", "/api/v1/proposals", None))
            .await
            .unwrap();
        let list = extract_json(response.into_body()).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["score_percent"], 91);

        let response = app
            .clone()
            .oneshot(authed("GET", "/api/v1/proposals/grouped?mode=month", None))
            .await
            .unwrap();
        let groups = extract_json(response.into_body()).await;
        assert_eq!(groups[0]["label"], "This Month");
        assert_eq!(groups[0]["records"][0]["id"], id.as_str());

        let response = app
            .clone()
            .oneshot(authed("GET", &format!("/api/v1/proposals/{id}"), None))
            .await
            .unwrap();
        let detail = extract_json(response.into_body()).await;
        assert!(detail["parsed"]["body"]
            .as_str()
            .unwrap()
            .starts_with("Proposal for:"));

        let response = app
            .clone()
            .oneshot(authed("DELETE", &format!("/api/v1/proposals/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(authed("DELETE", &format!("/api/v1/proposals/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_resubmission_reports_duplicate_until_overridden() {
        let app = setup_app(Some("server-key")).await;
        let submit = |override_duplicate: bool| {
            authed(
                "POST",
                "/api/v1/proposals",
                Some(json!({
                    "job_description": job_post(),
                    "override_duplicate": override_duplicate
                })),
            )
        };

        app.clone().oneshot(submit(false)).await.unwrap();

        let response = app.clone().oneshot(submit(false)).await.unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "duplicate_found");

        let response = app.clone().oneshot(
            authed(
                "POST",
                "/api/v1/proposals/duplicate-check",
                Some(json!({ "job_description": job_post() })),
            ),
        )
        .await
        .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["is_duplicate"], true);

        let response = app.clone().oneshot(submit(true)).await.unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "completed");

        let response = app
            .oneshot(authed("GET", "/api/v1/proposals", None))
            .await
            .unwrap();
        let list = extract_json(response.into_body()).await;
        assert_eq!(list.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_key_surfaces_error_text() {
        let app = setup_app(None).await;
        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/api/v1/proposals",
                Some(json!({ "job_description": job_post() })),
            ))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "failed");
        assert_eq!(
            body["message"],
            format!("Error: {}", LlmError::MissingCredential)
        );

        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/api/v1/proposals",
                Some(json!({ "job_description": job_post(), "api_key": "user-key" })),
            ))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "completed");
    }

    #[tokio::test]
    async fn test_status_reports_idle_after_submission() {
        let app = setup_app(Some("server-key")).await;
        app.clone()
            .oneshot(authed(
                "POST",
                "/api/v1/proposals",
                Some(json!({ "job_description": job_post() })),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(authed("GET", "/api/v1/proposals/status", None))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["generating"], false);
    }

    #[tokio::test]
    async fn test_client_disconnect_does_not_cancel_generation() {
        let generator = Arc::new(GatedGenerator::default());
        let (app, store, user_id) = setup_app_with(generator.clone(), Some("server-key")).await;

        let request = authed(
            "POST",
            "/api/v1/proposals",
            Some(json!({ "job_description": job_post() })),
        );
        let client = tokio::spawn(app.oneshot(request));
        generator.entered.notified().await;

        // Dropping the request future is what the server does on disconnect.
        client.abort();
        assert!(client.await.unwrap_err().is_cancelled());

        generator.release.notify_one();
        let mut saved = Vec::new();
        for _ in 0..200 {
            saved = store.list_proposals(user_id).await.unwrap();
            if !saved.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(saved.len(), 1, "generation was cancelled with the request");
        assert_eq!(saved[0].match_score.as_deref(), Some("Match Score: 77% — Late reply"));
    }

    #[tokio::test]
    async fn test_blank_submission_is_a_validation_error() {
        let app = setup_app(Some("server-key")).await;
        let response = app
            .oneshot(authed(
                "POST",
                "/api/v1/proposals",
                Some(json!({ "job_description": "   " })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_knowledge_add_list_delete() {
        let app = setup_app(Some("server-key")).await;

        let response = app
            .clone()
            .oneshot(authed(
                "POST",
                "/api/v1/knowledge",
                Some(json!({ "items": [
                    { "name": "wins.txt", "content": "4.2x ROAS for a supplement brand" },
                    { "name": "bio.md", "content": "Ten years in DTC", "type": "text/markdown" }
                ]})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = extract_json(response.into_body()).await;
        assert_eq!(created[0]["type"], "text/plain");
        assert_eq!(created[1]["type"], "text/markdown");
        let id = created[0]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(authed("DELETE", &format!("/api/v1/knowledge/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(authed("GET", "/api/v1/knowledge", None))
            .await
            .unwrap();
        let items = extract_json(response.into_body()).await;
        assert_eq!(items.as_array().unwrap().len(), 1);
        assert_eq!(items[0]["name"], "bio.md");
    }

    #[tokio::test]
    async fn test_knowledge_multipart_upload() {
        let app = setup_app(Some("server-key")).await;
        let boundary = "X-BOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"case-study.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             Grew TikTok Shop GMV 6x in 90 days\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/knowledge/upload")
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = extract_json(response.into_body()).await;
        assert_eq!(created[0]["name"], "case-study.txt");
        assert_eq!(created[0]["content"], "Grew TikTok Shop GMV 6x in 90 days");
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_skipped_and_text_file_saved() {
        let app = setup_app(Some("server-key")).await;
        let boundary = "X-BOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"deck.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.4\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"rates.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             $85/hr, 20 hr minimum\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/knowledge/upload")
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = extract_json(response.into_body()).await;
        assert_eq!(created.as_array().unwrap().len(), 1);
        assert_eq!(created[0]["name"], "rates.txt");
    }
}
