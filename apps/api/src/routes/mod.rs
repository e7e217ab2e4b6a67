pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::retrieval::handlers as retrieval;
use crate::search::handlers as search;
use crate::state::AppState;
use crate::storage::handlers as storage;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Chat
        .route("/api/chat", post(chat::handle_chat))
        .route("/api/jobs/naukri", post(chat::handle_naukri_jobs))
        // Feedback
        .route("/api/feedback", post(storage::handle_submit_feedback))
        .route("/api/feedback/:session_id", get(storage::handle_get_feedback))
        // Sessions
        .route("/api/sessions", post(storage::handle_create_session))
        .route(
            "/api/sessions/:session_id",
            get(storage::handle_get_session).put(storage::handle_update_session),
        )
        // Web search and retrieval
        .route("/api/search", post(search::handle_search))
        .route("/query", post(retrieval::handle_query))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::chat::pipeline::ChatPipeline;
    use crate::llm_client::LlmClient;
    use crate::retrieval::embedding::HashingEmbedder;
    use crate::retrieval::{Document, RetrievalStore};
    use crate::scraping::HtmlScraper;
    use crate::storage::feedback_store::FeedbackStore;
    use crate::storage::session_store::SessionStore;

    /// State whose outbound clients are never reached by these requests.
    fn test_state(dir: &TempDir, documents: Vec<Document>) -> AppState {
        let sessions = Arc::new(SessionStore::open(dir.path(), 30).unwrap());
        let pipeline = ChatPipeline::new(
            Arc::new(LlmClient::new("test-key".to_string()).unwrap()),
            Arc::new(HtmlScraper::new(Duration::from_secs(1), None).unwrap()),
            sessions.clone(),
            3,
        );
        AppState {
            pipeline: Arc::new(pipeline),
            sessions,
            feedback: Arc::new(FeedbackStore::open(dir.path()).unwrap()),
            retriever: Arc::new(
                RetrievalStore::build(documents, Arc::new(HashingEmbedder::default())).unwrap(),
            ),
            search: None,
        }
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir, Vec::new()));

        let root = send(app.clone(), "GET", "/", None).await;
        assert_eq!(root.status(), StatusCode::OK);
        assert_eq!(json_body(root).await["message"], "Asha Chatbot API is running");

        let health = send(app, "GET", "/health", None).await;
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(json_body(health).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_blank_chat_query_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir, Vec::new()));

        let resp = send(
            app,
            "POST",
            "/api/chat",
            Some(json!({"session_id": "s1", "query": "  "})),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_feedback_roundtrip() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir, Vec::new()));

        let missing = send(app.clone(), "GET", "/api/feedback/s1", None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(missing).await["error"]["message"], "Feedback not found");

        let saved = send(
            app.clone(),
            "POST",
            "/api/feedback",
            Some(json!({"session_id": "s1", "query": "Very helpful", "contact_info": "a@b.c"})),
        )
        .await;
        assert_eq!(saved.status(), StatusCode::OK);
        assert_eq!(json_body(saved).await["status"], "success");

        let listed = send(app, "GET", "/api/feedback/s1", None).await;
        assert_eq!(listed.status(), StatusCode::OK);
        let entries = json_body(listed).await;
        assert_eq!(entries.as_array().map(Vec::len), Some(1));
        assert_eq!(entries[0]["feedback"], "Very helpful");
        assert_eq!(entries[0]["contact_info"], "a@b.c");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir, Vec::new()));

        let missing = send(app.clone(), "GET", "/api/sessions/s9", None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let created = send(
            app.clone(),
            "POST",
            "/api/sessions",
            Some(json!({"session_id": "s9"})),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let updated = send(
            app.clone(),
            "PUT",
            "/api/sessions/s9",
            Some(json!({
                "last_accessed": chrono::Utc::now(),
                "context": {"history": [{"query": "hi", "response": "hello"}]}
            })),
        )
        .await;
        assert_eq!(updated.status(), StatusCode::OK);

        let fetched = send(app.clone(), "GET", "/api/sessions/s9", None).await;
        assert_eq!(fetched.status(), StatusCode::OK);
        assert_eq!(json_body(fetched).await["context"]["history"][0]["response"], "hello");

        let unknown = send(
            app,
            "PUT",
            "/api/sessions/nobody",
            Some(json!({"last_accessed": chrono::Utc::now(), "context": {}})),
        )
        .await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_without_key_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir, Vec::new()));

        let resp = send(app, "POST", "/api/search", Some(json!({"query": "news"}))).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(resp).await["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_query_returns_best_document_or_none() {
        let dir = TempDir::new().unwrap();
        let doc = Document {
            content: "{\n  \"title\": \"Leadership summit for women\"\n}".to_string(),
            source: "herkey_events.json".to_string(),
        };
        let app = build_router(test_state(&dir, vec![doc.clone()]));

        let hit = send(
            app.clone(),
            "POST",
            "/query",
            Some(json!({"question": "women leadership summit"})),
        )
        .await;
        assert_eq!(hit.status(), StatusCode::OK);
        assert_eq!(json_body(hit).await["response"], doc.content.as_str());

        let empty_dir = TempDir::new().unwrap();
        let empty = build_router(test_state(&empty_dir, Vec::new()));
        let miss = send(empty, "POST", "/query", Some(json!({"question": "anything"}))).await;
        assert_eq!(json_body(miss).await["response"], "none");
    }
}
