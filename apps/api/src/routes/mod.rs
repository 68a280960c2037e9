pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::review::handlers as review;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/next",
            post(session::handle_next_section),
        )
        .route(
            "/api/v1/sessions/:id/previous",
            post(session::handle_previous_section),
        )
        .route(
            "/api/v1/sessions/:id/start",
            post(session::handle_first_section),
        )
        // Analysis
        .route(
            "/api/v1/sessions/:id/analysis",
            post(review::handle_run_analysis),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::extraction::DocumentExtractor;
    use crate::llm_client::mock::ScriptedModel;
    use crate::review::orchestrator::ReviewOrchestrator;
    use crate::review::prompts::PromptTemplates;
    use crate::session::store::SessionStore;

    const BOUNDARY: &str = "resumeai-test-boundary";

    fn app(model: ScriptedModel) -> Router {
        let config = Config {
            model_endpoint_url: "http://model.invalid".to_string(),
            model_api_key: None,
            port: 0,
            rust_log: "debug".to_string(),
            prompt_dir: None,
            max_upload_bytes: 1024 * 1024,
        };
        let orchestrator = ReviewOrchestrator::new(
            Arc::new(model),
            Arc::new(DocumentExtractor),
            Arc::new(PromptTemplates::default()),
        );
        build_router(AppState {
            orchestrator,
            sessions: SessionStore::new(),
            config,
        })
    }

    fn multipart_body(resume: &str, job_description: Option<&str>) -> String {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"resume.txt\"\r\nContent-Type: text/plain\r\n\r\n{resume}\r\n"
        );
        if let Some(jd) = job_description {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"job_description\"\r\n\r\n{jd}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<String>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(b) => {
                request = request.header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                );
                Body::from(b)
            }
            None => Body::empty(),
        };
        app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let response = send(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json(response).await["session_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(ScriptedModel::new());
        let response = send(&app, "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_new_session_reports_empty_state() {
        let app = app(ScriptedModel::new());
        let id = create_session(&app).await;

        let body = json(send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await).await;
        assert_eq!(body["status"], "empty");
        assert!(body["section"].is_null());
        assert!(body["message"].as_str().unwrap().contains("upload a resume"));

        // Paging an empty session is a no-op, not an error.
        let response = send(&app, "POST", &format!("/api/v1/sessions/{id}/next"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, "POST", &format!("/api/v1/sessions/{id}/start"), None).await;
        assert_eq!(json(response).await["status"], "empty");
    }

    #[tokio::test]
    async fn test_analysis_then_paging() {
        let model = ScriptedModel::new()
            .reply("summary: Backend engineer\nskills: Python, Go\n")
            .reply("skills:\n  impact_level: Medium\n  revision_suggestion: Add metrics\n  revised_content: Python, Go, Rust\n");
        let app = app(model);
        let id = create_session(&app).await;

        let response = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/analysis"),
            Some(multipart_body("Jane Doe\nSkills: Python, Go", Some("Rust role"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["status"], "active");
        assert_eq!(body["sections"], serde_json::json!(["summary", "skills"]));
        assert_eq!(body["section"]["name"], "summary");
        assert_eq!(body["section"]["position"], 1);
        assert_eq!(body["section"]["total"], 2);
        assert_eq!(body["section"]["impact_level"], "Low");
        assert_eq!(
            body["diagnostics"]["extracted_text"],
            "Jane Doe\nSkills: Python, Go"
        );

        let next = json(send(&app, "POST", &format!("/api/v1/sessions/{id}/next"), None).await).await;
        assert_eq!(next["section"]["name"], "skills");
        assert_eq!(next["section"]["indicator"], "warning");
        assert_eq!(next["section"]["suggestions"], serde_json::json!(["- Add metrics"]));
        assert_eq!(next["section"]["revised"], "Skills\nPython, Go, Rust");

        // Saturates at the last section.
        let again = json(send(&app, "POST", &format!("/api/v1/sessions/{id}/next"), None).await).await;
        assert_eq!(again["section"]["position"], 2);

        let back = json(send(&app, "POST", &format!("/api/v1/sessions/{id}/previous"), None).await).await;
        assert_eq!(back["section"]["name"], "summary");

        send(&app, "POST", &format!("/api/v1/sessions/{id}/next"), None).await;
        let start = json(send(&app, "POST", &format!("/api/v1/sessions/{id}/start"), None).await).await;
        assert_eq!(start["section"]["name"], "summary");
        assert_eq!(start["section"]["position"], 1);
    }

    #[tokio::test]
    async fn test_failed_analysis_keeps_previous_state() {
        let model = ScriptedModel::new()
            .reply("skills: Rust\n")
            .reply("{}")
            .fail(503);
        let app = app(model);
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}/analysis");

        let ok = send(&app, "POST", &uri, Some(multipart_body("Rust", None))).await;
        assert_eq!(ok.status(), StatusCode::OK);

        let failed = send(&app, "POST", &uri, Some(multipart_body("Go", None))).await;
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json(failed).await["error"]["code"], "LLM_ERROR");

        let body = json(send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await).await;
        assert_eq!(body["sections"], serde_json::json!(["skills"]));
    }

    #[tokio::test]
    async fn test_unreadable_document_is_unprocessable() {
        let app = app(ScriptedModel::new());
        let id = create_session(&app).await;

        let response = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/analysis"),
            Some(multipart_body("%PDF-1.4 garbage", None)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_missing_resume_field_is_validation_error() {
        let app = app(ScriptedModel::new());
        let id = create_session(&app).await;
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"job_description\"\r\n\r\nRust\r\n--{BOUNDARY}--\r\n"
        );

        let response = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/analysis"),
            Some(body),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = app(ScriptedModel::new());
        let uri = format!("/api/v1/sessions/{}", Uuid::new_v4());
        assert_eq!(
            send(&app, "GET", &uri, None).await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            send(&app, "POST", &format!("{uri}/previous"), None).await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            send(&app, "DELETE", &uri, None).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = app(ScriptedModel::new());
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}");
        assert_eq!(
            send(&app, "DELETE", &uri, None).await.status(),
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            send(&app, "GET", &uri, None).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}
