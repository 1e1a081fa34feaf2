//! HTTP Handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use assistant_core::{
    credential,
    interaction::{self, Notice, SubmitOutcome, EMPTY_QUESTION_NOTICE},
    AgentError, AgentStep, Message, Session, SessionId,
};
use assistant_tools::build_agent;

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub model: String,
    pub encyclopedia_connected: bool,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: SessionId,
    pub title: String,
    pub transcript: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionResponse {
    fn new(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title(),
            transcript: session.transcript.entries().to_vec(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub failed: bool,
    pub steps: Vec<AgentStep>,
    pub notice: Notice,
    pub transcript: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn not_found(id: &SessionId) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "SESSION_NOT_FOUND",
        format!("Session {id} not found"),
    )
}

fn busy() -> ApiError {
    api_error(
        StatusCode::CONFLICT,
        "SESSION_BUSY",
        interaction::PROCESSING_NOTICE,
    )
}

fn setup_failed(e: &AgentError) -> ApiError {
    tracing::error!("Provider setup failed: {}", e);
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "PROVIDER_SETUP",
        e.user_message(),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let encyclopedia_connected = state.encyclopedia.health_check().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.connector.name().to_string(),
        model: state.settings.model.clone(),
        encyclopedia_connected,
        sessions: state.sessions.len(),
    })
}

/// Start a session seeded with the greeting
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let (id, handle) = state.sessions.create();
    let session = handle.lock().await;
    tracing::info!(session = %id, "Session created");

    (
        StatusCode::CREATED,
        Json(SessionResponse::new(&session)),
    )
}

/// Current transcript of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let id = SessionId::from_string(id);
    let handle = state.sessions.get(&id).ok_or_else(|| not_found(&id))?;
    let session = handle.try_lock().map_err(|_| busy())?;

    Ok(Json(SessionResponse::new(&session)))
}

/// End a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::from_string(id);
    if state.sessions.remove(&id) {
        tracing::info!(session = %id, "Session ended");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

/// Answer one question within a session
///
/// The submit runs on its own task, which owns the session lock; a dropped
/// request still records both turns.
pub async fn ask(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(payload) = payload
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", e.body_text()))?;

    // Nothing is built without a key
    let credential = credential::gate(payload.api_key.as_deref())
        .map_err(|e| api_error(StatusCode::UNAUTHORIZED, "MISSING_CREDENTIAL", e.user_message()))?;

    let id = SessionId::from_string(id);
    let handle = state.sessions.get(&id).ok_or_else(|| not_found(&id))?;
    let mut session = handle.try_lock_owned().map_err(|_| busy())?;

    if payload.question.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "EMPTY_QUESTION",
            EMPTY_QUESTION_NOTICE,
        ));
    }

    let provider = state
        .connector
        .connect(&credential)
        .map_err(|e| setup_failed(&e))?;
    let agent = build_agent(provider, state.encyclopedia.clone(), &state.settings)
        .map_err(|e| setup_failed(&e))?;

    let question = payload.question;
    let outcome = tokio::spawn(async move {
        let outcome = interaction::submit(&mut session, &agent, &question).await;
        (outcome, session.transcript.entries().to_vec())
    })
    .await;

    let (outcome, transcript) = outcome.map_err(|e| {
        tracing::error!("Submit task failed: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "An unexpected error occurred.",
        )
    })?;

    match outcome {
        SubmitOutcome::Answered(submission) => Ok(Json(AskResponse {
            answer: submission.answer,
            failed: submission.failed,
            steps: submission.steps,
            notice: submission.notice,
            transcript,
        })),
        SubmitOutcome::Rejected(notice) => {
            let text = match notice {
                Notice::Info(t) | Notice::Warning(t) | Notice::Success(t) | Notice::Error(t) => t,
            };
            Err(api_error(StatusCode::BAD_REQUEST, "EMPTY_QUESTION", text))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, Response},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use assistant_core::{
        credential::MISSING_CREDENTIAL_NOTICE,
        interaction::ERROR_PREFIX,
        mock::{MockConnector, MockProvider},
        session::GREETING,
        MemorySessionStore,
    };
    use assistant_tools::{encyclopedia::MockEncyclopedia, AssistantSettings};

    use super::*;

    fn app(connector: &MockConnector) -> (Router, Arc<MemorySessionStore>) {
        let sessions = Arc::new(MemorySessionStore::new());
        let state = AppState {
            connector: Arc::new(connector.clone()),
            encyclopedia: Arc::new(MockEncyclopedia::new()),
            sessions: sessions.clone(),
            settings: AssistantSettings::default(),
        };
        (crate::router(state, "static"), sessions)
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(&MockConnector::default());
        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["provider"], "Mock");
        assert_eq!(body["encyclopedia_connected"], true);
    }

    #[tokio::test]
    async fn test_create_session_is_seeded() {
        let (app, sessions) = app(&MockConnector::default());
        let response = app.oneshot(post("/api/sessions", &json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["transcript"][0]["role"], "assistant");
        assert_eq!(body["transcript"][0]["content"], GREETING);
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_ask_without_key_builds_nothing() {
        let connector = MockConnector::default();
        let (app, sessions) = app(&connector);
        let (id, handle) = sessions.create();

        let response = app
            .oneshot(post(
                &format!("/api/sessions/{id}/ask"),
                &json!({"question": "What is 2+2?", "api_key": "   "}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["code"], "MISSING_CREDENTIAL");
        assert_eq!(body["error"], MISSING_CREDENTIAL_NOTICE);
        assert_eq!(connector.connections(), 0);
        assert_eq!(handle.lock().await.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_ask_blank_question() {
        let connector = MockConnector::default();
        let (app, sessions) = app(&connector);
        let (id, handle) = sessions.create();

        let response = app
            .oneshot(post(
                &format!("/api/sessions/{id}/ask"),
                &json!({"question": "  \n", "api_key": "gsk_test"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "EMPTY_QUESTION");
        assert_eq!(handle.lock().await.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_ask_malformed_body() {
        let connector = MockConnector::default();
        let (app, sessions) = app(&connector);
        let (id, handle) = sessions.create();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/sessions/{id}/ask"))
                    .header("content-type", "application/json")
                    .body(Body::from("question=hello"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "INVALID_REQUEST");
        assert!(!body["error"].as_str().unwrap().is_empty());
        assert_eq!(connector.connections(), 0);
        assert_eq!(handle.lock().await.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_ask_unknown_session() {
        let (app, _) = app(&MockConnector::default());
        let response = app
            .oneshot(post(
                "/api/sessions/missing/ask",
                &json!({"question": "Hi", "api_key": "gsk_test"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_ask_answers_and_extends_transcript() {
        let connector = MockConnector::new(MockProvider::new([
            "```tool\n{\"tool\": \"Wikipedia\", \"arguments\": {\"query\": \"Paris\"}}\n```",
            "Paris is the capital of France.",
        ]));
        let (app, sessions) = app(&connector);
        let (id, _) = sessions.create();

        let response = app
            .oneshot(post(
                &format!("/api/sessions/{id}/ask"),
                &json!({"question": "What is the capital of France?", "api_key": "gsk_test"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["answer"], "Paris is the capital of France.");
        assert_eq!(body["failed"], false);
        assert_eq!(body["steps"][0]["tool"], "Wikipedia");
        assert_eq!(body["notice"]["level"], "success");

        let transcript = body["transcript"].as_array().unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1]["role"], "user");
        assert_eq!(transcript[2]["content"], "Paris is the capital of France.");
        assert_eq!(connector.connections(), 1);
    }

    #[tokio::test]
    async fn test_ask_provider_failure_becomes_error_answer() {
        let connector = MockConnector::new(
            MockProvider::default().then_fail(AgentError::Auth("invalid api key".into())),
        );
        let (app, sessions) = app(&connector);
        let (id, _) = sessions.create();

        let response = app
            .oneshot(post(
                &format!("/api/sessions/{id}/ask"),
                &json!({"question": "Hello?", "api_key": "gsk_bad"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["failed"], true);
        assert!(body["answer"].as_str().unwrap().starts_with(ERROR_PREFIX));
        assert_eq!(body["notice"]["level"], "error");
        assert_eq!(body["transcript"][2]["metadata"]["error"], true);
    }

    #[tokio::test]
    async fn test_ask_while_processing_is_rejected() {
        let connector = MockConnector::default();
        let (app, sessions) = app(&connector);
        let (id, handle) = sessions.create();
        let _guard = handle.lock().await;

        let response = app
            .oneshot(post(
                &format!("/api/sessions/{id}/ask"),
                &json!({"question": "Hi", "api_key": "gsk_test"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["code"], "SESSION_BUSY");
        assert_eq!(connector.connections(), 0);
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let (app, sessions) = app(&MockConnector::default());
        let (id, _) = sessions.create();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(get(&format!("/api/sessions/{id}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
