//! Axum route handlers for session lifecycle and section paging.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::{SectionView, SessionState};
use crate::state::AppState;

const EMPTY_SESSION_MESSAGE: &str =
    "Please upload a resume and run the analysis to view results.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Empty,
    Active,
}

/// The comparison view for the section under the cursor, or the empty-state message.
#[derive(Debug, Serialize)]
pub struct SessionViewResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub sections: Vec<String>,
    pub section: Option<SectionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SessionViewResponse {
    pub fn from_state(session_id: Uuid, state: &SessionState) -> Self {
        if state.is_empty() {
            return Self {
                session_id,
                status: SessionStatus::Empty,
                sections: Vec::new(),
                section: None,
                message: Some(EMPTY_SESSION_MESSAGE.to_string()),
            };
        }

        Self {
            session_id,
            status: SessionStatus::Active,
            sections: state.sections.clone(),
            section: state.current_section(),
            message: None,
        }
    }
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionViewResponse>, AppError> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(SessionViewResponse::from_state(id, &session)))
}

/// POST /api/v1/sessions/:id/next
pub async fn handle_next_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionViewResponse>, AppError> {
    navigate(&state, id, SessionState::next).await
}

/// POST /api/v1/sessions/:id/previous
pub async fn handle_previous_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionViewResponse>, AppError> {
    navigate(&state, id, SessionState::previous).await
}

/// POST /api/v1/sessions/:id/start
pub async fn handle_first_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionViewResponse>, AppError> {
    navigate(&state, id, SessionState::jump_to_start).await
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}

async fn navigate(
    state: &AppState,
    id: Uuid,
    step: fn(&mut SessionState),
) -> Result<Json<SessionViewResponse>, AppError> {
    state
        .sessions
        .update(id, |session| {
            step(session);
            SessionViewResponse::from_state(id, session)
        })
        .await
        .map(Json)
        .ok_or_else(|| session_not_found(id))
}
