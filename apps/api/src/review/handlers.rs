//! Axum route handler for running an analysis on an uploaded resume.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::Document;
use crate::review::orchestrator::AnalysisDiagnostics;
use crate::session::handlers::SessionViewResponse;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "job_description";

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub view: SessionViewResponse,
    pub diagnostics: AnalysisDiagnostics,
}

/// The parts of the multipart form this endpoint understands.
struct AnalysisForm {
    document: Document,
    job_description: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<AnalysisForm, AppError> {
    let mut document = None;
    let mut job_description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(RESUME_FIELD) => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid resume upload: {e}")))?;
                let mut upload = Document::new(bytes);
                if let Some(name) = file_name {
                    upload = upload.with_file_name(name);
                }
                if let Some(content_type) = content_type {
                    upload = upload.with_content_type(content_type);
                }
                document = Some(upload);
            }
            Some(JOB_DESCRIPTION_FIELD) => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Invalid job description: {e}"))
                })?;
                job_description = Some(text);
            }
            other => warn!("Ignoring unexpected form field {other:?}"),
        }
    }

    let document = document
        .ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;

    Ok(AnalysisForm {
        document,
        job_description,
    })
}

/// POST /api/v1/sessions/:id/analysis
///
/// Multipart form: `resume` (file, required), `job_description` (text, optional).
/// Runs the full pipeline and replaces the session state only on success.
pub async fn handle_run_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    if !state.sessions.contains(id).await {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }

    let form = read_form(multipart).await?;
    info!(
        "Running analysis for session {id} ({} byte upload)",
        form.document.bytes.len()
    );

    let run = state
        .orchestrator
        .run(form.document, form.job_description.as_deref())
        .await?;

    let view = SessionViewResponse::from_state(id, &run.state);
    if !state.sessions.replace(id, run.state).await {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }

    Ok(Json(AnalysisResponse {
        view,
        diagnostics: run.diagnostics,
    }))
}
