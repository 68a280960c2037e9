//! Review Orchestrator — runs one analysis end to end.
//!
//! Flow: extract → parse prompt → model → parse → review prompt → model → parse →
//!       reconcile missing sections → fresh `SessionState`.
//!
//! All-or-nothing: any extraction or transport failure aborts the run and no state is
//! returned. Unusable model output is not a failure; it degrades to empty structures
//! and a warning.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::extraction::{Document, ExtractionError, TextExtractor};
use crate::llm_client::{LlmError, ModelClient};
use crate::review::models::{ResumeStructure, ReviewStructure, NO_SECTIONS_SENTINEL};
use crate::review::parser::{parse_structured, ParseDiagnostic, ParsedOutput};
use crate::review::prompts::{PromptTemplates, TemplateError};
use crate::session::SessionState;

pub const EMPTY_PARSE_WARNING: &str = "Resume parsing returned empty output.";
pub const EMPTY_REVIEW_WARNING: &str = "Resume review returned empty output.";

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Prompt template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Model call failed: {0}")]
    Transport(#[from] LlmError),
}

// ────────────────────────────────────────────────────────────────────────────
// Run output
// ────────────────────────────────────────────────────────────────────────────

/// What one model stage produced, kept for diagnostic display.
#[derive(Debug, Clone, Serialize)]
pub struct StageDiagnostics {
    pub raw_output: String,
    /// The endpoint answered without a completion field.
    pub completion_missing: bool,
    pub parse: ParseDiagnostic,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisDiagnostics {
    pub extracted_text: String,
    pub parse_stage: StageDiagnostics,
    pub review_stage: StageDiagnostics,
    pub warnings: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub state: SessionState,
    pub diagnostics: AnalysisDiagnostics,
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ReviewOrchestrator {
    model: Arc<dyn ModelClient>,
    extractor: Arc<dyn TextExtractor>,
    templates: Arc<PromptTemplates>,
}

impl ReviewOrchestrator {
    pub fn new(
        model: Arc<dyn ModelClient>,
        extractor: Arc<dyn TextExtractor>,
        templates: Arc<PromptTemplates>,
    ) -> Self {
        Self {
            model,
            extractor,
            templates,
        }
    }

    /// Runs a full analysis. `job_description` is trimmed; blank means "no job description".
    pub async fn run(
        &self,
        document: Document,
        job_description: Option<&str>,
    ) -> Result<AnalysisRun, ReviewError> {
        // Step 1: Extract text (CPU-bound, off the async executor)
        let extracted_text = self.extract(document).await?;
        info!("Extracted {} chars of resume text", extracted_text.len());

        let mut warnings = Vec::new();

        // Step 2: Parse stage
        let parse_prompt = self.templates.parse_prompt(&extracted_text)?;
        info!("Parsing resume [step 1 of 2]");
        let (parse_stage, parsed) = self.call_and_parse(&parse_prompt).await?;
        let resume = ResumeStructure::from_mapping(parsed.mapping);

        if resume.is_empty() {
            warn!("{EMPTY_PARSE_WARNING}");
            warnings.push(EMPTY_PARSE_WARNING.to_string());
        }

        let sections = if resume.is_empty() {
            vec![NO_SECTIONS_SENTINEL.to_string()]
        } else {
            resume.section_names()
        };

        // Step 3: Review stage
        let job_description = job_description.map(str::trim).filter(|jd| !jd.is_empty());
        let review_prompt = self
            .templates
            .review_prompt(&resume.to_yaml(), job_description)?;
        info!(
            "Reviewing resume [step 2 of 2] (job description: {})",
            job_description.is_some()
        );
        let (review_stage, parsed) = self.call_and_parse(&review_prompt).await?;
        let mut review = ReviewStructure::from_mapping(parsed.mapping);

        if review.is_empty() {
            warn!("{EMPTY_REVIEW_WARNING}");
            warnings.push(EMPTY_REVIEW_WARNING.to_string());
        } else {
            info!("Review covers {} section(s)", review.len());
        }

        // Step 4: Reconcile
        let filled = review.fill_missing(&sections);
        if filled > 0 {
            info!("Filled {filled} section(s) missing from the review with defaults");
        }

        // Step 5: Assemble
        info!("Analysis complete: {} section(s)", sections.len());
        Ok(AnalysisRun {
            state: SessionState::new(resume, review, sections),
            diagnostics: AnalysisDiagnostics {
                extracted_text,
                parse_stage,
                review_stage,
                warnings,
                completed_at: Utc::now(),
            },
        })
    }

    async fn extract(&self, document: Document) -> Result<String, ExtractionError> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract(&document))
            .await
            .map_err(|e| ExtractionError::Aborted(e.to_string()))?
    }

    async fn call_and_parse(
        &self,
        prompt: &str,
    ) -> Result<(StageDiagnostics, ParsedOutput), ReviewError> {
        let completion = self.model.invoke(prompt).await?;
        let completion_missing = completion.is_missing();
        if completion_missing {
            warn!("Model returned no completion; treating as empty output");
        }

        let raw_output = completion.into_string();
        let parsed = parse_structured(&raw_output);

        Ok((
            StageDiagnostics {
                raw_output,
                completion_missing,
                parse: parsed.diagnostic.clone(),
            },
            parsed,
        ))
    }
}
