//! Session state and the section paging state machine.
//!
//! A `SessionState` is replaced wholesale by every successful analysis run. Between runs
//! only the cursor moves. Navigation saturates at both ends and never fails.

pub mod handlers;
pub mod store;

use serde::Serialize;
use serde_yaml::Value;

use crate::render::render;
use crate::review::models::{ImpactLevel, ResumeStructure, ReviewRecord, ReviewStructure};

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub resume: ResumeStructure,
    pub review: ReviewStructure,
    pub sections: Vec<String>,
    pub cursor: usize,
}

/// Everything the comparison view needs for one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub name: String,
    /// 1-based.
    pub position: usize,
    pub total: usize,
    pub original: String,
    pub revised: String,
    pub impact_level: ImpactLevel,
    pub indicator: &'static str,
    pub suggestions: Vec<String>,
}

impl SessionState {
    pub fn new(resume: ResumeStructure, review: ReviewStructure, sections: Vec<String>) -> Self {
        Self {
            resume,
            review,
            sections,
            cursor: 0,
        }
    }

    /// No analysis has produced sections yet; paging is disabled.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn next(&mut self) {
        if let Some(last) = self.sections.len().checked_sub(1) {
            self.cursor = (self.cursor + 1).min(last);
        }
    }

    pub fn previous(&mut self) {
        self.clamp();
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Back to the first section. A no-op when there are none.
    pub fn jump_to_start(&mut self) {
        self.cursor = 0;
    }

    /// Cursor clamped into range, or `None` when there are no sections.
    fn index(&self) -> Option<usize> {
        let last = self.sections.len().checked_sub(1)?;
        Some(self.cursor.min(last))
    }

    fn clamp(&mut self) {
        if let Some(index) = self.index() {
            self.cursor = index;
        }
    }

    /// `(current, total)`, 1-based.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.index().map(|i| (i + 1, self.sections.len()))
    }

    /// Pure read of the section under the cursor.
    pub fn current_section(&self) -> Option<SectionView> {
        let (position, total) = self.position()?;
        let name = &self.sections[position - 1];

        let original = self.resume.get(name).cloned().unwrap_or(Value::Null);
        let record = self.review.get(name).cloned().unwrap_or_default();

        Some(build_view(name, position, total, &original, &record))
    }
}

fn build_view(
    name: &str,
    position: usize,
    total: usize,
    original: &Value,
    record: &ReviewRecord,
) -> SectionView {
    SectionView {
        name: name.to_string(),
        position,
        total,
        original: render(name, original),
        revised: render(name, &record.revised_content),
        impact_level: record.impact_level,
        indicator: record.impact_level.indicator(),
        suggestions: record.revision_suggestion.bullet_lines(),
    }
}
