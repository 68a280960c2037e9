// Prompt templates for the parse and review stages, and the builder that fills them.
// Templates are configuration: the built-ins below can be replaced file by file from PROMPT_DIR.

use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

/// Expected shape of the parsed resume. Replaces `{resume_schema}`.
pub const RESUME_YAML_SCHEMA: &str = r#"name: string
contact:
  email: string
  phone: string
  location: string
  links: [string]
summary: string
work_experience:
  - company: string
    role: string
    start_date: string
    end_date: string | "Present"
    highlights: [string]
education:
  - institution: string
    degree: string
    graduation_date: string
skills: [string]
projects:
  - name: string
    description: string
    technologies: [string]
certifications: [string]"#;

/// Expected shape of the review. Replaces `{review_output_schema}`.
pub const REVIEW_OUTPUT_SCHEMA: &str = r#"<section_name>:
  impact_level: Low | Medium | High
  revision_suggestion:
    - string
  revised_content: string"#;

/// Parse stage. Replace: {resume_schema}, {resume_text}
pub const PARSE_PROMPT_TEMPLATE: &str = r#"You are a precise resume data extractor.
Convert the resume text below into YAML that follows this schema:

{resume_schema}

RULES:
1. Output ONLY the YAML document. No prose, no explanations.
2. Keep the section order in which sections appear in the resume.
3. Omit sections the resume does not contain. Do NOT invent content.
4. Quote any value that contains a colon.

RESUME TEXT:
{resume_text}"#;

/// Review stage without a job description. Replace: {resume_data}, {review_output_schema}
pub const REVIEW_PROMPT_TEMPLATE: &str = r#"You are an experienced recruiter reviewing a resume.
For EVERY top-level section of the resume below, judge how much a revision would improve it
and rewrite the section.

Return YAML with exactly this shape, one entry per resume section, using the same section names:

{review_output_schema}

RULES:
1. impact_level is one of Low, Medium, High.
2. revision_suggestion is a list of short, concrete, actionable suggestions.
3. revised_content is the full rewritten section as plain text.
4. Use ONLY facts present in the resume. Do NOT invent metrics, employers or dates.
5. Output ONLY the YAML document.

RESUME (YAML):
{resume_data}"#;

/// Review stage against a job description.
/// Replace: {resume_data}, {job_description}, {review_output_schema}
pub const JOB_REVIEW_PROMPT_TEMPLATE: &str = r#"You are an experienced recruiter tailoring a resume to a specific role.
For EVERY top-level section of the resume below, judge how much a revision would improve its fit
for the job description and rewrite the section to match the role.

Return YAML with exactly this shape, one entry per resume section, using the same section names:

{review_output_schema}

RULES:
1. impact_level is one of Low, Medium, High, reflecting relevance to the job.
2. revision_suggestion is a list of short, concrete, actionable suggestions.
3. revised_content is the full rewritten section as plain text, using the job's vocabulary
   where the resume supports it.
4. Use ONLY facts present in the resume. Do NOT invent metrics, employers or dates.
5. Output ONLY the YAML document.

JOB DESCRIPTION:
{job_description}

RESUME (YAML):
{resume_data}"#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Prompt field '{0}' is required but was not provided")]
    MissingField(&'static str),

    #[error("Template placeholder '{{{0}}}' has no value")]
    UnboundPlaceholder(String),
}

/// Which template to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    Parse,
    Review,
    ReviewWithJobDescription,
}

impl PromptMode {
    /// Review mode for an optional job description. Blank descriptions select plain review.
    pub fn for_review(job_description: Option<&str>) -> Self {
        match job_description.map(str::trim) {
            Some(jd) if !jd.is_empty() => PromptMode::ReviewWithJobDescription,
            _ => PromptMode::Review,
        }
    }

    fn required_fields(&self) -> &'static [&'static str] {
        match self {
            PromptMode::Parse => &["resume_schema", "resume_text"],
            PromptMode::Review => &["resume_data", "review_output_schema"],
            PromptMode::ReviewWithJobDescription => {
                &["resume_data", "job_description", "review_output_schema"]
            }
        }
    }
}

/// Named values available for substitution. Only the fields the mode needs must be set.
#[derive(Debug, Clone, Default)]
pub struct PromptFields<'a> {
    pub resume_schema: Option<&'a str>,
    pub resume_text: Option<&'a str>,
    pub resume_data: Option<&'a str>,
    pub job_description: Option<&'a str>,
    pub review_output_schema: Option<&'a str>,
}

impl<'a> PromptFields<'a> {
    fn lookup(&self, name: &str) -> Option<&'a str> {
        match name {
            "resume_schema" => self.resume_schema,
            "resume_text" => self.resume_text,
            "resume_data" => self.resume_data,
            "job_description" => self.job_description,
            "review_output_schema" => self.review_output_schema,
            _ => None,
        }
    }
}

/// The three stage templates plus the two schema descriptions.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub parse: String,
    pub review: String,
    pub job_review: String,
    pub resume_schema: String,
    pub review_output_schema: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            parse: PARSE_PROMPT_TEMPLATE.to_string(),
            review: REVIEW_PROMPT_TEMPLATE.to_string(),
            job_review: JOB_REVIEW_PROMPT_TEMPLATE.to_string(),
            resume_schema: RESUME_YAML_SCHEMA.to_string(),
            review_output_schema: REVIEW_OUTPUT_SCHEMA.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Loads overrides from `dir`. Files that do not exist keep the built-in value.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut templates = Self::default();
        let slots: [(&str, &mut String); 5] = [
            ("parse_prompt.txt", &mut templates.parse),
            ("review_prompt.txt", &mut templates.review),
            ("job_review_prompt.txt", &mut templates.job_review),
            ("resume_schema.yaml", &mut templates.resume_schema),
            ("review_schema.yaml", &mut templates.review_output_schema),
        ];

        for (file, slot) in slots {
            let path = dir.join(file);
            if path.is_file() {
                *slot = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
                info!("Loaded prompt override {}", path.display());
            }
        }

        Ok(templates)
    }

    pub fn template(&self, mode: PromptMode) -> &str {
        match mode {
            PromptMode::Parse => &self.parse,
            PromptMode::Review => &self.review,
            PromptMode::ReviewWithJobDescription => &self.job_review,
        }
    }

    /// Fills the template for `mode`. No length cap is applied.
    pub fn build(&self, mode: PromptMode, fields: &PromptFields<'_>) -> Result<String, TemplateError> {
        for &name in mode.required_fields() {
            if fields.lookup(name).is_none() {
                return Err(TemplateError::MissingField(name));
            }
        }
        fill_template(self.template(mode), fields)
    }

    pub fn parse_prompt(&self, resume_text: &str) -> Result<String, TemplateError> {
        self.build(
            PromptMode::Parse,
            &PromptFields {
                resume_schema: Some(&self.resume_schema),
                resume_text: Some(resume_text),
                ..Default::default()
            },
        )
    }

    /// Picks the job-description variant iff `job_description` is non-blank.
    pub fn review_prompt(
        &self,
        resume_data: &str,
        job_description: Option<&str>,
    ) -> Result<String, TemplateError> {
        let mode = PromptMode::for_review(job_description);
        self.build(
            mode,
            &PromptFields {
                resume_data: Some(resume_data),
                job_description: job_description.map(str::trim),
                review_output_schema: Some(&self.review_output_schema),
                ..Default::default()
            },
        )
    }
}

/// Single-pass `{name}` substitution. Inserted values are never re-scanned.
/// `{{` and `}}` produce literal braces. Other brace sequences that are not identifiers
/// are copied through untouched.
fn fill_template(template: &str, fields: &PromptFields<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(at) = rest.find(['{', '}']) {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let after = &tail[1..];
        let placeholder = after
            .find('}')
            .map(|close| &after[..close])
            .filter(|name| is_identifier(name));

        match placeholder {
            Some(name) => {
                let value = fields
                    .lookup(name)
                    .ok_or_else(|| TemplateError::UnboundPlaceholder(name.to_string()))?;
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    Ok(out)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt_contains_schema_and_text() {
        let prompt = PromptTemplates::default()
            .parse_prompt("Jane Doe, Rust engineer")
            .unwrap();
        assert!(prompt.contains("work_experience:"));
        assert!(prompt.contains("Jane Doe, Rust engineer"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_blank_job_description_uses_plain_review_template() {
        let templates = PromptTemplates::default();
        assert_eq!(PromptMode::for_review(Some("   \n")), PromptMode::Review);
        assert_eq!(PromptMode::for_review(None), PromptMode::Review);

        let prompt = templates.review_prompt("skills: Rust", Some("  ")).unwrap();
        assert!(!prompt.contains("JOB DESCRIPTION:"));
        assert!(prompt.contains("skills: Rust"));
    }

    #[test]
    fn test_job_description_selects_job_template() {
        let templates = PromptTemplates::default();
        let prompt = templates
            .review_prompt("skills: Rust", Some("  Senior Rust Engineer  "))
            .unwrap();
        assert!(prompt.contains("JOB DESCRIPTION:\nSenior Rust Engineer\n"));
    }

    #[test]
    fn test_missing_required_field_is_template_error() {
        let err = PromptTemplates::default()
            .build(
                PromptMode::ReviewWithJobDescription,
                &PromptFields {
                    resume_data: Some("x"),
                    review_output_schema: Some("y"),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, TemplateError::MissingField("job_description"));
    }

    #[test]
    fn test_template_referencing_unsupplied_field_fails() {
        let templates = PromptTemplates {
            parse: "{resume_text} {job_description}".to_string(),
            ..Default::default()
        };
        let err = templates.parse_prompt("text").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnboundPlaceholder("job_description".to_string())
        );
    }

    #[test]
    fn test_braces_in_inserted_text_are_not_substituted() {
        let fields = PromptFields {
            resume_text: Some("uses {job_description} and {x: 1}"),
            ..Default::default()
        };
        let out = fill_template("A {resume_text} B", &fields).unwrap();
        assert_eq!(out, "A uses {job_description} and {x: 1} B");
    }

    #[test]
    fn test_non_identifier_braces_stay_literal() {
        let fields = PromptFields::default();
        assert_eq!(
            fill_template("{ a: 1 } {} {unclosed", &fields).unwrap(),
            "{ a: 1 } {} {unclosed"
        );
    }

    #[test]
    fn test_doubled_braces_are_literal() {
        let fields = PromptFields {
            resume_text: Some("Rust"),
            ..Default::default()
        };
        assert_eq!(
            fill_template("{{\"skills\": \"{resume_text}\"}} {{resume_text}}", &fields).unwrap(),
            "{\"skills\": \"Rust\"} {resume_text}"
        );
    }

    #[test]
    fn test_loaded_template_with_escaped_example() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("review_prompt.txt"),
            "Example: {{skills: {{impact_level: Low}}}}\n{resume_data}",
        )
        .unwrap();

        let templates = PromptTemplates::load(dir.path()).unwrap();
        let prompt = templates.review_prompt("skills: Rust", None).unwrap();
        assert_eq!(prompt, "Example: {skills: {impact_level: Low}}\nskills: Rust");
    }

    #[test]
    fn test_oversized_input_is_not_truncated() {
        let big = "x".repeat(500_000);
        let prompt = PromptTemplates::default().parse_prompt(&big).unwrap();
        assert!(prompt.contains(&big));
    }

    #[test]
    fn test_load_overrides_only_present_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("parse_prompt.txt"), "PARSE {resume_text}").unwrap();

        let templates = PromptTemplates::load(dir.path()).unwrap();
        assert_eq!(templates.parse, "PARSE {resume_text}");
        assert_eq!(templates.review, REVIEW_PROMPT_TEMPLATE);
        assert_eq!(templates.parse_prompt("hi").unwrap(), "PARSE hi");
    }
}
