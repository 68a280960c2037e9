//! Resume and review structures built from parsed model output.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Section name used when the parse stage produced no sections.
pub const NO_SECTIONS_SENTINEL: &str = "No Sections Found";

// ────────────────────────────────────────────────────────────────────────────
// Resume
// ────────────────────────────────────────────────────────────────────────────

/// Section name → section content, in the order the model emitted them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeStructure {
    sections: Mapping,
}

impl ResumeStructure {
    /// Normalizes every key to a string. Later duplicates overwrite earlier values in place.
    pub fn from_mapping(mapping: Mapping) -> Self {
        let mut sections = Mapping::new();
        for (key, value) in mapping {
            sections.insert(Value::String(key_to_string(&key)), value);
        }
        Self { sections }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section_names(&self) -> Vec<String> {
        self.sections
            .keys()
            .filter_map(|k| k.as_str().map(String::from))
            .collect()
    }

    pub fn get(&self, section: &str) -> Option<&Value> {
        self.sections.get(section)
    }

    /// Serializes back to YAML for inclusion in the review prompt.
    pub fn to_yaml(&self) -> String {
        if self.sections.is_empty() {
            return "{}".to_string();
        }
        serde_yaml::to_string(&self.sections).unwrap_or_default()
    }
}

/// Stringifies a YAML key. Scalars use their plain form, anything else its YAML rendering.
pub fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Review
// ────────────────────────────────────────────────────────────────────────────

/// Severity attached to a suggested revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ImpactLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    /// Case-insensitive. Unknown labels fall back to `Low`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => ImpactLevel::High,
            "medium" => ImpactLevel::Medium,
            "low" => ImpactLevel::Low,
            other => {
                debug!("Unknown impact level {other:?}, defaulting to Low");
                ImpactLevel::Low
            }
        }
    }

    /// Visual treatment for the indicator: Low is informational, High is alarming.
    pub fn indicator(&self) -> &'static str {
        match self {
            ImpactLevel::Low => "info",
            ImpactLevel::Medium => "warning",
            ImpactLevel::High => "error",
        }
    }
}

/// A suggestion may come back as one sentence or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RevisionSuggestion {
    One(String),
    Many(Vec<String>),
}

impl Default for RevisionSuggestion {
    fn default() -> Self {
        RevisionSuggestion::Many(Vec::new())
    }
}

impl RevisionSuggestion {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => RevisionSuggestion::One(s.clone()),
            Value::Sequence(items) => {
                RevisionSuggestion::Many(items.iter().filter_map(scalar_to_string).collect())
            }
            other => match scalar_to_string(other) {
                Some(s) => RevisionSuggestion::One(s),
                None => RevisionSuggestion::default(),
            },
        }
    }

    pub fn items(&self) -> Vec<&str> {
        match self {
            RevisionSuggestion::One(s) => vec![s.as_str()],
            RevisionSuggestion::Many(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// One `- suggestion` line per item.
    pub fn bullet_lines(&self) -> Vec<String> {
        self.items().into_iter().map(|s| format!("- {s}")).collect()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Per-section review produced by the review stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub impact_level: ImpactLevel,
    pub revision_suggestion: RevisionSuggestion,
    /// Usually a string, but the model may return structured content.
    pub revised_content: Value,
}

impl Default for ReviewRecord {
    fn default() -> Self {
        Self {
            impact_level: ImpactLevel::Low,
            revision_suggestion: RevisionSuggestion::default(),
            revised_content: Value::String(String::new()),
        }
    }
}

impl ReviewRecord {
    /// Lenient conversion. A non-mapping value yields the default record; missing fields
    /// take their defaults individually.
    pub fn from_value(value: &Value) -> Self {
        let Value::Mapping(fields) = value else {
            return Self::default();
        };

        let impact_level = fields
            .get("impact_level")
            .and_then(scalar_to_string)
            .map(|l| ImpactLevel::from_label(&l))
            .unwrap_or_default();

        let revision_suggestion = fields
            .get("revision_suggestion")
            .map(RevisionSuggestion::from_value)
            .unwrap_or_default();

        let revised_content = fields
            .get("revised_content")
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));

        Self {
            impact_level,
            revision_suggestion,
            revised_content,
        }
    }
}

/// Section name → review record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewStructure {
    records: Vec<(String, ReviewRecord)>,
}

impl ReviewStructure {
    pub fn from_mapping(mapping: Mapping) -> Self {
        let mut review = Self::default();
        for (key, value) in &mapping {
            review.insert(key_to_string(key), ReviewRecord::from_value(value));
        }
        review
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn contains(&self, section: &str) -> bool {
        self.get(section).is_some()
    }

    pub fn get(&self, section: &str) -> Option<&ReviewRecord> {
        self.records
            .iter()
            .find(|(name, _)| name == section)
            .map(|(_, record)| record)
    }

    /// Inserts or replaces the record for `section`, keeping its original position.
    pub fn insert(&mut self, section: String, record: ReviewRecord) {
        match self.records.iter_mut().find(|(name, _)| *name == section) {
            Some(slot) => slot.1 = record,
            None => self.records.push((section, record)),
        }
    }

    /// Adds a default record for every section that has none. Returns how many were added.
    pub fn fill_missing<'a>(&mut self, sections: impl IntoIterator<Item = &'a String>) -> usize {
        let mut added = 0;
        for section in sections {
            if !self.contains(section) {
                self.records.push((section.clone(), ReviewRecord::default()));
                added += 1;
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn mapping(text: &str) -> Mapping {
        match yaml(text) {
            Value::Mapping(m) => m,
            other => panic!("expected mapping, got {other:?}"),
        }
    }

    #[test]
    fn test_resume_keys_normalized_to_strings_in_order() {
        let resume = ResumeStructure::from_mapping(mapping("name: Jane\n2020: Joined Acme\ntrue: yes\n"));
        assert_eq!(resume.section_names(), vec!["name", "2020", "true"]);
        assert_eq!(
            resume.get("2020").and_then(Value::as_str),
            Some("Joined Acme")
        );
    }

    #[test]
    fn test_empty_resume_serializes_to_empty_mapping() {
        assert_eq!(ResumeStructure::default().to_yaml(), "{}");
    }

    #[test]
    fn test_resume_yaml_round_trips_section_order() {
        let resume = ResumeStructure::from_mapping(mapping("skills: Rust\nsummary: Hi\n"));
        let again = ResumeStructure::from_mapping(mapping(&resume.to_yaml()));
        assert_eq!(again.section_names(), vec!["skills", "summary"]);
    }

    #[test]
    fn test_impact_level_labels() {
        assert_eq!(ImpactLevel::from_label("High"), ImpactLevel::High);
        assert_eq!(ImpactLevel::from_label(" medium "), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::from_label("LOW"), ImpactLevel::Low);
        assert_eq!(ImpactLevel::from_label("Critical"), ImpactLevel::Low);
    }

    #[test]
    fn test_impact_indicator_is_distinct_per_level() {
        assert_eq!(ImpactLevel::Low.indicator(), "info");
        assert_eq!(ImpactLevel::Medium.indicator(), "warning");
        assert_eq!(ImpactLevel::High.indicator(), "error");
    }

    #[test]
    fn test_single_string_suggestion_is_one_bullet() {
        let record = ReviewRecord::from_value(&yaml(
            "impact_level: Medium\nrevision_suggestion: Add metrics\nrevised_content: Led 5 engineers",
        ));
        assert_eq!(record.impact_level, ImpactLevel::Medium);
        assert_eq!(record.revision_suggestion.bullet_lines(), vec!["- Add metrics"]);
        assert_eq!(record.revised_content.as_str(), Some("Led 5 engineers"));
    }

    #[test]
    fn test_list_suggestion_keeps_order_and_skips_non_scalars() {
        let record = ReviewRecord::from_value(&yaml(
            "revision_suggestion:\n  - Quantify impact\n  - {nested: thing}\n  - 42\n",
        ));
        assert_eq!(
            record.revision_suggestion.bullet_lines(),
            vec!["- Quantify impact", "- 42"]
        );
    }

    #[test]
    fn test_non_mapping_record_is_default() {
        assert_eq!(ReviewRecord::from_value(&yaml("just text")), ReviewRecord::default());
    }

    #[test]
    fn test_default_record_shape() {
        let record = ReviewRecord::default();
        assert_eq!(record.impact_level, ImpactLevel::Low);
        assert!(record.revision_suggestion.items().is_empty());
        assert_eq!(record.revised_content.as_str(), Some(""));
    }

    #[test]
    fn test_fill_missing_only_adds_absent_sections() {
        let mut review = ReviewStructure::from_mapping(mapping(
            "skills:\n  impact_level: High\n  revision_suggestion: Group by domain\n",
        ));
        let sections = vec!["summary".to_string(), "skills".to_string()];
        assert_eq!(review.fill_missing(&sections), 1);
        assert_eq!(review.get("skills").unwrap().impact_level, ImpactLevel::High);
        assert_eq!(review.get("summary"), Some(&ReviewRecord::default()));
        assert_eq!(review.len(), 2);
    }

    #[test]
    fn test_review_keeps_sections_unknown_to_resume() {
        let review = ReviewStructure::from_mapping(mapping("hobbies:\n  impact_level: Low\n"));
        assert!(review.contains("hobbies"));
    }
}
