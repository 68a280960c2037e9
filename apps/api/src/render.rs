//! Renders a resume section (or its revised counterpart) as display text.
//!
//! The model's output shape is not guaranteed, so any YAML value is accepted and flattened:
//! strings verbatim, sequences as `- item` lines, mappings as `Label: value` lines, with two
//! spaces of indentation per nesting level.

use serde_yaml::Value;

use crate::review::models::key_to_string;

const INDENT: &str = "  ";

/// Heading line with the humanized section name, followed by the flattened content.
pub fn render(section_name: &str, content: &Value) -> String {
    let heading = humanize(section_name);
    let body = render_body(content);
    if body.is_empty() {
        heading
    } else {
        format!("{heading}\n{body}")
    }
}

/// Flattened content without a heading.
pub fn render_body(content: &Value) -> String {
    render_lines(content, 0).join("\n")
}

/// `work_experience` → `Work Experience`.
pub fn humanize(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_lines(value: &Value, depth: usize) -> Vec<String> {
    let pad = INDENT.repeat(depth);
    match value {
        Value::Null => Vec::new(),
        Value::Tagged(tagged) => render_lines(&tagged.value, depth),
        Value::Sequence(items) => items
            .iter()
            .flat_map(|item| render_item(item, depth))
            .collect(),
        Value::Mapping(fields) => fields
            .iter()
            .flat_map(|(key, field)| render_field(&key_to_string(key), field, depth))
            .collect(),
        scalar => scalar_text(scalar)
            .lines()
            .map(|line| format!("{pad}{line}"))
            .collect(),
    }
}

/// One sequence element. Nested content is rendered one level deeper and the first
/// line takes the `- ` marker in place of its indentation.
fn render_item(item: &Value, depth: usize) -> Vec<String> {
    let pad = INDENT.repeat(depth);
    let mut lines = render_lines(item, depth + 1);
    match lines.first_mut() {
        Some(first) => {
            *first = format!("{pad}- {}", first.trim_start());
        }
        None => lines.push(format!("{pad}-")),
    }
    lines
}

fn render_field(key: &str, field: &Value, depth: usize) -> Vec<String> {
    let pad = INDENT.repeat(depth);
    let label = humanize(key);
    match field {
        Value::Null => Vec::new(),
        Value::Tagged(tagged) => render_field(key, &tagged.value, depth),
        Value::Sequence(_) | Value::Mapping(_) => {
            let mut lines = vec![format!("{pad}{label}:")];
            lines.extend(render_lines(field, depth + 1));
            lines
        }
        scalar => {
            let text = scalar_text(scalar);
            let mut text_lines = text.lines();
            let first = text_lines.next().unwrap_or_default();
            let mut lines = vec![format!("{pad}{label}: {first}").trim_end().to_string()];
            lines.extend(text_lines.map(|line| format!("{pad}{INDENT}{line}")));
            lines
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
