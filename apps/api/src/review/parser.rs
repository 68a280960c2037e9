//! Structured-Output Parser — turns untrusted model text into a YAML mapping.
//!
//! Never fails. Anything that is not a mapping degrades to an empty mapping, and the
//! `ParseDiagnostic` records why so callers can surface a warning.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::warn;

/// Why a parse produced the mapping it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ParseDiagnostic {
    /// Input decoded to a mapping.
    Parsed,
    /// Input was empty or whitespace only.
    Empty,
    /// Input was not valid structured text.
    Malformed(String),
    /// Input decoded to a scalar, sequence or null.
    NotAMapping,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOutput {
    pub mapping: Mapping,
    pub diagnostic: ParseDiagnostic,
}

impl ParsedOutput {
    fn degraded(diagnostic: ParseDiagnostic) -> Self {
        Self {
            mapping: Mapping::new(),
            diagnostic,
        }
    }
}

const FENCE: &str = "```";

/// Parses `raw` as a YAML document and keeps it only if it is a mapping.
///
/// The text is decoded as-is first. Only when that does not yield a mapping is the first
/// fenced code block tried instead, so backticks inside a valid mapping are left alone.
pub fn parse_structured(raw: &str) -> ParsedOutput {
    let direct = decode(raw);
    if direct.diagnostic == ParseDiagnostic::Parsed {
        return direct;
    }

    let out = match fenced_block(raw) {
        Some(body) => decode(body),
        None => direct,
    };

    match &out.diagnostic {
        ParseDiagnostic::Malformed(e) => warn!("Model output failed to parse as YAML: {e}"),
        ParseDiagnostic::NotAMapping => {
            warn!("Model output is structured text but not a mapping")
        }
        ParseDiagnostic::Parsed | ParseDiagnostic::Empty => {}
    }
    out
}

fn decode(text: &str) -> ParsedOutput {
    let text = text.trim();
    if text.is_empty() {
        return ParsedOutput::degraded(ParseDiagnostic::Empty);
    }

    match serde_yaml::from_str::<Value>(text) {
        Ok(value) => match unwrap_tag(value) {
            Value::Mapping(mapping) => ParsedOutput {
                mapping,
                diagnostic: ParseDiagnostic::Parsed,
            },
            _ => ParsedOutput::degraded(ParseDiagnostic::NotAMapping),
        },
        Err(e) => ParsedOutput::degraded(ParseDiagnostic::Malformed(e.to_string())),
    }
}

fn unwrap_tag(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => unwrap_tag(tagged.value),
        other => other,
    }
}

/// Body of the first ```yaml ... ``` (or bare ```) block. Prose before and after is dropped.
///
/// The opening fence must start its line. The block closes at the next line holding only a
/// fence at the same indentation, so indented fences inside block scalars stay in the body.
/// An unterminated block runs to the end of the text.
fn fenced_block(text: &str) -> Option<&str> {
    let mut offset = 0;
    let mut open: Option<(&str, usize)> = None;

    for line in text.split_inclusive('\n') {
        match open {
            None => {
                let content = line.trim_start();
                if content.starts_with(FENCE) {
                    let indent = &line[..line.len() - content.len()];
                    open = Some((indent, offset + line.len()));
                }
            }
            Some((indent, start)) => {
                if line.trim_end().strip_prefix(indent) == Some(FENCE) {
                    return Some(&text[start..offset]);
                }
            }
        }
        offset += line.len();
    }

    open.map(|(_, start)| &text[start..])
}
