//! TextFSM parser engine.
//!
//! Turns one host's raw command output into structured rows using the
//! template selected by the index for a `(platform, command)` pair. Parsing
//! never fails loudly: every zero-row outcome carries exactly one
//! [`ParseReason`] explaining why, so an empty structured view is always
//! diagnosable without raw-text inspection.

use std::collections::HashMap;
use std::fmt;
use std::fs;

use log::debug;
use serde::{Serialize, Serializer};
use textfsm_rust::Template;

use crate::templates::TemplateDirectory;

/// One structured row: column name to value, as produced by the template.
pub type Row = HashMap<String, String>;

/// Why structured parsing produced zero rows.
///
/// Exactly one reason accompanies every zero-row outcome; success is
/// `rows` non-empty with no reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseReason {
    /// No template directory with a readable index file was resolved.
    IndexNotFound,

    /// The index has no entry for this platform/command pair.
    NoMatchingTemplate,

    /// The raw output was empty, so there was nothing to parse.
    EmptyInput,

    /// The template failed to compile or raised during matching.
    ExecutionError(String),

    /// The template ran but matched zero rows of the output.
    ZeroRows,
}

impl fmt::Display for ParseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexNotFound => write!(f, "templates-index-not-found"),
            Self::NoMatchingTemplate => write!(f, "no-matching-template"),
            Self::EmptyInput => write!(f, "parser-unavailable-or-empty-input"),
            Self::ExecutionError(msg) => write!(f, "template-execution-error: {msg}"),
            Self::ZeroRows => write!(f, "zero-rows-matched"),
        }
    }
}

impl Serialize for ParseReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of one parse attempt.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Structured rows; empty when parsing failed or matched nothing.
    pub rows: Vec<Row>,

    /// Failure reason; `None` exactly when `rows` is the successful output.
    pub reason: Option<ParseReason>,
}

impl ParseOutcome {
    fn failure(reason: ParseReason) -> Self {
        Self {
            rows: Vec::new(),
            reason: Some(reason),
        }
    }

    /// Whether parsing succeeded.
    pub fn is_success(&self) -> bool {
        self.reason.is_none()
    }
}

/// Parse raw command output into structured rows.
///
/// Pure given its arguments: the same platform, command, text and directory
/// snapshot always yield the same rows and reason. Short-circuits down the
/// decision ladder; template execution faults are captured into
/// [`ParseReason::ExecutionError`], never propagated.
pub fn parse(
    platform: &str,
    command: &str,
    raw: &str,
    directory: &TemplateDirectory,
) -> ParseOutcome {
    if !directory.index_present {
        return ParseOutcome::failure(ParseReason::IndexNotFound);
    }

    let Some(entry) = directory.index.find(platform, command) else {
        return ParseOutcome::failure(ParseReason::NoMatchingTemplate);
    };

    if raw.trim().is_empty() {
        return ParseOutcome::failure(ParseReason::EmptyInput);
    }

    let Some(template_path) = directory.template_path(&entry.template) else {
        return ParseOutcome::failure(ParseReason::ExecutionError(
            "template root missing".to_string(),
        ));
    };

    let source = match fs::read_to_string(&template_path) {
        Ok(source) => source,
        Err(e) => {
            return ParseOutcome::failure(ParseReason::ExecutionError(format!(
                "cannot read template '{}': {e}",
                entry.template
            )));
        }
    };

    let template = match Template::parse_str(&source) {
        Ok(template) => template,
        Err(e) => {
            return ParseOutcome::failure(ParseReason::ExecutionError(format!(
                "template '{}': {e}",
                entry.template
            )));
        }
    };

    let mut parser = template.parser();
    let rows = match parser.parse_text_to_dicts(raw) {
        Ok(rows) => rows,
        Err(e) => {
            return ParseOutcome::failure(ParseReason::ExecutionError(format!(
                "template '{}': {e}",
                entry.template
            )));
        }
    };

    if rows.is_empty() {
        return ParseOutcome::failure(ParseReason::ZeroRows);
    }

    debug!(
        "parsed {} row(s) for ({platform}, {command}) via {}",
        rows.len(),
        entry.template
    );
    ParseOutcome { rows, reason: None }
}
