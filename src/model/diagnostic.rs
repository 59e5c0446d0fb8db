use crate::model::Span;
use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// The pipeline stage that produced the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticPhase {
    Scan,
    Classify,
    Rewrite,
}

/// A structured diagnostic explaining a recovery decision.
///
/// Nothing in the core is fatal apart from an unknown language, so these are
/// informational: they record where the scanner had to close an unterminated
/// construct and similar best-effort choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<DiagnosticPhase>,

    /// A stable identifier like `lex.unterminated_block_comment`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Human readable message.
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Shorthand for the scanner's recovery notes.
    pub fn scan_info(code: &str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Info,
            phase: Some(DiagnosticPhase::Scan),
            code: Some(code.to_string()),
            message: message.into(),
            span: Some(span),
            notes: vec![],
        }
    }
}
