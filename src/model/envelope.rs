use crate::model::{Action, Diagnostic, Reason, Span, SpanKind};
use serde::{Deserialize, Serialize};

/// JSON document written by `--report`.
///
/// Wraps the scan of one file with enough metadata to debug a retention
/// decision after the fact (schema versioning, span encoding, source info,
/// diagnostics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Schema version for this JSON payload.
    pub schema_version: u32,

    pub tool: ToolInfo,

    /// How to interpret all `Span` values contained in this file.
    pub span_encoding: SpanEncoding,

    /// Canonical language name, e.g. `cpp`.
    pub language: String,

    pub source: SourceInfo,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,

    pub spans: Vec<ReportedSpan>,

    pub summary: Summary,
}

/// Identifies the program that produced the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Captures how `Span` offsets should be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEncoding {
    pub unit: SpanUnit,
    pub base: SpanBase,
}

impl Default for SpanEncoding {
    fn default() -> Self {
        Self {
            unit: SpanUnit::Byte,
            base: SpanBase::RawInput,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanUnit {
    /// Byte offsets (UTF-8).
    Byte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanBase {
    /// Offsets are measured against the input bytes exactly as read.
    RawInput,
}

/// Information about the input the report describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Hex MD5 of the input, handy for spotting stale reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,

    /// Length of the input in bytes.
    pub byte_len: u64,
}

/// One scanned span and, for comments, its fate.
///
/// The span text itself is omitted; slice the source with `span` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedSpan {
    pub kind: SpanKind,
    pub span: Span,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
}

/// Per-action comment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub kept: usize,
    pub trimmed: usize,
    pub deleted: usize,
}

impl Summary {
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Keep => self.kept += 1,
            Action::KeepTrimmed => self.trimmed += 1,
            Action::Delete => self.deleted += 1,
        }
    }
}
