use serde::{Deserialize, Serialize};

/// What the rewriter does with a comment span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Emit verbatim.
    Keep,
    /// Emit with trailing whitespace stripped from every line.
    KeepTrimmed,
    /// Remove the comment (and its line, if nothing else is on it).
    Delete,
}

/// Which policy rule produced an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    DocComment,
    BlockComment,
    Marker,
    Directive,
    IgnorePattern,
    Narration,
    /// A deletion suppressed because the comment lies outside the selected lines.
    OutOfScope,
}

/// The fate of one comment span, keyed by its index in the scan output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionDecision {
    pub span_id: usize,
    pub action: Action,
    pub reason: Reason,
}
