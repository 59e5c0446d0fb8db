//! Span model, retention decisions, and the JSON report envelope.
//!
//! This module is the contract between:
//! 1) scanning source text -> `SourceSpan`s,
//! 2) classifying comment spans -> `RetentionDecision`s, and
//! 3) rewriting spans + decisions -> output text.
//!
//! Spans always refer to the **raw input bytes**; nothing upstream of the
//! scanner is allowed to normalize the text.

mod decision;
mod diagnostic;
mod envelope;
mod span;

pub use decision::*;
pub use diagnostic::*;
pub use envelope::*;
pub use span::*;

/// JSON schema version for the report envelope.
///
/// Bump this when making non-backwards-compatible changes to the JSON structure.
pub const SCHEMA_VERSION: u32 = 1;

/// The tool name stored in the JSON envelope.
pub const TOOL_NAME: &str = "decomment";

/// The tool version stored in the JSON envelope.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
