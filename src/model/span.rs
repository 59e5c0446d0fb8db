use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A half-open byte-span `[start, end)` into the **raw** source file.
///
/// Offsets are measured in bytes (UTF-8) against the input exactly as it was
/// read. Line endings are never rewritten before spanning, so a span can always
/// be used to slice the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
pub struct Span {
    pub start: u64,
    pub end: u64,
}

impl Span {
    #[inline]
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "Span start must be <= end");
        Self { start, end }
    }

    #[inline]
    pub fn from_range(range: Range<usize>) -> Self {
        Self::new(range.start as u64, range.end as u64)
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[inline]
    pub fn contains(&self, pos: u64) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// Lexical class of a [`SourceSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Code,
    StringLiteral,
    CharLiteral,
    LineComment,
    BlockComment,
    DocComment,
}

impl SpanKind {
    #[inline]
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            SpanKind::LineComment | SpanKind::BlockComment | SpanKind::DocComment
        )
    }

    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(self, SpanKind::StringLiteral | SpanKind::CharLiteral)
    }
}

/// A maximal slice of the input with exactly one lexical kind.
///
/// A scan produces these in order; concatenating every `text` gives back the
/// input byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub kind: SpanKind,
    pub span: Span,
    pub text: String,
}

impl SourceSpan {
    pub fn new(kind: SpanKind, src: &str, range: Range<usize>) -> Self {
        Self {
            kind,
            text: src[range.clone()].to_string(),
            span: Span::from_range(range),
        }
    }
}
