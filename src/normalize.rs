//! `text in -> text out`: scan, classify, rewrite.

use std::ops::RangeInclusive;

use thiserror::Error;
use tracing::trace;

use crate::classify::{Classifier, RetentionPolicy};
use crate::grammar::{GrammarRule, LanguageId};
use crate::model::{
    Action, Diagnostic, Reason, ReportedSpan, RetentionDecision, SCHEMA_VERSION, ScanReport,
    SourceInfo, SourceSpan, SpanEncoding, Summary, TOOL_NAME, TOOL_VERSION, ToolInfo,
};
use crate::rewrite::{self, RewriteOptions};
use crate::scan;
use crate::scan::util::LineIndex;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("unsupported language: {0:?}")]
    UnsupportedLanguage(String),
}

/// Options for a single normalization run.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub retention: RetentionPolicy,
    pub rewrite: RewriteOptions,

    /// Selective removal: when set, only comments touching one of these
    /// 1-based lines may be deleted. Everything else is kept as-is.
    pub only_lines: Option<LineRanges>,
}

/// Inclusive 1-based line ranges, as given to `--lines`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineRanges(Vec<RangeInclusive<usize>>);

impl LineRanges {
    pub fn new(ranges: Vec<RangeInclusive<usize>>) -> Self {
        Self(ranges)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ranges(&self) -> &[RangeInclusive<usize>] {
        &self.0
    }

    /// True if any range overlaps `first..=last`.
    pub fn touches(&self, first: usize, last: usize) -> bool {
        self.0.iter().any(|r| *r.start() <= last && first <= *r.end())
    }
}

impl FromIterator<RangeInclusive<usize>> for LineRanges {
    fn from_iter<I: IntoIterator<Item = RangeInclusive<usize>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Output of [`normalize`], plus the intermediate data for reports.
#[derive(Debug, Clone)]
pub struct NormalizedResult {
    pub output_text: String,
    pub spans: Vec<SourceSpan>,
    pub decisions: Vec<RetentionDecision>,
    pub diagnostics: Vec<Diagnostic>,
    pub language: LanguageId,
}

impl NormalizedResult {
    pub fn changed(&self, input: &str) -> bool {
        self.output_text != input
    }

    pub fn summary(&self) -> Summary {
        let mut s = Summary::default();
        for d in &self.decisions {
            s.record(d.action);
        }
        s
    }

    /// Builds the JSON report envelope for this run.
    pub fn report(&self, path: Option<&str>, input: &str) -> ScanReport {
        let mut by_span: Vec<Option<&RetentionDecision>> = vec![None; self.spans.len()];
        for d in &self.decisions {
            if let Some(slot) = by_span.get_mut(d.span_id) {
                *slot = Some(d);
            }
        }

        let spans = self
            .spans
            .iter()
            .zip(by_span)
            .map(|(s, d)| ReportedSpan {
                kind: s.kind,
                span: s.span,
                action: d.map(|d| d.action),
                reason: d.map(|d| d.reason),
            })
            .collect();

        ScanReport {
            schema_version: SCHEMA_VERSION,
            tool: ToolInfo {
                name: TOOL_NAME.to_string(),
                version: TOOL_VERSION.to_string(),
            },
            span_encoding: SpanEncoding::default(),
            language: self.language.name().to_string(),
            source: SourceInfo {
                path: path.map(str::to_string),
                md5: Some(format!("{:x}", md5::compute(input.as_bytes()))),
                byte_len: input.len() as u64,
            },
            diagnostics: self.diagnostics.clone(),
            spans,
            summary: self.summary(),
        }
    }
}

/// Normalizes `source` written in the language named by `language_tag`.
///
/// Unknown tags fail before any work is done.
pub fn normalize(
    source: &str,
    language_tag: &str,
    opts: &NormalizeOptions,
) -> Result<NormalizedResult, NormalizeError> {
    let lang: LanguageId = language_tag
        .parse()
        .map_err(|_| NormalizeError::UnsupportedLanguage(language_tag.to_string()))?;
    Ok(normalize_with_grammar(source, lang.grammar(), opts))
}

pub fn normalize_with_grammar(
    source: &str,
    grammar: &GrammarRule,
    opts: &NormalizeOptions,
) -> NormalizedResult {
    let scanned = scan::scan_document(source, grammar);
    let mut decisions = Classifier::new(grammar, &opts.retention).classify_all(&scanned.spans);

    if let Some(lines) = &opts.only_lines {
        restrict_to_lines(source, &scanned.spans, &mut decisions, lines);
    }

    let output_text = rewrite::rewrite_with_options(&scanned.spans, &decisions, &opts.rewrite);

    let result = NormalizedResult {
        output_text,
        spans: scanned.spans,
        decisions,
        diagnostics: scanned.diagnostics,
        language: grammar.language,
    };
    trace!(
        language = %grammar.language,
        spans = result.spans.len(),
        summary = ?result.summary(),
        "normalized"
    );
    result
}

/// Downgrades deletions of comments that touch none of `lines`.
fn restrict_to_lines(
    source: &str,
    spans: &[SourceSpan],
    decisions: &mut [RetentionDecision],
    lines: &LineRanges,
) {
    let index = LineIndex::new(source);

    for d in decisions.iter_mut().filter(|d| d.action == Action::Delete) {
        let Some(span) = spans.get(d.span_id) else {
            continue;
        };
        let range = span.span.range();
        let first = index.line_of(range.start);
        let last = index.line_of(range.end.saturating_sub(1).max(range.start));
        if !lines.touches(first, last) {
            d.action = Action::Keep;
            d.reason = Reason::OutOfScope;
        }
    }
}
