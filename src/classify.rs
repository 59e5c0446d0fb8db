//! Comment retention policy.
//!
//! A decision depends only on the span's kind and text plus the immutable
//! policy and grammar; the classifier never looks at neighbouring spans.

use std::collections::BTreeSet;

use regex::Regex;

use crate::grammar::GrammarRule;
use crate::model::{Action, Reason, RetentionDecision, SourceSpan, SpanKind};

/// Markers that keep a line comment alive by default.
pub const DEFAULT_MARKERS: [&str; 3] = ["TODO", "FIXME", "NOTE"];

/// What to keep.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Case-sensitive prefixes matched against a line comment's body
    /// (marker symbol and leading whitespace stripped).
    pub marker_set: BTreeSet<String>,

    /// If false, doc comments are treated like ordinary comments of their form.
    pub preserve_doc_comments: bool,

    /// Keep line comments that are tool directives (`//go:build`, `# noqa`, ...).
    pub preserve_directives: bool,

    /// Line comments whose full text matches any of these are kept.
    pub ignore_patterns: Vec<Regex>,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            marker_set: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
            preserve_doc_comments: true,
            preserve_directives: true,
            ignore_patterns: Vec::new(),
        }
    }
}

/// Applies a [`RetentionPolicy`] to comment spans of one grammar.
pub struct Classifier<'a> {
    grammar: &'a GrammarRule,
    policy: &'a RetentionPolicy,
}

impl<'a> Classifier<'a> {
    pub fn new(grammar: &'a GrammarRule, policy: &'a RetentionPolicy) -> Self {
        Self { grammar, policy }
    }

    /// Decide the fate of one span. Code and literals get `None`.
    pub fn classify(&self, span_id: usize, span: &SourceSpan) -> Option<RetentionDecision> {
        let (action, reason) = match span.kind {
            SpanKind::Code | SpanKind::StringLiteral | SpanKind::CharLiteral => return None,
            SpanKind::DocComment if self.policy.preserve_doc_comments => {
                (Action::Keep, Reason::DocComment)
            }
            SpanKind::DocComment if self.grammar.is_block_doc(&span.text) => {
                (Action::KeepTrimmed, Reason::BlockComment)
            }
            SpanKind::BlockComment => (Action::KeepTrimmed, Reason::BlockComment),
            SpanKind::LineComment | SpanKind::DocComment => self.classify_line(&span.text),
        };
        Some(RetentionDecision {
            span_id,
            action,
            reason,
        })
    }

    /// Classify every span, returning decisions for comments only, in order.
    pub fn classify_all(&self, spans: &[SourceSpan]) -> Vec<RetentionDecision> {
        spans
            .iter()
            .enumerate()
            .filter_map(|(id, span)| self.classify(id, span))
            .collect()
    }

    fn classify_line(&self, text: &str) -> (Action, Reason) {
        let body = self.grammar.strip_line_marker(text).trim_start();
        if self.policy.marker_set.iter().any(|m| body.starts_with(m.as_str())) {
            return (Action::Keep, Reason::Marker);
        }
        if self.policy.preserve_directives && self.grammar.is_directive(text) {
            return (Action::Keep, Reason::Directive);
        }
        if self.policy.ignore_patterns.iter().any(|re| re.is_match(text)) {
            return (Action::Keep, Reason::IgnorePattern);
        }
        (Action::Delete, Reason::Narration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{LanguageId, grammar_for};
    use crate::model::Span;

    fn span(kind: SpanKind, text: &str) -> SourceSpan {
        SourceSpan {
            kind,
            span: Span::new(0, text.len() as u64),
            text: text.to_string(),
        }
    }

    fn action_of(lang: LanguageId, policy: &RetentionPolicy, kind: SpanKind, text: &str) -> Action {
        Classifier::new(grammar_for(lang), policy)
            .classify(0, &span(kind, text))
            .expect("comment spans are always classified")
            .action
    }

    #[test]
    fn code_and_literals_are_not_classified() {
        let policy = RetentionPolicy::default();
        let c = Classifier::new(grammar_for(LanguageId::C), &policy);
        assert!(c.classify(0, &span(SpanKind::Code, "int x;")).is_none());
        assert!(c.classify(0, &span(SpanKind::StringLiteral, "\"// x\"")).is_none());
        assert!(c.classify(0, &span(SpanKind::CharLiteral, "'x'")).is_none());
    }

    #[test]
    fn doc_and_block_comments_survive() {
        let p = RetentionPolicy::default();
        assert_eq!(action_of(LanguageId::Cpp, &p, SpanKind::DocComment, "/** d */"), Action::Keep);
        assert_eq!(
            action_of(LanguageId::Cpp, &p, SpanKind::BlockComment, "/* b */"),
            Action::KeepTrimmed
        );
    }

    #[test]
    fn markers_are_case_sensitive_prefixes() {
        let p = RetentionPolicy::default();
        for text in ["// TODO: x", "//FIXME", "//   NOTE this"] {
            assert_eq!(action_of(LanguageId::Cpp, &p, SpanKind::LineComment, text), Action::Keep, "{text}");
        }
        for text in ["// todo: x", "// a TODO", "// Getter method"] {
            assert_eq!(action_of(LanguageId::Cpp, &p, SpanKind::LineComment, text), Action::Delete, "{text}");
        }
    }

    #[test]
    fn custom_marker_set_replaces_default() {
        let p = RetentionPolicy {
            marker_set: ["SAFETY".to_string()].into_iter().collect(),
            ..RetentionPolicy::default()
        };
        assert_eq!(action_of(LanguageId::Rust, &p, SpanKind::LineComment, "// SAFETY: ok"), Action::Keep);
        assert_eq!(action_of(LanguageId::Rust, &p, SpanKind::LineComment, "// TODO: x"), Action::Delete);
    }

    #[test]
    fn doc_comments_fall_through_when_not_preserved() {
        let p = RetentionPolicy {
            preserve_doc_comments: false,
            ..RetentionPolicy::default()
        };
        assert_eq!(
            action_of(LanguageId::Rust, &p, SpanKind::DocComment, "/** block doc */"),
            Action::KeepTrimmed
        );
        assert_eq!(action_of(LanguageId::Rust, &p, SpanKind::DocComment, "/// line doc"), Action::Delete);
        assert_eq!(action_of(LanguageId::Rust, &p, SpanKind::DocComment, "/// TODO doc"), Action::Keep);
    }

    #[test]
    fn directives_are_kept_unless_disabled() {
        let keep = RetentionPolicy::default();
        assert_eq!(action_of(LanguageId::Go, &keep, SpanKind::LineComment, "//go:build linux"), Action::Keep);
        let drop = RetentionPolicy {
            preserve_directives: false,
            ..RetentionPolicy::default()
        };
        assert_eq!(action_of(LanguageId::Go, &drop, SpanKind::LineComment, "//go:build linux"), Action::Delete);
    }

    #[test]
    fn ignore_patterns_keep_matching_comments() {
        let p = RetentionPolicy {
            ignore_patterns: vec![Regex::new(r"^// SAFETY:").unwrap()],
            ..RetentionPolicy::default()
        };
        let c = Classifier::new(grammar_for(LanguageId::Rust), &p);
        let d = c.classify(7, &span(SpanKind::LineComment, "// SAFETY: aligned")).unwrap();
        assert_eq!(d.span_id, 7);
        assert_eq!(d.action, Action::Keep);
        assert_eq!(d.reason, Reason::IgnorePattern);
    }

    #[test]
    fn classify_all_keeps_span_ids() {
        let p = RetentionPolicy::default();
        let spans = vec![
            span(SpanKind::Code, "x;"),
            span(SpanKind::LineComment, "// gone"),
            span(SpanKind::Code, "\n"),
            span(SpanKind::BlockComment, "/* kept */"),
        ];
        let decisions = Classifier::new(grammar_for(LanguageId::C), &p).classify_all(&spans);
        let ids: Vec<_> = decisions.iter().map(|d| (d.span_id, d.action)).collect();
        assert_eq!(ids, vec![(1, Action::Delete), (3, Action::KeepTrimmed)]);
    }
}
