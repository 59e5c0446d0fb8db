//! Spans + decisions -> output text.
//!
//! This module only reads the span list; it never mutates it, so the same
//! scan can back a dry run, a report, and the real rewrite.

use std::ops::Range;

use crate::model::{Action, RetentionDecision, SourceSpan};

/// Options that control whitespace cleanup around deleted comments.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// If true, trailing blank lines are dropped and the output ends with
    /// exactly one newline.
    pub collapse_trailing_blank_lines: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            collapse_trailing_blank_lines: true,
        }
    }
}

/// Output text plus the output ranges copied verbatim from literals or
/// kept comments. Whitespace cleanup must not touch those.
#[derive(Debug, Default)]
struct Emitted {
    text: String,
    protected: Vec<Range<usize>>,
}

impl Emitted {
    fn push_protected(&mut self, s: &str) {
        let start = self.text.len();
        self.text.push_str(s);
        if start < self.text.len() {
            self.protected.push(start..self.text.len());
        }
    }

    fn truncate(&mut self, len: usize) {
        self.text.truncate(len);
        while let Some(last) = self.protected.last_mut() {
            if last.start >= len {
                self.protected.pop();
            } else {
                last.end = last.end.min(len);
                break;
            }
        }
    }

    fn current_line_start(&self) -> usize {
        self.text.rfind('\n').map_or(0, |i| i + 1)
    }
}

pub fn rewrite(spans: &[SourceSpan], decisions: &[RetentionDecision]) -> String {
    rewrite_with_options(spans, decisions, &RewriteOptions::default())
}

pub fn rewrite_with_options(
    spans: &[SourceSpan],
    decisions: &[RetentionDecision],
    opts: &RewriteOptions,
) -> String {
    let mut actions: Vec<Option<Action>> = vec![None; spans.len()];
    for d in decisions {
        if let Some(slot) = actions.get_mut(d.span_id) {
            *slot = Some(d.action);
        }
    }

    let capacity = spans.iter().map(|s| s.text.len()).sum();
    let mut em = Emitted {
        text: String::with_capacity(capacity),
        protected: Vec::new(),
    };
    let mut skip_newline = false;

    for (span, action) in spans.iter().zip(actions) {
        let mut text = span.text.as_str();
        if skip_newline {
            // the line holding a deleted standalone comment goes away with its terminator.
            text = text
                .strip_prefix("\r\n")
                .or_else(|| text.strip_prefix('\n'))
                .unwrap_or(text);
            skip_newline = false;
        }

        match action {
            Some(Action::Delete) => {
                let line_start = em.current_line_start();
                if is_blank(&em.text[line_start..]) {
                    em.truncate(line_start);
                    skip_newline = true;
                } else {
                    let kept = em.text.trim_end_matches([' ', '\t']).len();
                    em.truncate(kept);
                }
            }
            Some(Action::KeepTrimmed) => em.text.push_str(&trim_line_ends(text)),
            Some(Action::Keep) => em.push_protected(text),
            None if span.kind.is_literal() => em.push_protected(text),
            None => em.text.push_str(text),
        }
    }

    let (mut out, floor) = blank_whitespace_lines(&em);
    if opts.collapse_trailing_blank_lines {
        collapse_tail(&mut out, floor);
    }
    out
}

fn is_blank(s: &str) -> bool {
    s.bytes().all(|b| b == b' ' || b == b'\t')
}

/// Strips trailing spaces and tabs from every line, keeping `\r\n` / `\n`.
pub fn trim_line_ends(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for piece in text.split_inclusive('\n') {
        let (body, eol) = split_eol(piece);
        out.push_str(body.trim_end_matches([' ', '\t']));
        out.push_str(eol);
    }
    out
}

fn split_eol(piece: &str) -> (&str, &str) {
    if let Some(body) = piece.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = piece.strip_suffix('\n') {
        (body, "\n")
    } else {
        (piece, "")
    }
}

/// Empties whitespace-only lines outside protected ranges.
///
/// Returns the new text and the offset (in the new text) where the last
/// protected range ends; end-of-file cleanup must not cut below it.
fn blank_whitespace_lines(em: &Emitted) -> (String, usize) {
    let mut out = String::with_capacity(em.text.len());
    let mut floor = 0usize;
    let last_end = em.protected.last().map(|r| r.end);
    let mut p = 0usize;
    let mut line_start = 0usize;

    for piece in em.text.split_inclusive('\n') {
        let (body, eol) = split_eol(piece);
        let body_end = line_start + body.len();
        while p < em.protected.len() && em.protected[p].end <= line_start {
            p += 1;
        }
        let touches_protected = p < em.protected.len() && em.protected[p].start < body_end;

        let new_start = out.len();
        if !body.is_empty() && is_blank(body) && !touches_protected {
            out.push_str(eol);
        } else {
            out.push_str(piece);
        }

        if let Some(end) = last_end
            && end > line_start
            && end <= line_start + piece.len()
        {
            floor = (new_start + (end - line_start)).min(out.len());
        }
        line_start += piece.len();
    }
    (out, floor)
}

/// Drops trailing blank lines and guarantees a single final line terminator.
fn collapse_tail(out: &mut String, floor: usize) {
    let floor = floor.min(out.len());
    let keep = floor + out[floor..].trim_end_matches([' ', '\t', '\r', '\n']).len();
    out.truncate(keep);
    if !out.is_empty() && !out.ends_with('\n') {
        if out.contains("\r\n") {
            out.push_str("\r\n");
        } else {
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Reason, Span, SpanKind};

    /// Builds contiguous spans from `(kind, text, action)` triples.
    fn build(parts: &[(SpanKind, &str, Option<Action>)]) -> (Vec<SourceSpan>, Vec<RetentionDecision>) {
        let mut spans = Vec::new();
        let mut decisions = Vec::new();
        let mut pos = 0u64;
        for (id, (kind, text, action)) in parts.iter().enumerate() {
            let end = pos + text.len() as u64;
            spans.push(SourceSpan {
                kind: *kind,
                span: Span::new(pos, end),
                text: text.to_string(),
            });
            if let Some(action) = action {
                decisions.push(RetentionDecision {
                    span_id: id,
                    action: *action,
                    reason: Reason::Narration,
                });
            }
            pos = end;
        }
        (spans, decisions)
    }

    use SpanKind::*;

    #[test]
    fn trailing_comment_takes_separating_whitespace_with_it() {
        let (spans, ds) = build(&[
            (Code, "int value;   ", None),
            (LineComment, "// Private member variable", Some(Action::Delete)),
            (Code, "\n    \npublic:\n", None),
        ]);
        assert_eq!(rewrite(&spans, &ds), "int value;\n\npublic:\n");
    }

    #[test]
    fn standalone_comment_line_disappears_entirely() {
        let (spans, ds) = build(&[
            (Code, "{\n    ", None),
            (LineComment, "// Getter method", Some(Action::Delete)),
            (Code, "\n    int x;\n}\n", None),
        ]);
        assert_eq!(rewrite(&spans, &ds), "{\n    int x;\n}\n");
    }

    #[test]
    fn standalone_deletion_handles_crlf() {
        let (spans, ds) = build(&[
            (Code, "a;\r\n", None),
            (LineComment, "// x", Some(Action::Delete)),
            (Code, "\r\nb;\r\n", None),
        ]);
        assert_eq!(rewrite(&spans, &ds), "a;\r\nb;\r\n");
    }

    #[test]
    fn keep_trimmed_strips_each_line_end() {
        let (spans, ds) = build(&[
            (BlockComment, "/* \n   body   \n*/", Some(Action::KeepTrimmed)),
            (Code, "\nx;\n", None),
        ]);
        assert_eq!(rewrite(&spans, &ds), "/*\n   body\n*/\nx;\n");
    }

    #[test]
    fn kept_comment_is_verbatim_including_blank_lines_inside() {
        let doc = "/**\n   \n * d\n */";
        let (spans, ds) = build(&[(DocComment, doc, Some(Action::Keep)), (Code, "\nx;\n", None)]);
        let out = rewrite(&spans, &ds);
        assert!(out.starts_with(doc), "{out:?}");
    }

    #[test]
    fn whitespace_inside_string_literals_is_untouched() {
        let lit = "\"\"\"\n    \n\"\"\"";
        let (spans, ds) = build(&[(Code, "x = ", None), (StringLiteral, lit, None), (Code, "\n  \n", None)]);
        assert_eq!(rewrite(&spans, &ds), format!("x = {lit}\n"));
    }

    #[test]
    fn end_of_file_comment_and_blank_lines_collapse() {
        let (spans, ds) = build(&[
            (Code, "    return 0;\n}\n\n", None),
            (LineComment, "// End of file comment", Some(Action::Delete)),
            (Code, "\n\n", None),
        ]);
        assert_eq!(rewrite(&spans, &ds), "    return 0;\n}\n");
    }

    #[test]
    fn missing_final_newline_is_added() {
        let (spans, ds) = build(&[(Code, "x;", None)]);
        assert_eq!(rewrite(&spans, &ds), "x;\n");
    }

    #[test]
    fn collapse_can_be_disabled() {
        let (spans, ds) = build(&[
            (Code, "x;\n", None),
            (LineComment, "// bye", Some(Action::Delete)),
            (Code, "\n  \n", None),
        ]);
        let opts = RewriteOptions {
            collapse_trailing_blank_lines: false,
        };
        assert_eq!(rewrite_with_options(&spans, &ds, &opts), "x;\n\n");
    }

    #[test]
    fn only_comments_yields_empty_output() {
        let (spans, ds) = build(&[
            (LineComment, "// a", Some(Action::Delete)),
            (Code, "\n", None),
            (LineComment, "// b", Some(Action::Delete)),
            (Code, "\n", None),
        ]);
        assert_eq!(rewrite(&spans, &ds), "");
    }

    #[test]
    fn unterminated_literal_at_eof_keeps_its_trailing_newlines() {
        let (spans, ds) = build(&[(Code, "s = ", None), (StringLiteral, "`abc\n\n", None)]);
        assert_eq!(rewrite(&spans, &ds), "s = `abc\n\n");
    }

    #[test]
    fn trim_line_ends_preserves_line_count() {
        assert_eq!(trim_line_ends("a \t\r\nb  \n c "), "a\r\nb\n c");
    }
}
