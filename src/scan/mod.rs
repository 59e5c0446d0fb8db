//! Source text -> lexical span partition.
//!
//! The scanner is a single left-to-right pass driven by a [`GrammarRule`].
//! It is **total**: any input, including garbage, produces a list of spans
//! whose texts concatenate back to the input. Constructs left open at the end
//! of the input are closed there and reported as `Info` diagnostics.

pub(crate) mod util;

use crate::grammar::{Escape, GrammarRule, LiteralRule};
use crate::model::{Diagnostic, SourceSpan, Span, SpanKind};

use util::{char_len_at, is_ident_byte};

/// Result of scanning a document.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub spans: Vec<SourceSpan>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scan `src` into an ordered, lossless list of spans.
pub fn scan(src: &str, grammar: &GrammarRule) -> Vec<SourceSpan> {
    scan_document(src, grammar).spans
}

/// Like [`scan`], but also returns the scanner's recovery diagnostics.
pub fn scan_document(src: &str, grammar: &GrammarRule) -> ScanOutput {
    let mut scanner = Scanner {
        src,
        bytes: src.as_bytes(),
        grammar,
        out: ScanOutput::default(),
        code_start: 0,
    };
    scanner.run();
    scanner.out
}

/// What starts at a given offset in code mode.
#[derive(Debug, Clone, Copy)]
enum Opening {
    Literal(LiteralRule),
    Block { doc: bool, open_len: usize },
    Line { doc: bool, marker_len: usize },
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    grammar: &'a GrammarRule,
    out: ScanOutput,
    code_start: usize,
}

impl<'a> Scanner<'a> {
    fn run(&mut self) {
        let len = self.src.len();
        let mut pos = 0usize;
        while pos < len {
            let Some(opening) = self.opening_at(pos) else {
                pos += char_len_at(self.src, pos);
                continue;
            };

            let (kind, end) = match opening {
                Opening::Literal(rule) => self.scan_literal(rule, pos),
                Opening::Block { doc, open_len } => {
                    let kind = if doc {
                        SpanKind::DocComment
                    } else {
                        SpanKind::BlockComment
                    };
                    (kind, self.scan_block(pos, open_len))
                }
                Opening::Line { doc, marker_len } => {
                    let kind = if doc {
                        SpanKind::DocComment
                    } else {
                        SpanKind::LineComment
                    };
                    (kind, self.scan_line(pos, marker_len))
                }
            };

            debug_assert!(end > pos, "scanner must make progress");
            self.flush_code(pos);
            self.push(kind, pos, end);
            pos = end;
            self.code_start = end;
        }
        self.flush_code(len);
    }

    fn flush_code(&mut self, upto: usize) {
        if self.code_start < upto {
            self.push(SpanKind::Code, self.code_start, upto);
        }
        self.code_start = upto;
    }

    fn push(&mut self, kind: SpanKind, start: usize, end: usize) {
        if start < end {
            self.out.spans.push(SourceSpan::new(kind, self.src, start..end));
        }
    }

    fn note(&mut self, code: &str, message: &str, start: usize, end: usize) {
        self.out
            .diagnostics
            .push(Diagnostic::scan_info(code, message, Span::from_range(start..end)));
    }

    /// Picks the opening at `pos`: longest marker wins, ties go to the
    /// earlier candidate (literals, doc block, block, doc line, line).
    fn opening_at(&self, pos: usize) -> Option<Opening> {
        let rest = &self.src[pos..];
        let g = self.grammar;
        let mut best: Option<(usize, Opening)> = None;
        let mut consider = |len: usize, opening: Opening| {
            if best.as_ref().is_none_or(|(l, _)| len > *l) {
                best = Some((len, opening));
            }
        };

        for rule in g.literals {
            if let Some(len) = self.literal_open_len(rule, pos) {
                consider(len, Opening::Literal(*rule));
            }
        }

        if let Some((open, close)) = g.block {
            if let Some(doc_open) = g.doc_block_open
                && rest.starts_with(doc_open)
                && !rest[open.len()..].starts_with(close)
            {
                consider(
                    doc_open.len(),
                    Opening::Block {
                        doc: true,
                        open_len: doc_open.len(),
                    },
                );
            }
            if rest.starts_with(open) {
                consider(
                    open.len(),
                    Opening::Block {
                        doc: false,
                        open_len: open.len(),
                    },
                );
            }
        }

        for marker in g.doc_line_markers {
            // `////` is a plain comment, not a doc comment.
            let last = marker.as_bytes()[marker.len() - 1];
            if rest.starts_with(marker) && rest.as_bytes().get(marker.len()) != Some(&last) {
                consider(
                    marker.len(),
                    Opening::Line {
                        doc: true,
                        marker_len: marker.len(),
                    },
                );
            }
        }

        for marker in g.line_markers {
            if rest.starts_with(marker) && self.line_marker_allowed(pos, marker) {
                consider(
                    marker.len(),
                    Opening::Line {
                        doc: false,
                        marker_len: marker.len(),
                    },
                );
            }
        }

        best.map(|(_, opening)| opening)
    }

    fn line_marker_allowed(&self, pos: usize, marker: &str) -> bool {
        if marker != "#" {
            return true;
        }
        if self.grammar.hash_bracket_is_attribute && self.bytes.get(pos + 1) == Some(&b'[') {
            return false;
        }
        if !self.grammar.hash_needs_word_start || pos == 0 {
            return true;
        }
        let prev = self.bytes[pos - 1];
        prev.is_ascii_whitespace() || matches!(prev, b';' | b'|' | b'&' | b'(' | b')')
    }

    fn prev_is_ident(&self, pos: usize) -> bool {
        pos > 0 && is_ident_byte(self.bytes[pos - 1])
    }

    fn literal_open_len(&self, rule: &LiteralRule, pos: usize) -> Option<usize> {
        let rest = &self.src[pos..];
        match *rule {
            LiteralRule::Quoted { open, .. } => rest.starts_with(open).then_some(open.len()),
            LiteralRule::RustRaw => {
                if self.prev_is_ident(pos) {
                    return None;
                }
                let body = rest
                    .strip_prefix("br")
                    .or_else(|| rest.strip_prefix("cr"))
                    .or_else(|| rest.strip_prefix('r'))?;
                let hashes = body.bytes().take_while(|b| *b == b'#').count();
                (body.as_bytes().get(hashes) == Some(&b'"'))
                    .then_some(rest.len() - body.len() + hashes + 1)
            }
            LiteralRule::CppRaw => {
                if self.prev_is_ident(pos) {
                    return None;
                }
                let body = ["u8R\"", "uR\"", "UR\"", "LR\"", "R\""]
                    .iter()
                    .find_map(|p| rest.strip_prefix(p))?;
                let delim_len = body
                    .bytes()
                    .take(17)
                    .position(|b| b == b'(')
                    .filter(|n| *n <= 16)?;
                let delim = &body[..delim_len];
                if delim
                    .bytes()
                    .any(|b| b.is_ascii_whitespace() || matches!(b, b'\\' | b')' | b'"'))
                {
                    return None;
                }
                Some(rest.len() - body.len() + delim_len + 1)
            }
            LiteralRule::RustChar => {
                if !rest.starts_with('\'') {
                    return None;
                }
                let mut chars = rest[1..].chars();
                match chars.next()? {
                    '\\' => Some(1),
                    '\'' | '\n' => None,
                    _ => (chars.next() == Some('\'')).then_some(1),
                }
            }
        }
    }

    fn scan_literal(&mut self, rule: LiteralRule, pos: usize) -> (SpanKind, usize) {
        match rule {
            LiteralRule::Quoted {
                open,
                close,
                escape,
                multiline,
                kind,
            } => (
                kind.span_kind(),
                self.scan_quoted(pos, open.len(), close, escape, multiline),
            ),
            LiteralRule::RustRaw => {
                let open_len = self.literal_open_len(&rule, pos).unwrap_or(1);
                let hashes = self.src[pos..pos + open_len]
                    .bytes()
                    .filter(|b| *b == b'#')
                    .count();
                let close = format!("\"{}", "#".repeat(hashes));
                (
                    SpanKind::StringLiteral,
                    self.scan_until(pos, open_len, &close, "lex.unterminated_raw_string"),
                )
            }
            LiteralRule::CppRaw => {
                let open_len = self.literal_open_len(&rule, pos).unwrap_or(1);
                let opener = &self.src[pos..pos + open_len];
                let delim = opener
                    .split_once('"')
                    .map(|(_, d)| d.trim_end_matches('('))
                    .unwrap_or("");
                let close = format!("){}\"", delim);
                (
                    SpanKind::StringLiteral,
                    self.scan_until(pos, open_len, &close, "lex.unterminated_raw_string"),
                )
            }
            LiteralRule::RustChar => (
                SpanKind::CharLiteral,
                self.scan_quoted(pos, 1, "'", Escape::Backslash, false),
            ),
        }
    }

    fn scan_quoted(
        &mut self,
        pos: usize,
        open_len: usize,
        close: &str,
        escape: Escape,
        multiline: bool,
    ) -> usize {
        let len = self.src.len();
        let mut i = pos + open_len;
        while i < len {
            let rest = &self.src[i..];
            if rest.starts_with(close) {
                if escape == Escape::Doubled && rest[close.len()..].starts_with(close) {
                    i += close.len() * 2;
                    continue;
                }
                return i + close.len();
            }
            let b = self.bytes[i];
            if escape == Escape::Backslash && b == b'\\' {
                i += 1;
                if self.src[i..].starts_with("\r\n") {
                    i += 2;
                } else if i < len {
                    i += char_len_at(self.src, i);
                }
                continue;
            }
            if !multiline && (b == b'\n' || rest.starts_with("\r\n")) {
                self.note(
                    "lex.unterminated_literal",
                    "literal closed at end of line",
                    pos,
                    i,
                );
                return i;
            }
            i += char_len_at(self.src, i);
        }
        self.note(
            "lex.unterminated_literal",
            "literal closed at end of input",
            pos,
            len,
        );
        len
    }

    /// Raw literals: no escapes, ends at the first `close`.
    fn scan_until(&mut self, pos: usize, open_len: usize, close: &str, code: &str) -> usize {
        let from = pos + open_len;
        match self.src[from..].find(close) {
            Some(rel) => from + rel + close.len(),
            None => {
                let len = self.src.len();
                self.note(code, "raw string closed at end of input", pos, len);
                len
            }
        }
    }

    fn scan_block(&mut self, pos: usize, open_len: usize) -> usize {
        let Some((open, close)) = self.grammar.block else {
            return pos + open_len;
        };
        let len = self.src.len();
        let mut depth = 1usize;
        let mut i = pos + open_len;
        while i < len {
            let rest = &self.src[i..];
            if self.grammar.nestable_block && rest.starts_with(open) {
                depth += 1;
                i += open.len();
                continue;
            }
            if rest.starts_with(close) {
                depth -= 1;
                i += close.len();
                if depth == 0 {
                    return i;
                }
                continue;
            }
            i += char_len_at(self.src, i);
        }
        self.note(
            "lex.unterminated_block_comment",
            "block comment closed at end of input",
            pos,
            len,
        );
        len
    }

    /// Line comments stop before the newline; a `\r` preceding it stays code.
    fn scan_line(&mut self, pos: usize, marker_len: usize) -> usize {
        let body_start = pos + marker_len;
        let mut from = body_start;
        loop {
            let Some(rel) = self.src[from..].find('\n') else {
                return self.src.len();
            };
            let nl = from + rel;
            let content_end = if nl > body_start && self.bytes[nl - 1] == b'\r' {
                nl - 1
            } else {
                nl
            };
            if self.grammar.line_continuation
                && content_end > body_start
                && self.bytes[content_end - 1] == b'\\'
            {
                from = nl + 1;
                continue;
            }
            return content_end;
        }
    }
}
