//! Behavioural properties of `normalize`, checked on hand-written inputs and
//! on a generated corpus for every grammar. No external fuzz harness required.

use decomment::grammar::{GrammarRule, LanguageId};
use decomment::model::{Action, Reason, SpanKind};
use decomment::scan;
use decomment::{NormalizeOptions, normalize, normalize_with_grammar};

#[derive(Clone)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    fn gen_range(&mut self, hi: usize) -> usize {
        (self.next_u64() as usize) % hi
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.gen_range(items.len())]
    }
}

const CODE: &[&str] = &["x = 1;", "call(a, b);", "{", "}", "return y;", "if (z) {", "value += 2;"];
const WORDS: &[&str] = &["explain", "the", "loop", "below", "Getter", "helper", "todo", "a TODO", "don't", "it's"];
const MARKERS: &[&str] = &["TODO", "FIXME", "NOTE"];
const STRINGS: &[&str] = &["\"plain\"", "\"has // slashes\"", "\"has # hash\"", "\"has /* stars */\"", "\"esc \\\" quote\""];
const INDENT: &[&str] = &["", "", "    ", "        ", "\t"];
const PAD: &[&str] = &["", "", " ", "  ", "\t", "\r\n"];
const EOL: &[&str] = &["\n", "\n", "\r\n"];
/// Code that ends in a backslash, so the line break right after it is escaped
/// or continued depending on the grammar.
const BACKSLASH_TAILS: &[&str] = &["call(a, \\", "s = \"cont \\", "c = 'x\\"];
/// Literals left open at the end of the input.
const OPEN_TAILS: &[&str] = &["\"open", "\"open \\", "'open", "'x\\", "\"\"\"open", "`open", "'''open"];

fn gen_comment_text(rng: &mut XorShift64) -> String {
    let n = 1 + rng.gen_range(4);
    (0..n).map(|_| rng.pick(WORDS)).collect::<Vec<_>>().join(" ")
}

fn gen_line_comment(rng: &mut XorShift64, g: &GrammarRule) -> Option<String> {
    let marker = g.line_markers.first()?;
    let body = match rng.gen_range(4) {
        0 => format!("{}: {}", rng.pick(MARKERS), gen_comment_text(rng)),
        _ => gen_comment_text(rng),
    };
    Some(format!("{marker} {body}{}", rng.pick(PAD)))
}

fn gen_block_comment(rng: &mut XorShift64, g: &GrammarRule) -> Option<String> {
    let (open, close) = g.block?;
    let open = match g.doc_block_open {
        Some(doc) if rng.gen_range(3) == 0 => doc,
        _ => open,
    };
    let lines = rng.gen_range(3);
    let mut s = format!("{open} {}{}", gen_comment_text(rng), rng.pick(PAD));
    for _ in 0..lines {
        s.push('\n');
        s.push_str(rng.pick(INDENT));
        s.push_str(&gen_comment_text(rng));
        s.push_str(rng.pick(PAD));
    }
    s.push(' ');
    s.push_str(close);
    Some(s)
}

/// A source-like document built from tokens every grammar lexes the same way.
fn gen_source(rng: &mut XorShift64, g: &GrammarRule, lines: usize) -> String {
    let eol = rng.pick(EOL);
    let mut out = String::new();
    for _ in 0..lines {
        match rng.gen_range(9) {
            0 => {}
            1 => out.push_str(rng.pick(PAD)),
            2 | 3 => {
                out.push_str(rng.pick(INDENT));
                if let Some(c) = gen_line_comment(rng, g) {
                    out.push_str(&c);
                }
            }
            4 => {
                out.push_str(rng.pick(INDENT));
                if let Some(c) = gen_block_comment(rng, g) {
                    out.push_str(&c);
                }
            }
            5 => {
                out.push_str(rng.pick(INDENT));
                if let Some(doc) = g.doc_line_markers.first() {
                    out.push_str(&format!("{doc} {}", gen_comment_text(rng)));
                }
            }
            6 => {
                out.push_str(rng.pick(INDENT));
                out.push_str(rng.pick(BACKSLASH_TAILS));
            }
            _ => {
                out.push_str(rng.pick(INDENT));
                out.push_str(rng.pick(CODE));
                if rng.gen_range(3) == 0 {
                    out.push(' ');
                    out.push_str(rng.pick(STRINGS));
                }
                match rng.gen_range(4) {
                    0 => {
                        if let Some(c) = gen_line_comment(rng, g) {
                            out.push_str(rng.pick(&[" ", "  ", "\t"]));
                            out.push_str(&c);
                        }
                    }
                    1 => {
                        if let Some(c) = gen_block_comment(rng, g) {
                            out.push(' ');
                            out.push_str(&c);
                        }
                    }
                    _ => out.push_str(rng.pick(PAD)),
                }
            }
        }
        out.push_str(eol);
    }
    if rng.gen_range(5) == 0 {
        out.push_str("tail = ");
        out.push_str(rng.pick(OPEN_TAILS));
        if rng.gen_range(2) == 0 {
            out.push_str(eol);
        }
    } else if rng.gen_range(4) == 0 {
        out.truncate(out.trim_end_matches(['\r', '\n']).len());
    }
    out
}

/// Code and literal text with all whitespace removed.
fn code_skeleton(src: &str, g: &GrammarRule) -> String {
    scan::scan(src, g)
        .into_iter()
        .filter(|s| !s.kind.is_comment())
        .flat_map(|s| s.text.chars().collect::<Vec<_>>())
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn blank_lines(text: &str) -> usize {
    text.lines().filter(|l| l.trim().is_empty()).count()
}

fn check_properties(input: &str, lang: LanguageId) {
    let g = lang.grammar();
    let opts = NormalizeOptions::default();
    let res = normalize_with_grammar(input, g, &opts);
    let out = &res.output_text;

    // lossless partition.
    let mut pos = 0u64;
    for s in &res.spans {
        assert_eq!(s.span.start, pos, "[{lang}] gap at {pos} in {input:?}");
        assert!(s.span.end > s.span.start, "[{lang}] empty span in {input:?}");
        pos = s.span.end;
    }
    assert_eq!(pos as usize, input.len(), "[{lang}] partition short of input");
    let rebuilt: String = res.spans.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(rebuilt, input, "[{lang}]");

    // code invariance.
    assert_eq!(
        code_skeleton(out, g),
        code_skeleton(input, g),
        "[{lang}] code changed:\n--- in\n{input}\n--- out\n{out}"
    );

    // doc comments and marker comments survive verbatim.
    for d in &res.decisions {
        if matches!(d.reason, Reason::DocComment | Reason::Marker) {
            let text = &res.spans[d.span_id].text;
            assert!(out.contains(text.as_str()), "[{lang}] lost {text:?} in\n{out}");
        }
        if res.spans[d.span_id].kind == SpanKind::BlockComment {
            assert_eq!(d.action, Action::KeepTrimmed, "[{lang}]");
        }
    }

    // no new blank lines.
    assert!(
        blank_lines(out) <= blank_lines(input),
        "[{lang}] blank lines grew:\n--- in\n{input}\n--- out\n{out}"
    );

    // single trailing newline, unless a construct left open runs to the end.
    let open_at_eof = res
        .diagnostics
        .iter()
        .any(|d| d.span.as_ref().is_some_and(|s| s.end as usize == input.len()));
    if !out.is_empty() && !open_at_eof {
        assert!(out.ends_with('\n'), "[{lang}] bad tail: {out:?}");
        assert!(
            !out.ends_with("\n\n") && !out.ends_with("\n\r\n"),
            "[{lang}] bad tail: {out:?}"
        );
        assert!(!out.trim().is_empty(), "[{lang}] whitespace-only output: {out:?}");
    }

    // idempotence.
    let again = normalize_with_grammar(out, g, &opts);
    assert_eq!(&again.output_text, out, "[{lang}] second pass changed output");
}

#[test]
fn generated_sources_hold_all_properties() {
    // keep cases bounded so this doesn't slow down normal `cargo test` too much.
    let mut rng = XorShift64::new(0xDEC0_4417);
    for lang in LanguageId::ALL {
        for _case in 0..150 {
            let lines = rng.gen_range(40);
            let input = gen_source(&mut rng, lang.grammar(), lines);
            check_properties(&input, lang);
        }
    }
}

#[test]
fn hand_written_cases_hold_all_properties() {
    let cases: &[(&str, LanguageId)] = &[
        ("int a; // x\n\n\n// y\n", LanguageId::C),
        ("/* a */ int b; /* c */ // d\n", LanguageId::Cpp),
        ("fn f() {} // x\r\n// y\r\nlet z = 1;\r\n", LanguageId::Rust),
        ("let s = \"// not a comment\"; // but this is\n", LanguageId::Rust),
        ("s = '''\n# inside\n''' # outside\n", LanguageId::Python),
        ("echo a#b # real\n", LanguageId::Bash),
        ("<?php\n# hash\n// slashes\n$a = 1; /* b */\n", LanguageId::Php),
        ("a { color: red; } /* keep */\n", LanguageId::Css),
        ("", LanguageId::Go),
        ("   \n\t\n", LanguageId::Java),
        ("s = \"abc\\\r\n def\"; // c\r\n", LanguageId::C),
        ("a;\r\ns = \"abc\\", LanguageId::Java),
        ("# it's fine\r\nx = 'open", LanguageId::Python),
    ];
    for (input, lang) in cases {
        check_properties(input, *lang);
    }
}

#[test]
fn comment_markers_inside_literals_are_inert() {
    let src = "let url = \"http://example.com\"; // drop\n";
    let out = normalize(src, "rust", &NormalizeOptions::default()).unwrap().output_text;
    assert_eq!(out, "let url = \"http://example.com\";\n");

    let py = "x = \"# not a comment\"  # drop\n";
    let out = normalize(py, "python", &NormalizeOptions::default()).unwrap().output_text;
    assert_eq!(out, "x = \"# not a comment\"\n");
}

#[test]
fn doc_comments_are_kept_byte_for_byte() {
    let src = "/**   \n * Adds.   \n */\nint add(int a, int b);\n";
    let out = normalize(src, "c", &NormalizeOptions::default()).unwrap().output_text;
    assert_eq!(out, src);
}

#[test]
fn block_comments_lose_trailing_whitespace_only() {
    let src = "/* one   \n   two\t\n*/\nint x;\n";
    let out = normalize(src, "c", &NormalizeOptions::default()).unwrap().output_text;
    assert_eq!(out, "/* one\n   two\n*/\nint x;\n");
}

#[test]
fn only_comments_normalize_to_empty() {
    let src = "// a\n\n// b\n   \n";
    let out = normalize(src, "go", &NormalizeOptions::default()).unwrap().output_text;
    assert_eq!(out, "");
}

#[test]
fn directives_are_kept() {
    let src = "//go:build linux\n\n// Package main does things.\npackage main\n";
    let out = normalize(src, "go", &NormalizeOptions::default()).unwrap().output_text;
    assert_eq!(out, "//go:build linux\n\npackage main\n");
}
