//! AFL++ fuzz target for `decomment`.
//!
//! This binary is stdin-driven, so it can be used with AFL++.
//! Build and run it via `cargo-afl`:
//!
//! ```bash
//! cargo install cargo-afl
//!
//! cargo afl build --release --features afl_fuzz --bin decomment_afl_scan
//!
//! mkdir -p fuzz/afl/out
//!
//! cargo afl fuzz \
//!   -i fuzz/afl/in \
//!   -o fuzz/afl/out \
//!   target/release/decomment_afl_scan
//! ```
//!
//! The first input byte picks the grammar; the rest is the source text.
//!
//! Rust panics normally unwind and exit with a non-crashing status code.
//! AFL++ only treats crashes as signals/aborts. We therefore catch any unwind
//! and turn it into `abort()`.

use std::io::Read;

use decomment::grammar::LanguageId;
use decomment::model::{ScanReport, SpanKind};
use decomment::{NormalizeOptions, normalize_with_grammar};

const MAX_INPUT_LEN: usize = 1_000_000; // 1MB guardrail; AFL++ will typically cap this anyway.

fn run_one_input(data: &[u8]) {
    if data.len() > MAX_INPUT_LEN || data.is_empty() {
        return;
    }

    let lang = LanguageId::ALL[data[0] as usize % LanguageId::ALL.len()];
    // lossy conversion keeps the harness total (no early returns that reduce coverage).
    let src = String::from_utf8_lossy(&data[1..]).to_string();

    let opts = NormalizeOptions::default();
    let res = normalize_with_grammar(&src, lang.grammar(), &opts);

    // invariants that must hold for any input:
    // - spans are in bounds, non-empty, contiguous, and rebuild the input
    // - every comment has exactly one decision, nothing else has one
    let mut pos = 0u64;
    let mut rebuilt = String::with_capacity(src.len());
    for s in &res.spans {
        assert_eq!(s.span.start, pos, "gap or overlap at {pos}: {s:?}");
        assert!(s.span.end > s.span.start, "empty span: {s:?}");
        assert!(s.span.end as usize <= src.len(), "span out of bounds: {s:?}");
        assert_eq!(&src[s.span.range()], s.text);
        rebuilt.push_str(&s.text);
        pos = s.span.end;
    }
    assert_eq!(rebuilt, src, "partition is lossy");

    let comments = res.spans.iter().filter(|s| s.kind.is_comment()).count();
    assert_eq!(comments, res.decisions.len());
    for d in &res.decisions {
        assert_ne!(res.spans[d.span_id].kind, SpanKind::Code);
    }

    // normalizing the output again must be a no-op.
    let again = normalize_with_grammar(&res.output_text, lang.grammar(), &opts);
    assert_eq!(again.output_text, res.output_text, "not idempotent for {lang}");

    // JSON round-trip must never panic.
    let report = res.report(None, &src);
    let json = serde_json::to_vec(&report).unwrap();
    let back: ScanReport = serde_json::from_slice(&json).unwrap();
    assert_eq!(back, report);
}

fn main() {
    let mut data = Vec::new();
    std::io::stdin().read_to_end(&mut data).unwrap();

    // convert any panic into an abort().
    if std::panic::catch_unwind(|| run_one_input(&data)).is_err() {
        std::process::abort();
    }
}
