use super::{Escape, GrammarRule, LanguageId, LiteralKind, LiteralRule};

const fn quoted(
    open: &'static str,
    close: &'static str,
    escape: Escape,
    multiline: bool,
    kind: LiteralKind,
) -> LiteralRule {
    LiteralRule::Quoted {
        open,
        close,
        escape,
        multiline,
        kind,
    }
}

const DQ: LiteralRule = quoted("\"", "\"", Escape::Backslash, false, LiteralKind::String);
const DQ_MULTI: LiteralRule = quoted("\"", "\"", Escape::Backslash, true, LiteralKind::String);
const SQ: LiteralRule = quoted("'", "'", Escape::Backslash, false, LiteralKind::String);
const SQ_MULTI: LiteralRule = quoted("'", "'", Escape::Backslash, true, LiteralKind::String);
const CHAR: LiteralRule = quoted("'", "'", Escape::Backslash, false, LiteralKind::Char);
const TRIPLE_DQ: LiteralRule = quoted("\"\"\"", "\"\"\"", Escape::Backslash, true, LiteralKind::String);
const TRIPLE_SQ: LiteralRule = quoted("'''", "'''", Escape::Backslash, true, LiteralKind::String);

const C_BLOCK: Option<(&str, &str)> = Some(("/*", "*/"));
const SLASHES: &[&str] = &["//"];
const HASH: &[&str] = &["#"];

pub static C: GrammarRule = GrammarRule {
    language: LanguageId::C,
    line_markers: SLASHES,
    block: C_BLOCK,
    doc_block_open: Some("/**"),
    doc_line_markers: &[],
    literals: &[DQ, CHAR],
    nestable_block: false,
    line_continuation: true,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: &["// NOLINT", "// clang-format", "// IWYU pragma"],
    extensions: &["c", "h"],
};

pub static CPP: GrammarRule = GrammarRule {
    language: LanguageId::Cpp,
    line_markers: SLASHES,
    block: C_BLOCK,
    doc_block_open: Some("/**"),
    doc_line_markers: &[],
    literals: &[LiteralRule::CppRaw, DQ, CHAR],
    nestable_block: false,
    line_continuation: true,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: &["// NOLINT", "// clang-format", "// IWYU pragma"],
    extensions: &["cpp", "cc", "cxx", "c++", "hpp", "hh", "hxx", "ipp"],
};

pub static CSHARP: GrammarRule = GrammarRule {
    language: LanguageId::CSharp,
    line_markers: SLASHES,
    block: C_BLOCK,
    doc_block_open: Some("/**"),
    doc_line_markers: &["///"],
    literals: &[
        quoted("@\"", "\"", Escape::Doubled, true, LiteralKind::String),
        DQ,
        CHAR,
    ],
    nestable_block: false,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: &["// <auto-generated", "// ReSharper disable", "// ReSharper restore"],
    extensions: &["cs"],
};

pub static CSS: GrammarRule = GrammarRule {
    language: LanguageId::Css,
    line_markers: &[],
    block: C_BLOCK,
    doc_block_open: None,
    doc_line_markers: &[],
    literals: &[DQ, SQ],
    nestable_block: false,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: &[],
    extensions: &["css"],
};

pub static GO: GrammarRule = GrammarRule {
    language: LanguageId::Go,
    line_markers: SLASHES,
    block: C_BLOCK,
    doc_block_open: None,
    doc_line_markers: &[],
    literals: &[
        DQ,
        quoted("`", "`", Escape::None, true, LiteralKind::String),
        CHAR,
    ],
    nestable_block: false,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: &["//go:", "// +build", "//line ", "//export ", "//nolint", "//lint:"],
    extensions: &["go"],
};

pub static JAVA: GrammarRule = GrammarRule {
    language: LanguageId::Java,
    line_markers: SLASHES,
    block: C_BLOCK,
    doc_block_open: Some("/**"),
    doc_line_markers: &[],
    literals: &[TRIPLE_DQ, DQ, CHAR],
    nestable_block: false,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: &[
        "//noinspection",
        "// @formatter:",
        "// @SuppressWarnings",
        "//CHECKSTYLE",
        "// CHECKSTYLE",
        "// NOSONAR",
        "// NOCHECKSTYLE",
        "// NOFOLINT",
    ],
    extensions: &["java"],
};

const JS_LITERALS: &[LiteralRule] = &[
    DQ,
    SQ,
    quoted("`", "`", Escape::Backslash, true, LiteralKind::String),
];

// `// @ts-…`, `// @jsx`, `// @flow`, `// @license`, `//# sourceMappingURL=`, ...
const JS_DIRECTIVES: &[&str] = &[
    "// @",
    "//#",
    "// =",
    "/// <reference",
    "// eslint-",
    "// prettier-ignore",
    "// istanbul ignore",
];

pub static JAVASCRIPT: GrammarRule = GrammarRule {
    language: LanguageId::JavaScript,
    line_markers: SLASHES,
    block: C_BLOCK,
    doc_block_open: Some("/**"),
    doc_line_markers: &[],
    literals: JS_LITERALS,
    nestable_block: false,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: JS_DIRECTIVES,
    extensions: &["js", "jsx", "mjs", "cjs"],
};

pub static TYPESCRIPT: GrammarRule = GrammarRule {
    language: LanguageId::TypeScript,
    line_markers: SLASHES,
    block: C_BLOCK,
    doc_block_open: Some("/**"),
    doc_line_markers: &[],
    literals: JS_LITERALS,
    nestable_block: false,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: JS_DIRECTIVES,
    extensions: &["ts", "tsx", "mts", "cts"],
};

pub static KOTLIN: GrammarRule = GrammarRule {
    language: LanguageId::Kotlin,
    line_markers: SLASHES,
    block: C_BLOCK,
    doc_block_open: Some("/**"),
    doc_line_markers: &[],
    literals: &[
        quoted("\"\"\"", "\"\"\"", Escape::None, true, LiteralKind::String),
        DQ,
        CHAR,
    ],
    nestable_block: true,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: &["//noinspection", "// ktlint-disable", "// ktlint-enable", "// @"],
    extensions: &["kt", "kts"],
};

pub static SWIFT: GrammarRule = GrammarRule {
    language: LanguageId::Swift,
    line_markers: SLASHES,
    block: C_BLOCK,
    doc_block_open: Some("/**"),
    doc_line_markers: &["///"],
    literals: &[TRIPLE_DQ, DQ],
    nestable_block: true,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: &["// swiftlint:", "// MARK:", "// sourcery:"],
    extensions: &["swift"],
};

pub static RUST: GrammarRule = GrammarRule {
    language: LanguageId::Rust,
    line_markers: SLASHES,
    block: C_BLOCK,
    doc_block_open: Some("/**"),
    doc_line_markers: &["///", "//!"],
    literals: &[LiteralRule::RustRaw, DQ_MULTI, LiteralRule::RustChar],
    nestable_block: true,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: &["// @generated"],
    extensions: &["rs"],
};

pub static PYTHON: GrammarRule = GrammarRule {
    language: LanguageId::Python,
    line_markers: HASH,
    block: None,
    doc_block_open: None,
    doc_line_markers: &[],
    literals: &[TRIPLE_DQ, TRIPLE_SQ, DQ, SQ],
    nestable_block: false,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: false,
    directive_prefixes: &[
        "#!",
        "# -*-",
        "# type:",
        "# noqa",
        "# mypy:",
        "# pylint:",
        "# pyright:",
        "# fmt:",
        "# isort:",
        "# pragma:",
    ],
    extensions: &["py", "pyi", "pyx"],
};

pub static BASH: GrammarRule = GrammarRule {
    language: LanguageId::Bash,
    line_markers: HASH,
    block: None,
    doc_block_open: None,
    doc_line_markers: &[],
    literals: &[DQ_MULTI, quoted("'", "'", Escape::None, true, LiteralKind::String)],
    nestable_block: false,
    line_continuation: false,
    hash_needs_word_start: true,
    hash_bracket_is_attribute: false,
    directive_prefixes: &["#!", "# shellcheck"],
    extensions: &["sh", "bash", "zsh"],
};

pub static PHP: GrammarRule = GrammarRule {
    language: LanguageId::Php,
    line_markers: &["//", "#"],
    block: C_BLOCK,
    doc_block_open: Some("/**"),
    doc_line_markers: &[],
    literals: &[DQ_MULTI, SQ_MULTI],
    nestable_block: false,
    line_continuation: false,
    hash_needs_word_start: false,
    hash_bracket_is_attribute: true,
    directive_prefixes: &["#!", "// @", "# @", "// phpcs:", "# phpcs:"],
    extensions: &["php"],
};
