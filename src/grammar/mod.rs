//! Per-language lexical grammar table.
//!
//! Every supported language is one `'static` [`GrammarRule`] row in
//! [`table`]. The scanner is driven entirely by these rows; adding a language
//! means adding a row and an extension mapping, never new scanner logic.

mod table;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SpanKind;

/// A language the grammar table knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageId {
    C,
    Cpp,
    CSharp,
    Css,
    Go,
    Java,
    JavaScript,
    TypeScript,
    Kotlin,
    Swift,
    Rust,
    Python,
    Bash,
    Php,
}

impl LanguageId {
    pub const ALL: [LanguageId; 14] = [
        LanguageId::C,
        LanguageId::Cpp,
        LanguageId::CSharp,
        LanguageId::Css,
        LanguageId::Go,
        LanguageId::Java,
        LanguageId::JavaScript,
        LanguageId::TypeScript,
        LanguageId::Kotlin,
        LanguageId::Swift,
        LanguageId::Rust,
        LanguageId::Python,
        LanguageId::Bash,
        LanguageId::Php,
    ];

    /// Canonical lowercase tag, as accepted by `--lang`.
    pub fn name(self) -> &'static str {
        match self {
            LanguageId::C => "c",
            LanguageId::Cpp => "cpp",
            LanguageId::CSharp => "csharp",
            LanguageId::Css => "css",
            LanguageId::Go => "go",
            LanguageId::Java => "java",
            LanguageId::JavaScript => "javascript",
            LanguageId::TypeScript => "typescript",
            LanguageId::Kotlin => "kotlin",
            LanguageId::Swift => "swift",
            LanguageId::Rust => "rust",
            LanguageId::Python => "python",
            LanguageId::Bash => "bash",
            LanguageId::Php => "php",
        }
    }

    pub fn grammar(self) -> &'static GrammarRule {
        grammar_for(self)
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a language tag has no grammar row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language: {0:?}")]
pub struct UnknownLanguage(pub String);

impl FromStr for LanguageId {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        let id = match tag.as_str() {
            "c" => LanguageId::C,
            "cpp" | "c++" | "cxx" | "cc" => LanguageId::Cpp,
            "csharp" | "c#" | "cs" => LanguageId::CSharp,
            "css" => LanguageId::Css,
            "go" | "golang" => LanguageId::Go,
            "java" => LanguageId::Java,
            "javascript" | "js" | "jsx" => LanguageId::JavaScript,
            "typescript" | "ts" | "tsx" => LanguageId::TypeScript,
            "kotlin" | "kt" => LanguageId::Kotlin,
            "swift" => LanguageId::Swift,
            "rust" | "rs" => LanguageId::Rust,
            "python" | "py" => LanguageId::Python,
            "bash" | "sh" | "shell" | "zsh" => LanguageId::Bash,
            "php" => LanguageId::Php,
            _ => return Err(UnknownLanguage(s.to_string())),
        };
        Ok(id)
    }
}

/// How an escape character works inside a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// `\x` escapes the next character.
    Backslash,
    /// A doubled close delimiter (`""`) stands for one literal quote.
    Doubled,
    /// No escapes at all (Go raw strings, shell single quotes).
    None,
}

/// Which span kind a literal produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Char,
}

impl LiteralKind {
    pub fn span_kind(self) -> SpanKind {
        match self {
            LiteralKind::String => SpanKind::StringLiteral,
            LiteralKind::Char => SpanKind::CharLiteral,
        }
    }
}

/// One way a string or char literal can start.
///
/// Raw-string families are declared explicitly per language rather than
/// inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralRule {
    /// A delimited literal such as `"…"`, `'…'`, `"""…"""`, `@"…"`.
    Quoted {
        open: &'static str,
        close: &'static str,
        escape: Escape,
        /// If false, an unescaped newline ends the literal (best effort).
        multiline: bool,
        kind: LiteralKind,
    },
    /// Rust raw strings: `r"…"`, `r#"…"#`, `br##"…"##`.
    RustRaw,
    /// C++ raw strings: `R"delim(…)delim"`, optionally `u8R`, `LR`, ….
    CppRaw,
    /// Rust `'x'` / `'\n'` char literals, which share their quote with lifetimes.
    RustChar,
}

/// The lexical description of one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarRule {
    pub language: LanguageId,
    pub line_markers: &'static [&'static str],
    /// Block-comment `(open, close)`.
    pub block: Option<(&'static str, &'static str)>,
    /// Block-open variant that makes a doc comment, e.g. `/**`.
    pub doc_block_open: Option<&'static str>,
    /// Line-comment variants that make a doc comment, e.g. `///`.
    pub doc_line_markers: &'static [&'static str],
    /// Literal openers, in declaration order.
    pub literals: &'static [LiteralRule],
    pub nestable_block: bool,
    /// Backslash-newline continues a line comment (C preprocessor rule).
    pub line_continuation: bool,
    /// A `#` line marker only counts at the start of a word (shell).
    pub hash_needs_word_start: bool,
    /// `#[` opens an attribute, not a `#` comment (PHP 8).
    pub hash_bracket_is_attribute: bool,
    /// Line comments starting with one of these are tool directives.
    pub directive_prefixes: &'static [&'static str],
    /// File extensions (without the dot, lowercase).
    pub extensions: &'static [&'static str],
}

impl GrammarRule {
    /// True if `text` (a full line comment, marker included) is a directive.
    pub fn is_directive(&self, text: &str) -> bool {
        self.directive_prefixes.iter().any(|p| text.starts_with(p))
    }

    /// Returns the comment body with its opening marker removed.
    pub fn strip_line_marker<'a>(&self, text: &'a str) -> &'a str {
        self.doc_line_markers
            .iter()
            .chain(self.line_markers.iter())
            .filter(|m| text.starts_with(**m))
            .max_by_key(|m| m.len())
            .map(|m| &text[m.len()..])
            .unwrap_or(text)
    }

    /// True if `text` is a doc comment written in block form.
    pub fn is_block_doc(&self, text: &str) -> bool {
        self.doc_block_open.is_some_and(|open| text.starts_with(open))
    }
}

/// Looks up the grammar row for `lang`.
pub fn grammar_for(lang: LanguageId) -> &'static GrammarRule {
    match lang {
        LanguageId::C => &table::C,
        LanguageId::Cpp => &table::CPP,
        LanguageId::CSharp => &table::CSHARP,
        LanguageId::Css => &table::CSS,
        LanguageId::Go => &table::GO,
        LanguageId::Java => &table::JAVA,
        LanguageId::JavaScript => &table::JAVASCRIPT,
        LanguageId::TypeScript => &table::TYPESCRIPT,
        LanguageId::Kotlin => &table::KOTLIN,
        LanguageId::Swift => &table::SWIFT,
        LanguageId::Rust => &table::RUST,
        LanguageId::Python => &table::PYTHON,
        LanguageId::Bash => &table::BASH,
        LanguageId::Php => &table::PHP,
    }
}

/// Maps a bare extension (`"rs"`, `".rs"`, `"RS"`) to a language.
pub fn language_for_extension(ext: &str) -> Option<LanguageId> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    LanguageId::ALL
        .into_iter()
        .find(|id| grammar_for(*id).extensions.contains(&ext.as_str()))
}

/// Infers the language from a path's extension.
pub fn language_for_path(path: &Path) -> Option<LanguageId> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(language_for_extension)
}
