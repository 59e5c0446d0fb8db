//! Directory walking that honors `.gitignore` files at every level.
//!
//! Patterns are compiled to anchored regexes. The deepest `.gitignore` that
//! has a matching rule decides; inside one file the last matching rule wins.
//! Paths no file speaks for fall back to [`DEFAULT_IGNORE_PATTERNS`].

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Skipped even without a `.gitignore`: VCS metadata, editor state, and
/// dependency or build trees.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".git/",
    ".svn/",
    ".hg/",
    "CVS/",
    ".idea/",
    ".vscode/",
    "__pycache__/",
    "*.egg-info/",
    "node_modules/",
    "venv/",
    ".venv/",
    "target/",
    "build/",
    "dist/",
    ".cache/",
];

#[derive(Debug, Clone)]
struct IgnoreRule {
    regex: Regex,
    negated: bool,
    dir_only: bool,
}

/// The compiled rules of one `.gitignore` file.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFile {
    rules: Vec<IgnoreRule>,
}

impl IgnoreFile {
    /// Compiles gitignore lines. Lines that do not compile are logged and dropped.
    pub fn parse(text: &str) -> Self {
        let rules = text.lines().filter_map(parse_rule).collect();
        Self { rules }
    }

    pub fn defaults() -> Self {
        Self::parse(&DEFAULT_IGNORE_PATTERNS.join("\n"))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `Some(true)` if `rel` (relative to this file's directory, `/`-separated)
    /// is ignored, `Some(false)` if a `!` rule re-includes it, `None` if no
    /// rule matches.
    pub fn matched(&self, rel: &str, is_dir: bool) -> Option<bool> {
        self.rules
            .iter()
            .rev()
            .find(|r| (is_dir || !r.dir_only) && r.regex.is_match(rel))
            .map(|r| !r.negated)
    }
}

fn parse_rule(line: &str) -> Option<IgnoreRule> {
    let line = line.trim_end_matches('\r');
    let line = if line.ends_with("\\ ") {
        line
    } else {
        line.trim_end()
    };
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (negated, pat) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line.strip_prefix('\\').filter(|r| r.starts_with(['#', '!'])).unwrap_or(line)),
    };
    let (dir_only, pat) = match pat.strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, pat),
    };
    if pat.is_empty() {
        return None;
    }

    // a slash anywhere but the end anchors the pattern to the file's directory.
    let pattern = if pat.contains('/') {
        format!("^{}$", glob_to_regex(pat.strip_prefix('/').unwrap_or(pat)))
    } else {
        format!("^(?:.*/)?{}$", glob_to_regex(pat))
    };

    match Regex::new(&pattern) {
        Ok(regex) => Some(IgnoreRule {
            regex,
            negated,
            dir_only,
        }),
        Err(e) => {
            warn!(line, error = %e, "dropping gitignore pattern");
            None
        }
    }
}

/// Translates one gitignore glob (no leading `!`, no trailing `/`) into
/// regex syntax, without anchors.
fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut re = String::with_capacity(glob.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                let starts_segment = i == 0 || chars[i - 1] == '/';
                if starts_segment && i + 2 == chars.len() {
                    re.push_str(".*");
                    i += 2;
                } else if starts_segment && chars.get(i + 2) == Some(&'/') {
                    re.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    re.push_str("[^/]*");
                    i += 2;
                }
            }
            '*' => {
                re.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                re.push_str("[^/]");
                i += 1;
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    re.push('[');
                    let mut j = i + 1;
                    if matches!(chars[j], '!' | '^') {
                        re.push('^');
                        j += 1;
                    }
                    for c in &chars[j..end] {
                        if matches!(c, '\\' | '[' | '&' | '~') {
                            re.push('\\');
                        }
                        re.push(*c);
                    }
                    re.push(']');
                    i = end + 1;
                }
                None => {
                    re.push_str("\\[");
                    i += 1;
                }
            },
            '\\' if i + 1 < chars.len() => {
                re.push_str(&regex::escape(&chars[i + 1].to_string()));
                i += 2;
            }
            c => {
                re.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }
    re
}

/// Index of the `]` closing the class opened at `open`, if any.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if matches!(chars.get(j), Some('!' | '^')) {
        j += 1;
    }
    // a `]` right after the opener is a literal member.
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    let end = j + chars.get(j..)?.iter().position(|c| *c == ']')?;
    (end > open + 1).then_some(end)
}

/// `/`-separated form of a relative path, for pattern matching.
pub fn slash_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn load_ignore_file(dir: &Path) -> Option<IgnoreFile> {
    let file = dir.join(".gitignore");
    if !file.is_file() {
        return None;
    }
    match fs::read_to_string(&file) {
        Ok(text) => Some(IgnoreFile::parse(&text)).filter(|f| !f.is_empty()),
        Err(e) => {
            warn!(path = %file.display(), error = %e, "cannot read .gitignore");
            None
        }
    }
}

fn is_ignored(
    entry: &DirEntry,
    stack: &[(PathBuf, IgnoreFile)],
    defaults: &IgnoreFile,
    root: &Path,
) -> bool {
    let path = entry.path();
    let is_dir = entry.file_type().is_dir();
    for (dir, file) in stack.iter().rev() {
        let Ok(rel) = path.strip_prefix(dir) else {
            continue;
        };
        if let Some(ignored) = file.matched(&slash_path(rel), is_dir) {
            return ignored;
        }
    }
    let rel = path.strip_prefix(root).unwrap_or(path);
    defaults.matched(&slash_path(rel), is_dir).unwrap_or(false)
}

/// Walks `root` and returns every file no `.gitignore` (or default pattern)
/// excludes, sorted by path. Ignored directories are not descended into.
pub fn collect_files(root: &Path) -> Vec<PathBuf> {
    let defaults = IgnoreFile::defaults();
    let mut stack: Vec<(PathBuf, IgnoreFile)> = Vec::new();

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            let path = entry.path();
            while stack.last().is_some_and(|(dir, _)| !path.starts_with(dir)) {
                stack.pop();
            }
            if entry.depth() > 0 && is_ignored(entry, &stack, &defaults, root) {
                debug!(path = %path.display(), "skipping: gitignored");
                return false;
            }
            if entry.file_type().is_dir()
                && let Some(file) = load_ignore_file(path)
            {
                stack.push((path.to_path_buf(), file));
            }
            true
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}
