pub mod classify;
pub mod config;
pub mod grammar;
pub mod model;
pub mod normalize;
pub mod rewrite;
pub mod scan;
pub mod walk;

pub use normalize::{
    LineRanges, NormalizeError, NormalizeOptions, NormalizedResult, normalize,
    normalize_with_grammar,
};

use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use config::Settings;
use grammar::LanguageId;

/// Options controlling how rewritten files are written on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// If true, files are normalized and compared but never written.
    pub dry_run: bool,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Changed,
    Unchanged,
    /// Unsupported extension, ignored path, or not UTF-8.
    Skipped,
}

/// Totals for a directory run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub processed: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl Stats {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Changed => {
                self.processed += 1;
                self.changed += 1;
            }
            FileOutcome::Unchanged => {
                self.processed += 1;
                self.unchanged += 1;
            }
            FileOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Reads `path` and normalizes it, returning the original text alongside the result.
///
/// `lang` overrides extension-based detection.
pub fn normalize_file(
    path: &Path,
    settings: &Settings,
    lang: Option<LanguageId>,
) -> Result<(String, NormalizedResult), Box<dyn Error>> {
    let lang = lang
        .or_else(|| settings.language_for_path(path))
        .ok_or_else(|| format!("cannot infer language for {}; pass --lang", path.display()))?;
    let input = fs::read_to_string(path)?;
    let result = normalize_with_grammar(&input, lang.grammar(), &settings.normalize);
    Ok((input, result))
}

/// Single file mode: normalize `path` in place (unless dry-running).
pub fn process_file(
    path: &Path,
    settings: &Settings,
    lang: Option<LanguageId>,
    write_opts: &WriteOptions,
) -> Result<FileOutcome, Box<dyn Error>> {
    let Some(lang) = lang.or_else(|| settings.language_for_path(path)) else {
        debug!(path = %path.display(), "skipping: unsupported extension");
        return Ok(FileOutcome::Skipped);
    };

    let bytes = fs::read(path)?;
    // rewriting a lossy conversion would corrupt the file, so leave non-UTF-8 input alone.
    let Ok(input) = String::from_utf8(bytes) else {
        warn!(path = %path.display(), "skipping: not valid UTF-8");
        return Ok(FileOutcome::Skipped);
    };

    let result = normalize_with_grammar(&input, lang.grammar(), &settings.normalize);
    if !result.changed(&input) {
        debug!(path = %path.display(), "unchanged");
        return Ok(FileOutcome::Unchanged);
    }

    if !write_opts.dry_run {
        fs::write(path, &result.output_text)?;
        info!(path = %path.display(), summary = ?result.summary(), "rewrote");
    }
    Ok(FileOutcome::Changed)
}

/// Bulk mode: walk `root` and normalize every supported file.
///
/// A plain file is handled like a one-entry directory. Paths excluded by
/// `.gitignore` files are never visited. Per-file failures are logged and
/// counted; only a missing root is an error.
pub fn process_path(
    root: &Path,
    settings: &Settings,
    write_opts: &WriteOptions,
) -> Result<Stats, Box<dyn Error>> {
    let start_time = Instant::now();

    if !root.exists() {
        return Err(format!("Path not found: {}", root.display()).into());
    }

    let entries = walk::collect_files(root);

    let total = entries.len();
    let mut stats = Stats::default();
    let mut count = 0;

    for path in &entries {
        let path = path.as_path();
        count += 1;

        let relative = path.strip_prefix(root).unwrap_or(path);
        if settings.is_file_ignored(relative) {
            debug!(path = %path.display(), "skipping: matches file ignore pattern");
            stats.record(FileOutcome::Skipped);
            continue;
        }

        let outcome = match process_file(path, settings, None, write_opts) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed");
                eprintln!("Error: {:?}: {}", path, e);
                stats.errors += 1;
                continue;
            }
        };
        stats.record(outcome);

        if outcome == FileOutcome::Changed {
            let elapsed = start_time.elapsed();
            let total_ms = elapsed.as_millis();
            let mins = total_ms / 60_000;
            let secs = (total_ms % 60_000) / 1_000;
            let ms = total_ms % 1_000;
            let verb = if write_opts.dry_run {
                "Would rewrite"
            } else {
                "Rewrote"
            };
            eprintln!(
                "[{:>4}/{:>4}] [{:02}:{:02}.{:03}] {}: {:?}",
                count, total, mins, secs, ms, verb, path
            );
        }
    }

    eprintln!(
        "Done. Processed {} files in {:.3}s ({} changed, {} unchanged, {} skipped, {} errors).",
        stats.processed,
        start_time.elapsed().as_secs_f64(),
        stats.changed,
        stats.unchanged,
        stats.skipped,
        stats.errors
    );
    Ok(stats)
}

/// Parses a selective-removal line list such as `3-10,15`.
pub fn parse_line_ranges(spec: &str) -> Result<LineRanges, String> {
    let mut ranges = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (lo, hi) = match part.split_once('-') {
            Some((lo, hi)) => (parse_line_number(lo)?, parse_line_number(hi)?),
            None => {
                let n = parse_line_number(part)?;
                (n, n)
            }
        };
        if lo > hi {
            return Err(format!("invalid line range {part:?}: start is after end"));
        }
        ranges.push(lo..=hi);
    }
    if ranges.is_empty() {
        return Err("empty line list".to_string());
    }
    Ok(LineRanges::new(ranges))
}

fn parse_line_number(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("line numbers start at 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid line number {s:?}: {e}")),
    }
}
