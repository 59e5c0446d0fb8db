use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, debug};

use decomment::config::{Config, DEFAULT_CONFIG_FILE, Settings, global_config_path};
use decomment::grammar::LanguageId;
use decomment::{LineRanges, NormalizedResult, WriteOptions, normalize_with_grammar};

#[derive(Parser)]
#[command(
    name = "decomment",
    version,
    about = "Strip narration comments from source files while keeping docs, markers, and directives"
)]
struct Cli {
    /// File or directory to normalize; `-` or nothing reads stdin
    path: Option<PathBuf>,

    /// Language of the input (default: inferred from the file extension)
    #[arg(short, long)]
    lang: Option<LanguageId>,

    /// Write the result here instead of stdout
    #[arg(short, long, conflicts_with = "write")]
    output: Option<PathBuf>,

    /// Rewrite the file in place
    #[arg(short, long)]
    write: bool,

    /// Report what would change without writing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Exit with status 1 if any file would change; writes nothing
    #[arg(long)]
    check: bool,

    /// Comment prefix that keeps a line comment (repeatable; replaces the default set)
    #[arg(short, long = "marker", value_name = "MARKER")]
    markers: Vec<String>,

    /// Treat doc comments like ordinary comments
    #[arg(long)]
    no_doc_comments: bool,

    /// Leave blank lines at the end of the file alone
    #[arg(long)]
    keep_trailing_blank_lines: bool,

    /// Also remove tool directives such as `//go:build` or `# noqa`
    #[arg(short, long)]
    remove_directives: bool,

    /// Keep comments whose text matches this regex (repeatable)
    #[arg(long = "ignore", value_name = "REGEX")]
    ignore: Vec<String>,

    /// Skip files whose path matches this regex (repeatable)
    #[arg(long = "ignore-file", value_name = "REGEX")]
    ignore_file: Vec<String>,

    /// Only remove comments touching these 1-based lines, e.g. `3-10,15`
    #[arg(long, value_name = "SPEC", value_parser = decomment::parse_line_ranges)]
    lines: Option<LineRanges>,

    /// Configuration file (default: ~/.decomment.yaml, then ./.decomment.yaml over it)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Append a comment-ignore regex to the configuration file and exit
    #[arg(long, value_name = "REGEX")]
    add_ignore: Option<String>,

    /// Append a file-ignore regex to the configuration file and exit
    #[arg(long, value_name = "REGEX")]
    add_ignore_file: Option<String>,

    /// Make --add-ignore / --add-ignore-file edit the global configuration
    #[arg(long, conflicts_with = "config")]
    global: bool,

    /// Write a JSON span report for a single input
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<u8, Box<dyn Error>> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if cli.add_ignore.is_some() || cli.add_ignore_file.is_some() {
        let target = if cli.global {
            global_config_path().ok_or("no home directory for the global configuration")?
        } else {
            config_path
        };
        let mut cfg = Config::load_or_default(&target)?;
        let mut dirty = false;
        if let Some(pattern) = &cli.add_ignore {
            dirty |= note_added(cfg.add_ignore_pattern(pattern)?, "ignore", pattern, &target);
        }
        if let Some(pattern) = &cli.add_ignore_file {
            dirty |= note_added(cfg.add_file_ignore_pattern(pattern)?, "file ignore", pattern, &target);
        }
        if dirty {
            cfg.save(&target)?;
        }
        return Ok(0);
    }

    let mut cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::resolve(global_config_path().as_deref(), &config_path)?,
    };
    apply_flags(&mut cfg, &cli);

    let mut settings = cfg.compile()?;
    settings.normalize.only_lines = cli.lines.clone();
    debug!(?settings, "resolved settings");

    let write_opts = WriteOptions {
        dry_run: cli.dry_run || cli.check,
    };

    match cli.path.as_deref() {
        None => run_stdin(&cli, &settings),
        Some(p) if p == Path::new("-") => run_stdin(&cli, &settings),
        Some(p) if p.is_dir() => {
            if cli.output.is_some() || cli.report.is_some() {
                return Err("--output and --report need a single input file".into());
            }
            let stats = decomment::process_path(p, &settings, &write_opts)?;
            if stats.errors > 0 {
                Ok(2)
            } else if cli.check && stats.changed > 0 {
                Ok(1)
            } else {
                Ok(0)
            }
        }
        Some(p) => run_file(&cli, p, &settings, &write_opts),
    }
}

fn note_added(added: bool, list: &str, pattern: &str, path: &Path) -> bool {
    if added {
        eprintln!("Added {} pattern {:?} to {}", list, pattern, path.display());
    } else {
        eprintln!("Pattern {:?} already in the {} list of {}", pattern, list, path.display());
    }
    added
}

/// CLI flags override the config file; repeatable lists extend it, except markers.
fn apply_flags(cfg: &mut Config, cli: &Cli) {
    if !cli.markers.is_empty() {
        cfg.markers = cli.markers.clone();
    }
    if cli.no_doc_comments {
        cfg.preserve_doc_comments = false;
    }
    if cli.keep_trailing_blank_lines {
        cfg.collapse_trailing_blank_lines = false;
    }
    if cli.remove_directives {
        cfg.preserve_directives = false;
    }
    cfg.ignore_patterns.extend(cli.ignore.iter().cloned());
    cfg.file_ignore_patterns.extend(cli.ignore_file.iter().cloned());
}

fn run_stdin(cli: &Cli, settings: &Settings) -> Result<u8, Box<dyn Error>> {
    let lang = cli.lang.ok_or("reading stdin requires --lang")?;
    let input = io::read_to_string(io::stdin())?;
    let result = normalize_with_grammar(&input, lang.grammar(), &settings.normalize);
    finish(cli, None, &input, &result)
}

fn run_file(
    cli: &Cli,
    path: &Path,
    settings: &Settings,
    write_opts: &WriteOptions,
) -> Result<u8, Box<dyn Error>> {
    if cli.write {
        if settings.is_file_ignored(path) {
            eprintln!("Skipped: {:?}", path);
            return Ok(0);
        }
        let (input, result) = decomment::normalize_file(path, settings, cli.lang)?;
        write_report(cli, Some(path), &input, &result)?;
        let changed = result.changed(&input);
        if changed && !write_opts.dry_run {
            fs::write(path, &result.output_text)?;
            eprintln!("Rewrote: {:?}", path);
        } else if changed {
            eprintln!("Would rewrite: {:?}", path);
        }
        return Ok(if cli.check && changed { 1 } else { 0 });
    }

    let (input, result) = decomment::normalize_file(path, settings, cli.lang)?;
    finish(cli, Some(path), &input, &result)
}

/// Emits the result of a single-input run to `--output` or stdout.
fn finish(
    cli: &Cli,
    path: Option<&Path>,
    input: &str,
    result: &NormalizedResult,
) -> Result<u8, Box<dyn Error>> {
    write_report(cli, path, input, result)?;
    let changed = result.changed(input);

    if cli.check {
        if changed {
            let name = path.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
            eprintln!("Would change: {}", name);
            return Ok(1);
        }
        return Ok(0);
    }

    match &cli.output {
        Some(out) if cli.dry_run => eprintln!("Would write: {:?}", out),
        Some(out) => fs::write(out, &result.output_text)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(result.output_text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(0)
}

fn write_report(
    cli: &Cli,
    path: Option<&Path>,
    input: &str,
    result: &NormalizedResult,
) -> Result<(), Box<dyn Error>> {
    let Some(report_path) = &cli.report else {
        return Ok(());
    };
    let source = path.map(|p| p.to_string_lossy().to_string());
    let report = result.report(source.as_deref(), input);
    // prettify JSON so it's easy to inspect / diff.
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(report_path, json)?;
    Ok(())
}
