//! `.decomment.yaml` loading, saving, and compilation into run settings.
//!
//! Two files may contribute: a global one in the home directory and a local
//! one in the working directory. The local file is layered over the global
//! one (see [`Config::resolve`]).

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

use crate::classify::{DEFAULT_MARKERS, RetentionPolicy};
use crate::grammar::{self, LanguageId, UnknownLanguage};
use crate::normalize::NormalizeOptions;
use crate::rewrite::RewriteOptions;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".decomment.yaml";

/// Overrides the location of the global config file.
pub const GLOBAL_CONFIG_ENV: &str = "DECOMMENT_GLOBAL_CONFIG";

/// The global config file: `$DECOMMENT_GLOBAL_CONFIG`, else
/// `~/.decomment.yaml`. `None` if no home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(GLOBAL_CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_FILE))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("serializing config for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    UnknownLanguage(#[from] UnknownLanguage),
}

/// On-disk configuration. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub markers: Vec<String>,
    pub preserve_doc_comments: bool,
    pub preserve_directives: bool,
    pub collapse_trailing_blank_lines: bool,

    /// Regexes over the full comment text; a match keeps the comment.
    pub ignore_patterns: Vec<String>,

    /// Regexes over `/`-separated paths; a match skips the file.
    pub file_ignore_patterns: Vec<String>,

    /// Extra `extension -> language tag` mappings, e.g. `h: cpp`.
    pub extensions: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
            preserve_doc_comments: true,
            preserve_directives: true,
            collapse_trailing_blank_lines: true,
            ignore_patterns: Vec::new(),
            file_ignore_patterns: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parses YAML text. An empty (or comment-only) document yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        let value: Value = serde_yaml::from_str(text)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let value = load_value(path)?;
        Self::from_value(value, path)
    }

    fn from_value(value: Value, path: &Path) -> Result<Self, ConfigError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `local` layered over `global`; missing files contribute nothing.
    ///
    /// Keys set in the local file win. The two pattern lists are concatenated,
    /// global entries first, and `extensions` maps are merged.
    pub fn resolve(global: Option<&Path>, local: &Path) -> Result<Self, ConfigError> {
        let mut merged = Value::Null;
        for path in global.into_iter().chain([local]) {
            if !path.is_file() {
                continue;
            }
            let value = load_value(path)?;
            // reject bad keys here, while the error can still name the file.
            Self::from_value(value.clone(), path)?;
            merged = layer(merged, value);
        }
        Self::from_value(merged, local)
    }

    /// Loads `path`, or the defaults if it does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Writes the config, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = self.to_yaml_string().map_err(|source| ConfigError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, text).map_err(write_err)
    }

    /// Appends a comment-ignore regex. Returns `false` if it was already present.
    pub fn add_ignore_pattern(&mut self, pattern: &str) -> Result<bool, ConfigError> {
        add_pattern(&mut self.ignore_patterns, pattern)
    }

    /// Appends a file-ignore regex. Returns `false` if it was already present.
    pub fn add_file_ignore_pattern(&mut self, pattern: &str) -> Result<bool, ConfigError> {
        add_pattern(&mut self.file_ignore_patterns, pattern)
    }

    /// Validates every pattern and language tag and builds run settings.
    pub fn compile(&self) -> Result<Settings, ConfigError> {
        let ignore_patterns = compile_all(&self.ignore_patterns)?;
        let file_ignore = compile_all(&self.file_ignore_patterns)?;

        let mut extensions = BTreeMap::new();
        for (ext, tag) in &self.extensions {
            let lang: LanguageId = tag.parse()?;
            extensions.insert(ext.trim_start_matches('.').to_ascii_lowercase(), lang);
        }

        Ok(Settings {
            normalize: NormalizeOptions {
                retention: RetentionPolicy {
                    marker_set: self.markers.iter().cloned().collect(),
                    preserve_doc_comments: self.preserve_doc_comments,
                    preserve_directives: self.preserve_directives,
                    ignore_patterns,
                },
                rewrite: RewriteOptions {
                    collapse_trailing_blank_lines: self.collapse_trailing_blank_lines,
                },
                only_lines: None,
            },
            file_ignore,
            extensions,
        })
    }
}

fn load_value(path: &Path) -> Result<Value, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(value)
}

/// Lays the keys of `top` over `base`.
fn layer(base: Value, top: Value) -> Value {
    match (base, top) {
        (Value::Mapping(mut base), Value::Mapping(top)) => {
            for (key, value) in top {
                let merged = match (key.as_str(), base.shift_remove(&key), value) {
                    (
                        Some("ignore_patterns" | "file_ignore_patterns"),
                        Some(Value::Sequence(mut under)),
                        Value::Sequence(over),
                    ) => {
                        for v in over {
                            if !under.contains(&v) {
                                under.push(v);
                            }
                        }
                        Value::Sequence(under)
                    }
                    (Some("extensions"), Some(Value::Mapping(mut under)), Value::Mapping(over)) => {
                        under.extend(over);
                        Value::Mapping(under)
                    }
                    (_, _, value) => value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (base, Value::Null) => base,
        (_, top) => top,
    }
}

fn add_pattern(list: &mut Vec<String>, pattern: &str) -> Result<bool, ConfigError> {
    compile_pattern(pattern)?;
    if list.iter().any(|p| p == pattern) {
        return Ok(false);
    }
    list.push(pattern.to_string());
    Ok(true)
}

fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns.iter().map(|p| compile_pattern(p)).collect()
}

/// A validated [`Config`], ready to drive file processing.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub normalize: NormalizeOptions,
    pub file_ignore: Vec<Regex>,
    pub extensions: BTreeMap<String, LanguageId>,
}

impl Settings {
    /// Extension overrides first, then the built-in table.
    pub fn language_for_path(&self, path: &Path) -> Option<LanguageId> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.extensions
            .get(&ext)
            .copied()
            .or_else(|| grammar::language_for_extension(&ext))
    }

    pub fn is_file_ignored(&self, path: &Path) -> bool {
        if self.file_ignore.is_empty() {
            return false;
        }
        let p = path.to_string_lossy().replace('\\', "/");
        self.file_ignore.iter().any(|re| re.is_match(&p))
    }
}
