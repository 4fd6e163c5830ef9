//! Runtime configuration.
//!
//! Values come from an optional `.env` file layered over the process
//! environment. The file is re-read on every snapshot so the prompt and
//! model can be edited while the viewer is running; each pipeline task
//! works from the snapshot it took.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Environment keys understood by the application.
pub mod keys {
    pub const WATCH_DIRECTORY: &str = "WATCH_DIRECTORY";
    pub const OUTPUT_DIRECTORY: &str = "OUTPUT_DIRECTORY";
    pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
    pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
    pub const GEMINI_PROMPT: &str = "GEMINI_PROMPT";
}

pub const DEFAULT_WATCH_DIRECTORY: &str = "./images";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "./processed";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_PROMPT: &str = "Transform this image with a creative style.";

/// Configuration as seen by one pipeline task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub watch_dir: PathBuf,
    pub output_dir: PathBuf,
    /// `None` when unset or blank.
    pub api_key: Option<String>,
    pub model: String,
    pub prompt: String,
}

impl ConfigSnapshot {
    /// Resolve a snapshot from merged variables. Overrides win over variables.
    pub fn from_vars(vars: &HashMap<String, String>, overrides: &DirectoryOverrides) -> Self {
        let value = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            watch_dir: overrides.watch_dir.clone().unwrap_or_else(|| {
                PathBuf::from(
                    value(keys::WATCH_DIRECTORY).unwrap_or_else(|| DEFAULT_WATCH_DIRECTORY.into()),
                )
            }),
            output_dir: overrides.output_dir.clone().unwrap_or_else(|| {
                PathBuf::from(
                    value(keys::OUTPUT_DIRECTORY).unwrap_or_else(|| DEFAULT_OUTPUT_DIRECTORY.into()),
                )
            }),
            api_key: value(keys::GOOGLE_API_KEY),
            model: value(keys::GEMINI_MODEL).unwrap_or_else(|| DEFAULT_MODEL.into()),
            prompt: value(keys::GEMINI_PROMPT).unwrap_or_else(|| DEFAULT_PROMPT.into()),
        }
    }
}

/// Directory choices given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryOverrides {
    pub watch_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Source of configuration snapshots, queried fresh for each pipeline task.
pub trait ConfigProvider: Send + Sync + 'static {
    fn snapshot(&self) -> ConfigSnapshot;
}

/// `.env` file over the process environment, with command line overrides.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    env_file: PathBuf,
    overrides: DirectoryOverrides,
}

impl EnvConfig {
    pub fn new(env_file: impl Into<PathBuf>, overrides: DirectoryOverrides) -> Self {
        Self {
            env_file: env_file.into(),
            overrides,
        }
    }

    pub fn env_file(&self) -> &Path {
        &self.env_file
    }
}

impl ConfigProvider for EnvConfig {
    fn snapshot(&self) -> ConfigSnapshot {
        let mut vars: HashMap<String, String> = std::env::vars().collect();
        // File values take precedence so edits apply without a restart.
        vars.extend(parse_env_file(&self.env_file));
        ConfigSnapshot::from_vars(&vars, &self.overrides)
    }
}

/// Parse a dotenv file. Missing files yield an empty map.
pub fn parse_env_file(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }

    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter
            .filter_map(|entry| match entry {
                Ok(pair) => Some(pair),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping malformed env entry");
                    None
                }
            })
            .collect(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read env file");
            HashMap::new()
        }
    }
}
