//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use assist_core::SearchConfig;

use crate::output::Output;

/// Config file names searched for, nearest directory first.
pub const CONFIG_NAMES: [&str; 3] = ["assist.toml", ".assist.toml", "assist.json"];

/// Execution context for CLI commands.
pub struct Context {
    pub config: SearchConfig,
    /// File the config was read from; `None` when running on defaults.
    pub config_path: Option<PathBuf>,
    pub output: Output,
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from the given config file, else the nearest one found
    /// walking up from the working directory, else defaults.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let config = SearchConfig::load(path)
                    .with_context(|| format!("Failed to load config: {}", path))?;
                (config, Some(PathBuf::from(path)))
            }
            None => match Self::find_config(&cwd) {
                Some(path) => {
                    let config = SearchConfig::load(&path)
                        .with_context(|| format!("Failed to load config: {}", path.display()))?;
                    (config, Some(path))
                }
                None => (SearchConfig::default(), None),
            },
        };

        for label in config.languages_missing_credentials() {
            tracing::warn!(language = label, "no credentials configured");
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find a config file in the directory tree.
    fn find_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let candidate = current.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }

            if !current.pop() {
                return None;
            }
        }
    }
}
