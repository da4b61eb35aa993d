//! Configuration file support
//!
//! [`Config::load`] reads `$XDG_CONFIG_HOME/logmonkey/config.toml` (or an
//! explicit path). A missing default file is not an error; the built-in
//! defaults apply. Command-line flags override anything set here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use logmonkey_types::CsvQuoting;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[filter]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Level used when `--level` is not given
    pub level: Option<String>,
    /// Tags used when `--tags` is not given
    #[serde(default)]
    pub tags: Vec<String>,
}

/// `[output]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub spaced: bool,
    #[serde(default)]
    pub csv_quoting: CsvQuoting,
}

impl Config {
    /// Load from `explicit` if given (it must exist), otherwise from the
    /// default location if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        ensure!(
            config.filter.tags.iter().all(|tag| !tag.trim().is_empty()),
            "filter.tags must not contain empty tags"
        );
        Ok(config)
    }
}

fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("logmonkey").join("config.toml"))
}
