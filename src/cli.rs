use std::collections::HashSet;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use logmonkey_logs::{CsvQuoting, FilterCriteria, LogError, parse_tag_filter};

use crate::config::Config;
use crate::run::RunOptions;

/// logmonkey - parse, filter and reformat LogMonkey log files
#[derive(Parser, Debug)]
#[command(name = "logmonkey")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Example:\n    logmonkey -l D -t net,io -o out.csv app.log")]
pub struct Args {
    /// Log files to parse, read in the order given
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Only keep entries with exactly this level
    #[arg(short, long, value_name = "LEVEL")]
    pub level: Option<String>,

    /// Only keep entries with one of these comma separated tags
    #[arg(short, long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Write to this file instead of standard output; a .csv file gets CSV
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Pad the level and tag columns to a common width
    #[arg(short, long)]
    pub spaced: bool,

    /// Quoting used for CSV output [comma-only, rfc4180]
    #[arg(long, value_name = "POLICY")]
    pub csv_quoting: Option<CsvQuoting>,

    /// Config file (default: $XDG_CONFIG_HOME/logmonkey/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print more diagnostics to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Problems with the invocation itself, detected before any log is read
#[derive(Error, Debug)]
pub enum CliError {
    #[error("no input path(s) provided")]
    NoInputs,

    #[error("path isn't valid: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error(transparent)]
    InvalidFilter(#[from] LogError),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidFilter(_) => 1,
            Self::NoInputs => 2,
            Self::InvalidPath(_) => 3,
        }
    }
}

impl Args {
    /// Validate the invocation and merge it over `config`
    pub fn into_options(self, config: &Config) -> Result<RunOptions, CliError> {
        validate_inputs(&self.files)?;

        let mut criteria = FilterCriteria::new();
        if let Some(level) = self.level.or_else(|| config.filter.level.clone()) {
            criteria = criteria.with_level(level);
        }

        // Config tags are validated on load and taken as whole elements
        let tags = match &self.tags {
            Some(text) => parse_tag_filter(text)?,
            None => config
                .filter
                .tags
                .iter()
                .map(|tag| tag.trim().to_string())
                .collect::<HashSet<_>>(),
        };
        if !tags.is_empty() {
            criteria = criteria.with_tags(tags);
        }

        Ok(RunOptions {
            inputs: self.files,
            criteria,
            output: self.output,
            spaced: self.spaced || config.output.spaced,
            csv_quoting: self.csv_quoting.unwrap_or(config.output.csv_quoting),
        })
    }
}

fn validate_inputs(files: &[PathBuf]) -> Result<(), CliError> {
    if files.is_empty() {
        return Err(CliError::NoInputs);
    }
    match files.iter().find(|path| !path.is_file()) {
        Some(path) => Err(CliError::InvalidPath(path.clone())),
        None => Ok(()),
    }
}
