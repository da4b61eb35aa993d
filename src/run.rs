use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use logmonkey_logs::{CsvQuoting, FilterCriteria, Formatter, LogEntry, OutputMode, aggregate};

/// Everything one run needs, already validated
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub inputs: Vec<PathBuf>,
    pub criteria: FilterCriteria,
    /// None writes to standard output
    pub output: Option<PathBuf>,
    pub spaced: bool,
    pub csv_quoting: CsvQuoting,
}

/// Read, filter and emit. Returns the number of records written.
///
/// All inputs are read before the destination is touched, so an unreadable
/// input leaves no partial output behind.
pub fn run(options: &RunOptions) -> Result<usize> {
    let result = aggregate(&options.inputs, options.criteria.clone())?;

    let mode = OutputMode::select(options.output.as_deref(), options.spaced);
    let formatter = Formatter::new(mode, result.widths).with_csv_quoting(options.csv_quoting);

    let written = match &options.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_records(&formatter, &result.entries, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", path.display()))?
        }
        None => write_records(&formatter, &result.entries, io::stdout().lock())
            .context("failed to write to standard output")?,
    };

    info!(records = written, mode = mode.label(), "output complete");
    Ok(written)
}

fn write_records<W: Write>(
    formatter: &Formatter,
    entries: &[LogEntry],
    mut out: W,
) -> io::Result<usize> {
    let written = formatter.write_all(&mut out, entries)?;
    out.flush()?;
    Ok(written)
}
