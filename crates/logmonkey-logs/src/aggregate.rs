use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use logmonkey_types::{ColumnWidths, LogEntry};

use crate::error::LogError;
use crate::filter::FilterCriteria;
use crate::parser::LogParser;

/// Line counters for one run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub lines_read: u64,
    pub lines_matched: u64,
    pub lines_malformed: u64,
    pub entries_accepted: u64,
}

/// Everything the formatter needs once all inputs are read
#[derive(Clone, Debug, Default)]
pub struct Aggregate {
    /// Accepted entries in file order, then line order
    pub entries: Vec<LogEntry>,

    /// Final column widths over all accepted entries
    pub widths: ColumnWidths,

    pub stats: AggregateStats,
}

/// Runs match, parse and filter over a sequence of inputs
pub struct Aggregator {
    criteria: FilterCriteria,
    result: Aggregate,
}

impl Aggregator {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            result: Aggregate::default(),
        }
    }

    /// Open a file and ingest every line of it
    pub fn ingest_path(&mut self, path: &Path) -> Result<(), LogError> {
        let file = File::open(path).map_err(|source| LogError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "reading log file");
        self.ingest_reader(&path.display().to_string(), BufReader::new(file))
            .map_err(|source| LogError::UnreadableFile {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Ingest every line of `reader`, naming entries after `source`.
    ///
    /// Lines have `\n` or `\r\n` removed and are decoded as lossy UTF-8 for
    /// matching; each entry keeps the bytes it was decoded from.
    pub fn ingest_reader<R: BufRead>(
        &mut self,
        source: &str,
        mut reader: R,
    ) -> std::io::Result<()> {
        let mut buf = Vec::new();
        let mut line_number = 0u64;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;

            self.ingest_line(source, line_number, strip_line_ending(&buf));
        }

        Ok(())
    }

    fn ingest_line(&mut self, source: &str, line_number: u64, bytes: &[u8]) {
        let stats = &mut self.result.stats;
        stats.lines_read += 1;

        let line = String::from_utf8_lossy(bytes);
        let entry = match LogParser::parse(&line) {
            Ok(None) => return,
            Ok(Some(entry)) => {
                stats.lines_matched += 1;
                entry
                    .with_origin(source, line_number)
                    .with_raw_bytes(bytes)
            }
            Err(e) => {
                stats.lines_matched += 1;
                stats.lines_malformed += 1;
                warn!(source, line_number, "skipping line: {e}");
                return;
            }
        };

        if !self.criteria.matches(&entry) {
            return;
        }

        stats.entries_accepted += 1;
        self.result.widths.observe(&entry);
        self.result.entries.push(entry);
    }

    /// Finish the run and hand back the accumulated entries
    pub fn finish(self) -> Aggregate {
        let stats = self.result.stats;
        info!(
            lines = stats.lines_read,
            matched = stats.lines_matched,
            malformed = stats.lines_malformed,
            accepted = stats.entries_accepted,
            "aggregation complete"
        );
        self.result
    }
}

/// Read every path in order and collect the entries that pass `criteria`.
///
/// Fails on the first unreadable path; nothing is returned for the others.
pub fn aggregate(paths: &[PathBuf], criteria: FilterCriteria) -> Result<Aggregate, LogError> {
    if paths.is_empty() {
        return Err(LogError::NoInputs);
    }

    let mut aggregator = Aggregator::new(criteria);
    for path in paths {
        aggregator.ingest_path(path)?;
    }
    Ok(aggregator.finish())
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
