//! Shared types for logmonkey
//!
//! This crate contains data structures used across the logmonkey crates.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use unicode_width::UnicodeWidthStr;

// ============================================================================
// Log Types
// ============================================================================

/// A single parsed log line
///
/// Entries are built once by the parser and never mutated afterwards, so all
/// fields are private and exposed through accessors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Original raw log line, without its line terminator
    raw: String,

    /// Input bytes of the line when they were not valid UTF-8
    raw_bytes: Option<Vec<u8>>,

    /// Format tag, e.g. `lmf1`
    format: String,

    /// Timestamp token, verbatim
    timestamp: String,

    /// Severity label, free-form
    level: String,

    /// Source/category tag
    tag: String,

    /// Message text after the tag separator
    message: String,

    /// Name of the input this line came from
    source: String,

    /// Line number within the source (1-based, 0 when unknown)
    line_number: u64,
}

impl LogEntry {
    /// Create a new log entry with no provenance
    pub fn new(
        raw: impl Into<String>,
        format: impl Into<String>,
        timestamp: impl Into<String>,
        level: impl Into<String>,
        tag: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            raw: raw.into(),
            raw_bytes: None,
            format: format.into(),
            timestamp: timestamp.into(),
            level: level.into(),
            tag: tag.into(),
            message: message.into(),
            source: String::new(),
            line_number: 0,
        }
    }

    /// Attach the input name and line number this entry was read from
    pub fn with_origin(mut self, source: impl Into<String>, line_number: u64) -> Self {
        self.source = source.into();
        self.line_number = line_number;
        self
    }

    /// Keep the undecoded input line. Only needed when `raw` was decoded
    /// lossily; raw output then writes these bytes instead.
    pub fn with_raw_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        self.raw_bytes = (bytes != self.raw.as_bytes()).then_some(bytes);
        self
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The line exactly as it was read
    pub fn raw_bytes(&self) -> &[u8] {
        self.raw_bytes.as_deref().unwrap_or(self.raw.as_bytes())
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}

// ============================================================================
// Column Alignment
// ============================================================================

/// Widest level and tag seen so far, in terminal columns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnWidths {
    pub level: usize,
    pub tag: usize,
}

impl ColumnWidths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the columns to fit an accepted entry. Never shrinks.
    ///
    /// Widths are terminal display columns, not character counts, so wide
    /// CJK text counts two per character; for ASCII the two agree.
    pub fn observe(&mut self, entry: &LogEntry) {
        self.level = self.level.max(display_width(entry.level()));
        self.tag = self.tag.max(display_width(entry.tag()));
    }
}

/// Display width of `text` in terminal columns
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

// ============================================================================
// Output Types
// ============================================================================

/// How accepted entries are rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// The original line, trailing whitespace removed
    #[default]
    Raw,
    /// Level and tag padded to the widest value of the run
    Aligned,
    /// `timestamp,level,tag,message`
    Csv,
}

impl OutputMode {
    /// Pick the mode for a destination. `None` means standard output, which
    /// is never CSV.
    pub fn select(destination: Option<&Path>, align: bool) -> Self {
        let is_csv = destination
            .and_then(|path| path.extension())
            .is_some_and(|ext| ext == "csv");

        if is_csv {
            Self::Csv
        } else if align {
            Self::Aligned
        } else {
            Self::Raw
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Aligned => "aligned",
            Self::Csv => "csv",
        }
    }
}

/// Quoting policy for CSV output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CsvQuoting {
    /// Quote a field only when it contains a comma; quotes inside fields are
    /// written as-is
    #[default]
    CommaOnly,
    /// Full RFC 4180 quoting with doubled embedded quotes
    Rfc4180,
}

impl FromStr for CsvQuoting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comma-only" => Ok(Self::CommaOnly),
            "rfc4180" => Ok(Self::Rfc4180),
            other => Err(format!(
                "unknown CSV quoting '{other}' (expected 'comma-only' or 'rfc4180')"
            )),
        }
    }
}

impl fmt::Display for CsvQuoting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommaOnly => write!(f, "comma-only"),
            Self::Rfc4180 => write!(f, "rfc4180"),
        }
    }
}
