//! Log processing for logmonkey
//!
//! This crate provides line matching and parsing, level/tag filtering,
//! multi-file aggregation and output formatting for LogMonkey log files.

mod aggregate;
mod error;
mod filter;
mod format;
mod parser;

pub use aggregate::{Aggregate, AggregateStats, Aggregator, aggregate};
pub use error::LogError;
pub use filter::{FilterCriteria, parse_tag_filter};
pub use format::Formatter;
pub use parser::LogParser;

// Re-export types used in our public API
pub use logmonkey_types::{ColumnWidths, CsvQuoting, LogEntry, OutputMode};
