use regex::Regex;
use std::sync::LazyLock;

use logmonkey_types::LogEntry;

use crate::error::LogError;

/// Shape of a LogMonkey line: `(lmfN)[yyyy-mm-dd hh:mm:ss] {LEVEL} tag: message`
static LOG_LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(lmf[0-9]+\)\[[0-9: -]{19}\] \{\w+\} [^:]+: .*$")
        .expect("log line pattern must compile")
});

/// Log parser for extracting structure from raw log lines
pub struct LogParser;

impl LogParser {
    /// Check whether a line has the LogMonkey shape
    pub fn is_log_line(line: &str) -> bool {
        LOG_LINE_PATTERN.is_match(line)
    }

    /// Parse a raw line. Lines without the LogMonkey shape yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<LogEntry>, LogError> {
        if !Self::is_log_line(line) {
            return Ok(None);
        }
        Self::parse_fields(line).map(Some)
    }

    /// Extract the five fields by scanning for their delimiters.
    ///
    /// This does not check the overall shape; call [`LogParser::parse`] for
    /// untrusted input. A scan that finds no delimiter fails with
    /// [`LogError::MalformedLine`].
    pub fn parse_fields(line: &str) -> Result<LogEntry, LogError> {
        // Format tag is wrapped in parentheses
        let (start, end) = delimited(line, '(', ')', 0)?;
        let format = &line[start..end];

        // Timestamp is wrapped in square brackets
        let (start, ts_end) = delimited(line, '[', ']', 0)?;
        let timestamp = &line[start..ts_end];

        // Level is the first curly-bracketed span after the timestamp
        let (start, level_end) = delimited(line, '{', '}', ts_end)?;
        let level = &line[start..level_end];

        // Tag runs from the level's closing brace to the next colon
        let tag_start = level_end + '}'.len_utf8();
        let colon = line[tag_start..]
            .find(':')
            .map(|i| tag_start + i)
            .ok_or_else(|| LogError::malformed("missing ':' after tag"))?;
        let tag = line[tag_start..colon].trim();

        let message = line[colon + ':'.len_utf8()..].trim();

        Ok(LogEntry::new(line, format, timestamp, level, tag, message))
    }
}

/// Byte range between the first `open` at or after `from` and the next `close`
fn delimited(
    line: &str,
    open: char,
    close: char,
    from: usize,
) -> Result<(usize, usize), LogError> {
    let start = line
        .get(from..)
        .and_then(|rest| rest.find(open))
        .map(|i| from + i + open.len_utf8())
        .ok_or_else(|| LogError::malformed(format!("missing '{open}'")))?;
    let end = line[start..]
        .find(close)
        .map(|i| start + i)
        .ok_or_else(|| LogError::malformed(format!("missing '{close}' after '{open}'")))?;
    Ok((start, end))
}
