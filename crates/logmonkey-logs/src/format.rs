use std::io::{self, Write};

use logmonkey_types::{ColumnWidths, CsvQuoting, LogEntry, OutputMode, display_width};

/// Renders entries in one output mode
#[derive(Clone, Debug)]
pub struct Formatter {
    mode: OutputMode,
    widths: ColumnWidths,
    quoting: CsvQuoting,
}

impl Formatter {
    /// `widths` should be the final widths of the run; they are only used in
    /// aligned mode.
    pub fn new(mode: OutputMode, widths: ColumnWidths) -> Self {
        Self {
            mode,
            widths,
            quoting: CsvQuoting::default(),
        }
    }

    pub fn with_csv_quoting(mut self, quoting: CsvQuoting) -> Self {
        self.quoting = quoting;
        self
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Render one entry without a line terminator. Raw lines that were not
    /// valid UTF-8 are shown lossily; [`Formatter::write_all`] keeps their bytes.
    pub fn render(&self, entry: &LogEntry) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_all(&mut buf, [entry])?;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn render_aligned(&self, entry: &LogEntry) -> String {
        format!(
            "({})[{}] {{{}}} {}: {}",
            entry.format(),
            entry.timestamp(),
            pad(entry.level(), self.widths.level),
            pad(entry.tag(), self.widths.tag),
            entry.message()
        )
    }

    /// Write every entry followed by `\n`. Returns the number of records.
    pub fn write_all<'a, W, I>(&self, out: &mut W, entries: I) -> io::Result<usize>
    where
        W: Write,
        I: IntoIterator<Item = &'a LogEntry>,
    {
        if self.mode == OutputMode::Csv && self.quoting == CsvQuoting::Rfc4180 {
            return write_csv_rfc4180(out, entries);
        }

        let mut count = 0;
        for entry in entries {
            match self.mode {
                OutputMode::Raw => {
                    out.write_all(entry.raw_bytes().trim_ascii_end())?;
                    out.write_all(b"\n")?;
                }
                OutputMode::Aligned => writeln!(out, "{}", self.render_aligned(entry))?,
                OutputMode::Csv => writeln!(out, "{}", render_csv_comma_only(entry))?,
            }
            count += 1;
        }
        Ok(count)
    }
}

/// Left-justify `text` to `width` display columns
fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(fill))
}

fn render_csv_comma_only(entry: &LogEntry) -> String {
    [entry.timestamp(), entry.level(), entry.tag(), entry.message()]
        .iter()
        .map(|field| {
            if field.contains(',') {
                format!("\"{field}\"")
            } else {
                field.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn write_csv_rfc4180<'a, W, I>(out: &mut W, entries: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    let mut count = 0;
    for entry in entries {
        writer.write_record([entry.timestamp(), entry.level(), entry.tag(), entry.message()])?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(formatter: &Formatter, entry: &LogEntry) -> String {
        formatter.render(entry).unwrap()
    }

    fn entry(level: &str, tag: &str, message: &str) -> LogEntry {
        let raw = format!("(lmf1)[2020-01-01 00:00:00] {{{level}}} {tag}: {message}  ");
        LogEntry::new(raw, "lmf1", "2020-01-01 00:00:00", level, tag, message)
    }

    #[test]
    fn test_raw_strips_trailing_whitespace() {
        let formatter = Formatter::new(OutputMode::Raw, ColumnWidths::new());
        assert_eq!(
            rendered(&formatter, &entry("DEBUG", "net", "connected")),
            "(lmf1)[2020-01-01 00:00:00] {DEBUG} net: connected"
        );
    }

    #[test]
    fn test_aligned_pads_level_and_tag() {
        let widths = ColumnWidths { level: 5, tag: 7 };
        let formatter = Formatter::new(OutputMode::Aligned, widths);
        assert_eq!(
            rendered(&formatter, &entry("I", "io", "ok")),
            "(lmf1)[2020-01-01 00:00:00] {I    } io     : ok"
        );
        assert_eq!(
            rendered(&formatter, &entry("DEBUG", "network", "up")),
            "(lmf1)[2020-01-01 00:00:00] {DEBUG} network: up"
        );
    }

    #[test]
    fn test_aligned_pads_wide_chars_by_display_width() {
        let widths = ColumnWidths { level: 1, tag: 6 };
        let formatter = Formatter::new(OutputMode::Aligned, widths);
        assert_eq!(
            rendered(&formatter, &entry("I", "网络", "ok")),
            "(lmf1)[2020-01-01 00:00:00] {I} 网络  : ok"
        );
    }

    #[test]
    fn test_csv_quotes_only_fields_with_commas() {
        let formatter = Formatter::new(OutputMode::Csv, ColumnWidths::new());
        assert_eq!(
            rendered(&formatter, &entry("D", "a,b", "hello")),
            "2020-01-01 00:00:00,D,\"a,b\",hello"
        );
        assert_eq!(
            rendered(&formatter, &entry("DEBUG", "net", "connected")),
            "2020-01-01 00:00:00,DEBUG,net,connected"
        );
    }

    #[test]
    fn test_csv_comma_only_leaves_quotes_alone() {
        let formatter = Formatter::new(OutputMode::Csv, ColumnWidths::new());
        assert_eq!(
            rendered(&formatter, &entry("W", "io", "said \"hi\", then left")),
            "2020-01-01 00:00:00,W,io,\"said \"hi\", then left\""
        );
    }

    #[test]
    fn test_csv_rfc4180_escapes_quotes() {
        let formatter = Formatter::new(OutputMode::Csv, ColumnWidths::new())
            .with_csv_quoting(CsvQuoting::Rfc4180);
        assert_eq!(
            rendered(&formatter, &entry("W", "io", "said \"hi\"")),
            "2020-01-01 00:00:00,W,io,\"said \"\"hi\"\"\""
        );
        assert_eq!(
            rendered(&formatter, &entry("D", "a,b", "hello")),
            "2020-01-01 00:00:00,D,\"a,b\",hello"
        );
    }

    #[test]
    fn test_write_all_terminates_every_record() {
        let formatter = Formatter::new(OutputMode::Csv, ColumnWidths::new());
        let entries = [entry("D", "net", "one"), entry("I", "io", "two")];

        let mut out = Vec::new();
        let count = formatter.write_all(&mut out, &entries).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2020-01-01 00:00:00,D,net,one\n2020-01-01 00:00:00,I,io,two\n"
        );
    }

    #[test]
    fn test_raw_writes_undecodable_bytes_unchanged() {
        let bytes = b"(lmf1)[2020-01-01 00:00:00] {I} net: caf\xe9";
        let raw = String::from_utf8_lossy(bytes).into_owned();
        let entry = LogEntry::new(raw, "lmf1", "2020-01-01 00:00:00", "I", "net", "caf\u{fffd}")
            .with_raw_bytes(bytes.to_vec());
        let formatter = Formatter::new(OutputMode::Raw, ColumnWidths::new());

        let mut out = Vec::new();
        formatter.write_all(&mut out, [&entry]).unwrap();

        let mut expected = bytes.to_vec();
        expected.push(b'\n');
        assert_eq!(out, expected);
    }

    #[test]
    fn test_rfc4180_writes_every_record() {
        let formatter = Formatter::new(OutputMode::Csv, ColumnWidths::new())
            .with_csv_quoting(CsvQuoting::Rfc4180);
        let entries = [entry("D", "net", "one"), entry("I", "a,b", "say \"two\"")];

        let mut out = Vec::new();
        assert_eq!(formatter.write_all(&mut out, &entries).unwrap(), 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2020-01-01 00:00:00,D,net,one\n2020-01-01 00:00:00,I,\"a,b\",\"say \"\"two\"\"\"\n"
        );
    }

    #[test]
    fn test_write_failure_is_reported() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let entries = [entry("D", "net", "one")];
        for quoting in [CsvQuoting::CommaOnly, CsvQuoting::Rfc4180] {
            let formatter =
                Formatter::new(OutputMode::Csv, ColumnWidths::new()).with_csv_quoting(quoting);
            assert!(formatter.write_all(&mut Broken, &entries).is_err(), "{quoting}");
        }
    }

    #[test]
    fn test_write_all_with_no_entries_writes_nothing() {
        let formatter = Formatter::new(OutputMode::Raw, ColumnWidths::new());
        let mut out = Vec::new();
        assert_eq!(formatter.write_all(&mut out, &[]).unwrap(), 0);
        assert!(out.is_empty());
    }
}
