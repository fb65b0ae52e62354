use crate::core::{Cooccurrence, GenreCount};
use crate::errors::{Error, Result};
use clap::ValueEnum;
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated fields, one record per line
    #[default]
    Tsv,
    /// One JSON object per line
    Jsonl,
    /// A single pretty-printed JSON array
    Json,
    /// Aligned, colored table
    Terminal,
}

/// A terminal record of some job, with a fixed field order.
pub trait OutputRecord: Serialize {
    fn headers() -> &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

impl OutputRecord for Cooccurrence {
    fn headers() -> &'static [&'static str] {
        &["item", "partner", "count"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.item.clone(),
            self.partner.clone(),
            self.count.to_string(),
        ]
    }
}

impl OutputRecord for GenreCount {
    fn headers() -> &'static [&'static str] {
        &["year", "genre", "titles"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.year.clone(),
            self.genre.clone(),
            self.titles.to_string(),
        ]
    }
}

pub trait OutputWriter<R: OutputRecord> {
    fn write_records(&mut self, records: &[R]) -> Result<()>;
}

/// Escape a TSV field so that every record stays on one line with a fixed
/// number of columns. Backslash, tab, newline and carriage return become
/// `\\`, `\t`, `\n` and `\r`.
fn escape_tsv(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub struct TsvWriter<W: Write> {
    writer: W,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write, R: OutputRecord> OutputWriter<R> for TsvWriter<W> {
    fn write_records(&mut self, records: &[R]) -> Result<()> {
        for record in records {
            let fields: Vec<String> = record.fields().iter().map(|f| escape_tsv(f)).collect();
            writeln!(self.writer, "{}", fields.join("\t"))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

pub struct JsonLinesWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write, R: OutputRecord> OutputWriter<R> for JsonLinesWriter<W> {
    fn write_records(&mut self, records: &[R]) -> Result<()> {
        for record in records {
            serde_json::to_writer(&mut self.writer, record)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write, R: OutputRecord> OutputWriter<R> for JsonWriter<W> {
    fn write_records(&mut self, records: &[R]) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, records)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write, R: OutputRecord> OutputWriter<R> for TerminalWriter<W> {
    fn write_records(&mut self, records: &[R]) -> Result<()> {
        let headers = R::headers();
        let rows: Vec<Vec<String>> = records.iter().map(R::fields).collect();
        let widths = column_widths(headers, &rows);

        let header_line = pad_row(headers.iter().map(|h| h.to_uppercase()), &widths);
        writeln!(self.writer, "{}", header_line.bold())?;
        writeln!(
            self.writer,
            "{}",
            "-".repeat(header_line.chars().count()).dimmed()
        )?;

        for row in rows {
            writeln!(self.writer, "{}", pad_row(row.into_iter(), &widths))?;
        }

        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{} {}",
            records.len().to_string().cyan(),
            "records".dimmed()
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|field| field.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn pad_row(fields: impl Iterator<Item = String>, widths: &[usize]) -> String {
    fields
        .zip(widths)
        .map(|(field, width)| format!("{field:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn create_writer<R, W>(format: OutputFormat, writer: W) -> Box<dyn OutputWriter<R>>
where
    R: OutputRecord,
    W: Write + 'static,
{
    match format {
        OutputFormat::Tsv => Box::new(TsvWriter::new(writer)),
        OutputFormat::Jsonl => Box::new(JsonLinesWriter::new(writer)),
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    }
}

/// Open the output file, or stdout when no path is given.
pub fn create_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| Error::io_with_path("Failed to create output file", path, e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

pub fn write_records<R, W>(format: OutputFormat, writer: W, records: &[R]) -> Result<()>
where
    R: OutputRecord,
    W: Write + 'static,
{
    create_writer(format, writer).write_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    /// Writer that keeps its bytes reachable after being boxed.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn sample() -> Vec<Cooccurrence> {
        vec![
            Cooccurrence::new("chocolates", "candy corn", 1),
            Cooccurrence::new("eggs", "chocolates", 1),
        ]
    }

    #[test]
    fn test_tsv_output() {
        let buffer = SharedBuffer::default();
        write_records(OutputFormat::Tsv, buffer.clone(), &sample()).unwrap();
        assert_eq!(
            buffer.contents(),
            "chocolates\tcandy corn\t1\neggs\tchocolates\t1\n"
        );
    }

    #[test]
    fn test_tsv_output_escapes_tabs_in_items() {
        let buffer = SharedBuffer::default();
        let records = vec![Cooccurrence::new("gift\tcard", "C:\\bags", 2)];
        write_records(OutputFormat::Tsv, buffer.clone(), &records).unwrap();

        let contents = buffer.contents();
        assert_eq!(contents, "gift\\tcard\tC:\\\\bags\t2\n");
        assert_eq!(contents.trim_end().split('\t').count(), 3);
    }

    #[test]
    fn test_jsonl_output() {
        let buffer = SharedBuffer::default();
        write_records(OutputFormat::Jsonl, buffer.clone(), &sample()).unwrap();
        let lines: Vec<_> = buffer.contents().lines().map(String::from).collect();
        assert_eq!(
            lines[0],
            r#"{"item":"chocolates","partner":"candy corn","count":1}"#
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_json_output_round_trips() {
        let buffer = SharedBuffer::default();
        write_records(OutputFormat::Json, buffer.clone(), &sample()).unwrap();
        let parsed: Vec<Cooccurrence> = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_terminal_output_aligns_columns() {
        colored::control::set_override(false);
        let buffer = SharedBuffer::default();
        write_records(OutputFormat::Terminal, buffer.clone(), &sample()).unwrap();
        let contents = buffer.contents();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines[0], "ITEM        PARTNER     COUNT");
        assert_eq!(lines[2], "chocolates  candy corn  1");
        assert_eq!(lines[3], "eggs        chocolates  1");
        assert!(contents.contains("2 records"));
    }

    #[test]
    fn test_genre_count_fields() {
        let count = GenreCount {
            year: "1982".into(),
            genre: "Sci-Fi".into(),
            titles: 2,
        };
        assert_eq!(count.fields(), vec!["1982", "Sci-Fi", "2"]);
    }
}
