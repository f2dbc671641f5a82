use super::{describe, stream_or_path};
use crate::error::{common, ErrorCode, NeighbourerError, Result};
use crate::table::CellTable;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::debug;

/// Where the finished table is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    Stdout,
    File(PathBuf),
}

impl OutputSink {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdout => None,
            Self::File(path) => Some(path),
        }
    }

    pub fn describe(&self) -> String {
        describe(self.path(), "<stdout>")
    }
}

impl FromStr for OutputSink {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(stream_or_path(s).map_or(Self::Stdout, Self::File))
    }
}

/// Serialises an aggregated table as delimited text
///
/// Rows are emitted in ascending identifier order. Each source column is
/// followed by its neighbour-sum column.
#[derive(Debug, Clone)]
pub struct TableWriter {
    delimiter: u8,
    precision: Option<usize>,
}

impl Default for TableWriter {
    fn default() -> Self {
        Self {
            delimiter: b',',
            precision: None,
        }
    }
}

impl TableWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Fixed number of fractional digits; `None` keeps the shortest exact form
    pub fn with_precision(mut self, precision: Option<usize>) -> Self {
        self.precision = precision;
        self
    }

    /// Write the table to `out`, returning the number of data rows
    ///
    /// Fails before writing anything if any record lacks its neighbour sums.
    pub fn write<W: Write>(&self, table: &CellTable, out: W) -> Result<usize> {
        if !table.is_aggregated() {
            return Err(NeighbourerError::other(
                "Refusing to write a table whose neighbour sums are incomplete",
            ));
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(out);
        writer.write_record(table.schema().output_header())?;

        let mut rows = 0usize;
        let mut record: Vec<String> = Vec::with_capacity(1 + table.schema().width() * 2);
        for cell in table.sorted_ids() {
            let Some(entry) = table.get(cell) else {
                continue;
            };
            let sums = entry.neighbor_sums().unwrap_or_default();

            record.clear();
            record.push(cell.to_string());
            for (value, sum) in entry.values().iter().zip(sums) {
                record.push(self.format_value(*value));
                record.push(self.format_value(*sum));
            }
            writer.write_record(&record)?;
            rows += 1;
        }

        writer.flush()?;
        Ok(rows)
    }

    /// Write the table to a sink
    ///
    /// File output goes through a temporary file in the destination
    /// directory that is renamed into place only after the last row is
    /// flushed, so a failed run never leaves a truncated file behind.
    pub fn write_to(&self, table: &CellTable, sink: &OutputSink) -> Result<usize> {
        match sink {
            OutputSink::Stdout => {
                let stdout = io::stdout();
                let rows = self.write(table, stdout.lock())?;
                debug!("Wrote {} rows to {}", rows, sink.describe());
                Ok(rows)
            }
            OutputSink::File(path) => {
                let dir = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => PathBuf::from("."),
                };
                let mut staged = NamedTempFile::new_in(&dir).map_err(|e| {
                    common::io_failure(Some(&dir), "create temporary output file").with_source(e)
                })?;

                let rows = self.write(table, io::BufWriter::new(staged.as_file_mut()))?;
                staged.as_file().sync_all().map_err(|e| {
                    NeighbourerError::io_with_code(
                        ErrorCode::IO_WRITE_FAILED,
                        "Failed to flush output",
                        Some(path.clone()),
                    )
                    .with_source(e)
                })?;
                staged.persist(path).map_err(|e| {
                    NeighbourerError::io_with_code(
                        ErrorCode::IO_PERSIST_FAILED,
                        "Failed to move output into place",
                        Some(path.clone()),
                    )
                    .with_source(e.error)
                })?;

                debug!("Wrote {} rows to {}", rows, sink.describe());
                Ok(rows)
            }
        }
    }

    fn format_value(&self, value: f64) -> String {
        match self.precision {
            Some(digits) => format!("{:.*}", digits, value),
            None => value.to_string(),
        }
    }
}
