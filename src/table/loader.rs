//! Builds a [`CellTable`] from already-tokenised rows
//!
//! The loader performs no I/O: it consumes any iterator of [`RawRow`]s
//! where the first row is the header. Row-level problems are handled
//! according to [`ErrorMode`]; header problems are always fatal.

use super::{CellId, CellTable, Schema};
use crate::error::{common, NeighbourerError, Result};
use crate::report::Warning;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// Policy for rows that fail to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Skip the row, record a warning and keep going
    #[default]
    Lenient,
    /// Abort the run on the first bad row
    Strict,
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => f.write_str("lenient"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for ErrorMode {
    type Err = NeighbourerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(common::invalid_config_value("mode", other)),
        }
    }
}

/// One tokenised input row and the 1-based line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    pub fn from_fields<I, S>(line: u64, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(line, fields.into_iter().map(Into::into).collect())
    }
}

/// Result of loading: the table plus everything that was skipped
#[derive(Debug)]
pub struct LoadOutcome {
    pub table: CellTable,
    pub warnings: Vec<Warning>,
    pub rows_read: usize,
    pub rows_skipped: usize,
}

pub struct TableLoader {
    mode: ErrorMode,
}

impl TableLoader {
    pub fn new(mode: ErrorMode) -> Self {
        Self { mode }
    }

    /// Load a table from rows, the first of which is the header
    ///
    /// Errors yielded by the row iterator itself are fatal unless they are
    /// recoverable and the loader is lenient. When a cell appears more than
    /// once, the last row wins and a warning names the overwritten line.
    pub fn load<I>(&self, rows: I) -> Result<LoadOutcome>
    where
        I: IntoIterator<Item = Result<RawRow>>,
    {
        let mut rows = rows.into_iter();
        let header = rows.next().ok_or_else(common::missing_header)??;
        let schema = parse_header(&header)?;
        debug!(
            "Header declares {} attribute columns: {:?}",
            schema.width(),
            schema.attributes()
        );

        let mut table = CellTable::new(schema);
        let mut warnings = Vec::new();
        let mut seen_on: HashMap<CellId, u64> = HashMap::new();
        let mut rows_read = 0usize;
        let mut rows_skipped = 0usize;

        for row in rows {
            rows_read += 1;
            let parsed = row.and_then(|row| {
                parse_row(table.schema(), &row).map(|(cell, values)| (row.line, cell, values))
            });

            let (line, cell, values) = match parsed {
                Ok(parsed) => parsed,
                Err(err) if self.mode == ErrorMode::Lenient && err.is_recoverable() => {
                    warn!("Skipping row: {}", err.user_message());
                    warnings.push(Warning::from_error(&err));
                    rows_skipped += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            trace!("Loaded cell {} from line {}", cell, line);
            table.insert(cell, values)?;
            if let Some(previous_line) = seen_on.insert(cell, line) {
                let warning = Warning::duplicate(cell, line, previous_line);
                warn!("{}", warning);
                warnings.push(warning);
            }
        }

        debug!(
            "Loaded {} cells from {} data rows ({} skipped)",
            table.len(),
            rows_read,
            rows_skipped
        );

        Ok(LoadOutcome {
            table,
            warnings,
            rows_read,
            rows_skipped,
        })
    }
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new(ErrorMode::default())
    }
}

fn parse_header(header: &RawRow) -> Result<Schema> {
    let mut fields = header.fields.iter().map(|f| f.trim());
    let id_column = match fields.next() {
        Some(name) if !name.is_empty() || header.fields.len() > 1 => name.to_string(),
        _ => return Err(common::missing_header()),
    };
    Schema::new(id_column, fields.map(str::to_string).collect())
        .map_err(|e| e.with_line(header.line))
}

fn parse_row(schema: &Schema, row: &RawRow) -> Result<(CellId, Vec<f64>)> {
    let expected = schema.width() + 1;
    if row.fields.len() != expected {
        return Err(common::malformed_row(row.line, expected, row.fields.len()));
    }

    let id_token = row.fields[0].trim();
    let cell: CellId = id_token
        .parse()
        .map_err(|e| common::invalid_cell_id(row.line, id_token).with_source(e))?;

    let values = schema
        .attributes()
        .iter()
        .zip(&row.fields[1..])
        .map(|(column, token)| parse_value(row.line, column, token.trim()))
        .collect::<Result<Vec<f64>>>()?;

    Ok((cell, values))
}

fn parse_value(line: u64, column: &str, token: &str) -> Result<f64> {
    let value: f64 = token
        .parse()
        .map_err(|e| common::invalid_value(line, column, token).with_source(e))?;
    if !value.is_finite() {
        return Err(common::non_finite_value(line, column, token));
    }
    Ok(value)
}
