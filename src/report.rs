//! Non-fatal diagnostics collected during a run
//!
//! Loading and aggregation never abort on a single bad row or cell in
//! lenient mode. Instead they record a [`Warning`], and the run ends with a
//! [`RunReport`] that can be logged or written out as JSON.

use crate::error::{ErrorCode, ErrorExt, NeighbourerError, Result};
use crate::table::CellId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MalformedRow,
    InvalidCellId,
    InvalidValue,
    DuplicateCell,
    AdjacencyFailure,
}

impl WarningKind {
    fn from_code(code: u16) -> Self {
        match code {
            ErrorCode::PARSE_INVALID_CELL_ID => Self::InvalidCellId,
            c if (3000..4000).contains(&c) => Self::InvalidValue,
            c if (4000..5000).contains(&c) => Self::AdjacencyFailure,
            _ => Self::MalformedRow,
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MalformedRow => "malformed row",
            Self::InvalidCellId => "invalid cell id",
            Self::InvalidValue => "invalid value",
            Self::DuplicateCell => "duplicate cell",
            Self::AdjacencyFailure => "adjacency failure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<CellId>,
    pub message: String,
}

impl Warning {
    /// Downgrade a recoverable error to a warning
    pub fn from_error(err: &NeighbourerError) -> Self {
        let cell = match err {
            NeighbourerError::Adjacency { cell, .. } => *cell,
            _ => None,
        };
        Self {
            kind: WarningKind::from_code(err.code()),
            line: err.line(),
            cell,
            message: err.message().to_string(),
        }
    }

    pub fn duplicate(cell: CellId, line: u64, previous_line: u64) -> Self {
        Self {
            kind: WarningKind::DuplicateCell,
            line: Some(line),
            cell: Some(cell),
            message: format!(
                "Cell {} already defined on line {}; keeping the later row",
                cell, previous_line
            ),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        if let Some(cell) = self.cell {
            write!(f, " [cell {}]", cell)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Summary of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub cells: usize,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub isolated_cells: usize,
    pub counts: BTreeMap<WarningKind, usize>,
    pub warnings: Vec<Warning>,
}

impl RunReport {
    pub fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            *self.counts.entry(warning.kind).or_insert(0) += 1;
            self.warnings.push(warning);
        }
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .to_io_error("Failed to write run report")
            .map_err(|e| e.with_path(path))?;
        debug!("Wrote run report to {}", path.display());
        Ok(())
    }
}
