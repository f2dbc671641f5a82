//! In-memory table of per-cell statistics
//!
//! A [`CellTable`] maps hexagonal cell identifiers to a [`CellRecord`] of
//! numeric attribute values. The attribute names live once in the table's
//! [`Schema`]; every record stores its values positionally in schema order.
//!
//! Records carry two groups of values:
//! - source values, read from the input and never changed afterwards
//! - neighbour sums, written exactly once by the aggregator

pub mod loader;

pub use loader::{ErrorMode, LoadOutcome, RawRow, TableLoader};

use crate::error::{ErrorCode, NeighbourerError, Result};
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Suffix appended to a source attribute name to form its derived column
pub const NEIGHBOR_SUM_SUFFIX: &str = "_neighbor_sum";

/// Opaque 64-bit identifier of a grid cell, rendered as lowercase hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

impl CellId {
    /// The null index some grid systems use to mark a missing neighbour
    pub const NULL: CellId = CellId(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl From<u64> for CellId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<CellId> for u64 {
    fn from(id: CellId) -> Self {
        id.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::LowerHex for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error returned when a token is not a hexadecimal cell identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cell identifier '{token}'")]
pub struct ParseCellIdError {
    token: String,
}

impl FromStr for CellId {
    type Err = ParseCellIdError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        // from_str_radix accepts a leading sign, which is never part of an identifier
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseCellIdError {
                token: s.to_string(),
            });
        }

        u64::from_str_radix(digits, 16)
            .map(CellId)
            .map_err(|_| ParseCellIdError {
                token: s.to_string(),
            })
    }
}

/// Column layout shared by every record of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    id_column: String,
    attributes: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema from the identifier column name and the source attributes
    ///
    /// Fails when there are no attributes, when a name repeats, or when a
    /// source name equals the derived name of another source attribute.
    pub fn new(id_column: impl Into<String>, attributes: Vec<String>) -> Result<Self> {
        if attributes.is_empty() {
            return Err(NeighbourerError::schema_with_code(
                ErrorCode::SCHEMA_NO_ATTRIBUTES,
                "Header declares no attribute columns",
                Some(1),
            ));
        }

        let mut positions = HashMap::with_capacity(attributes.len());
        for (idx, name) in attributes.iter().enumerate() {
            if positions.insert(name.clone(), idx).is_some() {
                return Err(NeighbourerError::schema_with_code(
                    ErrorCode::SCHEMA_DUPLICATE_COLUMN,
                    format!("Column '{}' appears more than once", name),
                    Some(1),
                ));
            }
        }

        let derived: HashSet<String> = attributes.iter().map(|a| derived_name(a)).collect();
        if let Some(clash) = attributes.iter().find(|a| derived.contains(*a)) {
            return Err(NeighbourerError::schema_with_code(
                ErrorCode::SCHEMA_DERIVED_COLLISION,
                format!("Column '{}' collides with a derived column", clash),
                Some(1),
            ));
        }

        Ok(Self {
            id_column: id_column.into(),
            attributes,
            positions,
        })
    }

    /// Name of the identifier column as given in the input header
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Number of source attributes
    pub fn width(&self) -> usize {
        self.attributes.len()
    }

    pub fn position(&self, attribute: &str) -> Option<usize> {
        self.positions.get(attribute).copied()
    }

    /// Output header: identifier, then each source column followed by its derived column
    pub fn output_header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(1 + self.attributes.len() * 2);
        header.push(self.id_column.clone());
        for attribute in &self.attributes {
            header.push(attribute.clone());
            header.push(derived_name(attribute));
        }
        header
    }
}

/// Derived column name for a source attribute
pub fn derived_name(attribute: &str) -> String {
    format!("{}{}", attribute, NEIGHBOR_SUM_SUFFIX)
}

/// Values of one cell, positionally aligned with the table's schema
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    values: Box<[f64]>,
    neighbor_sums: Option<Box<[f64]>>,
}

impl CellRecord {
    fn new(values: Vec<f64>) -> Self {
        Self {
            values: values.into_boxed_slice(),
            neighbor_sums: None,
        }
    }

    /// Source attribute values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Derived neighbour sums, present once aggregation has stored them
    pub fn neighbor_sums(&self) -> Option<&[f64]> {
        self.neighbor_sums.as_deref()
    }

    pub fn is_aggregated(&self) -> bool {
        self.neighbor_sums.is_some()
    }
}

/// Mapping from cell identifier to record, with a uniform schema
#[derive(Debug, Clone)]
pub struct CellTable {
    schema: Schema,
    cells: HashMap<CellId, CellRecord>,
}

impl CellTable {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            cells: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.contains_key(&cell)
    }

    pub fn get(&self, cell: CellId) -> Option<&CellRecord> {
        self.cells.get(&cell)
    }

    /// Insert or replace the source values of a cell
    ///
    /// Replacing a cell discards its previous record entirely, derived
    /// values included. Returns the replaced record, if any.
    pub fn insert(&mut self, cell: CellId, values: Vec<f64>) -> Result<Option<CellRecord>> {
        if values.len() != self.schema.width() {
            return Err(NeighbourerError::schema_with_code(
                ErrorCode::SCHEMA_COLUMN_COUNT,
                format!(
                    "Cell {} has {} values but the schema has {} attributes",
                    cell,
                    values.len(),
                    self.schema.width()
                ),
                None,
            ));
        }
        Ok(self.cells.insert(cell, CellRecord::new(values)))
    }

    /// Source value of `attribute` for `cell`
    pub fn value(&self, cell: CellId, attribute: &str) -> Option<f64> {
        let idx = self.schema.position(attribute)?;
        self.cells.get(&cell).map(|r| r.values[idx])
    }

    /// Neighbour sum of `attribute` for `cell`, once aggregated
    pub fn neighbor_sum(&self, cell: CellId, attribute: &str) -> Option<f64> {
        let idx = self.schema.position(attribute)?;
        self.cells
            .get(&cell)
            .and_then(|r| r.neighbor_sums())
            .map(|sums| sums[idx])
    }

    /// Identifiers in ascending order
    pub fn sorted_ids(&self) -> Vec<CellId> {
        let mut ids: Vec<CellId> = self.cells.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// True when every record carries its neighbour sums
    pub fn is_aggregated(&self) -> bool {
        self.cells.values().all(CellRecord::is_aggregated)
    }

    /// Store the derived sums for one cell
    ///
    /// Each cell's slot is written once; the key set is never changed here.
    pub(crate) fn store_neighbor_sums(&mut self, cell: CellId, sums: Vec<f64>) -> Result<()> {
        let width = self.schema.width();
        let record = self.cells.get_mut(&cell).ok_or_else(|| {
            NeighbourerError::other(format!("Cell {} is not part of the table", cell))
        })?;
        if sums.len() != width {
            return Err(NeighbourerError::other(format!(
                "Cell {} received {} neighbour sums, expected {}",
                cell,
                sums.len(),
                width
            )));
        }
        record.neighbor_sums = Some(sums.into_boxed_slice());
        Ok(())
    }
}
