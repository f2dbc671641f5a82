use super::{ErrorCode, NeighbourerError};
use crate::table::CellId;
use std::path::Path;

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    fn to_config_error(self, message: impl Into<String>) -> Result<T, NeighbourerError>;
    fn to_io_error(self, message: impl Into<String>) -> Result<T, NeighbourerError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_config_error(self, message: impl Into<String>) -> Result<T, NeighbourerError> {
        self.map_err(|e| NeighbourerError::config(message).with_source(e))
    }

    fn to_io_error(self, message: impl Into<String>) -> Result<T, NeighbourerError> {
        self.map_err(|e| NeighbourerError::io(message).with_source(e))
    }
}

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    /// Create a not found error for a configuration file
    pub fn config_not_found(path: impl AsRef<Path>) -> NeighbourerError {
        NeighbourerError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
    }

    /// Create an invalid configuration value error
    pub fn invalid_config_value(key: &str, value: impl std::fmt::Display) -> NeighbourerError {
        NeighbourerError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("Invalid value '{}' for '{}'", value, key),
        )
    }

    /// Create an error for input that lacks a header row
    pub fn missing_header() -> NeighbourerError {
        NeighbourerError::schema_with_code(
            ErrorCode::SCHEMA_MISSING_HEADER,
            "Input is empty; expected a header row",
            Some(1),
        )
    }

    /// Create a column-count mismatch error for a data row
    pub fn malformed_row(line: u64, expected: usize, found: usize) -> NeighbourerError {
        NeighbourerError::schema_with_code(
            ErrorCode::SCHEMA_COLUMN_COUNT,
            format!("Expected {} columns but found {}", expected, found),
            Some(line),
        )
    }

    /// Create an error for a cell identifier that is not hexadecimal
    pub fn invalid_cell_id(line: u64, token: &str) -> NeighbourerError {
        NeighbourerError::parse_with_code(
            ErrorCode::PARSE_INVALID_CELL_ID,
            format!("'{}' is not a hexadecimal cell identifier", token),
            Some(line),
        )
    }

    /// Create an error for an attribute value that is not a finite number
    pub fn invalid_value(line: u64, column: &str, token: &str) -> NeighbourerError {
        NeighbourerError::parse_with_code(
            ErrorCode::PARSE_INVALID_VALUE,
            format!("'{}' in column '{}' is not a number", token, column),
            Some(line),
        )
    }

    /// Create an error for NaN or infinite attribute values
    pub fn non_finite_value(line: u64, column: &str, token: &str) -> NeighbourerError {
        NeighbourerError::parse_with_code(
            ErrorCode::PARSE_NON_FINITE_VALUE,
            format!("'{}' in column '{}' is not finite", token, column),
            Some(line),
        )
    }

    /// Create an error for a grid identifier the grid system rejects
    pub fn invalid_grid_cell(cell: CellId, reason: impl std::fmt::Display) -> NeighbourerError {
        NeighbourerError::adjacency(
            ErrorCode::ADJACENCY_INVALID_CELL,
            format!("{} is not a valid grid cell: {}", cell, reason),
            Some(cell),
        )
    }

    /// Create an error for a neighbour sum that overflowed
    pub fn non_finite_sum(cell: CellId, attribute: &str, sum: f64) -> NeighbourerError {
        NeighbourerError::other_with_code(
            ErrorCode::OTHER_NON_FINITE_SUM,
            format!(
                "Neighbour sum of '{}' for cell {} is {}; input values are too large to add",
                attribute, cell, sum
            ),
        )
    }

    /// Create an I/O failure error for a path
    pub fn io_failure(path: Option<&Path>, operation: &str) -> NeighbourerError {
        NeighbourerError::io_with_code(
            ErrorCode::IO_GENERIC,
            format!("Failed to {}", operation),
            path.map(Path::to_path_buf),
        )
    }
}
