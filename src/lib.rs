//! # Neighbourer
//!
//! Appends, for every attribute of a table of H3 cell statistics, the sum of
//! that attribute over each cell's immediate grid neighbours.
//!
//! ## Usage
//!
//! ```bash
//! neighbourer cells.csv -o cells_with_neighbours.csv [--strict] [-j 8]
//! ```
//!
//! ## Modules
//!
//! - `table` - Cell identifiers, schema, and the in-memory cell table
//! - `grid` - Adjacency sources (H3 via `h3o`, and a fixed map for tests)
//! - `aggregate` - Snapshot-then-store neighbour summation, optionally parallel
//! - `io` - Delimited text input and atomic output
//! - `report` - Warnings collected during a run and the JSON run report
//! - `config` - Layered run configuration (TOML file, environment, flags)
//! - `cli` - Argument parsing and the load, aggregate, write pipeline
//! - `app` - Logging setup and fatal error handling for the binary
//! - `error` - Error types with codes and exit statuses
pub mod aggregate;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod grid;
pub mod io;
pub mod report;
pub mod table;

pub use aggregate::{AggregationOptions, AggregationOutcome, NeighborAggregator};
pub use error::{NeighbourerError, Result};
pub use grid::{Adjacency, FixedAdjacency, H3Grid};
pub use table::{CellId, CellTable, Schema};
