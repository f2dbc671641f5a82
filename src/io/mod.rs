//! Tabular input and output
//!
//! Rows come in through [`reader`] as [`RawRow`](crate::table::RawRow)s and
//! the finished table goes out through [`writer`]. Both ends may be a file
//! or a standard stream; `-` selects the stream.

pub mod reader;
pub mod writer;

pub use reader::{csv_rows, InputSource};
pub use writer::{OutputSink, TableWriter};

use std::path::{Path, PathBuf};

/// Treat `-` as the standard stream, anything else as a path
pub(crate) fn stream_or_path(value: &str) -> Option<PathBuf> {
    if value == "-" {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

pub(crate) fn describe(path: Option<&Path>, stream: &str) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| stream.to_string())
}
