use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

use crate::table::CellId;

pub mod codes;
pub mod helpers;

pub use codes::{describe_error_code, ErrorCode};
pub use helpers::{common, ErrorExt};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The unified error type for the whole tool
#[derive(Error, Debug)]
pub enum NeighbourerError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Schema error: {message}")]
    Schema {
        code: u16,
        message: String,
        line: Option<u64>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Parse error: {message}")]
    Parse {
        code: u16,
        message: String,
        line: Option<u64>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Adjacency error: {message}")]
    Adjacency {
        code: u16,
        message: String,
        cell: Option<CellId>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] I/O error: {message}")]
    Io {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl NeighbourerError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a schema error with default code
    pub fn schema(message: impl Into<String>) -> Self {
        Self::schema_with_code(ErrorCode::SCHEMA_GENERIC, message, None)
    }

    /// Create a schema error with specific code and input line
    pub fn schema_with_code(code: u16, message: impl Into<String>, line: Option<u64>) -> Self {
        Self::Schema {
            code,
            message: message.into(),
            line,
            source: None,
        }
    }

    /// Create a parse error with default code
    pub fn parse(message: impl Into<String>) -> Self {
        Self::parse_with_code(ErrorCode::PARSE_GENERIC, message, None)
    }

    /// Create a parse error with specific code and input line
    pub fn parse_with_code(code: u16, message: impl Into<String>, line: Option<u64>) -> Self {
        Self::Parse {
            code,
            message: message.into(),
            line,
            source: None,
        }
    }

    /// Create an adjacency error for a cell
    pub fn adjacency(code: u16, message: impl Into<String>, cell: Option<CellId>) -> Self {
        Self::Adjacency {
            code,
            message: message.into(),
            cell,
            source: None,
        }
    }

    /// Create an I/O error with default code
    pub fn io(message: impl Into<String>) -> Self {
        Self::io_with_code(ErrorCode::IO_GENERIC, message, None)
    }

    /// Create an I/O error with specific code and path
    pub fn io_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Io {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::other_with_code(ErrorCode::OTHER_GENERIC, message)
    }

    /// Create an other error with specific code
    pub fn other_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Other {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Schema { source: src, .. }
            | Self::Parse { source: src, .. }
            | Self::Adjacency { source: src, .. }
            | Self::Io { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Schema { message, .. }
            | Self::Parse { message, .. }
            | Self::Adjacency { message, .. }
            | Self::Io { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Attach the 1-based input line a schema or parse error refers to
    pub fn with_line(mut self, line: u64) -> Self {
        match &mut self {
            Self::Schema { line: l, .. } | Self::Parse { line: l, .. } => *l = Some(line),
            _ => {}
        }
        self
    }

    /// Attach the path an I/O error refers to
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        if let Self::Io { path: p, .. } = &mut self {
            *p = Some(path.into());
        }
        self
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Schema { .. } => 3,
            Self::Parse { .. } => 4,
            Self::Adjacency { .. } => 5,
            Self::Io { .. } => 6,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Schema { code, .. }
            | Self::Parse { code, .. }
            | Self::Adjacency { code, .. }
            | Self::Io { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Input line the error refers to, if known
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::Schema { line, .. } | Self::Parse { line, .. } => *line,
            _ => None,
        }
    }

    /// Bare message without code prefix or category
    pub fn message(&self) -> &str {
        match self {
            Self::Config { message, .. }
            | Self::Schema { message, .. }
            | Self::Parse { message, .. }
            | Self::Adjacency { message, .. }
            | Self::Io { message, .. }
            | Self::Other { message, .. } => message,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Schema { message, line, .. } => match line {
                Some(l) => format!("Input structure error on line {}: {}", l, message),
                None => format!("Input structure error: {}", message),
            },
            Self::Parse { message, line, .. } => match line {
                Some(l) => format!("Could not parse line {}: {}", l, message),
                None => format!("Could not parse input: {}", message),
            },
            Self::Adjacency { message, cell, .. } => match cell {
                Some(c) => format!("Neighbour lookup for cell {} failed: {}", c, message),
                None => format!("Neighbour lookup failed: {}", message),
            },
            Self::Io { message, path, .. } => match path {
                Some(p) => format!("I/O error at {}: {}", p.display(), message),
                None => format!("I/O error: {}", message),
            },
            Self::Other { message, .. } => message.clone(),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(&format!("\n  caused by: {}", err));
            source = err.source();
        }
        out
    }

    /// Whether the run may continue past this error in lenient mode
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Adjacency { .. })
            || self.code() == ErrorCode::SCHEMA_COLUMN_COUNT
    }
}

/// Type alias for Results using NeighbourerError
pub type Result<T> = std::result::Result<T, NeighbourerError>;

impl From<std::io::Error> for NeighbourerError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let (code, message) = match err.kind() {
            ErrorKind::NotFound => (ErrorCode::IO_NOT_FOUND, "File or directory not found"),
            ErrorKind::PermissionDenied => (ErrorCode::IO_PERMISSION_DENIED, "Permission denied"),
            ErrorKind::UnexpectedEof => (ErrorCode::IO_READ_FAILED, "Unexpected end of input"),
            ErrorKind::BrokenPipe | ErrorKind::WriteZero => {
                (ErrorCode::IO_WRITE_FAILED, "Output stream closed")
            }
            _ => (ErrorCode::IO_GENERIC, "I/O operation failed"),
        };

        NeighbourerError::io_with_code(code, message, None).with_source(err)
    }
}

impl From<csv::Error> for NeighbourerError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        if err.is_io_error() {
            return NeighbourerError::io_with_code(ErrorCode::IO_CSV, "CSV stream failed", None)
                .with_source(err);
        }
        match err.kind() {
            csv::ErrorKind::Utf8 { .. } => {
                NeighbourerError::parse_with_code(ErrorCode::PARSE_GENERIC, "Invalid UTF-8", line)
                    .with_source(err)
            }
            _ => NeighbourerError::io_with_code(ErrorCode::IO_CSV, "CSV stream failed", None)
                .with_source(err),
        }
    }
}

impl From<toml::de::Error> for NeighbourerError {
    fn from(err: toml::de::Error) -> Self {
        NeighbourerError::config_with_code(ErrorCode::CONFIG_INVALID_TOML, "Invalid TOML syntax")
            .with_source(err)
    }
}

impl From<serde_json::Error> for NeighbourerError {
    fn from(err: serde_json::Error) -> Self {
        NeighbourerError::io_with_code(ErrorCode::IO_WRITE_FAILED, "Failed to serialize report", None)
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let err = NeighbourerError::config("bad mode");
        assert!(matches!(err, NeighbourerError::Config { .. }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.code(), ErrorCode::CONFIG_GENERIC);

        let err = NeighbourerError::schema("no header");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.code(), ErrorCode::SCHEMA_GENERIC);

        let err = NeighbourerError::parse("not a number");
        assert_eq!(err.exit_code(), 4);

        let err = NeighbourerError::adjacency(ErrorCode::ADJACENCY_INVALID_CELL, "bad", None);
        assert_eq!(err.exit_code(), 5);

        let err = NeighbourerError::io("disk gone");
        assert_eq!(err.exit_code(), 6);

        let err = NeighbourerError::other("oops");
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.code(), ErrorCode::OTHER_GENERIC);
    }

    #[test]
    fn test_display_carries_code() {
        let err = NeighbourerError::parse_with_code(ErrorCode::PARSE_INVALID_VALUE, "x", Some(3));
        assert_eq!(err.to_string(), "[E3002] Parse error: x");
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.user_message(), "Could not parse line 3: x");
    }

    #[test]
    fn test_with_context_and_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err = NeighbourerError::io("Cannot open input")
            .with_source(io_err)
            .with_context("missing.csv");

        assert!(err.to_string().contains("Cannot open input: missing.csv"));
        assert!(err.developer_message().contains("caused by: missing.csv"));
    }

    #[test]
    fn test_with_line_ignored_for_io() {
        let err = NeighbourerError::io("x").with_line(4);
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let err: NeighbourerError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert_eq!(err.code(), ErrorCode::IO_PERMISSION_DENIED);
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn test_recoverable() {
        assert!(NeighbourerError::parse("x").is_recoverable());
        assert!(NeighbourerError::schema_with_code(ErrorCode::SCHEMA_COLUMN_COUNT, "x", None)
            .is_recoverable());
        assert!(!NeighbourerError::schema("x").is_recoverable());
        assert!(!NeighbourerError::io("x").is_recoverable());
    }
}
