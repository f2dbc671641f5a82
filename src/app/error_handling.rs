//! Error handling utilities
//!
//! This module provides centralized error handling for the application.

use crate::error::{describe_error_code, NeighbourerError};
use tracing::error;

/// Exit code for an error that reached `main`
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<NeighbourerError>()
        .map(NeighbourerError::exit_code)
        .unwrap_or(1)
}

/// Handle fatal errors and exit with appropriate status code
///
/// This function processes errors and displays them according to their type:
/// - For `NeighbourerError`: Shows user message always, developer message in verbose mode
/// - For other errors: Shows error message and the anyhow chain in verbose mode
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    if let Some(err) = error.downcast_ref::<NeighbourerError>() {
        eprintln!("Error: {}", err.user_message());

        if verbose >= 1 {
            eprintln!("{}", code_line(err));
            eprintln!("\nContext Chain:\n{}", err.developer_message());
        }
    } else {
        eprintln!("Error: {error}");

        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }
    }

    std::process::exit(exit_code_for(&error))
}

fn code_line(err: &NeighbourerError) -> String {
    format!("Code E{:04}: {}", err.code(), describe_error_code(err.code()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_for_known_errors() {
        let err = anyhow::Error::new(NeighbourerError::schema("no header"));
        assert_eq!(exit_code_for(&err), 3);

        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_code_line_describes_code() {
        let err = crate::error::common::malformed_row(4, 3, 2);
        assert_eq!(
            code_line(&err),
            "Code E2004: Row has the wrong number of columns"
        );
    }
}
