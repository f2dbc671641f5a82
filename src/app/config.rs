//! Application configuration
//!
//! Process-wide settings that exist before any run configuration is loaded.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Working directory, used to find `neighbourer.toml`
    pub working_dir: PathBuf,
}

impl AppConfig {
    /// Create a new application configuration
    pub fn new(verbose: u8) -> Result<Self> {
        let working_dir =
            std::env::current_dir().context("Failed to get current directory")?;

        Ok(Self {
            verbose,
            working_dir,
        })
    }

    /// Get the log filter based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            2 => "trace",
            _ => "trace,rayon_core=debug", // -vvv shows everything including dependencies
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            working_dir: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_by_verbosity() {
        let levels: Vec<&str> = (0..4)
            .map(|verbose| AppConfig {
                verbose,
                ..Default::default()
            }
            .log_level())
            .collect();
        assert_eq!(levels[0], "info");
        assert_eq!(levels[1], "debug");
        assert_eq!(levels[2], "trace");
        assert!(levels[3].starts_with("trace"));
    }
}
