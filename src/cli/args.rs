//! CLI argument structures
//!
//! This module defines the command-line interface of Neighbourer and how
//! flags override the file and environment configuration.

use crate::config::{parse_delimiter, NeighbourerConfig};
use crate::table::ErrorMode;
use clap::Parser;
use std::path::PathBuf;

/// Append per-attribute neighbour sums to a table of H3 cell statistics
#[derive(Parser, Debug)]
#[command(name = "neighbourer")]
#[command(
    about = "neighbourer - Sum every attribute over each H3 cell's immediate neighbours",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Input CSV whose first column holds hexadecimal cell ids (`-` for stdin)
    #[arg(default_value = "-")]
    pub input: String,

    /// Output CSV (`-` for stdout)
    #[arg(short, long, default_value = "-")]
    pub output: String,

    /// Abort on the first row that fails to parse
    #[arg(long, conflicts_with = "lenient")]
    pub strict: bool,

    /// Skip rows that fail to parse and report them as warnings
    #[arg(long)]
    pub lenient: bool,

    /// Number of aggregation threads (0 = all cores, 1 = sequential)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Path to configuration file (defaults to ./neighbourer.toml if present)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write a JSON report of all warnings to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Fixed number of fractional digits in output values
    #[arg(long, value_name = "DIGITS")]
    pub precision: Option<usize>,

    /// Field delimiter for input and output (`\t` or `tab` for tabs)
    #[arg(short = 'd', long, value_parser = parse_delimiter_arg)]
    pub delimiter: Option<char>,

    /// Show a progress bar while aggregating
    #[arg(long)]
    pub progress: bool,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    /// Apply command-line flags on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut NeighbourerConfig) {
        if self.strict {
            config.mode = ErrorMode::Strict;
        } else if self.lenient {
            config.mode = ErrorMode::Lenient;
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(report) = &self.report {
            config.report = Some(report.clone());
        }
        if self.precision.is_some() {
            config.precision = self.precision;
        }
        if self.progress {
            config.progress = true;
        }
    }
}

fn parse_delimiter_arg(value: &str) -> Result<char, String> {
    parse_delimiter(value).map_err(|e| e.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("neighbourer").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_to_standard_streams() {
        let cli = parse(&[]);
        assert_eq!(cli.input, "-");
        assert_eq!(cli.output, "-");
        assert!(!cli.strict);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_overrides_win_over_config() {
        let cli = parse(&[
            "in.csv", "-o", "out.csv", "--strict", "-j", "4", "-d", "tab", "--precision", "2",
            "-vv",
        ]);
        let mut config = NeighbourerConfig {
            threads: Some(1),
            ..Default::default()
        };
        cli.apply_overrides(&mut config);

        assert_eq!(cli.input, "in.csv");
        assert_eq!(cli.verbose, 2);
        assert_eq!(config.mode, ErrorMode::Strict);
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.delimiter, '\t');
        assert_eq!(config.precision, Some(2));
    }

    #[test]
    fn test_lenient_flag_overrides_strict_config() {
        let cli = parse(&["--lenient"]);
        let mut config = NeighbourerConfig {
            mode: ErrorMode::Strict,
            ..Default::default()
        };
        cli.apply_overrides(&mut config);
        assert_eq!(config.mode, ErrorMode::Lenient);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let cli = parse(&[]);
        let mut config = NeighbourerConfig {
            mode: ErrorMode::Strict,
            precision: Some(3),
            ..Default::default()
        };
        cli.apply_overrides(&mut config);
        assert_eq!(config.mode, ErrorMode::Strict);
        assert_eq!(config.precision, Some(3));
    }

    #[test]
    fn test_conflicting_modes_rejected() {
        let result = Cli::try_parse_from(["neighbourer", "--strict", "--lenient"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_delimiter_rejected() {
        let result = Cli::try_parse_from(["neighbourer", "-d", ";;"]);
        assert!(result.is_err());
    }
}
