//! Run configuration
//!
//! Settings are layered from lowest to highest priority: built-in
//! defaults, a TOML file, `NEIGHBOURER_*` environment variables, then
//! command-line flags (applied by the CLI).

pub mod loader;

pub use loader::ConfigLoader;

use crate::aggregate::AggregationOptions;
use crate::error::{common, Result};
use crate::table::ErrorMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "neighbourer.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NeighbourerConfig {
    /// How rows that fail to parse are handled
    pub mode: ErrorMode,
    /// Aggregation worker threads; absent or 0 uses every core
    pub threads: Option<usize>,
    /// Field delimiter for both input and output
    pub delimiter: char,
    /// Show a progress bar while aggregating
    pub progress: bool,
    /// Where to write the JSON warnings report
    pub report: Option<PathBuf>,
    /// Fractional digits for output values; absent keeps full precision
    pub precision: Option<usize>,
}

impl Default for NeighbourerConfig {
    fn default() -> Self {
        Self {
            mode: ErrorMode::Lenient,
            threads: None,
            delimiter: ',',
            progress: false,
            report: None,
            precision: None,
        }
    }
}

impl NeighbourerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `NEIGHBOURER_*` variables from the process environment
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    /// Apply `NEIGHBOURER_*` variables from an arbitrary lookup
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("NEIGHBOURER_MODE") {
            self.mode = mode.parse()?;
        }

        if let Some(threads) = lookup("NEIGHBOURER_THREADS") {
            let parsed = threads
                .trim()
                .parse::<usize>()
                .map_err(|_| common::invalid_config_value("NEIGHBOURER_THREADS", &threads))?;
            self.threads = Some(parsed);
        }

        if let Some(delimiter) = lookup("NEIGHBOURER_DELIMITER") {
            self.delimiter = parse_delimiter(&delimiter)?;
        }

        if let Some(report) = lookup("NEIGHBOURER_REPORT") {
            self.report = Some(PathBuf::from(report));
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if let Some(precision) = self.precision {
            if precision > 17 {
                return Err(common::invalid_config_value("precision", precision));
            }
        }
        Ok(())
    }

    /// Delimiter as a byte; must be a single ASCII character other than a quote or newline
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter {
            '"' | '\n' | '\r' => Err(common::invalid_config_value("delimiter", self.delimiter.escape_default())),
            c if c.is_ascii() => Ok(c as u8),
            c => Err(common::invalid_config_value("delimiter", c)),
        }
    }

    pub fn aggregation_options(&self) -> AggregationOptions {
        AggregationOptions {
            threads: self.threads,
            progress: self.progress,
        }
    }
}

/// Parse a delimiter given as text, accepting `\t` and `tab` for a tab
pub fn parse_delimiter(value: &str) -> Result<char> {
    match value {
        "\\t" | "tab" => return Ok('\t'),
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(common::invalid_config_value("delimiter", value)),
    }
}
