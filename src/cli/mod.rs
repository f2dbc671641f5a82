//! Command-line interface
//!
//! Parses arguments, layers them over the file and environment
//! configuration, and drives one run.

pub mod args;
pub mod run;

pub use args::Cli;
pub use run::{run, run_with, RunRequest};

use crate::app::AppConfig;
use crate::config::ConfigLoader;
use crate::io::{InputSource, OutputSink};
use anyhow::Result;
use std::convert::Infallible;
use tracing::debug;

/// Resolve configuration for `cli` and run the pipeline
pub fn execute(cli: &Cli, app: &AppConfig) -> Result<()> {
    let mut config = ConfigLoader::new(&app.working_dir).load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    debug!("Effective configuration: {:?}", config);

    let input: InputSource = parse_stream(&cli.input);
    let output: OutputSink = parse_stream(&cli.output);

    run(&RunRequest::new(input, output, config))?;
    Ok(())
}

fn parse_stream<T: std::str::FromStr<Err = Infallible>>(value: &str) -> T {
    match value.parse() {
        Ok(parsed) => parsed,
        Err(never) => match never {},
    }
}
