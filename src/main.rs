use clap::Parser;
use neighbourer::app::{handle_fatal_error, init_logging, AppConfig};
use neighbourer::cli::{self, Cli};
use tracing::debug;

fn main() {
    let cli = Cli::parse();

    let app_config = match AppConfig::new(cli.verbose) {
        Ok(config) => config,
        Err(e) => handle_fatal_error(e, cli.verbose),
    };
    init_logging(&app_config);

    if let Err(e) = cli::execute(&cli, &app_config) {
        handle_fatal_error(e, cli.verbose);
    }

    debug!("Neighbourer completed successfully");
}
