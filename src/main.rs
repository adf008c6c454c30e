use clap::Parser;
use regimewatch::adapter::inbound::cli::command::Cli;
use regimewatch::adapter::inbound::cli::output::{self, OutputConfig};
use regimewatch::adapter::inbound::cli::{dispatch, operator};
use regimewatch::error::Error;
use regimewatch::infrastructure::config::Config;
use regimewatch::infrastructure::operator::Operator;
use tracing::{error, info};

/// Configuration could not be loaded or failed validation.
const EXIT_CONFIG: i32 = 2;
/// Conventional exit status after SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    cli.color.apply();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let mut config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::error(&format!(
                "Failed to load config ({}): {e}",
                cli.config.display()
            ));
            std::process::exit(EXIT_CONFIG);
        }
    };

    config.logging = config.logging.with_verbosity(cli.quiet, cli.verbose);
    config.init_logging();
    info!(command = ?cli.command, "regimewatch starting");

    if operator::install(Box::new(Operator::new(config))).is_err() {
        output::error("CLI operator already installed");
        std::process::exit(1);
    }

    match dispatch::run(&cli.command).await {
        Ok(()) => info!("regimewatch stopped"),
        Err(Error::Interrupted) => {
            output::warning("Interrupted");
            std::process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            output::error(&e.to_string());
            std::process::exit(1);
        }
    }
}
