//! eventfold CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use eventfold_cli::cli::{Cli, Command, ConfigAction};
use eventfold_cli::commands;
use eventfold_cli::config::EventfoldConfig;
use eventfold_cli::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => EventfoldConfig::load_from(path)?,
        None => EventfoldConfig::load()?,
    };

    eventfold_core::init_tracing(config.tracing_config(cli.debug, cli.log_format)?)?;
    debug!(path = ?cli.config, "Configuration loaded");

    match cli.command {
        Command::List(ref args) => commands::list::run(&config, args).await,
        Command::Expand(ref args) => commands::expand::run(args, config.limits.clone()),
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
