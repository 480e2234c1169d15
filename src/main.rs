//! Issue Herald CLI entry point.

use clap::Parser;

use issue_herald::cli::{commands, Cli, Commands};
use issue_herald::infrastructure::config::ConfigLoader;
use issue_herald::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => issue_herald::cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => issue_herald::cli::handle_error(err, cli.json),
    };

    let result = match cli.selected_command() {
        Commands::Run => commands::run::execute(&config).await,
        Commands::Once => commands::once::execute(&config, cli.json).await,
        Commands::Init => commands::init::execute(&config, cli.json).await,
        Commands::List { limit } => commands::list::execute(&config, limit, cli.json).await,
    };

    if let Err(err) = result {
        tracing::error!(error = %format!("{err:#}"), "command failed");
        issue_herald::cli::handle_error(err, cli.json);
    }
}
