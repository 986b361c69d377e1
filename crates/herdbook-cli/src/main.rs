//! Herdbook CLI - Main entry point

use clap::Parser;
use herdbook_cli::{commands, Cli, Commands};
use herdbook_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("herdbook-cli")
        .build();

    // CLI should work without logging
    let _guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli) -> herdbook_cli::Result<()> {
    let database_url = cli.database_url.as_str();

    match &cli.command {
        Commands::Migrate => commands::migrate::run(database_url).await,
        Commands::CreateUser(args) => commands::user::create(database_url, args, false).await,
        Commands::CreateSuperuser(args) => commands::user::create(database_url, args, true).await,
        Commands::IssueToken { email } => commands::user::issue_token(database_url, email).await,
        Commands::DeactivateUser { email } => commands::user::deactivate(database_url, email).await,
    }
}
