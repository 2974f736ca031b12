//! noterepo CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use noterepo_cli::cli::{Cli, Command};
use noterepo_cli::config::ClientConfig;
use noterepo_cli::error::{ClientError, ClientResult};
use noterepo_core::tracing::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().unwrap_or_default()
    };

    let session = cli.session.as_str();

    match cli.command {
        Command::Login {
            client_id,
            client_secret,
            force,
        } => {
            noterepo_cli::commands::auth::login(client_id, client_secret, force, &config, session)
                .await
        }
        Command::List { path } => noterepo_cli::commands::list::run(&path, &config, session).await,
        Command::Fetch { id, output } => {
            noterepo_cli::commands::fetch::run(&id, output, &config, session).await
        }
        Command::Logout => noterepo_cli::commands::logout::run(&config, session).await,
        Command::Status => noterepo_cli::commands::status::run(&config, session).await,
    }
}
