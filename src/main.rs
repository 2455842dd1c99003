mod actors;
mod cli;
mod client;
mod commands;
mod config;
mod counting;
mod dataset;
mod error;
mod output;
mod store;
mod timeline;
mod types;

use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use client::JiraClient;
use config::Config;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

/// LOG_FORMAT=json for machine-readable lines, human-readable on stderr otherwise.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    output::set_json_output(cli.json);

    match cli.command {
        // Commands that don't require config
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "jsurv", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run()?;
        }
        command => {
            let config = Config::load()?;

            match command {
                Commands::Fetch(args) => {
                    let client = JiraClient::new(&config.jira_url())?;
                    commands::fetch::run(&client, &config, args).await?;
                }
                Commands::Actors(args) => {
                    commands::actors::run(&config, args)?;
                }
                Commands::Dataset(args) => {
                    commands::dataset::run(&config, args)?;
                }
                Commands::Timeline(args) => {
                    commands::timeline::run(&config, args)?;
                }
                Commands::Actor(args) => {
                    commands::actor::run(&config, args)?;
                }
                Commands::Completions { .. } | Commands::Init => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
