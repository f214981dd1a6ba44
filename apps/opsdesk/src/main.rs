mod commands;
mod config;
mod context;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::profiles::ProfileCommand;
use commands::team::TeamCommand;
use config::AppConfig;
use context::{Console, open_session};

/// Opsdesk - administrative console for companies, teams and cloud profiles
#[derive(Parser)]
#[command(name = "opsdesk")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Company to work on (default: the first accessible one)
    #[arg(long, global = true)]
    company: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start sign-in and print the authorization URL
    Login,
    /// Complete sign-in from the URL the provider redirected to
    Callback {
        /// Full redirect URL including `code` and `state`
        url: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List navigation entries
    Nav,
    /// List companies you have access to
    Companies,
    /// Manage team members
    #[command(subcommand)]
    Team(TeamCommand),
    /// Manage cloud provider profiles
    #[command(subcommand)]
    Profiles(ProfileCommand),
    /// Print effective configuration (YAML)
    Config,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (OPSDESK__*)
    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging, cli.verbose);
    tracing::debug!(base_url = %config.api.base_url, "configuration loaded");

    let company = cli.company.as_deref();
    match cli.command {
        Commands::Login => {
            let session = open_session(&config)?;
            commands::auth::login(&session).await
        }
        Commands::Callback { url } => {
            let session = open_session(&config)?;
            commands::auth::callback(&session, &url).await
        }
        Commands::Logout => {
            let session = open_session(&config)?;
            commands::auth::logout(&session).await
        }
        Commands::Whoami => {
            let session = open_session(&config)?;
            commands::auth::whoami(&session);
            Ok(())
        }
        Commands::Nav => {
            commands::nav();
            Ok(())
        }
        Commands::Companies => commands::companies(&Console::connect(&config)?, company).await,
        Commands::Team(command) => {
            commands::team::run(&Console::connect(&config)?, company, command).await
        }
        Commands::Profiles(command) => {
            commands::profiles::run(&Console::connect(&config)?, company, command).await
        }
        Commands::Config => commands::print_config(&config),
        Commands::Check => commands::check(&config),
    }
}
