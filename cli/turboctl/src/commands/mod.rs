//! CLI commands.

mod config;
mod markets;
mod profiles;
mod reservations;
mod reserve;
mod templates;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use turbo_api::{Credentials, HttpTransport, TurboClient};
use turbo_reservation::Orchestrator;

use crate::config::{Config, ENV_CLIENT_PASSWORD, ENV_CLIENT_USERNAME};
use crate::error::CliError;
use crate::logging;
use crate::output::OutputFormat;

/// turboctl - Reserve capacity and query placements on a Turbonomic server.
#[derive(Debug, Parser)]
#[command(name = "turboctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// API user name.
    #[arg(long, global = true, env = ENV_CLIENT_USERNAME)]
    username: Option<String>,

    /// API password.
    #[arg(long, global = true, env = ENV_CLIENT_PASSWORD, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reserve capacity for a workload and wait for the placement.
    Reserve(reserve::ReserveCommand),

    /// Inspect or delete existing reservations.
    Reservations(reservations::ReservationsCommand),

    /// Query workload templates.
    Templates(templates::TemplatesCommand),

    /// Query deployment profiles.
    Profiles(profiles::ProfilesCommand),

    /// Query markets.
    Markets(markets::MarketsCommand),

    /// Query placement policies of a market.
    Policies(markets::PoliciesCommand),

    /// Show or change saved settings.
    Config(config::ConfigCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        config.apply_env(|key| std::env::var(key).ok());

        logging::init(&config.log_level, config.log_file.as_deref())?;

        let credentials = match (self.username, self.password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            _ => None,
        };

        let ctx = CommandContext {
            config,
            credentials,
            format: self.format,
        };

        match self.command {
            Commands::Reserve(cmd) => cmd.run(ctx).await,
            Commands::Reservations(cmd) => cmd.run(ctx).await,
            Commands::Templates(cmd) => cmd.run(ctx).await,
            Commands::Profiles(cmd) => cmd.run(ctx).await,
            Commands::Markets(cmd) => cmd.run(ctx).await,
            Commands::Policies(cmd) => cmd.run(ctx).await,
            Commands::Config(cmd) => cmd.run(ctx),
            Commands::Version => {
                println!("turboctl {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    /// Effective configuration (file plus environment).
    pub config: Config,
    pub credentials: Option<Credentials>,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Open an authenticated session against the configured server.
    pub async fn transport(&self) -> Result<HttpTransport> {
        let api_url = self.config.api_url()?;
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(CliError::MissingCredentials)?;

        let transport = HttpTransport::new(api_url, self.config.tls_insecure)?;
        debug!(api_url = %transport.base_url(), "Logging in");
        transport.login(credentials).await?;
        Ok(transport)
    }

    /// Get an authenticated API client.
    pub async fn client(&self) -> Result<TurboClient<HttpTransport>> {
        Ok(TurboClient::new(self.transport().await?))
    }

    /// Get a reservation orchestrator using the configured poll timing.
    pub async fn orchestrator(&self) -> Result<Orchestrator<HttpTransport>> {
        Ok(Orchestrator::with_poll_config(
            self.transport().await?,
            self.config.poll_config(),
        ))
    }
}
