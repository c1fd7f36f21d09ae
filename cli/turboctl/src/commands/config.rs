//! Config commands (saved server and poll settings).

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::{config_path, Config, SETTABLE_KEYS};
use crate::output::{print_single, print_success, OutputFormat};

use super::CommandContext;

/// Show or change saved settings.
#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
enum ConfigSubcommand {
    /// Show the effective settings (saved file plus environment).
    Show,

    /// Save a setting.
    Set(SetArgs),
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Setting name, e.g. server_hostname or poll.timeout_secs.
    key: String,

    /// New value; an empty string clears optional settings.
    value: String,
}

impl ConfigCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ConfigSubcommand::Show => show(ctx),
            ConfigSubcommand::Set(args) => set(ctx, args),
        }
    }
}

fn show(ctx: CommandContext) -> Result<()> {
    let config = &ctx.config;

    match ctx.format {
        OutputFormat::Json => print_single(config),
        OutputFormat::Table => {
            println!("config_file: {}", config_path()?.display());
            println!(
                "server_hostname: {}",
                config.server_hostname.as_deref().unwrap_or("-")
            );
            println!("server_protocol: {}", config.server_protocol);
            println!("tls_insecure: {}", config.tls_insecure);
            println!("log_level: {}", config.log_level);
            println!(
                "log_file: {}",
                config
                    .log_file
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            println!("poll.timeout_secs: {}", config.poll.timeout_secs);
            println!("poll.interval_secs: {}", config.poll.interval_secs);
            println!("poll.initial_delay_secs: {}", config.poll.initial_delay_secs);
            println!();
            println!("settable keys: {}", SETTABLE_KEYS.join(", "));
        }
    }

    Ok(())
}

fn set(ctx: CommandContext, args: SetArgs) -> Result<()> {
    // Environment overrides are not persisted.
    let mut config = Config::load()?;
    config.set(&args.key, &args.value)?;
    config.save()?;

    match ctx.format {
        OutputFormat::Json => print_single(&config),
        OutputFormat::Table => print_success(&format!("Set {} = {}", args.key, args.value)),
    }

    Ok(())
}
