//! Market and placement policy commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use turbo_api::{MarketApiDto, MarketPolicyApiDto};

use crate::output::{or_dash, print_output, print_single, OutputFormat};

use super::CommandContext;

/// Market commands.
#[derive(Debug, Args)]
pub struct MarketsCommand {
    #[command(subcommand)]
    command: MarketsSubcommand,
}

#[derive(Debug, Subcommand)]
enum MarketsSubcommand {
    /// Get a market by display name.
    Get(GetMarketArgs),
}

#[derive(Debug, Args)]
struct GetMarketArgs {
    /// Market display name.
    #[arg(default_value = "Market")]
    name: String,
}

impl MarketsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            MarketsSubcommand::Get(args) => get_market(ctx, args).await,
        }
    }
}

/// Placement policy commands.
#[derive(Debug, Args)]
pub struct PoliciesCommand {
    #[command(subcommand)]
    command: PoliciesSubcommand,
}

#[derive(Debug, Subcommand)]
enum PoliciesSubcommand {
    /// Get a policy by display name. Its UUID can be passed to
    /// `turboctl reserve --constraint`.
    Get(GetPolicyArgs),
}

#[derive(Debug, Args)]
struct GetPolicyArgs {
    /// Policy display name.
    name: String,

    /// Display name of the market that owns the policy.
    #[arg(long, default_value = "Market")]
    market: String,
}

impl PoliciesCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            PoliciesSubcommand::Get(args) => get_policy(ctx, args).await,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct MarketRow {
    #[tabled(rename = "UUID")]
    uuid: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "State")]
    state: String,

    #[tabled(rename = "Environment")]
    environment_type: String,
}

impl From<&MarketApiDto> for MarketRow {
    fn from(market: &MarketApiDto) -> Self {
        Self {
            uuid: market.uuid.clone(),
            name: market.display_name.clone(),
            state: or_dash(&market.state),
            environment_type: or_dash(&market.environment_type),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct PolicyRow {
    #[tabled(rename = "UUID")]
    uuid: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Type")]
    policy_type: String,

    #[tabled(rename = "Enabled")]
    enabled: bool,

    #[tabled(rename = "Capacity")]
    capacity: String,
}

impl From<&MarketPolicyApiDto> for PolicyRow {
    fn from(policy: &MarketPolicyApiDto) -> Self {
        Self {
            uuid: policy.uuid.clone(),
            name: policy.display_name.clone(),
            policy_type: or_dash(&policy.policy_type),
            enabled: policy.enabled,
            capacity: policy.capacity.to_string(),
        }
    }
}

async fn get_market(ctx: CommandContext, args: GetMarketArgs) -> Result<()> {
    let client = ctx.client().await?;
    let market = client.market(&args.name).await?;

    match ctx.format {
        OutputFormat::Json => print_single(&market),
        OutputFormat::Table => print_output(&[MarketRow::from(&market)], ctx.format),
    }
    Ok(())
}

async fn get_policy(ctx: CommandContext, args: GetPolicyArgs) -> Result<()> {
    let client = ctx.client().await?;
    let market = client.market(&args.market).await?;
    let policy = client.market_policy(&args.name, &market.uuid).await?;

    match ctx.format {
        OutputFormat::Json => print_single(&policy),
        OutputFormat::Table => print_output(&[PolicyRow::from(&policy)], ctx.format),
    }
    Ok(())
}
