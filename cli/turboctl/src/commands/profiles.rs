//! Deployment profile commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use turbo_api::DeploymentProfileApiDto;

use crate::output::{or_dash, print_output, print_single, OutputFormat};

use super::CommandContext;

/// Deployment profile commands.
#[derive(Debug, Args)]
pub struct ProfilesCommand {
    #[command(subcommand)]
    command: ProfilesSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProfilesSubcommand {
    /// List all deployment profiles.
    List,

    /// Get a deployment profile by UUID or display name.
    Get(GetProfileArgs),
}

#[derive(Debug, Args)]
struct GetProfileArgs {
    /// Profile UUID.
    #[arg(required_unless_present = "name", conflicts_with = "name")]
    profile: Option<String>,

    /// Profile display name.
    #[arg(long)]
    name: Option<String>,
}

impl ProfilesCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ProfilesSubcommand::List => list_profiles(ctx).await,
            ProfilesSubcommand::Get(args) => get_profile(ctx, args).await,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct ProfileRow {
    #[tabled(rename = "UUID")]
    uuid: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Account")]
    account: String,

    #[tabled(rename = "Targets")]
    targets: String,
}

impl From<&DeploymentProfileApiDto> for ProfileRow {
    fn from(profile: &DeploymentProfileApiDto) -> Self {
        Self {
            uuid: profile.uuid.clone(),
            name: profile.display_name.clone(),
            account: or_dash(&profile.account.display_name),
            targets: or_dash(
                &profile
                    .deploy_parameters
                    .iter()
                    .map(|target| target.target_type.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        }
    }
}

async fn list_profiles(ctx: CommandContext) -> Result<()> {
    let client = ctx.client().await?;
    let profiles = client.deployment_profiles().await?;

    match ctx.format {
        OutputFormat::Json => print_single(&profiles),
        OutputFormat::Table => {
            let rows: Vec<ProfileRow> = profiles.iter().map(ProfileRow::from).collect();
            print_output(&rows, ctx.format);
        }
    }
    Ok(())
}

async fn get_profile(ctx: CommandContext, args: GetProfileArgs) -> Result<()> {
    let client = ctx.client().await?;
    let profile = match (args.profile, args.name) {
        (Some(uuid), _) => client.deployment_profile(&uuid).await?,
        (None, Some(name)) => client.deployment_profile_by_name(&name).await?,
        (None, None) => anyhow::bail!("either a profile UUID or --name is required"),
    };

    match ctx.format {
        OutputFormat::Json => print_single(&profile),
        OutputFormat::Table => print_output(&[ProfileRow::from(&profile)], ctx.format),
    }
    Ok(())
}
