//! Template commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use turbo_api::{ResourceApiDto, TemplateApiDto, TemplateQuery};

use crate::output::{or_dash, print_output, print_single, OutputFormat};

use super::CommandContext;

/// Template commands.
#[derive(Debug, Args)]
pub struct TemplatesCommand {
    #[command(subcommand)]
    command: TemplatesSubcommand,
}

#[derive(Debug, Subcommand)]
enum TemplatesSubcommand {
    /// List all templates.
    List,

    /// Get a template by UUID.
    Get(GetTemplateArgs),

    /// Find the single template with a display name.
    Find(FindTemplateArgs),
}

#[derive(Debug, Args)]
struct GetTemplateArgs {
    /// Template UUID.
    template: String,
}

#[derive(Debug, Args)]
struct FindTemplateArgs {
    /// Template display name.
    name: String,

    /// Only match templates with a deployment profile.
    #[arg(long)]
    with_deployment_profile: bool,

    /// Only match templates discovered through this vCenter.
    #[arg(long)]
    vcenter: Option<String>,
}

impl TemplatesCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            TemplatesSubcommand::List => list_templates(ctx).await,
            TemplatesSubcommand::Get(args) => get_template(ctx, args).await,
            TemplatesSubcommand::Find(args) => find_template(ctx, args).await,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct TemplateRow {
    #[tabled(rename = "UUID")]
    uuid: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Class")]
    class_name: String,

    #[tabled(rename = "Model")]
    model: String,

    #[tabled(rename = "Deployment Profile")]
    deployment_profile: String,
}

impl From<&TemplateApiDto> for TemplateRow {
    fn from(template: &TemplateApiDto) -> Self {
        Self {
            uuid: template.uuid.clone(),
            name: template.display_name.clone(),
            class_name: or_dash(&template.class_name),
            model: or_dash(&template.model),
            deployment_profile: or_dash(&template.deployment_profile.display_name),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct ResourceStatRow {
    #[tabled(rename = "Resource")]
    resource: &'static str,

    #[tabled(rename = "Stat")]
    name: String,

    #[tabled(rename = "Value")]
    value: String,

    #[tabled(rename = "Units")]
    units: String,
}

fn stat_rows(template: &TemplateApiDto) -> Vec<ResourceStatRow> {
    let groups: [(&'static str, &[ResourceApiDto]); 4] = [
        ("compute", &template.compute_resources),
        ("storage", &template.storage_resources),
        ("network", &template.network_resources),
        ("infrastructure", &template.infrastructure_resources),
    ];

    groups
        .into_iter()
        .flat_map(|(resource, resources)| {
            resources
                .iter()
                .flat_map(|r| &r.stats)
                .map(move |stat| ResourceStatRow {
                    resource,
                    name: stat.name.clone(),
                    value: stat.value.to_string(),
                    units: or_dash(&stat.units),
                })
        })
        .collect()
}

fn print_template(template: &TemplateApiDto, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_single(template),
        OutputFormat::Table => {
            print_output(&[TemplateRow::from(template)], format);
            let stats = stat_rows(template);
            if !stats.is_empty() {
                println!();
                print_output(&stats, format);
            }
        }
    }
}

async fn list_templates(ctx: CommandContext) -> Result<()> {
    let client = ctx.client().await?;
    let templates = client.templates().await?;

    match ctx.format {
        OutputFormat::Json => print_single(&templates),
        OutputFormat::Table => {
            let rows: Vec<TemplateRow> = templates.iter().map(TemplateRow::from).collect();
            print_output(&rows, ctx.format);
        }
    }
    Ok(())
}

async fn get_template(ctx: CommandContext, args: GetTemplateArgs) -> Result<()> {
    let client = ctx.client().await?;
    let template = client.template(&args.template).await?;
    print_template(&template, ctx.format);
    Ok(())
}

async fn find_template(ctx: CommandContext, args: FindTemplateArgs) -> Result<()> {
    let client = ctx.client().await?;
    let query = TemplateQuery {
        has_deployment_profile: args.with_deployment_profile,
        vcenter: args.vcenter,
        ..TemplateQuery::new(args.name)
    };
    let template = client.find_template(&query).await?;
    print_template(&template, ctx.format);
    Ok(())
}
