//! Reserve command: submit a reservation and wait for its placement.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use turbo_api::{DeploymentParameters, PlacementParameters, ReservationAction, TemplateQuery};
use turbo_reservation::{PlacementResult, ReservationRequest};

use crate::output::{or_dash, print_output, print_single, OutputFormat};

use super::CommandContext;

/// Reserve capacity for one or more instances of a template.
#[derive(Debug, Args)]
pub struct ReserveCommand {
    /// Name of the workload entity (also used as the demand name).
    entity_name: String,

    /// Template ID to place.
    #[arg(long, required_unless_present = "template_name", conflicts_with = "template_name")]
    template: Option<String>,

    /// Template display name, resolved to an ID before submitting.
    #[arg(long)]
    template_name: Option<String>,

    /// RESERVATION holds the capacity; PLACEMENT only computes where it would go.
    #[arg(long, default_value = "PLACEMENT")]
    action: ReservationAction,

    /// Number of instances.
    #[arg(long, default_value_t = 1)]
    count: u32,

    /// Placement constraint (market policy) ID; repeatable.
    #[arg(long = "constraint")]
    constraints: Vec<String>,

    /// Deployment profile ID.
    #[arg(long)]
    deployment_profile: Option<String>,

    /// Request high availability from the deployment profile.
    #[arg(long, requires = "deployment_profile")]
    high_availability: bool,

    /// Spread instances across regions.
    #[arg(long)]
    geographic_redundancy: bool,

    /// When the reservation starts (RFC 3339).
    #[arg(long, value_parser = parse_timestamp)]
    reserve_at: Option<String>,

    /// When the reservation expires (RFC 3339).
    #[arg(long, value_parser = parse_timestamp)]
    expire_at: Option<String>,

    /// When the workload will be deployed (RFC 3339).
    #[arg(long, value_parser = parse_timestamp)]
    deploy_at: Option<String>,

    /// Ask the server to resolve the job before answering the create call.
    #[arg(long)]
    blocking: bool,

    /// Overall poll budget in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Seconds between status reads.
    #[arg(long)]
    interval: Option<u64>,

    /// Seconds to wait before the first status read.
    #[arg(long)]
    initial_delay: Option<u64>,
}

/// Placement row for table output.
#[derive(Debug, Serialize, Tabled)]
struct PlacementRow {
    #[tabled(rename = "Entity")]
    entity: String,

    #[tabled(rename = "Compute")]
    compute: String,

    #[tabled(rename = "Storage")]
    storage: String,

    #[tabled(rename = "Status")]
    status: String,
}

impl ReserveCommand {
    pub async fn run(self, mut ctx: CommandContext) -> Result<()> {
        self.apply_poll_overrides(&mut ctx);
        let orchestrator = ctx.orchestrator().await?;

        let template_id = match (&self.template, &self.template_name) {
            (Some(id), _) => id.clone(),
            (None, Some(name)) => {
                let query = TemplateQuery {
                    has_deployment_profile: self.deployment_profile.is_some(),
                    ..TemplateQuery::new(name)
                };
                orchestrator.client().find_template(&query).await?.uuid
            }
            (None, None) => anyhow::bail!("either --template or --template-name is required"),
        };

        let request = self.build_request(template_id)?;
        let result = orchestrator.reserve(&request).await?;

        match ctx.format {
            OutputFormat::Json => print_single(&result),
            OutputFormat::Table => print_output(&placement_rows(&result), ctx.format),
        }
        Ok(())
    }

    fn apply_poll_overrides(&self, ctx: &mut CommandContext) {
        let poll = &mut ctx.config.poll;
        if let Some(timeout) = self.timeout {
            poll.timeout_secs = timeout;
        }
        if let Some(interval) = self.interval {
            poll.interval_secs = interval;
        }
        if let Some(delay) = self.initial_delay {
            poll.initial_delay_secs = delay;
        }
    }

    fn build_request(&self, template_id: String) -> Result<ReservationRequest> {
        let placement = PlacementParameters {
            constraint_ids: self.constraints.clone(),
            count: self.count,
            entity_names: vec![self.entity_name.clone()],
            geographic_redundancy: self.geographic_redundancy,
            template_id,
        };

        let builder = ReservationRequest::builder(self.action, &self.entity_name);
        let mut builder = match &self.deployment_profile {
            Some(profile) => builder.placement_with_deployment(
                placement,
                DeploymentParameters {
                    deployment_profile_id: profile.clone(),
                    high_availability: self.high_availability,
                },
            ),
            None => builder.placement(placement),
        };

        if let Some(at) = &self.reserve_at {
            builder = builder.reserve_at(at);
        }
        if let Some(at) = &self.expire_at {
            builder = builder.expire_at(at);
        }
        if let Some(at) = &self.deploy_at {
            builder = builder.deploy_at(at);
        }

        Ok(builder.blocking(self.blocking).build()?)
    }
}

fn placement_rows(result: &PlacementResult) -> Vec<PlacementRow> {
    result
        .entities
        .iter()
        .map(|entity| PlacementRow {
            entity: or_dash(&entity.display_name),
            compute: entity
                .placements
                .compute_resources
                .first()
                .map(|r| or_dash(&r.provider.display_name))
                .unwrap_or_else(|| "-".to_string()),
            storage: entity
                .placements
                .storage_resources
                .first()
                .map(|r| or_dash(&r.provider.display_name))
                .unwrap_or_else(|| "-".to_string()),
            status: result.status.clone(),
        })
        .collect()
}

/// Normalize an RFC 3339 timestamp to UTC with second precision.
fn parse_timestamp(raw: &str) -> Result<String, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| {
            at.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        })
        .map_err(|err| format!("expected an RFC 3339 timestamp: {err}"))
}
