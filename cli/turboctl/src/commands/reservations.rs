//! Reservation commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use turbo_api::{ReservationId, ReservationResponse};

use crate::output::{or_dash, print_info, print_output, print_single, print_success, OutputFormat};

use super::CommandContext;

/// Reservation commands.
#[derive(Debug, Args)]
pub struct ReservationsCommand {
    #[command(subcommand)]
    command: ReservationsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ReservationsSubcommand {
    /// Get reservation details.
    Get(ReservationArgs),

    /// Delete a reservation. Succeeds if it no longer exists.
    Delete(ReservationArgs),
}

#[derive(Debug, Args)]
struct ReservationArgs {
    /// Reservation UUID.
    reservation: String,
}

impl ReservationsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ReservationsSubcommand::Get(args) => get_reservation(ctx, args).await,
            ReservationsSubcommand::Delete(args) => delete_reservation(ctx, args).await,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct ReservationRow {
    #[tabled(rename = "UUID")]
    uuid: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "Count")]
    count: u32,

    #[tabled(rename = "Reserved")]
    reserve_date_time: String,

    #[tabled(rename = "Expires")]
    expire_date_time: String,
}

impl From<&ReservationResponse> for ReservationRow {
    fn from(reservation: &ReservationResponse) -> Self {
        Self {
            uuid: reservation.uuid.clone(),
            name: or_dash(&reservation.display_name),
            status: reservation.status.clone(),
            count: reservation.count,
            reserve_date_time: or_dash(&reservation.reserve_date_time),
            expire_date_time: or_dash(&reservation.expire_date_time),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    name: String,

    #[tabled(rename = "Template")]
    template: String,

    #[tabled(rename = "Compute")]
    compute: String,

    #[tabled(rename = "Storage")]
    storage: String,
}

fn entity_rows(reservation: &ReservationResponse) -> Vec<EntityRow> {
    reservation
        .demand_entities
        .iter()
        .map(|entity| EntityRow {
            name: or_dash(&entity.display_name),
            template: or_dash(&entity.template.display_name),
            compute: entity
                .placements
                .compute_resources
                .iter()
                .map(|r| r.provider.display_name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            storage: entity
                .placements
                .storage_resources
                .iter()
                .map(|r| r.provider.display_name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}

async fn get_reservation(ctx: CommandContext, args: ReservationArgs) -> Result<()> {
    let client = ctx.client().await?;
    let reservation = client
        .read_reservation(&ReservationId::new(args.reservation))
        .await?;

    match ctx.format {
        OutputFormat::Json => print_single(&reservation),
        OutputFormat::Table => {
            print_output(&[ReservationRow::from(&reservation)], ctx.format);
            let entities = entity_rows(&reservation);
            if !entities.is_empty() {
                println!();
                print_output(&entities, ctx.format);
            }
        }
    }
    Ok(())
}

async fn delete_reservation(ctx: CommandContext, args: ReservationArgs) -> Result<()> {
    let orchestrator = ctx.orchestrator().await?;
    let id = ReservationId::new(args.reservation);
    let deleted = orchestrator.destroy(&id).await?;

    match ctx.format {
        OutputFormat::Json => print_single(&serde_json::json!({ "uuid": id, "deleted": deleted })),
        OutputFormat::Table if deleted => print_success(&format!("Deleted reservation {id}")),
        OutputFormat::Table => print_info(&format!("Reservation {id} not found; nothing to delete")),
    }
    Ok(())
}
