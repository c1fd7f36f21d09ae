//! Error handling and display for the CLI.

use colored::Colorize;
use thiserror::Error;
use turbo_api::{ApiError, TransportError};
use turbo_reservation::ReservationError;

use crate::config::{ENV_CLIENT_PASSWORD, ENV_CLIENT_USERNAME, ENV_SERVER_HOSTNAME};

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("No server configured.")]
    MissingHostname,

    #[error("No credentials provided.")]
    MissingCredentials,

    #[error("Unknown config key '{0}'.")]
    UnknownConfigKey(String),

    #[error("Invalid value '{value}' for {key}.")]
    InvalidValue { key: String, value: String },
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    if let Some(hint) = hint(err) {
        eprintln!("\n{}", format!("Hint: {hint}").yellow());
    }
}

fn hint(err: &anyhow::Error) -> Option<String> {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::MissingHostname => Some(format!(
                "Run `turboctl config set server_hostname <host>` or set {ENV_SERVER_HOSTNAME}."
            )),
            CliError::MissingCredentials => Some(format!(
                "Pass --username/--password or set {ENV_CLIENT_USERNAME} and {ENV_CLIENT_PASSWORD}."
            )),
            CliError::UnknownConfigKey(_) => {
                Some("Run `turboctl config show` to list the settable keys.".to_string())
            }
            CliError::InvalidValue { .. } => None,
        };
    }

    if let Some(reservation_err) = err.downcast_ref::<ReservationError>() {
        return match reservation_err {
            ReservationError::Timeout { id, .. } => Some(format!(
                "Reservation {id} was deleted after the timeout; resubmit it, or raise \
                 poll.timeout_secs (or pass --timeout)."
            )),
            ReservationError::PlacementFailed { .. } => Some(
                "The market found no capacity; check the template and placement constraints."
                    .to_string(),
            ),
            ReservationError::Transport(transport) => transport_hint(transport),
            _ => None,
        };
    }

    if let Some(api_err) = err.downcast_ref::<ApiError>() {
        return match api_err {
            ApiError::Transport(transport) => transport_hint(transport),
            ApiError::Ambiguous { .. } => {
                Some("Narrow the lookup, e.g. with --vcenter or --with-deployment-profile.".to_string())
            }
            _ => None,
        };
    }

    err.downcast_ref::<TransportError>().and_then(transport_hint)
}

fn transport_hint(err: &TransportError) -> Option<String> {
    match err {
        TransportError::Unauthorized { .. } => {
            Some("Check your username and password.".to_string())
        }
        TransportError::Network(_) => Some(
            "Check your network connection and server_hostname; \
             set tls_insecure for self-signed certificates."
                .to_string(),
        ),
        _ => None,
    }
}
