//! # turbo-api
//!
//! Wire types and transport for the Turbonomic REST API (v3).
//!
//! ## Modules
//!
//! - `stat`: statistic records and the resilient decode of numeric-or-sentinel values
//! - `reservation`: reservation create/response shapes
//! - `catalog`: templates, deployment profiles, markets and policies
//! - `transport`: the [`Transport`] seam and its HTTP implementation
//! - `client`: [`TurboClient`], typed operations over a transport
//!
//! Response bodies are decoded permissively: missing fields take their zero
//! value and a stat `value` of `"Infinity"` becomes positive infinity. Only a
//! body that is not valid JSON (or has the wrong top-level shape) fails.

mod catalog;
mod client;
mod decode;
mod error;
mod reservation;
mod stat;
mod transport;
mod types;

pub use catalog::*;
pub use client::TurboClient;
pub use decode::{decode, decode_stat};
pub use error::{ApiError, ApiResult, DecodeError, TransportError};
pub use reservation::*;
pub use stat::*;
pub use transport::{Credentials, HttpTransport, Transport, DEFAULT_REQUEST_TIMEOUT, LOGIN_PATH};
pub use types::*;

/// Re-exported so callers can implement [`Transport`] without naming reqwest.
pub use reqwest::Method;
