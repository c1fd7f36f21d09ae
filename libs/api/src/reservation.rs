//! Reservation wire types.
//!
//! A reservation asks the market to find (and optionally hold) capacity for
//! one or more workload instances described by a template. The create call
//! returns the job record; the same record shape is returned by reads and
//! carries the resolved placements once the market has finished.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decode::null_as_default;
use crate::stat::StatApiDto;
use crate::types::BaseApiDto;

/// API path prefix for reservations.
pub const RESERVATIONS_PREFIX: &str = "reservations";

/// Query flag selecting synchronous processing on create.
pub const API_CALL_BLOCK_PARAM: &str = "apiCallBlock";

/// Identifier the remote service assigns to a reservation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(String);

impl ReservationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ReservationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ReservationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Intended action for the workload demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationAction {
    /// Find capacity and hold it until the expire time.
    Reservation,
    /// Only compute a placement recommendation.
    Placement,
}

impl ReservationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reservation => "RESERVATION",
            Self::Placement => "PLACEMENT",
        }
    }
}

impl fmt::Display for ReservationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RESERVATION" => Ok(Self::Reservation),
            "PLACEMENT" => Ok(Self::Placement),
            other => Err(format!(
                "invalid reservation action '{other}', expected RESERVATION or PLACEMENT"
            )),
        }
    }
}

/// Body of `POST /reservations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreate {
    pub action: ReservationAction,
    pub demand_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_date_time: Option<String>,
    pub parameters: Vec<ReservationParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve_date_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_parameters: Option<DeploymentParameters>,
    pub placement_parameters: PlacementParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentParameters {
    #[serde(rename = "deploymentProfileID", skip_serializing_if = "String::is_empty")]
    pub deployment_profile_id: String,
    pub high_availability: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementParameters {
    #[serde(rename = "constraintIDs", skip_serializing_if = "Vec::is_empty")]
    pub constraint_ids: Vec<String>,
    pub count: u32,
    pub entity_names: Vec<String>,
    pub geographic_redundancy: bool,
    #[serde(rename = "templateID")]
    pub template_id: String,
}

/// Reservation job record returned by create and read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReservationResponse {
    pub uuid: String,
    pub display_name: String,
    pub count: u32,
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reserve_date_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expire_date_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deploy_date_time: String,
    pub reserve_count: u32,
    pub deploy_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub demand_entities: Vec<DemandEntity>,
}

/// The workload instance a placement was requested for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DemandEntity {
    pub uuid: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    pub template: BaseApiDto,
    pub deployment_profile: BaseApiDto,
    pub placements: Placement,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Placement {
    #[serde(deserialize_with = "null_as_default")]
    pub compute_resources: Vec<ComputeResource>,
    #[serde(deserialize_with = "null_as_default")]
    pub storage_resources: Vec<StorageResource>,
}

/// Compute provider chosen for a demand entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeResource {
    pub provider: BaseApiDto,
    #[serde(deserialize_with = "null_as_default")]
    pub stats: Vec<StatApiDto>,
}

/// Storage provider chosen for a demand entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageResource {
    pub provider: BaseApiDto,
    #[serde(deserialize_with = "null_as_default")]
    pub stats: Vec<StatApiDto>,
    /// Disk resource type tag, e.g. [`RESOURCE_TYPE_DISK`](crate::RESOURCE_TYPE_DISK).
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
}
