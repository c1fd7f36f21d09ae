//! Typed client over a [`Transport`].

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::catalog::{
    DeploymentProfileApiDto, MarketApiDto, MarketPolicyApiDto, TemplateApiDto, TemplateQuery,
    DEPLOYMENT_PROFILES_PREFIX, MARKETS_PREFIX, TEMPLATES_PREFIX,
};
use crate::decode::decode;
use crate::error::{ApiError, ApiResult};
use crate::reservation::{
    ReservationCreate, ReservationId, ReservationResponse, API_CALL_BLOCK_PARAM,
    RESERVATIONS_PREFIX,
};
use crate::transport::Transport;

/// API client for the reservation and catalog endpoints.
#[derive(Debug, Clone)]
pub struct TurboClient<T> {
    transport: T,
}

impl<T: Transport> TurboClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `path` and decode the body.
    async fn get<R: DeserializeOwned>(&self, what: &'static str, path: &str) -> ApiResult<R> {
        let body = self.transport.send(Method::GET, path, None).await?;
        Ok(decode(what, &body)?)
    }

    // -- Reservations --

    /// Create a reservation job.
    ///
    /// `blocking` asks the service to resolve the job before responding; it is
    /// forwarded as the `apiCallBlock` query flag.
    pub async fn create_reservation(
        &self,
        create: &ReservationCreate,
        blocking: bool,
    ) -> ApiResult<ReservationResponse> {
        let body = serde_json::to_vec(create).map_err(|source| ApiError::Encode {
            what: "reservation",
            source,
        })?;
        let path = format!("{RESERVATIONS_PREFIX}?{API_CALL_BLOCK_PARAM}={blocking}");

        debug!(
            demand_name = %create.demand_name,
            action = %create.action,
            blocking,
            "Creating reservation"
        );

        let response = self.transport.send(Method::POST, &path, Some(body)).await?;
        Ok(decode("reservation", &response)?)
    }

    /// Read a reservation job.
    pub async fn read_reservation(&self, id: &ReservationId) -> ApiResult<ReservationResponse> {
        self.get("reservation", &format!("{RESERVATIONS_PREFIX}/{id}"))
            .await
    }

    /// Delete a reservation job.
    pub async fn delete_reservation(&self, id: &ReservationId) -> ApiResult<()> {
        self.transport
            .send(Method::DELETE, &format!("{RESERVATIONS_PREFIX}/{id}"), None)
            .await?;
        Ok(())
    }

    // -- Templates --

    pub async fn templates(&self) -> ApiResult<Vec<TemplateApiDto>> {
        self.get("templates", TEMPLATES_PREFIX).await
    }

    pub async fn template(&self, uuid: &str) -> ApiResult<TemplateApiDto> {
        self.get("template", &format!("{TEMPLATES_PREFIX}/{uuid}"))
            .await
    }

    /// Find the single template matching `query`.
    pub async fn find_template(&self, query: &TemplateQuery) -> ApiResult<TemplateApiDto> {
        let templates = self.templates().await?;
        debug!(
            total = templates.len(),
            display_name = %query.display_name,
            "Searching templates"
        );

        let mut matches: Vec<TemplateApiDto> =
            templates.into_iter().filter(|t| query.matches(t)).collect();

        match matches.len() {
            0 => Err(ApiError::not_found("template", &query.display_name)),
            1 => Ok(matches.remove(0)),
            count => Err(ApiError::Ambiguous {
                kind: "template",
                name: query.display_name.clone(),
                count,
            }),
        }
    }

    // -- Deployment profiles --

    pub async fn deployment_profiles(&self) -> ApiResult<Vec<DeploymentProfileApiDto>> {
        self.get("deployment profiles", DEPLOYMENT_PROFILES_PREFIX)
            .await
    }

    pub async fn deployment_profile(&self, uuid: &str) -> ApiResult<DeploymentProfileApiDto> {
        self.get(
            "deployment profile",
            &format!("{DEPLOYMENT_PROFILES_PREFIX}/{uuid}"),
        )
        .await
    }

    pub async fn deployment_profile_by_name(
        &self,
        name: &str,
    ) -> ApiResult<DeploymentProfileApiDto> {
        self.deployment_profiles()
            .await?
            .into_iter()
            .find(|profile| profile.display_name == name)
            .ok_or_else(|| ApiError::not_found("deployment profile", name))
    }

    // -- Markets --

    /// Find a market by display name.
    pub async fn market(&self, name: &str) -> ApiResult<MarketApiDto> {
        let markets: Vec<MarketApiDto> = self.get("markets", MARKETS_PREFIX).await?;
        markets
            .into_iter()
            .find(|market| market.display_name == name)
            .ok_or_else(|| ApiError::not_found("market", name))
    }

    /// Find a policy of a market by display name.
    pub async fn market_policy(
        &self,
        name: &str,
        market_uuid: &str,
    ) -> ApiResult<MarketPolicyApiDto> {
        let policies: Vec<MarketPolicyApiDto> = self
            .get(
                "market policies",
                &format!("{MARKETS_PREFIX}/{market_uuid}/policies"),
            )
            .await?;
        policies
            .into_iter()
            .find(|policy| policy.display_name == name)
            .ok_or_else(|| ApiError::not_found("market policy", name))
    }
}
