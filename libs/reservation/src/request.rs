//! Validated reservation requests.

use turbo_api::{
    DeploymentParameters, PlacementParameters, ReservationAction, ReservationCreate,
    ReservationParameter,
};

use crate::error::RequestError;

/// A reservation request ready to submit.
///
/// Built through [`ReservationRequest::builder`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRequest {
    body: ReservationCreate,
    blocking: bool,
}

impl ReservationRequest {
    pub fn builder(
        action: ReservationAction,
        demand_name: impl Into<String>,
    ) -> ReservationRequestBuilder {
        ReservationRequestBuilder {
            body: ReservationCreate {
                action,
                demand_name: demand_name.into(),
                deploy_date_time: None,
                expire_date_time: None,
                parameters: Vec::new(),
                reserve_date_time: None,
            },
            blocking: false,
        }
    }

    /// Builder for one entity of `template_id`, with the demand named after
    /// the entity.
    pub fn single_entity(
        action: ReservationAction,
        entity_name: impl Into<String>,
        template_id: impl Into<String>,
    ) -> ReservationRequestBuilder {
        let entity_name = entity_name.into();
        Self::builder(action, entity_name.clone()).placement(PlacementParameters {
            count: 1,
            entity_names: vec![entity_name],
            template_id: template_id.into(),
            ..Default::default()
        })
    }

    pub fn action(&self) -> ReservationAction {
        self.body.action
    }

    pub fn demand_name(&self) -> &str {
        &self.body.demand_name
    }

    pub fn parameters(&self) -> &[ReservationParameter] {
        &self.body.parameters
    }

    /// Whether the service should resolve the job before answering the create call.
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// The body sent on the create call.
    pub fn as_wire(&self) -> &ReservationCreate {
        &self.body
    }
}

#[derive(Debug, Clone)]
pub struct ReservationRequestBuilder {
    body: ReservationCreate,
    blocking: bool,
}

impl ReservationRequestBuilder {
    pub fn placement(self, placement: PlacementParameters) -> Self {
        self.parameter(ReservationParameter {
            deployment_parameters: None,
            placement_parameters: placement,
        })
    }

    pub fn placement_with_deployment(
        self,
        placement: PlacementParameters,
        deployment: DeploymentParameters,
    ) -> Self {
        self.parameter(ReservationParameter {
            deployment_parameters: Some(deployment),
            placement_parameters: placement,
        })
    }

    fn parameter(mut self, parameter: ReservationParameter) -> Self {
        self.body.parameters.push(parameter);
        self
    }

    /// Attach a deployment profile to every placement added so far.
    pub fn deployment_profile(mut self, deployment: DeploymentParameters) -> Self {
        for parameter in &mut self.body.parameters {
            parameter.deployment_parameters = Some(deployment.clone());
        }
        self
    }

    /// Add placement constraints (market policy ids) to every placement added so far.
    pub fn constraints<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        for parameter in &mut self.body.parameters {
            parameter
                .placement_parameters
                .constraint_ids
                .extend(ids.iter().cloned());
        }
        self
    }

    pub fn reserve_at(mut self, at: impl Into<String>) -> Self {
        self.body.reserve_date_time = Some(at.into());
        self
    }

    pub fn expire_at(mut self, at: impl Into<String>) -> Self {
        self.body.expire_date_time = Some(at.into());
        self
    }

    pub fn deploy_at(mut self, at: impl Into<String>) -> Self {
        self.body.deploy_date_time = Some(at.into());
        self
    }

    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn build(self) -> Result<ReservationRequest, RequestError> {
        if self.body.demand_name.trim().is_empty() {
            return Err(RequestError::EmptyDemandName);
        }
        if self.body.parameters.is_empty() {
            return Err(RequestError::NoPlacements);
        }
        for (index, parameter) in self.body.parameters.iter().enumerate() {
            let placement = &parameter.placement_parameters;
            if placement.template_id.is_empty() {
                return Err(RequestError::MissingTemplate { index });
            }
            if placement.count == 0 {
                return Err(RequestError::ZeroCount { index });
            }
        }

        Ok(ReservationRequest {
            body: self.body,
            blocking: self.blocking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entity_defaults() {
        let request = ReservationRequest::single_entity(
            ReservationAction::Placement,
            "web-01",
            "tmpl-1",
        )
        .build()
        .unwrap();

        assert_eq!(request.demand_name(), "web-01");
        assert!(!request.is_blocking());
        let placement = &request.parameters()[0].placement_parameters;
        assert_eq!(placement.count, 1);
        assert_eq!(placement.entity_names, vec!["web-01".to_string()]);
        assert_eq!(placement.template_id, "tmpl-1");
        assert!(request.parameters()[0].deployment_parameters.is_none());
    }

    #[test]
    fn test_profile_and_constraints_apply_to_existing_placements() {
        let request =
            ReservationRequest::single_entity(ReservationAction::Reservation, "db-01", "tmpl-2")
                .deployment_profile(DeploymentParameters {
                    deployment_profile_id: "dp-1".to_string(),
                    high_availability: false,
                })
                .constraints(["policy-a", "policy-b"])
                .expire_at("2030-01-01T00:00:00Z")
                .blocking(true)
                .build()
                .unwrap();

        let parameter = &request.parameters()[0];
        assert_eq!(
            parameter
                .deployment_parameters
                .as_ref()
                .map(|d| d.deployment_profile_id.as_str()),
            Some("dp-1")
        );
        assert_eq!(
            parameter.placement_parameters.constraint_ids,
            vec!["policy-a".to_string(), "policy-b".to_string()]
        );
        assert_eq!(
            request.as_wire().expire_date_time.as_deref(),
            Some("2030-01-01T00:00:00Z")
        );
        assert!(request.is_blocking());
    }

    #[test]
    fn test_build_rejects_invalid_requests() {
        let no_name = ReservationRequest::single_entity(ReservationAction::Placement, " ", "t");
        assert_eq!(no_name.build(), Err(RequestError::EmptyDemandName));

        let empty = ReservationRequest::builder(ReservationAction::Placement, "web");
        assert_eq!(empty.build(), Err(RequestError::NoPlacements));

        let no_template = ReservationRequest::builder(ReservationAction::Placement, "web")
            .placement(PlacementParameters {
                count: 1,
                template_id: "t".to_string(),
                ..Default::default()
            })
            .placement(PlacementParameters {
                count: 1,
                ..Default::default()
            });
        assert_eq!(
            no_template.build(),
            Err(RequestError::MissingTemplate { index: 1 })
        );

        let zero = ReservationRequest::builder(ReservationAction::Placement, "web").placement(
            PlacementParameters {
                template_id: "t".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(zero.build(), Err(RequestError::ZeroCount { index: 0 }));
    }
}
