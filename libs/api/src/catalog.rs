//! Catalog objects used to build reservation requests.
//!
//! Templates and deployment profiles describe what to place; markets and
//! their policies supply the constraint ids a reservation is scoped by.

use serde::{Deserialize, Serialize};

use crate::decode::null_as_default;
use crate::stat::StatValue;
use crate::types::{BaseApiDto, Link, NameValue, ResourceApiDto};

pub const TEMPLATES_PREFIX: &str = "templates";
pub const DEPLOYMENT_PROFILES_PREFIX: &str = "deploymentprofiles";
pub const MARKETS_PREFIX: &str = "markets";

/// Workload template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateApiDto {
    pub uuid: String,
    pub display_name: String,
    /// One of the `CLASS_NAME_*` constants.
    pub class_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub discovered: bool,
    /// Model URI; contains the discovering target (e.g. a vCenter host name).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub model: String,
    pub price: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vendor: String,
    pub deployment_profile: DeploymentProfileApiDto,
    #[serde(deserialize_with = "null_as_default")]
    pub compute_resources: Vec<ResourceApiDto>,
    #[serde(deserialize_with = "null_as_default")]
    pub storage_resources: Vec<ResourceApiDto>,
    #[serde(deserialize_with = "null_as_default")]
    pub network_resources: Vec<ResourceApiDto>,
    #[serde(deserialize_with = "null_as_default")]
    pub infrastructure_resources: Vec<ResourceApiDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl TemplateApiDto {
    /// Returns true if a deployment profile is mapped to the template.
    pub fn has_deployment_profile(&self) -> bool {
        !self.deployment_profile.uuid.is_empty()
    }
}

/// Criteria for selecting exactly one template from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateQuery {
    pub display_name: String,
    pub has_deployment_profile: bool,
    /// Only match templates discovered through this target.
    pub vcenter: Option<String>,
}

impl TemplateQuery {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn matches(&self, template: &TemplateApiDto) -> bool {
        template.display_name == self.display_name
            && template.has_deployment_profile() == self.has_deployment_profile
            && self
                .vcenter
                .as_deref()
                .is_none_or(|vcenter| template.model.contains(vcenter))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentProfileApiDto {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    pub account: BaseApiDto,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub deploy_parameters: Vec<DeploymentProfileTargetApiDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentProfileTargetApiDto {
    /// Deployment target kind, e.g. "vCenter" or "AWS".
    pub target_type: String,
    pub providers: Vec<DeploymentProfileProviderApiDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentProfileProviderApiDto {
    pub provider: BaseApiDto,
    pub parameters: Vec<DeploymentProfileParamApiDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentProfileParamApiDto {
    pub parameter_type: String,
    pub properties: Vec<NameValue>,
}

/// A market (the real-time market is named "Market").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketApiDto {
    pub uuid: String,
    pub display_name: String,
    pub class_name: String,
    pub state: String,
    pub unplaced_entities: bool,
    pub environment_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// Placement policy defined in a market.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketPolicyApiDto {
    pub uuid: String,
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub policy_type: String,
    pub enabled: bool,
    pub capacity: StatValue,
    pub commodity_type: String,
    pub consumer_group: GroupApiDto,
    pub provider_group: GroupApiDto,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// Consumer or provider group a policy applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupApiDto {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    pub entities_count: u32,
    pub members_count: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub severity: String,
    pub is_static: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub logical_operator: String,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub criteria_list: Vec<Criteria>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub environment_type: String,
}

/// Dynamic group membership criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Criteria {
    pub exp_val: String,
    pub exp_type: String,
    pub filter_type: String,
    pub case_sensitive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str, profile: &str, model: &str) -> TemplateApiDto {
        TemplateApiDto {
            display_name: name.to_string(),
            model: model.to_string(),
            deployment_profile: DeploymentProfileApiDto {
                uuid: profile.to_string(),
                ..DeploymentProfileApiDto::default()
            },
            ..TemplateApiDto::default()
        }
    }

    #[test]
    fn test_template_query_matches_name_and_profile() {
        let mut query = TemplateQuery::new("centos");
        query.has_deployment_profile = true;

        assert!(query.matches(&template("centos", "dp-1", "")));
        assert!(!query.matches(&template("centos", "", "")));
        assert!(!query.matches(&template("ubuntu", "dp-1", "")));
    }

    #[test]
    fn test_template_query_vcenter_filter() {
        let query = TemplateQuery {
            display_name: "centos".to_string(),
            has_deployment_profile: false,
            vcenter: Some("vc01.example.com".to_string()),
        };

        assert!(query.matches(&template("centos", "", "vc01.example.com::TMP-1")));
        assert!(!query.matches(&template("centos", "", "vc02.example.com::TMP-1")));
    }

    #[test]
    fn test_policy_capacity_accepts_sentinel() {
        let policy: MarketPolicyApiDto = serde_json::from_str(
            r#"{"uuid":"p-1","displayName":"place-on-cluster","capacity":"Infinity","enabled":true}"#,
        )
        .unwrap();
        assert!(policy.capacity.is_unbounded());
        assert!(policy.enabled);
    }
}
