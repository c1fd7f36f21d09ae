//! Shared object shapes used across API resources.

use serde::{Deserialize, Serialize};

use crate::stat::StatApiDto;

/// Class names the API uses for entities and templates.
pub const CLASS_NAME_PHYSICAL_MACHINE: &str = "PhysicalMachine";
pub const CLASS_NAME_STORAGE: &str = "Storage";
pub const CLASS_NAME_VIRTUAL_MACHINE: &str = "VirtualMachine";

/// `type` tag of a [`ResourceApiDto`] describing a storage resource.
pub const RESOURCE_TYPE_DISK: &str = "disk";

/// Generic object identifier block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaseApiDto {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uuid: String,
}

impl BaseApiDto {
    pub fn new(uuid: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            display_name: display_name.into(),
            ..Self::default()
        }
    }
}

/// HAL-style link attached to most objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub href: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rel: String,
    pub templated: bool,
}

/// Name/value pair used by deployment profile parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

/// A provider together with the statistics it exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceApiDto {
    pub provider: BaseApiDto,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stats: Vec<StatApiDto>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub template: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
}

impl ResourceApiDto {
    /// Look up a statistic by name.
    pub fn stat(&self, name: &str) -> Option<&StatApiDto> {
        self.stats.iter().find(|stat| stat.name == name)
    }
}
