//! Statistic records and the resilient decode of their `value` field.
//!
//! The stats endpoints return `value` as a JSON number in most cases, but an
//! unbounded measurement (e.g. the capacity of an unlimited commodity) comes
//! back as the string `"Infinity"`. A derived, strictly typed decode rejects
//! the whole record when that happens, so [`StatApiDto`] is decoded in three
//! passes over an untyped [`Value`]:
//!
//! 1. nested objects (capacity, reserved, values, filters, links, related
//!    entity) through their typed shapes;
//! 2. plain scalars through key lookup, falling back to the zero value;
//! 3. `value` through [`StatValue::from_json`], which inspects the JSON kind
//!    before committing to a number.

use std::fmt;

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::decode::null_as_default;
use crate::types::{BaseApiDto, Link};

/// Wire sentinel used by the API for positive infinity.
pub const VALUE_INFINITY: &str = "Infinity";

/// A decoded numeric measurement.
///
/// Defaults to zero and can hold positive infinity, which is written back
/// out as the [`VALUE_INFINITY`] sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct StatValue(f64);

impl StatValue {
    pub const ZERO: Self = Self(0.0);
    pub const UNBOUNDED: Self = Self(f64::INFINITY);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Returns true if the measurement is the unbounded sentinel.
    pub fn is_unbounded(self) -> bool {
        self.0 == f64::INFINITY
    }

    /// Normalize an untyped JSON slot into a measurement.
    ///
    /// Numbers are taken verbatim and `"Infinity"` becomes positive infinity.
    /// Any other string, `null`, a missing key or any other JSON kind yields
    /// zero.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(number)) => number.as_f64().map(Self).unwrap_or_default(),
            Some(Value::String(text)) if text == VALUE_INFINITY => Self::UNBOUNDED,
            _ => Self::ZERO,
        }
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<StatValue> for f64 {
    fn from(value: StatValue) -> Self {
        value.0
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            f.write_str(VALUE_INFINITY)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for StatValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_unbounded() {
            serializer.serialize_str(VALUE_INFINITY)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for StatValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_json(Some(&raw)))
    }
}

/// Aggregates of a statistic over its sampling window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatValueApiDto {
    pub avg: StatValue,
    pub max: StatValue,
    pub min: StatValue,
    pub total: StatValue,
}

/// Filter that scoped a statistic query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatFilterApiDto {
    #[serde(rename = "type")]
    pub filter_type: String,
    pub value: String,
}

/// A single statistic as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatApiDto {
    pub capacity: StatValueApiDto,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<StatFilterApiDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub num_related_entities: u64,
    pub related_entity: BaseApiDto,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub related_entity_type: String,
    pub reserved: StatValueApiDto,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub units: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    pub value: StatValue,
    pub values: StatValueApiDto,
}

impl StatApiDto {
    /// Convenience constructor for a named measurement.
    pub fn named(name: impl Into<String>, value: impl Into<StatValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }
}

/// Pass 1: the structurally typed sub-objects. An explicit `null` reads as
/// absent.
#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NestedFields {
    #[serde(deserialize_with = "null_as_default")]
    capacity: StatValueApiDto,
    #[serde(deserialize_with = "null_as_default")]
    filters: Vec<StatFilterApiDto>,
    #[serde(deserialize_with = "null_as_default")]
    links: Vec<Link>,
    #[serde(deserialize_with = "null_as_default")]
    related_entity: BaseApiDto,
    #[serde(deserialize_with = "null_as_default")]
    reserved: StatValueApiDto,
    #[serde(deserialize_with = "null_as_default")]
    values: StatValueApiDto,
}

impl<'de> Deserialize<'de> for StatApiDto {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let Some(fields) = raw.as_object() else {
            return Err(de::Error::invalid_type(
                Unexpected::Other(json_kind(&raw)),
                &"a stat object",
            ));
        };

        let nested = NestedFields::deserialize(&raw).map_err(de::Error::custom)?;

        Ok(Self {
            capacity: nested.capacity,
            filters: nested.filters,
            links: nested.links,
            related_entity: nested.related_entity,
            reserved: nested.reserved,
            values: nested.values,

            class_name: string_field(fields, "className"),
            display_name: string_field(fields, "displayName"),
            name: string_field(fields, "name"),
            num_related_entities: fields
                .get("numRelatedEntities")
                .and_then(Value::as_u64)
                .unwrap_or_default(),
            related_entity_type: string_field(fields, "relatedEntityType"),
            units: string_field(fields, "units"),
            uuid: string_field(fields, "uuid"),

            value: StatValue::from_json(fields.get("value")),
        })
    }
}

/// Pass 2 helper: a string scalar, or empty when absent or not a string.
fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
