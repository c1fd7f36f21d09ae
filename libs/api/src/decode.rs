//! Entry points for decoding response bodies.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::DecodeError;
use crate::stat::StatApiDto;

/// Decode a response body into `T`.
///
/// `what` names the object for the error message.
pub fn decode<T: DeserializeOwned>(what: &'static str, body: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(body).map_err(|source| DecodeError::new(what, source))
}

/// Decode a single statistic record.
///
/// Fails only when the body is not a JSON object; missing or wrong-typed
/// fields inside it degrade to their zero values.
pub fn decode_stat(body: &[u8]) -> Result<StatApiDto, DecodeError> {
    decode("stat", body)
}

/// Treat an explicit `null` the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
