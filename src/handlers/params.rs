/*!
 * Parameter Decoding
 */

use crate::router::HandlerError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode handler params into a typed struct
pub(crate) fn parse<T: DeserializeOwned>(params: Value) -> Result<T, HandlerError> {
    serde_json::from_value(params).map_err(|e| HandlerError::invalid_params(e.to_string()))
}

/// Serialize a handler result
pub(crate) fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, HandlerError> {
    serde_json::to_value(value).map_err(|e| HandlerError::failed(e.to_string()))
}
