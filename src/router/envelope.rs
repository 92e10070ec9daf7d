/*!
 * Envelopes
 * Wire shapes crossing the trust boundary, one JSON object per line
 *
 * - Call:   `{"id": "...", "method": "namespace.verb", "params": {...}}`
 * - Result: `{"id": "...", "result": ...}` or `{"id": "...", "error": "..."}`
 * - Event:  `{"event": "...", "data": ...}`
 */

use super::types::{RouterError, RouterResult};
use crate::core::json;
use crate::core::limits::MAX_ENVELOPE_BYTES;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inbound request from the untrusted side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEnvelope {
    pub id: String,
    pub method: String,
    pub params: Value,
}

#[derive(Deserialize)]
struct RawCall {
    id: String,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

impl CallEnvelope {
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Value) -> Self {
        Self {
            id: id.into(),
            method: method.into(),
            params,
        }
    }

    /// Decode one line
    ///
    /// Missing or null `params` becomes `{}`; anything else that is not an
    /// object is rejected, as is a method that is not `namespace.verb`.
    pub fn decode(raw: &[u8]) -> RouterResult<Self> {
        if raw.len() > MAX_ENVELOPE_BYTES {
            return Err(RouterError::Decode(format!(
                "envelope of {} bytes exceeds the {} byte limit",
                raw.len(),
                MAX_ENVELOPE_BYTES
            )));
        }

        let call: RawCall = json::from_slice(raw).map_err(|e| RouterError::Decode(e.to_string()))?;
        validate_method(&call.method).map_err(|e| RouterError::Decode(e.to_string()))?;

        let params = match call.params {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(obj @ Value::Object(_)) => obj,
            Some(other) => {
                return Err(RouterError::Decode(format!(
                    "params must be an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(Self {
            id: call.id,
            method: call.method,
            params,
        })
    }

    pub fn encode(&self) -> RouterResult<String> {
        json::to_string(self).map_err(|e| RouterError::Encode(e.to_string()))
    }

    pub fn namespace(&self) -> &str {
        self.method.split_once('.').map(|(ns, _)| ns).unwrap_or(&self.method)
    }
}

/// Reply correlated to a call by id; exactly one of `result`/`error` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultEnvelope {
    /// Success; `Value::Null` is a valid payload and is still written out
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: id.into(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            result: None,
            error: Some(error.into()),
        }
    }

    /// Reply to an envelope that could not be decoded
    pub fn decode_error(err: &RouterError) -> Self {
        Self::failure(String::new(), err.to_string())
    }

    pub fn unknown_method(id: impl Into<String>, method: &str) -> Self {
        Self::failure(id, format!("unknown method: {}", method))
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn encode(&self) -> RouterResult<String> {
        json::to_string(self).map_err(|e| RouterError::Encode(e.to_string()))
    }
}

/// Unsolicited native-to-untrusted notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    pub event: String,
    pub data: Value,
}

impl PushEvent {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn encode(&self) -> RouterResult<String> {
        json::to_string(self).map_err(|e| RouterError::Encode(e.to_string()))
    }
}

/// Accept exactly `namespace.verb` with both parts non-empty
pub fn validate_method(method: &str) -> RouterResult<()> {
    match method.split_once('.') {
        Some((ns, verb)) if !ns.is_empty() && !verb.is_empty() && !verb.contains('.') => Ok(()),
        _ => Err(RouterError::InvalidMethod(method.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
