/*!
 * Router Types
 * Handler outcomes and router failures
 */

use crate::permissions::Denial;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Outcome of one handler invocation
#[must_use = "handler results must be delivered"]
pub type HandlerResult = Result<Value, HandlerError>;

/// Router operation result
#[must_use = "router errors should be handled"]
pub type RouterResult<T> = Result<T, RouterError>;

/// Failure reported by a capability handler
///
/// Every variant reaches the caller only as a message string.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum HandlerError {
    #[error(transparent)]
    #[diagnostic(code(handler::permission_denied))]
    PermissionDenied(#[from] Denial),

    #[error("invalid params: {0}")]
    #[diagnostic(code(handler::invalid_params))]
    InvalidParams(String),

    #[error("{0}")]
    #[diagnostic(code(handler::failed))]
    Failed(String),

    #[error("{operation} timed out after {after_ms}ms")]
    #[diagnostic(
        code(handler::timeout),
        help("Raise BRIDGE_HTTP_TIMEOUT_MS or BRIDGE_PROCESS_TIMEOUT_MS if the operation is expected to be slow.")
    )]
    Timeout { operation: String, after_ms: u64 },
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        HandlerError::InvalidParams(message.into())
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        HandlerError::Failed(err.to_string())
    }
}

/// Errors from envelope decoding, registration and transport I/O
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum RouterError {
    #[error("decode error: {0}")]
    #[diagnostic(
        code(router::decode),
        help("Envelopes are single-line JSON objects: {{\"id\", \"method\", \"params\"}}.")
    )]
    Decode(String),

    #[error("encode error: {0}")]
    #[diagnostic(code(router::encode))]
    Encode(String),

    #[error("invalid method name {0:?}: expected namespace.verb")]
    #[diagnostic(code(router::invalid_method))]
    InvalidMethod(String),

    #[error("method {0} is already registered")]
    #[diagnostic(code(router::duplicate_method))]
    DuplicateMethod(String),

    #[error("outbound channel closed")]
    #[diagnostic(code(router::closed))]
    Closed,

    #[error("I/O error: {0}")]
    #[diagnostic(code(router::io))]
    Io(String),
}

impl From<std::io::Error> for RouterError {
    fn from(err: std::io::Error) -> Self {
        RouterError::Io(err.to_string())
    }
}
