/*!
 * Bridge Types
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[must_use = "a call result carries the remote outcome"]
pub type CallResult<T> = Result<T, CallError>;

/// Why a call did not produce a value
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum CallError {
    /// The native side answered with an error message
    #[error("{0}")]
    #[diagnostic(code(bridge::remote))]
    Remote(String),

    #[error("call to {method} timed out after {after_ms}ms")]
    #[diagnostic(
        code(bridge::timeout),
        help("The native handler keeps running; its late result is ignored.")
    )]
    Timeout { method: String, after_ms: u64 },

    #[error("transport failed: {0}")]
    #[diagnostic(code(bridge::transport))]
    Transport(String),

    /// Rejected before sending; the router could not have correlated a reply
    #[error("invalid call: {0}")]
    #[diagnostic(code(bridge::invalid_call))]
    Invalid(String),

    #[error("bridge closed before a reply arrived")]
    #[diagnostic(code(bridge::closed))]
    Closed,
}

/// What `receive` did with one inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// Settled a pending call
    Resolved,
    /// Carried an id with no pending call (late reply to an abandoned call)
    Stale,
    /// Reply with an empty id, e.g. to an envelope the router could not decode
    Uncorrelated,
    /// Push event delivered to this many listeners
    Event(usize),
    /// Neither a reply nor an event
    Ignored,
    /// Not valid JSON
    Malformed,
}
