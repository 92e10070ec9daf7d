/*!
 * Error Types
 * Top-level error for the host process, with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::bridge::CallError;
pub use crate::config::ConfigError;
pub use crate::resolver::ResolveError;
pub use crate::router::{HandlerError, RouterError};

/// Anything that can stop the host from starting or serving
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum BridgeError {
    #[error(transparent)]
    #[diagnostic(code(bridge::config))]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(
        code(bridge::resolve),
        help("Path variables are resolved once at startup; check HOME and the resource directory.")
    )]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(code(bridge::router))]
    Router(#[from] RouterError),

    #[error("Runtime failure: {0}")]
    #[diagnostic(code(bridge::runtime))]
    Runtime(String),
}

/// Result type for host-level operations
#[must_use = "this `Result` may be an error, which should be handled"]
pub type BridgeResult<T> = Result<T, BridgeError>;
