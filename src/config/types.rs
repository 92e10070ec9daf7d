/*!
 * Configuration Types
 */

use crate::resolver::ResolveError;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[must_use = "configuration errors should be handled"]
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum ConfigError {
    #[error("failed to read manifest {path:?}: {message}")]
    #[diagnostic(
        code(config::read),
        help("Set BRIDGE_MANIFEST to the application manifest, or remove it to run permissive.")
    )]
    Read { path: PathBuf, message: String },

    #[error("invalid manifest {path:?}: {message}")]
    #[diagnostic(
        code(config::parse),
        help("Only `fs`, `process` and `http` are accepted under `permissions`.")
    )]
    Parse { path: PathBuf, message: String },

    #[error("invalid application identifier {0:?}")]
    #[diagnostic(
        code(config::identifier),
        help("Use a non-empty reverse-DNS name such as com.example.app, without path separators.")
    )]
    InvalidIdentifier(String),

    #[error("invalid permission rule: {0}")]
    #[diagnostic(code(config::policy))]
    Policy(String),

    /// Path variables could not be resolved for this application
    #[error(transparent)]
    #[diagnostic(transparent)]
    Paths(#[from] ResolveError),

    #[error("invalid value {value:?} for {var}: {reason}")]
    #[diagnostic(code(config::env))]
    InvalidEnv {
        var: String,
        value: String,
        reason: String,
    },
}
