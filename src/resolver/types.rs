/*!
 * Resolver Types
 * Errors produced while expanding, canonicalizing and compiling patterns
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Resolver operation result
///
/// # Must Use
/// A failed canonicalization means the target must not be authorized
#[must_use = "resolver failures must be treated as denials"]
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors from path variable resolution, canonicalization and pattern compilation
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum ResolveError {
    #[error("path is not absolute: {0}")]
    #[diagnostic(
        code(resolver::not_absolute),
        help("Use an absolute path or a path variable such as $APPDATA.")
    )]
    NotAbsolute(PathBuf),

    #[error("path component {component:?} of {path:?} does not exist")]
    #[diagnostic(code(resolver::missing_component))]
    Missing { path: PathBuf, component: PathBuf },

    #[error("path is not valid UTF-8: {0:?}")]
    #[diagnostic(code(resolver::not_utf8))]
    NotUtf8(PathBuf),

    #[error("invalid file name in {0:?}")]
    #[diagnostic(
        code(resolver::invalid_file_name),
        help("The last component of a new file must be a plain name, not '.' or '..'.")
    )]
    InvalidFileName(PathBuf),

    #[error("unknown path variable {0}")]
    #[diagnostic(
        code(resolver::unknown_variable),
        help("Known variables: $APPDATA, $HOME, $TEMP, $RESOURCE.")
    )]
    UnknownVariable(String),

    #[error("invalid pattern {pattern:?}: {reason}")]
    #[diagnostic(code(resolver::invalid_pattern))]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid url {url:?}: {reason}")]
    #[diagnostic(code(resolver::invalid_url))]
    InvalidUrl { url: String, reason: String },

    #[error("cannot determine directory for {0}")]
    #[diagnostic(
        code(resolver::unresolvable_variable),
        help("Set HOME (or USERPROFILE on Windows) for the host process.")
    )]
    Unresolvable(String),

    #[error("I/O error on {path:?}: {message}")]
    #[diagnostic(code(resolver::io))]
    Io { path: PathBuf, message: String },
}

impl ResolveError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
