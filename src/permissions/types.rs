/*!
 * Permission Types
 * Requests, rule-set names and structured denials
 */

use crate::resolver::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;

/// Result of an authorization check
///
/// `Ok` carries the canonical form of the target the caller must operate on.
#[must_use = "an unchecked permission result authorizes nothing"]
pub type PermissionResult<T> = Result<T, Denial>;

/// Filesystem action being authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsAction {
    Read,
    Write,
}

impl fmt::Display for FsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsAction::Read => f.write_str("read"),
            FsAction::Write => f.write_str("write"),
        }
    }
}

/// The rule set consulted for a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    FsRead,
    FsWrite,
    ProcessExec,
    HttpAllow,
    HttpDeny,
    /// The target could not be canonicalized, so no rule set was reached
    Canonicalize,
}

impl RuleSet {
    pub fn for_fs(action: FsAction) -> Self {
        match action {
            FsAction::Read => RuleSet::FsRead,
            FsAction::Write => RuleSet::FsWrite,
        }
    }

    /// Dotted name as it appears under `permissions` in the manifest
    pub fn as_str(self) -> &'static str {
        match self {
            RuleSet::FsRead => "fs.read",
            RuleSet::FsWrite => "fs.write",
            RuleSet::ProcessExec => "process.exec",
            RuleSet::HttpAllow => "http.allow",
            RuleSet::HttpDeny => "http.deny",
            RuleSet::Canonicalize => "canonicalize",
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured reason for a rejected target
///
/// The reason is informational. Callers surface it and stop; it is never an
/// instruction for reaching the same target through another route.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("permission denied ({category}): {reason}")]
pub struct Denial {
    pub category: RuleSet,
    pub target: String,
    pub reason: String,
}

impl Denial {
    pub fn new(category: RuleSet, target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            category,
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Denial for a target that failed canonicalization or parsing
    pub fn unresolvable(target: impl Into<String>, err: &ResolveError) -> Self {
        Self::new(
            RuleSet::Canonicalize,
            target,
            format!("{}; a target must resolve before any rule is consulted", err),
        )
    }
}

/// Target being authorized
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Resource {
    File { action: FsAction, path: PathBuf },
    Process { command: String, args: Vec<String> },
    Network { url: String },
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::File { action, path } => write!(f, "fs.{} {}", action, path.display()),
            Resource::Process { command, args } => write!(f, "exec {} {:?}", command, args),
            Resource::Network { url } => write!(f, "http {}", url),
        }
    }
}

/// Permission request as recorded in the audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRequest {
    pub resource: Resource,
    pub timestamp: SystemTime,
}

impl PermissionRequest {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            timestamp: SystemTime::now(),
        }
    }

    pub fn file(action: FsAction, path: impl Into<PathBuf>) -> Self {
        Self::new(Resource::File {
            action,
            path: path.into(),
        })
    }

    pub fn exec(command: impl Into<String>, args: &[String]) -> Self {
        Self::new(Resource::Process {
            command: command.into(),
            args: args.to_vec(),
        })
    }

    pub fn net(url: impl Into<String>) -> Self {
        Self::new(Resource::Network { url: url.into() })
    }
}
