/*!
 * Policy Module
 * Compiled, immutable rule sets evaluated against canonical targets
 *
 * A policy is built once from the manifest and shared as `Arc<Policy>`.
 * Every filesystem check canonicalizes first and matches second, in both
 * modes; there is no way to match a raw path.
 */

mod fs;
mod network;
mod process;

use crate::permissions::config::PermissionsConfig;
use crate::permissions::types::{Denial, FsAction, PermissionResult};
use crate::resolver::{CanonicalPath, CanonicalUrl, PathVariables, ResolveError, ResolveResult};
use fs::FsRules;
use network::NetRules;
use process::ExecRules;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which rule sets are in force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// No `permissions` section was declared
    Permissive,
    /// Declared rule sets only; anything undeclared is denied
    Restricted,
}

#[derive(Debug, Clone)]
pub struct Policy {
    mode: PolicyMode,
    fs: FsRules,
    exec: ExecRules,
    net: NetRules,
}

impl Policy {
    /// Compile the manifest section; `None` selects permissive mode
    pub fn from_config(
        config: Option<&PermissionsConfig>,
        variables: &PathVariables,
    ) -> ResolveResult<Self> {
        match config {
            Some(config) => Self::restricted(config, variables),
            None => Self::permissive(variables),
        }
    }

    /// Filesystem confined to the path-variable roots; process and network open
    pub fn permissive(variables: &PathVariables) -> ResolveResult<Self> {
        Ok(Self {
            mode: PolicyMode::Permissive,
            fs: FsRules::implicit(variables)?,
            exec: ExecRules::default(),
            net: NetRules::default(),
        })
    }

    pub fn restricted(config: &PermissionsConfig, variables: &PathVariables) -> ResolveResult<Self> {
        Ok(Self {
            mode: PolicyMode::Restricted,
            fs: FsRules::compile(config.fs.as_ref(), variables)?,
            exec: ExecRules::compile(config.process.as_ref())?,
            net: NetRules::compile(config.http.as_ref())?,
        })
    }

    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    pub fn is_permissive(&self) -> bool {
        self.mode == PolicyMode::Permissive
    }

    /// Authorize a filesystem action
    ///
    /// Reads require the target to exist. Writes may name a new file whose
    /// parent exists. The returned path is the one the caller must touch.
    pub fn check_fs(&self, action: FsAction, path: &Path) -> PermissionResult<CanonicalPath> {
        let target = path.display().to_string();
        let canonical = match action {
            FsAction::Read => CanonicalPath::new(path),
            FsAction::Write => CanonicalPath::for_create(path),
        }
        .map_err(|e| Denial::unresolvable(&target, &e))?;

        self.fs.authorize(action, &canonical, &target)?;
        Ok(canonical)
    }

    /// Authorize an existence check
    ///
    /// `Ok(None)` means the target is missing but would fall inside the read
    /// rules, so the caller may report "does not exist". A missing target
    /// outside the rules is denied like any other read.
    pub fn check_fs_exists(&self, path: &Path) -> PermissionResult<Option<CanonicalPath>> {
        let target = path.display().to_string();
        match CanonicalPath::new(path) {
            Ok(canonical) => {
                self.fs.authorize(FsAction::Read, &canonical, &target)?;
                Ok(Some(canonical))
            }
            Err(ResolveError::Missing { .. }) => {
                let placed = CanonicalPath::nearest(path).map_err(|e| Denial::unresolvable(&target, &e))?;
                self.fs.authorize(FsAction::Read, &placed, &target)?;
                Ok(None)
            }
            Err(e) => Err(Denial::unresolvable(&target, &e)),
        }
    }

    pub fn check_process(&self, command: &str, args: &[String]) -> PermissionResult<()> {
        match self.mode {
            PolicyMode::Permissive => Ok(()),
            PolicyMode::Restricted => self.exec.check(command, args),
        }
    }

    /// Authorize an outbound request; the parsed URL is what gets fetched
    pub fn check_net(&self, url: &str) -> PermissionResult<CanonicalUrl> {
        let canonical = CanonicalUrl::parse(url).map_err(|e| Denial::unresolvable(url, &e))?;
        if self.mode == PolicyMode::Restricted {
            self.net.check(&canonical)?;
        }
        Ok(canonical)
    }
}
