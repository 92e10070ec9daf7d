/*!
 * Application Manifest
 * Identity, resource location and declared permissions
 */

use super::types::{ConfigError, ConfigResult};
use crate::core::limits::DEFAULT_APP_IDENTIFIER;
use crate::permissions::{PermissionsConfig, Policy};
use crate::resolver::PathVariables;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Manifest as written by the application author
///
/// Keys other than the ones below are ignored at the top level; inside
/// `permissions` they are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppManifest {
    #[serde(default = "default_identifier")]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_dir: Option<PathBuf>,
    /// Absent selects permissive mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionsConfig>,
}

fn default_identifier() -> String {
    DEFAULT_APP_IDENTIFIER.to_string()
}

impl Default for AppManifest {
    fn default() -> Self {
        Self {
            identifier: default_identifier(),
            resource_dir: None,
            permissions: None,
        }
    }
}

impl AppManifest {
    pub fn from_json(path: &Path, text: &str) -> ConfigResult<Self> {
        let manifest: AppManifest = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read a manifest file; `Ok(None)` when it does not exist
    pub fn load(path: &Path) -> ConfigResult<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json(path, &text).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        let id = self.identifier.trim();
        if id.is_empty() || id != self.identifier || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(ConfigError::InvalidIdentifier(self.identifier.clone()));
        }
        Ok(())
    }

    pub fn is_permissive(&self) -> bool {
        self.permissions.is_none()
    }

    /// Resolve the path variables for this application
    pub fn path_variables(&self) -> ConfigResult<PathVariables> {
        Ok(PathVariables::detect(&self.identifier, self.resource_dir.clone())?)
    }

    /// Compile the declared permissions against `variables`
    pub fn compile_policy(&self, variables: &PathVariables) -> ConfigResult<Policy> {
        Policy::from_config(self.permissions.as_ref(), variables)
            .map_err(|e| ConfigError::Policy(e.to_string()))
    }
}
