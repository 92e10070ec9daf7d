/*!
 * Runtime Configuration
 * Environment-driven settings for the host process
 *
 * Environment variables:
 * - BRIDGE_MANIFEST: manifest path (default: ./app.json)
 * - BRIDGE_HTTP_TIMEOUT_MS: http.fetch deadline
 * - BRIDGE_PROCESS_TIMEOUT_MS: process.exec deadline
 */

use super::manifest::AppManifest;
use super::types::{ConfigError, ConfigResult};
use crate::core::limits::{STANDARD_HTTP_TIMEOUT, STANDARD_PROCESS_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const ENV_MANIFEST: &str = "BRIDGE_MANIFEST";
pub const ENV_HTTP_TIMEOUT: &str = "BRIDGE_HTTP_TIMEOUT_MS";
pub const ENV_PROCESS_TIMEOUT: &str = "BRIDGE_PROCESS_TIMEOUT_MS";

const DEFAULT_MANIFEST: &str = "app.json";

/// Deadlines enforced by the handlers themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerTimeouts {
    pub http: Duration,
    pub process: Duration,
}

impl Default for HandlerTimeouts {
    fn default() -> Self {
        Self {
            http: STANDARD_HTTP_TIMEOUT,
            process: STANDARD_PROCESS_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub manifest_path: PathBuf,
    pub manifest: AppManifest,
    /// False when the manifest file did not exist and defaults were used
    pub manifest_found: bool,
    pub timeouts: HandlerTimeouts,
}

impl RuntimeConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let manifest_path = lookup(ENV_MANIFEST)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));

        let (manifest, manifest_found) = match AppManifest::load(&manifest_path)? {
            Some(manifest) => (manifest, true),
            None => (AppManifest::default(), false),
        };

        let mut timeouts = HandlerTimeouts::default();
        if let Some(ms) = parse_millis(&lookup, ENV_HTTP_TIMEOUT)? {
            timeouts.http = ms;
        }
        if let Some(ms) = parse_millis(&lookup, ENV_PROCESS_TIMEOUT)? {
            timeouts.process = ms;
        }

        info!(
            manifest = %manifest_path.display(),
            found = manifest_found,
            identifier = %manifest.identifier,
            permissive = manifest.is_permissive(),
            "Runtime configuration loaded"
        );

        Ok(Self {
            manifest_path,
            manifest,
            manifest_found,
            timeouts,
        })
    }
}

fn parse_millis<F>(lookup: &F, var: &str) -> ConfigResult<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnv {
            var: var.to_string(),
            value,
            reason: "must be greater than zero".into(),
        }),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
        Err(e) => Err(ConfigError::InvalidEnv {
            var: var.to_string(),
            value,
            reason: e.to_string(),
        }),
    }
}
