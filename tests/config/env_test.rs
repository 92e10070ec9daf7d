/*!
 * Environment Configuration Tests
 * These mutate process environment, so they run serially
 */

use host_bridge::config::runtime::{ENV_HTTP_TIMEOUT, ENV_MANIFEST, ENV_PROCESS_TIMEOUT};
use host_bridge::{AppManifest, ConfigError, PathVariable, PolicyMode, RuntimeConfig};
use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;

struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn set(pairs: &[(&'static str, &str)]) -> Self {
        let saved = pairs
            .iter()
            .map(|(key, value)| {
                let old = env::var(key).ok();
                env::set_var(key, value);
                (*key, old)
            })
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.saved {
            match old {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn test_from_env_reads_manifest_and_timeouts() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("bridge.json");
    fs::write(
        &manifest,
        r#"{"identifier": "com.example.notes", "permissions": {"fs": {"read": ["$HOME/**"]}}}"#,
    )
    .unwrap();
    let manifest_path = manifest.display().to_string();

    let _env = EnvGuard::set(&[
        (ENV_MANIFEST, manifest_path.as_str()),
        (ENV_HTTP_TIMEOUT, "1500"),
        (ENV_PROCESS_TIMEOUT, "250"),
    ]);
    let config = RuntimeConfig::from_env().unwrap();

    assert!(config.manifest_found);
    assert_eq!(config.manifest.identifier, "com.example.notes");
    assert_eq!(config.timeouts.http, Duration::from_millis(1500));
    assert_eq!(config.timeouts.process, Duration::from_millis(250));
}

#[test]
#[serial]
fn test_from_env_rejects_bad_timeout() {
    let _env = EnvGuard::set(&[(ENV_MANIFEST, "/nonexistent/bridge.json"), (ENV_HTTP_TIMEOUT, "soon")]);
    let err = RuntimeConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnv { ref var, .. } if var == ENV_HTTP_TIMEOUT));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_detected_variables_follow_home() {
    let dir = tempfile::tempdir().unwrap();
    let home = fs::canonicalize(dir.path()).unwrap();
    let home_text = home.display().to_string();
    let _env = EnvGuard::set(&[("HOME", home_text.as_str()), ("XDG_DATA_HOME", "")]);

    let manifest = AppManifest::from_json(
        std::path::Path::new("bridge.json"),
        r#"{"identifier": "com.example.notes", "resourceDir": "/opt/notes"}"#,
    )
    .unwrap();
    let variables = manifest.path_variables().unwrap();

    assert_eq!(variables.resolve(PathVariable::Home), home);
    assert_eq!(variables.resolve(PathVariable::Resource), std::path::Path::new("/opt/notes"));
    assert!(variables
        .resolve(PathVariable::AppData)
        .starts_with(&home));
    assert!(variables
        .resolve(PathVariable::AppData)
        .ends_with("com.example.notes"));

    let policy = manifest.compile_policy(&variables).unwrap();
    assert_eq!(policy.mode(), PolicyMode::Permissive);
}
