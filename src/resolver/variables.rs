/*!
 * Path Variables
 * The fixed set of symbolic directories usable at the head of a pattern
 */

use super::types::{ResolveError, ResolveResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

static GLOBAL: OnceLock<PathVariables> = OnceLock::new();

/// Symbolic directory names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathVariable {
    /// Per-application data directory
    AppData,
    /// User home directory
    Home,
    /// System temp directory
    Temp,
    /// Bundled resources shipped with the application
    Resource,
}

impl PathVariable {
    pub const ALL: [PathVariable; 4] = [
        PathVariable::AppData,
        PathVariable::Home,
        PathVariable::Temp,
        PathVariable::Resource,
    ];

    /// Token as written in patterns, e.g. `$APPDATA`
    pub fn token(self) -> &'static str {
        match self {
            PathVariable::AppData => "$APPDATA",
            PathVariable::Home => "$HOME",
            PathVariable::Temp => "$TEMP",
            PathVariable::Resource => "$RESOURCE",
        }
    }

    /// Parse a token with or without the leading `$`
    pub fn from_token(token: &str) -> Option<Self> {
        let name = token.strip_prefix('$').unwrap_or(token);
        Self::ALL
            .into_iter()
            .find(|v| v.token()[1..].eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for PathVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Resolved directory for every path variable
///
/// Built once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVariables {
    app_data: PathBuf,
    home: PathBuf,
    temp: PathBuf,
    resource: PathBuf,
}

impl PathVariables {
    /// Build from explicit directories
    pub fn from_parts(app_data: PathBuf, home: PathBuf, temp: PathBuf, resource: PathBuf) -> Self {
        Self {
            app_data,
            home,
            temp,
            resource,
        }
    }

    /// Detect directories for this OS and application identity
    pub fn detect(identifier: &str, resource_override: Option<PathBuf>) -> ResolveResult<Self> {
        let home = home_dir().ok_or_else(|| ResolveError::Unresolvable("$HOME".into()))?;
        let app_data = app_data_base(&home).join(identifier);
        let temp = std::env::temp_dir();
        let resource = match resource_override {
            Some(dir) => dir,
            None => std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
                .ok_or_else(|| ResolveError::Unresolvable("$RESOURCE".into()))?,
        };

        Ok(Self::from_parts(app_data, home, temp, resource))
    }

    /// Install the process-wide table; later calls return the first table unchanged
    pub fn init_global(variables: PathVariables) -> &'static PathVariables {
        let installed = GLOBAL.get_or_init(|| {
            info!(
                app_data = %variables.app_data.display(),
                home = %variables.home.display(),
                temp = %variables.temp.display(),
                resource = %variables.resource.display(),
                "Path variables resolved"
            );
            variables
        });
        installed
    }

    /// The process-wide table, if installed
    pub fn global() -> Option<&'static PathVariables> {
        GLOBAL.get()
    }

    /// Absolute directory for a variable
    pub fn resolve(&self, variable: PathVariable) -> &Path {
        match variable {
            PathVariable::AppData => &self.app_data,
            PathVariable::Home => &self.home,
            PathVariable::Temp => &self.temp,
            PathVariable::Resource => &self.resource,
        }
    }

    /// Substitute a leading variable in a pattern
    ///
    /// A `$` anywhere other than the first segment is rejected, as is an unknown name.
    pub fn expand(&self, pattern: &str) -> ResolveResult<String> {
        let (head, rest) = match pattern.find(['/', '\\']) {
            Some(idx) => pattern.split_at(idx),
            None => (pattern, ""),
        };

        if rest.contains('$') {
            return Err(ResolveError::invalid_pattern(
                pattern,
                "path variables are only allowed as the first segment",
            ));
        }

        if !head.starts_with('$') {
            if head.contains('$') {
                return Err(ResolveError::invalid_pattern(
                    pattern,
                    "path variables must make up the whole first segment",
                ));
            }
            return Ok(pattern.to_string());
        }

        let variable =
            PathVariable::from_token(head).ok_or_else(|| ResolveError::UnknownVariable(head.to_string()))?;
        let base = self.resolve(variable);
        let base = base
            .to_str()
            .ok_or_else(|| ResolveError::NotUtf8(base.to_path_buf()))?;

        Ok(format!("{}{}", base.trim_end_matches(['/', '\\']), rest))
    }

    /// Every resolved directory, in declaration order
    pub fn roots(&self) -> impl Iterator<Item = (PathVariable, &Path)> {
        PathVariable::ALL.into_iter().map(move |v| (v, self.resolve(v)))
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    let var = std::env::var_os("USERPROFILE");
    #[cfg(not(windows))]
    let var = std::env::var_os("HOME");

    var.filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(target_os = "macos")]
fn app_data_base(home: &Path) -> PathBuf {
    home.join("Library").join("Application Support")
}

#[cfg(windows)]
fn app_data_base(home: &Path) -> PathBuf {
    std::env::var_os("APPDATA")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join("AppData").join("Roaming"))
}

#[cfg(not(any(target_os = "macos", windows)))]
fn app_data_base(home: &Path) -> PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .unwrap_or_else(|| home.join(".local").join("share"))
}
