/*!
 * Canonical Path Handling
 * Resolves symlinks and `.`/`..` segments once, before any pattern is consulted
 */

use super::types::{ResolveError, ResolveResult};
use std::io;
use std::path::{Component, Path, PathBuf};

/// A path whose every symlink and `.`/`..` segment has been resolved
///
/// Only constructible through canonicalization, so a matcher receiving one
/// can rely on the ordering "canonicalize, then match".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPath {
    canonical: PathBuf,
}

impl CanonicalPath {
    /// Canonicalize an existing path
    pub fn new(path: &Path) -> ResolveResult<Self> {
        canonicalize(path).map(|canonical| Self { canonical })
    }

    /// Canonicalize a path that may not exist yet (write targets)
    pub fn for_create(path: &Path) -> ResolveResult<Self> {
        canonicalize_for_create(path).map(|canonical| Self { canonical })
    }

    /// Place a possibly missing path under its deepest existing ancestor
    pub fn nearest(path: &Path) -> ResolveResult<Self> {
        canonicalize_nearest(path).map(|canonical| Self { canonical })
    }

    pub fn as_path(&self) -> &Path {
        &self.canonical
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.canonical
    }

    /// UTF-8 view with `/` separators, the form patterns are matched against
    pub fn to_match_string(&self) -> ResolveResult<String> {
        let text = self
            .canonical
            .to_str()
            .ok_or_else(|| ResolveError::NotUtf8(self.canonical.clone()))?;
        Ok(normalize_separators(text))
    }

}

/// Resolve every symlink and `.`/`..` segment of an absolute path
///
/// Fails with [`ResolveError::Missing`] naming the first component that does not exist.
pub fn canonicalize(path: &Path) -> ResolveResult<PathBuf> {
    if !path.is_absolute() {
        return Err(ResolveError::NotAbsolute(path.to_path_buf()));
    }

    match std::fs::canonicalize(path) {
        Ok(canonical) => Ok(strip_verbatim(canonical)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(missing_component(path)),
        Err(e) => Err(io_error(path, &e)),
    }
}

/// Canonicalize a path whose final component may not exist yet
///
/// The parent must resolve. If the full path already exists (including as a
/// dangling or live symlink) it is resolved fully instead, so a pre-planted
/// link cannot redirect the write.
pub fn canonicalize_for_create(path: &Path) -> ResolveResult<PathBuf> {
    if !path.is_absolute() {
        return Err(ResolveError::NotAbsolute(path.to_path_buf()));
    }

    if path.symlink_metadata().is_ok() {
        return canonicalize(path);
    }

    let file_name = match path.components().next_back() {
        Some(Component::Normal(name)) => name.to_os_string(),
        _ => return Err(ResolveError::InvalidFileName(path.to_path_buf())),
    };
    let parent = path
        .parent()
        .ok_or_else(|| ResolveError::InvalidFileName(path.to_path_buf()))?;

    Ok(canonicalize(parent)?.join(file_name))
}

/// Canonicalize the deepest existing ancestor and re-attach the missing tail
///
/// The path is never cleaned lexically: `..` must be resolved by the
/// filesystem against a real (possibly symlinked) directory. A `..` that
/// falls in the missing tail cannot be placed and is rejected.
pub fn canonicalize_nearest(path: &Path) -> ResolveResult<PathBuf> {
    if !path.is_absolute() {
        return Err(ResolveError::NotAbsolute(path.to_path_buf()));
    }

    let mut tail = Vec::new();
    let mut current = path;
    loop {
        match canonicalize(current) {
            Ok(mut base) => {
                base.extend(tail.iter().rev());
                return Ok(base);
            }
            Err(ResolveError::Missing { .. }) => {
                let mut components = current.components();
                match components.next_back() {
                    Some(Component::Normal(name)) => tail.push(name.to_os_string()),
                    _ => return Err(ResolveError::InvalidFileName(path.to_path_buf())),
                }
                current = components.as_path();
            }
            Err(e) => return Err(e),
        }
    }
}

/// Best-effort canonicalization used for pattern prefixes
///
/// Falls back to the input when the directory does not exist yet.
pub(crate) fn canonicalize_lossy(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .map(strip_verbatim)
        .unwrap_or_else(|_| path.to_path_buf())
}

pub(crate) fn normalize_separators(text: &str) -> String {
    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text.to_string()
    }
}

/// Walk the path lexically and report the first component that cannot be stat'ed
fn missing_component(path: &Path) -> ResolveError {
    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        if matches!(component, Component::Prefix(_) | Component::RootDir) {
            continue;
        }
        if current.symlink_metadata().is_err() {
            return ResolveError::Missing {
                path: path.to_path_buf(),
                component: current,
            };
        }
    }
    // Every lexical prefix exists, so a symlink along the way dangles.
    ResolveError::Missing {
        path: path.to_path_buf(),
        component: path.to_path_buf(),
    }
}

fn io_error(path: &Path, e: &io::Error) -> ResolveError {
    ResolveError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

#[cfg(windows)]
fn strip_verbatim(path: PathBuf) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix(r"\\?\")) {
        Some(stripped) if !stripped.starts_with("UNC") => PathBuf::from(stripped),
        _ => path,
    }
}

#[cfg(not(windows))]
fn strip_verbatim(path: PathBuf) -> PathBuf {
    path
}
