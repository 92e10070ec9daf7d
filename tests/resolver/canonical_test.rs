/*!
 * Canonicalization Tests
 */

use host_bridge::resolver::{canonicalize, canonicalize_for_create, canonicalize_nearest};
use host_bridge::{CanonicalPath, GlobPattern, PathVariables, ResolveError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn root() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let base = fs::canonicalize(dir.path()).unwrap();
    (dir, base)
}

#[test]
fn test_dot_dot_resolved_before_matching() {
    let (_dir, base) = root();
    fs::create_dir_all(base.join("allowed")).unwrap();
    fs::write(base.join("secret.txt"), "s").unwrap();

    let sneaky = base.join("allowed/../secret.txt");
    let canonical = CanonicalPath::new(&sneaky).unwrap();
    assert_eq!(canonical.as_path(), base.join("secret.txt"));

    let rule = GlobPattern::new(&format!("{}/allowed/**", base.display())).unwrap();
    assert!(!rule.matches_path(&canonical));
}

#[test]
fn test_missing_component_reported() {
    let (_dir, base) = root();
    let err = canonicalize(&base.join("nope/file.txt")).unwrap_err();
    match err {
        ResolveError::Missing { component, .. } => assert_eq!(component, base.join("nope")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_relative_rejected() {
    assert!(matches!(
        canonicalize(std::path::Path::new("relative/file")),
        Err(ResolveError::NotAbsolute(_))
    ));
}

#[test]
fn test_create_target_needs_parent() {
    let (_dir, base) = root();
    assert_eq!(
        canonicalize_for_create(&base.join("new.txt")).unwrap(),
        base.join("new.txt")
    );
    assert!(canonicalize_for_create(&base.join("missing/new.txt")).is_err());
}

#[test]
fn test_nearest_reattaches_tail() {
    let (_dir, base) = root();
    let placed = canonicalize_nearest(&base.join("a/b/c.txt")).unwrap();
    assert_eq!(placed, base.join("a/b/c.txt"));

    // `..` inside the missing part has no directory to resolve against
    assert!(canonicalize_nearest(&base.join("a/b/../c.txt")).is_err());
}

#[cfg(unix)]
#[test]
fn test_symlink_resolved_to_target() {
    let (_dir, base) = root();
    fs::create_dir_all(base.join("inside")).unwrap();
    fs::create_dir_all(base.join("outside")).unwrap();
    fs::write(base.join("outside/data.txt"), "x").unwrap();
    std::os::unix::fs::symlink(base.join("outside"), base.join("inside/link")).unwrap();

    let canonical = CanonicalPath::new(&base.join("inside/link/data.txt")).unwrap();
    assert_eq!(canonical.as_path(), base.join("outside/data.txt"));
    assert!(!canonical.as_path().starts_with(base.join("inside")));
}

#[cfg(unix)]
#[test]
fn test_pattern_prefix_follows_symlinked_root() {
    let (_dir, base) = root();
    fs::create_dir_all(base.join("real/docs")).unwrap();
    std::os::unix::fs::symlink(base.join("real"), base.join("alias")).unwrap();
    fs::write(base.join("real/docs/a.txt"), "a").unwrap();

    let variables = PathVariables::from_parts(
        base.join("alias"),
        base.join("alias"),
        base.join("alias"),
        base.join("alias"),
    );
    let pattern = GlobPattern::for_path("$HOME/docs/**", &variables).unwrap();
    let request = CanonicalPath::new(&base.join("alias/docs/a.txt")).unwrap();
    assert!(pattern.matches_path(&request));
}

#[cfg(unix)]
#[test]
fn test_create_through_planted_link_resolves_link() {
    let (_dir, base) = root();
    fs::create_dir_all(base.join("outside")).unwrap();
    std::os::unix::fs::symlink(base.join("outside/target.txt"), base.join("planted.txt")).unwrap();

    // Dangling link: resolving it fails rather than writing through it blindly
    assert!(canonicalize_for_create(&base.join("planted.txt")).is_err());

    fs::write(base.join("outside/target.txt"), "t").unwrap();
    assert_eq!(
        canonicalize_for_create(&base.join("planted.txt")).unwrap(),
        base.join("outside/target.txt")
    );
}
