/*!
 * Filesystem Policy Tests
 */

use crate::support::Sandbox;
use host_bridge::{FsAction, RuleSet};
use proptest::prelude::*;

const DOCS_READ: &str = r#"{"fs": {"read": ["$HOME/docs/**"], "write": ["$APPDATA/**"]}}"#;

#[test]
fn test_restricted_read_inside_pattern() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("home/docs/a/notes.txt", "hi");
    let policy = sandbox.restricted(DOCS_READ);

    let canonical = policy.check_fs(FsAction::Read, &file).unwrap();
    assert_eq!(canonical.as_path(), file);
}

#[test]
fn test_restricted_read_outside_pattern_denied() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("home/other.txt", "hi");
    let policy = sandbox.restricted(DOCS_READ);

    let denial = policy.check_fs(FsAction::Read, &file).unwrap_err();
    assert_eq!(denial.category, RuleSet::FsRead);
    assert!(denial.reason.contains("permissions.fs.read"));
}

#[test]
fn test_read_and_write_lists_are_independent() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("home/docs/notes.txt", "hi");
    let policy = sandbox.restricted(DOCS_READ);

    let denial = policy.check_fs(FsAction::Write, &file).unwrap_err();
    assert_eq!(denial.category, RuleSet::FsWrite);

    let new_file = sandbox.path("appdata/settings.json");
    assert!(policy.check_fs(FsAction::Write, &new_file).is_ok());
    assert_eq!(
        policy.check_fs(FsAction::Read, &sandbox.write("appdata/x", "")).unwrap_err().category,
        RuleSet::FsRead
    );
}

#[test]
fn test_missing_fs_section_denies_everything() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("home/docs/notes.txt", "hi");
    let policy = sandbox.restricted(r#"{"http": {"allow": []}}"#);

    let denial = policy.check_fs(FsAction::Read, &file).unwrap_err();
    assert!(denial.reason.contains("no fs.read patterns"));
}

#[test]
fn test_dot_dot_escape_denied() {
    let sandbox = Sandbox::new();
    sandbox.write("home/docs/a.txt", "a");
    sandbox.write("outside/secret.txt", "s");
    let policy = sandbox.restricted(DOCS_READ);

    let sneaky = sandbox.path("home/docs/../../outside/secret.txt");
    assert_eq!(
        policy.check_fs(FsAction::Read, &sneaky).unwrap_err().category,
        RuleSet::FsRead
    );
}

#[test]
fn test_unresolvable_target_is_denied() {
    let sandbox = Sandbox::new();
    let policy = sandbox.restricted(DOCS_READ);

    let denial = policy
        .check_fs(FsAction::Read, &sandbox.path("home/docs/missing.txt"))
        .unwrap_err();
    assert_eq!(denial.category, RuleSet::Canonicalize);

    let relative = policy
        .check_fs(FsAction::Read, std::path::Path::new("docs/a.txt"))
        .unwrap_err();
    assert_eq!(relative.category, RuleSet::Canonicalize);
}

#[test]
fn test_permissive_confined_to_variable_roots() {
    let sandbox = Sandbox::new();
    let policy = sandbox.permissive();
    assert!(policy.is_permissive());

    for inside in ["appdata/a", "home/b", "tmp/c", "res/d"] {
        let file = sandbox.write(inside, "x");
        assert!(policy.check_fs(FsAction::Read, &file).is_ok(), "{}", inside);
        assert!(policy.check_fs(FsAction::Write, &file).is_ok(), "{}", inside);
    }

    let outside = sandbox.write("outside/e", "x");
    let denial = policy.check_fs(FsAction::Read, &outside).unwrap_err();
    assert_eq!(denial.category, RuleSet::FsRead);
    assert!(denial.reason.contains("$APPDATA"));
}

#[cfg(unix)]
#[test]
fn test_symlink_escape_denied_in_both_modes() {
    let sandbox = Sandbox::new();
    sandbox.write("outside/secret.txt", "s");
    std::fs::create_dir_all(sandbox.path("home/docs")).unwrap();
    std::os::unix::fs::symlink(sandbox.path("outside"), sandbox.path("home/docs/link")).unwrap();
    let through_link = sandbox.path("home/docs/link/secret.txt");

    let restricted = sandbox.restricted(DOCS_READ);
    assert_eq!(
        restricted.check_fs(FsAction::Read, &through_link).unwrap_err().category,
        RuleSet::FsRead
    );

    let permissive = sandbox.permissive();
    assert!(permissive.check_fs(FsAction::Read, &through_link).is_err());
    assert!(permissive
        .check_fs(FsAction::Write, &sandbox.path("home/docs/link/new.txt"))
        .is_err());
}

#[test]
fn test_exists_within_and_outside_scope() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("home/docs/a.txt", "a");
    sandbox.write("outside/b.txt", "b");
    let policy = sandbox.restricted(DOCS_READ);

    assert!(policy.check_fs_exists(&file).unwrap().is_some());
    // Missing but within the read scope: reportable as absent
    assert!(policy
        .check_fs_exists(&sandbox.path("home/docs/deep/missing.txt"))
        .unwrap()
        .is_none());
    // Outside the read scope, existence is never revealed
    assert!(policy.check_fs_exists(&sandbox.path("outside/b.txt")).is_err());
    assert!(policy.check_fs_exists(&sandbox.path("outside/nope.txt")).is_err());
}

#[cfg(unix)]
#[test]
fn test_exists_through_symlinked_dot_dot_denied() {
    let sandbox = Sandbox::new();
    sandbox.write("outside/secret.txt", "s");
    std::fs::create_dir_all(sandbox.path("outside/inner")).unwrap();
    std::fs::create_dir_all(sandbox.path("home/docs")).unwrap();
    std::os::unix::fs::symlink(sandbox.path("outside/inner"), sandbox.path("home/docs/link"))
        .unwrap();
    let policy = sandbox.restricted(DOCS_READ);

    // `link/..` is `outside`, not `home/docs`, so neither answer may leak
    for name in ["secret.txt", "nothing.txt"] {
        let target = sandbox.path(&format!("home/docs/link/../{}", name));
        let denial = policy.check_fs_exists(&target).unwrap_err();
        assert_eq!(denial.category, RuleSet::FsRead, "{}", name);
    }
}

const WRITE_LISTS: [&str; 4] = [
    r#"[]"#,
    r#"["$APPDATA/**"]"#,
    r#"["$HOME/**"]"#,
    r#"["$HOME/docs/**", "$TEMP/*"]"#,
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_write_list_never_changes_read_decision(
        first in 0..WRITE_LISTS.len(),
        second in 0..WRITE_LISTS.len(),
        dir in prop::sample::select(vec![
            "home/docs", "home/docs/sub", "home", "appdata", "tmp", "outside",
        ]),
        name in "[a-z]{1,10}",
    ) {
        let sandbox = Sandbox::new();
        let file = sandbox.write(&format!("{}/{}.txt", dir, name), "x");
        let policy_for = |writes: &str| {
            let json = format!(r#"{{"fs": {{"read": ["$HOME/docs/**"], "write": {}}}}}"#, writes);
            sandbox.restricted(&json)
        };
        let a = policy_for(WRITE_LISTS[first]);
        let b = policy_for(WRITE_LISTS[second]);

        prop_assert_eq!(
            a.check_fs(FsAction::Read, &file).is_ok(),
            b.check_fs(FsAction::Read, &file).is_ok()
        );
        prop_assert_eq!(
            a.check_fs_exists(&file).is_ok(),
            b.check_fs_exists(&file).is_ok()
        );
    }

    #[test]
    fn prop_outside_scope_never_allowed(name in "[a-z]{1,10}", nested in any::<bool>()) {
        let sandbox = Sandbox::new();
        let relative = if nested {
            format!("outside/{}/{}.txt", name, name)
        } else {
            format!("home/{}.txt", name)
        };
        let file = sandbox.write(&relative, "x");
        let policy = sandbox.restricted(DOCS_READ);

        prop_assert!(policy.check_fs(FsAction::Read, &file).is_err());
        prop_assert!(policy.check_fs(FsAction::Write, &file).is_err());
    }
}
