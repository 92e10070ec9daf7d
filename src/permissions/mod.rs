/*!
 * Permissions Module
 * Policy compilation, authorization checks, and audit logging
 *
 * ## Features
 * - Restricted mode: declared fs/process/http rule sets, everything else denied
 * - Permissive mode: no declaration, filesystem confined to the path-variable roots
 * - Structured denials naming the rule set that was consulted
 * - Bounded in-memory audit trail
 *
 * ## Usage
 * ```ignore
 * use host_bridge::permissions::{FsAction, PermissionManager, Policy};
 *
 * let policy = Policy::from_config(manifest.permissions.as_ref(), variables)?;
 * let manager = PermissionManager::new(policy);
 *
 * let canonical = manager.check_fs(FsAction::Read, Path::new("/home/u/notes.txt"))?;
 * // operate on `canonical`, never on the raw path
 * ```
 */

pub mod audit;
pub mod config;
pub mod manager;
pub mod policy;
pub mod types;

pub use audit::{AuditEvent, AuditLogger, AuditSeverity, AuditStats};
pub use config::{ExecRuleConfig, FsConfig, HttpConfig, PermissionsConfig, ProcessConfig};
pub use manager::PermissionManager;
pub use policy::{Policy, PolicyMode};
pub use types::{Denial, FsAction, PermissionRequest, PermissionResult, Resource, RuleSet};
