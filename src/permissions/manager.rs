/*!
 * Permission Manager
 * Handler-facing entry point: evaluates the shared policy and records every decision
 */

use super::audit::{AuditEvent, AuditLogger, AuditStats};
use super::policy::Policy;
use super::types::{Denial, FsAction, PermissionRequest, PermissionResult};
use crate::resolver::{CanonicalPath, CanonicalUrl};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cheap to clone; every clone shares the same policy and audit trail
#[derive(Clone)]
pub struct PermissionManager {
    policy: Arc<Policy>,
    audit: Arc<AuditLogger>,
}

impl PermissionManager {
    pub fn new(policy: Policy) -> Self {
        Self::with_shared(Arc::new(policy))
    }

    pub fn with_shared(policy: Arc<Policy>) -> Self {
        debug!(mode = ?policy.mode(), "Initializing permission manager");
        Self {
            policy,
            audit: Arc::new(AuditLogger::new()),
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn audit_stats(&self) -> AuditStats {
        self.audit.stats()
    }

    pub fn check_fs(&self, action: FsAction, path: &Path) -> PermissionResult<CanonicalPath> {
        let result = self.policy.check_fs(action, path);
        self.record(PermissionRequest::file(action, path), result.as_ref().err());
        result
    }

    pub fn check_fs_exists(&self, path: &Path) -> PermissionResult<Option<CanonicalPath>> {
        let result = self.policy.check_fs_exists(path);
        self.record(
            PermissionRequest::file(FsAction::Read, path),
            result.as_ref().err(),
        );
        result
    }

    pub fn check_process(&self, command: &str, args: &[String]) -> PermissionResult<()> {
        let result = self.policy.check_process(command, args);
        self.record(PermissionRequest::exec(command, args), result.as_ref().err());
        result
    }

    pub fn check_net(&self, url: &str) -> PermissionResult<CanonicalUrl> {
        let result = self.policy.check_net(url);
        self.record(PermissionRequest::net(url), result.as_ref().err());
        result
    }

    fn record(&self, request: PermissionRequest, denial: Option<&Denial>) {
        let event = match denial {
            None => {
                debug!(resource = %request.resource, "Permission granted");
                AuditEvent::allowed(request)
            }
            Some(denial) => {
                warn!(
                    resource = %request.resource,
                    category = %denial.category,
                    reason = %denial.reason,
                    "Permission denied"
                );
                AuditEvent::denied(request, denial.clone())
            }
        };
        self.audit.log(event);
    }
}
