/*!
 * Permission Audit Trail
 * Tracks permission checks and denials for security monitoring
 */

use crate::core::limits::MAX_AUDIT_EVENTS;
use crate::permissions::types::{Denial, PermissionRequest, Resource, RuleSet};
use ahash::RandomState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::collections::VecDeque;
use std::time::SystemTime;

/// Audit event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

/// One authorization decision
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditEvent {
    pub request: PermissionRequest,
    pub denial: Option<Denial>,
    pub severity: AuditSeverity,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub logged_at: SystemTime,
}

impl AuditEvent {
    pub fn allowed(request: PermissionRequest) -> Self {
        Self {
            request,
            denial: None,
            severity: AuditSeverity::Info,
            logged_at: SystemTime::now(),
        }
    }

    pub fn denied(request: PermissionRequest, denial: Denial) -> Self {
        // Process launches reach furthest outside the sandbox
        let severity = match &request.resource {
            Resource::Process { .. } => AuditSeverity::Critical,
            _ => AuditSeverity::Warning,
        };

        Self {
            request,
            denial: Some(denial),
            severity,
            logged_at: SystemTime::now(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.denial.is_none()
    }
}

/// Audit logger for permission checks
pub struct AuditLogger {
    /// Global event log (ring buffer)
    events: parking_lot::RwLock<VecDeque<AuditEvent>>,
    /// Denial counters per rule set
    denial_counts: DashMap<RuleSet, u64, RandomState>,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            events: parking_lot::RwLock::new(VecDeque::with_capacity(MAX_AUDIT_EVENTS)),
            denial_counts: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Log a permission check
    pub fn log(&self, event: AuditEvent) {
        if let Some(denial) = &event.denial {
            self.denial_counts
                .entry(denial.category)
                .and_modify(|count| *count += 1)
                .or_insert(1);
        }

        let mut events = self.events.write();
        if events.len() >= MAX_AUDIT_EVENTS {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Most recent events first
    pub fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        let events = self.events.read();
        events.iter().rev().take(limit).cloned().collect()
    }

    pub fn denial_count(&self, rule_set: RuleSet) -> u64 {
        self.denial_counts.get(&rule_set).map(|e| *e).unwrap_or(0)
    }

    pub fn stats(&self) -> AuditStats {
        let events = self.events.read();
        let total_denials: u64 = self.denial_counts.iter().map(|e| *e.value()).sum();

        AuditStats {
            total_events: events.len(),
            total_denials,
            retained_denials: events.iter().filter(|e| !e.is_allowed()).count(),
        }
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Audit statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    pub total_events: usize,
    /// Every denial since startup
    pub total_denials: u64,
    /// Denials still held in the ring buffer
    pub retained_denials: usize,
}
