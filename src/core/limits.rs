/*!
 * System Limits and Constants
 *
 * Centralized location for bridge-wide limits, thresholds and defaults.
 * Grouped by domain so each subsystem finds its knobs in one place.
 * Security-critical constants are marked with [SECURITY].
 */

use std::time::Duration;

// =============================================================================
// ENVELOPE LIMITS
// =============================================================================

/// Maximum size of one inbound envelope (16MB)
/// [SECURITY] Larger lines are answered with a decode error instead of being parsed
pub const MAX_ENVELOPE_BYTES: usize = 16 * 1024 * 1024;

/// Payload size above which JSON decoding switches to simd-json (1KB)
pub const JSON_SIMD_THRESHOLD: usize = 1024;

/// Capacity of the outbound delivery queue
/// Producers wait when the single writer falls this far behind
pub const OUTBOUND_QUEUE_CAPACITY: usize = 4096;

// =============================================================================
// HANDLER DEADLINES
// =============================================================================

/// Default deadline for `http.fetch`
pub const STANDARD_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default deadline for `process.exec`
pub const STANDARD_PROCESS_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum captured stdout/stderr per process run (8MB each)
/// [SECURITY] Output beyond this is truncated
pub const MAX_PROCESS_OUTPUT: usize = 8 * 1024 * 1024;

/// Maximum response body accepted by `http.fetch` (32MB)
pub const MAX_HTTP_BODY: usize = 32 * 1024 * 1024;

/// Maximum text accepted by `clipboard.writeText` (10MB)
pub const MAX_CLIPBOARD_TEXT: usize = 10 * 1024 * 1024;

// =============================================================================
// AUDIT
// =============================================================================

/// Permission decisions kept in the in-memory audit ring
pub const MAX_AUDIT_EVENTS: usize = 1024;

// =============================================================================
// IDENTITY
// =============================================================================

/// Identifier used when no manifest is found
pub const DEFAULT_APP_IDENTIFIER: &str = "host-bridge";

/// User agent sent by `http.fetch`
pub const HTTP_USER_AGENT: &str = concat!("host-bridge/", env!("CARGO_PKG_VERSION"));
