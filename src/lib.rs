/*!
 * Host Bridge Library
 * Trust boundary between an untrusted UI layer and privileged native capabilities
 *
 * Layers, leaf first:
 * - `resolver`: path variables, canonicalization, glob and URL matching
 * - `permissions`: compiled policy with structured denials and an audit trail
 * - `handlers`: built-in capabilities that consult the policy before acting
 * - `router`: envelope decoding, per-call dispatch, single-writer output
 * - `bridge`: untrusted-side client correlating calls and fanning out events
 */

pub mod bridge;
pub mod config;
pub mod core;
pub mod handlers;
pub mod monitoring;
pub mod permissions;
pub mod resolver;
pub mod router;

// Re-exports
pub use bridge::{BridgeTransport, CallBridge, CallError, ChannelTransport, Received, Subscription};
pub use config::{AppManifest, ConfigError, HandlerTimeouts, RuntimeConfig};
pub use crate::core::{BridgeError, BridgeResult};
pub use handlers::{register_defaults, HostServices};
pub use monitoring::init_tracing;
pub use permissions::{Denial, FsAction, PermissionManager, Policy, PolicyMode, RuleSet};
pub use resolver::{CanonicalPath, CanonicalUrl, GlobPattern, PathVariable, PathVariables, ResolveError};
pub use router::{
    CallContext, CallEnvelope, EventEmitter, HandlerError, MethodHandler, OutboundSink, PushEvent,
    ResultEnvelope, Router, RouterBuilder, RouterError,
};
