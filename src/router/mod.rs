/*!
 * Message Router
 *
 * The only component aware of the correlation protocol:
 * - Decodes inbound call envelopes and answers malformed ones with an empty id
 * - Dispatches by method name through an add-only, then frozen, handler table
 * - Runs every envelope on its own task so a slow handler blocks nothing else
 * - Serializes all outbound lines through one writer
 */

pub mod dispatch;
pub mod envelope;
pub mod handler;
pub mod sink;
pub mod types;

pub use dispatch::Router;
pub use envelope::{validate_method, CallEnvelope, PushEvent, ResultEnvelope};
pub use handler::{CallContext, FnHandler, HandlerFuture, MethodHandler, RouterBuilder};
pub use sink::{EventEmitter, OutboundSink};
pub use types::{HandlerError, HandlerResult, RouterError, RouterResult};
