/*!
 * Call Bridge
 *
 * Untrusted-side client of the router:
 * - `call` mints a fresh correlation id and awaits exactly one reply
 * - `on` registers push-event listeners, fanned out in registration order
 * - `receive` is the single inbound dispatcher for replies and events
 */

pub mod client;
pub mod events;
pub mod transport;
pub mod types;

pub use client::CallBridge;
pub use events::Subscription;
pub use transport::{BridgeTransport, ChannelTransport, SendFuture};
pub use types::{CallError, CallResult, Received};
