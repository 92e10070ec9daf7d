/*!
 * Bridge Transport
 * Outbound half of the boundary as seen from the untrusted side
 */

use super::types::{CallError, CallResult};
use crate::router::OutboundSink;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by transports
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = CallResult<()>> + Send + 'a>>;

/// Carries encoded call envelopes to the native side
pub trait BridgeTransport: Send + Sync {
    /// Send one complete line
    fn send(&self, line: String) -> SendFuture<'_>;
}

/// In-process transport over a flume channel
#[derive(Clone)]
pub struct ChannelTransport {
    tx: flume::Sender<String>,
}

impl ChannelTransport {
    pub fn new(tx: flume::Sender<String>) -> Self {
        Self { tx }
    }

    /// Transport plus the receiving end
    pub fn unbounded() -> (Self, flume::Receiver<String>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }
}

impl BridgeTransport for ChannelTransport {
    fn send(&self, line: String) -> SendFuture<'_> {
        Box::pin(async move {
            self.tx
                .send_async(line)
                .await
                .map_err(|_| CallError::Transport("channel disconnected".into()))
        })
    }
}

/// Line-oriented writer transport, e.g. a child process's stdin
impl BridgeTransport for OutboundSink {
    fn send(&self, line: String) -> SendFuture<'_> {
        Box::pin(async move {
            self.send_line(line)
                .await
                .map_err(|e| CallError::Transport(e.to_string()))
        })
    }
}
