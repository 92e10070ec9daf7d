/*!
 * Router Dispatch
 * Decode, route, run and reply, one independent task per envelope
 */

use super::envelope::{CallEnvelope, ResultEnvelope};
use super::handler::{CallContext, HandlerMap, RouterBuilder};
use super::sink::{EventEmitter, OutboundSink};
use super::types::{HandlerError, RouterError, RouterResult};
use crate::core::limits::MAX_ENVELOPE_BYTES;
use crate::monitoring::span_dispatch;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite};
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};

/// Immutable method table shared by every dispatch
#[derive(Clone)]
pub struct Router {
    handlers: Arc<HandlerMap>,
}

impl RouterBuilder {
    /// Freeze the table
    pub fn build(self) -> Router {
        info!(methods = self.handlers.len(), "Router built");
        Router {
            handlers: self.handlers,
        }
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Decode and run one raw envelope, producing its reply
    pub async fn dispatch(&self, raw: &[u8], events: EventEmitter) -> ResultEnvelope {
        match CallEnvelope::decode(raw) {
            Ok(call) => self.dispatch_call(call, events).await,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable envelope");
                ResultEnvelope::decode_error(&e)
            }
        }
    }

    /// Route and run a decoded call
    ///
    /// A panicking handler is reported as a failed call rather than tearing
    /// down the dispatch task.
    pub async fn dispatch_call(&self, call: CallEnvelope, events: EventEmitter) -> ResultEnvelope {
        let Some(handler) = self.handlers.get(&call.method).cloned() else {
            debug!(id = %call.id, method = %call.method, "Unknown method");
            return ResultEnvelope::unknown_method(call.id, &call.method);
        };

        let span = span_dispatch(&call.id, &call.method);
        let ctx = CallContext {
            id: call.id.clone(),
            method: call.method.clone(),
            events,
        };

        let outcome = AssertUnwindSafe(handler.call(ctx, call.params))
            .catch_unwind()
            .instrument(span.span().clone())
            .await
            .unwrap_or_else(|_| Err(HandlerError::failed(format!("handler for {} panicked", call.method))));

        span.record_result(outcome.is_ok());
        match outcome {
            Ok(value) => ResultEnvelope::success(call.id, value),
            Err(e) => {
                debug!(id = %call.id, method = %call.method, error = %e, "Call failed");
                ResultEnvelope::failure(call.id, e.to_string())
            }
        }
    }

    /// Serve newline-delimited envelopes from `reader`, replying on `writer`
    ///
    /// Returns once input is exhausted and every in-flight dispatch has been
    /// delivered. Blank lines are skipped. A line longer than
    /// `MAX_ENVELOPE_BYTES` is discarded and answered with a decode error.
    pub async fn serve<R, W>(&self, mut reader: R, writer: W) -> RouterResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (sink, writer_task) = OutboundSink::spawn(writer);
        let mut in_flight = JoinSet::new();
        let mut buf = Vec::new();
        let mut received: u64 = 0;

        loop {
            buf.clear();
            let limit = MAX_ENVELOPE_BYTES as u64 + 1;
            let read = (&mut reader).take(limit).read_until(b'\n', &mut buf).await?;
            if read == 0 {
                break;
            }

            if buf.last() != Some(&b'\n') && buf.len() > MAX_ENVELOPE_BYTES {
                discard_line(&mut reader).await?;
                warn!(bytes = buf.len(), "Oversized envelope discarded");
                let reply = ResultEnvelope::decode_error(&RouterError::Decode(format!(
                    "envelope exceeds the {} byte limit",
                    MAX_ENVELOPE_BYTES
                )));
                sink.send_result(&reply).await?;
                continue;
            }

            let line = trim_line(&buf);
            if line.is_empty() {
                continue;
            }

            received += 1;
            in_flight.spawn(deliver(self.clone(), line.to_vec(), sink.clone()));

            // Reap finished dispatches so the set does not grow with session length
            while in_flight.try_join_next().is_some() {}
        }

        debug!(received, pending = in_flight.len(), "Input closed, draining dispatches");
        while in_flight.join_next().await.is_some() {}

        drop(sink);
        match writer_task.await {
            Ok(result) => result,
            Err(e) => Err(RouterError::Io(e.to_string())),
        }
    }
}

async fn deliver(router: Router, raw: Vec<u8>, sink: OutboundSink) {
    let reply = router.dispatch(&raw, sink.emitter()).await;
    if let Err(e) = sink.send_result(&reply).await {
        warn!(id = %reply.id, error = %e, "Reply could not be delivered");
    }
}

fn trim_line(buf: &[u8]) -> &[u8] {
    let mut end = buf.len();
    while end > 0 && matches!(buf[end - 1], b'\n' | b'\r' | b' ' | b'\t') {
        end -= 1;
    }
    let mut start = 0;
    while start < end && matches!(buf[start], b' ' | b'\t') {
        start += 1;
    }
    &buf[start..end]
}

/// Skip input up to and including the next newline
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> RouterResult<()> {
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}
