/*!
 * Call Bridge
 * Correlates calls with replies and fans out push events
 */

use super::events::{EventRegistry, Subscription};
use super::transport::BridgeTransport;
use super::types::{CallError, CallResult, Received};
use crate::core::json;
use crate::router::{validate_method, CallEnvelope};
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

type Pending = DashMap<String, oneshot::Sender<CallResult<Value>>, RandomState>;

/// Any message the native side may send
#[derive(Deserialize)]
struct Inbound {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

struct BridgeInner {
    transport: Arc<dyn BridgeTransport>,
    pending: Pending,
    events: Arc<EventRegistry>,
}

/// Client half of the boundary; cheap to clone
#[derive(Clone)]
pub struct CallBridge {
    inner: Arc<BridgeInner>,
}

/// Removes its pending record when dropped, so an abandoned call never leaks
struct PendingCall {
    inner: Arc<BridgeInner>,
    id: String,
    rx: oneshot::Receiver<CallResult<Value>>,
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        self.inner.pending.remove(&self.id);
    }
}

impl CallBridge {
    pub fn new(transport: Arc<dyn BridgeTransport>) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                transport,
                pending: DashMap::with_hasher(RandomState::new()),
                events: Arc::new(EventRegistry::default()),
            }),
        }
    }

    /// Invoke `method` and wait for its reply
    pub async fn call(&self, method: &str, params: Value) -> CallResult<Value> {
        let mut pending = self.start(method, params).await?;
        (&mut pending.rx).await.unwrap_or(Err(CallError::Closed))
    }

    /// Like [`CallBridge::call`] but gives up after `timeout`
    ///
    /// Giving up only forgets the call locally; the native handler keeps
    /// running and its late reply is ignored.
    pub async fn call_with_timeout(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> CallResult<Value> {
        let mut pending = self.start(method, params).await?;
        match tokio::time::timeout(timeout, &mut pending.rx).await {
            Ok(reply) => reply.unwrap_or(Err(CallError::Closed)),
            Err(_) => {
                debug!(id = %pending.id, method, "Call timed out locally");
                Err(CallError::Timeout {
                    method: method.to_string(),
                    after_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn start(&self, method: &str, params: Value) -> CallResult<PendingCall> {
        validate_method(method).map_err(|e| CallError::Invalid(e.to_string()))?;
        let params = match params {
            Value::Null => Value::Object(Default::default()),
            obj @ Value::Object(_) => obj,
            _ => return Err(CallError::Invalid("params must be an object".into())),
        };

        let (tx, rx) = oneshot::channel();
        let id = self.register_pending(tx);
        let pending = PendingCall {
            inner: self.inner.clone(),
            id: id.clone(),
            rx,
        };

        let line = CallEnvelope::new(id, method, params)
            .encode()
            .map_err(|e| CallError::Invalid(e.to_string()))?;
        self.inner.transport.send(line).await?;
        Ok(pending)
    }

    /// Mint an id that is not currently outstanding and store the record under it
    fn register_pending(&self, tx: oneshot::Sender<CallResult<Value>>) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if let Entry::Vacant(slot) = self.inner.pending.entry(id.clone()) {
                slot.insert(tx);
                return id;
            }
        }
    }

    /// Register a listener for a push event
    pub fn on<F>(&self, event: &str, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(event, Arc::new(callback))
    }

    /// Classify and apply one inbound message
    pub fn receive(&self, message: &str) -> Received {
        let inbound: Inbound = match json::from_str(message) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!(error = %e, "Malformed inbound message");
                return Received::Malformed;
            }
        };

        match (inbound.id, inbound.event) {
            (Some(id), _) if id.is_empty() => {
                warn!(error = ?inbound.error, "Reply without correlation id");
                Received::Uncorrelated
            }
            (Some(id), _) => match self.inner.pending.remove(&id) {
                Some((_, tx)) => {
                    let outcome = match inbound.error {
                        Some(message) => Err(CallError::Remote(message)),
                        None => Ok(inbound.result.unwrap_or(Value::Null)),
                    };
                    // The caller may have stopped waiting in the meantime
                    let _ = tx.send(outcome);
                    Received::Resolved
                }
                None => {
                    debug!(id = %id, "Ignoring reply with no pending call");
                    Received::Stale
                }
            },
            (None, Some(event)) => {
                let data = inbound.data.unwrap_or(Value::Null);
                Received::Event(self.inner.events.emit(&event, &data))
            }
            (None, None) => Received::Ignored,
        }
    }

    /// Feed every line of `reader` to [`CallBridge::receive`] until EOF
    ///
    /// Calls still pending when input ends fail with [`CallError::Closed`].
    pub async fn receive_from<R>(&self, reader: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let result = loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    self.receive(&line);
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.close();
        result
    }

    /// Fail every pending call with [`CallError::Closed`]
    pub fn close(&self) {
        let ids: Vec<String> = self.inner.pending.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            if let Some((_, tx)) = self.inner.pending.remove(&id) {
                let _ = tx.send(Err(CallError::Closed));
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.inner.events.listener_count(event)
    }
}
