/*!
 * Clipboard Handlers
 * clipboard.readText, clipboard.writeText
 *
 * Text lives in a process-wide store; every write publishes
 * `clipboard://changed` through the call's event emitter.
 */

use super::params::parse;
use crate::core::limits::MAX_CLIPBOARD_TEXT;
use crate::router::{CallContext, HandlerError, HandlerResult, RouterBuilder, RouterResult};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

pub const CLIPBOARD_CHANGED: &str = "clipboard://changed";

#[derive(Deserialize)]
struct WriteParams {
    text: String,
}

/// Current clipboard text plus a change counter
#[derive(Default)]
pub struct ClipboardStore {
    text: RwLock<Option<String>>,
    sequence: AtomicU64,
}

impl ClipboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> Option<String> {
        self.text.read().clone()
    }

    /// Replace the text, returning the new sequence number
    pub fn write(&self, text: String) -> u64 {
        *self.text.write() = Some(text);
        self.sequence.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }
}

#[derive(Clone)]
pub struct ClipboardHandler {
    store: Arc<ClipboardStore>,
}

impl ClipboardHandler {
    pub fn new(store: Arc<ClipboardStore>) -> Self {
        Self { store }
    }

    pub fn register(self, builder: RouterBuilder) -> RouterResult<RouterBuilder> {
        let read = self.clone();
        let write = self;
        builder
            .register_fn("clipboard.readText", move |_ctx, _params| {
                let h = read.clone();
                async move { h.read_text() }
            })?
            .register_fn("clipboard.writeText", move |ctx, params| {
                let h = write.clone();
                async move { h.write_text(ctx, params).await }
            })
    }

    pub fn read_text(&self) -> HandlerResult {
        Ok(self.store.read().map(Value::String).unwrap_or(Value::Null))
    }

    pub async fn write_text(&self, ctx: CallContext, params: Value) -> HandlerResult {
        let WriteParams { text } = parse(params)?;
        if text.len() > MAX_CLIPBOARD_TEXT {
            return Err(HandlerError::invalid_params(format!(
                "clipboard text exceeds {} bytes",
                MAX_CLIPBOARD_TEXT
            )));
        }

        let length = text.len();
        let sequence = self.store.write(text);
        debug!(sequence, length, "Clipboard updated");

        // The write already happened; a closed outbound channel only loses the notification
        if let Err(e) = ctx
            .events
            .emit(CLIPBOARD_CHANGED, &json!({ "sequence": sequence }))
            .await
        {
            warn!(error = %e, "Clipboard change event not delivered");
        }
        Ok(Value::Null)
    }
}
