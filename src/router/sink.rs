/*!
 * Outbound Sink
 * Single-writer delivery of results and push events
 *
 * Every outbound line goes through one bounded flume queue drained by one
 * writer task, so lines never interleave no matter how many dispatches
 * finish at once.
 */

use super::envelope::{PushEvent, ResultEnvelope};
use super::types::{RouterError, RouterResult};
use crate::core::limits::OUTBOUND_QUEUE_CAPACITY;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Cloneable handle onto the writer queue
#[derive(Clone)]
pub struct OutboundSink {
    tx: flume::Sender<String>,
}

impl OutboundSink {
    /// Start the writer task over `writer`
    ///
    /// The task ends once every sink clone has been dropped and the queue is drained.
    pub fn spawn<W>(writer: W) -> (Self, JoinHandle<RouterResult<()>>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (sink, rx) = Self::channel();
        let handle = tokio::spawn(write_loop(rx, writer));
        (sink, handle)
    }

    /// Sink plus the raw receiving end, for callers that drain lines themselves
    pub fn channel() -> (Self, flume::Receiver<String>) {
        let (tx, rx) = flume::bounded(OUTBOUND_QUEUE_CAPACITY);
        (Self { tx }, rx)
    }

    /// Queue one complete line (without its trailing newline)
    pub async fn send_line(&self, line: String) -> RouterResult<()> {
        self.tx.send_async(line).await.map_err(|_| RouterError::Closed)
    }

    pub async fn send_result(&self, envelope: &ResultEnvelope) -> RouterResult<()> {
        self.send_line(envelope.encode()?).await
    }

    pub async fn send_event(&self, event: &PushEvent) -> RouterResult<()> {
        self.send_line(event.encode()?).await
    }

    pub fn emitter(&self) -> EventEmitter {
        EventEmitter { sink: self.clone() }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_disconnected()
    }
}

async fn write_loop<W>(rx: flume::Receiver<String>, mut writer: W) -> RouterResult<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut written: u64 = 0;
    while let Ok(line) = rx.recv_async().await {
        let result = async {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await
        }
        .await;

        if let Err(e) = result {
            error!(error = %e, "Outbound write failed, stopping writer");
            return Err(e.into());
        }
        written += 1;
    }
    debug!(lines = written, "Outbound writer drained");
    Ok(())
}

/// Push-event handle given to handlers
#[derive(Clone)]
pub struct EventEmitter {
    sink: OutboundSink,
}

impl EventEmitter {
    /// Publish `data` under `event`
    pub async fn emit<T: Serialize>(&self, event: &str, data: &T) -> RouterResult<()> {
        let data = serde_json::to_value(data).map_err(|e| RouterError::Encode(e.to_string()))?;
        self.sink.send_event(&PushEvent::new(event, data)).await
    }
}
