/*!
 * Call Correlation Tests
 * Pending-call bookkeeping against a hand-driven native side
 */

use host_bridge::{CallBridge, CallEnvelope, CallError, ChannelTransport, Received};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn bridge() -> (CallBridge, flume::Receiver<String>) {
    let (transport, rx) = ChannelTransport::unbounded();
    (CallBridge::new(Arc::new(transport)), rx)
}

async fn next_call(rx: &flume::Receiver<String>) -> CallEnvelope {
    let line = tokio::time::timeout(Duration::from_secs(5), rx.recv_async())
        .await
        .unwrap()
        .unwrap();
    CallEnvelope::decode(line.as_bytes()).unwrap()
}

#[tokio::test]
async fn test_out_of_order_replies_settle_their_own_calls() {
    let (bridge, rx) = bridge();

    let first = tokio::spawn({
        let bridge = bridge.clone();
        async move { bridge.call("test.first", json!({})).await }
    });
    let a = next_call(&rx).await;
    let second = tokio::spawn({
        let bridge = bridge.clone();
        async move { bridge.call("test.second", json!({})).await }
    });
    let b = next_call(&rx).await;
    assert_ne!(a.id, b.id);

    let reply_b = json!({"id": b.id, "result": "second"}).to_string();
    let reply_a = json!({"id": a.id, "error": "nope"}).to_string();
    assert_eq!(bridge.receive(&reply_b), Received::Resolved);
    assert_eq!(bridge.receive(&reply_a), Received::Resolved);

    assert_eq!(second.await.unwrap(), Ok(json!("second")));
    assert_eq!(first.await.unwrap(), Err(CallError::Remote("nope".into())));
    assert_eq!(bridge.pending_count(), 0);
}

#[tokio::test]
async fn test_timeout_forgets_call_and_late_reply_is_stale() {
    let (bridge, rx) = bridge();

    let outcome = bridge
        .call_with_timeout("test.never", json!({}), Duration::from_millis(50))
        .await;
    assert_eq!(
        outcome,
        Err(CallError::Timeout {
            method: "test.never".into(),
            after_ms: 50
        })
    );
    assert_eq!(bridge.pending_count(), 0);

    let sent = next_call(&rx).await;
    let late = json!({"id": sent.id, "result": 1}).to_string();
    assert_eq!(bridge.receive(&late), Received::Stale);
}

#[tokio::test]
async fn test_abandoned_call_leaves_no_record() {
    let (bridge, _rx) = bridge();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        bridge.call("test.never", json!({})),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(bridge.pending_count(), 0);
}

#[tokio::test]
async fn test_transport_failure() {
    let (bridge, rx) = bridge();
    drop(rx);

    let outcome = bridge.call("test.any", json!({})).await;
    assert!(matches!(outcome, Err(CallError::Transport(_))));
    assert_eq!(bridge.pending_count(), 0);
}

#[tokio::test]
async fn test_invalid_calls_never_sent() {
    let (bridge, rx) = bridge();

    assert!(matches!(
        bridge.call("nodot", json!({})).await,
        Err(CallError::Invalid(_))
    ));
    assert!(matches!(
        bridge.call("test.list", json!([1, 2])).await,
        Err(CallError::Invalid(_))
    ));
    assert!(rx.is_empty());
    assert_eq!(bridge.pending_count(), 0);
}

#[tokio::test]
async fn test_null_params_sent_as_empty_object() {
    let (bridge, rx) = bridge();
    let _call = tokio::spawn({
        let bridge = bridge.clone();
        async move { bridge.call("test.nothing", serde_json::Value::Null).await }
    });

    assert_eq!(next_call(&rx).await.params, json!({}));
}

#[tokio::test]
async fn test_close_fails_pending_calls() {
    let (bridge, rx) = bridge();
    let waiting = tokio::spawn({
        let bridge = bridge.clone();
        async move { bridge.call("test.wait", json!({})).await }
    });
    let _ = next_call(&rx).await;

    bridge.close();
    assert_eq!(waiting.await.unwrap(), Err(CallError::Closed));
}

#[test]
fn test_classification_of_odd_messages() {
    let (bridge, _rx) = bridge();
    assert_eq!(bridge.receive("{not json"), Received::Malformed);
    assert_eq!(bridge.receive(r#"{"hello":1}"#), Received::Ignored);
    assert_eq!(
        bridge.receive(r#"{"id":"","error":"decode failed"}"#),
        Received::Uncorrelated
    );
    assert_eq!(bridge.receive(r#"{"event":"nobody://listens"}"#), Received::Event(0));
}
