/*!
 * Event Fan-out Tests
 */

use host_bridge::{CallBridge, ChannelTransport, Received, Subscription};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn bridge() -> CallBridge {
    let (transport, _rx) = ChannelTransport::unbounded();
    CallBridge::new(Arc::new(transport))
}

#[test]
fn test_listeners_receive_payload_in_order() {
    let bridge = bridge();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second"] {
        let seen = seen.clone();
        let _sub = bridge.on("app://tick", move |data| {
            seen.lock().push(format!("{}:{}", tag, data["n"]));
        });
    }

    let outcome = bridge.receive(r#"{"event":"app://tick","data":{"n":7}}"#);
    assert_eq!(outcome, Received::Event(2));
    assert_eq!(*seen.lock(), vec!["first:7", "second:7"]);
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let bridge = bridge();
    let hits = Arc::new(AtomicUsize::new(0));
    let sub = {
        let hits = hits.clone();
        bridge.on("app://tick", move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };

    bridge.receive(r#"{"event":"app://tick"}"#);
    assert!(sub.unsubscribe());
    bridge.receive(r#"{"event":"app://tick"}"#);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(bridge.listener_count("app://tick"), 0);
}

#[test]
fn test_unsubscribe_during_fan_out() {
    let bridge = bridge();
    let later_hits = Arc::new(AtomicUsize::new(0));
    let later_slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

    // The first listener removes the second before its turn comes
    let _remover = {
        let slot = later_slot.clone();
        bridge.on("app://tick", move |_| {
            if let Some(sub) = slot.lock().take() {
                sub.unsubscribe();
            }
        })
    };
    let later = {
        let hits = later_hits.clone();
        bridge.on("app://tick", move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };
    *later_slot.lock() = Some(later);

    assert_eq!(bridge.receive(r#"{"event":"app://tick"}"#), Received::Event(1));
    assert_eq!(later_hits.load(Ordering::SeqCst), 0);
    assert_eq!(bridge.listener_count("app://tick"), 1);
}

#[test]
fn test_listener_may_subscribe_during_fan_out() {
    let bridge = bridge();
    let added = Arc::new(AtomicUsize::new(0));

    let _adder = {
        let inner = bridge.clone();
        let added = added.clone();
        bridge.on("app://tick", move |_| {
            let added = added.clone();
            let _sub = inner.on("app://tick", move |_| {
                added.fetch_add(1, Ordering::SeqCst);
            });
        })
    };

    // The listener added mid-pass is not part of this pass
    assert_eq!(bridge.receive(r#"{"event":"app://tick"}"#), Received::Event(1));
    assert_eq!(added.load(Ordering::SeqCst), 0);
    assert_eq!(bridge.listener_count("app://tick"), 2);
}

#[test]
fn test_missing_data_is_null() {
    let bridge = bridge();
    let captured = Arc::new(Mutex::new(None));
    let _sub = {
        let captured = captured.clone();
        bridge.on("app://bare", move |data| {
            *captured.lock() = Some(data.clone());
        })
    };

    bridge.receive(r#"{"event":"app://bare"}"#);
    assert_eq!(*captured.lock(), Some(json!(null)));
}
