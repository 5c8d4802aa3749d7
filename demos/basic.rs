//! Basic example: two loopback clients chatting on one channel.
//!
//! Run with: cargo run --example basic

use pubnub_flutter::{BridgeOptions, EventKind, LoopbackFactory, MethodCall, PubNubBridge};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let bridge = PubNubBridge::new(
        BridgeOptions::default(),
        Arc::new(LoopbackFactory::default()),
    )?;

    for kind in EventKind::ALL {
        bridge.listen(kind, move |record| {
            println!("[{}] {}", kind, record.to_value());
        });
    }

    let calls = [
        MethodCall::new(
            "create",
            json!({"clients": [
                {"clientName": "alice", "publishKey": "demo", "subscribeKey": "demo", "uuid": "alice"},
                {"clientName": "bob", "publishKey": "demo", "subscribeKey": "demo", "uuid": "bob"}
            ]}),
        ),
        MethodCall::new("subscribe", json!({"clientName": "alice", "channels": ["lobby"]})),
        MethodCall::new("subscribe", json!({"clientName": "bob", "channels": ["lobby"]})),
        MethodCall::new(
            "publish",
            json!({"clientName": "alice", "channel": "lobby", "message": {"text": "Hi Bob!"}}),
        ),
        MethodCall::new(
            "setState",
            json!({"clientName": "bob", "channel": "lobby", "uuid": "bob", "state": {"typing": true}}),
        ),
        MethodCall::new("unsubscribe", json!({"clientName": "bob"})),
        MethodCall::new("uuid", json!({"clientName": "alice"})),
        MethodCall::new("history", json!({})),
    ];

    for call in &calls {
        let result = bridge.handle_method_call(call);
        println!("{} -> {}", call.method, result.to_json());
    }

    bridge.flush().await;
    Ok(())
}
