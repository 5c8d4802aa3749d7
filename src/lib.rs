//! # PubNub Flutter Bridge
//!
//! Exposes a PubNub publish/subscribe SDK to Flutter through one method
//! channel and four event channels.
//!
//! ## Features
//!
//! - Named client registry with idempotent creation
//! - Subscribe / unsubscribe / publish / presence state pass-through
//! - Message, status, presence and error event channels, one listener each
//! - Ordered hand-off from SDK threads to a single dispatch task
//! - Stable integer codes for status categories and operation types
//! - In-process loopback SDK for tests and demos
//! - Flutter bindings via flutter_rust_bridge (`flutter` feature)
//!
//! ## Example
//!
//! ```ignore
//! use pubnub_flutter::{BridgeOptions, EventKind, LoopbackFactory, MethodCall, PubNubBridge};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = PubNubBridge::new(BridgeOptions::default(), Arc::new(LoopbackFactory::default()))?;
//!
//!     bridge.listen(EventKind::Message, |record| {
//!         println!("Received: {:?}", record.to_value());
//!     });
//!
//!     let call = MethodCall::new(
//!         "create",
//!         serde_json::json!({"clientName": "main", "publishKey": "demo", "subscribeKey": "demo"}),
//!     );
//!     bridge.handle_method_call(&call);
//!
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod client;
pub mod events;
pub mod protocol;
pub mod sdk;

mod bridge;
mod error;
mod options;

// Re-exports
pub use bridge::PubNubBridge;
pub use client::{ClientHandle, ClientRegistry};
pub use error::{BridgeError, Result, ERROR_CODE};
pub use events::{ChannelStats, DispatchQueue, EventDispatcher, EventKind};
pub use options::{BridgeOptions, ClientOptions, Config, DEFAULT_CLIENT_NAME};
pub use protocol::{
    ErrorRecord, EventRecord, MessageRecord, Method, MethodCall, MethodResult, OperationType,
    PresenceRecord, StatusCategory, StatusRecord,
};
pub use sdk::{LoopbackFactory, LoopbackNetwork, SdkClient, SdkConfiguration, SdkFactory};

// Flutter Rust Bridge bindings
#[cfg(feature = "flutter")]
pub mod flutter_api;
