//! Flutter Rust Bridge API
//!
//! Dart-facing surface of the bridge: one `invoke_method` entry point that
//! mirrors the plugin's method channel, plus `listen`/`cancel` for each event
//! channel.

#![allow(unexpected_cfgs)]

use flutter_rust_bridge::{frb, DartFnFuture};
use std::sync::{Arc, OnceLock};
use tracing::warn;

use crate::sdk::{LoopbackFactory, SdkFactory};
use crate::{BridgeError, BridgeOptions, EventKind, MethodCall, PubNubBridge, Result};

static SDK_FACTORY: OnceLock<Arc<dyn SdkFactory>> = OnceLock::new();

/// Install the SDK used by bridges created from Dart.
///
/// Must run before the first `PubNubClient` is constructed; returns false if a
/// factory was already installed.
#[frb(ignore)]
pub fn install_sdk_factory(factory: Arc<dyn SdkFactory>) -> bool {
    SDK_FACTORY.set(factory).is_ok()
}

fn sdk_factory() -> Arc<dyn SdkFactory> {
    SDK_FACTORY
        .get_or_init(|| {
            warn!("No SDK factory installed, using the in-process loopback");
            Arc::new(LoopbackFactory::default())
        })
        .clone()
}

// ============================================================================
// Configuration Types
// ============================================================================

/// Bridge options for Flutter
#[frb(dart_metadata=("freezed"), dart_type = "BridgeOptions")]
pub struct FlutterBridgeOptions {
    pub default_client_name: Option<String>,
    pub with_presence: Option<bool>,
    pub debug: Option<bool>,
}

impl From<FlutterBridgeOptions> for BridgeOptions {
    fn from(opts: FlutterBridgeOptions) -> Self {
        let defaults = BridgeOptions::default();
        BridgeOptions {
            default_client_name: opts.default_client_name.or(defaults.default_client_name),
            with_presence: opts.with_presence.or(defaults.with_presence),
            debug: opts.debug.or(defaults.debug),
        }
    }
}

// ============================================================================
// Main Client
// ============================================================================

/// PubNub bridge for Flutter
#[frb(opaque, dart_type = "PubNubClient")]
pub struct FlutterPubNub {
    inner: Arc<PubNubBridge>,
}

impl FlutterPubNub {
    /// Create a bridge
    ///
    /// # Example (Dart)
    /// ```dart
    /// final pubnub = PubNubClient(options: BridgeOptions(withPresence: true));
    /// ```
    #[frb(sync)]
    pub fn new(options: FlutterBridgeOptions) -> Result<Self> {
        let bridge = PubNubBridge::new(options.into(), sdk_factory())?;
        Ok(Self {
            inner: Arc::new(bridge),
        })
    }

    /// Run a method call; `arguments_json` is the JSON-encoded arguments map.
    /// Returns the JSON-encoded `MethodResult`.
    #[frb(sync)]
    pub fn invoke_method(&self, method: String, arguments_json: String) -> Result<String> {
        let arguments = if arguments_json.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&arguments_json)?
        };

        let result = self
            .inner
            .handle_method_call(&MethodCall::new(method, arguments));
        Ok(result.to_json())
    }

    /// Start listening on an event channel (`message`, `status`, `presence`,
    /// `error`, or the full host channel name). Each record is passed to
    /// Dart as a JSON string.
    #[frb(sync)]
    pub fn listen(
        &self,
        channel: String,
        dart_callback: impl Fn(String) -> DartFnFuture<()> + Send + Sync + 'static,
    ) -> Result<u64> {
        let kind = parse_kind(&channel)?;
        Ok(self.inner.listen(kind, move |record| {
            futures::executor::block_on(dart_callback(record.to_value().to_string()));
        }))
    }

    /// Stop listening on an event channel
    #[frb(sync)]
    pub fn cancel(&self, channel: String) -> Result<()> {
        self.inner.cancel(parse_kind(&channel)?);
        Ok(())
    }

    /// Names of configured clients
    #[frb(sync)]
    pub fn client_names(&self) -> Vec<String> {
        self.inner.clients().names()
    }
}

fn parse_kind(channel: &str) -> Result<EventKind> {
    channel
        .parse::<EventKind>()
        .map_err(BridgeError::config)
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Initialize logging for the Rust library
#[frb(sync)]
pub fn init_logging(level: String) {
    log::set_max_level(match level.as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    });
}

/// Get library version
#[frb(sync)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
