//! Bridge controller: routes host method calls to SDK clients and SDK
//! callbacks to the output channels.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::{ClientHandle, ClientRegistry};
use crate::error::{BridgeError, Result};
use crate::events::{EventDispatcher, EventKind};
use crate::options::{BridgeOptions, ClientOptions, Config};
use crate::protocol::{EventRecord, Method, MethodCall, MethodResult};
use crate::sdk::{
    MessageResult, PresenceEventResult, PublishRequest, SdkFactory, SdkStatus, SetStateRequest,
    StatusCallback, SubscribeListener,
};

/// Forwards SDK subscribe-loop callbacks to the dispatcher
struct BridgeListener {
    client_name: String,
    dispatcher: EventDispatcher,
    debug: bool,
}

impl BridgeListener {
    fn forward(&self, record: EventRecord) {
        if self.debug {
            info!(
                client = %self.client_name,
                kind = %record.kind(),
                record = %record.to_value(),
                "Event record"
            );
        }
        self.dispatcher.deliver(record);
    }
}

impl SubscribeListener for BridgeListener {
    fn status(&self, status: &SdkStatus) {
        debug!(
            client = %self.client_name,
            category = ?status.category,
            error = status.error,
            "Status"
        );
        self.forward(EventRecord::from_status(status));
    }

    fn message(&self, message: &MessageResult) {
        debug!(
            client = %self.client_name,
            channel = %message.channel,
            publisher = ?message.publisher,
            "Message"
        );
        self.forward(message.into());
    }

    fn presence(&self, presence: &PresenceEventResult) {
        debug!(
            client = %self.client_name,
            channel = %presence.channel,
            event = %presence.event,
            state = ?presence.state,
            "Presence"
        );
        self.forward(presence.into());
    }
}

/// Top-level controller owning the client registry and the event dispatcher.
///
/// # Example
///
/// ```ignore
/// use pubnub_flutter::{BridgeOptions, ClientOptions, EventKind, LoopbackFactory, PubNubBridge};
/// use std::sync::Arc;
///
/// let bridge = PubNubBridge::new(BridgeOptions::default(), Arc::new(LoopbackFactory::default()))?;
/// bridge.listen(EventKind::Message, |record| println!("{:?}", record));
/// bridge.create_client(ClientOptions::new("pub-key", "sub-key").client_name("main"))?;
/// bridge.subscribe(Some("main"), &["room".to_string()])?;
/// ```
pub struct PubNubBridge {
    config: Arc<Config>,
    factory: Arc<dyn SdkFactory>,
    clients: ClientRegistry,
    dispatcher: EventDispatcher,
}

impl PubNubBridge {
    /// Create a bridge with its own dispatch task
    pub fn new(options: BridgeOptions, factory: Arc<dyn SdkFactory>) -> Result<Self> {
        Ok(Self::with_dispatcher(options, factory, EventDispatcher::new()?))
    }

    /// Create a bridge delivering through an existing dispatcher
    pub fn with_dispatcher(
        options: BridgeOptions,
        factory: Arc<dyn SdkFactory>,
        dispatcher: EventDispatcher,
    ) -> Self {
        let config: Config = options.into();
        info!(
            "Creating PubNub bridge (default client: '{}', presence: {}, debug: {})",
            config.default_client_name, config.with_presence, config.debug
        );

        Self {
            config: Arc::new(config),
            factory,
            clients: ClientRegistry::new(),
            dispatcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    fn resolve_name<'a>(&'a self, client_name: Option<&'a str>) -> &'a str {
        client_name.unwrap_or(&self.config.default_client_name)
    }

    fn client(&self, client_name: Option<&str>) -> Option<Arc<ClientHandle>> {
        self.clients.get(self.resolve_name(client_name))
    }

    fn completion(&self) -> StatusCallback {
        let dispatcher = self.dispatcher.clone();
        Box::new(move |status: SdkStatus| dispatcher.deliver(EventRecord::from_status(&status)))
    }

    // ------------------------------------------------------------------
    // Event channels
    // ------------------------------------------------------------------

    /// Start listening on an output channel, replacing any current listener
    pub fn listen(
        &self,
        kind: EventKind,
        callback: impl Fn(&EventRecord) + Send + Sync + 'static,
    ) -> u64 {
        self.dispatcher.register(kind, callback)
    }

    /// Stop listening on an output channel
    pub fn cancel(&self, kind: EventKind) {
        self.dispatcher.unregister(kind);
    }

    /// Resolve once every event produced so far has been delivered
    pub async fn flush(&self) {
        self.dispatcher.flush().await;
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Create every client in `entries` that does not exist yet.
    ///
    /// All entries must carry both keys; otherwise nothing is created.
    pub fn create(&self, entries: &[ClientOptions]) -> Result<bool> {
        if entries.is_empty() || entries.iter().any(|e| !e.has_credentials()) {
            return Err(BridgeError::WrongCredentials);
        }

        for entry in entries {
            self.create_client(entry.clone())?;
        }
        Ok(true)
    }

    /// Create one client; an existing client with the same name is kept.
    pub fn create_client(&self, options: ClientOptions) -> Result<bool> {
        let name = self.resolve_name(options.client_name.as_deref()).to_string();

        if self.clients.contains(&name) {
            debug!("Client '{}' already configured", name);
            return Ok(true);
        }

        let sdk_config = options.to_sdk_configuration()?;
        let (handle, created) = self.clients.get_or_try_insert(&name, || {
            let client = self.factory.create(sdk_config).map_err(|e| {
                warn!("SDK refused configuration for '{}': {}", name, e);
                BridgeError::WrongCredentials
            })?;
            client.add_listener(Arc::new(BridgeListener {
                client_name: name.clone(),
                dispatcher: self.dispatcher.clone(),
                debug: self.config.debug,
            }));
            Ok(client)
        })?;

        if created {
            info!("Created client '{}' (uuid: {})", handle.name(), handle.uuid());
        }
        Ok(true)
    }

    /// Subscribe a client to channels
    pub fn subscribe(&self, client_name: Option<&str>, channels: &[String]) -> Result<bool> {
        let handle = self.client(client_name).ok_or(BridgeError::CannotSubscribe)?;
        if channels.is_empty() {
            return Err(BridgeError::CannotSubscribe);
        }

        debug!("Client '{}' subscribing to {:?}", handle.name(), channels);
        handle
            .client()
            .subscribe(channels, self.config.with_presence);
        Ok(true)
    }

    /// Unsubscribe a client from one channel, or from all channels when
    /// `channel` is `None`
    pub fn unsubscribe(&self, client_name: Option<&str>, channel: Option<&str>) -> Result<bool> {
        let handle = self
            .client(client_name)
            .ok_or(BridgeError::CannotUnsubscribe)?;

        match channel {
            Some(channel) => {
                debug!("Client '{}' unsubscribing from '{}'", handle.name(), channel);
                handle.client().unsubscribe(&[channel.to_string()]);
            }
            None => {
                debug!("Client '{}' unsubscribing from all channels", handle.name());
                handle.client().unsubscribe_all();
            }
        }
        Ok(true)
    }

    /// Publish a message. The outcome is reported on the status or error
    /// channel.
    pub fn publish(
        &self,
        client_name: Option<&str>,
        channel: &str,
        message: Value,
        metadata: Option<Value>,
    ) -> Result<bool> {
        let handle = self.client(client_name).ok_or(BridgeError::CannotPublish)?;
        if message.is_null() {
            return Err(BridgeError::CannotPublish);
        }

        handle.client().publish(
            PublishRequest {
                channel: channel.to_string(),
                message,
                meta: metadata,
            },
            self.completion(),
        );
        Ok(true)
    }

    /// Set presence state for `uuid` on `channel`. The outcome is reported on
    /// the status or error channel.
    pub fn set_state(
        &self,
        client_name: Option<&str>,
        channel: &str,
        uuid: &str,
        state: Value,
    ) -> Result<bool> {
        let handle = self.client(client_name).ok_or(BridgeError::CannotSetState)?;
        if state.is_null() {
            return Err(BridgeError::CannotSetState);
        }

        handle.client().set_state(
            SetStateRequest {
                channels: vec![channel.to_string()],
                uuid: uuid.to_string(),
                state,
            },
            self.completion(),
        );
        Ok(true)
    }

    /// Identifier of a configured client
    pub fn uuid(&self, client_name: Option<&str>) -> Result<String> {
        self.client(client_name)
            .map(|handle| handle.uuid())
            .ok_or(BridgeError::ClientNotConfigured)
    }

    // ------------------------------------------------------------------
    // Method-call surface
    // ------------------------------------------------------------------

    /// Decode and run a host method call
    pub fn handle_method_call(&self, call: &MethodCall) -> MethodResult {
        let method = match call.method.parse::<Method>() {
            Ok(method) => method,
            Err(_) => {
                debug!("Method '{}' not implemented", call.method);
                return MethodResult::NotImplemented;
            }
        };

        let result = match method {
            Method::Create => self.handle_create(call).map(Value::from),
            Method::Subscribe => self.handle_subscribe(call).map(Value::from),
            Method::Unsubscribe => self.handle_unsubscribe(call).map(Value::from),
            Method::Publish => self.handle_publish(call).map(Value::from),
            Method::SetState => self.handle_set_state(call).map(Value::from),
            Method::Uuid => self.handle_uuid(call).map(Value::from),
        };

        match result {
            Err(ref e) if e.is_precondition() => debug!("Method '{}' refused: {}", method, e),
            Err(ref e) => warn!("Method '{}' failed: {}", method, e),
            Ok(_) => {}
        }
        result.into()
    }

    fn handle_create(&self, call: &MethodCall) -> Result<bool> {
        let entries = match call.raw_argument("clients") {
            Some(_) => call
                .argument::<Vec<ClientOptions>>("clients")
                .ok_or(BridgeError::WrongCredentials)?,
            None => vec![call
                .arguments_as::<ClientOptions>()
                .map_err(|_| BridgeError::WrongCredentials)?],
        };
        self.create(&entries)
    }

    fn handle_subscribe(&self, call: &MethodCall) -> Result<bool> {
        let client_name = call.client_name(BridgeError::CannotSubscribe)?;
        let channels = call
            .argument::<Vec<String>>("channels")
            .ok_or(BridgeError::CannotSubscribe)?;
        self.subscribe(client_name, &channels)
    }

    fn handle_unsubscribe(&self, call: &MethodCall) -> Result<bool> {
        let client_name = call.client_name(BridgeError::CannotUnsubscribe)?;
        let channel = call.optional_str("channel", BridgeError::CannotUnsubscribe)?;
        self.unsubscribe(client_name, channel)
    }

    fn handle_publish(&self, call: &MethodCall) -> Result<bool> {
        let client_name = call.client_name(BridgeError::CannotPublish)?;
        let channel = call.required_str("channel", BridgeError::CannotPublish)?;
        let message = call
            .raw_argument("message")
            .cloned()
            .ok_or(BridgeError::CannotPublish)?;
        let metadata = call.raw_argument("metadata").cloned();
        self.publish(client_name, channel, message, metadata)
    }

    fn handle_set_state(&self, call: &MethodCall) -> Result<bool> {
        let client_name = call.client_name(BridgeError::CannotSetState)?;
        let channel = call.required_str("channel", BridgeError::CannotSetState)?;
        let uuid = call.required_str("uuid", BridgeError::CannotSetState)?;
        let state = call
            .raw_argument("state")
            .cloned()
            .ok_or(BridgeError::CannotSetState)?;
        self.set_state(client_name, channel, uuid, state)
    }

    fn handle_uuid(&self, call: &MethodCall) -> Result<String> {
        let client_name = call.client_name(BridgeError::ClientNotConfigured)?;
        self.uuid(client_name)
    }
}

impl std::fmt::Debug for PubNubBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubNubBridge")
            .field("config", &self.config)
            .field("clients", &self.clients.names())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
