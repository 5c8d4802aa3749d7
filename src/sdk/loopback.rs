//! In-process SDK implementation.
//!
//! Clients created from the same [`LoopbackNetwork`] see each other's
//! publishes and presence changes. Callbacks run synchronously on the calling
//! thread, which makes the loopback useful for tests and demos where no real
//! network is available.

use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

use super::client::{SdkClient, SdkFactory, StatusCallback, SubscribeListener};
use super::types::{
    MessageResult, PresenceEventResult, PublishRequest, SdkConfiguration, SdkStatus,
    SetStateRequest,
};
use crate::error::{BridgeError, Result};
use crate::protocol::{OperationType, StatusCategory};

/// A subscription held by one client on one channel
struct Subscriber {
    with_presence: bool,
    client: Weak<LoopbackClient>,
}

impl Subscriber {
    fn is_live(&self) -> bool {
        self.client.strong_count() > 0
    }
}

/// Shared routing table for loopback clients
#[derive(Default)]
pub struct LoopbackNetwork {
    /// channel -> subscribers
    subscriptions: DashMap<String, Vec<Subscriber>>,
    /// (channel, uuid) -> presence state
    states: DashMap<(String, String), Value>,
    publish_count: AtomicU64,
}

impl LoopbackNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of publish requests that reached the network
    pub fn publish_count(&self) -> u64 {
        self.publish_count.load(Ordering::SeqCst)
    }

    /// Number of live clients currently subscribed to a channel
    pub fn occupancy(&self, channel: &str) -> u32 {
        self.subscriptions
            .get(channel)
            .map(|subs| subs.iter().filter(|s| s.is_live()).count() as u32)
            .unwrap_or(0)
    }

    /// Presence state stored for a uuid on a channel
    pub fn state(&self, channel: &str, uuid: &str) -> Option<Value> {
        self.states
            .get(&(channel.to_string(), uuid.to_string()))
            .map(|v| v.clone())
    }

    fn join(&self, channel: &str, subscriber: Subscriber) {
        let mut subs = self.subscriptions.entry(channel.to_string()).or_default();
        subs.retain(Subscriber::is_live);
        subs.push(subscriber);
    }

    /// Remove one client's subscription; other clients sharing its uuid stay.
    fn leave(&self, channel: &str, client: &Weak<LoopbackClient>) {
        if let Some(mut subs) = self.subscriptions.get_mut(channel) {
            subs.retain(|s| s.is_live() && !Weak::ptr_eq(&s.client, client));
        }
        self.subscriptions.remove_if(channel, |_, subs| subs.is_empty());
    }

    /// Collect live clients on a channel; the shard guard is released before
    /// any callback runs.
    fn recipients(&self, channel: &str, presence_only: bool) -> Vec<Arc<LoopbackClient>> {
        self.subscriptions
            .get(channel)
            .map(|subs| {
                subs.iter()
                    .filter(|s| !presence_only || s.with_presence)
                    .filter_map(|s| s.client.upgrade())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn announce(&self, channel: &str, event: &str, uuid: &str, state: Option<Value>) {
        let presence = PresenceEventResult {
            channel: channel.to_string(),
            event: event.to_string(),
            uuid: Some(uuid.to_string()),
            occupancy: Some(self.occupancy(channel)),
            state,
            user_metadata: None,
        };

        for client in self.recipients(channel, true) {
            client.notify_presence(&presence);
        }
    }
}

/// Loopback client bound to a [`LoopbackNetwork`]
pub struct LoopbackClient {
    config: SdkConfiguration,
    network: Arc<LoopbackNetwork>,
    listeners: RwLock<Vec<Arc<dyn SubscribeListener>>>,
    channels: RwLock<BTreeSet<String>>,
    this: Weak<LoopbackClient>,
}

impl LoopbackClient {
    pub fn new(config: SdkConfiguration, network: Arc<LoopbackNetwork>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            config,
            network,
            listeners: RwLock::new(Vec::new()),
            channels: RwLock::new(BTreeSet::new()),
            this: this.clone(),
        })
    }

    /// Channels this client is subscribed to
    pub fn subscribed_channels(&self) -> Vec<String> {
        self.channels.read().iter().cloned().collect()
    }

    fn listeners(&self) -> Vec<Arc<dyn SubscribeListener>> {
        self.listeners.read().clone()
    }

    fn notify_status(&self, status: &SdkStatus) {
        for listener in self.listeners() {
            listener.status(status);
        }
    }

    fn notify_message(&self, message: &MessageResult) {
        for listener in self.listeners() {
            listener.message(message);
        }
    }

    fn notify_presence(&self, presence: &PresenceEventResult) {
        for listener in self.listeners() {
            listener.presence(presence);
        }
    }

    fn leave_channels(&self, channels: &[String]) {
        let removed: Vec<String> = {
            let mut own = self.channels.write();
            channels
                .iter()
                .filter(|c| own.remove(c.as_str()))
                .cloned()
                .collect()
        };

        if removed.is_empty() {
            return;
        }

        for channel in &removed {
            self.network.leave(channel, &self.this);
            self.network.announce(channel, "leave", &self.config.uuid, None);
        }

        self.notify_status(
            &SdkStatus::new(StatusCategory::Acknowledgment, OperationType::Unsubscribe)
                .with_uuid(self.config.uuid.clone())
                .with_channels(removed),
        );
    }
}

impl SdkClient for LoopbackClient {
    fn configuration(&self) -> &SdkConfiguration {
        &self.config
    }

    fn add_listener(&self, listener: Arc<dyn SubscribeListener>) {
        self.listeners.write().push(listener);
    }

    fn subscribe(&self, channels: &[String], with_presence: bool) {
        let added: Vec<String> = {
            let mut own = self.channels.write();
            channels
                .iter()
                .filter(|c| own.insert((*c).clone()))
                .cloned()
                .collect()
        };

        for channel in &added {
            self.network.join(
                channel,
                Subscriber {
                    with_presence,
                    client: self.this.clone(),
                },
            );
        }

        debug!(uuid = %self.config.uuid, ?added, "Loopback subscribe");

        self.notify_status(
            &SdkStatus::new(StatusCategory::Connected, OperationType::Subscribe)
                .with_uuid(self.config.uuid.clone())
                .with_channels(channels.to_vec()),
        );

        for channel in &added {
            self.network.announce(channel, "join", &self.config.uuid, None);
        }
    }

    fn unsubscribe(&self, channels: &[String]) {
        self.leave_channels(channels);
    }

    fn unsubscribe_all(&self) {
        let all = self.subscribed_channels();
        self.leave_channels(&all);
    }

    fn publish(&self, request: PublishRequest, completion: StatusCallback) {
        self.network.publish_count.fetch_add(1, Ordering::SeqCst);

        if self.config.publish_key.is_empty() {
            completion(
                SdkStatus::failed(
                    StatusCategory::BadRequest,
                    OperationType::Publish,
                    "Publish key not configured",
                )
                .with_uuid(self.config.uuid.clone())
                .with_channels(vec![request.channel]),
            );
            return;
        }

        let message = MessageResult {
            channel: request.channel.clone(),
            publisher: Some(self.config.uuid.clone()),
            message: request.message,
            user_metadata: request.meta,
        };

        for client in self.network.recipients(&request.channel, false) {
            client.notify_message(&message);
        }

        completion(
            SdkStatus::new(StatusCategory::Acknowledgment, OperationType::Publish)
                .with_uuid(self.config.uuid.clone())
                .with_channels(vec![request.channel]),
        );
    }

    fn set_state(&self, request: SetStateRequest, completion: StatusCallback) {
        let missing: Vec<String> = {
            let own = self.channels.read();
            request
                .channels
                .iter()
                .filter(|c| !own.contains(c.as_str()))
                .cloned()
                .collect()
        };

        if !missing.is_empty() {
            completion(
                SdkStatus::failed(
                    StatusCategory::BadRequest,
                    OperationType::SetState,
                    format!("Not subscribed to: {}", missing.join(",")),
                )
                .with_uuid(request.uuid)
                .with_channels(missing),
            );
            return;
        }

        for channel in &request.channels {
            self.network.states.insert(
                (channel.clone(), request.uuid.clone()),
                request.state.clone(),
            );
            self.network.announce(
                channel,
                "state-change",
                &request.uuid,
                Some(request.state.clone()),
            );
        }

        completion(
            SdkStatus::new(StatusCategory::Acknowledgment, OperationType::SetState)
                .with_uuid(request.uuid)
                .with_channels(request.channels),
        );
    }
}

/// Factory creating [`LoopbackClient`]s on one shared network
pub struct LoopbackFactory {
    network: Arc<LoopbackNetwork>,
    created: AtomicUsize,
}

impl LoopbackFactory {
    pub fn new(network: Arc<LoopbackNetwork>) -> Self {
        Self {
            network,
            created: AtomicUsize::new(0),
        }
    }

    pub fn network(&self) -> Arc<LoopbackNetwork> {
        self.network.clone()
    }

    /// Number of clients this factory has created
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl Default for LoopbackFactory {
    fn default() -> Self {
        Self::new(LoopbackNetwork::new())
    }
}

impl SdkFactory for LoopbackFactory {
    fn create(&self, config: SdkConfiguration) -> Result<Arc<dyn SdkClient>> {
        if config.subscribe_key.is_empty() {
            return Err(BridgeError::sdk("Subscribe key is required"));
        }

        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(LoopbackClient::new(config, self.network.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        statuses: Mutex<Vec<SdkStatus>>,
        messages: Mutex<Vec<MessageResult>>,
        presence: Mutex<Vec<PresenceEventResult>>,
    }

    impl SubscribeListener for Recorder {
        fn status(&self, status: &SdkStatus) {
            self.statuses.lock().push(status.clone());
        }

        fn message(&self, message: &MessageResult) {
            self.messages.lock().push(message.clone());
        }

        fn presence(&self, presence: &PresenceEventResult) {
            self.presence.lock().push(presence.clone());
        }
    }

    fn client(network: &Arc<LoopbackNetwork>, uuid: &str) -> (Arc<LoopbackClient>, Arc<Recorder>) {
        let client = LoopbackClient::new(
            SdkConfiguration::new("pub", "sub").with_uuid(uuid),
            network.clone(),
        );
        let recorder = Arc::new(Recorder::default());
        client.add_listener(recorder.clone());
        (client, recorder)
    }

    fn channels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_publish_reaches_subscribers() {
        let network = LoopbackNetwork::new();
        let (alice, _) = client(&network, "alice");
        let (bob, bob_events) = client(&network, "bob");

        bob.subscribe(&channels(&["room"]), false);

        let completed = Arc::new(Mutex::new(None));
        let completed_clone = completed.clone();
        alice.publish(
            PublishRequest {
                channel: "room".into(),
                message: serde_json::json!({"text": "hi"}),
                meta: None,
            },
            Box::new(move |status: SdkStatus| *completed_clone.lock() = Some(status)),
        );

        let messages = bob_events.messages.lock();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].publisher.as_deref(), Some("alice"));
        assert!(!completed.lock().as_ref().unwrap().is_error());
        assert_eq!(network.publish_count(), 1);
    }

    #[test]
    fn test_presence_join_and_leave() {
        let network = LoopbackNetwork::new();
        let (alice, alice_events) = client(&network, "alice");
        let (bob, _) = client(&network, "bob");

        alice.subscribe(&channels(&["room"]), true);
        bob.subscribe(&channels(&["room"]), true);
        bob.unsubscribe_all();

        let presence = alice_events.presence.lock();
        let events: Vec<(&str, Option<u32>)> = presence
            .iter()
            .map(|p| (p.event.as_str(), p.occupancy))
            .collect();
        assert_eq!(
            events,
            vec![("join", Some(1)), ("join", Some(2)), ("leave", Some(1))]
        );
        assert_eq!(network.occupancy("room"), 1);
        assert!(bob.subscribed_channels().is_empty());
    }

    #[test]
    fn test_shared_uuid_clients_leave_independently() {
        let network = LoopbackNetwork::new();
        let (x, _) = client(&network, "same");
        let (y, y_events) = client(&network, "same");
        let (publisher, _) = client(&network, "publisher");

        x.subscribe(&channels(&["room"]), false);
        y.subscribe(&channels(&["room"]), false);
        assert_eq!(network.occupancy("room"), 2);

        x.unsubscribe(&channels(&["room"]));
        assert_eq!(network.occupancy("room"), 1);
        assert_eq!(y.subscribed_channels(), vec!["room".to_string()]);

        publisher.publish(
            PublishRequest {
                channel: "room".into(),
                message: serde_json::json!("still here"),
                meta: None,
            },
            Box::new(|_status: SdkStatus| {}),
        );
        assert_eq!(y_events.messages.lock().len(), 1);
    }

    #[test]
    fn test_dropped_client_not_counted() {
        let network = LoopbackNetwork::new();
        let (alice, _) = client(&network, "alice");
        let (bob, _) = client(&network, "bob");

        alice.subscribe(&channels(&["room"]), false);
        bob.subscribe(&channels(&["room"]), false);
        drop(bob);
        assert_eq!(network.occupancy("room"), 1);

        alice.unsubscribe_all();
        assert_eq!(network.occupancy("room"), 0);
    }

    #[test]
    fn test_set_state_requires_subscription() {
        let network = LoopbackNetwork::new();
        let (alice, _) = client(&network, "alice");

        let result = Arc::new(Mutex::new(Vec::new()));
        let sink = result.clone();
        alice.set_state(
            SetStateRequest {
                channels: channels(&["room"]),
                uuid: "alice".into(),
                state: serde_json::json!({"mood": "happy"}),
            },
            Box::new(move |status: SdkStatus| sink.lock().push(status)),
        );
        assert!(result.lock()[0].is_error());

        alice.subscribe(&channels(&["room"]), true);
        let sink = result.clone();
        alice.set_state(
            SetStateRequest {
                channels: channels(&["room"]),
                uuid: "alice".into(),
                state: serde_json::json!({"mood": "happy"}),
            },
            Box::new(move |status: SdkStatus| sink.lock().push(status)),
        );
        assert!(!result.lock()[1].is_error());
        assert_eq!(
            network.state("room", "alice"),
            Some(serde_json::json!({"mood": "happy"}))
        );
    }

    #[test]
    fn test_factory_rejects_missing_subscribe_key() {
        let factory = LoopbackFactory::default();
        assert!(factory.create(SdkConfiguration::new("pub", "")).is_err());
        assert!(factory.create(SdkConfiguration::new("pub", "sub")).is_ok());
        assert_eq!(factory.created_count(), 1);
    }
}
