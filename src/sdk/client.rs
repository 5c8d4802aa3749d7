//! Traits implemented by the wrapped publish/subscribe SDK.

use std::sync::Arc;

use super::types::{
    MessageResult, PresenceEventResult, PublishRequest, SdkConfiguration, SdkStatus,
    SetStateRequest,
};
use crate::error::Result;

/// Completion callback for asynchronous SDK requests
pub type StatusCallback = Box<dyn FnOnce(SdkStatus) + Send + 'static>;

/// Receiver of subscribe-loop callbacks.
///
/// The SDK invokes these from its own worker threads.
pub trait SubscribeListener: Send + Sync {
    fn status(&self, status: &SdkStatus);

    fn message(&self, message: &MessageResult);

    fn presence(&self, presence: &PresenceEventResult);
}

/// One configured SDK connection
pub trait SdkClient: Send + Sync {
    /// Configuration the client was created with
    fn configuration(&self) -> &SdkConfiguration;

    /// Register a subscribe-loop listener
    fn add_listener(&self, listener: Arc<dyn SubscribeListener>);

    /// Subscribe to channels, optionally with their presence channels
    fn subscribe(&self, channels: &[String], with_presence: bool);

    /// Unsubscribe from the given channels
    fn unsubscribe(&self, channels: &[String]);

    /// Unsubscribe from every channel
    fn unsubscribe_all(&self);

    /// Publish a message; the outcome arrives through `completion`
    fn publish(&self, request: PublishRequest, completion: StatusCallback);

    /// Set presence state; the outcome arrives through `completion`
    fn set_state(&self, request: SetStateRequest, completion: StatusCallback);

    /// Client identifier
    fn uuid(&self) -> String {
        self.configuration().uuid.clone()
    }
}

/// Creates SDK clients from a configuration
pub trait SdkFactory: Send + Sync {
    fn create(&self, config: SdkConfiguration) -> Result<Arc<dyn SdkClient>>;
}

impl<F> SdkFactory for F
where
    F: Fn(SdkConfiguration) -> Result<Arc<dyn SdkClient>> + Send + Sync,
{
    fn create(&self, config: SdkConfiguration) -> Result<Arc<dyn SdkClient>> {
        self(config)
    }
}
