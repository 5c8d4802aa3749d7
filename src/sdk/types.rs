//! Value types exchanged with the wrapped SDK.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{OperationType, StatusCategory};

/// Prefix the SDK uses for generated client identifiers
pub const GENERATED_UUID_PREFIX: &str = "pn-";

/// Generate a client identifier the way the SDK does when none is configured
pub fn generate_uuid() -> String {
    format!("{}{}", GENERATED_UUID_PREFIX, uuid::Uuid::new_v4())
}

/// Configuration of one SDK client connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfiguration {
    pub publish_key: String,
    pub subscribe_key: String,
    pub auth_key: Option<String>,
    /// Presence timeout in seconds, only set when positive
    pub presence_timeout: Option<u32>,
    pub uuid: String,
    pub filter_expression: Option<String>,
}

impl SdkConfiguration {
    pub fn new(publish_key: impl Into<String>, subscribe_key: impl Into<String>) -> Self {
        Self {
            publish_key: publish_key.into(),
            subscribe_key: subscribe_key.into(),
            auth_key: None,
            presence_timeout: None,
            uuid: generate_uuid(),
            filter_expression: None,
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    pub fn with_auth_key(mut self, auth_key: impl Into<String>) -> Self {
        self.auth_key = Some(auth_key.into());
        self
    }
}

/// Status notification from the SDK, either from the subscribe loop or as the
/// completion of an asynchronous request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SdkStatus {
    pub category: Option<StatusCategory>,
    pub operation: Option<OperationType>,
    pub error: bool,
    pub error_data: Option<String>,
    pub uuid: Option<String>,
    pub affected_channels: Vec<String>,
}

impl SdkStatus {
    pub fn new(category: StatusCategory, operation: OperationType) -> Self {
        Self {
            category: Some(category),
            operation: Some(operation),
            ..Default::default()
        }
    }

    pub fn failed(
        category: StatusCategory,
        operation: OperationType,
        error_data: impl Into<String>,
    ) -> Self {
        Self {
            category: Some(category),
            operation: Some(operation),
            error: true,
            error_data: Some(error_data.into()),
            ..Default::default()
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn with_channels(mut self, channels: Vec<String>) -> Self {
        self.affected_channels = channels;
        self
    }

    pub fn is_error(&self) -> bool {
        self.error
    }
}

/// Message received on a subscribed channel
#[derive(Debug, Clone, PartialEq)]
pub struct MessageResult {
    pub channel: String,
    pub publisher: Option<String>,
    pub message: Value,
    pub user_metadata: Option<Value>,
}

/// Presence change on a subscribed channel
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceEventResult {
    pub channel: String,
    /// `join`, `leave`, `timeout` or `state-change`
    pub event: String,
    pub uuid: Option<String>,
    pub occupancy: Option<u32>,
    pub state: Option<Value>,
    pub user_metadata: Option<Value>,
}

/// Publish request handed to the SDK
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub channel: String,
    pub message: Value,
    pub meta: Option<Value>,
}

/// Presence state update handed to the SDK
#[derive(Debug, Clone, PartialEq)]
pub struct SetStateRequest {
    pub channels: Vec<String>,
    pub uuid: String,
    pub state: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_uuid_prefix() {
        let config = SdkConfiguration::new("pub", "sub");
        assert!(config.uuid.starts_with(GENERATED_UUID_PREFIX));
        assert_ne!(config.uuid, SdkConfiguration::new("pub", "sub").uuid);
    }

    #[test]
    fn test_failed_status_carries_error_flag() {
        let status = SdkStatus::failed(
            StatusCategory::AccessDenied,
            OperationType::Publish,
            "forbidden",
        );
        assert!(status.is_error());
        assert_eq!(status.error_data.as_deref(), Some("forbidden"));
        assert!(!SdkStatus::new(StatusCategory::Connected, OperationType::Subscribe).is_error());
    }
}
