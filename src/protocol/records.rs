//! Records delivered on the output event channels.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::codes::{category_code, operation_code};
use crate::events::EventKind;
use crate::sdk::{MessageResult, PresenceEventResult, SdkStatus};

/// Message record: `{uuid, channel, message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub uuid: Option<String>,
    pub channel: String,
    /// Payload rendered as a JSON string
    pub message: String,
}

impl From<&MessageResult> for MessageRecord {
    fn from(message: &MessageResult) -> Self {
        Self {
            uuid: message.publisher.clone(),
            channel: message.channel.clone(),
            message: message.message.to_string(),
        }
    }
}

/// Status record: `{category, operation, uuid, channels}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub category: i32,
    pub operation: i32,
    pub uuid: Option<String>,
    pub channels: Vec<String>,
}

impl From<&SdkStatus> for StatusRecord {
    fn from(status: &SdkStatus) -> Self {
        Self {
            category: category_code(status.category),
            operation: operation_code(status.operation),
            uuid: status.uuid.clone(),
            channels: status.affected_channels.clone(),
        }
    }
}

/// Presence record: `{channel, event, uuid, occupancy}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub channel: String,
    pub event: String,
    pub uuid: Option<String>,
    pub occupancy: Option<u32>,
}

impl From<&PresenceEventResult> for PresenceRecord {
    fn from(presence: &PresenceEventResult) -> Self {
        Self {
            channel: presence.channel.clone(),
            event: presence.event.clone(),
            uuid: presence.uuid.clone(),
            occupancy: presence.occupancy,
        }
    }
}

/// Error record: `{operation, error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub operation: i32,
    pub error: String,
}

impl From<&SdkStatus> for ErrorRecord {
    fn from(status: &SdkStatus) -> Self {
        Self {
            operation: operation_code(status.operation),
            error: status.error_data.clone().unwrap_or_default(),
        }
    }
}

/// A record ready for delivery on one output channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventRecord {
    Message(MessageRecord),
    Status(StatusRecord),
    Presence(PresenceRecord),
    Error(ErrorRecord),
}

impl EventRecord {
    /// Output channel this record belongs on
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Message(_) => EventKind::Message,
            Self::Status(_) => EventKind::Status,
            Self::Presence(_) => EventKind::Presence,
            Self::Error(_) => EventKind::Error,
        }
    }

    /// Plain key-value form handed to the host
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Route an SDK status: errors go to the error channel, everything else
    /// to the status channel.
    pub fn from_status(status: &SdkStatus) -> Self {
        if status.is_error() {
            Self::Error(status.into())
        } else {
            Self::Status(status.into())
        }
    }
}

impl From<&MessageResult> for EventRecord {
    fn from(message: &MessageResult) -> Self {
        Self::Message(message.into())
    }
}

impl From<&PresenceEventResult> for EventRecord {
    fn from(presence: &PresenceEventResult) -> Self {
        Self::Presence(presence.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{OperationType, StatusCategory};
    use serde_json::json;

    #[test]
    fn test_message_record_shape() {
        let message = MessageResult {
            channel: "room".into(),
            publisher: Some("alice".into()),
            message: json!({"text": "hello"}),
            user_metadata: None,
        };

        let record = EventRecord::from(&message);
        assert_eq!(record.kind(), EventKind::Message);
        assert_eq!(
            record.to_value(),
            json!({"uuid": "alice", "channel": "room", "message": "{\"text\":\"hello\"}"})
        );
    }

    #[test]
    fn test_status_routing() {
        let ok = SdkStatus::new(StatusCategory::Connected, OperationType::Subscribe)
            .with_uuid("alice")
            .with_channels(vec!["room".into()]);
        let record = EventRecord::from_status(&ok);
        assert_eq!(record.kind(), EventKind::Status);
        assert_eq!(
            record.to_value(),
            json!({"category": 5, "operation": 1, "uuid": "alice", "channels": ["room"]})
        );

        let failed = SdkStatus::failed(
            StatusCategory::BadRequest,
            OperationType::Publish,
            "Publish key not configured",
        );
        let record = EventRecord::from_status(&failed);
        assert_eq!(record.kind(), EventKind::Error);
        assert_eq!(
            record.to_value(),
            json!({"operation": 3, "error": "Publish key not configured"})
        );
    }

    #[test]
    fn test_presence_record_shape() {
        let presence = PresenceEventResult {
            channel: "room".into(),
            event: "join".into(),
            uuid: Some("bob".into()),
            occupancy: Some(2),
            state: None,
            user_metadata: None,
        };

        assert_eq!(
            EventRecord::from(&presence).to_value(),
            json!({"channel": "room", "event": "join", "uuid": "bob", "occupancy": 2})
        );
    }
}
