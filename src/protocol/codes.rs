//! Stable integer codes for SDK status categories and operation types.
//!
//! Dart consumers compare these integers directly, so every mapping here is
//! part of the wire contract and must stay fixed.

use serde::{Deserialize, Serialize};

/// Status category reported by the SDK
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    #[default]
    Unknown,
    Acknowledgment,
    AccessDenied,
    Timeout,
    NetworkIssues,
    Connected,
    Reconnected,
    Disconnected,
    UnexpectedDisconnect,
    Cancelled,
    BadRequest,
    MalformedFilterExpression,
    MalformedResponse,
    DecryptionError,
    TlsConnectionFailed,
    TlsUntrustedCertificate,
    RequestMessageCountExceeded,
    ReconnectionAttemptsExhausted,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 18] = [
        Self::Unknown,
        Self::Acknowledgment,
        Self::AccessDenied,
        Self::Timeout,
        Self::NetworkIssues,
        Self::Connected,
        Self::Reconnected,
        Self::Disconnected,
        Self::UnexpectedDisconnect,
        Self::Cancelled,
        Self::BadRequest,
        Self::MalformedFilterExpression,
        Self::MalformedResponse,
        Self::DecryptionError,
        Self::TlsConnectionFailed,
        Self::TlsUntrustedCertificate,
        Self::RequestMessageCountExceeded,
        Self::ReconnectionAttemptsExhausted,
    ];

    /// Integer code sent to the host
    pub fn code(&self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Acknowledgment => 1,
            Self::AccessDenied => 2,
            Self::Timeout => 3,
            Self::NetworkIssues => 4,
            Self::Connected => 5,
            Self::Reconnected => 6,
            Self::Disconnected => 7,
            Self::UnexpectedDisconnect => 8,
            Self::Cancelled => 9,
            Self::BadRequest => 10,
            Self::MalformedFilterExpression => 11,
            Self::MalformedResponse => 12,
            Self::DecryptionError => 13,
            Self::TlsConnectionFailed => 14,
            Self::TlsUntrustedCertificate => 15,
            Self::RequestMessageCountExceeded => 16,
            Self::ReconnectionAttemptsExhausted => 0,
        }
    }

    /// SDK enumerant name, e.g. `PNConnectedCategory`
    pub fn sdk_name(&self) -> &'static str {
        match self {
            Self::Unknown => "PNUnknownCategory",
            Self::Acknowledgment => "PNAcknowledgmentCategory",
            Self::AccessDenied => "PNAccessDeniedCategory",
            Self::Timeout => "PNTimeoutCategory",
            Self::NetworkIssues => "PNNetworkIssuesCategory",
            Self::Connected => "PNConnectedCategory",
            Self::Reconnected => "PNReconnectedCategory",
            Self::Disconnected => "PNDisconnectedCategory",
            Self::UnexpectedDisconnect => "PNUnexpectedDisconnectCategory",
            Self::Cancelled => "PNCancelledCategory",
            Self::BadRequest => "PNBadRequestCategory",
            Self::MalformedFilterExpression => "PNMalformedFilterExpressionCategory",
            Self::MalformedResponse => "PNMalformedResponseCategory",
            Self::DecryptionError => "PNDecryptionErrorCategory",
            Self::TlsConnectionFailed => "PNTLSConnectionFailedCategory",
            Self::TlsUntrustedCertificate => "PNTLSUntrustedCertificateCategory",
            Self::RequestMessageCountExceeded => "PNRequestMessageCountExceededCategory",
            Self::ReconnectionAttemptsExhausted => "PNReconnectionAttemptsExhausted",
        }
    }
}

impl std::fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sdk_name())
    }
}

impl std::str::FromStr for StatusCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.sdk_name() == s)
            .ok_or_else(|| format!("Unknown status category: {}", s))
    }
}

/// Operation type reported by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    Subscribe,
    Unsubscribe,
    Publish,
    History,
    FetchMessages,
    DeleteMessages,
    WhereNow,
    Heartbeat,
    SetState,
    AddChannelsToGroup,
    RemoveChannelsFromGroup,
    ChannelGroups,
    RemoveGroup,
    ChannelsForGroup,
    PushNotificationEnabledChannels,
    AddPushNotificationsOnChannels,
    RemovePushNotificationsFromChannels,
    RemoveAllPushNotifications,
    Time,
    HereNow,
    GetState,
    AccessManagerAudit,
    AccessManagerGrant,
}

impl OperationType {
    pub const ALL: [OperationType; 23] = [
        Self::Subscribe,
        Self::Unsubscribe,
        Self::Publish,
        Self::History,
        Self::FetchMessages,
        Self::DeleteMessages,
        Self::WhereNow,
        Self::Heartbeat,
        Self::SetState,
        Self::AddChannelsToGroup,
        Self::RemoveChannelsFromGroup,
        Self::ChannelGroups,
        Self::RemoveGroup,
        Self::ChannelsForGroup,
        Self::PushNotificationEnabledChannels,
        Self::AddPushNotificationsOnChannels,
        Self::RemovePushNotificationsFromChannels,
        Self::RemoveAllPushNotifications,
        Self::Time,
        Self::HereNow,
        Self::GetState,
        Self::AccessManagerAudit,
        Self::AccessManagerGrant,
    ];

    /// Integer code sent to the host
    pub fn code(&self) -> i32 {
        match self {
            Self::Subscribe => 1,
            Self::Unsubscribe => 2,
            Self::Publish => 3,
            Self::History => 4,
            Self::FetchMessages => 5,
            Self::DeleteMessages => 6,
            Self::WhereNow => 7,
            Self::Heartbeat => 8,
            Self::SetState => 9,
            Self::AddChannelsToGroup => 10,
            Self::RemoveChannelsFromGroup => 11,
            Self::ChannelGroups => 12,
            Self::RemoveGroup => 13,
            Self::ChannelsForGroup => 14,
            Self::PushNotificationEnabledChannels => 15,
            Self::AddPushNotificationsOnChannels => 16,
            Self::RemovePushNotificationsFromChannels => 17,
            Self::RemoveAllPushNotifications => 18,
            Self::Time => 19,
            Self::HereNow | Self::GetState | Self::AccessManagerAudit | Self::AccessManagerGrant => 0,
        }
    }

    /// SDK enumerant name, e.g. `PNPublishOperation`
    pub fn sdk_name(&self) -> &'static str {
        match self {
            Self::Subscribe => "PNSubscribeOperation",
            Self::Unsubscribe => "PNUnsubscribeOperation",
            Self::Publish => "PNPublishOperation",
            Self::History => "PNHistoryOperation",
            Self::FetchMessages => "PNFetchMessagesOperation",
            Self::DeleteMessages => "PNDeleteMessagesOperation",
            Self::WhereNow => "PNWhereNowOperation",
            Self::Heartbeat => "PNHeartbeatOperation",
            Self::SetState => "PNSetStateOperation",
            Self::AddChannelsToGroup => "PNAddChannelsToGroupOperation",
            Self::RemoveChannelsFromGroup => "PNRemoveChannelsFromGroupOperation",
            Self::ChannelGroups => "PNChannelGroupsOperation",
            Self::RemoveGroup => "PNRemoveGroupOperation",
            Self::ChannelsForGroup => "PNChannelsForGroupOperation",
            Self::PushNotificationEnabledChannels => "PNPushNotificationEnabledChannelsOperation",
            Self::AddPushNotificationsOnChannels => "PNAddPushNotificationsOnChannelsOperation",
            Self::RemovePushNotificationsFromChannels => {
                "PNRemovePushNotificationsFromChannelsOperation"
            }
            Self::RemoveAllPushNotifications => "PNRemoveAllPushNotificationsOperation",
            Self::Time => "PNTimeOperation",
            Self::HereNow => "PNHereNowOperation",
            Self::GetState => "PNGetState",
            Self::AccessManagerAudit => "PNAccessManagerAudit",
            Self::AccessManagerGrant => "PNAccessManagerGrant",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sdk_name())
    }
}

impl std::str::FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|operation| operation.sdk_name() == s)
            .ok_or_else(|| format!("Unknown operation type: {}", s))
    }
}

/// Code for an optional category; an absent category maps to 0.
pub fn category_code(category: Option<StatusCategory>) -> i32 {
    category.map(|c| c.code()).unwrap_or(0)
}

/// Code for an optional operation; an absent operation maps to 0.
pub fn operation_code(operation: Option<OperationType>) -> i32 {
    operation.map(|o| o.code()).unwrap_or(0)
}

/// Code for a symbolic category name; unrecognised names map to 0.
pub fn category_code_for_name(name: &str) -> i32 {
    category_code(name.parse().ok())
}

/// Code for a symbolic operation name; unrecognised names map to 0.
pub fn operation_code_for_name(name: &str) -> i32 {
    operation_code(name.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes() {
        let expected = [
            ("PNUnknownCategory", 0),
            ("PNAcknowledgmentCategory", 1),
            ("PNAccessDeniedCategory", 2),
            ("PNTimeoutCategory", 3),
            ("PNNetworkIssuesCategory", 4),
            ("PNConnectedCategory", 5),
            ("PNReconnectedCategory", 6),
            ("PNDisconnectedCategory", 7),
            ("PNUnexpectedDisconnectCategory", 8),
            ("PNCancelledCategory", 9),
            ("PNBadRequestCategory", 10),
            ("PNMalformedFilterExpressionCategory", 11),
            ("PNMalformedResponseCategory", 12),
            ("PNDecryptionErrorCategory", 13),
            ("PNTLSConnectionFailedCategory", 14),
            ("PNTLSUntrustedCertificateCategory", 15),
            ("PNRequestMessageCountExceededCategory", 16),
            ("PNReconnectionAttemptsExhausted", 0),
        ];

        for (name, code) in expected {
            assert_eq!(category_code_for_name(name), code, "{}", name);
        }
        assert_eq!(expected.len(), StatusCategory::ALL.len());
    }

    #[test]
    fn test_operation_codes() {
        let expected = [
            ("PNSubscribeOperation", 1),
            ("PNUnsubscribeOperation", 2),
            ("PNPublishOperation", 3),
            ("PNHistoryOperation", 4),
            ("PNFetchMessagesOperation", 5),
            ("PNDeleteMessagesOperation", 6),
            ("PNWhereNowOperation", 7),
            ("PNHeartbeatOperation", 8),
            ("PNSetStateOperation", 9),
            ("PNAddChannelsToGroupOperation", 10),
            ("PNRemoveChannelsFromGroupOperation", 11),
            ("PNChannelGroupsOperation", 12),
            ("PNRemoveGroupOperation", 13),
            ("PNChannelsForGroupOperation", 14),
            ("PNPushNotificationEnabledChannelsOperation", 15),
            ("PNAddPushNotificationsOnChannelsOperation", 16),
            ("PNRemovePushNotificationsFromChannelsOperation", 17),
            ("PNRemoveAllPushNotificationsOperation", 18),
            ("PNTimeOperation", 19),
            ("PNHereNowOperation", 0),
            ("PNGetState", 0),
            ("PNAccessManagerAudit", 0),
            ("PNAccessManagerGrant", 0),
        ];

        for (name, code) in expected {
            assert_eq!(operation_code_for_name(name), code, "{}", name);
        }
        assert_eq!(expected.len(), OperationType::ALL.len());
    }

    #[test]
    fn test_unmapped_values_are_zero() {
        assert_eq!(category_code_for_name("PNSomethingNewCategory"), 0);
        assert_eq!(operation_code_for_name("PNFileUploadOperation"), 0);
        assert_eq!(category_code(None), 0);
        assert_eq!(operation_code(None), 0);
        assert_eq!(StatusCategory::default(), StatusCategory::Unknown);
        assert_eq!(StatusCategory::default().code(), 0);
    }

    #[test]
    fn test_name_round_trip() {
        for category in StatusCategory::ALL {
            assert_eq!(category.to_string().parse::<StatusCategory>(), Ok(category));
        }
        for operation in OperationType::ALL {
            assert_eq!(operation.to_string().parse::<OperationType>(), Ok(operation));
        }
    }
}
