//! Error types for the PubNub bridge.

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error code attached to every failed method-call result.
pub const ERROR_CODE: &str = "ERROR";

/// Main error type for the bridge.
///
/// Precondition failures render the fixed per-operation message that Dart
/// callers match on, so their `Display` output must not change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Wrong PubNub Credentials.")]
    WrongCredentials,

    #[error("Cannot Subscribe.")]
    CannotSubscribe,

    #[error("Cannot Unsubscribe.")]
    CannotUnsubscribe,

    #[error("Cannot Publish.")]
    CannotPublish,

    #[error("Cannot Set State.")]
    CannotSetState,

    #[error("Cannot Get UUID. PubNub Client Not Configured.")]
    ClientNotConfigured,

    #[error("Method not implemented: {method}")]
    NotImplemented { method: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    #[error("SDK error: {message}")]
    SdkError { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl BridgeError {
    pub fn not_implemented(method: impl Into<String>) -> Self {
        Self::NotImplemented {
            method: method.into(),
        }
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError {
            message: msg.into(),
        }
    }

    pub fn sdk(msg: impl Into<String>) -> Self {
        Self::SdkError {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: msg.into(),
        }
    }

    /// Code reported to the host alongside the message.
    pub fn code(&self) -> &'static str {
        ERROR_CODE
    }

    /// Whether this error is a caller-side precondition failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::WrongCredentials
                | Self::CannotSubscribe
                | Self::CannotUnsubscribe
                | Self::CannotPublish
                | Self::CannotSetState
                | Self::ClientNotConfigured
        )
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
