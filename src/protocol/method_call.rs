//! Host method-call envelope and results.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};

/// Name of the host method channel
pub const METHOD_CHANNEL_NAME: &str = "flutter.ingenio.com/pubnub_flutter";

/// Argument key naming the target client
pub const CLIENT_NAME_KEY: &str = "clientName";

/// Methods understood by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Create,
    Subscribe,
    Unsubscribe,
    Publish,
    SetState,
    Uuid,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Publish => "publish",
            Self::SetState => "setState",
            Self::Uuid => "uuid",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Self::Create),
            "subscribe" => Ok(Self::Subscribe),
            "unsubscribe" => Ok(Self::Unsubscribe),
            "publish" => Ok(Self::Publish),
            "setState" => Ok(Self::SetState),
            "uuid" => Ok(Self::Uuid),
            _ => Err(BridgeError::not_implemented(s)),
        }
    }
}

/// A method invocation coming from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Decode a call from its JSON envelope
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Arguments as a map; anything else is treated as no arguments
    pub fn arguments_map(&self) -> Option<&Map<String, Value>> {
        self.arguments.as_object()
    }

    /// Raw argument value; `null` counts as absent
    pub fn raw_argument(&self, key: &str) -> Option<&Value> {
        self.arguments_map()
            .and_then(|args| args.get(key))
            .filter(|v| !v.is_null())
    }

    /// Typed argument; absent or mistyped values yield `None`
    pub fn argument<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.raw_argument(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Optional string argument. Absent yields `Ok(None)`; a value of any
    /// other type fails with `err`.
    pub fn optional_str(&self, key: &str, err: BridgeError) -> Result<Option<&str>> {
        match self.raw_argument(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(err),
        }
    }

    /// Required string argument; absent or mistyped fails with `err`
    pub fn required_str(&self, key: &str, err: BridgeError) -> Result<&str> {
        self.optional_str(key, err.clone())?.ok_or(err)
    }

    /// Target client name, failing with `err` when it is not a string
    pub fn client_name(&self, err: BridgeError) -> Result<Option<&str>> {
        self.optional_str(CLIENT_NAME_KEY, err)
    }

    /// Decode all arguments into a typed request
    pub fn arguments_as<T: DeserializeOwned>(&self) -> Result<T> {
        let arguments = if self.arguments.is_null() {
            Value::Object(Map::new())
        } else {
            self.arguments.clone()
        };
        Ok(serde_json::from_value(arguments)?)
    }
}

/// Result of a method invocation as seen by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResult {
    Success {
        value: Value,
    },
    Error {
        code: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResult {
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success {
            value: value.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// JSON envelope handed back to the host
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"status\":\"notImplemented\"}".into())
    }
}

impl<T: Into<Value>> From<Result<T>> for MethodResult {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(BridgeError::NotImplemented { .. }) => Self::NotImplemented,
            Err(err) => Self::Error {
                code: err.code().to_string(),
                message: err.to_string(),
                details: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_methods() {
        assert_eq!("setState".parse::<Method>().unwrap(), Method::SetState);
        assert_eq!("uuid".parse::<Method>().unwrap(), Method::Uuid);
        assert!(matches!(
            "history".parse::<Method>(),
            Err(BridgeError::NotImplemented { .. })
        ));
    }

    #[test]
    fn test_arguments() {
        let call = MethodCall::new(
            "subscribe",
            json!({"clientName": "c1", "channels": ["a", "b"], "channel": null}),
        );

        assert_eq!(call.client_name(BridgeError::CannotSubscribe), Ok(Some("c1")));
        assert_eq!(
            call.argument::<Vec<String>>("channels"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert!(call.raw_argument("channel").is_none());
        assert!(call.argument::<u32>("channels").is_none());
    }

    #[test]
    fn test_mistyped_string_arguments() {
        let call = MethodCall::new(
            "unsubscribe",
            json!({"clientName": 42, "channel": ["a"], "uuid": "me"}),
        );

        assert_eq!(
            call.client_name(BridgeError::CannotUnsubscribe),
            Err(BridgeError::CannotUnsubscribe)
        );
        assert_eq!(
            call.optional_str("channel", BridgeError::CannotUnsubscribe),
            Err(BridgeError::CannotUnsubscribe)
        );
        assert_eq!(call.optional_str("missing", BridgeError::CannotPublish), Ok(None));
        assert_eq!(
            call.required_str("missing", BridgeError::CannotPublish),
            Err(BridgeError::CannotPublish)
        );
        assert_eq!(call.required_str("uuid", BridgeError::CannotSetState), Ok("me"));
    }

    #[test]
    fn test_from_json_without_arguments() {
        let call = MethodCall::from_json(r#"{"method":"uuid"}"#).unwrap();
        assert_eq!(call.method, "uuid");
        assert_eq!(call.client_name(BridgeError::ClientNotConfigured), Ok(None));
    }

    #[test]
    fn test_result_conversion() {
        let ok: MethodResult = Ok::<bool, BridgeError>(true).into();
        assert_eq!(ok, MethodResult::success(true));

        let failed: MethodResult = Err::<bool, _>(BridgeError::CannotPublish).into();
        assert_eq!(
            failed,
            MethodResult::Error {
                code: "ERROR".into(),
                message: "Cannot Publish.".into(),
                details: None,
            }
        );

        let missing: MethodResult = Err::<bool, _>(BridgeError::not_implemented("x")).into();
        assert_eq!(missing, MethodResult::NotImplemented);
        assert_eq!(missing.to_json(), r#"{"status":"notImplemented"}"#);
    }
}
