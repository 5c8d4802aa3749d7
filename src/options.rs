//! Configuration options for the bridge and for individual clients.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::sdk::{generate_uuid, SdkConfiguration};

/// Client name used when a request carries no `clientName`
pub const DEFAULT_CLIENT_NAME: &str = "default";

/// Bridge-wide options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeOptions {
    /// Client targeted by requests without a `clientName`
    #[serde(default)]
    pub default_client_name: Option<String>,

    /// Subscribe to presence channels along with every subscription
    #[serde(default)]
    pub with_presence: Option<bool>,

    /// Log every event record forwarded from the SDK at info level
    #[serde(default)]
    pub debug: Option<bool>,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            default_client_name: Some(DEFAULT_CLIENT_NAME.to_string()),
            with_presence: Some(true),
            debug: Some(false),
        }
    }
}

impl BridgeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set the default client name
    pub fn default_client_name(mut self, name: impl Into<String>) -> Self {
        self.default_client_name = Some(name.into());
        self
    }

    /// Builder pattern: enable/disable automatic presence subscription
    pub fn with_presence(mut self, enabled: bool) -> Self {
        self.with_presence = Some(enabled);
        self
    }

    /// Builder pattern: enable event record tracing
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }

    pub fn is_debug(&self) -> bool {
        self.debug.unwrap_or(false)
    }
}

/// Internal configuration derived from [`BridgeOptions`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub default_client_name: String,
    pub with_presence: bool,
    pub debug: bool,
}

impl From<BridgeOptions> for Config {
    fn from(opts: BridgeOptions) -> Self {
        Self {
            debug: opts.is_debug(),
            default_client_name: opts
                .default_client_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string()),
            with_presence: opts.with_presence.unwrap_or(true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        BridgeOptions::default().into()
    }
}

/// Arguments of one client entry in a `create` request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub publish_key: Option<String>,
    #[serde(default)]
    pub subscribe_key: Option<String>,
    #[serde(default)]
    pub auth_key: Option<String>,
    /// Accepted as any JSON value; only positive integers are applied
    #[serde(default)]
    pub presence_timeout: Option<serde_json::Value>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
}

impl ClientOptions {
    pub fn new(publish_key: impl Into<String>, subscribe_key: impl Into<String>) -> Self {
        Self {
            publish_key: Some(publish_key.into()),
            subscribe_key: Some(subscribe_key.into()),
            ..Default::default()
        }
    }

    /// Builder pattern: set the client name
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Builder pattern: set the auth key
    pub fn auth_key(mut self, key: impl Into<String>) -> Self {
        self.auth_key = Some(key.into());
        self
    }

    /// Builder pattern: set the presence timeout in seconds
    pub fn presence_timeout(mut self, seconds: i64) -> Self {
        self.presence_timeout = Some(seconds.into());
        self
    }

    /// Builder pattern: set the client uuid
    pub fn uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// Builder pattern: set the filter expression
    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter = Some(expression.into());
        self
    }

    /// Both keys present
    pub fn has_credentials(&self) -> bool {
        self.publish_key.is_some() && self.subscribe_key.is_some()
    }

    /// Presence timeout if it is a positive integer
    pub fn effective_presence_timeout(&self) -> Option<u32> {
        self.presence_timeout
            .as_ref()
            .and_then(|v| v.as_u64())
            .filter(|&t| t > 0)
            .and_then(|t| u32::try_from(t).ok())
    }

    /// Build the SDK configuration for this entry
    pub fn to_sdk_configuration(&self) -> Result<SdkConfiguration> {
        let (Some(publish_key), Some(subscribe_key)) = (&self.publish_key, &self.subscribe_key)
        else {
            return Err(BridgeError::WrongCredentials);
        };

        Ok(SdkConfiguration {
            publish_key: publish_key.clone(),
            subscribe_key: subscribe_key.clone(),
            auth_key: self.auth_key.clone(),
            presence_timeout: self.effective_presence_timeout(),
            uuid: self.uuid.clone().unwrap_or_else(generate_uuid),
            filter_expression: self.filter.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_client_name, DEFAULT_CLIENT_NAME);
        assert!(config.with_presence);
        assert!(!config.debug);
    }

    #[test]
    fn test_empty_default_name_falls_back() {
        let config: Config = BridgeOptions::new().default_client_name("").into();
        assert_eq!(config.default_client_name, DEFAULT_CLIENT_NAME);
    }

    #[test]
    fn test_client_options_from_camel_case() {
        let opts: ClientOptions = serde_json::from_value(json!({
            "clientName": "c1",
            "publishKey": "pub",
            "subscribeKey": "sub",
            "authKey": "auth",
            "presenceTimeout": 20,
            "uuid": "me",
            "filter": "uuid != 'me'"
        }))
        .unwrap();

        let config = opts.to_sdk_configuration().unwrap();
        assert_eq!(config.publish_key, "pub");
        assert_eq!(config.auth_key.as_deref(), Some("auth"));
        assert_eq!(config.presence_timeout, Some(20));
        assert_eq!(config.uuid, "me");
        assert_eq!(config.filter_expression.as_deref(), Some("uuid != 'me'"));
    }

    #[test]
    fn test_presence_timeout_only_when_positive_integer() {
        assert_eq!(
            ClientOptions::new("p", "s")
                .presence_timeout(0)
                .effective_presence_timeout(),
            None
        );
        assert_eq!(
            ClientOptions::new("p", "s")
                .presence_timeout(-5)
                .effective_presence_timeout(),
            None
        );

        let mut opts = ClientOptions::new("p", "s");
        opts.presence_timeout = Some(json!("30"));
        assert_eq!(opts.effective_presence_timeout(), None);
    }

    #[test]
    fn test_missing_keys() {
        let opts = ClientOptions {
            publish_key: Some("pub".into()),
            ..Default::default()
        };
        assert!(!opts.has_credentials());
        assert_eq!(
            opts.to_sdk_configuration(),
            Err(BridgeError::WrongCredentials)
        );
    }
}
