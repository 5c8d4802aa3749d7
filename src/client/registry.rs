//! Registry of named SDK clients.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::sdk::SdkClient;

/// A configured SDK connection registered under a name
pub struct ClientHandle {
    name: String,
    client: Arc<dyn SdkClient>,
}

impl ClientHandle {
    pub fn new(name: impl Into<String>, client: Arc<dyn SdkClient>) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &Arc<dyn SdkClient> {
        &self.client
    }

    pub fn uuid(&self) -> String {
        self.client.uuid()
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("name", &self.name)
            .field("uuid", &self.client.uuid())
            .finish()
    }
}

/// Name -> client map owned by the bridge.
///
/// Handles live as long as the registry; there is no removal.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: DashMap<String, Arc<ClientHandle>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle registered under `name`, creating it with `create`
    /// if absent. The flag is true when a new handle was created.
    ///
    /// `create` runs without holding any registry lock. When two callers race
    /// on the same name, the first insert wins and the other client is
    /// discarded.
    pub fn get_or_try_insert(
        &self,
        name: &str,
        create: impl FnOnce() -> Result<Arc<dyn SdkClient>>,
    ) -> Result<(Arc<ClientHandle>, bool)> {
        if let Some(existing) = self.get(name) {
            debug!("Client '{}' already exists", name);
            return Ok((existing, false));
        }

        let handle = Arc::new(ClientHandle::new(name, create()?));

        match self.clients.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                debug!("Client '{}' registered concurrently, discarding duplicate", name);
                Ok((entry.get().clone(), false))
            }
            Entry::Vacant(entry) => {
                entry.insert(handle.clone());
                debug!("Registered client '{}'", name);
                Ok((handle, true))
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<ClientHandle>> {
        self.clients.get(name).map(|h| h.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clients.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::sdk::{LoopbackClient, LoopbackNetwork, SdkConfiguration};

    fn loopback(uuid: &str) -> Result<Arc<dyn SdkClient>> {
        Ok(LoopbackClient::new(
            SdkConfiguration::new("pub", "sub").with_uuid(uuid),
            LoopbackNetwork::new(),
        ))
    }

    #[test]
    fn test_insert_is_idempotent() {
        let registry = ClientRegistry::new();

        let (first, created) = registry.get_or_try_insert("c1", || loopback("one")).unwrap();
        assert!(created);

        let (second, created) = registry.get_or_try_insert("c1", || loopback("two")).unwrap();
        assert!(!created);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.uuid(), "one");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_creation_registers_nothing() {
        let registry = ClientRegistry::new();

        let result = registry.get_or_try_insert("c1", || Err(BridgeError::sdk("down")));
        assert!(result.is_err());
        assert!(!registry.contains("c1"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_runs_without_holding_the_registry() {
        let registry = ClientRegistry::new();
        registry.get_or_try_insert("other", || loopback("other")).unwrap();

        let (handle, created) = registry
            .get_or_try_insert("c1", || {
                assert!(registry.get("other").is_some());
                assert!(!registry.contains("c1"));
                loopback("one")
            })
            .unwrap();
        assert!(created);
        assert_eq!(handle.uuid(), "one");
    }

    #[test]
    fn test_concurrent_insert_keeps_first() {
        let registry = ClientRegistry::new();

        let (handle, created) = registry
            .get_or_try_insert("c1", || {
                registry.get_or_try_insert("c1", || loopback("winner")).unwrap();
                loopback("loser")
            })
            .unwrap();
        assert!(!created);
        assert_eq!(handle.uuid(), "winner");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_sorted() {
        let registry = ClientRegistry::new();
        registry.get_or_try_insert("b", || loopback("b")).unwrap();
        registry.get_or_try_insert("a", || loopback("a")).unwrap();

        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
        assert!(registry.get("a").is_some());
        assert!(registry.get("c").is_none());
    }
}
