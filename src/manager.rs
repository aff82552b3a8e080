//! Manager Module
//!
//! A registry of named instances. Not much more than a map with a
//! reserved-name check; each instance owns its own cache, stats and series
//! state and instances are never shared across names.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::RemoteClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::instance::Instance;

/// Name of the implicit default instance.
pub const DEFAULT_INSTANCE: &str = "_default_";

// == Manager ==
/// Constructs and looks up independent cachefront instances by name.
#[derive(Default)]
pub struct Manager {
    instances: Mutex<HashMap<String, Arc<Instance>>>,
}

impl Manager {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the instance with the given name, constructing it on first
    /// use. Names with the reserved `_` prefix (other than the default) are
    /// rejected.
    pub async fn factory(
        &self,
        name: &str,
        config: Config,
        remote: Arc<dyn RemoteClient>,
    ) -> Result<Arc<Instance>> {
        if name.starts_with('_') && name != DEFAULT_INSTANCE {
            return Err(Error::Configuration(format!(
                "invalid instance name \"{}\" (\"_\" prefix is reserved for internal use)",
                name
            )));
        }
        let mut instances = self.instances.lock().await;
        if let Some(existing) = instances.get(name) {
            return Ok(existing.clone());
        }
        let instance = Instance::new(config, remote, name)?;
        instances.insert(name.to_string(), instance.clone());
        Ok(instance)
    }

    /// All currently known instances by name.
    pub async fn list(&self) -> HashMap<String, Arc<Instance>> {
        self.instances.lock().await.clone()
    }

    /// True once every known instance has finished its mapping setup.
    pub async fn ready(&self) -> bool {
        self.instances.lock().await.values().all(|i| i.ready())
    }

    /// Closes and removes every previously created instance.
    pub async fn reset(&self) {
        let drained: Vec<_> = {
            let mut instances = self.instances.lock().await;
            instances.drain().map(|(_, instance)| instance).collect()
        };
        for instance in drained {
            instance.close().await;
        }
    }
}
