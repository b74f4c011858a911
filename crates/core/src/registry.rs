//! Instance-keyed table of running bridge instances.
//!
//! The host platform's per-integration storage becomes an explicit table
//! owned by the application context and passed by reference to anything
//! that needs lookup - never an ambient global.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{info, warn};

use crate::setup::BridgeInstance;

/// Table mapping instance id to its running bridge.
#[derive(Default)]
pub struct InstanceRegistry {
    instances: Mutex<HashMap<String, Arc<BridgeInstance>>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_instances(&self) -> MutexGuard<'_, HashMap<String, Arc<BridgeInstance>>> {
        self.instances.lock().unwrap_or_else(|poisoned| {
            warn!("Instance registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Register a running instance under the given id.
    ///
    /// Replacing an existing instance shuts the old one down first.
    pub fn insert(&self, instance_id: &str, instance: Arc<BridgeInstance>) {
        let previous = self
            .lock_instances()
            .insert(instance_id.to_string(), instance);
        if let Some(previous) = previous {
            warn!("Replacing bridge instance {}", instance_id);
            previous.shutdown();
        }
        info!("Registered bridge instance {}", instance_id);
    }

    /// Look up a running instance.
    pub fn get(&self, instance_id: &str) -> Option<Arc<BridgeInstance>> {
        self.lock_instances().get(instance_id).cloned()
    }

    /// Unload an instance: its polling task is cancelled immediately,
    /// and the instance is removed from the table.
    pub fn remove(&self, instance_id: &str) -> Option<Arc<BridgeInstance>> {
        let instance = self.lock_instances().remove(instance_id);
        if let Some(instance) = &instance {
            instance.shutdown();
            info!("Unloaded bridge instance {}", instance_id);
        }
        instance
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.lock_instances().len()
    }

    /// Whether any instance is registered.
    pub fn is_empty(&self) -> bool {
        self.lock_instances().is_empty()
    }
}
