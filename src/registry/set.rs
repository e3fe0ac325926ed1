//! In-memory gateway config set with the single-primary invariant.

use super::config::GatewayConfig;
use crate::errors::ConfigurationError;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(feature = "tracing")]
use tracing::info;

/// Shared view of the gateway config records.
///
/// Changing the primary clears every flag and sets the new one while holding
/// one write lock, so readers and concurrent writers always see exactly one
/// primary once there is one.
#[derive(Debug, Default)]
pub struct GatewayConfigSet {
    configs: RwLock<Vec<GatewayConfig>>,
}

impl GatewayConfigSet {
    /// Wrap loaded records. Fails if more than one active record is primary.
    pub fn new(configs: Vec<GatewayConfig>) -> Result<Self, ConfigurationError> {
        let primaries: Vec<String> = configs
            .iter()
            .filter(|c| c.is_active && c.is_primary)
            .map(|c| c.name.clone())
            .collect();
        if primaries.len() > 1 {
            return Err(ConfigurationError::MultiplePrimaries { names: primaries });
        }
        Ok(Self {
            configs: RwLock::new(configs),
        })
    }

    // A panic while holding the lock cannot leave a half-applied primary
    // switch, so poisoned data is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Vec<GatewayConfig>> {
        self.configs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<GatewayConfig>> {
        self.configs.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `name` the only primary gateway.
    pub fn set_primary(&self, name: &str) -> Result<(), ConfigurationError> {
        let mut configs = self.write();

        let target = configs
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ConfigurationError::UnknownGatewayConfig {
                name: name.to_string(),
            })?;
        if !configs[target].is_active {
            return Err(ConfigurationError::InactiveGateway {
                name: name.to_string(),
            });
        }

        for config in configs.iter_mut() {
            config.is_primary = false;
        }
        configs[target].is_primary = true;

        #[cfg(feature = "tracing")]
        info!(gateway = %name, "Primary gateway changed");

        Ok(())
    }

    /// The active primary config, if any.
    pub fn primary(&self) -> Option<GatewayConfig> {
        self.read()
            .iter()
            .find(|c| c.is_active && c.is_primary)
            .cloned()
    }

    /// Active configs in stored order.
    pub fn active(&self) -> Vec<GatewayConfig> {
        self.read().iter().filter(|c| c.is_active).cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<GatewayConfig> {
        self.read().iter().find(|c| c.name == name).cloned()
    }

    /// Copy of every record, for persisting.
    pub fn snapshot(&self) -> Vec<GatewayConfig> {
        self.read().clone()
    }
}
