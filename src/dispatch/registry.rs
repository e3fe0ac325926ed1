//! Live gateway instances keyed by provider.

use crate::gateways::Gateway;
use crate::types::GatewayKind;
use std::collections::BTreeMap;

/// Gateways the engine can dispatch through, at most one per provider.
#[derive(Debug, Clone)]
pub struct GatewayRegistry<G> {
    gateways: BTreeMap<GatewayKind, G>,
}

impl<G> Default for GatewayRegistry<G> {
    fn default() -> Self {
        Self {
            gateways: BTreeMap::new(),
        }
    }
}

impl<G: Gateway> GatewayRegistry<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gateway under its own kind, replacing any previous one.
    pub fn insert(&mut self, gateway: G) -> Option<G> {
        self.gateways.insert(gateway.kind(), gateway)
    }

    pub fn with(mut self, gateway: G) -> Self {
        self.insert(gateway);
        self
    }

    pub fn get(&self, kind: GatewayKind) -> Option<&G> {
        self.gateways.get(&kind)
    }

    pub fn contains(&self, kind: GatewayKind) -> bool {
        self.gateways.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = GatewayKind> + '_ {
        self.gateways.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &G> {
        self.gateways.values()
    }

    pub fn len(&self) -> usize {
        self.gateways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }
}

impl<G: Gateway> FromIterator<G> for GatewayRegistry<G> {
    fn from_iter<I: IntoIterator<Item = G>>(iter: I) -> Self {
        let mut registry = Self::new();
        for gateway in iter {
            registry.insert(gateway);
        }
        registry
    }
}
