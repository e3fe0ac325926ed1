//! Primary/fallback selection policies.

use super::error::DispatchError;
use crate::errors::ConfigurationError;
use crate::registry::GatewayConfigSet;
use crate::routing::RoutingTable;
use crate::types::GatewayKind;

/// How the engine picks the gateways for a message. Always chosen explicitly
/// by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Fixed primary and optional fallback, independent of destination.
    Static {
        primary: GatewayKind,
        fallback: Option<GatewayKind>,
    },
    /// Primary is the routing table's preferred gateway for the destination;
    /// the fallback is the other member of `pair`. Each hop is preceded by
    /// a configuration and connection check.
    Country { pair: (GatewayKind, GatewayKind) },
}

/// Gateways chosen for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Selection {
    pub primary: GatewayKind,
    pub fallback: Option<GatewayKind>,
}

impl DispatchPolicy {
    pub fn fixed(primary: GatewayKind, fallback: Option<GatewayKind>) -> Self {
        DispatchPolicy::Static { primary, fallback }
    }

    pub fn country(first: GatewayKind, second: GatewayKind) -> Self {
        DispatchPolicy::Country {
            pair: (first, second),
        }
    }

    /// Static policy from the config set's primary.
    ///
    /// The fallback is the config named `fallback`, or the first other active
    /// config when none is named.
    pub fn from_config_set(
        configs: &GatewayConfigSet,
        fallback: Option<&str>,
    ) -> Result<Self, DispatchError> {
        let primary = configs.primary().ok_or(DispatchError::NoPrimaryGateway)?;
        let primary_kind = primary.kind()?;

        let fallback_kind = match fallback {
            Some(name) => {
                let config =
                    configs
                        .get(name)
                        .ok_or_else(|| ConfigurationError::UnknownGatewayConfig {
                            name: name.to_string(),
                        })?;
                if !config.is_active {
                    return Err(ConfigurationError::InactiveGateway {
                        name: name.to_string(),
                    }
                    .into());
                }
                Some(config.kind()?)
            }
            None => configs
                .active()
                .into_iter()
                .filter(|config| config.name != primary.name)
                .find_map(|config| config.kind().ok()),
        };

        Ok(Self::fixed(
            primary_kind,
            fallback_kind.filter(|kind| *kind != primary_kind),
        ))
    }

    /// Gateway a message is charged to when no gateway could be selected.
    pub(crate) fn lead(&self) -> GatewayKind {
        match *self {
            DispatchPolicy::Static { primary, .. } => primary,
            DispatchPolicy::Country { pair: (first, _) } => first,
        }
    }

    /// Whether a hop must pass `is_configured` and `test_connection` first.
    pub fn checks_before_send(&self) -> bool {
        matches!(self, DispatchPolicy::Country { .. })
    }

    /// Resolve the gateways for a destination.
    pub(crate) fn select(
        &self,
        to: &str,
        routing: &RoutingTable,
        is_registered: impl Fn(GatewayKind) -> bool,
    ) -> Result<Selection, DispatchError> {
        match *self {
            DispatchPolicy::Static { primary, fallback } => {
                if !is_registered(primary) {
                    return Err(DispatchError::GatewayNotRegistered(primary));
                }
                Ok(Selection {
                    primary,
                    fallback: fallback.filter(|kind| *kind != primary && is_registered(*kind)),
                })
            }
            DispatchPolicy::Country { pair: (first, second) } => {
                let preferred = routing.gateway_for_phone(to);

                // Preferred gateway first, then the pair in order; the first
                // two registered candidates become primary and fallback.
                let mut candidates: Vec<GatewayKind> = Vec::with_capacity(3);
                for kind in [preferred, first, second] {
                    if !candidates.contains(&kind) && is_registered(kind) {
                        candidates.push(kind);
                    }
                }

                match candidates.as_slice() {
                    [] => Err(DispatchError::NoGatewayAvailable(first, second)),
                    [primary] => Ok(Selection {
                        primary: *primary,
                        fallback: None,
                    }),
                    [primary, fallback, ..] => Ok(Selection {
                        primary: *primary,
                        fallback: Some(*fallback),
                    }),
                }
            }
        }
    }
}
