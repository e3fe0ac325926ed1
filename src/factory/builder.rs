//! Constructs gateway adapters from credentials and config records.

use super::credentials::Credentials;
use crate::dispatch::GatewayRegistry;
use crate::errors::ConfigurationError;
use crate::gateways::{AfricasTalking, AnyGateway, BulkGate, BulkSms, Gateway, Routee};
use crate::registry::GatewayConfig;
use crate::types::{Balance, GatewayKind};
use crate::utils::http::{HttpSettings, parse_base_url};
use serde::Serialize;
use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Credential fields each provider requires.
pub fn required_fields(kind: GatewayKind) -> &'static [&'static str] {
    match kind {
        GatewayKind::BulkSms => &["tokenId", "tokenSecret"],
        GatewayKind::BulkGate => &["apiKey"],
        GatewayKind::Routee => &["applicationId", "applicationSecret"],
        GatewayKind::AfricasTalking => &["username", "apiKey"],
    }
}

/// Diagnostic summary produced by [`GatewayFactory::test_gateway`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTestReport {
    pub configured: bool,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Balance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Builds adapters after validating credentials. Every adapter it builds
/// shares the factory's HTTP timeouts.
#[derive(Debug, Clone, Default)]
pub struct GatewayFactory {
    http: HttpSettings,
}

impl GatewayFactory {
    pub fn new(http: HttpSettings) -> Self {
        Self { http }
    }

    pub fn http_settings(&self) -> &HttpSettings {
        &self.http
    }

    /// Missing required fields, in declaration order.
    fn missing_fields(kind: GatewayKind, credentials: &Credentials) -> Vec<&'static str> {
        required_fields(kind)
            .iter()
            .copied()
            .filter(|field| !credentials.contains(field))
            .collect()
    }

    fn check(kind: GatewayKind, credentials: &Credentials) -> Result<(), ConfigurationError> {
        let missing = Self::missing_fields(kind, credentials);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::MissingCredentials {
                gateway: kind,
                missing,
            })
        }
    }

    /// True when every required field is present and non-empty.
    pub fn validate_credentials(kind: GatewayKind, credentials: &Credentials) -> bool {
        Self::missing_fields(kind, credentials).is_empty()
    }

    /// Build an adapter with its default endpoint.
    pub fn create(
        &self,
        kind: GatewayKind,
        credentials: &Credentials,
    ) -> Result<AnyGateway, ConfigurationError> {
        self.build(kind, credentials, None)
    }

    /// Same as [`create`](Self::create) with the provider given by name.
    pub fn create_by_name(
        &self,
        name: &str,
        credentials: &Credentials,
    ) -> Result<AnyGateway, ConfigurationError> {
        self.create(name.parse()?, credentials)
    }

    /// Build the adapter a config record describes, honouring its endpoint.
    pub fn create_from_config(
        &self,
        config: &GatewayConfig,
        credentials: &Credentials,
    ) -> Result<AnyGateway, ConfigurationError> {
        self.build(config.kind()?, credentials, config.api_endpoint.as_deref())
    }

    /// Build a registry from every active config. Credentials are looked up
    /// by provider.
    pub fn build_registry(
        &self,
        configs: &[GatewayConfig],
        credentials: &BTreeMap<GatewayKind, Credentials>,
    ) -> Result<GatewayRegistry<AnyGateway>, ConfigurationError> {
        let mut registry = GatewayRegistry::new();
        for config in configs.iter().filter(|config| config.is_active) {
            let kind = config.kind()?;
            let empty = Credentials::default();
            let gateway = self.create_from_config(config, credentials.get(&kind).unwrap_or(&empty))?;
            registry.insert(gateway);
        }

        #[cfg(feature = "tracing")]
        debug!(gateways = registry.len(), "Gateway registry built");

        Ok(registry)
    }

    fn build(
        &self,
        kind: GatewayKind,
        credentials: &Credentials,
        endpoint: Option<&str>,
    ) -> Result<AnyGateway, ConfigurationError> {
        Self::check(kind, credentials)?;

        let field = |name: &str| credentials.get(name).unwrap_or_default().to_string();
        let endpoint = endpoint.map(parse_base_url).transpose()?;
        let http_client = self.http.build_client()?;

        let gateway = match kind {
            GatewayKind::BulkSms => {
                let mut builder = BulkSms::builder(field("tokenId"), field("tokenSecret"))
                    .http_client(http_client);
                if let Some(url) = endpoint {
                    builder = builder.endpoint(url);
                }
                AnyGateway::BulkSms(builder.build()?)
            }
            GatewayKind::BulkGate => {
                let mut builder = BulkGate::builder(field("apiKey")).http_client(http_client);
                if let Some(application_id) = credentials.get("applicationId") {
                    builder = builder.application_id(application_id);
                }
                if let Some(url) = endpoint {
                    builder = builder.endpoint(url);
                }
                AnyGateway::BulkGate(builder.build()?)
            }
            GatewayKind::Routee => {
                let mut builder = Routee::builder(field("applicationId"), field("applicationSecret"))
                    .http_client(http_client);
                if let Some(url) = endpoint {
                    builder = builder.endpoint(url.clone()).auth_endpoint(url);
                }
                AnyGateway::Routee(builder.build()?)
            }
            GatewayKind::AfricasTalking => {
                let mut builder = AfricasTalking::builder(field("username"), field("apiKey"))
                    .http_client(http_client);
                if let Some(url) = endpoint {
                    builder = builder.endpoint(url);
                }
                AnyGateway::AfricasTalking(builder.build()?)
            }
        };

        #[cfg(feature = "tracing")]
        debug!(gateway = %kind, "Gateway created");

        Ok(gateway)
    }

    /// Check configuration, connectivity and balance of a gateway.
    ///
    /// A balance that cannot be fetched is a warning, not an error.
    pub async fn test_gateway<G: Gateway>(gateway: &G) -> GatewayTestReport {
        let mut report = GatewayTestReport {
            configured: gateway.is_configured(),
            ..Default::default()
        };
        if !report.configured {
            report.error = Some(format!("{} is not configured", gateway.kind()));
            return report;
        }

        report.connected = gateway.test_connection().await;
        if !report.connected {
            report.error = Some(format!("{} rejected the connection test", gateway.kind()));
            return report;
        }

        match gateway.get_balance().await {
            Ok(balance) => report.balance = Some(balance),
            Err(e) => {
                #[cfg(feature = "tracing")]
                warn!(gateway = %gateway.kind(), error = %e, "Balance check failed");

                report.warning = Some(format!("Could not fetch balance: {e}"));
            }
        }
        report
    }
}
