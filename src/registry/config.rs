//! Stored gateway configuration records.

use crate::errors::ConfigurationError;
use crate::types::GatewayKind;
use serde::{Deserialize, Serialize};

/// How a gateway authenticates. Informational; each adapter knows its own
/// scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    Basic,
    ApiKey,
    #[serde(rename = "oauth2")]
    OAuth2,
    ApiKeyHeader,
}

impl AuthType {
    /// Scheme used by `kind`.
    pub fn for_gateway(kind: GatewayKind) -> Self {
        match kind {
            GatewayKind::BulkSms => AuthType::Basic,
            GatewayKind::BulkGate => AuthType::ApiKey,
            GatewayKind::Routee => AuthType::OAuth2,
            GatewayKind::AfricasTalking => AuthType::ApiKeyHeader,
        }
    }
}

/// One gateway configuration record as kept by the settings store.
///
/// `name` identifies the provider (`"bulksms"`, `"routee"`, ...). At most one
/// active record may have `is_primary` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_primary: bool,
    /// Overrides the adapter's default base URL when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    pub auth_type: AuthType,
}

impl GatewayConfig {
    /// Active, non-primary record for `kind` with default endpoint.
    pub fn new(kind: GatewayKind) -> Self {
        Self {
            id: kind.as_str().to_string(),
            name: kind.as_str().to_string(),
            display_name: kind.to_string(),
            is_active: true,
            is_primary: false,
            api_endpoint: None,
            auth_type: AuthType::for_gateway(kind),
        }
    }

    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Provider this record configures.
    pub fn kind(&self) -> Result<GatewayKind, ConfigurationError> {
        self.name.parse()
    }
}
