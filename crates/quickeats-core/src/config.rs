//! # Restaurant POS Configuration
//!
//! One `PosConfig` exists per restaurant. It is created and edited by an
//! administrator, handed to the manager, and never persisted by this layer.
//!
//! ## Credentials: Wire Shape vs Typed Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Admin form JSON                                                       │
//! │   { "apiKey": "...", "locationId": "..." }                              │
//! │            │                                                            │
//! │            ▼                                                            │
//! │   CredentialSet  (every field optional, what callers actually send)    │
//! │            │                                                            │
//! │            │ resolve()  → lists EVERY missing field in one error        │
//! │            ▼                                                            │
//! │   ToastCredentials { api_key, api_secret, location_id }                 │
//! │   SquareCredentials { access_token, location_id }                       │
//! │                                                                         │
//! │   Adapters only ever hold the typed form.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{ConfigError, ConfigResult};
use crate::money::TaxRate;
use crate::provider::{ConnectionStatus, PosProvider};

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_sync_interval() -> u32 {
    60
}

/// `taxRate` travels as a fraction of the subtotal (`0.08` = 8%).
mod tax_fraction {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::money::TaxRate;

    pub fn serialize<S: Serializer>(
        rate: &Option<TaxRate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match rate {
            Some(rate) => serializer.serialize_some(&rate.fraction()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TaxRate>, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            None => Ok(None),
            Some(fraction) => TaxRate::from_fraction(fraction).map(Some).ok_or_else(|| {
                D::Error::custom(format!(
                    "taxRate must be a fraction between 0 and 1, got {}",
                    fraction
                ))
            }),
        }
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Named secrets as submitted by the admin form.
///
/// Empty strings count as absent. `Debug` never prints secret values.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl CredentialSet {
    pub fn api_key(&self) -> Option<&str> {
        present(&self.api_key)
    }

    pub fn api_secret(&self) -> Option<&str> {
        present(&self.api_secret)
    }

    pub fn access_token(&self) -> Option<&str> {
        present(&self.access_token)
    }

    pub fn location_id(&self) -> Option<&str> {
        present(&self.location_id)
    }

    pub fn merchant_id(&self) -> Option<&str> {
        present(&self.merchant_id)
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(value: &Option<String>) -> &'static str {
            if present(value).is_some() {
                "<redacted>"
            } else {
                "<unset>"
            }
        }

        f.debug_struct("CredentialSet")
            .field("api_key", &mask(&self.api_key))
            .field("api_secret", &mask(&self.api_secret))
            .field("access_token", &mask(&self.access_token))
            .field("refresh_token", &mask(&self.refresh_token))
            .field("location_id", &self.location_id)
            .field("merchant_id", &self.merchant_id)
            .finish()
    }
}

/// Toast API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ToastCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub location_id: String,
}

impl ToastCredentials {
    /// Required wire field names, in reporting order.
    pub const REQUIRED: [&'static str; 3] = ["apiKey", "apiSecret", "locationId"];

    /// Resolves typed credentials, reporting all absent fields together.
    pub fn resolve(creds: &CredentialSet) -> ConfigResult<Self> {
        let api_key = creds.api_key();
        let api_secret = creds.api_secret();
        let location_id = creds.location_id();

        match (api_key, api_secret, location_id) {
            (Some(api_key), Some(api_secret), Some(location_id)) => Ok(ToastCredentials {
                api_key: api_key.to_string(),
                api_secret: api_secret.to_string(),
                location_id: location_id.to_string(),
            }),
            _ => {
                let fields = Self::REQUIRED
                    .into_iter()
                    .zip([api_key, api_secret, location_id])
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| name)
                    .collect();
                Err(ConfigError::MissingCredentials { fields })
            }
        }
    }
}

impl fmt::Debug for ToastCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastCredentials")
            .field("location_id", &self.location_id)
            .finish_non_exhaustive()
    }
}

/// Square API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct SquareCredentials {
    pub access_token: String,
    pub location_id: String,
}

impl SquareCredentials {
    pub const REQUIRED: [&'static str; 2] = ["accessToken", "locationId"];

    pub fn resolve(creds: &CredentialSet) -> ConfigResult<Self> {
        match (creds.access_token(), creds.location_id()) {
            (Some(access_token), Some(location_id)) => Ok(SquareCredentials {
                access_token: access_token.to_string(),
                location_id: location_id.to_string(),
            }),
            (access_token, location_id) => {
                let fields = Self::REQUIRED
                    .into_iter()
                    .zip([access_token, location_id])
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| name)
                    .collect();
                Err(ConfigError::MissingCredentials { fields })
            }
        }
    }
}

impl fmt::Debug for SquareCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SquareCredentials")
            .field("location_id", &self.location_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Integration Settings
// =============================================================================

/// Per-restaurant behavior switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSettings {
    #[serde(default = "default_true")]
    pub auto_sync_menu: bool,

    #[serde(default = "default_true")]
    pub auto_send_orders: bool,

    /// Minutes between automatic menu syncs.
    #[serde(default = "default_sync_interval")]
    pub sync_interval: u32,

    #[serde(default)]
    pub sync_inventory: bool,

    #[serde(default = "default_true")]
    pub update_prices: bool,

    /// Category names skipped during menu fetch (exact match).
    #[serde(default)]
    pub excluded_categories: Vec<String>,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        IntegrationSettings {
            auto_sync_menu: true,
            auto_send_orders: true,
            sync_interval: default_sync_interval(),
            sync_inventory: false,
            update_prices: true,
            excluded_categories: Vec::new(),
        }
    }
}

impl IntegrationSettings {
    pub fn is_excluded(&self, category: &str) -> bool {
        self.excluded_categories.iter().any(|c| c == category)
    }

    /// Auto-sync runs only when switched on with a positive interval.
    pub fn wants_auto_sync(&self) -> bool {
        self.auto_sync_menu && self.sync_interval > 0
    }
}

// =============================================================================
// POS Config
// =============================================================================

/// POS integration configuration for one restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosConfig {
    pub restaurant_id: String,

    #[serde(default)]
    #[ts(type = "string")]
    pub provider: PosProvider,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub credentials: Option<CredentialSet>,

    #[serde(default)]
    pub settings: IntegrationSettings,

    /// Selects the provider's sandbox endpoint instead of production.
    #[serde(default = "default_true")]
    pub sandbox_mode: bool,

    /// Sales tax rate sent to providers that need a percentage (Square).
    #[serde(default, with = "tax_fraction", skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub tax_rate: Option<TaxRate>,

    #[serde(default)]
    pub status: ConnectionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl PosConfig {
    /// Creates a disabled config with admin-form defaults.
    pub fn new(restaurant_id: impl Into<String>, provider: PosProvider) -> Self {
        PosConfig {
            restaurant_id: restaurant_id.into(),
            provider,
            enabled: false,
            credentials: None,
            settings: IntegrationSettings::default(),
            sandbox_mode: true,
            tax_rate: None,
            status: ConnectionStatus::Disconnected,
            last_error: None,
            last_sync: None,
        }
    }

    fn credential_set(&self) -> ConfigResult<&CredentialSet> {
        self.credentials
            .as_ref()
            .ok_or(ConfigError::CredentialsRequired)
    }

    pub fn toast_credentials(&self) -> ConfigResult<ToastCredentials> {
        ToastCredentials::resolve(self.credential_set()?)
    }

    pub fn square_credentials(&self) -> ConfigResult<SquareCredentials> {
        SquareCredentials::resolve(self.credential_set()?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
