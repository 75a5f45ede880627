//! # Connector Configuration
//!
//! Process-level settings for the integration layer. Per-restaurant
//! settings live in [`PosConfig`] and are handed in by callers; this file
//! only covers what is shared by every adapter in the process.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     QUICKEATS_POS_TIMEOUT_SECS=15                                      │
//! │     QUICKEATS_SQUARE_IDEMPOTENCY=order_id                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/pos.toml (Linux)                                     │
//! │     ~/Library/Application Support/com.quickeats.pos/pos.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     30s timeout, provider endpoints picked by sandboxMode              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pos.toml
//! [http]
//! timeout_secs = 30
//!
//! [endpoints]
//! # Only set these to point at a proxy or a local fake.
//! # toast_base_url = "http://127.0.0.1:9001"
//! # square_base_url = "http://127.0.0.1:9002"
//!
//! [square]
//! idempotency = "timestamped"  # timestamped | order_id
//!
//! [[restaurants]]
//! restaurantId = "downtown"
//! provider = "square"
//! enabled = true
//!
//! [restaurants.credentials]
//! accessToken = "..."
//! locationId = "L8ZX..."
//! ```

use quickeats_core::PosConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{PosError, PosResult};

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_timeout_secs() -> u64 {
    30
}

// =============================================================================
// HTTP Settings
// =============================================================================

/// Settings for the shared HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout. Without one a hung provider hangs the caller.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Endpoint Overrides
// =============================================================================

/// Base URL overrides. When unset, `sandboxMode` picks the provider host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toast_base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_base_url: Option<String>,
}

// =============================================================================
// Square Settings
// =============================================================================

/// How Square `idempotency_key` values are built for order creation.
///
/// ```text
/// Timestamped  "{orderId}-{unix millis}"   every attempt is a new order
/// OrderId      "{orderId}"                  retries collapse into one
/// ```
/// `Timestamped` is the default for compatibility with existing
/// deployments, but it means a client-side retry creates a duplicate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdempotencyMode {
    #[default]
    Timestamped,
    OrderId,
}

impl std::fmt::Display for IdempotencyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdempotencyMode::Timestamped => write!(f, "timestamped"),
            IdempotencyMode::OrderId => write!(f, "order_id"),
        }
    }
}

impl std::str::FromStr for IdempotencyMode {
    type Err = PosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timestamped" | "timestamp" => Ok(IdempotencyMode::Timestamped),
            "order_id" | "order-id" | "orderid" => Ok(IdempotencyMode::OrderId),
            other => Err(PosError::InvalidClientConfig(format!(
                "Unknown idempotency mode: '{}'. Valid options: timestamped, order_id",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareSettings {
    #[serde(default)]
    pub idempotency: IdempotencyMode,
}

// =============================================================================
// Connector Config
// =============================================================================

/// Complete connector configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub endpoints: EndpointSettings,

    #[serde(default)]
    pub square: SquareSettings,

    /// Restaurants the agent process connects on startup.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restaurants: Vec<PosConfig>,
}

impl ConnectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pos.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> PosResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading connector config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load connector config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> PosResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| PosError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PosError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| PosError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Connector config saved");
        Ok(())
    }

    pub fn validate(&self) -> PosResult<()> {
        if self.http.timeout_secs == 0 {
            return Err(PosError::InvalidClientConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        for url in [&self.endpoints.toast_base_url, &self.endpoints.square_base_url]
            .into_iter()
            .flatten()
        {
            let parsed = Url::parse(url)?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(PosError::InvalidClientConfig(format!(
                    "Endpoint URL must start with http:// or https://, got: {}",
                    url
                )));
            }
        }

        for restaurant in &self.restaurants {
            if restaurant.restaurant_id.trim().is_empty() {
                return Err(PosError::InvalidClientConfig(
                    "restaurantId must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(timeout) = lookup("QUICKEATS_POS_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => {
                    debug!(timeout_secs = secs, "Overriding HTTP timeout from environment");
                    self.http.timeout_secs = secs;
                }
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric QUICKEATS_POS_TIMEOUT_SECS"),
            }
        }

        if let Some(url) = lookup("QUICKEATS_TOAST_BASE_URL") {
            debug!(url = %url, "Overriding Toast endpoint from environment");
            self.endpoints.toast_base_url = Some(url);
        }

        if let Some(url) = lookup("QUICKEATS_SQUARE_BASE_URL") {
            debug!(url = %url, "Overriding Square endpoint from environment");
            self.endpoints.square_base_url = Some(url);
        }

        if let Some(mode) = lookup("QUICKEATS_SQUARE_IDEMPOTENCY") {
            match mode.parse() {
                Ok(parsed) => self.square.idempotency = parsed,
                Err(_) => warn!(mode = %mode, "Unknown idempotency mode in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "quickeats", "pos")
            .map(|dirs| dirs.config_dir().join("pos.toml"))
    }
}
