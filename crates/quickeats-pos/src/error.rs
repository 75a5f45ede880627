//! # POS Error Types
//!
//! Error types for provider operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        POS Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Provider     │  │     Availability        │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Config         │  │  Provider       │  │  ServiceUnavailable     │ │
//! │  │  InvalidClient  │  │  Transport      │  │                         │ │
//! │  │  ConfigLoad/Save│  │  Malformed      │  │  (never a network       │ │
//! │  │  InvalidOrder   │  │  OrderNotFound  │  │   error)                │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Config errors never reach the network. Provider errors are recorded   │
//! │  on the adapter (status = error, last_error = message) before they     │
//! │  are returned.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use quickeats_core::{ConfigError, OrderError, PosProvider};
use thiserror::Error;

/// Result type alias for POS operations.
pub type PosResult<T> = Result<T, PosError>;

/// Errors raised by adapters, the factory and the manager.
#[derive(Debug, Error)]
pub enum PosError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Missing provider or credentials. Raised before any request is made.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The shared HTTP client or an endpoint override could not be built.
    #[error("Invalid HTTP client configuration: {0}")]
    InvalidClientConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// The order cannot be sent to any provider as-is.
    #[error(transparent)]
    InvalidOrder(#[from] OrderError),

    // =========================================================================
    // Provider Errors
    // =========================================================================
    /// Non-2xx response. `message` already carries the provider's payload,
    /// e.g. "Toast API Error: 500 - upstream timeout".
    #[error("{message}")]
    Provider {
        provider: PosProvider,
        status: Option<u16>,
        message: String,
    },

    /// The request never produced a response (DNS, refused, timeout).
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: PosProvider,
        message: String,
    },

    /// 2xx response whose body is not what the endpoint documents.
    #[error("Unexpected {provider} response: {reason}")]
    MalformedResponse {
        provider: PosProvider,
        reason: String,
    },

    /// The provider does not know this order.
    #[error("{provider} order {external_id} not found")]
    OrderNotFound {
        provider: PosProvider,
        external_id: String,
    },

    // =========================================================================
    // Availability Errors
    // =========================================================================
    /// No adapter resolves for the restaurant (disabled, `none`, or an
    /// announced-but-unimplemented provider).
    #[error("POS service not available")]
    ServiceUnavailable { restaurant_id: String },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for PosError {
    fn from(err: serde_json::Error) -> Self {
        PosError::MalformedResponse {
            provider: PosProvider::Unrecognized,
            reason: err.to_string(),
        }
    }
}

impl From<url::ParseError> for PosError {
    fn from(err: url::ParseError) -> Self {
        PosError::InvalidClientConfig(err.to_string())
    }
}

impl From<reqwest::Error> for PosError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            PosError::InvalidClientConfig(err.to_string())
        } else {
            PosError::Transport {
                provider: PosProvider::Unrecognized,
                message: err.to_string(),
            }
        }
    }
}

impl From<std::io::Error> for PosError {
    fn from(err: std::io::Error) -> Self {
        PosError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for PosError {
    fn from(err: toml::de::Error) -> Self {
        PosError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for PosError {
    fn from(err: toml::ser::Error) -> Self {
        PosError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl PosError {
    /// Returns true if a caller may reasonably retry the operation.
    ///
    /// Transport failures and provider 5xx/429 responses qualify. Retrying
    /// `send_order` is only safe with order-id idempotency keys.
    pub fn is_retryable(&self) -> bool {
        match self {
            PosError::Transport { .. } => true,
            PosError::Provider {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns true if the error came from the remote POS.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            PosError::Provider { .. }
                | PosError::Transport { .. }
                | PosError::MalformedResponse { .. }
                | PosError::OrderNotFound { .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            PosError::Config(_)
                | PosError::InvalidClientConfig(_)
                | PosError::ConfigLoadFailed(_)
                | PosError::ConfigSaveFailed(_)
        )
    }

    /// HTTP status of a provider rejection, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            PosError::Provider { status, .. } => *status,
            PosError::OrderNotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Attributes a provider-agnostic conversion to `provider`.
    pub(crate) fn for_provider(self, provider: PosProvider) -> Self {
        match self {
            PosError::Transport { message, .. } => PosError::Transport { provider, message },
            PosError::MalformedResponse { reason, .. } => {
                PosError::MalformedResponse { provider, reason }
            }
            other => other,
        }
    }
}
