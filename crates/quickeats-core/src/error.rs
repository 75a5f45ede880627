//! # Error Types
//!
//! Configuration errors for quickeats-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quickeats-core errors (this file)                                     │
//! │  ├── ConfigError      - Missing provider / credentials / bad settings  │
//! │  └── OrderError       - Orders no provider would accept               │
//! │                                                                         │
//! │  quickeats-pos errors (separate crate)                                 │
//! │  └── PosError         - Provider, transport, availability failures     │
//! │                                                                         │
//! │  Flow: ConfigError → PosError::Config → outcome.error → UI text        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Config errors are raised before any network call is made. Their
//! `Display` text is shown to administrators as-is.

use thiserror::Error;

use crate::provider::PosProvider;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No provider chosen, or the provider is `none`.
    #[error("POS provider not selected")]
    ProviderNotSelected,

    /// The config carries no credentials object at all.
    #[error("Credentials are required")]
    CredentialsRequired,

    /// One required credential is absent, labelled for the admin form.
    ///
    /// ## Example
    /// `MissingCredential { provider: Toast, label: "API Key" }`
    /// displays as "Toast API Key is required".
    #[error("{provider} {label} is required")]
    MissingCredential {
        provider: PosProvider,
        label: &'static str,
    },

    /// Every required credential that is absent, reported together.
    #[error("Missing required credentials: {}", .fields.join(", "))]
    MissingCredentials { fields: Vec<&'static str> },

    /// A setting has an unusable value.
    #[error("{field} is invalid: {reason}")]
    InvalidSetting { field: String, reason: String },
}

/// Convenience type alias for Results with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Orders rejected while normalizing, before they reach a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Toast and Square both require at least one unit per line.
    #[error("Order {order_id} line {line_id} has quantity 0")]
    ZeroQuantity { order_id: String, line_id: String },
}

pub type OrderResult<T> = Result<T, OrderError>;

// =============================================================================
// Unit Tests
// =============================================================================
