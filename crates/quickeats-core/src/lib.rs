//! # quickeats-core: Pure Data Model for POS Integrations
//!
//! This crate is the shared vocabulary of the POS integration layer. Every
//! provider adapter translates *into* these types, and every caller (the
//! storefront, the admin screens) consumes *only* these types.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      QuickEats POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Storefront / Admin UI (JavaScript)                 │   │
//! │  │     builds PosConfig ──► reads SyncResult / OrderStatus         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON (camelCase)                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               quickeats-pos (PosManager, adapters)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ quickeats-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ provider │ │  config  │ │   menu   │ │ order / sync     │  │   │
//! │  │   │ status   │ │ creds    │ │ modifiers│ │ status / results │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE TRANSFORMS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`provider`] - Provider enum, connection status, provider catalog
//! - [`config`] - `PosConfig`, integration settings, credentials
//! - [`money`] - Integer-cent money that serializes as dollars
//! - [`menu`] - Normalized provider menu items and internal menu items
//! - [`order`] - Storefront orders, normalized POS orders, order status
//! - [`sync`] - Sync results and operation outcomes
//! - [`validation`] - Configuration validation
//! - [`error`] - Configuration and order error types
//!
//! ## Example Usage
//!
//! ```rust
//! use quickeats_core::{validation::validate_config, PosConfig, PosProvider};
//!
//! let mut config = PosConfig::new("rest-1", PosProvider::Square);
//! config.credentials = Some(Default::default());
//!
//! let report = validate_config(&config);
//! assert!(!report.valid);
//! assert_eq!(report.errors.len(), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod menu;
pub mod money;
pub mod order;
pub mod provider;
pub mod sync;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{
    CredentialSet, IntegrationSettings, PosConfig, SquareCredentials, ToastCredentials,
};
pub use error::{ConfigError, ConfigResult, OrderError, OrderResult};
pub use menu::{
    MenuItem, Modifier, ModifierGroup, PosMenuItem, PosModifier, PosModifierGroup, SelectionKind,
};
pub use money::{Money, TaxRate};
pub use order::{
    Order, OrderLine, OrderState, OrderStatus, OrderTotals, OrderType, OrderUpdates, PosOrder,
    PosOrderItem, PosOrderModifier, SelectedChoice, SelectedOption,
};
pub use provider::{ConnectionStatus, PosProvider, ProviderInfo};
pub use sync::{ConfigValidation, ConnectResult, InventoryCounts, SendOrderResult, SyncResult, SyncStats};
