//! # quickeats-pos: POS Integration Layer for QuickEats
//!
//! Connects restaurants to third-party point-of-sale systems. Callers hand
//! over a restaurant's [`PosConfig`](quickeats_core::PosConfig) and never
//! learn which provider is behind it.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       POS Integration Architecture                      │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    PosManager (Facade)                           │  │
//! │  │                                                                  │  │
//! │  │  initialize / sync_menu / send_order / status / cancel           │  │
//! │  │  One auto-sync task per restaurant ──► MenuSyncSink              │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │                    ServiceFactory                                │  │
//! │  │                                                                  │  │
//! │  │  (restaurant_id, provider) ──► Arc<dyn PosService>  (cached)     │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │              ┌────────────────┴────────────────┐                        │
//! │              ▼                                 ▼                        │
//! │  ┌────────────────────────┐       ┌────────────────────────┐           │
//! │  │     ToastService       │       │     SquareService      │           │
//! │  │                        │       │                        │           │
//! │  │ menus → groups → items │       │ flat catalog, joined   │           │
//! │  │ void to cancel         │       │ by id; versioned PUT   │           │
//! │  └───────────┬────────────┘       └───────────┬────────────┘           │
//! │              └──────────────┬─────────────────┘                         │
//! │                             ▼                                           │
//! │                  ApiClient (shared reqwest pool)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Connector configuration (timeouts, endpoints, restaurants)
//! - [`error`] - POS error types
//! - [`http`] - Provider-bound HTTP client
//! - [`service`] - The `PosService` contract and shared adapter helpers
//! - [`toast`] - Toast adapter
//! - [`square`] - Square adapter
//! - [`factory`] - Adapter construction and caching
//! - [`manager`] - Restaurant-scoped facade and auto-sync
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quickeats_pos::{ConnectorConfig, PosManager, ServiceFactory};
//!
//! let config = ConnectorConfig::load_or_default(None);
//! let factory = Arc::new(ServiceFactory::from_config(&config)?);
//! let manager = PosManager::new(factory);
//!
//! let result = manager.initialize_restaurant(&restaurant_config).await;
//! let menu = manager.sync_menu(&restaurant_config).await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod factory;
pub mod http;
pub mod manager;
pub mod service;
pub mod square;
pub mod toast;

#[cfg(test)]
mod mock;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConnectorConfig, EndpointSettings, HttpSettings, IdempotencyMode, SquareSettings};
pub use error::{PosError, PosResult};
pub use factory::{ProviderServiceBuilder, ServiceBuilder, ServiceContext, ServiceFactory};
pub use manager::{LoggingSyncSink, MenuSyncSink, PosManager};
pub use service::{PosService, ServiceDiagnostics};
pub use square::SquareService;
pub use toast::ToastService;
