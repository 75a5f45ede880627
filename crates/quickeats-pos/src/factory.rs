//! # Service Factory
//!
//! Maps `(restaurant_id, provider)` to a live adapter.
//!
//! ```text
//! get_service(config)
//!     │
//!     ├── !enabled ─────────────────────────► None (nothing constructed)
//!     │
//!     ├── cache hit (restaurant, provider) ─► Arc clone
//!     │
//!     └── builder.build(config, ctx)
//!             ├── toast / square ───────────► cache + return
//!             ├── clover / lightspeed ──────► None (warn)
//!             └── none / unrecognized ──────► None
//! ```
//!
//! `create_service` skips the cache entirely, so a connection test always
//! runs with the credentials it was handed.

use quickeats_core::{PosConfig, PosProvider};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::config::{ConnectorConfig, EndpointSettings, SquareSettings};
use crate::error::PosResult;
use crate::http::build_http_client;
use crate::service::PosService;
use crate::square::SquareService;
use crate::toast::ToastService;

// =============================================================================
// Service Context
// =============================================================================

/// Process-wide resources handed to every adapter at construction.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Shared connection pool. Cloning is a refcount bump.
    pub http: reqwest::Client,
    pub endpoints: EndpointSettings,
    pub square: SquareSettings,
}

impl ServiceContext {
    pub fn from_config(config: &ConnectorConfig) -> PosResult<Self> {
        Ok(ServiceContext {
            http: build_http_client(&config.http)?,
            endpoints: config.endpoints.clone(),
            square: config.square,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        ServiceContext {
            http: reqwest::Client::new(),
            endpoints: EndpointSettings::default(),
            square: SquareSettings::default(),
        }
    }
}

// =============================================================================
// Builder Seam
// =============================================================================

/// Constructs an adapter for one config, or `None` when the provider has no
/// implementation.
pub trait ServiceBuilder: Send + Sync {
    fn build(&self, config: &PosConfig, ctx: &ServiceContext) -> Option<Arc<dyn PosService>>;
}

/// Dispatches to the Toast and Square adapters.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProviderServiceBuilder;

impl ServiceBuilder for ProviderServiceBuilder {
    fn build(&self, config: &PosConfig, ctx: &ServiceContext) -> Option<Arc<dyn PosService>> {
        match config.provider {
            PosProvider::Toast => Some(Arc::new(ToastService::new(config.clone(), ctx))),
            PosProvider::Square => Some(Arc::new(SquareService::new(config.clone(), ctx))),
            PosProvider::Clover | PosProvider::Lightspeed => {
                warn!(
                    restaurant_id = %config.restaurant_id,
                    provider = config.provider.as_str(),
                    "POS provider not yet implemented"
                );
                None
            }
            PosProvider::None | PosProvider::Unrecognized => None,
        }
    }
}

// =============================================================================
// Factory
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ServiceKey {
    restaurant_id: String,
    provider: PosProvider,
}

impl ServiceKey {
    fn of(config: &PosConfig) -> Self {
        ServiceKey {
            restaurant_id: config.restaurant_id.clone(),
            provider: config.provider,
        }
    }
}

pub struct ServiceFactory {
    ctx: ServiceContext,
    builder: Box<dyn ServiceBuilder>,
    cache: RwLock<HashMap<ServiceKey, Arc<dyn PosService>>>,
}

impl ServiceFactory {
    pub fn new(ctx: ServiceContext) -> Self {
        Self::with_builder(ctx, ProviderServiceBuilder)
    }

    pub fn with_builder(ctx: ServiceContext, builder: impl ServiceBuilder + 'static) -> Self {
        ServiceFactory {
            ctx,
            builder: Box::new(builder),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Builds the context from connector config, then the factory.
    pub fn from_config(config: &ConnectorConfig) -> PosResult<Self> {
        Ok(Self::new(ServiceContext::from_config(config)?))
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Cached adapter for `config`, constructing one on a miss.
    ///
    /// Disabled configs never reach the builder.
    pub fn get_service(&self, config: &PosConfig) -> Option<Arc<dyn PosService>> {
        if !config.enabled {
            return None;
        }

        let key = ServiceKey::of(config);
        if let Ok(cache) = self.cache.read() {
            if let Some(service) = cache.get(&key) {
                return Some(Arc::clone(service));
            }
        }

        let service = self.create_service(config)?;
        match self.cache.write() {
            Ok(mut cache) => {
                // A concurrent miss may have won; keep the first one cached.
                let cached = cache.entry(key).or_insert(service);
                debug!(restaurant_id = %config.restaurant_id, "POS service cached");
                Some(Arc::clone(cached))
            }
            Err(_) => Some(service),
        }
    }

    /// Fresh, uncached adapter.
    pub fn create_service(&self, config: &PosConfig) -> Option<Arc<dyn PosService>> {
        self.builder.build(config, &self.ctx)
    }

    /// Evicts every cached adapter for the restaurant, whatever its provider.
    /// Returns how many were dropped.
    pub fn remove_service(&self, restaurant_id: &str) -> usize {
        match self.cache.write() {
            Ok(mut cache) => {
                let before = cache.len();
                cache.retain(|key, _| key.restaurant_id != restaurant_id);
                before - cache.len()
            }
            Err(_) => 0,
        }
    }

    pub fn clear_all(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Every cached adapter, in no particular order.
    pub fn services(&self) -> Vec<Arc<dyn PosService>> {
        self.cache
            .read()
            .map(|cache| cache.values().cloned().collect())
            .unwrap_or_default()
    }

    /// The cached adapter for a restaurant, if one exists.
    pub fn service_for_restaurant(&self, restaurant_id: &str) -> Option<Arc<dyn PosService>> {
        self.cache.read().ok().and_then(|cache| {
            cache
                .iter()
                .find(|(key, _)| key.restaurant_id == restaurant_id)
                .map(|(_, service)| Arc::clone(service))
        })
    }
}
