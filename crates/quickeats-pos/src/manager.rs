//! # POS Manager
//!
//! Restaurant-scoped facade over the factory and adapters. This is the only
//! surface storefront and admin callers use.
//!
//! ## Result Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  initialize_restaurant  ConnectResult      never Err                    │
//! │  sync_menu              SyncResult         never Err                    │
//! │  send_order             SendOrderResult    never Err                    │
//! │  test_connection        bool               never Err                    │
//! │  get_inventory          InventoryCounts    never Err (empty on failure) │
//! │                                                                         │
//! │  get_order_status       PosResult<..>      ServiceUnavailable, provider │
//! │  update_order           PosResult<bool>    errors propagate to caller   │
//! │  cancel_order           PosResult<bool>                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Auto-Sync
//! One background task per restaurant. Starting a task replaces any prior
//! one for the same restaurant, so two never run concurrently.
//! ```text
//! start_auto_sync(r1, 15)
//!     │
//!     └── tokio::spawn ──► every 15 min:
//!                            factory.service_for_restaurant(r1)
//!                              └── fetch_menu ──► SyncResult ──► MenuSyncSink
//! ```
//! The first tick fires one full interval after start.

use async_trait::async_trait;
use quickeats_core::{
    menu::menu_item_from_pos, validation::validate_config, ConfigValidation, ConnectResult,
    InventoryCounts, Order, OrderStatus, OrderUpdates, PosConfig, ProviderInfo, SendOrderResult,
    SyncResult,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{PosError, PosResult};
use crate::factory::ServiceFactory;
use crate::service::PosService;

const SERVICE_UNAVAILABLE: &str = "POS service not available";

// =============================================================================
// Sync Sink
// =============================================================================

/// Receives the results of background menu syncs.
#[async_trait]
pub trait MenuSyncSink: Send + Sync {
    async fn menu_synced(&self, restaurant_id: &str, result: SyncResult);
}

/// Default sink. Logs the outcome and drops the items.
pub struct LoggingSyncSink;

#[async_trait]
impl MenuSyncSink for LoggingSyncSink {
    async fn menu_synced(&self, restaurant_id: &str, result: SyncResult) {
        if result.success {
            info!(
                restaurant_id,
                items = result.stats.items_synced,
                "Auto-sync complete"
            );
        } else {
            warn!(restaurant_id, errors = ?result.errors, "Auto-sync failed");
        }
    }
}

// =============================================================================
// Auto-Sync Task
// =============================================================================

struct AutoSyncTask {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl AutoSyncTask {
    fn stop(self) {
        let _ = self.shutdown_tx.try_send(());
        self.handle.abort();
    }
}

/// Fetches a menu through `service` and folds the outcome into a `SyncResult`.
async fn sync_through(service: Option<Arc<dyn PosService>>) -> SyncResult {
    let Some(service) = service else {
        return SyncResult::failed(SERVICE_UNAVAILABLE);
    };

    match service.fetch_menu().await {
        Ok(items) => SyncResult::succeeded(items.iter().map(menu_item_from_pos).collect()),
        Err(err) => SyncResult::failed(err.to_string()),
    }
}

async fn auto_sync_loop(
    restaurant_id: String,
    period: Duration,
    factory: Arc<ServiceFactory>,
    sink: Arc<dyn MenuSyncSink>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!(restaurant_id = %restaurant_id, "Auto-syncing menu");
                let result = sync_through(factory.service_for_restaurant(&restaurant_id)).await;
                sink.menu_synced(&restaurant_id, result).await;
            }

            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }

    debug!(restaurant_id = %restaurant_id, "Auto-sync task stopped");
}

// =============================================================================
// Manager
// =============================================================================

pub struct PosManager {
    factory: Arc<ServiceFactory>,
    sink: Arc<dyn MenuSyncSink>,
    timers: Mutex<HashMap<String, AutoSyncTask>>,
}

impl PosManager {
    /// Manager with the logging sink.
    pub fn new(factory: Arc<ServiceFactory>) -> Self {
        Self::with_sink(factory, Arc::new(LoggingSyncSink))
    }

    pub fn with_sink(factory: Arc<ServiceFactory>, sink: Arc<dyn MenuSyncSink>) -> Self {
        PosManager {
            factory,
            sink,
            timers: Mutex::new(HashMap::new()),
        }
    }

    pub fn factory(&self) -> &Arc<ServiceFactory> {
        &self.factory
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Connects the restaurant's adapter and starts auto-sync when configured.
    pub async fn initialize_restaurant(&self, config: &PosConfig) -> ConnectResult {
        let Some(service) = self.factory.get_service(config) else {
            return ConnectResult::failed("Invalid POS configuration");
        };

        if !service.connect().await {
            return ConnectResult::failed(
                service
                    .last_error()
                    .unwrap_or_else(|| "Failed to connect to POS".to_string()),
            );
        }

        if config.settings.wants_auto_sync() {
            self.start_auto_sync(&config.restaurant_id, config.settings.sync_interval);
        }

        info!(
            restaurant_id = %config.restaurant_id,
            provider = config.provider.as_str(),
            "Restaurant POS initialized"
        );
        ConnectResult::connected()
    }

    /// Stops auto-sync and evicts every cached adapter for the restaurant.
    pub fn disconnect_restaurant(&self, restaurant_id: &str) {
        self.stop_auto_sync(restaurant_id);
        let evicted = self.factory.remove_service(restaurant_id);
        info!(restaurant_id, evicted, "Restaurant POS disconnected");
    }

    // -------------------------------------------------------------------------
    // Menu & Orders
    // -------------------------------------------------------------------------

    /// Full-replace menu snapshot. Every failure comes back inside the result.
    pub async fn sync_menu(&self, config: &PosConfig) -> SyncResult {
        let result = sync_through(self.factory.get_service(config)).await;
        debug!(
            restaurant_id = %config.restaurant_id,
            success = result.success,
            items = result.stats.items_synced,
            "Menu sync finished"
        );
        result
    }

    /// Sends an order, gated on `autoSendOrders`.
    ///
    /// The gate runs before any adapter is resolved. Manual sends bypass the
    /// manager and call the adapter directly.
    pub async fn send_order(&self, config: &PosConfig, order: &Order) -> SendOrderResult {
        if !config.settings.auto_send_orders {
            return SendOrderResult::rejected("Auto-send orders is disabled for this restaurant");
        }

        let Some(service) = self.factory.get_service(config) else {
            return SendOrderResult::rejected(SERVICE_UNAVAILABLE);
        };

        let result = service.send_order(order).await;
        if result.success {
            info!(
                restaurant_id = %config.restaurant_id,
                order_id = %order.id,
                external_id = ?result.external_id,
                "Order sent to POS"
            );
        } else {
            warn!(
                restaurant_id = %config.restaurant_id,
                order_id = %order.id,
                error = ?result.error,
                "Order rejected by POS"
            );
        }
        result
    }

    fn require_service(&self, config: &PosConfig) -> PosResult<Arc<dyn PosService>> {
        self.factory
            .get_service(config)
            .ok_or_else(|| PosError::ServiceUnavailable {
                restaurant_id: config.restaurant_id.clone(),
            })
    }

    pub async fn get_order_status(
        &self,
        config: &PosConfig,
        external_id: &str,
    ) -> PosResult<OrderStatus> {
        self.require_service(config)?
            .get_order_status(external_id)
            .await
    }

    pub async fn update_order(
        &self,
        config: &PosConfig,
        external_id: &str,
        updates: &OrderUpdates,
    ) -> PosResult<bool> {
        self.require_service(config)?
            .update_order(external_id, updates)
            .await
    }

    pub async fn cancel_order(&self, config: &PosConfig, external_id: &str) -> PosResult<bool> {
        self.require_service(config)?.cancel_order(external_id).await
    }

    /// Probes the exact credentials in `config` with a fresh, uncached adapter.
    pub async fn test_connection(&self, config: &PosConfig) -> bool {
        match self.factory.create_service(config) {
            Some(service) => service.test_connection().await,
            None => false,
        }
    }

    /// Best-effort inventory. Errors become an empty map.
    pub async fn get_inventory(&self, config: &PosConfig, item_ids: &[String]) -> InventoryCounts {
        let Some(service) = self.factory.get_service(config) else {
            return InventoryCounts::new();
        };

        match service.get_inventory(item_ids).await {
            Ok(counts) => counts,
            Err(err) => {
                warn!(
                    restaurant_id = %config.restaurant_id,
                    error = %err,
                    "Failed to fetch inventory"
                );
                InventoryCounts::new()
            }
        }
    }

    // -------------------------------------------------------------------------
    // Auto-Sync
    // -------------------------------------------------------------------------

    /// Starts (or restarts) the recurring sync for a restaurant.
    ///
    /// Must be called inside a tokio runtime. An interval of zero stops any
    /// running task and starts nothing.
    pub fn start_auto_sync(&self, restaurant_id: &str, interval_minutes: u32) -> bool {
        self.stop_auto_sync(restaurant_id);
        if interval_minutes == 0 {
            return false;
        }

        let period = Duration::from_secs(u64::from(interval_minutes) * 60);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let handle = tokio::spawn(auto_sync_loop(
            restaurant_id.to_string(),
            period,
            Arc::clone(&self.factory),
            Arc::clone(&self.sink),
            shutdown_rx,
        ));

        let task = AutoSyncTask {
            shutdown_tx,
            handle,
        };
        match self.timers.lock() {
            Ok(mut timers) => {
                if let Some(previous) = timers.insert(restaurant_id.to_string(), task) {
                    previous.stop();
                }
            }
            Err(_) => {
                task.stop();
                return false;
            }
        }

        info!(restaurant_id, interval_minutes, "Auto-sync started");
        true
    }

    pub fn stop_auto_sync(&self, restaurant_id: &str) {
        let task = self
            .timers
            .lock()
            .ok()
            .and_then(|mut timers| timers.remove(restaurant_id));
        if let Some(task) = task {
            task.stop();
            info!(restaurant_id, "Auto-sync stopped");
        }
    }

    pub fn is_auto_syncing(&self, restaurant_id: &str) -> bool {
        self.timers
            .lock()
            .map(|timers| {
                timers
                    .get(restaurant_id)
                    .is_some_and(|task| !task.handle.is_finished())
            })
            .unwrap_or(false)
    }

    /// Stops every auto-sync task and disconnects cached adapters.
    pub async fn shutdown(&self) {
        let tasks: Vec<AutoSyncTask> = self
            .timers
            .lock()
            .map(|mut timers| timers.drain().map(|(_, task)| task).collect())
            .unwrap_or_default();
        let stopped = tasks.len();
        for task in tasks {
            task.stop();
        }

        for service in self.factory.services() {
            service.disconnect().await;
        }
        self.factory.clear_all();
        info!(stopped, "POS manager shut down");
    }

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    pub fn supported_providers(&self) -> Vec<ProviderInfo> {
        ProviderInfo::catalog()
    }

    pub fn validate_config(&self, config: &PosConfig) -> ConfigValidation {
        validate_config(config)
    }
}

impl Drop for PosManager {
    fn drop(&mut self) {
        if let Ok(mut timers) = self.timers.lock() {
            for (_, task) in timers.drain() {
                task.stop();
            }
        }
    }
}
