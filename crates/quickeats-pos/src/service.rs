//! # POS Service Contract
//!
//! The uniform operation surface every provider adapter implements. Call
//! sites hold `Arc<dyn PosService>` and never learn which provider is behind it.
//!
//! ## Operation Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  operation          returns                 on provider failure         │
//! │  ─────────────────  ──────────────────────  ─────────────────────────── │
//! │  connect            bool                    false, last_error set       │
//! │  disconnect         ()                      n/a (no network)            │
//! │  test_connection    bool                    false, last_error set       │
//! │  fetch_menu         PosResult<Vec<item>>    Err, status = error         │
//! │  send_order         SendOrderResult         success=false + message     │
//! │  get_order_status   PosResult<OrderStatus>  Err (OrderNotFound on 404)  │
//! │  update_order       PosResult<bool>         Err                         │
//! │  cancel_order       PosResult<bool>         Err                         │
//! │  get_inventory      PosResult<counts>       empty map if unsupported    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Diagnostics
//! Every outbound call goes through [`ServiceDiagnostics::track`]: it clears
//! the previous error, runs the call, and on failure records the message and
//! sets status to `error` before handing the error back. `status` and
//! `last_error` are best-effort: two concurrent calls on one adapter may
//! overwrite each other.

use async_trait::async_trait;
use quickeats_core::{
    ConfigError, ConnectionStatus, InventoryCounts, Order, OrderStatus, OrderUpdates, PosConfig,
    PosMenuItem, PosProvider, SendOrderResult,
};
use std::future::Future;
use std::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::PosResult;

// =============================================================================
// Diagnostics
// =============================================================================

#[derive(Debug, Default)]
struct DiagnosticState {
    status: ConnectionStatus,
    last_error: Option<String>,
}

/// Connection status and most recent error of one adapter.
#[derive(Debug, Default)]
pub struct ServiceDiagnostics {
    state: RwLock<DiagnosticState>,
}

impl ServiceDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state
            .read()
            .map(|s| s.status)
            .unwrap_or(ConnectionStatus::Error)
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().ok().and_then(|s| s.last_error.clone())
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        if let Ok(mut state) = self.state.write() {
            state.status = status;
        }
    }

    /// Records `message` and moves to `error`.
    pub fn set_error(&self, message: impl Into<String>) {
        if let Ok(mut state) = self.state.write() {
            state.last_error = Some(message.into());
            state.status = ConnectionStatus::Error;
        }
    }

    pub fn clear_error(&self) {
        if let Ok(mut state) = self.state.write() {
            state.last_error = None;
        }
    }

    /// Runs one provider call with error bookkeeping.
    pub async fn track<T, F>(&self, call: F) -> PosResult<T>
    where
        F: Future<Output = PosResult<T>> + Send,
    {
        self.clear_error();
        match call.await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.set_error(err.to_string());
                Err(err)
            }
        }
    }
}

// =============================================================================
// Service Trait
// =============================================================================

/// A provider adapter.
///
/// Adapters capture their `PosConfig` at construction. Later config edits
/// require evicting the cached adapter and building a new one.
#[async_trait]
pub trait PosService: Send + Sync {
    fn provider(&self) -> PosProvider;

    /// The config this adapter was built from.
    fn config(&self) -> &PosConfig;

    fn diagnostics(&self) -> &ServiceDiagnostics;

    /// Checks that the credentials this provider needs are all present.
    fn check_credentials(&self) -> Result<(), ConfigError>;

    fn status(&self) -> ConnectionStatus {
        self.diagnostics().status()
    }

    fn last_error(&self) -> Option<String> {
        self.diagnostics().last_error()
    }

    fn restaurant_id(&self) -> &str {
        &self.config().restaurant_id
    }

    /// Validates credentials, probes the provider, and moves to `connected`.
    ///
    /// Never fails past this boundary: every error ends up in `last_error`.
    async fn connect(&self) -> bool {
        if let Err(err) = self.check_credentials() {
            self.diagnostics().set_error(err.to_string());
            return false;
        }

        if self.test_connection().await {
            self.diagnostics().set_status(ConnectionStatus::Connected);
            info!(
                restaurant_id = self.restaurant_id(),
                provider = self.provider().as_str(),
                "POS connected"
            );
            true
        } else {
            if self.diagnostics().last_error().is_none() {
                self.diagnostics()
                    .set_error(format!("Failed to connect to {} POS", self.provider()));
            }
            warn!(
                restaurant_id = self.restaurant_id(),
                provider = self.provider().as_str(),
                error = ?self.diagnostics().last_error(),
                "POS connection failed"
            );
            false
        }
    }

    async fn disconnect(&self) {
        self.diagnostics().set_status(ConnectionStatus::Disconnected);
        debug!(restaurant_id = self.restaurant_id(), "POS disconnected");
    }

    /// Cheap authenticated read. False on any failure.
    async fn test_connection(&self) -> bool;

    /// One-shot snapshot of the provider menu, excluded categories removed.
    async fn fetch_menu(&self) -> PosResult<Vec<PosMenuItem>>;

    /// Submits an order. Not retried here; `external_id` is set iff accepted.
    async fn send_order(&self, order: &Order) -> SendOrderResult;

    async fn get_order_status(&self, external_id: &str) -> PosResult<OrderStatus>;

    async fn update_order(&self, external_id: &str, updates: &OrderUpdates) -> PosResult<bool>;

    /// Cancels a remote order. Whether a second cancel is safe depends on
    /// the provider.
    async fn cancel_order(&self, external_id: &str) -> PosResult<bool>;

    /// Current on-hand counts. Providers without an inventory API return
    /// an empty map.
    async fn get_inventory(&self, _item_ids: &[String]) -> PosResult<InventoryCounts> {
        Ok(InventoryCounts::new())
    }
}

// =============================================================================
// Shared Adapter Helpers
// =============================================================================

/// Fills `inventory_count` on items the counts cover.
pub fn apply_inventory(items: &mut [PosMenuItem], counts: &InventoryCounts) {
    for item in items.iter_mut() {
        if let Some(count) = counts.get(&item.external_id) {
            item.inventory_count = Some(*count);
        }
    }
}

/// Augments freshly fetched items with inventory when `syncInventory` is on.
pub async fn augment_with_inventory<S>(
    service: &S,
    mut items: Vec<PosMenuItem>,
) -> PosResult<Vec<PosMenuItem>>
where
    S: PosService + ?Sized,
{
    if !service.config().settings.sync_inventory || items.is_empty() {
        return Ok(items);
    }

    let ids: Vec<String> = items.iter().map(|i| i.external_id.clone()).collect();
    let counts = service.get_inventory(&ids).await?;
    apply_inventory(&mut items, &counts);
    Ok(items)
}

/// Runs a menu fetch with the syncing → connected status bracket.
pub async fn tracked_menu_fetch<S, F>(service: &S, fetch: F) -> PosResult<Vec<PosMenuItem>>
where
    S: PosService + ?Sized,
    F: Future<Output = PosResult<Vec<PosMenuItem>>> + Send,
{
    let diagnostics = service.diagnostics();
    diagnostics
        .track(async {
            diagnostics.set_status(ConnectionStatus::Syncing);
            let items = fetch.await?;
            let items = augment_with_inventory(service, items).await?;
            diagnostics.set_status(ConnectionStatus::Connected);
            info!(
                restaurant_id = service.restaurant_id(),
                provider = service.provider().as_str(),
                items = items.len(),
                "Menu fetched"
            );
            Ok(items)
        })
        .await
}

/// Converts a tracked send into the contract's result shape.
pub fn send_outcome(result: PosResult<SendOrderResult>) -> SendOrderResult {
    result.unwrap_or_else(|err| SendOrderResult::rejected(err.to_string()))
}
