//! Call-recording test double for `PosService`.

use async_trait::async_trait;
use quickeats_core::{
    ConfigError, InventoryCounts, Money, Order, OrderState, OrderStatus, OrderUpdates, PosConfig,
    PosMenuItem, PosProvider, SendOrderResult,
};
use std::sync::{Arc, Mutex};

use crate::error::{PosError, PosResult};
use crate::factory::{ServiceBuilder, ServiceContext};
use crate::service::{tracked_menu_fetch, PosService, ServiceDiagnostics};

#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    pub fail_connect: bool,
    pub fail_menu: Option<String>,
    pub fail_inventory: bool,
}

pub fn menu_item(external_id: &str, category: &str) -> PosMenuItem {
    PosMenuItem {
        external_id: external_id.to_string(),
        name: format!("Item {}", external_id),
        description: String::new(),
        price: Money::from_cents(899),
        category: category.to_string(),
        available: true,
        sku: None,
        image_url: None,
        inventory_count: None,
        modifier_groups: Vec::new(),
    }
}

pub struct MockPosService {
    config: PosConfig,
    diagnostics: ServiceDiagnostics,
    behavior: MockBehavior,
    calls: Mutex<Vec<&'static str>>,
}

impl MockPosService {
    pub fn new(config: PosConfig, behavior: MockBehavior) -> Self {
        MockPosService {
            config,
            diagnostics: ServiceDiagnostics::new(),
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, op: &'static str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(op);
        }
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.iter().filter(|c| **c == op).count())
            .unwrap_or(0)
    }

    fn rejection(&self, message: &str) -> PosError {
        PosError::Provider {
            provider: self.config.provider,
            status: Some(500),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl PosService for MockPosService {
    fn provider(&self) -> PosProvider {
        self.config.provider
    }

    fn config(&self) -> &PosConfig {
        &self.config
    }

    fn diagnostics(&self) -> &ServiceDiagnostics {
        &self.diagnostics
    }

    fn check_credentials(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    async fn test_connection(&self) -> bool {
        self.record("test_connection");
        !self.behavior.fail_connect
    }

    async fn fetch_menu(&self) -> PosResult<Vec<PosMenuItem>> {
        self.record("fetch_menu");
        let fetch = async {
            match &self.behavior.fail_menu {
                Some(message) => Err(self.rejection(message)),
                None => Ok(vec![menu_item("a", "Mains"), menu_item("b", "Sides")]),
            }
        };
        tracked_menu_fetch(self, fetch).await
    }

    async fn send_order(&self, order: &Order) -> SendOrderResult {
        self.record("send_order");
        SendOrderResult::accepted(format!("ext-{}", order.id))
    }

    async fn get_order_status(&self, external_id: &str) -> PosResult<OrderStatus> {
        self.record("get_order_status");
        Ok(OrderStatus {
            order_id: None,
            external_id: external_id.to_string(),
            status: OrderState::Confirmed,
            timestamp: chrono::Utc::now(),
            message: None,
            estimated_ready_time: None,
        })
    }

    async fn update_order(&self, _external_id: &str, _updates: &OrderUpdates) -> PosResult<bool> {
        self.record("update_order");
        Ok(true)
    }

    async fn cancel_order(&self, _external_id: &str) -> PosResult<bool> {
        self.record("cancel_order");
        Ok(true)
    }

    async fn get_inventory(&self, item_ids: &[String]) -> PosResult<InventoryCounts> {
        self.record("get_inventory");
        if self.behavior.fail_inventory {
            return Err(self.rejection("inventory offline"));
        }
        Ok(item_ids.iter().map(|id| (id.clone(), 4.0)).collect())
    }
}

/// Builds mocks for Toast and Square configs and keeps every instance built.
#[derive(Clone, Default)]
pub struct MockServiceBuilder {
    pub behavior: MockBehavior,
    built: Arc<Mutex<Vec<Arc<MockPosService>>>>,
}

impl MockServiceBuilder {
    pub fn new(behavior: MockBehavior) -> Self {
        MockServiceBuilder {
            behavior,
            built: Arc::default(),
        }
    }

    pub fn built(&self) -> Vec<Arc<MockPosService>> {
        self.built.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Arc<MockPosService>> {
        self.built().last().cloned()
    }
}

impl ServiceBuilder for MockServiceBuilder {
    fn build(&self, config: &PosConfig, _ctx: &ServiceContext) -> Option<Arc<dyn PosService>> {
        if !config.provider.is_implemented() {
            return None;
        }
        let service = Arc::new(MockPosService::new(config.clone(), self.behavior.clone()));
        if let Ok(mut built) = self.built.lock() {
            built.push(Arc::clone(&service));
        }
        Some(service)
    }
}
