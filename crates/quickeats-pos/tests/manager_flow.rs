//! End-to-end manager flows over real adapters and fake providers.

mod common;

use axum::http::Method;
use common::{connector, factory, manager, order, square_config, toast_config, TestServer};
use quickeats_core::{PosProvider, SelectionKind};
use quickeats_pos::{PosError, PosManager};
use std::sync::Arc;

#[tokio::test]
async fn initialize_sync_and_disconnect() {
    let square = TestServer::square().await;
    let manager = manager(&connector(None, Some(&square)));
    let config = square_config("r1");

    let init = manager.initialize_restaurant(&config).await;
    assert!(init.success, "{:?}", init.error);
    assert!(manager.is_auto_syncing("r1"));

    let sync = manager.sync_menu(&config).await;
    assert!(sync.success);
    let items = sync.items.unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(sync.stats.items_synced, 3);
    assert_eq!(sync.stats.items_added, 3);

    let small = &items[0];
    assert_eq!(small.name, "Latte - Small");
    assert_eq!(small.pos_external_id.as_deref(), Some("var-small"));
    assert_eq!(small.options[0].kind, SelectionKind::Single);
    assert_eq!(small.options[0].choices.len(), 3);

    manager.disconnect_restaurant("r1");
    assert!(!manager.is_auto_syncing("r1"));
    assert!(manager.factory().service_for_restaurant("r1").is_none());
}

#[tokio::test]
async fn eviction_forces_a_new_adapter() {
    let toast = TestServer::toast().await;
    let factory = factory(&connector(Some(&toast), None));
    let config = toast_config("r1");

    let first = factory.get_service(&config).unwrap();
    assert!(Arc::ptr_eq(&first, &factory.get_service(&config).unwrap()));

    factory.remove_service("r1");
    let second = factory.get_service(&config).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn provider_switch_drops_the_old_adapter() {
    let toast = TestServer::toast().await;
    let square = TestServer::square().await;
    let manager = manager(&connector(Some(&toast), Some(&square)));

    assert!(manager.initialize_restaurant(&toast_config("r1")).await.success);
    manager.disconnect_restaurant("r1");

    let mut switched = square_config("r1");
    switched.settings.auto_sync_menu = false;
    assert!(manager.initialize_restaurant(&switched).await.success);
    assert!(!manager.is_auto_syncing("r1"));

    let services = manager.factory().services();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].provider(), PosProvider::Square);
}

#[tokio::test]
async fn connection_test_uses_the_credentials_given() {
    let square = TestServer::square().await;
    let manager = manager(&connector(None, Some(&square)));
    let good = square_config("r1");
    assert!(manager.initialize_restaurant(&good).await.success);

    let mut edited = good.clone();
    edited.credentials.as_mut().unwrap().access_token = Some("typo".into());
    assert!(!manager.test_connection(&edited).await);
    assert!(manager.test_connection(&good).await);

    // The cached adapter still holds the original token.
    let cached = manager.factory().service_for_restaurant("r1").unwrap();
    assert!(cached.test_connection().await);
}

#[tokio::test]
async fn unavailable_services_fail_in_structured_ways() {
    let manager = manager(&connector(None, None));

    let mut clover = square_config("r1");
    clover.provider = PosProvider::Clover;
    let init = manager.initialize_restaurant(&clover).await;
    assert_eq!(init.error.as_deref(), Some("Invalid POS configuration"));
    assert!(!manager.test_connection(&clover).await);

    let mut disabled = square_config("r2");
    disabled.enabled = false;
    let sync = manager.sync_menu(&disabled).await;
    assert_eq!(sync.errors, Some(vec!["POS service not available".to_string()]));

    let status = manager.get_order_status(&disabled, "sq-1").await;
    assert!(matches!(
        status,
        Err(PosError::ServiceUnavailable { ref restaurant_id }) if restaurant_id == "r2"
    ));
    assert_eq!(
        status.unwrap_err().to_string(),
        "POS service not available"
    );
}

#[tokio::test]
async fn auto_send_gate_runs_before_the_adapter() {
    let toast = TestServer::toast().await;
    let manager = manager(&connector(Some(&toast), None));
    let mut config = toast_config("r1");
    config.settings.auto_send_orders = false;

    let result = manager.send_order(&config, &order("o-1", "toast-burrito")).await;
    assert_eq!(
        result.error.as_deref(),
        Some("Auto-send orders is disabled for this restaurant")
    );
    assert!(toast.fake.requests().is_empty());
    assert!(manager.factory().services().is_empty());

    config.settings.auto_send_orders = true;
    let result = manager.send_order(&config, &order("o-1", "toast-burrito")).await;
    assert!(result.success);
    assert_eq!(
        toast
            .fake
            .requests_to(Method::POST, "/v2/restaurants/loc-1/orders")
            .len(),
        1
    );
}

#[tokio::test]
async fn order_lifecycle_through_manager() {
    let square = TestServer::square().await;
    let manager: PosManager = manager(&connector(None, Some(&square)));
    let config = square_config("r1");

    let sent = manager.send_order(&config, &order("o-3", "var-large")).await;
    let external_id = sent.external_id.unwrap();

    assert!(manager.cancel_order(&config, &external_id).await.unwrap());
    let status = manager.get_order_status(&config, &external_id).await.unwrap();
    assert_eq!(status.status, quickeats_core::OrderState::Cancelled);

    let counts = manager
        .get_inventory(&config, &["var-large".to_string()])
        .await;
    assert_eq!(counts.get("var-large"), Some(&7.0));

    manager.shutdown().await;
    assert!(manager.factory().services().is_empty());
}
