//! In-process fake Toast and Square servers, bound to an ephemeral port.
#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use quickeats_core::{CredentialSet, Order, PosConfig, PosProvider};
use quickeats_pos::{ConnectorConfig, IdempotencyMode, PosManager, ServiceFactory};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// =============================================================================
// Recorded Traffic
// =============================================================================

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone)]
struct FakeOrder {
    reference_id: String,
    state: String,
    version: i64,
}

#[derive(Debug, Default)]
struct FakeState {
    requests: Vec<Recorded>,
    orders: HashMap<String, FakeOrder>,
    idempotency: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct Fake(Arc<Mutex<FakeState>>);

impl Fake {
    fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: Value) {
        self.0.lock().unwrap().requests.push(Recorded {
            method,
            path: uri.path().to_string(),
            headers: headers.clone(),
            body,
        });
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Seeds a Square order in the given state.
    pub fn seed_order(&self, id: &str, state: &str) {
        self.0.lock().unwrap().orders.insert(
            id.to_string(),
            FakeOrder {
                reference_id: format!("ref-{}", id),
                state: state.to_string(),
                version: 1,
            },
        );
    }
}

// =============================================================================
// Server
// =============================================================================

pub struct TestServer {
    pub base_url: String,
    pub fake: Fake,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(router: Router, fake: Fake) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url,
            fake,
            handle,
        }
    }

    pub async fn toast() -> Self {
        let fake = Fake::default();
        Self::spawn(toast_router(fake.clone()), fake).await
    }

    pub async fn square() -> Self {
        let fake = Fake::default();
        Self::spawn(square_router(fake.clone()), fake).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn toast_config(restaurant_id: &str) -> PosConfig {
    let mut config = PosConfig::new(restaurant_id, PosProvider::Toast);
    config.enabled = true;
    config.credentials = Some(CredentialSet {
        api_key: Some("toast-key".into()),
        api_secret: Some("toast-secret".into()),
        location_id: Some("loc-1".into()),
        ..Default::default()
    });
    config
}

pub fn square_config(restaurant_id: &str) -> PosConfig {
    let mut config = PosConfig::new(restaurant_id, PosProvider::Square);
    config.enabled = true;
    config.credentials = Some(CredentialSet {
        access_token: Some("square-token".into()),
        location_id: Some("L1".into()),
        ..Default::default()
    });
    config
}

pub fn connector(toast: Option<&TestServer>, square: Option<&TestServer>) -> ConnectorConfig {
    let mut config = ConnectorConfig::new();
    config.http.timeout_secs = 5;
    config.endpoints.toast_base_url = toast.map(|s| s.base_url.clone());
    config.endpoints.square_base_url = square.map(|s| s.base_url.clone());
    config
}

pub fn factory(config: &ConnectorConfig) -> Arc<ServiceFactory> {
    Arc::new(ServiceFactory::from_config(config).unwrap())
}

pub fn manager(config: &ConnectorConfig) -> PosManager {
    PosManager::new(factory(config))
}

pub fn with_idempotency(mut config: ConnectorConfig, mode: IdempotencyMode) -> ConnectorConfig {
    config.square.idempotency = mode;
    config
}

pub fn order(id: &str, external_item_id: &str) -> Order {
    serde_json::from_value(json!({
        "id": id,
        "restaurantId": "r1",
        "customerName": "Jordan Reyes",
        "customerPhone": "555-0199",
        "orderType": "delivery",
        "items": [{
            "id": "line-1",
            "posExternalId": external_item_id,
            "name": "Burrito",
            "quantity": 2,
            "price": 9.5,
            "selectedOptions": [{
                "name": "Salsa",
                "choices": [{"id": "c-1", "posExternalId": "mod-hot", "name": "Hot", "priceModifier": 0.5}]
            }]
        }],
        "subtotal": 20.0,
        "tax": 1.65,
        "deliveryFee": 3.0,
        "total": 24.65,
        "deliveryAddress": "12 Elm St",
        "orderTime": "2026-03-01T18:30:00Z"
    }))
    .unwrap()
}

// =============================================================================
// Toast Fake
// =============================================================================

const TOAST_BEARER: &str = "Bearer toast-key";

fn toast_router(fake: Fake) -> Router {
    Router::new()
        .route("/v2/restaurants", get(toast_restaurants))
        .route("/v2/restaurants/{loc}/menus", get(toast_menus))
        .route("/v2/restaurants/{loc}/menus/{guid}", get(toast_menu))
        .route("/v2/restaurants/{loc}/orders", post(toast_create_order))
        .route(
            "/v2/restaurants/{loc}/orders/{guid}",
            get(toast_order).patch(toast_patch_order),
        )
        .route("/v2/restaurants/{loc}/orders/{guid}/void", post(toast_void))
        .with_state(fake)
}

fn toast_authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(TOAST_BEARER)
}

async fn toast_restaurants(State(fake): State<Fake>, uri: Uri, headers: HeaderMap) -> Response {
    fake.record(Method::GET, &uri, &headers, Value::Null);
    if !toast_authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    Json(json!([{ "guid": "loc-1" }])).into_response()
}

async fn toast_menus(State(fake): State<Fake>, uri: Uri, headers: HeaderMap) -> Response {
    fake.record(Method::GET, &uri, &headers, Value::Null);
    Json(json!([{ "guid": "menu-lunch" }, { "guid": "menu-bar" }])).into_response()
}

async fn toast_menu(
    State(fake): State<Fake>,
    Path((_loc, guid)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    fake.record(Method::GET, &uri, &headers, Value::Null);
    let body = match guid.as_str() {
        "menu-lunch" => json!({
            "groups": [{
                "name": "Mains",
                "items": [{
                    "guid": "toast-burrito",
                    "name": "Burrito",
                    "price": 9.5,
                    "optionGroups": [{
                        "guid": "og-salsa",
                        "name": "Salsa",
                        "minSelections": 1,
                        "maxSelections": 1,
                        "options": [
                            {"guid": "mod-mild", "name": "Mild"},
                            {"guid": "mod-hot", "name": "Hot", "price": 0.5}
                        ]
                    }]
                }, {
                    "guid": "toast-bowl",
                    "name": "Bowl",
                    "price": 11.25,
                    "outOfStock": true
                }]
            }]
        }),
        _ => json!({
            "groups": [{
                "name": "Beverages",
                "items": [{ "guid": "toast-horchata", "name": "Horchata", "price": 3.0 }]
            }]
        }),
    };
    Json(body).into_response()
}

async fn toast_create_order(
    State(fake): State<Fake>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(Method::POST, &uri, &headers, body.clone());
    if body["checks"][0]["selections"].as_array().is_some_and(|s| s.is_empty()) {
        return (StatusCode::BAD_REQUEST, "order has no selections").into_response();
    }
    Json(json!({ "guid": "toast-order-1", "entityType": "Order" })).into_response()
}

async fn toast_order(
    State(fake): State<Fake>,
    Path((_loc, guid)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    fake.record(Method::GET, &uri, &headers, Value::Null);
    match guid.as_str() {
        "missing" => (StatusCode::NOT_FOUND, "order not found").into_response(),
        "voided" => Json(json!({
            "guid": guid,
            "entityType": "Order",
            "voided": true,
            "voidInfo": { "voidDate": "2026-03-01T18:40:00.000+0000" },
            "modifiedDate": "2026-03-01T18:40:00.000+0000"
        }))
        .into_response(),
        _ => Json(json!({
            "guid": guid,
            "entityType": "Order",
            "openedDate": "2020-01-01T00:00:00.000+0000"
        }))
        .into_response(),
    }
}

async fn toast_patch_order(
    State(fake): State<Fake>,
    Path((_loc, guid)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(Method::PATCH, &uri, &headers, body);
    if guid == "missing" {
        return (StatusCode::NOT_FOUND, "order not found").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn toast_void(
    State(fake): State<Fake>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(Method::POST, &uri, &headers, body);
    Json(json!({ "guid": "toast-order-1", "voided": true })).into_response()
}

// =============================================================================
// Square Fake
// =============================================================================

fn square_router(fake: Fake) -> Router {
    Router::new()
        .route("/v2/locations", get(square_locations))
        .route("/v2/catalog/list", post(square_catalog))
        .route("/v2/orders/create", post(square_create_order))
        .route("/v2/orders/{id}", get(square_order).put(square_update_order))
        .route(
            "/v2/inventory/counts/batch-retrieve",
            post(square_inventory),
        )
        .with_state(fake)
}

async fn square_locations(State(fake): State<Fake>, uri: Uri, headers: HeaderMap) -> Response {
    fake.record(Method::GET, &uri, &headers, Value::Null);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer square-token") => {
            Json(json!({ "locations": [{ "id": "L1", "name": "Main St" }] })).into_response()
        }
        Some("Bearer no-locations") => Json(json!({ "locations": [] })).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "errors": [{ "category": "AUTHENTICATION_ERROR", "code": "UNAUTHORIZED" }] })),
        )
            .into_response(),
    }
}

async fn square_catalog(
    State(fake): State<Fake>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(Method::POST, &uri, &headers, body);
    Json(json!({
        "objects": [
            {"type": "CATEGORY", "id": "cat-coffee", "category_data": {"name": "Coffee"}},
            {"type": "CATEGORY", "id": "cat-bev", "category_data": {"name": "Beverages"}},
            {"type": "MODIFIER_LIST", "id": "ml-milk", "modifier_list_data": {
                "name": "Milk",
                "modifiers": [
                    {"type": "MODIFIER", "id": "mod-whole", "modifier_data": {"name": "Whole", "price_money": {"amount": 0, "currency": "USD"}}},
                    {"type": "MODIFIER", "id": "mod-oat", "modifier_data": {"name": "Oat", "price_money": {"amount": 75, "currency": "USD"}}},
                    {"type": "MODIFIER", "id": "mod-almond", "modifier_data": {"name": "Almond", "price_money": {"amount": 75, "currency": "USD"}}}
                ]
            }},
            {"type": "ITEM", "id": "item-latte", "item_data": {
                "name": "Latte",
                "description": "Espresso and steamed milk",
                "category_id": "cat-coffee",
                "modifier_list_info": [{"modifier_list_id": "ml-milk", "max_selected_modifiers": 1}],
                "variations": [
                    {"type": "ITEM_VARIATION", "id": "var-small", "item_variation_data": {"name": "Small", "price_money": {"amount": 450, "currency": "USD"}}},
                    {"type": "ITEM_VARIATION", "id": "var-large", "item_variation_data": {"name": "Large", "price_money": {"amount": 525, "currency": "USD"}}}
                ]
            }},
            {"type": "ITEM", "id": "item-lemonade", "item_data": {
                "name": "Lemonade",
                "category_id": "cat-bev",
                "variations": [
                    {"type": "ITEM_VARIATION", "id": "var-lemonade", "item_variation_data": {"name": "Regular", "price_money": {"amount": 300, "currency": "USD"}}}
                ]
            }}
        ]
    }))
    .into_response()
}

async fn square_create_order(
    State(fake): State<Fake>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(Method::POST, &uri, &headers, body.clone());
    let key = body["idempotency_key"].as_str().unwrap_or_default().to_string();
    let reference_id = body["order"]["reference_id"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    let mut state = fake.0.lock().unwrap();
    let id = match state.idempotency.get(&key) {
        Some(existing) => existing.clone(),
        None => {
            let id = format!("sq-order-{}", state.idempotency.len() + 1);
            state.idempotency.insert(key, id.clone());
            state.orders.insert(
                id.clone(),
                FakeOrder {
                    reference_id,
                    state: "OPEN".into(),
                    version: 1,
                },
            );
            id
        }
    };
    Json(json!({ "order": { "id": id, "state": "OPEN", "version": 1 } })).into_response()
}

fn square_order_json(id: &str, order: &FakeOrder) -> Value {
    json!({
        "id": id,
        "reference_id": order.reference_id,
        "state": order.state,
        "version": order.version,
        "updated_at": "2026-03-01T19:00:00Z"
    })
}

async fn square_order(
    State(fake): State<Fake>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    fake.record(Method::GET, &uri, &headers, Value::Null);
    let state = fake.0.lock().unwrap();
    match state.orders.get(&id) {
        Some(order) => Json(json!({ "order": square_order_json(&id, order) })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "errors": [{ "code": "NOT_FOUND" }] })),
        )
            .into_response(),
    }
}

async fn square_update_order(
    State(fake): State<Fake>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(Method::PUT, &uri, &headers, body.clone());
    let mut state = fake.0.lock().unwrap();
    let Some(order) = state.orders.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "errors": [] }))).into_response();
    };
    if body["order"]["version"].as_i64() != Some(order.version) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "errors": [{ "code": "VERSION_MISMATCH" }] })),
        )
            .into_response();
    }
    order.version += 1;
    if let Some(new_state) = body["order"]["state"].as_str() {
        order.state = new_state.to_string();
    }
    let order = order.clone();
    Json(json!({ "order": square_order_json(&id, &order) })).into_response()
}

async fn square_inventory(
    State(fake): State<Fake>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record(Method::POST, &uri, &headers, body.clone());
    let counts: Vec<Value> = body["catalog_object_ids"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .map(|id| json!({ "catalog_object_id": id, "state": "IN_STOCK", "quantity": "7" }))
                .collect()
        })
        .unwrap_or_default();
    Json(json!({ "counts": counts })).into_response()
}
