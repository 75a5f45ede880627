//! # Toast Adapter
//!
//! REST integration with the Toast POS API.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base: ws-sandbox-api.eng.toasttab.com  |  ws-api.toasttab.com  + /v2   │
//! │  auth: Authorization: Bearer {apiKey}                                   │
//! │        Toast-Restaurant-External-ID: {locationId}                       │
//! │                                                                         │
//! │  GET   /restaurants                               connectivity probe    │
//! │  GET   /restaurants/{loc}/menus                   menu list             │
//! │  GET   /restaurants/{loc}/menus/{guid}            groups → items        │
//! │  POST  /restaurants/{loc}/orders                  send order            │
//! │  GET   /restaurants/{loc}/orders/{guid}           status                │
//! │  PATCH /restaurants/{loc}/orders/{guid}           update                │
//! │  POST  /restaurants/{loc}/orders/{guid}/void      cancel                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Order Status
//! Toast exposes no finer order state without webhooks, so an order is
//! `cancelled` when it carries a void marker and `confirmed` otherwise, no
//! matter how much time has passed.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use quickeats_core::{
    ConfigError, InventoryCounts, Money, Order, OrderState, OrderStatus, OrderType, OrderUpdates,
    PosConfig, PosMenuItem, PosModifier, PosModifierGroup, PosOrder, PosProvider, SendOrderResult,
    ToastCredentials,
};
use reqwest::header::HeaderName;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{PosError, PosResult};
use crate::factory::ServiceContext;
use crate::http::{order_not_found, resolve_base_url, ApiClient};
use crate::service::{send_outcome, tracked_menu_fetch, PosService, ServiceDiagnostics};

pub const TOAST_SANDBOX_URL: &str = "https://ws-sandbox-api.eng.toasttab.com";
pub const TOAST_PRODUCTION_URL: &str = "https://ws-api.toasttab.com";

const RESTAURANT_HEADER: &str = "toast-restaurant-external-id";
const ORDER_SOURCE: &str = "RDSware";
const VOID_REASON: &str = "Customer requested cancellation";

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct MenuRef {
    guid: String,
}

#[derive(Debug, Default, Deserialize)]
struct MenuDetail {
    #[serde(default)]
    groups: Vec<MenuGroup>,
}

#[derive(Debug, Deserialize)]
struct MenuGroup {
    #[serde(default)]
    name: String,
    #[serde(default)]
    items: Vec<ToastItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToastItem {
    guid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    out_of_stock: bool,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    option_groups: Vec<OptionGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionGroup {
    guid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    min_selections: Option<u32>,
    #[serde(default)]
    max_selections: Option<u32>,
    #[serde(default)]
    options: Vec<ToastOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToastOption {
    guid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    out_of_stock: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteOrder {
    guid: String,
    #[serde(default)]
    entity_type: Option<String>,
    #[serde(default)]
    void_info: Option<Value>,
    #[serde(default)]
    voided: Option<bool>,
    #[serde(default)]
    modified_date: Option<String>,
    #[serde(default)]
    opened_date: Option<String>,
    #[serde(default)]
    promised_date: Option<String>,
}

// =============================================================================
// Transforms
// =============================================================================

fn item_from_toast(item: &ToastItem, category: &str) -> PosMenuItem {
    let modifier_groups = item
        .option_groups
        .iter()
        .map(|group| {
            let max = group.max_selections.filter(|m| *m > 0).unwrap_or(1);
            PosModifierGroup::new(
                group.guid.clone(),
                group.name.clone(),
                group.min_selections.unwrap_or(0),
                max,
                group
                    .options
                    .iter()
                    .map(|option| PosModifier {
                        external_id: option.guid.clone(),
                        name: option.name.clone(),
                        price_modifier: Money::from_dollars(option.price.unwrap_or(0.0)),
                        available: !option.out_of_stock,
                    })
                    .collect(),
            )
        })
        .collect();

    PosMenuItem {
        external_id: item.guid.clone(),
        name: item.name.clone(),
        description: item.description.clone().unwrap_or_default(),
        price: Money::from_dollars(item.price.unwrap_or(0.0)),
        category: category.to_string(),
        available: !item.out_of_stock,
        sku: item.sku.clone(),
        image_url: item.image_url.clone(),
        inventory_count: None,
        modifier_groups,
    }
}

/// Walks menu groups into items, skipping excluded group names.
fn items_from_menu(menu: &MenuDetail, config: &PosConfig) -> Vec<PosMenuItem> {
    menu.groups
        .iter()
        .filter(|group| !config.settings.is_excluded(&group.name))
        .flat_map(|group| {
            group
                .items
                .iter()
                .map(move |item| item_from_toast(item, &group.name))
        })
        .collect()
}

/// Builds the Toast order body.
fn order_payload(
    order: &PosOrder,
    delivery_address: Option<&str>,
    location_id: &str,
    business_date: NaiveDate,
) -> Value {
    let mut name_parts = order.customer_name.split(' ');
    let first_name = name_parts.next().unwrap_or_default();
    let last_name = name_parts.collect::<Vec<_>>().join(" ");

    let selections: Vec<Value> = order
        .items
        .iter()
        .map(|item| {
            json!({
                "entityType": "Selection",
                "itemGuid": item.external_id,
                "quantity": item.quantity,
                "preModifier": item.special_instructions,
                "modifiers": item.modifiers.iter().map(|m| json!({
                    "entityType": "Modifier",
                    "optionGuid": m.external_id,
                    "name": m.name,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    let delivery_info = match order.order_type {
        OrderType::Delivery => json!({
            "address": delivery_address.unwrap_or_default(),
            "deliveryFee": order.totals.delivery_fee.to_dollars(),
        }),
        _ => Value::Null,
    };

    json!({
        "entityType": "Order",
        "restaurantGuid": location_id,
        "source": ORDER_SOURCE,
        "businessDate": business_date.format("%Y-%m-%d").to_string(),
        "checks": [{
            "entityType": "Check",
            "displayNumber": order.order_id,
            "selections": selections,
            "customer": {
                "firstName": first_name,
                "lastName": last_name,
                "phone": order.customer_phone,
                "email": order.customer_email,
            },
        }],
        "deliveryInfo": delivery_info,
        "note": order.special_instructions,
        "promisedDate": order.promised_time.map(|t| t.to_rfc3339()),
    })
}

/// Parses Toast timestamps, which use `+0000` offsets as well as RFC 3339.
fn parse_toast_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

fn status_from_remote(remote: &RemoteOrder, now: DateTime<Utc>) -> OrderStatus {
    let voided = remote.void_info.as_ref().is_some_and(|v| !v.is_null())
        || remote.voided.unwrap_or(false);

    let timestamp = remote
        .modified_date
        .as_deref()
        .or(remote.opened_date.as_deref())
        .and_then(parse_toast_time)
        .unwrap_or(now);

    let estimated_ready_time = remote
        .promised_date
        .as_deref()
        .and_then(parse_toast_time)
        .map(|promised| ((promised - now).num_milliseconds() as f64 / 60_000.0).round() as i64);

    OrderStatus {
        order_id: (remote.entity_type.as_deref() == Some("Order")).then(|| remote.guid.clone()),
        external_id: remote.guid.clone(),
        status: if voided {
            OrderState::Cancelled
        } else {
            OrderState::Confirmed
        },
        timestamp,
        message: None,
        estimated_ready_time,
    }
}

// =============================================================================
// Toast Service
// =============================================================================

#[derive(Debug)]
struct ToastSession {
    api: ApiClient,
    location_id: String,
}

impl ToastSession {
    fn open(config: &PosConfig, ctx: &ServiceContext) -> Result<Self, ConfigError> {
        let creds: ToastCredentials = config.toast_credentials()?;
        let base_url = resolve_base_url(
            ctx.endpoints.toast_base_url.as_deref(),
            config.sandbox_mode,
            TOAST_SANDBOX_URL,
            TOAST_PRODUCTION_URL,
        )
        .map_err(|e| ConfigError::InvalidSetting {
            field: "toast_base_url".into(),
            reason: e.to_string(),
        })?;

        let api = ApiClient::new(ctx.http.clone(), PosProvider::Toast, base_url)
            .with_bearer(&creds.api_key)
            .and_then(|api| {
                api.with_header(HeaderName::from_static(RESTAURANT_HEADER), &creds.location_id)
            })
            .map_err(|e| ConfigError::InvalidSetting {
                field: "credentials".into(),
                reason: e.to_string(),
            })?;

        Ok(ToastSession {
            api,
            location_id: creds.location_id,
        })
    }

    fn orders_path(&self) -> String {
        format!("/restaurants/{}/orders", self.location_id)
    }
}

/// Toast adapter.
pub struct ToastService {
    config: PosConfig,
    diagnostics: ServiceDiagnostics,
    session: Result<ToastSession, ConfigError>,
}

impl ToastService {
    pub fn new(config: PosConfig, ctx: &ServiceContext) -> Self {
        let session = ToastSession::open(&config, ctx);
        ToastService {
            config,
            diagnostics: ServiceDiagnostics::new(),
            session,
        }
    }

    fn session(&self) -> PosResult<&ToastSession> {
        self.session.as_ref().map_err(|e| PosError::Config(e.clone()))
    }

    async fn fetch_items(&self) -> PosResult<Vec<PosMenuItem>> {
        let session = self.session()?;
        let menus_path = format!("/restaurants/{}/menus", session.location_id);

        let menus: Vec<MenuRef> = serde_json::from_value(session.api.get(&menus_path).await?.into_json())
            .map_err(|e| PosError::from(e).for_provider(PosProvider::Toast))?;

        let mut items = Vec::new();
        for menu in menus {
            let path = format!("{}/{}", menus_path, menu.guid);
            let body = session.api.get(&path).await?.into_json();
            let detail: MenuDetail = if body.is_null() {
                MenuDetail::default()
            } else {
                serde_json::from_value(body)
                    .map_err(|e| PosError::from(e).for_provider(PosProvider::Toast))?
            };
            debug!(menu = %menu.guid, groups = detail.groups.len(), "Toast menu loaded");
            items.extend(items_from_menu(&detail, &self.config));
        }
        Ok(items)
    }

    async fn submit(&self, order: &Order) -> PosResult<SendOrderResult> {
        let session = self.session()?;
        let pos_order = PosOrder::from_order(order)?;
        let payload = order_payload(
            &pos_order,
            order.delivery_address.as_deref(),
            &session.location_id,
            Utc::now().date_naive(),
        );

        let response = session.api.post(&session.orders_path(), &payload).await?.into_json();
        Ok(match response.get("guid").and_then(Value::as_str) {
            Some(guid) => SendOrderResult::accepted(guid),
            None => SendOrderResult::rejected("Failed to create order in Toast"),
        })
    }
}

#[async_trait]
impl PosService for ToastService {
    fn provider(&self) -> PosProvider {
        PosProvider::Toast
    }

    fn config(&self) -> &PosConfig {
        &self.config
    }

    fn diagnostics(&self) -> &ServiceDiagnostics {
        &self.diagnostics
    }

    fn check_credentials(&self) -> Result<(), ConfigError> {
        self.session.as_ref().map(|_| ()).map_err(Clone::clone)
    }

    /// Any 2xx from `/restaurants` proves the credentials.
    async fn test_connection(&self) -> bool {
        self.diagnostics
            .track(async {
                let session = self.session()?;
                session.api.get("/restaurants").await?;
                Ok(())
            })
            .await
            .is_ok()
    }

    async fn fetch_menu(&self) -> PosResult<Vec<PosMenuItem>> {
        tracked_menu_fetch(self, self.fetch_items()).await
    }

    async fn send_order(&self, order: &Order) -> SendOrderResult {
        send_outcome(self.diagnostics.track(self.submit(order)).await)
    }

    async fn get_order_status(&self, external_id: &str) -> PosResult<OrderStatus> {
        self.diagnostics
            .track(async {
                let session = self.session()?;
                let path = format!("{}/{}", session.orders_path(), external_id);
                let body = session
                    .api
                    .get(&path)
                    .await
                    .map_err(|e| order_not_found(e, external_id))?
                    .into_json();
                let remote: RemoteOrder = serde_json::from_value(body)
                    .map_err(|e| PosError::from(e).for_provider(PosProvider::Toast))?;
                Ok(status_from_remote(&remote, Utc::now()))
            })
            .await
    }

    async fn update_order(&self, external_id: &str, updates: &OrderUpdates) -> PosResult<bool> {
        self.diagnostics
            .track(async {
                let session = self.session()?;
                let path = format!("{}/{}", session.orders_path(), external_id);
                let body = Value::Object(updates.clone());
                session
                    .api
                    .send(Method::PATCH, &path, Some(&body))
                    .await
                    .map_err(|e| order_not_found(e, external_id))?;
                Ok(true)
            })
            .await
    }

    /// Voids the order. Toast rejects a second void of the same order.
    async fn cancel_order(&self, external_id: &str) -> PosResult<bool> {
        self.diagnostics
            .track(async {
                let session = self.session()?;
                let path = format!("{}/{}/void", session.orders_path(), external_id);
                session
                    .api
                    .post(&path, &json!({ "voidReason": VOID_REASON }))
                    .await
                    .map_err(|e| order_not_found(e, external_id))?;
                Ok(true)
            })
            .await
    }

    async fn get_inventory(&self, _item_ids: &[String]) -> PosResult<InventoryCounts> {
        warn!(
            restaurant_id = %self.config.restaurant_id,
            "Toast inventory sync requires additional API access"
        );
        Ok(InventoryCounts::new())
    }
}
