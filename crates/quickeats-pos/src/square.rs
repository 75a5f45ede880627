//! # Square Adapter
//!
//! REST integration with the Square API.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base: connect.squareupsandbox.com  |  connect.squareup.com  + /v2      │
//! │  auth: Authorization: Bearer {accessToken}                              │
//! │        Square-Version: 2024-10-17                                       │
//! │                                                                         │
//! │  GET  /locations                         connectivity probe             │
//! │  POST /catalog/list                      ITEM + MODIFIER_LIST + CATEGORY│
//! │  POST /orders/create                     send order (idempotency_key)   │
//! │  GET  /orders/{id}                       status, and current version    │
//! │  PUT  /orders/{id}                       update / cancel (needs version)│
//! │  POST /inventory/counts/batch-retrieve   inventory                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Catalog Join
//! `/catalog/list` returns one flat object graph. Categories and modifier
//! lists are indexed by id first, then every ITEM is expanded into one menu
//! item per variation:
//! ```text
//! ITEM "Latte" ─┬─ variation "Small"  ──► "Latte - Small"  (4.00)
//!               └─ variation "Large"  ──► "Latte - Large"  (5.00)
//!       │
//!       └─ modifier_list_info ──► MODIFIER_LIST "Milk" (3 modifiers)
//!                                 copied onto both items
//! ```
//! Money is integer cents on the Square wire.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quickeats_core::{
    ConfigError, InventoryCounts, Money, Order, OrderState, OrderStatus, OrderUpdates, PosConfig,
    PosMenuItem, PosModifier, PosModifierGroup, PosOrder, PosProvider, SendOrderResult,
    SquareCredentials, TaxRate,
};
use reqwest::header::HeaderName;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::config::IdempotencyMode;
use crate::error::{PosError, PosResult};
use crate::factory::ServiceContext;
use crate::http::{order_not_found, resolve_base_url, ApiClient};
use crate::service::{send_outcome, tracked_menu_fetch, PosService, ServiceDiagnostics};

pub const SQUARE_SANDBOX_URL: &str = "https://connect.squareupsandbox.com";
pub const SQUARE_PRODUCTION_URL: &str = "https://connect.squareup.com";
pub const SQUARE_API_VERSION: &str = "2024-10-17";

const IMAGE_HOST: &str = "https://square-catalog-images.s3.amazonaws.com";
const UNCATEGORIZED: &str = "Uncategorized";
const ORDER_SOURCE: &str = "RDSware";
const CURRENCY: &str = "USD";

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct CatalogPage {
    #[serde(default)]
    objects: Vec<CatalogObject>,
}

#[derive(Debug, Deserialize)]
struct CatalogObject {
    #[serde(rename = "type")]
    kind: String,
    id: String,
    #[serde(default)]
    absent_at_location_ids: Vec<String>,
    #[serde(default)]
    item_data: Option<ItemData>,
    #[serde(default)]
    modifier_list_data: Option<ModifierListData>,
    #[serde(default)]
    category_data: Option<CategoryData>,
}

impl CatalogObject {
    fn absent_at(&self, location_id: &str) -> bool {
        self.absent_at_location_ids.iter().any(|l| l == location_id)
    }
}

#[derive(Debug, Deserialize)]
struct CategoryData {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CategoryRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ItemData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category_id: Option<String>,
    #[serde(default)]
    categories: Vec<CategoryRef>,
    #[serde(default)]
    is_archived: bool,
    #[serde(default)]
    image_ids: Vec<String>,
    #[serde(default)]
    variations: Vec<Variation>,
    #[serde(default)]
    modifier_list_info: Vec<ModifierListInfo>,
}

impl ItemData {
    fn category_id(&self) -> Option<&str> {
        self.category_id
            .as_deref()
            .or_else(|| self.categories.first().map(|c| c.id.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct Variation {
    id: String,
    #[serde(default)]
    absent_at_location_ids: Vec<String>,
    #[serde(default)]
    item_variation_data: VariationData,
}

#[derive(Debug, Default, Deserialize)]
struct VariationData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    price_money: Option<MoneyAmount>,
}

#[derive(Debug, Deserialize)]
struct MoneyAmount {
    #[serde(default)]
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct ModifierListInfo {
    modifier_list_id: String,
    #[serde(default)]
    min_selected_modifiers: Option<i64>,
    #[serde(default)]
    max_selected_modifiers: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ModifierListData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    modifiers: Vec<ModifierObject>,
}

#[derive(Debug, Deserialize)]
struct ModifierObject {
    id: String,
    #[serde(default)]
    absent_at_location_ids: Vec<String>,
    #[serde(default)]
    modifier_data: ModifierData,
}

#[derive(Debug, Default, Deserialize)]
struct ModifierData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    price_money: Option<MoneyAmount>,
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    order: RemoteOrder,
}

#[derive(Debug, Deserialize)]
struct RemoteOrder {
    id: String,
    #[serde(default)]
    reference_id: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    version: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct InventoryPage {
    #[serde(default)]
    counts: Vec<InventoryCount>,
}

#[derive(Debug, Deserialize)]
struct InventoryCount {
    catalog_object_id: String,
    #[serde(default)]
    quantity: Option<String>,
}

// =============================================================================
// Transforms
// =============================================================================

/// Maps a Square order state onto the internal states. Unknown → pending.
pub fn map_order_state(state: &str) -> OrderState {
    match state {
        "PROPOSED" | "RESERVED" | "DRAFT" => OrderState::Pending,
        "PREPARED" => OrderState::Preparing,
        "COMPLETED" => OrderState::Completed,
        "CANCELED" => OrderState::Cancelled,
        _ => OrderState::Pending,
    }
}

fn money_of(price: &Option<MoneyAmount>) -> Money {
    price
        .as_ref()
        .map(|p| Money::from_cents(p.amount))
        .unwrap_or_default()
}

fn money_json(amount: Money) -> Value {
    json!({ "amount": amount.cents(), "currency": CURRENCY })
}

/// Joins the flat catalog graph into normalized items.
fn items_from_catalog(page: &CatalogPage, config: &PosConfig, location_id: &str) -> Vec<PosMenuItem> {
    let categories: HashMap<&str, &str> = page
        .objects
        .iter()
        .filter_map(|o| o.category_data.as_ref().map(|c| (o.id.as_str(), c.name.as_str())))
        .collect();
    let modifier_lists: HashMap<&str, &ModifierListData> = page
        .objects
        .iter()
        .filter(|o| o.kind == "MODIFIER_LIST")
        .filter_map(|o| o.modifier_list_data.as_ref().map(|m| (o.id.as_str(), m)))
        .collect();

    let mut items = Vec::new();
    for object in page.objects.iter().filter(|o| o.kind == "ITEM") {
        let Some(data) = object.item_data.as_ref() else {
            continue;
        };

        let category = data
            .category_id()
            .and_then(|id| categories.get(id).copied())
            .unwrap_or(UNCATEGORIZED);
        if config.settings.is_excluded(category) {
            continue;
        }

        let modifier_groups: Vec<PosModifierGroup> = data
            .modifier_list_info
            .iter()
            .filter_map(|info| {
                let list = modifier_lists.get(info.modifier_list_id.as_str())?;
                let min = info.min_selected_modifiers.unwrap_or(0).max(0) as u32;
                let max = match info.max_selected_modifiers {
                    Some(max) if max > 0 => max as u32,
                    _ => list.modifiers.len() as u32,
                };
                Some(PosModifierGroup::new(
                    info.modifier_list_id.clone(),
                    list.name.clone(),
                    min,
                    max,
                    list.modifiers
                        .iter()
                        .map(|m| PosModifier {
                            external_id: m.id.clone(),
                            name: m.modifier_data.name.clone(),
                            price_modifier: money_of(&m.modifier_data.price_money),
                            available: !m.absent_at_location_ids.iter().any(|l| l == location_id),
                        })
                        .collect(),
                ))
            })
            .collect();

        let image_url = data
            .image_ids
            .first()
            .map(|id| format!("{}/{}", IMAGE_HOST, id));
        let multiple = data.variations.len() > 1;

        for variation in &data.variations {
            let variation_data = &variation.item_variation_data;
            let name = if multiple {
                format!("{} - {}", data.name, variation_data.name)
            } else {
                data.name.clone()
            };
            let absent = object.absent_at(location_id)
                || variation.absent_at_location_ids.iter().any(|l| l == location_id);

            items.push(PosMenuItem {
                external_id: variation.id.clone(),
                name,
                description: data.description.clone().unwrap_or_default(),
                price: money_of(&variation_data.price_money),
                category: category.to_string(),
                available: !data.is_archived && !absent,
                sku: variation_data.sku.clone(),
                image_url: image_url.clone(),
                inventory_count: None,
                modifier_groups: modifier_groups.clone(),
            });
        }
    }
    items
}

/// Builds the Square `order` object.
fn order_payload(order: &PosOrder, location_id: &str, tax_rate: Option<TaxRate>) -> Value {
    let totals = &order.totals;

    let line_items: Vec<Value> = order
        .items
        .iter()
        .map(|item| {
            json!({
                "catalog_object_id": item.external_id,
                "quantity": item.quantity.to_string(),
                "modifiers": item.modifiers.iter().map(|m| json!({
                    "catalog_object_id": m.external_id,
                    "name": m.name,
                    "base_price_money": money_json(m.price_modifier),
                })).collect::<Vec<_>>(),
                "note": item.special_instructions,
            })
        })
        .collect();

    // A rate that resolves to 0 (no configured rate, zero subtotal) would
    // zero out the tax, so the tax line is left off.
    let rate = tax_rate.unwrap_or_else(|| TaxRate::effective(totals.tax, totals.subtotal));
    let taxes = if totals.tax.is_positive() && !rate.is_zero() {
        json!([{ "name": "Sales Tax", "percentage": rate.percentage_string(), "scope": "ORDER" }])
    } else {
        json!([])
    };
    let service_charges = if totals.delivery_fee.is_positive() {
        json!([{ "name": "Delivery Fee", "amount_money": money_json(totals.delivery_fee) }])
    } else {
        json!([])
    };
    let discounts = if totals.discount.is_positive() {
        json!([{ "name": "Discount", "amount_money": money_json(totals.discount) }])
    } else {
        json!([])
    };

    json!({
        "reference_id": order.order_id,
        "location_id": location_id,
        "source": { "name": ORDER_SOURCE },
        "line_items": line_items,
        "taxes": taxes,
        "service_charges": service_charges,
        "discounts": discounts,
        "metadata": {
            "order_type": order.order_type.as_str(),
            "customer_name": order.customer_name,
            "customer_phone": order.customer_phone.clone().unwrap_or_default(),
            "special_instructions": order.special_instructions.clone().unwrap_or_default(),
        },
    })
}

pub(crate) fn idempotency_key(mode: IdempotencyMode, order_id: &str, now: DateTime<Utc>) -> String {
    match mode {
        IdempotencyMode::Timestamped => format!("{}-{}", order_id, now.timestamp_millis()),
        IdempotencyMode::OrderId => order_id.to_string(),
    }
}

fn status_from_remote(remote: &RemoteOrder, now: DateTime<Utc>) -> OrderStatus {
    let state = remote.state.as_deref().unwrap_or_default();
    OrderStatus {
        order_id: remote.reference_id.clone(),
        external_id: remote.id.clone(),
        status: map_order_state(state),
        timestamp: remote
            .updated_at
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(now),
        message: remote.state.clone(),
        estimated_ready_time: None,
    }
}

fn inventory_from_page(page: &InventoryPage) -> InventoryCounts {
    page.counts
        .iter()
        .map(|count| {
            let quantity = count
                .quantity
                .as_deref()
                .and_then(|q| q.trim().parse::<f64>().ok())
                .unwrap_or(0.0);
            (count.catalog_object_id.clone(), quantity)
        })
        .collect()
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> PosResult<T> {
    serde_json::from_value(body).map_err(|e| PosError::from(e).for_provider(PosProvider::Square))
}

// =============================================================================
// Square Service
// =============================================================================

#[derive(Debug)]
struct SquareSession {
    api: ApiClient,
    location_id: String,
}

impl SquareSession {
    fn open(config: &PosConfig, ctx: &ServiceContext) -> Result<Self, ConfigError> {
        let creds: SquareCredentials = config.square_credentials()?;
        let base_url = resolve_base_url(
            ctx.endpoints.square_base_url.as_deref(),
            config.sandbox_mode,
            SQUARE_SANDBOX_URL,
            SQUARE_PRODUCTION_URL,
        )
        .map_err(|e| ConfigError::InvalidSetting {
            field: "square_base_url".into(),
            reason: e.to_string(),
        })?;

        let api = ApiClient::new(ctx.http.clone(), PosProvider::Square, base_url)
            .with_bearer(&creds.access_token)
            .and_then(|api| {
                api.with_header(HeaderName::from_static("square-version"), SQUARE_API_VERSION)
            })
            .map_err(|e| ConfigError::InvalidSetting {
                field: "credentials".into(),
                reason: e.to_string(),
            })?;

        Ok(SquareSession {
            api,
            location_id: creds.location_id,
        })
    }

    async fn current_version(&self, external_id: &str) -> PosResult<Option<i64>> {
        let body = self
            .api
            .get(&format!("/orders/{}", external_id))
            .await
            .map_err(|e| order_not_found(e, external_id))?
            .into_json();
        let envelope: OrderEnvelope = decode(body)?;
        Ok(envelope.order.version)
    }

    /// Re-fetches the version, then PUTs `fields` merged over it.
    async fn put_order(
        &self,
        external_id: &str,
        fields: serde_json::Map<String, Value>,
    ) -> PosResult<bool> {
        let mut order = serde_json::Map::new();
        if let Some(version) = self.current_version(external_id).await? {
            order.insert("version".into(), json!(version));
        }
        order.extend(fields);

        let response = self
            .api
            .send(
                Method::PUT,
                &format!("/orders/{}", external_id),
                Some(&json!({ "order": order })),
            )
            .await
            .map_err(|e| order_not_found(e, external_id))?
            .into_json();
        Ok(response.get("order").is_some_and(|o| !o.is_null()))
    }
}

/// Square adapter.
pub struct SquareService {
    config: PosConfig,
    diagnostics: ServiceDiagnostics,
    session: Result<SquareSession, ConfigError>,
    idempotency: IdempotencyMode,
}

impl SquareService {
    pub fn new(config: PosConfig, ctx: &ServiceContext) -> Self {
        let session = SquareSession::open(&config, ctx);
        SquareService {
            config,
            diagnostics: ServiceDiagnostics::new(),
            session,
            idempotency: ctx.square.idempotency,
        }
    }

    fn session(&self) -> PosResult<&SquareSession> {
        self.session.as_ref().map_err(|e| PosError::Config(e.clone()))
    }

    async fn fetch_items(&self) -> PosResult<Vec<PosMenuItem>> {
        let session = self.session()?;
        let body = session
            .api
            .post(
                "/catalog/list",
                &json!({ "types": ["ITEM", "MODIFIER_LIST", "CATEGORY"] }),
            )
            .await?
            .into_json();
        let page: CatalogPage = if body.is_null() {
            CatalogPage::default()
        } else {
            decode(body)?
        };
        debug!(objects = page.objects.len(), "Square catalog loaded");
        Ok(items_from_catalog(&page, &self.config, &session.location_id))
    }

    async fn submit(&self, order: &Order) -> PosResult<SendOrderResult> {
        let session = self.session()?;
        let pos_order = PosOrder::from_order(order)?;
        let key = idempotency_key(self.idempotency, &pos_order.order_id, Utc::now());

        let body = json!({
            "order": order_payload(&pos_order, &session.location_id, self.config.tax_rate),
            "location_id": session.location_id,
            "idempotency_key": key,
        });
        let response = session.api.post("/orders/create", &body).await?.into_json();

        Ok(
            match response
                .get("order")
                .and_then(|o| o.get("id"))
                .and_then(Value::as_str)
            {
                Some(id) => SendOrderResult::accepted(id),
                None => SendOrderResult::rejected("Failed to create order in Square"),
            },
        )
    }
}

#[async_trait]
impl PosService for SquareService {
    fn provider(&self) -> PosProvider {
        PosProvider::Square
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

    /// Connected when the token can list at least one location.
    async fn test_connection(&self) -> bool {
        self.diagnostics
            .track(async {
                let session = self.session()?;
                let body = session.api.get("/locations").await?.into_json();
                Ok(body
                    .get("locations")
                    .and_then(Value::as_array)
                    .is_some_and(|l| !l.is_empty()))
            })
            .await
            .unwrap_or(false)
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
                let body = session
                    .api
                    .get(&format!("/orders/{}", external_id))
                    .await
                    .map_err(|e| order_not_found(e, external_id))?
                    .into_json();
                let envelope: OrderEnvelope = decode(body)?;
                Ok(status_from_remote(&envelope.order, Utc::now()))
            })
            .await
    }

    async fn update_order(&self, external_id: &str, updates: &OrderUpdates) -> PosResult<bool> {
        self.diagnostics
            .track(async {
                self.session()?
                    .put_order(external_id, updates.clone())
                    .await
            })
            .await
    }

    /// Moves the order to CANCELED. Square rejects state changes on an
    /// order that is already terminal.
    async fn cancel_order(&self, external_id: &str) -> PosResult<bool> {
        self.diagnostics
            .track(async {
                let mut fields = serde_json::Map::new();
                fields.insert("state".into(), json!("CANCELED"));
                self.session()?.put_order(external_id, fields).await
            })
            .await
    }

    async fn get_inventory(&self, item_ids: &[String]) -> PosResult<InventoryCounts> {
        self.diagnostics
            .track(async {
                let session = self.session()?;
                let body = session
                    .api
                    .post(
                        "/inventory/counts/batch-retrieve",
                        &json!({
                            "catalog_object_ids": item_ids,
                            "location_ids": [session.location_id],
                        }),
                    )
                    .await?
                    .into_json();
                let page: InventoryPage = if body.is_null() {
                    InventoryPage::default()
                } else {
                    decode(body)?
                };
                Ok(inventory_from_page(&page))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickeats_core::{CredentialSet, OrderType};

    fn config() -> PosConfig {
        let mut config = PosConfig::new("r1", PosProvider::Square);
        config.enabled = true;
        config.credentials = Some(CredentialSet {
            access_token: Some("tok".into()),
            location_id: Some("L1".into()),
            ..Default::default()
        });
        config
    }

    fn catalog() -> CatalogPage {
        serde_json::from_value(json!({
            "objects": [
                {"type": "CATEGORY", "id": "cat-drinks", "category_data": {"name": "Beverages"}},
                {"type": "CATEGORY", "id": "cat-food", "category_data": {"name": "Food"}},
                {"type": "MODIFIER_LIST", "id": "ml-milk", "modifier_list_data": {
                    "name": "Milk",
                    "modifiers": [
                        {"type": "MODIFIER", "id": "mod-whole", "modifier_data": {"name": "Whole"}},
                        {"type": "MODIFIER", "id": "mod-oat", "modifier_data": {"name": "Oat", "price_money": {"amount": 75, "currency": "USD"}}},
                        {"type": "MODIFIER", "id": "mod-soy", "absent_at_location_ids": ["L1"], "modifier_data": {"name": "Soy"}}
                    ]
                }},
                {"type": "ITEM", "id": "item-latte", "item_data": {
                    "name": "Latte",
                    "category_id": "cat-food",
                    "image_ids": ["img-1"],
                    "modifier_list_info": [{"modifier_list_id": "ml-milk", "max_selected_modifiers": 1}],
                    "variations": [
                        {"id": "var-s", "item_variation_data": {"name": "Small", "price_money": {"amount": 400}}},
                        {"id": "var-l", "absent_at_location_ids": ["L1"], "item_variation_data": {"name": "Large", "price_money": {"amount": 500}}}
                    ]
                }},
                {"type": "ITEM", "id": "item-cola", "item_data": {
                    "name": "Cola",
                    "category_id": "cat-drinks",
                    "variations": [{"id": "var-cola", "item_variation_data": {"name": "Regular"}}]
                }},
                {"type": "ITEM", "id": "item-cookie", "item_data": {
                    "name": "Cookie",
                    "is_archived": true,
                    "modifier_list_info": [{"modifier_list_id": "ml-milk", "min_selected_modifiers": 1, "max_selected_modifiers": -1}],
                    "variations": [{"id": "var-cookie", "item_variation_data": {"name": "Regular", "sku": "CK-1", "price_money": {"amount": 250}}}]
                }}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_catalog_join() {
        let items = items_from_catalog(&catalog(), &config(), "L1");
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Latte - Small", "Latte - Large", "Cola", "Cookie"]);

        let small = &items[0];
        assert_eq!(small.external_id, "var-s");
        assert_eq!(small.price.cents(), 400);
        assert_eq!(small.category, "Food");
        assert!(small.available);
        assert_eq!(
            small.image_url.as_deref(),
            Some("https://square-catalog-images.s3.amazonaws.com/img-1")
        );

        let milk = &small.modifier_groups[0];
        assert_eq!(milk.max_selections, 1);
        assert_eq!(milk.kind(), quickeats_core::SelectionKind::Single);
        assert_eq!(milk.modifiers.len(), 3);
        assert_eq!(milk.modifiers[1].price_modifier.cents(), 75);
        assert!(!milk.modifiers[2].available);

        assert!(!items[1].available);

        let cookie = &items[3];
        assert_eq!(cookie.category, "Uncategorized");
        assert!(!cookie.available);
        assert_eq!(cookie.sku.as_deref(), Some("CK-1"));
        assert!(cookie.modifier_groups[0].required);
        assert_eq!(cookie.modifier_groups[0].max_selections, 3);
    }

    #[test]
    fn test_catalog_exclusion() {
        let mut config = config();
        config.settings.excluded_categories = vec!["Beverages".into()];
        let items = items_from_catalog(&catalog(), &config, "L1");
        assert!(items.iter().all(|i| i.category != "Beverages"));
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_state_mapping_table() {
        assert_eq!(map_order_state("PROPOSED"), OrderState::Pending);
        assert_eq!(map_order_state("RESERVED"), OrderState::Pending);
        assert_eq!(map_order_state("DRAFT"), OrderState::Pending);
        assert_eq!(map_order_state("PREPARED"), OrderState::Preparing);
        assert_eq!(map_order_state("COMPLETED"), OrderState::Completed);
        assert_eq!(map_order_state("CANCELED"), OrderState::Cancelled);
        assert_eq!(map_order_state("OPEN"), OrderState::Pending);
        assert_eq!(map_order_state(""), OrderState::Pending);
    }

    #[test]
    fn test_order_payload_money_in_cents() {
        let json = r#"{
            "id": "o-9", "restaurantId": "r1", "customerName": "Lee",
            "orderType": "pickup",
            "items": [{"id": "var-s", "name": "Latte - Small", "quantity": 2, "price": 4.0,
                       "selectedOptions": [{"name": "Milk", "choices": [{"id": "mod-oat", "name": "Oat", "priceModifier": 0.75}]}]}],
            "subtotal": 9.5, "tax": 0.76, "tip": 1.0, "deliveryFee": 0, "discount": 1.5, "total": 9.76,
            "orderTime": "2026-03-01T18:30:00Z"
        }"#;
        let order = PosOrder::from_order(&serde_json::from_str::<Order>(json).unwrap()).unwrap();
        assert_eq!(order.order_type, OrderType::Pickup);

        let payload = order_payload(&order, "L1", None);
        assert_eq!(payload["reference_id"], "o-9");
        assert_eq!(payload["line_items"][0]["quantity"], "2");
        assert_eq!(payload["line_items"][0]["modifiers"][0]["base_price_money"]["amount"], 75);
        assert_eq!(payload["taxes"][0]["percentage"], "8");
        assert_eq!(payload["service_charges"], json!([]));
        assert_eq!(payload["discounts"][0]["amount_money"]["amount"], 150);
        assert_eq!(payload["metadata"]["order_type"], "pickup");
        assert_eq!(payload["metadata"]["customer_phone"], "");

        let configured = order_payload(&order, "L1", Some(TaxRate::from_bps(825)));
        assert_eq!(configured["taxes"][0]["percentage"], "8.25");
    }

    #[test]
    fn test_tax_without_a_resolvable_rate_is_omitted() {
        let json = r#"{
            "id": "o-10", "restaurantId": "r1", "customerName": "Lee",
            "items": [{"id": "var-s", "name": "Latte - Small", "quantity": 1, "price": 0}],
            "subtotal": 0, "tax": 0.5, "total": 0.5,
            "orderTime": "2026-03-01T18:30:00Z"
        }"#;
        let order = PosOrder::from_order(&serde_json::from_str::<Order>(json).unwrap()).unwrap();

        let derived = order_payload(&order, "L1", None);
        assert_eq!(derived["taxes"], json!([]));

        let configured = order_payload(&order, "L1", Some(TaxRate::from_bps(825)));
        assert_eq!(configured["taxes"][0]["percentage"], "8.25");
    }

    #[test]
    fn test_idempotency_keys() {
        let t1: DateTime<Utc> = "2026-03-01T18:30:00.001Z".parse().unwrap();
        let t2: DateTime<Utc> = "2026-03-01T18:30:00.002Z".parse().unwrap();

        let a = idempotency_key(IdempotencyMode::Timestamped, "o-1", t1);
        let b = idempotency_key(IdempotencyMode::Timestamped, "o-1", t2);
        assert_ne!(a, b);
        assert!(a.starts_with("o-1-"));

        assert_eq!(idempotency_key(IdempotencyMode::OrderId, "o-1", t1), "o-1");
        assert_eq!(idempotency_key(IdempotencyMode::OrderId, "o-1", t2), "o-1");
    }

    #[test]
    fn test_inventory_quantities_parse() {
        let page: InventoryPage = serde_json::from_value(json!({
            "counts": [
                {"catalog_object_id": "var-s", "quantity": "12.5"},
                {"catalog_object_id": "var-l", "quantity": "bogus"},
                {"catalog_object_id": "var-x"}
            ]
        }))
        .unwrap();
        let counts = inventory_from_page(&page);
        assert_eq!(counts["var-s"], 12.5);
        assert_eq!(counts["var-l"], 0.0);
        assert_eq!(counts["var-x"], 0.0);
    }

    #[test]
    fn test_remote_status() {
        let remote: OrderEnvelope = serde_json::from_value(json!({
            "order": {"id": "sq-1", "reference_id": "o-1", "state": "COMPLETED",
                      "updated_at": "2026-03-01T19:00:00Z", "version": 4}
        }))
        .unwrap();
        let status = status_from_remote(&remote.order, Utc::now());
        assert_eq!(status.status, OrderState::Completed);
        assert_eq!(status.order_id.as_deref(), Some("o-1"));
        assert_eq!(status.message.as_deref(), Some("COMPLETED"));
    }
}
