//! # Order Types and Transforms
//!
//! ## Order Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Checkout ──► Order (storefront shape)                                 │
//! │                  │  selectedOptions[].choices[]                          │
//! │                  │                                                      │
//! │                  ▼  PosOrder::from_order                                │
//! │               PosOrder (normalized)                                     │
//! │                  │  modifiers[] flattened, tagged with groupName         │
//! │                  │                                                      │
//! │        ┌─────────┴─────────┐                                            │
//! │        ▼                   ▼                                            │
//! │   Toast check JSON    Square order JSON      (adapter-specific)         │
//! │        │                   │                                            │
//! │        └─────────┬─────────┘                                            │
//! │                  ▼                                                      │
//! │            OrderStatus ◄── polled later by external id                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{OrderError, OrderResult};
use crate::money::Money;

/// Free-form field updates forwarded to a provider's order update endpoint.
pub type OrderUpdates = serde_json::Map<String, serde_json::Value>;

/// Storefront ids arrive as strings or numbers.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

// =============================================================================
// Order Type
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Delivery,
    Pickup,
    DineIn,
}

impl OrderType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderType::Delivery => "delivery",
            OrderType::Pickup => "pickup",
            OrderType::DineIn => "dine_in",
        }
    }
}

// =============================================================================
// Storefront Order
// =============================================================================

/// A choice picked by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectedChoice {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    #[ts(type = "number")]
    pub price_modifier: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_external_id: Option<String>,
}

/// An option group as selected on one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    pub name: String,
    #[serde(default)]
    pub choices: Vec<SelectedChoice>,
}

/// One cart line of a storefront order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_external_id: Option<String>,
    pub name: String,
    pub quantity: u32,
    /// Unit price.
    #[ts(type = "number")]
    pub price: Money,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

/// A checkout order as produced by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub restaurant_id: String,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    pub items: Vec<OrderLine>,
    #[ts(type = "number")]
    pub subtotal: Money,
    #[ts(type = "number")]
    pub tax: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub tip: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub delivery_fee: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub discount: Option<Money>,
    #[ts(type = "number")]
    pub total: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[ts(as = "String")]
    pub order_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub promised_time: Option<DateTime<Utc>>,
}

// =============================================================================
// Normalized POS Order
// =============================================================================

/// A selected modifier, flattened out of its option group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosOrderModifier {
    pub external_id: String,
    pub group_name: String,
    pub name: String,
    #[ts(type = "number")]
    pub price_modifier: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosOrderItem {
    pub external_id: String,
    pub name: String,
    pub quantity: u32,
    #[ts(type = "number")]
    pub price: Money,
    pub modifiers: Vec<PosOrderModifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

/// Order totals.
///
/// `total` is expected to equal `subtotal + tax + tip + delivery_fee - discount`.
/// The caller owns that invariant; it is not re-checked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    #[ts(type = "number")]
    pub subtotal: Money,
    #[ts(type = "number")]
    pub tax: Money,
    #[ts(type = "number")]
    pub tip: Money,
    #[ts(type = "number")]
    pub delivery_fee: Money,
    #[ts(type = "number")]
    pub discount: Money,
    #[ts(type = "number")]
    pub total: Money,
}

impl OrderTotals {
    pub fn expected_total(&self) -> Money {
        self.subtotal + self.tax + self.tip + self.delivery_fee - self.discount
    }

    pub fn is_consistent(&self) -> bool {
        self.expected_total() == self.total
    }
}

/// The provider-agnostic outbound order every adapter maps from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosOrder {
    pub order_id: String,
    pub restaurant_id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub order_type: OrderType,
    pub items: Vec<PosOrderItem>,
    pub totals: OrderTotals,
    pub special_instructions: Option<String>,
    #[ts(as = "String")]
    pub order_time: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub promised_time: Option<DateTime<Utc>>,
}

impl PosOrder {
    /// Builds the normalized order from a storefront order.
    ///
    /// Line external ids prefer the provider id captured at menu sync and
    /// fall back to the storefront id. Missing tip, fee and discount are 0.
    /// A line with quantity 0 rejects the whole order.
    pub fn from_order(order: &Order) -> OrderResult<Self> {
        if let Some(line) = order.items.iter().find(|line| line.quantity == 0) {
            return Err(OrderError::ZeroQuantity {
                order_id: order.id.clone(),
                line_id: line.id.clone(),
            });
        }

        Ok(PosOrder {
            order_id: order.id.clone(),
            restaurant_id: order.restaurant_id.clone(),
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            customer_email: order.customer_email.clone(),
            order_type: order.order_type.unwrap_or_default(),
            items: order
                .items
                .iter()
                .map(|line| PosOrderItem {
                    external_id: line
                        .pos_external_id
                        .clone()
                        .unwrap_or_else(|| line.id.clone()),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    price: line.price,
                    modifiers: flatten_modifiers(&line.selected_options),
                    special_instructions: line.special_instructions.clone(),
                })
                .collect(),
            totals: OrderTotals {
                subtotal: order.subtotal,
                tax: order.tax,
                tip: order.tip.unwrap_or_default(),
                delivery_fee: order.delivery_fee.unwrap_or_default(),
                discount: order.discount.unwrap_or_default(),
                total: order.total,
            },
            special_instructions: order.special_instructions.clone(),
            order_time: order.order_time,
            promised_time: order.promised_time,
        })
    }
}

fn flatten_modifiers(options: &[SelectedOption]) -> Vec<PosOrderModifier> {
    options
        .iter()
        .flat_map(|option| {
            option.choices.iter().map(move |choice| PosOrderModifier {
                external_id: choice
                    .pos_external_id
                    .clone()
                    .unwrap_or_else(|| choice.id.clone()),
                group_name: option.name.clone(),
                name: choice.name.clone(),
                price_modifier: choice.price_modifier,
            })
        })
        .collect()
}

// =============================================================================
// Order Status
// =============================================================================

/// The six internal order states every provider status maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderState::Pending => "pending",
            OrderState::Confirmed => "confirmed",
            OrderState::Preparing => "preparing",
            OrderState::Ready => "ready",
            OrderState::Completed => "completed",
            OrderState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Remote order status as last reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    pub order_id: Option<String>,
    pub external_id: String,
    pub status: OrderState,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Minutes until ready. Negative once the promised time has passed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_ready_time: Option<i64>,
}

// =============================================================================
// Unit Tests
// =============================================================================
