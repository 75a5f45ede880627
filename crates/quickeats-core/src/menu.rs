//! # Menu Types and Transforms
//!
//! Two shapes of the same menu:
//!
//! - **Normalized provider items** (`PosMenuItem`): what every adapter
//!   produces from its provider's catalog. Prices in dollars, modifier
//!   groups with explicit min/max.
//! - **Internal items** (`MenuItem`): what the storefront renders. Option
//!   groups carry a positional id and a `single`/`multiple` selection type.
//!
//! ```text
//! Toast JSON ──┐                                  ┌──► storefront
//!              ├──► PosMenuItem ──menu_item_from_pos──► MenuItem
//! Square JSON ─┘         ▲                                  │
//!                        └────────menu_item_to_pos──────────┘
//! ```
//!
//! ## Positional Ids
//! A group's `id` is its 1-based position in the item's group list, and the
//! same for a choice within its group. Positions are stable within one fetch
//! only; providers identify modifiers by external id.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Normalized Provider Shapes
// =============================================================================

/// Selection cardinality of a modifier group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Single,
    Multiple,
}

impl SelectionKind {
    /// `single` when exactly one selection is allowed.
    pub fn from_max(max_selections: u32) -> Self {
        if max_selections == 1 {
            SelectionKind::Single
        } else {
            SelectionKind::Multiple
        }
    }
}

/// One choice inside a provider modifier group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosModifier {
    pub external_id: String,
    pub name: String,
    /// Signed adjustment to the item price.
    #[ts(type = "number")]
    pub price_modifier: Money,
    pub available: bool,
}

/// A provider modifier group ("Size", "Toppings").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosModifierGroup {
    pub external_id: String,
    pub name: String,
    pub required: bool,
    pub min_selections: u32,
    pub max_selections: u32,
    pub modifiers: Vec<PosModifier>,
}

impl PosModifierGroup {
    /// Builds a group with `required` derived from `min_selections`.
    pub fn new(
        external_id: impl Into<String>,
        name: impl Into<String>,
        min_selections: u32,
        max_selections: u32,
        modifiers: Vec<PosModifier>,
    ) -> Self {
        PosModifierGroup {
            external_id: external_id.into(),
            name: name.into(),
            required: min_selections > 0,
            min_selections,
            max_selections,
            modifiers,
        }
    }

    pub fn kind(&self) -> SelectionKind {
        SelectionKind::from_max(self.max_selections)
    }
}

/// A menu item in the normalized provider schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosMenuItem {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Always dollars on the wire, whatever the provider uses.
    #[ts(type = "number")]
    pub price: Money,
    pub category: String,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_count: Option<f64>,
    #[serde(default)]
    pub modifier_groups: Vec<PosModifierGroup>,
}

// =============================================================================
// Internal Storefront Shapes
// =============================================================================

/// A selectable choice in a storefront option group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub id: u32,
    pub name: String,
    #[ts(type = "number")]
    pub price_modifier: Money,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_external_id: Option<String>,
}

/// A storefront option group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ModifierGroup {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SelectionKind,
    pub required: bool,
    pub min_selections: u32,
    pub max_selections: u32,
    pub choices: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_external_id: Option<String>,
}

/// A storefront menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[ts(type = "number")]
    pub price: Money,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub available: bool,
    /// Image URL, empty when the provider has none.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub options: Vec<ModifierGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_count: Option<f64>,
}

// =============================================================================
// Transforms
// =============================================================================

/// Converts provider modifier groups into storefront option groups.
pub fn modifier_groups_from_pos(groups: &[PosModifierGroup]) -> Vec<ModifierGroup> {
    groups
        .iter()
        .zip(1u32..)
        .map(|(group, id)| ModifierGroup {
            id,
            name: group.name.clone(),
            kind: group.kind(),
            required: group.required,
            min_selections: group.min_selections,
            max_selections: group.max_selections,
            choices: group
                .modifiers
                .iter()
                .zip(1u32..)
                .map(|(m, choice_id)| Modifier {
                    id: choice_id,
                    name: m.name.clone(),
                    price_modifier: m.price_modifier,
                    available: m.available,
                    pos_external_id: Some(m.external_id.clone()),
                })
                .collect(),
            pos_external_id: Some(group.external_id.clone()),
        })
        .collect()
}

/// Converts a normalized provider item into a storefront item.
pub fn menu_item_from_pos(item: &PosMenuItem) -> MenuItem {
    MenuItem {
        id: item.external_id.clone(),
        name: item.name.clone(),
        price: item.price,
        description: item.description.clone(),
        category: item.category.clone(),
        available: item.available,
        image: item.image_url.clone().unwrap_or_default(),
        options: modifier_groups_from_pos(&item.modifier_groups),
        pos_external_id: Some(item.external_id.clone()),
        inventory_count: item.inventory_count,
    }
}

/// Converts a storefront item back into the normalized provider schema.
///
/// External ids fall back to the positional ids when an item never came
/// from a provider.
pub fn menu_item_to_pos(item: &MenuItem) -> PosMenuItem {
    PosMenuItem {
        external_id: item.pos_external_id.clone().unwrap_or_else(|| item.id.clone()),
        name: item.name.clone(),
        description: item.description.clone(),
        price: item.price,
        category: item.category.clone(),
        available: item.available,
        sku: None,
        image_url: Some(item.image.clone()).filter(|url| !url.is_empty()),
        inventory_count: item.inventory_count,
        modifier_groups: item
            .options
            .iter()
            .map(|group| PosModifierGroup {
                external_id: group
                    .pos_external_id
                    .clone()
                    .unwrap_or_else(|| group.id.to_string()),
                name: group.name.clone(),
                required: group.required,
                min_selections: group.min_selections,
                max_selections: group.max_selections,
                modifiers: group
                    .choices
                    .iter()
                    .map(|choice| PosModifier {
                        external_id: choice
                            .pos_external_id
                            .clone()
                            .unwrap_or_else(|| choice.id.to_string()),
                        name: choice.name.clone(),
                        price_modifier: choice.price_modifier,
                        available: choice.available,
                    })
                    .collect(),
            })
            .collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
