//! # Operation Outcomes
//!
//! Result objects returned to the UI by the hardened manager operations.
//! They carry free-text errors for direct display; there is no error-code
//! taxonomy beyond these messages and `ConnectionStatus`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::menu::MenuItem;

/// Item id to on-hand count. Counts may be fractional (weighed goods).
pub type InventoryCounts = HashMap<String, f64>;

// =============================================================================
// Menu Sync
// =============================================================================

/// Counters for one sync run.
///
/// Every sync is a full replace, so `items_added == items_synced` and the
/// other two counters stay 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub items_synced: u32,
    pub items_added: u32,
    pub items_updated: u32,
    pub items_removed: u32,
}

impl SyncStats {
    pub fn full_replace(count: usize) -> Self {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        SyncStats {
            items_synced: count,
            items_added: count,
            items_updated: 0,
            items_removed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    /// Present only on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<MenuItem>>,
    pub stats: SyncStats,
    /// Present only on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl SyncResult {
    pub fn succeeded(items: Vec<MenuItem>) -> Self {
        SyncResult {
            success: true,
            timestamp: Utc::now(),
            stats: SyncStats::full_replace(items.len()),
            items: Some(items),
            errors: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        SyncResult {
            success: false,
            timestamp: Utc::now(),
            items: None,
            stats: SyncStats::default(),
            errors: Some(vec![message.into()]),
        }
    }
}

// =============================================================================
// Orders and Connections
// =============================================================================

/// Outcome of submitting an order. `external_id` is set iff `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SendOrderResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendOrderResult {
    pub fn accepted(external_id: impl Into<String>) -> Self {
        SendOrderResult {
            success: true,
            external_id: Some(external_id.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        SendOrderResult {
            success: false,
            external_id: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectResult {
    pub fn connected() -> Self {
        ConnectResult {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ConnectResult {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Result of checking a config before it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConfigValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}
