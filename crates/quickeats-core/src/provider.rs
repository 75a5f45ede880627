//! # Providers and Connection Status
//!
//! Which POS brand backs a restaurant, and how the live connection to it
//! is doing.
//!
//! ## Provider Support
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Provider Catalog                                 │
//! │                                                                         │
//! │  toast       ✅ implemented   Menu Sync, Order Management, Real-time    │
//! │  square      ✅ implemented   Menu Sync, Order Management, Inventory    │
//! │  clover      ⏳ recognized    Coming Soon                               │
//! │  lightspeed  ⏳ recognized    Coming Soon                               │
//! │  none        -  no integration                                          │
//! │                                                                         │
//! │  Any other string deserializes to `Unrecognized` and is treated        │
//! │  like `none` by the factory.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// POS Provider
// =============================================================================

/// A third-party POS brand.
///
/// Serialized as its lowercase id (`"toast"`, `"square"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PosProvider {
    Toast,
    Square,
    Clover,
    Lightspeed,
    /// No integration configured.
    #[default]
    None,
    /// A value the platform does not know about.
    Unrecognized,
}

impl PosProvider {
    /// Returns the wire id used in configs and cache keys.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PosProvider::Toast => "toast",
            PosProvider::Square => "square",
            PosProvider::Clover => "clover",
            PosProvider::Lightspeed => "lightspeed",
            PosProvider::None => "none",
            PosProvider::Unrecognized => "unrecognized",
        }
    }

    /// Parses a wire id. Unknown ids map to [`PosProvider::Unrecognized`].
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "toast" => PosProvider::Toast,
            "square" => PosProvider::Square,
            "clover" => PosProvider::Clover,
            "lightspeed" => PosProvider::Lightspeed,
            "" | "none" => PosProvider::None,
            _ => PosProvider::Unrecognized,
        }
    }

    /// Human-readable brand name.
    pub const fn display_name(&self) -> &'static str {
        match self {
            PosProvider::Toast => "Toast",
            PosProvider::Square => "Square",
            PosProvider::Clover => "Clover",
            PosProvider::Lightspeed => "Lightspeed",
            PosProvider::None => "None",
            PosProvider::Unrecognized => "Unrecognized",
        }
    }

    /// Returns true if an adapter exists for this provider.
    pub const fn is_implemented(&self) -> bool {
        matches!(self, PosProvider::Toast | PosProvider::Square)
    }

    /// Returns true for a real brand (implemented or announced).
    pub const fn is_selectable(&self) -> bool {
        matches!(
            self,
            PosProvider::Toast | PosProvider::Square | PosProvider::Clover | PosProvider::Lightspeed
        )
    }
}

impl fmt::Display for PosProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Serialize for PosProvider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PosProvider {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Ok(PosProvider::from_id(&id))
    }
}

// =============================================================================
// Connection Status
// =============================================================================

/// Live connection status of one adapter.
///
/// ## State Transitions
/// ```text
/// Disconnected ──connect() ok──► Connected ──fetch_menu()──► Syncing
///      ▲                             ▲                          │
///      │ disconnect()                └──────── done ────────────┤
///      │                                                        │ failure
///      └──────────────────────────── Error ◄────────────────────┘
/// ```
/// Status is best-effort diagnostics: concurrent calls on one adapter may
/// overwrite each other's transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
    Syncing,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Syncing => write!(f, "syncing"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Provider Catalog
// =============================================================================

/// Descriptive metadata about a provider for the admin UI.
///
/// This is not a capability probe; `available` only says whether the
/// platform ships an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub doc_url: String,
    pub features: Vec<String>,
    pub available: bool,
}

const COMING_SOON: &str = "Coming Soon";

impl ProviderInfo {
    fn new(
        provider: PosProvider,
        name: &str,
        description: &str,
        doc_url: &str,
        features: &[&str],
    ) -> Self {
        ProviderInfo {
            id: provider.as_str().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            doc_url: doc_url.to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
            available: provider.is_implemented(),
        }
    }

    /// The fixed catalog: two implemented providers, two announced.
    pub fn catalog() -> Vec<ProviderInfo> {
        vec![
            ProviderInfo::new(
                PosProvider::Toast,
                "Toast POS",
                "Popular restaurant POS system with comprehensive features",
                "https://doc.toasttab.com/",
                &["Menu Sync", "Order Management", "Real-time Updates"],
            ),
            ProviderInfo::new(
                PosProvider::Square,
                "Square",
                "Versatile POS system with easy setup and inventory management",
                "https://developer.squareup.com/docs",
                &["Menu Sync", "Order Management", "Inventory Tracking"],
            ),
            ProviderInfo::new(
                PosProvider::Clover,
                "Clover",
                "Flexible POS system with extensive app marketplace",
                "https://docs.clover.com/",
                &[COMING_SOON],
            ),
            ProviderInfo::new(
                PosProvider::Lightspeed,
                "Lightspeed",
                "Cloud-based POS for restaurants with advanced reporting",
                "https://developers.lightspeedhq.com/",
                &[COMING_SOON],
            ),
        ]
    }
}
