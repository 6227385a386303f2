//! Product snapshot data structures.
//!
//! A [`ProductSnapshot`] is one observation of a product's title, price and
//! size availability at a point in time. Snapshots are produced by the
//! scraper and consumed by the change classifier.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Availability of a single size.
///
/// `Unknown` means the page gave no usable signal; it is distinct from
/// `OutOfStock` and must never be conflated with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockStatus {
    /// No explicit availability signal observed
    #[default]
    Unknown,
    /// Size is purchasable
    InStock,
    /// Size is sold out
    OutOfStock,
}

impl StockStatus {
    /// Tri-state as an optional boolean (`Unknown` maps to `None`).
    pub fn as_bool(self) -> Option<bool> {
        match self {
            StockStatus::Unknown => None,
            StockStatus::InStock => Some(true),
            StockStatus::OutOfStock => Some(false),
        }
    }
}

impl From<Option<bool>> for StockStatus {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => StockStatus::Unknown,
            Some(true) => StockStatus::InStock,
            Some(false) => StockStatus::OutOfStock,
        }
    }
}

// Persisted files keep the original `null | true | false` wire shape.
impl Serialize for StockStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_bool() {
            Some(b) => serializer.serialize_bool(b),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for StockStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<bool>::deserialize(deserializer)?.into())
    }
}

/// One size option observed on a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeInfo {
    /// Size label as shown on the page (e.g. "M", "XL", "UK 8")
    pub label: String,

    /// Explicit availability signal, if any
    #[serde(default, rename = "in_stock")]
    pub status: StockStatus,

    /// Remaining quantity, if the page exposes one
    #[serde(default)]
    pub qty: Option<u32>,
}

impl SizeInfo {
    /// Derived availability: an explicit in-stock flag, or a positive
    /// quantity when the flag is absent.
    pub fn is_available(&self) -> bool {
        self.status == StockStatus::InStock || self.qty.is_some_and(|q| q > 0)
    }
}

/// A link to a product discovered on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    /// Absolute product page URL
    pub url: String,

    /// Title text taken from the listing card (may be empty)
    pub title: String,
}

/// One observation of a product's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product id extracted from the URL (may be empty)
    pub id: String,

    /// Product page URL
    pub url: String,

    /// Product title
    pub title: String,

    /// Displayed price text, if found
    #[serde(default)]
    pub price: Option<String>,

    /// Size options in page order, unique by label
    #[serde(default)]
    pub sizes: Vec<SizeInfo>,
}

impl ProductSnapshot {
    /// Identity key used to match this product across polls.
    ///
    /// The extracted id when present, the URL otherwise. Must be stable
    /// between cycles or history cannot be matched.
    pub fn key(&self) -> &str {
        if self.id.is_empty() {
            &self.url
        } else {
            &self.id
        }
    }

    /// Drop duplicate size labels, keeping the first occurrence.
    ///
    /// A label must be unique within a snapshot; scrapers call this before
    /// handing the snapshot to the classifier.
    pub fn dedup_sizes(&mut self) {
        let mut seen = HashSet::new();
        self.sizes.retain(|s| seen.insert(s.label.clone()));
    }
}
