//! Persisted monitor state.
//!
//! [`MonitorState`] is the durable mapping from product key to last-known
//! snapshot, plus per-listing product counts. It is loaded at startup, held
//! resident across poll cycles, and written back atomically after every
//! cycle. Entries are only overwritten, never deleted, so a product that
//! disappears from a listing keeps its history.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{ProductSnapshot, StockStatus};

/// Stored availability for one size label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SizeRecord {
    /// Last observed availability signal
    #[serde(default, rename = "in_stock")]
    pub status: StockStatus,

    /// Last observed quantity, if any
    #[serde(default)]
    pub qty: Option<u32>,
}

/// The stored form of a product snapshot.
///
/// Sizes are kept as a label-keyed map rather than a sequence because
/// lookup-by-label is the only access pattern on replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProductRecord {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub sizes: HashMap<String, SizeRecord>,
}

impl From<&ProductSnapshot> for ProductRecord {
    fn from(snapshot: &ProductSnapshot) -> Self {
        let mut sizes = HashMap::new();
        // First occurrence wins, same as snapshot dedup.
        for size in &snapshot.sizes {
            sizes.entry(size.label.clone()).or_insert(SizeRecord {
                status: size.status,
                qty: size.qty,
            });
        }
        Self {
            url: snapshot.url.clone(),
            title: snapshot.title.clone(),
            price: snapshot.price.clone(),
            sizes,
        }
    }
}

/// Durable state shared by the change classifier and the listing detector.
///
/// Products and listing counts live in separate fields; a product id can
/// never collide with listing bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MonitorState {
    /// When the state was last written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Last-known record per product key
    #[serde(default)]
    pub products: HashMap<String, ProductRecord>,

    /// Last seen product count per listing URL
    #[serde(default, deserialize_with = "lenient_counts")]
    pub listings: HashMap<String, u64>,
}

impl MonitorState {
    /// Last-known record for a product key, if any.
    pub fn product(&self, key: &str) -> Option<&ProductRecord> {
        self.products.get(key)
    }

    /// Overwrite the stored record for a snapshot's key.
    ///
    /// Called for every product seen in a cycle, whether or not the
    /// classifier emitted a message.
    pub fn upsert(&mut self, snapshot: &ProductSnapshot) {
        self.products
            .insert(snapshot.key().to_string(), ProductRecord::from(snapshot));
    }

    /// Last seen product count for a listing URL (0 when unseen).
    pub fn listing_count(&self, listing_url: &str) -> u64 {
        self.listings.get(listing_url).copied().unwrap_or(0)
    }

    /// Store the current product count for a listing URL.
    pub fn set_listing_count(&mut self, listing_url: &str, count: u64) {
        self.listings.insert(listing_url.to_string(), count);
    }

    /// Stamp the state with the current time, done right before saving.
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// Deserialize listing counts tolerantly: numbers are taken as-is,
/// numeric strings are parsed, anything malformed falls back to 0.
fn lenient_counts<'de, D>(deserializer: D) -> Result<HashMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: HashMap<String, serde_json::Value> = HashMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(url, value)| {
            let count = match value {
                serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
                serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
                _ => 0,
            };
            (url, count)
        })
        .collect())
}
