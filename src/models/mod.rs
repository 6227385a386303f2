// src/models/mod.rs

//! Domain models for the stock monitor.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod product;
mod state;

// Re-export all public types
pub use config::{Config, NotifyConfig, ScraperConfig, TelegramConfig};
pub use product::{ListingItem, ProductSnapshot, SizeInfo, StockStatus};
pub use state::{MonitorState, ProductRecord, SizeRecord};

use chrono::{DateTime, Utc};

/// Counters for one completed poll cycle.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CycleStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub listings_scanned: usize,
    pub listing_failures: usize,
    pub products_checked: usize,
    pub product_failures: usize,
    pub messages_sent: usize,
    pub notify_failures: usize,
}

impl CycleStats {
    /// Fresh counters stamped with the cycle start time.
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            listings_scanned: 0,
            listing_failures: 0,
            products_checked: 0,
            product_failures: 0,
            messages_sent: 0,
            notify_failures: 0,
        }
    }

    /// Stamp the cycle end time.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }
}
