//! Service layer for the stock monitor.
//!
//! This module contains the outward-facing collaborators:
//! - Page scraping (`SheinScraper`)
//! - Notification delivery (`TelegramNotifier`, `ConsoleNotifier`)

mod notifier;
mod scraper;

pub use notifier::{ConsoleNotifier, Notifier, TelegramNotifier};
pub use scraper::{ProductScraper, SheinScraper};
