//! Monitor configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listing URLs to poll
    #[serde(default)]
    pub urls: Vec<String>,

    /// Which event categories produce notifications
    #[serde(default)]
    pub notify_on: NotifyConfig,

    /// Minimum product count for a listing zero-to-stocked transition
    #[serde(default = "defaults::listing_threshold_min")]
    pub listing_threshold_min: u64,

    /// Minutes between poll cycles
    #[serde(default = "defaults::poll_minutes")]
    pub poll_minutes: u64,

    /// HTTP and parsing behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Telegram delivery settings
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.urls.is_empty() {
            return Err(AppError::validation("No listing URLs configured"));
        }
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_products == 0 {
            return Err(AppError::validation("scraper.max_products must be > 0"));
        }
        if self.scraper.max_concurrent == 0 {
            return Err(AppError::validation("scraper.max_concurrent must be > 0"));
        }
        if self.listing_threshold_min == 0 {
            return Err(AppError::validation("listing_threshold_min must be > 0"));
        }
        Ok(())
    }

    /// Sleep duration between poll cycles, floored at 10 seconds so a
    /// zero or tiny setting cannot hammer the site.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs((self.poll_minutes * 60).max(10))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            notify_on: NotifyConfig::default(),
            listing_threshold_min: defaults::listing_threshold_min(),
            poll_minutes: defaults::poll_minutes(),
            scraper: ScraperConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

/// Per-category notification switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// First sighting of a product key
    #[serde(default = "defaults::enabled")]
    pub new_product: bool,

    /// New size labels and sizes going out of stock
    #[serde(default = "defaults::enabled")]
    pub size_change: bool,

    /// Sizes coming back in stock
    #[serde(default = "defaults::enabled")]
    pub restock: bool,

    /// Listing product count going from zero to at least the threshold
    #[serde(default)]
    pub listing_from_zero: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            new_product: true,
            size_change: true,
            restock: true,
            listing_from_zero: false,
        }
    }
}

/// HTTP client and page parsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between product detail requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum product links taken from one listing page
    #[serde(default = "defaults::max_products")]
    pub max_products: usize,

    /// Maximum concurrent product detail requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_products: defaults::max_products(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Telegram Bot API settings.
///
/// An empty token or chat id falls back to the `TELEGRAM_BOT_TOKEN` and
/// `TELEGRAM_CHAT_ID` environment variables when the notifier is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token, empty to read from the environment
    #[serde(default)]
    pub bot_token: String,

    /// Target chat id, empty to read from the environment
    #[serde(default)]
    pub chat_id: String,

    /// Suppress link previews in sent messages
    #[serde(default = "defaults::enabled")]
    pub disable_link_preview: bool,

    /// API endpoint base, overridable for testing
    #[serde(default = "defaults::telegram_api_base")]
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            disable_link_preview: true,
            api_base: defaults::telegram_api_base(),
        }
    }
}

mod defaults {
    pub fn enabled() -> bool {
        true
    }

    pub fn listing_threshold_min() -> u64 {
        1
    }

    pub fn poll_minutes() -> u64 {
        5
    }

    // Scraper defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; stockwatch/1.0)".into()
    }
    pub fn timeout() -> u64 {
        45
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_products() -> usize {
        50
    }
    pub fn max_concurrent() -> usize {
        1
    }

    pub fn telegram_api_base() -> String {
        "https://api.telegram.org".into()
    }
}
