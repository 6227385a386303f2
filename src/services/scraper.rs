// src/services/scraper.rs

//! Product page scraping service.
//!
//! Fetches listing and product pages over plain HTTP and extracts titles,
//! prices and per-size availability from the markup. Sizes come from the
//! size-picker buttons when present, with a fallback that mines embedded
//! script JSON for sku/stock fields.

use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ListingItem, ProductSnapshot, ScraperConfig, SizeInfo, StockStatus};
use crate::utils;
use crate::utils::http::create_async_client;

/// Anchors that look like product cards on a listing page.
const LISTING_LINK_SELECTOR: &str = "a[href*='/p/'], a[href*='/product/'], a[href*='/detail/']";

const TITLE_SELECTOR: &str = "h1, h1[itemprop='name'], [data-testid='product-title']";

const PRICE_SELECTOR: &str =
    "[data-testid='price'], .original, .sale, [itemprop='price'], .product-intro__price";

const SIZE_SELECTOR: &str =
    "[data-testid*='size'], .product-intro__size .item, button[aria-label*='Size'], .product-intro__size .size";

/// Keywords that mark a script worth mining for size data.
const SCRIPT_HINTS: [&str; 5] = ["sku", "inStock", "inventory", "stock", "size"];

/// Source of listing contents and product snapshots.
#[async_trait]
pub trait ProductScraper: Send + Sync {
    /// Collect product links from a listing page.
    async fn scrape_listing(&self, url: &str) -> Result<Vec<ListingItem>>;

    /// Fetch one product page and extract its current snapshot.
    async fn scrape_product(&self, url: &str) -> Result<ProductSnapshot>;
}

/// Scraper for Shein India listing and product pages.
pub struct SheinScraper {
    config: ScraperConfig,
    client: Client,
}

impl SheinScraper {
    /// Create a new scraper with the given configuration.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            client: create_async_client(config)?,
        })
    }

    /// Extract product links from listing markup.
    ///
    /// Links are resolved against the listing URL, deduplicated on their
    /// query-less form and capped at `max_products`.
    fn parse_listing(&self, html: &str, listing_url: &str) -> Result<Vec<ListingItem>> {
        let document = Html::parse_document(html);
        let link_sel = parse_selector(LISTING_LINK_SELECTOR)?;
        let base_url = url::Url::parse(listing_url)?;

        let mut items = Vec::new();
        let mut seen = HashSet::new();

        for anchor in document.select(&link_sel) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let url = utils::resolve_url(&base_url, href);
            if !is_product_link(&url) {
                continue;
            }
            if !seen.insert(utils::strip_query(&url).to_string()) {
                continue;
            }

            let attr_title = anchor.value().attr("title").unwrap_or("").trim();
            let title = if attr_title.is_empty() {
                element_text(&anchor)
            } else {
                attr_title.to_string()
            };

            items.push(ListingItem { url, title });
            if items.len() >= self.config.max_products {
                break;
            }
        }

        Ok(items)
    }

    /// Extract a product snapshot from product page markup.
    fn parse_product(&self, html: &str, url: &str) -> Result<ProductSnapshot> {
        let document = Html::parse_document(html);

        let title_sel = parse_selector(TITLE_SELECTOR)?;
        let mut title = document
            .select(&title_sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();
        if title.is_empty() {
            let head_sel = parse_selector("title")?;
            title = document
                .select(&head_sel)
                .next()
                .map(|el| element_text(&el))
                .unwrap_or_default();
        }

        let price_sel = parse_selector(PRICE_SELECTOR)?;
        let price = document
            .select(&price_sel)
            .next()
            .map(|el| element_text(&el))
            .filter(|p| !p.is_empty());

        let size_sel = parse_selector(SIZE_SELECTOR)?;
        let mut sizes: Vec<SizeInfo> = Vec::new();
        for button in document.select(&size_sel) {
            let label = element_text(&button);
            if label.is_empty() {
                continue;
            }
            let status = if is_disabled(&button) {
                StockStatus::OutOfStock
            } else {
                StockStatus::InStock
            };
            sizes.push(SizeInfo {
                label,
                status,
                qty: None,
            });
        }

        // No size picker rendered: mine script payloads instead.
        if sizes.is_empty() {
            let script_sel = parse_selector("script")?;
            for script in document.select(&script_sel) {
                let text: String = script.text().collect();
                if !SCRIPT_HINTS.iter().any(|hint| text.contains(hint)) {
                    continue;
                }
                let parsed = sizes_from_json(&text);
                if !parsed.is_empty() {
                    sizes = parsed;
                    break;
                }
            }
        }

        let mut snapshot = ProductSnapshot {
            id: utils::extract_product_id(url),
            url: url.to_string(),
            title,
            price,
            sizes,
        };
        snapshot.dedup_sizes();
        Ok(snapshot)
    }
}

#[async_trait]
impl ProductScraper for SheinScraper {
    async fn scrape_listing(&self, url: &str) -> Result<Vec<ListingItem>> {
        let html = self.client.get(url).send().await?.text().await?;
        self.parse_listing(&html, url)
    }

    async fn scrape_product(&self, url: &str) -> Result<ProductSnapshot> {
        let html = self.client.get(url).send().await?.text().await?;
        self.parse_product(&html, url)
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn is_product_link(url: &str) -> bool {
    ["/p/", "/product/", "/detail/"]
        .iter()
        .any(|needle| url.contains(needle))
}

fn is_disabled(element: &ElementRef) -> bool {
    let value = element.value();
    value.attr("disabled").is_some()
        || value.attr("aria-disabled") == Some("true")
        || value
            .attr("class")
            .is_some_and(|c| c.to_lowercase().contains("disabled"))
}

/// Pull size entries out of script text.
///
/// Scans single-line JSON-ish blobs for a size label plus either a stock
/// quantity or an in-stock flag. When only a quantity is present the
/// status is derived from it; a label with neither stays `Unknown`.
fn sizes_from_json(text: &str) -> Vec<SizeInfo> {
    let Ok(candidate_re) =
        Regex::new(r"(?i)\{[^\n]*?(?:sku|size|inStock|stock|inventory)[^\n]*?\}")
    else {
        return Vec::new();
    };
    let Ok(label_re) =
        Regex::new(r#"(?i)"(?:size|sizeName|size_label|sizeDesc)"\s*:\s*"([^"]+)""#)
    else {
        return Vec::new();
    };
    let Ok(qty_re) = Regex::new(r#"(?i)"(?:stock|inventory|qty)"\s*:\s*(\d+)"#) else {
        return Vec::new();
    };
    let Ok(flag_re) = Regex::new(r#"(?i)"(?:inStock|available)"\s*:\s*(true|false)"#) else {
        return Vec::new();
    };

    let mut sizes: Vec<SizeInfo> = Vec::new();
    let mut seen = HashSet::new();

    for candidate in candidate_re.find_iter(text) {
        let chunk = candidate.as_str();
        let Some(label) = label_re
            .captures(chunk)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
        else {
            continue;
        };
        if label.is_empty() || !seen.insert(label.clone()) {
            continue;
        }

        let qty = qty_re
            .captures(chunk)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());

        let status = match flag_re.captures(chunk).and_then(|caps| caps.get(1)) {
            Some(flag) => {
                if flag.as_str().eq_ignore_ascii_case("true") {
                    StockStatus::InStock
                } else {
                    StockStatus::OutOfStock
                }
            }
            None => match qty {
                Some(q) if q > 0 => StockStatus::InStock,
                Some(_) => StockStatus::OutOfStock,
                None => StockStatus::Unknown,
            },
        };

        sizes.push(SizeInfo { label, status, qty });
    }

    sizes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_scraper() -> SheinScraper {
        SheinScraper::new(&ScraperConfig::default()).unwrap()
    }

    const LISTING_HTML: &str = r#"
        <html><body>
          <a href="/p/floral-dress-1234567.html" title="Floral Dress">card</a>
          <a href="/p/floral-dress-1234567.html?src=recommend" title="Floral Dress">dupe</a>
          <a href="https://example.com/product/8899001">Plain Tee</a>
          <a href="/help/shipping">Shipping info</a>
          <a href="/detail/denim-554433"><span>Denim</span> <span>Jacket</span></a>
        </body></html>
    "#;

    #[test]
    fn listing_links_resolved_and_deduped() {
        let scraper = make_scraper();
        let items = scraper
            .parse_listing(LISTING_HTML, "https://example.com/women-dresses")
            .unwrap();

        let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/p/floral-dress-1234567.html",
                "https://example.com/product/8899001",
                "https://example.com/detail/denim-554433",
            ]
        );
    }

    #[test]
    fn listing_title_prefers_attribute_over_text() {
        let scraper = make_scraper();
        let items = scraper
            .parse_listing(LISTING_HTML, "https://example.com/women-dresses")
            .unwrap();

        assert_eq!(items[0].title, "Floral Dress");
        assert_eq!(items[1].title, "Plain Tee");
        assert_eq!(items[2].title, "Denim Jacket");
    }

    #[test]
    fn listing_respects_max_products() {
        let mut config = ScraperConfig::default();
        config.max_products = 1;
        let scraper = SheinScraper::new(&config).unwrap();

        let items = scraper
            .parse_listing(LISTING_HTML, "https://example.com/women-dresses")
            .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn product_page_with_size_buttons() {
        let html = r#"
            <html><head><title>fallback</title></head><body>
              <h1>Floral Dress</h1>
              <div class="product-intro__price">₹1,299</div>
              <div class="product-intro__size">
                <button class="item">S</button>
                <button class="item" disabled>M</button>
                <button class="item" aria-disabled="true">L</button>
                <button class="item size-disabled">XL</button>
              </div>
            </body></html>
        "#;

        let scraper = make_scraper();
        let snapshot = scraper
            .parse_product(html, "https://example.com/p/floral-dress-1234567.html")
            .unwrap();

        assert_eq!(snapshot.id, "1234567");
        assert_eq!(snapshot.title, "Floral Dress");
        assert_eq!(snapshot.price.as_deref(), Some("₹1,299"));
        assert_eq!(snapshot.sizes.len(), 4);
        assert_eq!(snapshot.sizes[0].status, StockStatus::InStock);
        assert_eq!(snapshot.sizes[1].status, StockStatus::OutOfStock);
        assert_eq!(snapshot.sizes[2].status, StockStatus::OutOfStock);
        assert_eq!(snapshot.sizes[3].status, StockStatus::OutOfStock);
    }

    #[test]
    fn product_title_falls_back_to_head() {
        let html = r#"<html><head><title>Plain Tee | Shop</title></head><body></body></html>"#;

        let scraper = make_scraper();
        let snapshot = scraper
            .parse_product(html, "https://example.com/p/plain-tee-42.html")
            .unwrap();
        assert_eq!(snapshot.title, "Plain Tee | Shop");
        assert_eq!(snapshot.price, None);
        assert!(snapshot.sizes.is_empty());
    }

    #[test]
    fn product_sizes_fall_back_to_script_json() {
        let html = r#"
            <html><body>
              <h1>Denim Jacket</h1>
              <script>
                window.__DATA__ = {"skuList": [
                  {"sizeName": "S", "stock": 4},
                  {"sizeName": "M", "stock": 0},
                ]};
              </script>
            </body></html>
        "#;

        let scraper = make_scraper();
        let snapshot = scraper
            .parse_product(html, "https://example.com/detail/denim-554433")
            .unwrap();

        assert_eq!(snapshot.sizes.len(), 2);
        assert_eq!(snapshot.sizes[0].label, "S");
        assert_eq!(snapshot.sizes[0].status, StockStatus::InStock);
        assert_eq!(snapshot.sizes[0].qty, Some(4));
        assert_eq!(snapshot.sizes[1].status, StockStatus::OutOfStock);
    }

    #[test]
    fn sizes_from_json_reads_flags_and_quantities() {
        let text = r#"
            {"size": "S", "inStock": true}
            {"size": "M", "inStock": false, "stock": 7}
            {"size": "L", "qty": 2}
            {"size": "XL"}
            {"color": "red", "stock": 9}
        "#;

        let sizes = sizes_from_json(text);
        assert_eq!(sizes.len(), 4);

        assert_eq!(sizes[0].status, StockStatus::InStock);
        assert_eq!(sizes[0].qty, None);

        // Explicit flag beats the quantity
        assert_eq!(sizes[1].status, StockStatus::OutOfStock);
        assert_eq!(sizes[1].qty, Some(7));

        assert_eq!(sizes[2].status, StockStatus::InStock);
        assert_eq!(sizes[2].qty, Some(2));

        assert_eq!(sizes[3].status, StockStatus::Unknown);
        assert_eq!(sizes[3].qty, None);
    }

    #[test]
    fn sizes_from_json_keeps_first_duplicate() {
        let text = r#"
            {"sizeName": "S", "stock": 3}
            {"sizeName": "S", "stock": 0}
        "#;

        let sizes = sizes_from_json(text);
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0].qty, Some(3));
    }
}
