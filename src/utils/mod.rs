//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Drop the query string from a URL, used to deduplicate listing links.
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Extract a stable product ID from a product URL.
///
/// Looks for the numeric part of paths like `/p/floral-dress-1234567.html`
/// or `/product/1234567`; falls back to the last path segment, then to the
/// whole URL, so the result is always usable as a state key.
pub fn extract_product_id(url: &str) -> String {
    if let Ok(re) = regex::Regex::new(r"/(?:p|product|detail)/([\w-]*?(\d+))") {
        if let Some(caps) = re.captures(url) {
            if let Some(num) = caps.get(2) {
                if !num.as_str().is_empty() {
                    return num.as_str().to_string();
                }
            }
            if let Some(slug) = caps.get(1) {
                return slug.as_str().to_string();
            }
        }
    }

    // Fallback: last path segment
    let trimmed = url.trim_end_matches('/');
    match trimmed.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => url.to_string(),
    }
}
