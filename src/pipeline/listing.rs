//! Listing-level transition detection.
//!
//! Watches the product count of each listing page and reports the moment
//! a previously empty listing comes back with at least the configured
//! number of products. The stored count is updated on every check, so the
//! alert fires once per empty-to-stocked transition and arms again only
//! after the listing drains back to zero.

use crate::models::MonitorState;

/// Record the current product count for a listing and report whether the
/// empty-to-stocked alert should fire.
///
/// Fires only on a transition from a stored count of zero (or a listing
/// never seen before) to `current_count >= threshold`.
pub fn check_listing_transition(
    state: &mut MonitorState,
    listing_url: &str,
    current_count: u64,
    threshold: u64,
) -> bool {
    let previous = state.listing_count(listing_url);
    state.set_listing_count(listing_url, current_count);
    previous == 0 && current_count >= threshold
}

/// Render the empty-to-stocked alert for a listing.
pub fn listing_message(listing_url: &str, current_count: u64) -> String {
    format!(
        "🛒 श्रेणी अपडेट\nURL: {}\nउत्पाद मिले: {} (पहले 0)\nअब प्रोडक्ट उपलब्ध हैं.",
        listing_url, current_count
    )
}
