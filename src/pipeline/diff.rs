//! Change classification between stored and freshly scraped products.
//!
//! Compares a product snapshot against its last-known record and renders
//! at most one notification message per product per cycle: either a
//! new-product announcement or a stock update listing per-size changes.

use std::collections::HashSet;

use crate::models::{NotifyConfig, ProductRecord, ProductSnapshot, SizeInfo, SizeRecord, StockStatus};

/// Classifier that turns snapshot differences into notification text.
#[derive(Debug, Clone, Default)]
pub struct ChangeClassifier {
    notify: NotifyConfig,
}

impl ChangeClassifier {
    /// Create a classifier with the given notification switches.
    pub fn new(notify: NotifyConfig) -> Self {
        Self { notify }
    }

    /// Compare a snapshot against its stored record.
    ///
    /// Returns the rendered message when something notifiable happened,
    /// `None` otherwise. A product never seen before short-circuits into
    /// the new-product announcement; size-level comparison only runs for
    /// products with history.
    pub fn classify(
        &self,
        previous: Option<&ProductRecord>,
        current: &ProductSnapshot,
    ) -> Option<String> {
        let Some(prev) = previous else {
            if self.notify.new_product {
                return Some(new_product_message(current));
            }
            return None;
        };

        let mut changes: Vec<String> = Vec::new();

        // New size labels, in page order.
        let mut seen: HashSet<&str> = HashSet::new();
        for size in &current.sizes {
            if !seen.insert(size.label.as_str()) {
                continue;
            }
            if self.notify.size_change && !prev.sizes.contains_key(&size.label) {
                changes.push(format!("नया साइज: {}", size.label));
            }
        }

        // Availability transitions on labels present in both snapshots.
        // Restock and out-of-stock are judged independently: a size can
        // report both in one cycle when status and quantity disagree.
        seen.clear();
        for size in &current.sizes {
            if !seen.insert(size.label.as_str()) {
                continue;
            }
            let Some(old) = prev.sizes.get(&size.label) else {
                continue;
            };
            if self.notify.restock && became_available(old, size) {
                changes.push(format!("री-स्टॉक: {}", size.label));
            }
            if self.notify.size_change && went_out_of_stock(old, size) {
                changes.push(format!("आउट ऑफ स्टॉक: {}", size.label));
            }
        }

        if changes.is_empty() {
            None
        } else {
            Some(stock_update_message(current, &changes))
        }
    }
}

/// A size came back: explicit out-of-stock flipped to in-stock, or a
/// tracked quantity of exactly zero became positive.
fn became_available(old: &SizeRecord, new: &SizeInfo) -> bool {
    (old.status == StockStatus::OutOfStock && new.status == StockStatus::InStock)
        || (old.qty == Some(0) && new.qty.unwrap_or(0) > 0)
}

/// A size sold out: explicit in-stock flipped to out-of-stock, or a
/// positive quantity dropped to zero (or stopped being reported).
fn went_out_of_stock(old: &SizeRecord, new: &SizeInfo) -> bool {
    (old.status == StockStatus::InStock && new.status == StockStatus::OutOfStock)
        || (old.qty.unwrap_or(0) > 0 && new.qty.unwrap_or(0) == 0)
}

fn new_product_message(current: &ProductSnapshot) -> String {
    let sizes_str = if current.sizes.is_empty() {
        "N/A".to_string()
    } else {
        current
            .sizes
            .iter()
            .map(|s| {
                format!("{}:{}", s.label, if s.is_available() { "✅" } else { "❌" })
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "🆕 नया प्रोडक्ट आया\nशीर्षक: {}\nकीमत: {}\nसाइज: {}\nलिंक: {}",
        current.title,
        current.price.as_deref().unwrap_or("N/A"),
        sizes_str,
        current.url
    )
}

fn stock_update_message(current: &ProductSnapshot, changes: &[String]) -> String {
    format!(
        "🔔 स्टॉक अपडेट\nप्रोडक्ट: {}\nपरिवर्तन: {}\nकीमत: {}\nलिंक: {}",
        current.title,
        changes.join(", "),
        current.price.as_deref().unwrap_or("N/A"),
        current.url
    )
}

/// Convenience function to classify a single product change.
pub fn classify_change(
    previous: Option<&ProductRecord>,
    current: &ProductSnapshot,
    notify: &NotifyConfig,
) -> Option<String> {
    ChangeClassifier::new(notify.clone()).classify(previous, current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(label: &str, status: StockStatus, qty: Option<u32>) -> SizeInfo {
        SizeInfo {
            label: label.to_string(),
            status,
            qty,
        }
    }

    fn make_snapshot(sizes: Vec<SizeInfo>) -> ProductSnapshot {
        ProductSnapshot {
            id: "1234567".to_string(),
            url: "https://example.com/p/dress-1234567.html".to_string(),
            title: "Floral Dress".to_string(),
            price: Some("₹1,299".to_string()),
            sizes,
        }
    }

    fn stored(sizes: Vec<SizeInfo>) -> ProductRecord {
        ProductRecord::from(&make_snapshot(sizes))
    }

    #[test]
    fn first_sighting_announces_new_product() {
        let snapshot = make_snapshot(vec![
            size("S", StockStatus::InStock, None),
            size("M", StockStatus::OutOfStock, None),
        ]);

        let msg = classify_change(None, &snapshot, &NotifyConfig::default()).unwrap();
        assert!(msg.starts_with("🆕 नया प्रोडक्ट आया"));
        assert!(msg.contains("शीर्षक: Floral Dress"));
        assert!(msg.contains("कीमत: ₹1,299"));
        assert!(msg.contains("साइज: S:✅, M:❌"));
        assert!(msg.contains("लिंक: https://example.com/p/dress-1234567.html"));
    }

    #[test]
    fn first_sighting_respects_switch() {
        let snapshot = make_snapshot(vec![size("S", StockStatus::InStock, None)]);
        let notify = NotifyConfig {
            new_product: false,
            ..NotifyConfig::default()
        };

        assert_eq!(classify_change(None, &snapshot, &notify), None);
    }

    #[test]
    fn new_product_without_sizes_or_price_uses_placeholders() {
        let mut snapshot = make_snapshot(vec![]);
        snapshot.price = None;

        let msg = classify_change(None, &snapshot, &NotifyConfig::default()).unwrap();
        assert!(msg.contains("कीमत: N/A"));
        assert!(msg.contains("साइज: N/A"));
    }

    #[test]
    fn quantity_counts_as_available_in_glyphs() {
        let snapshot = make_snapshot(vec![size("XL", StockStatus::Unknown, Some(4))]);

        let msg = classify_change(None, &snapshot, &NotifyConfig::default()).unwrap();
        assert!(msg.contains("साइज: XL:✅"));
    }

    #[test]
    fn unchanged_product_is_silent() {
        let sizes = vec![
            size("S", StockStatus::InStock, Some(3)),
            size("M", StockStatus::OutOfStock, Some(0)),
        ];
        let snapshot = make_snapshot(sizes.clone());
        let record = stored(sizes);

        assert_eq!(
            classify_change(Some(&record), &snapshot, &NotifyConfig::default()),
            None
        );
    }

    #[test]
    fn new_size_label_is_reported() {
        let record = stored(vec![size("S", StockStatus::InStock, None)]);
        let snapshot = make_snapshot(vec![
            size("S", StockStatus::InStock, None),
            size("M", StockStatus::InStock, None),
        ]);

        let msg = classify_change(Some(&record), &snapshot, &NotifyConfig::default()).unwrap();
        assert!(msg.starts_with("🔔 स्टॉक अपडेट"));
        assert!(msg.contains("परिवर्तन: नया साइज: M"));
    }

    #[test]
    fn new_size_respects_size_change_switch() {
        let record = stored(vec![size("S", StockStatus::InStock, None)]);
        let snapshot = make_snapshot(vec![
            size("S", StockStatus::InStock, None),
            size("M", StockStatus::InStock, None),
        ]);
        let notify = NotifyConfig {
            size_change: false,
            ..NotifyConfig::default()
        };

        assert_eq!(classify_change(Some(&record), &snapshot, &notify), None);
    }

    #[test]
    fn restock_on_status_flip() {
        let record = stored(vec![size("S", StockStatus::OutOfStock, None)]);
        let snapshot = make_snapshot(vec![size("S", StockStatus::InStock, None)]);

        let msg = classify_change(Some(&record), &snapshot, &NotifyConfig::default()).unwrap();
        assert!(msg.contains("परिवर्तन: री-स्टॉक: S"));
    }

    #[test]
    fn restock_on_quantity_refill() {
        let record = stored(vec![size("S", StockStatus::Unknown, Some(0))]);
        let snapshot = make_snapshot(vec![size("S", StockStatus::Unknown, Some(5))]);

        let msg = classify_change(Some(&record), &snapshot, &NotifyConfig::default()).unwrap();
        assert!(msg.contains("री-स्टॉक: S"));
    }

    #[test]
    fn untracked_old_quantity_is_not_a_restock() {
        // qty was never reported before, so a positive qty now is not a refill
        let record = stored(vec![size("S", StockStatus::Unknown, None)]);
        let snapshot = make_snapshot(vec![size("S", StockStatus::Unknown, Some(5))]);

        assert_eq!(
            classify_change(Some(&record), &snapshot, &NotifyConfig::default()),
            None
        );
    }

    #[test]
    fn restock_respects_switch() {
        let record = stored(vec![size("S", StockStatus::OutOfStock, None)]);
        let snapshot = make_snapshot(vec![size("S", StockStatus::InStock, None)]);
        let notify = NotifyConfig {
            restock: false,
            ..NotifyConfig::default()
        };

        assert_eq!(classify_change(Some(&record), &snapshot, &notify), None);
    }

    #[test]
    fn out_of_stock_on_status_flip() {
        let record = stored(vec![size("M", StockStatus::InStock, None)]);
        let snapshot = make_snapshot(vec![size("M", StockStatus::OutOfStock, None)]);

        let msg = classify_change(Some(&record), &snapshot, &NotifyConfig::default()).unwrap();
        assert!(msg.contains("परिवर्तन: आउट ऑफ स्टॉक: M"));
    }

    #[test]
    fn out_of_stock_on_quantity_drop() {
        let record = stored(vec![size("M", StockStatus::Unknown, Some(3))]);
        let snapshot = make_snapshot(vec![size("M", StockStatus::Unknown, Some(0))]);

        let msg = classify_change(Some(&record), &snapshot, &NotifyConfig::default()).unwrap();
        assert!(msg.contains("आउट ऑफ स्टॉक: M"));
    }

    #[test]
    fn out_of_stock_gated_by_size_change_switch() {
        let record = stored(vec![
            size("S", StockStatus::OutOfStock, None),
            size("M", StockStatus::InStock, None),
        ]);
        let snapshot = make_snapshot(vec![
            size("S", StockStatus::InStock, None),
            size("M", StockStatus::OutOfStock, None),
        ]);
        let notify = NotifyConfig {
            size_change: false,
            ..NotifyConfig::default()
        };

        // The restock still reports; the sell-out is suppressed.
        let msg = classify_change(Some(&record), &snapshot, &notify).unwrap();
        assert!(msg.contains("री-स्टॉक: S"));
        assert!(!msg.contains("आउट ऑफ स्टॉक"));
    }

    #[test]
    fn restock_and_out_of_stock_can_coexist() {
        // Status flipped back in stock while the tracked quantity ran out.
        let record = stored(vec![size("S", StockStatus::OutOfStock, Some(3))]);
        let snapshot = make_snapshot(vec![size("S", StockStatus::InStock, Some(0))]);

        let msg = classify_change(Some(&record), &snapshot, &NotifyConfig::default()).unwrap();
        assert!(msg.contains("री-स्टॉक: S"));
        assert!(msg.contains("आउट ऑफ स्टॉक: S"));
    }

    #[test]
    fn change_lines_keep_page_order_with_new_sizes_first() {
        let record = stored(vec![
            size("S", StockStatus::OutOfStock, None),
            size("M", StockStatus::InStock, None),
        ]);
        let snapshot = make_snapshot(vec![
            size("S", StockStatus::InStock, None),
            size("M", StockStatus::OutOfStock, None),
            size("L", StockStatus::InStock, None),
        ]);

        let msg = classify_change(Some(&record), &snapshot, &NotifyConfig::default()).unwrap();
        assert!(msg.contains("परिवर्तन: नया साइज: L, री-स्टॉक: S, आउट ऑफ स्टॉक: M"));
    }

    #[test]
    fn disappeared_size_alone_is_silent() {
        let record = stored(vec![
            size("S", StockStatus::InStock, None),
            size("M", StockStatus::InStock, None),
        ]);
        let snapshot = make_snapshot(vec![size("S", StockStatus::InStock, None)]);

        assert_eq!(
            classify_change(Some(&record), &snapshot, &NotifyConfig::default()),
            None
        );
    }
}
