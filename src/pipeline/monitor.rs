// src/pipeline/monitor.rs

//! Poll loop orchestration.
//!
//! Each cycle walks every configured listing, snapshots the products it
//! links to, classifies changes against the stored state and persists the
//! updated state at the end. A failing listing or product is logged and
//! skipped, and a failing notification never blocks the state update, so
//! one bad page cannot stall the monitor.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, CycleStats, MonitorState};
use crate::pipeline::diff::ChangeClassifier;
use crate::pipeline::listing::{check_listing_transition, listing_message};
use crate::services::{Notifier, ProductScraper};
use crate::storage::StateStorage;

/// Run one poll cycle over all configured listings.
///
/// Mutates `state` in place and saves it (plus the cycle counters) through
/// `storage` before returning.
pub async fn run_cycle(
    config: &Config,
    scraper: &dyn ProductScraper,
    notifier: &dyn Notifier,
    storage: &dyn StateStorage,
    state: &mut MonitorState,
) -> Result<CycleStats> {
    let mut stats = CycleStats::begin();
    let classifier = ChangeClassifier::new(config.notify_on.clone());
    let delay = Duration::from_millis(config.scraper.request_delay_ms);
    let concurrency = config.scraper.max_concurrent.max(1);

    for listing_url in &config.urls {
        stats.listings_scanned += 1;

        let items = match scraper.scrape_listing(listing_url).await {
            Ok(items) => items,
            Err(e) => {
                stats.listing_failures += 1;
                log::warn!("Listing {listing_url} failed: {e}");
                continue;
            }
        };
        log::info!("Found {} products on {listing_url}", items.len());

        if config.notify_on.listing_from_zero
            && check_listing_transition(
                state,
                listing_url,
                items.len() as u64,
                config.listing_threshold_min,
            )
        {
            let message = listing_message(listing_url, items.len() as u64);
            deliver(notifier, &message, &mut stats).await;
        }

        // Detail pages fetch concurrently; classification and the state
        // update stay serialized on this task.
        let mut detail_stream = stream::iter(items)
            .map(|item| async move {
                let result = scraper.scrape_product(&item.url).await;
                (item, result)
            })
            .buffered(concurrency);

        while let Some((item, result)) = detail_stream.next().await {
            stats.products_checked += 1;

            let mut snapshot = match result {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    stats.product_failures += 1;
                    log::warn!("Product {} failed: {e}", item.url);
                    continue;
                }
            };
            if snapshot.title.is_empty() {
                snapshot.title = item.title.clone();
            }

            if let Some(message) = classifier.classify(state.product(snapshot.key()), &snapshot)
            {
                log::info!("{}: change detected", snapshot.key());
                deliver(notifier, &message, &mut stats).await;
            }
            state.upsert(&snapshot);

            if delay.as_millis() > 0 {
                tokio::time::sleep(delay).await;
            }
        }
    }

    state.touch();
    storage.save(state).await?;

    stats.finish();
    storage.save_stats(&stats).await?;
    Ok(stats)
}

/// Run a single cycle against freshly loaded state.
pub async fn run_once(
    config: &Config,
    scraper: &dyn ProductScraper,
    notifier: &dyn Notifier,
    storage: &dyn StateStorage,
) -> Result<CycleStats> {
    let mut state = storage.load().await?;
    run_cycle(config, scraper, notifier, storage, &mut state).await
}

/// Poll forever, sleeping the configured interval between cycles.
///
/// State is loaded once and kept resident; a failed cycle is logged and
/// retried at the next tick.
pub async fn run_monitor(
    config: &Config,
    scraper: &dyn ProductScraper,
    notifier: &dyn Notifier,
    storage: &dyn StateStorage,
) -> Result<()> {
    let mut state = storage.load().await?;
    log::info!(
        "Monitoring {} listings, polling every {}s",
        config.urls.len(),
        config.poll_interval().as_secs()
    );

    loop {
        match run_cycle(config, scraper, notifier, storage, &mut state).await {
            Ok(stats) => log::info!(
                "Cycle complete: {} products checked, {} messages sent, {} failures",
                stats.products_checked,
                stats.messages_sent,
                stats.listing_failures + stats.product_failures + stats.notify_failures
            ),
            Err(e) => log::error!("Cycle failed: {e}"),
        }
        tokio::time::sleep(config.poll_interval()).await;
    }
}

async fn deliver(notifier: &dyn Notifier, message: &str, stats: &mut CycleStats) {
    match notifier.send(message).await {
        Ok(()) => stats.messages_sent += 1,
        Err(e) => {
            stats.notify_failures += 1;
            log::warn!("Notification failed: {e}");
        }
    }
}
