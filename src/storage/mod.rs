//! Storage abstractions for monitor state persistence.
//!
//! The monitor keeps its entire memory in one `state.json` document:
//! last-known product snapshots keyed by product id plus per-listing
//! product counts. Losing it is survivable (the next cycle re-announces
//! everything as new), so loading prefers a fresh state over failing.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CycleStats, MonitorState};

// Re-export for convenience
pub use local::LocalStateStore;

/// Trait for monitor state backends.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Load the persisted state, or a fresh one when none exists.
    async fn load(&self) -> Result<MonitorState>;

    /// Persist the full state.
    async fn save(&self, state: &MonitorState) -> Result<()>;

    /// Persist counters for the most recent poll cycle.
    async fn save_stats(&self, stats: &CycleStats) -> Result<()>;
}
