//! Pipeline entry points for monitor operations.
//!
//! - `run_monitor`: Poll listings forever on the configured interval
//! - `run_once`: Run exactly one poll cycle
//! - `ChangeClassifier`: Turn snapshot differences into messages

pub mod diff;
pub mod listing;
pub mod monitor;

pub use diff::{ChangeClassifier, classify_change};
pub use listing::{check_listing_transition, listing_message};
pub use monitor::{run_cycle, run_monitor, run_once};
