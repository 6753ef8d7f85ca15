//! The poll loop and the collaborators it drives.
//!
//! # Module Structure
//!
//! - [`interfaces`]: the `MergeSource` and `Notifier` seams
//! - [`poll`]: one polling cycle and the long-running loop

mod interfaces;
mod poll;

pub use interfaces::{MergeSource, Notifier};
pub use poll::{PollConfig, PollSummary, poll_once, run};
