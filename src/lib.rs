//! Merge Notifier - polls GitHub for pull requests merged into tracked
//! branches and announces each one to a Discord webhook exactly once.
//!
//! The seen-PR store in [`persistence`] is the core: it remembers which
//! merges were announced across restarts, forgets them after a retention
//! window, and never leaves a half-written file behind.

pub mod config;
pub mod github;
pub mod notify;
pub mod persistence;
pub mod server;
pub mod types;
pub mod worker;
