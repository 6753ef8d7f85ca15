//! Persistence layer for the merge notifier.
//!
//! The only durable state is the set of pull requests that have already been
//! announced, kept in a single JSON file.
//!
//! # File Layout
//!
//! ```text
//! <seen_prs.json>       # current seen set
//! <seen_prs.json>.tmp   # present only while a save is in flight
//! ```
//!
//! # Crash Safety
//!
//! - The file is replaced atomically using write-to-temp-then-rename
//! - Both the temp file and the parent directory are fsynced
//! - A stray temp file is ignored on load and overwritten by the next save

pub mod error;
pub mod fsync;
pub mod seen_file;
pub mod store;

pub use error::StoreError;
pub use fsync::{fsync_dir, fsync_file};
pub use seen_file::{FORMAT_VERSION, SeenFileError, SeenRecord, read_seen_file, save_atomic};
pub use store::{DEFAULT_RETENTION_DAYS, DEFAULT_STORE_FILE, SeenEventStore, SharedStore};
