//! Failures of the seen-PR store.
//!
//! None of these escape the store's public operations. They are built so the
//! store can log them with the path and cause, then fall back to a safe state.

use std::path::PathBuf;

use thiserror::Error;

use super::seen_file::SeenFileError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file exists but could not be read or parsed. The store
    /// starts empty.
    #[error("failed to load seen PRs from {}: {source}", .path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: SeenFileError,
    },

    /// Writing or publishing the backing file failed. The in-memory state is
    /// kept but is not durable.
    #[error("failed to persist seen PRs to {}: {source}", .path.display())]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: SeenFileError,
    },

    /// One record in an otherwise valid file was skipped.
    #[error("skipping malformed record {index} in {}: {reason}", .path.display())]
    ParseEntryFailure {
        path: PathBuf,
        index: usize,
        reason: String,
    },
}
