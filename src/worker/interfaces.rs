//! Collaborators the poll loop drives.
//!
//! The loop only needs "give me recent merges for a branch" and "announce this
//! merge". Keeping both behind traits lets tests run the loop against in-memory
//! fakes, and keeps the loop free of HTTP details.
//!
//! # Example (fake for testing)
//!
//! ```ignore
//! struct FixedSource(Vec<MergedPr>);
//!
//! impl MergeSource for FixedSource {
//!     type Error = std::convert::Infallible;
//!
//!     async fn fetch_candidate_merges(
//!         &self,
//!         branch: &str,
//!         _lookback_hours: u32,
//!     ) -> Result<Vec<MergedPr>, Self::Error> {
//!         Ok(self.0.iter().filter(|pr| pr.base_branch == branch).cloned().collect())
//!     }
//! }
//! ```

use std::fmt::Display;
use std::future::Future;

use crate::types::MergedPr;

/// Produces pull requests recently merged into a branch.
pub trait MergeSource {
    type Error: Display;

    /// Returns pull requests merged into `branch` within the last
    /// `lookback_hours`. The list may include ones that were already seen.
    fn fetch_candidate_merges(
        &self,
        branch: &str,
        lookback_hours: u32,
    ) -> impl Future<Output = Result<Vec<MergedPr>, Self::Error>> + Send;
}

/// Announces a merged pull request.
pub trait Notifier {
    type Error: Display;

    fn notify_merged(&self, pr: &MergedPr) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
