//! GitHub API access for the poll loop.
//!
//! Provides [`OctocrabClient`], the production [`MergeSource`](crate::worker::MergeSource):
//! - One page of recently closed pull requests per tracked branch
//! - Exponential backoff retry for transient failures
//! - Distinguishes transient vs permanent errors

mod client;
mod error;
mod retry;

pub use client::{MAX_PER_PAGE, OctocrabClient, is_recent_merge};
pub use error::{GitHubApiError, GitHubErrorKind};
pub use retry::{RetryConfig, retry_with_backoff};
