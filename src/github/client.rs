//! Octocrab client scoped to the monitored repository.
//!
//! GitHub's pull request list has no "merged since" filter, so the client asks
//! for closed pull requests against the branch, most recently updated first,
//! and keeps the ones merged inside the lookback window. Only one page is
//! fetched per call.

use chrono::{DateTime, Duration, Utc};
use octocrab::Octocrab;
use octocrab::models::pulls::PullRequest;
use tracing::debug;

use super::error::GitHubApiError;
use super::retry::{RetryConfig, retry_with_backoff};
use crate::types::{MergedPr, PrId, PrNumber, RepoId};
use crate::worker::MergeSource;

/// GitHub's maximum page size.
pub const MAX_PER_PAGE: u8 = 100;

/// A GitHub API client scoped to a specific repository.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
    repo: RepoId,
    per_page: u8,
    retry: RetryConfig,
}

impl OctocrabClient {
    /// Creates a new client scoped to the given repository.
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self {
            client,
            repo,
            per_page: MAX_PER_PAGE,
            retry: RetryConfig::DEFAULT,
        }
    }

    /// Creates a client authenticated with a personal access token.
    pub fn from_token(token: impl Into<String>, repo: RepoId) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client, repo))
    }

    /// Sets how many pull requests are requested per fetch (clamped to 1..=100).
    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the repository this client is scoped to.
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    async fn list_recently_merged(
        &self,
        branch: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<MergedPr>, GitHubApiError> {
        let page = self
            .client
            .pulls(&self.repo.owner, &self.repo.repo)
            .list()
            .state(octocrab::params::State::Closed)
            .base(branch)
            .sort(octocrab::params::pulls::Sort::Updated)
            .direction(octocrab::params::Direction::Descending)
            .per_page(self.per_page)
            .send()
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let merged: Vec<_> = page
            .items
            .into_iter()
            .filter_map(|pull| merged_pr_from_pull(pull, branch, since))
            .collect();

        debug!(
            repo = %self.repo,
            branch,
            found = merged.len(),
            "Fetched recently merged PRs"
        );
        Ok(merged)
    }
}

impl MergeSource for OctocrabClient {
    type Error = GitHubApiError;

    async fn fetch_candidate_merges(
        &self,
        branch: &str,
        lookback_hours: u32,
    ) -> Result<Vec<MergedPr>, GitHubApiError> {
        let since = lookback_start(Utc::now(), lookback_hours);
        retry_with_backoff(self.retry, move || self.list_recently_merged(branch, since)).await
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .field("per_page", &self.per_page)
            .finish_non_exhaustive()
    }
}

/// Start of the merge window ending at `now`. A window longer than the
/// calendar allows starts at the earliest representable time.
fn lookback_start(now: DateTime<Utc>, lookback_hours: u32) -> DateTime<Utc> {
    Duration::try_hours(lookback_hours.into())
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Whether a closed pull request counts as a merge into `branch` since `since`.
pub fn is_recent_merge(
    merged_at: Option<DateTime<Utc>>,
    base_ref: &str,
    branch: &str,
    since: DateTime<Utc>,
) -> bool {
    base_ref == branch && merged_at.is_some_and(|t| t >= since)
}

fn merged_pr_from_pull(pull: PullRequest, branch: &str, since: DateTime<Utc>) -> Option<MergedPr> {
    if !is_recent_merge(pull.merged_at, &pull.base.ref_field, branch, since) {
        return None;
    }
    let merged_at = pull.merged_at?;

    Some(MergedPr {
        id: PrId(pull.id.into_inner()),
        number: PrNumber(pull.number),
        title: pull.title.unwrap_or_default(),
        author: pull.user.map(|user| user.login),
        html_url: pull.html_url.map(|url| url.to_string()),
        base_branch: pull.base.ref_field,
        head_branch: pull.head.ref_field,
        merged_at,
    })
}
