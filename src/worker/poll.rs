//! The polling cycle.
//!
//! Each cycle asks the [`MergeSource`] for recent merges on every tracked
//! branch and announces the ones the store has not seen. An id is marked seen
//! right after its notification is attempted, whether or not the post
//! succeeded, so a broken webhook cannot cause the same merge to be announced
//! on every cycle. A crash between the post and the mark can still produce one
//! duplicate after restart.
//!
//! # Cadence
//!
//! - **Poll interval**: `POLLING_INTERVAL` seconds between cycles
//! - **Pruning**: `prune_expired` once `PRUNE_INTERVAL_HOURS` have passed since
//!   the last prune (loading the store already prunes, so never on startup)

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::interfaces::{MergeSource, Notifier};
use crate::config::Config;
use crate::persistence::{DEFAULT_RETENTION_DAYS, SharedStore};

const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
const DEFAULT_LOOKBACK_HOURS: u32 = 24;
const DEFAULT_PRUNE_INTERVAL_SECS: u64 = 24 * 3600;

/// What the poll loop watches and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub branches: Vec<String>,
    pub lookback_hours: u32,
    pub poll_interval: Duration,
    pub retention_days: u32,
    pub prune_interval: Duration,
}

impl PollConfig {
    /// Watches `branches` with the default cadence.
    pub fn new(branches: Vec<String>) -> Self {
        PollConfig {
            branches,
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            retention_days: DEFAULT_RETENTION_DAYS,
            prune_interval: Duration::from_secs(DEFAULT_PRUNE_INTERVAL_SECS),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        PollConfig {
            branches: config.target_branches.clone(),
            lookback_hours: config.lookback_hours,
            poll_interval: config.polling_interval,
            retention_days: config.retention_days,
            prune_interval: config.prune_interval,
        }
    }
}

/// Counts from one polling cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    /// Branches whose fetch failed and were skipped this cycle.
    pub branches_failed: usize,
    /// Merges not seen before this cycle.
    pub new_prs: usize,
    pub notified: usize,
    pub notify_failures: usize,
}

/// Runs one polling cycle over `branches`.
///
/// Merges are announced oldest first within each branch. A failed fetch skips
/// only that branch.
pub async fn poll_once<S, N>(
    source: &S,
    notifier: &N,
    store: &SharedStore,
    branches: &[String],
    lookback_hours: u32,
) -> PollSummary
where
    S: MergeSource,
    N: Notifier,
{
    let mut summary = PollSummary::default();

    for branch in branches {
        let mut candidates = match source.fetch_candidate_merges(branch, lookback_hours).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(
                    branch = %branch,
                    error = %e,
                    "Failed to fetch merged PRs, skipping branch"
                );
                summary.branches_failed += 1;
                continue;
            }
        };
        candidates.sort_by_key(|pr| (pr.merged_at, pr.id));
        debug!(branch = %branch, candidates = candidates.len(), "Checking merged PRs");

        for pr in candidates {
            // The same PR can be listed twice in one page; the first mark wins.
            if store.has_seen(pr.id) {
                continue;
            }
            summary.new_prs += 1;
            info!(
                pr_id = %pr.id,
                number = %pr.number,
                branch = %branch,
                title = %pr.title,
                "New merged PR"
            );

            match notifier.notify_merged(&pr).await {
                Ok(()) => summary.notified += 1,
                Err(e) => {
                    warn!(pr_id = %pr.id, error = %e, "Notification failed, PR will not be retried");
                    summary.notify_failures += 1;
                }
            }
            store.mark_seen(pr.id);
        }
    }

    summary
}

/// Polls until `shutdown` resolves.
///
/// The first cycle starts immediately. `shutdown` is only observed between
/// cycles, so a notification is never abandoned between its post and its mark.
pub async fn run<S, N, F>(
    source: &S,
    notifier: &N,
    store: &SharedStore,
    config: &PollConfig,
    shutdown: F,
) where
    S: MergeSource,
    N: Notifier,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut last_prune = Instant::now();

    info!(
        branches = %config.branches.join(", "),
        interval_secs = config.poll_interval.as_secs(),
        "Starting poll loop"
    );

    loop {
        let summary = poll_once(
            source,
            notifier,
            store,
            &config.branches,
            config.lookback_hours,
        )
        .await;
        if summary.new_prs > 0 || summary.branches_failed > 0 {
            info!(
                new_prs = summary.new_prs,
                notified = summary.notified,
                notify_failures = summary.notify_failures,
                branches_failed = summary.branches_failed,
                "Poll cycle complete"
            );
        } else {
            debug!("Poll cycle complete, nothing new");
        }

        if last_prune.elapsed() >= config.prune_interval {
            store.prune_expired(config.retention_days);
            last_prune = Instant::now();
        }

        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping poll loop");
                break;
            }
            _ = tokio::time::sleep(config.poll_interval) => {}
        }
    }
}
