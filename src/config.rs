//! Service configuration read from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `GITHUB_TOKEN` | required |
//! | `GITHUB_REPO` | required, `owner/repo` |
//! | `TARGET_BRANCHES` (or `TARGET_BRANCH`) | `staging` |
//! | `DISCORD_WEBHOOK_URL` | required |
//! | `POLLING_INTERVAL` | `300` seconds, at least 60 |
//! | `MAX_PRS_PER_REQUEST` | `100` |
//! | `LOOKBACK_HOURS` | `24` |
//! | `SEEN_PRS_FILE` | `seen_prs.json` |
//! | `RETENTION_DAYS` | `30` |
//! | `PRUNE_INTERVAL_HOURS` | `24` |
//! | `PORT` | `8080` |
//! | `LOG_LEVEL` | `INFO`, used only when `RUST_LOG` is unset |

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::github::MAX_PER_PAGE;
use crate::persistence::{DEFAULT_RETENTION_DAYS, DEFAULT_STORE_FILE};
use crate::types::RepoId;

const DEFAULT_BRANCH: &str = "staging";
const DEFAULT_POLLING_INTERVAL_SECS: u64 = 300;
/// Anything faster risks GitHub's API rate limits.
const MIN_POLLING_INTERVAL_SECS: u64 = 60;
const DEFAULT_LOOKBACK_HOURS: u32 = 24;
const MAX_LOOKBACK_HOURS: u32 = 24 * 365;
const MAX_RETENTION_DAYS: u32 = 365 * 100;
const DEFAULT_PRUNE_INTERVAL_HOURS: u64 = 24;
const MAX_PRUNE_INTERVAL_HOURS: u64 = 24 * 365;
const DEFAULT_PORT: u16 = 8080;

/// Configuration validation failed. Every problem found is listed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ConfigError(pub Vec<String>);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration validation failed:")?;
        for error in &self.0 {
            write!(f, "\n- {}", error)?;
        }
        Ok(())
    }
}

/// Validated service configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub github_token: String,
    pub repo: RepoId,
    pub target_branches: Vec<String>,
    pub discord_webhook_url: String,
    pub polling_interval: Duration,
    pub max_prs_per_request: u8,
    pub lookback_hours: u32,
    pub seen_prs_file: PathBuf,
    pub retention_days: u32,
    pub prune_interval: Duration,
    pub port: u16,
}

impl Config {
    /// Reads and validates configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Reads and validates configuration from a variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let github_token = get("GITHUB_TOKEN").unwrap_or_default();
        if github_token.is_empty() {
            errors.push("GITHUB_TOKEN environment variable is required".to_string());
        }

        let repo = match get("GITHUB_REPO") {
            None => {
                errors.push(
                    "GITHUB_REPO environment variable is required (format: owner/repo)"
                        .to_string(),
                );
                None
            }
            Some(slug) => match RepoId::parse(&slug) {
                Ok(repo) => Some(repo),
                Err(e) => {
                    errors.push(e.to_string());
                    None
                }
            },
        };

        let raw_branches = get("TARGET_BRANCHES")
            .or_else(|| get("TARGET_BRANCH"))
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let target_branches = parse_branches(&raw_branches);
        if target_branches.is_empty() {
            errors.push("TARGET_BRANCHES must name at least one branch".to_string());
        }

        let discord_webhook_url = get("DISCORD_WEBHOOK_URL").unwrap_or_default();
        if discord_webhook_url.is_empty() {
            errors.push("DISCORD_WEBHOOK_URL environment variable is required".to_string());
        }

        let polling_secs = parse_or(
            &get,
            "POLLING_INTERVAL",
            DEFAULT_POLLING_INTERVAL_SECS,
            &mut errors,
        );
        if polling_secs < MIN_POLLING_INTERVAL_SECS {
            errors.push(format!(
                "POLLING_INTERVAL must be at least {} seconds to respect GitHub API rate limits",
                MIN_POLLING_INTERVAL_SECS
            ));
        }

        let max_prs: u32 =
            parse_or(&get, "MAX_PRS_PER_REQUEST", MAX_PER_PAGE.into(), &mut errors);
        check_range("MAX_PRS_PER_REQUEST", max_prs, 1, MAX_PER_PAGE.into(), &mut errors);
        let max_prs_per_request = u8::try_from(max_prs).unwrap_or(MAX_PER_PAGE);

        let lookback_hours =
            parse_or(&get, "LOOKBACK_HOURS", DEFAULT_LOOKBACK_HOURS, &mut errors);
        check_range("LOOKBACK_HOURS", lookback_hours, 1, MAX_LOOKBACK_HOURS, &mut errors);

        let retention_days =
            parse_or(&get, "RETENTION_DAYS", DEFAULT_RETENTION_DAYS, &mut errors);
        check_range("RETENTION_DAYS", retention_days, 1, MAX_RETENTION_DAYS, &mut errors);

        let prune_hours = parse_or(
            &get,
            "PRUNE_INTERVAL_HOURS",
            DEFAULT_PRUNE_INTERVAL_HOURS,
            &mut errors,
        );
        check_range(
            "PRUNE_INTERVAL_HOURS",
            prune_hours,
            1,
            MAX_PRUNE_INTERVAL_HOURS,
            &mut errors,
        );
        let prune_interval = prune_hours
            .checked_mul(3600)
            .map(Duration::from_secs)
            .unwrap_or(Duration::MAX);

        let port = parse_or(&get, "PORT", DEFAULT_PORT, &mut errors);
        let seen_prs_file = get("SEEN_PRS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));

        match repo {
            Some(repo) if errors.is_empty() => Ok(Config {
                github_token,
                repo,
                target_branches,
                discord_webhook_url,
                polling_interval: Duration::from_secs(polling_secs),
                max_prs_per_request,
                lookback_hours,
                seen_prs_file,
                retention_days,
                prune_interval,
                port,
            }),
            _ => Err(ConfigError(errors)),
        }
    }
}

/// Splits a comma-separated branch list, dropping blanks and repeats.
fn parse_branches(raw: &str) -> Vec<String> {
    let mut branches: Vec<String> = Vec::new();
    for branch in raw.split(',').map(str::trim).filter(|b| !b.is_empty()) {
        if !branches.iter().any(|b| b == branch) {
            branches.push(branch.to_string());
        }
    }
    branches
}

fn parse_or<T, G>(get: &G, name: &str, default: T, errors: &mut Vec<String>) -> T
where
    T: FromStr + Copy,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            errors.push(format!("{} must be a number, got '{}'", name, raw));
            default
        }),
    }
}

fn check_range<T>(name: &str, value: T, min: T, max: T, errors: &mut Vec<String>)
where
    T: PartialOrd + fmt::Display,
{
    if value < min || value > max {
        errors.push(format!("{} must be between {} and {}, got {}", name, min, max, value));
    }
}

/// Tracing filter for when `RUST_LOG` is unset, built from `LOG_LEVEL`
/// (`DEBUG`, `INFO`, `WARNING`, `ERROR` or `CRITICAL`, case-insensitive).
/// Unknown or missing levels fall back to `info`.
pub fn default_log_filter(log_level: Option<&str>) -> String {
    let level = match log_level.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("warn" | "warning") => "warn",
        Some("error" | "critical") => "error",
        _ => "info",
    };
    format!("merge_notifier={}", level)
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config:")?;
        writeln!(f, "  GitHub Repo: {}", self.repo)?;
        writeln!(f, "  Target Branches: {}", self.target_branches.join(", "))?;
        writeln!(f, "  Polling Interval: {}s", self.polling_interval.as_secs())?;
        writeln!(f, "  Max PRs per request: {}", self.max_prs_per_request)?;
        writeln!(f, "  Lookback: {}h", self.lookback_hours)?;
        writeln!(f, "  Seen PRs file: {}", self.seen_prs_file.display())?;
        write!(f, "  Retention: {} days", self.retention_days)
    }
}

impl fmt::Debug for Config {
    // Token and webhook URL are secrets.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("repo", &format_args!("{}", self.repo))
            .field("target_branches", &self.target_branches)
            .field("polling_interval", &self.polling_interval)
            .field("max_prs_per_request", &self.max_prs_per_request)
            .field("lookback_hours", &self.lookback_hours)
            .field("seen_prs_file", &self.seen_prs_file)
            .field("retention_days", &self.retention_days)
            .field("prune_interval", &self.prune_interval)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}
