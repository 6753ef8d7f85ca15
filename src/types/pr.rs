//! Merge candidates produced by the GitHub source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{PrId, PrNumber};

/// A pull request that was merged into a tracked branch.
///
/// Only `id` matters for deduplication; the rest is carried through to the
/// notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedPr {
    pub id: PrId,
    pub number: PrNumber,
    pub title: String,
    /// Login of the pull request author, if GitHub reported one.
    pub author: Option<String>,
    pub html_url: Option<String>,
    pub base_branch: String,
    pub head_branch: String,
    pub merged_at: DateTime<Utc>,
}

impl MergedPr {
    /// One-line human summary used in logs and notifications.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "PR {} merged into `{}`: {}",
            self.number, self.base_branch, self.title
        );
        if let Some(author) = &self.author {
            line.push_str(&format!(" (by {})", author));
        }
        if let Some(url) = &self.html_url {
            line.push_str(&format!(" <{}>", url));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MergedPr {
        MergedPr {
            id: PrId(9001),
            number: PrNumber(42),
            title: "Add retry".to_string(),
            author: Some("octocat".to_string()),
            html_url: Some("https://github.com/o/r/pull/42".to_string()),
            base_branch: "staging".to_string(),
            head_branch: "feature/retry".to_string(),
            merged_at: Utc::now(),
        }
    }

    #[test]
    fn summary_includes_author_and_link() {
        assert_eq!(
            sample().summary(),
            "PR #42 merged into `staging`: Add retry (by octocat) <https://github.com/o/r/pull/42>"
        );
    }

    #[test]
    fn summary_omits_missing_fields() {
        let pr = MergedPr {
            author: None,
            html_url: None,
            ..sample()
        };
        assert_eq!(pr.summary(), "PR #42 merged into `staging`: Add retry");
    }
}
