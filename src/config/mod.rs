//! Per-repository sync policy.
//!
//! The policy lives in the parent repository as `.github/fork-sync.yml`:
//!
//! ```yaml
//! branch_blacklist:
//!   - release
//!   - gh-pages
//! merge_strategy: rebase
//! ```
//!
//! Both keys are optional. A missing file, a missing key, or a failed fetch
//! all degrade to the defaults (empty blacklist, rebase); the policy loader
//! is a thin collaborator and must never take down event handling.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::github::GitHubApi;
use crate::types::RepoId;

/// Path of the policy document inside the parent repository.
pub const POLICY_PATH: &str = ".github/fork-sync.yml";

/// Merge strategy used when landing a sync pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Rebase the PR commits onto the fork's branch.
    #[default]
    Rebase,
    /// Create a merge commit.
    Merge,
}

impl MergeStrategy {
    /// Returns the GitHub API `merge_method` string for this strategy.
    pub fn as_merge_method(&self) -> &'static str {
        match self {
            MergeStrategy::Rebase => "rebase",
            MergeStrategy::Merge => "merge",
        }
    }
}

/// Sync policy for one parent repository.
///
/// Loaded once per branch-change event and read-only for its duration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPolicy {
    /// Branches that must never be fanned out to forks.
    #[serde(default)]
    pub branch_blacklist: Vec<String>,

    /// How sync pull requests are landed on forks.
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
}

impl SyncPolicy {
    /// Returns true if the given branch is excluded from syncing.
    pub fn is_blacklisted(&self, branch: &str) -> bool {
        self.branch_blacklist.iter().any(|b| b == branch)
    }
}

/// Errors that can occur when parsing a policy document.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The document is not valid YAML or has fields of the wrong shape.
    #[error("invalid policy document: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Parses a policy document from YAML text.
///
/// An empty or whitespace-only document yields the default policy.
pub fn parse_policy(text: &str) -> Result<SyncPolicy, PolicyError> {
    if text.trim().is_empty() {
        return Ok(SyncPolicy::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

/// Loads the sync policy for a parent repository.
///
/// Fetches `.github/fork-sync.yml` via the contents API. A missing file, a
/// fetch failure, or a malformed document all fall back to the defaults with
/// a warning; the event proceeds either way.
pub async fn load_policy<C: GitHubApi>(client: &C, parent: &RepoId) -> SyncPolicy {
    let text = match client.fetch_policy_document(parent).await {
        Ok(Some(text)) => text,
        Ok(None) => return SyncPolicy::default(),
        Err(e) => {
            warn!(repo = %parent, error = %e, "Failed to fetch sync policy, using defaults");
            return SyncPolicy::default();
        }
    };

    match parse_policy(&text) {
        Ok(policy) => policy,
        Err(e) => {
            warn!(repo = %parent, error = %e, "Malformed sync policy, using defaults");
            SyncPolicy::default()
        }
    }
}
