//! Per-fork and per-event sync outcomes.
//!
//! Outcomes exist for observability only: they are aggregated, logged, and
//! dropped. Nothing is persisted; if a delivery is retried by GitHub the
//! whole event re-runs from scratch.

use std::fmt;

use crate::github::{SyncApiError, SyncErrorKind};
use crate::types::RepoId;

/// Why a fork was skipped rather than synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The app has no installation for the fork's owner.
    NotInstalled,
    /// The fork has no branch with the parent's branch name.
    BaseBranchMissing,
    /// The fork's branch already contains the parent's commits.
    AlreadyInSync,
}

impl SkipReason {
    /// Maps a skip-class error kind to its reason.
    ///
    /// Returns `None` for kinds that are failures, not skips.
    pub fn from_kind(kind: SyncErrorKind) -> Option<Self> {
        match kind {
            SyncErrorKind::NotInstalled => Some(SkipReason::NotInstalled),
            SyncErrorKind::BaseBranchMissing => Some(SkipReason::BaseBranchMissing),
            SyncErrorKind::AlreadyInSync => Some(SkipReason::AlreadyInSync),
            _ => None,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::NotInstalled => "app not installed",
            SkipReason::BaseBranchMissing => "base branch missing",
            SkipReason::AlreadyInSync => "already in sync",
        };
        f.write_str(s)
    }
}

/// The result of syncing one fork.
#[derive(Debug)]
pub enum SyncResult {
    /// The change was durably applied to the fork's branch.
    Landed,
    /// An expected condition made syncing this fork a no-op.
    Skipped(SkipReason),
    /// This fork's sync failed; sibling forks are unaffected.
    Failed(SyncApiError),
}

impl SyncResult {
    pub fn is_landed(&self) -> bool {
        matches!(self, SyncResult::Landed)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SyncResult::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SyncResult::Failed(_))
    }
}

/// The outcome of one fork within one branch-change event.
#[derive(Debug)]
pub struct SyncOutcome {
    /// The fork this outcome is for.
    pub fork: RepoId,
    /// What happened.
    pub result: SyncResult,
}

/// The aggregate outcome of one branch-change event.
#[derive(Debug)]
pub enum EventOutcome {
    /// The branch is blacklisted; no fork operations were attempted.
    SkippedByPolicy {
        /// The blacklisted branch.
        branch: String,
    },

    /// Fork enumeration failed; no per-fork work was possible.
    EnumerationFailed(SyncApiError),

    /// Every fork was processed to an individual outcome.
    Completed {
        /// One outcome per fork, in completion order.
        outcomes: Vec<SyncOutcome>,
    },
}

impl EventOutcome {
    /// Number of forks that landed the change.
    pub fn landed(&self) -> usize {
        self.count(SyncResult::is_landed)
    }

    /// Number of forks that were skipped.
    pub fn skipped(&self) -> usize {
        self.count(SyncResult::is_skipped)
    }

    /// Number of forks that failed.
    pub fn failed(&self) -> usize {
        self.count(SyncResult::is_failed)
    }

    fn count(&self, pred: fn(&SyncResult) -> bool) -> usize {
        match self {
            EventOutcome::Completed { outcomes } => {
                outcomes.iter().filter(|o| pred(&o.result)).count()
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_reason_from_kind() {
        assert_eq!(
            SkipReason::from_kind(SyncErrorKind::NotInstalled),
            Some(SkipReason::NotInstalled)
        );
        assert_eq!(
            SkipReason::from_kind(SyncErrorKind::BaseBranchMissing),
            Some(SkipReason::BaseBranchMissing)
        );
        assert_eq!(
            SkipReason::from_kind(SyncErrorKind::AlreadyInSync),
            Some(SkipReason::AlreadyInSync)
        );
        assert_eq!(SkipReason::from_kind(SyncErrorKind::NonFastForward), None);
        assert_eq!(
            SkipReason::from_kind(SyncErrorKind::UpstreamUnavailable),
            None
        );
    }

    #[test]
    fn event_outcome_counts() {
        let outcome = EventOutcome::Completed {
            outcomes: vec![
                SyncOutcome {
                    fork: RepoId::new("u1", "base"),
                    result: SyncResult::Landed,
                },
                SyncOutcome {
                    fork: RepoId::new("u2", "base"),
                    result: SyncResult::Skipped(SkipReason::BaseBranchMissing),
                },
            ],
        };

        assert_eq!(outcome.landed(), 1);
        assert_eq!(outcome.skipped(), 1);
        assert_eq!(outcome.failed(), 0);
    }

    #[test]
    fn policy_skip_has_zero_counts() {
        let outcome = EventOutcome::SkippedByPolicy {
            branch: "release".to_string(),
        };
        assert_eq!(outcome.landed(), 0);
        assert_eq!(outcome.skipped(), 0);
        assert_eq!(outcome.failed(), 0);
    }
}
