//! Branch landing.
//!
//! Finalizes a proposed sync pull request on a fork, one of two ways:
//!
//! - **Ref reset** (push events, where the parent's new head SHA is known):
//!   set the fork's `heads/<branch>` directly to the parent's commit,
//!   fast-forward only. This gives an exact, auditable correspondence
//!   between parent and fork history. A fork branch with its own commits
//!   fails loudly with `NonFastForward` instead of losing them.
//!
//! - **Merge by PR** (create events, where no single commit anchors the
//!   sync): merge the pull request with the policy's merge method and check
//!   the returned record's `merged` flag.

use crate::config::MergeStrategy;
use crate::github::{GitHubApi, SyncApiError, SyncErrorKind};
use crate::types::{PrNumber, RepoId, Sha};

/// How the proposed pull request is landed on a fork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandingMode {
    /// Merge the pull request with the given strategy.
    MergePr { strategy: MergeStrategy },
    /// Fast-forward the fork's branch reference to the parent's head.
    RefReset { sha: Sha },
}

/// Lands a proposed sync pull request on `target`.
pub async fn land<C: GitHubApi>(
    client: &C,
    target: &RepoId,
    branch: &str,
    pr: PrNumber,
    mode: &LandingMode,
) -> Result<(), SyncApiError> {
    match mode {
        LandingMode::MergePr { strategy } => {
            let receipt = client
                .merge_pull_request(target, pr, strategy.as_merge_method())
                .await?;

            if !receipt.merged {
                return Err(SyncApiError::new(
                    SyncErrorKind::MergeRejected,
                    receipt
                        .message
                        .unwrap_or_else(|| format!("merge record for {} has merged=false", pr)),
                ));
            }

            tracing::debug!(target_repo = %target, pr = %pr, "Merged sync pull request");
            Ok(())
        }
        LandingMode::RefReset { sha } => {
            client.update_branch_ref(target, branch, sha).await?;

            tracing::debug!(
                target_repo = %target,
                branch = branch,
                sha = %sha.short(),
                "Reset fork branch to parent head"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockApi, RecordedCall};

    fn fork() -> RepoId {
        RepoId::new("u1", "base")
    }

    #[tokio::test]
    async fn merge_pr_uses_policy_method() {
        let api = MockApi::new();

        land(
            &api,
            &fork(),
            "main",
            PrNumber(7),
            &LandingMode::MergePr {
                strategy: MergeStrategy::Rebase,
            },
        )
        .await
        .unwrap();

        assert_eq!(
            api.calls(),
            vec![RecordedCall::MergePullRequest {
                target: fork(),
                pr: PrNumber(7),
                merge_method: "rebase".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn unmerged_receipt_is_merge_rejected() {
        let api = MockApi::new().with_unmerged_receipt(&fork(), "Pull Request is not mergeable");

        let err = land(
            &api,
            &fork(),
            "main",
            PrNumber(7),
            &LandingMode::MergePr {
                strategy: MergeStrategy::Merge,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, SyncErrorKind::MergeRejected);
    }

    #[tokio::test]
    async fn ref_reset_updates_the_branch_ref() {
        let api = MockApi::new();
        let sha = Sha::new("abc123def4567890abc123def4567890abc123de");

        land(
            &api,
            &fork(),
            "main",
            PrNumber(7),
            &LandingMode::RefReset { sha: sha.clone() },
        )
        .await
        .unwrap();

        assert_eq!(
            api.calls(),
            vec![RecordedCall::UpdateBranchRef {
                target: fork(),
                branch: "main".to_string(),
                sha,
            }]
        );
    }

    #[tokio::test]
    async fn divergent_fork_fails_with_non_fast_forward() {
        let api = MockApi::new().with_ref_update_error(&fork(), SyncErrorKind::NonFastForward);
        let sha = Sha::new("abc123def4567890abc123def4567890abc123de");

        let err = land(
            &api,
            &fork(),
            "main",
            PrNumber(7),
            &LandingMode::RefReset { sha },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, SyncErrorKind::NonFastForward);
        assert!(!err.kind.is_skip());
    }
}
