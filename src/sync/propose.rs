//! Pull request proposal.
//!
//! Opens the sync pull request on a fork: head is the parent's branch
//! (`parent_owner:branch`), base is the same-named branch on the fork.
//! Maintainer edits are disallowed so the fork's maintainers cannot alter an
//! in-flight sync PR.

use crate::github::{GitHubApi, SyncApiError, SyncProposal};
use crate::types::{PrNumber, RepoId};

/// Builds the proposal for syncing `branch` from `parent` onto a fork.
pub fn build_proposal(parent: &RepoId, branch: &str) -> SyncProposal {
    SyncProposal {
        title: format!("[Auto Fork Sync] Updating branch {}", branch),
        body: "Auto Fork Sync engaged".to_string(),
        head: format!("{}:{}", parent.owner, branch),
        base: branch.to_string(),
    }
}

/// Proposes the sync as a pull request on `target`.
///
/// Rejection classification happens in the client layer; the interesting
/// kinds here are `BaseBranchMissing` (the fork lacks this branch) and
/// `AlreadyInSync` (nothing to propose), both of which the engine turns into
/// per-fork skips.
pub async fn propose_sync<C: GitHubApi>(
    client: &C,
    parent: &RepoId,
    branch: &str,
    target: &RepoId,
) -> Result<PrNumber, SyncApiError> {
    let proposal = build_proposal(parent, branch);

    tracing::debug!(
        target_repo = %target,
        head = %proposal.head,
        base = %proposal.base,
        "Proposing sync pull request"
    );

    client.create_pull_request(target, &proposal).await
}
