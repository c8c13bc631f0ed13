//! The outbound GitHub API seam.
//!
//! [`GitHubApi`] describes every platform operation the sync engine performs,
//! so the engine, authorizer, proposer, and lander are all generic over the
//! client. The production implementation is [`super::OctocrabApi`]; tests use
//! a recording mock. This is also where the O(installations) cost of the
//! authorizer's linear scan is isolated: a cache or indexed lookup can be
//! substituted behind this trait without touching the engine.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::types::{InstallationId, PrNumber, RepoId, Sha};

use super::error::SyncApiError;

/// An installation visible to the app-level client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    /// The installation's ID, exchangeable for a scoped client.
    pub id: InstallationId,
    /// The login of the account the installation is scoped to.
    pub account_login: String,
}

/// A pull request proposal for one fork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProposal {
    /// PR title.
    pub title: String,
    /// PR body.
    pub body: String,
    /// Head in `owner:branch` form (the parent's branch).
    pub head: String,
    /// Base branch name on the fork.
    pub base: String,
}

/// The result of a pull request merge call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReceipt {
    /// Whether GitHub reports the PR as merged.
    pub merged: bool,
    /// GitHub's accompanying message, if any.
    pub message: Option<String>,
}

/// GitHub operations used by the fork sync engine.
///
/// `installation_client` returns `Self`: exchanging an installation ID yields
/// another client of the same shape, scoped to that installation's
/// repositories. Scoped clients are acquired fresh per fork and discarded
/// after use; nothing here caches credentials.
pub trait GitHubApi: Sized + Send + Sync {
    /// Lists all forks of the given repository.
    ///
    /// Ordering is whatever GitHub returns. Only the first page is fetched;
    /// pagination is a known gap.
    fn list_forks(
        &self,
        parent: &RepoId,
    ) -> impl Future<Output = Result<Vec<RepoId>, SyncApiError>> + Send;

    /// Lists the installations visible to the app-level client.
    ///
    /// Unpaginated and uncached; callers scan it linearly per fork.
    fn list_installations(
        &self,
    ) -> impl Future<Output = Result<Vec<Installation>, SyncApiError>> + Send;

    /// Exchanges an installation ID for a client scoped to that installation.
    fn installation_client(
        &self,
        installation: InstallationId,
    ) -> impl Future<Output = Result<Self, SyncApiError>> + Send;

    /// Opens a pull request on `target`.
    fn create_pull_request(
        &self,
        target: &RepoId,
        proposal: &SyncProposal,
    ) -> impl Future<Output = Result<PrNumber, SyncApiError>> + Send;

    /// Merges a pull request on `target` with the given `merge_method`
    /// (`"rebase"` or `"merge"`).
    fn merge_pull_request(
        &self,
        target: &RepoId,
        pr: PrNumber,
        merge_method: &str,
    ) -> impl Future<Output = Result<MergeReceipt, SyncApiError>> + Send;

    /// Sets `heads/<branch>` on `target` to `sha`, fast-forward only.
    ///
    /// Never forces: a divergent fork branch fails with `NonFastForward`
    /// instead of losing commits.
    fn update_branch_ref(
        &self,
        target: &RepoId,
        branch: &str,
        sha: &Sha,
    ) -> impl Future<Output = Result<(), SyncApiError>> + Send;

    /// Fetches the sync policy document from `repo`, if one exists.
    fn fetch_policy_document(
        &self,
        repo: &RepoId,
    ) -> impl Future<Output = Result<Option<String>, SyncApiError>> + Send;
}
