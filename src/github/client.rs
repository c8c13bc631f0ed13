//! Octocrab-backed implementation of the GitHub API seam.
//!
//! [`OctocrabApi`] wraps an `Octocrab` instance. Constructed with app-level
//! credentials it can enumerate installations and exchange them for
//! installation-scoped copies of itself; the scoped copies perform the
//! per-fork work.
//!
//! The concrete REST calls go through octocrab's generic `get`/`post`/`put`/
//! `patch` methods with locally-defined raw payload structs: the bot needs
//! exact control over fields like `maintainer_can_modify` that the typed
//! builders don't all expose.
//!
//! Every call carries a timeout; expiry surfaces as `UpstreamUnavailable`.

use std::future::Future;
use std::time::Duration;

use base64::Engine;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::json;

use crate::config::POLICY_PATH;
use crate::types::{InstallationId, PrNumber, RepoId, Sha};

use super::api::{GitHubApi, Installation, MergeReceipt, SyncProposal};
use super::error::{SyncApiError, SyncErrorKind};

/// Timeout applied to every upstream call. No operation blocks indefinitely.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs an upstream call with the standard timeout, classifying failures
/// through the given categorizer.
async fn call<T, F>(
    operation: &'static str,
    fut: F,
    classify: fn(octocrab::Error) -> SyncApiError,
) -> Result<T, SyncApiError>
where
    F: Future<Output = Result<T, octocrab::Error>>,
{
    match tokio::time::timeout(UPSTREAM_TIMEOUT, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(classify(e)),
        Err(_elapsed) => Err(SyncApiError::timeout(operation)),
    }
}

/// A GitHub client backed by octocrab.
#[derive(Clone)]
pub struct OctocrabApi {
    client: Octocrab,
}

impl OctocrabApi {
    /// Creates an API client from a pre-configured `Octocrab` instance.
    ///
    /// For the app-level client, configure octocrab with app authentication
    /// (`Octocrab::builder().app(...)`); `installation_client` then derives
    /// scoped clients from it.
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }
}

impl std::fmt::Debug for OctocrabApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabApi").finish_non_exhaustive()
    }
}

// ============================================================================
// Raw response structures
//
// These match GitHub's REST JSON. Only the fields the bot reads are listed.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    name: String,
    owner: RawAccount,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawInstallation {
    id: u64,
    account: RawAccount,
}

#[derive(Debug, Deserialize)]
struct RawCreatedPr {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct RawMergeReceipt {
    #[serde(default)]
    merged: bool,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    content: Option<String>,
}

impl GitHubApi for OctocrabApi {
    async fn list_forks(&self, parent: &RepoId) -> Result<Vec<RepoId>, SyncApiError> {
        let route = format!("/repos/{}/{}/forks", parent.owner, parent.repo);
        let forks: Vec<RawRepository> = call(
            "list forks",
            self.client.get(&route, None::<&()>),
            SyncApiError::from_octocrab,
        )
        .await
        .map_err(|mut e| {
            // Without the fork list no per-fork work is possible.
            if e.kind == SyncErrorKind::UnknownUpstream {
                e.kind = SyncErrorKind::UpstreamUnavailable;
            }
            e
        })?;

        Ok(forks
            .into_iter()
            .map(|f| RepoId::new(f.owner.login, f.name))
            .collect())
    }

    async fn list_installations(&self) -> Result<Vec<Installation>, SyncApiError> {
        let installations: Vec<RawInstallation> = call(
            "list installations",
            self.client.get("/app/installations", None::<&()>),
            SyncApiError::from_octocrab,
        )
        .await?;

        Ok(installations
            .into_iter()
            .map(|i| Installation {
                id: InstallationId(i.id),
                account_login: i.account.login,
            })
            .collect())
    }

    async fn installation_client(
        &self,
        installation: InstallationId,
    ) -> Result<Self, SyncApiError> {
        let scoped = self
            .client
            .installation(octocrab::models::InstallationId(installation.0))
            .map_err(SyncApiError::from_octocrab)?;
        Ok(Self::new(scoped))
    }

    async fn create_pull_request(
        &self,
        target: &RepoId,
        proposal: &SyncProposal,
    ) -> Result<PrNumber, SyncApiError> {
        let route = format!("/repos/{}/{}/pulls", target.owner, target.repo);
        let body = json!({
            "title": proposal.title,
            "body": proposal.body,
            "head": proposal.head,
            "base": proposal.base,
            "maintainer_can_modify": false,
        });

        let created: RawCreatedPr = call(
            "create pull request",
            self.client.post(&route, Some(&body)),
            SyncApiError::from_proposal_error,
        )
        .await?;

        Ok(PrNumber(created.number))
    }

    async fn merge_pull_request(
        &self,
        target: &RepoId,
        pr: PrNumber,
        merge_method: &str,
    ) -> Result<MergeReceipt, SyncApiError> {
        let route = format!(
            "/repos/{}/{}/pulls/{}/merge",
            target.owner, target.repo, pr.0
        );
        let body = json!({ "merge_method": merge_method });

        let receipt: RawMergeReceipt = call(
            "merge pull request",
            self.client.put(&route, Some(&body)),
            SyncApiError::from_merge_error,
        )
        .await?;

        Ok(MergeReceipt {
            merged: receipt.merged,
            message: receipt.message,
        })
    }

    async fn update_branch_ref(
        &self,
        target: &RepoId,
        branch: &str,
        sha: &Sha,
    ) -> Result<(), SyncApiError> {
        let route = format!(
            "/repos/{}/{}/git/refs/heads/{}",
            target.owner, target.repo, branch
        );
        let body = json!({
            "sha": sha.as_str(),
            "force": false,
        });

        let _updated: serde_json::Value = call(
            "update branch ref",
            self.client.patch(&route, Some(&body)),
            SyncApiError::from_ref_update_error,
        )
        .await?;

        Ok(())
    }

    async fn fetch_policy_document(&self, repo: &RepoId) -> Result<Option<String>, SyncApiError> {
        let route = format!(
            "/repos/{}/{}/contents/{}",
            repo.owner, repo.repo, POLICY_PATH
        );

        let content: RawContent = match call(
            "fetch policy document",
            self.client.get(&route, None::<&()>),
            SyncApiError::from_octocrab,
        )
        .await
        {
            Ok(content) => content,
            // A parent with no policy file is the common case, not an error.
            Err(e) if e.status_code == Some(404) => return Ok(None),
            Err(e) => return Err(e),
        };

        let Some(encoded) = content.content else {
            return Ok(None);
        };

        // The contents API returns base64 with embedded newlines.
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| {
                SyncApiError::new(
                    SyncErrorKind::UnknownUpstream,
                    format!("policy document is not valid base64: {}", e),
                )
            })?;

        let text = String::from_utf8(bytes).map_err(|e| {
            SyncApiError::new(
                SyncErrorKind::UnknownUpstream,
                format!("policy document is not valid UTF-8: {}", e),
            )
        })?;

        Ok(Some(text))
    }
}
