//! Shared test utilities: a recording mock of the GitHub API seam.
//!
//! [`MockApi`] implements [`GitHubApi`] over in-memory state and records
//! every outbound call, so tests can assert not only on outcomes but on
//! which calls were (and were not) made. Installation-scoped clients share
//! the recorder with the app-level client they came from.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::github::{
    GitHubApi, Installation, MergeReceipt, SyncApiError, SyncErrorKind, SyncProposal,
};
use crate::types::{InstallationId, PrNumber, RepoId, Sha};

/// An outbound call observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ListForks(RepoId),
    ListInstallations,
    InstallationClient(InstallationId),
    CreatePullRequest {
        target: RepoId,
        head: String,
        base: String,
    },
    MergePullRequest {
        target: RepoId,
        pr: PrNumber,
        merge_method: String,
    },
    UpdateBranchRef {
        target: RepoId,
        branch: String,
        sha: Sha,
    },
    FetchPolicyDocument(RepoId),
}

#[derive(Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    forks: Vec<RepoId>,
    fail_fork_listing: bool,
    installations: Vec<Installation>,
    policy_document: Option<String>,
    propose_errors: HashMap<RepoId, SyncErrorKind>,
    merge_errors: HashMap<RepoId, SyncErrorKind>,
    unmerged_receipts: HashMap<RepoId, String>,
    ref_update_errors: HashMap<RepoId, SyncErrorKind>,
    next_pr_number: u64,
}

/// A recording mock of the GitHub API.
#[derive(Clone)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockApi").finish_non_exhaustive()
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                next_pr_number: 1,
                ..MockState::default()
            })),
        }
    }

    pub fn with_fork(self, fork: RepoId) -> Self {
        self.state.lock().unwrap().forks.push(fork);
        self
    }

    pub fn with_fork_listing_error(self) -> Self {
        self.state.lock().unwrap().fail_fork_listing = true;
        self
    }

    pub fn with_installation(self, owner: &str, id: InstallationId) -> Self {
        self.state.lock().unwrap().installations.push(Installation {
            id,
            account_login: owner.to_string(),
        });
        self
    }

    pub fn with_policy(self, yaml: &str) -> Self {
        self.state.lock().unwrap().policy_document = Some(yaml.to_string());
        self
    }

    pub fn with_propose_error(self, target: &RepoId, kind: SyncErrorKind) -> Self {
        self.state
            .lock()
            .unwrap()
            .propose_errors
            .insert(target.clone(), kind);
        self
    }

    pub fn with_merge_error(self, target: &RepoId, kind: SyncErrorKind) -> Self {
        self.state
            .lock()
            .unwrap()
            .merge_errors
            .insert(target.clone(), kind);
        self
    }

    pub fn with_unmerged_receipt(self, target: &RepoId, message: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .unmerged_receipts
            .insert(target.clone(), message.to_string());
        self
    }

    pub fn with_ref_update_error(self, target: &RepoId, kind: SyncErrorKind) -> Self {
        self.state
            .lock()
            .unwrap()
            .ref_update_errors
            .insert(target.clone(), kind);
        self
    }

    /// Returns every call recorded so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Returns the installation IDs that were exchanged for scoped clients.
    pub fn exchanged_installations(&self) -> Vec<InstallationId> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::InstallationClient(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RecordedCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubApi for MockApi {
    async fn list_forks(&self, parent: &RepoId) -> Result<Vec<RepoId>, SyncApiError> {
        self.record(RecordedCall::ListForks(parent.clone()));
        let state = self.state.lock().unwrap();
        if state.fail_fork_listing {
            return Err(SyncApiError::new(
                SyncErrorKind::UpstreamUnavailable,
                "fork listing unavailable",
            ));
        }
        Ok(state.forks.clone())
    }

    async fn list_installations(&self) -> Result<Vec<Installation>, SyncApiError> {
        self.record(RecordedCall::ListInstallations);
        Ok(self.state.lock().unwrap().installations.clone())
    }

    async fn installation_client(
        &self,
        installation: InstallationId,
    ) -> Result<Self, SyncApiError> {
        self.record(RecordedCall::InstallationClient(installation));
        Ok(self.clone())
    }

    async fn create_pull_request(
        &self,
        target: &RepoId,
        proposal: &SyncProposal,
    ) -> Result<PrNumber, SyncApiError> {
        self.record(RecordedCall::CreatePullRequest {
            target: target.clone(),
            head: proposal.head.clone(),
            base: proposal.base.clone(),
        });

        let mut state = self.state.lock().unwrap();
        if let Some(kind) = state.propose_errors.get(target) {
            return Err(SyncApiError::new(
                *kind,
                format!("mock proposal rejection for {}", target),
            ));
        }
        let number = state.next_pr_number;
        state.next_pr_number += 1;
        Ok(PrNumber(number))
    }

    async fn merge_pull_request(
        &self,
        target: &RepoId,
        pr: PrNumber,
        merge_method: &str,
    ) -> Result<MergeReceipt, SyncApiError> {
        self.record(RecordedCall::MergePullRequest {
            target: target.clone(),
            pr,
            merge_method: merge_method.to_string(),
        });

        let state = self.state.lock().unwrap();
        if let Some(kind) = state.merge_errors.get(target) {
            return Err(SyncApiError::new(
                *kind,
                format!("mock merge failure for {}", target),
            ));
        }
        if let Some(message) = state.unmerged_receipts.get(target) {
            return Ok(MergeReceipt {
                merged: false,
                message: Some(message.clone()),
            });
        }
        Ok(MergeReceipt {
            merged: true,
            message: None,
        })
    }

    async fn update_branch_ref(
        &self,
        target: &RepoId,
        branch: &str,
        sha: &Sha,
    ) -> Result<(), SyncApiError> {
        self.record(RecordedCall::UpdateBranchRef {
            target: target.clone(),
            branch: branch.to_string(),
            sha: sha.clone(),
        });

        let state = self.state.lock().unwrap();
        if let Some(kind) = state.ref_update_errors.get(target) {
            return Err(SyncApiError::new(
                *kind,
                format!("mock ref update failure for {}", target),
            ));
        }
        Ok(())
    }

    async fn fetch_policy_document(&self, repo: &RepoId) -> Result<Option<String>, SyncApiError> {
        self.record(RecordedCall::FetchPolicyDocument(repo.clone()));
        Ok(self.state.lock().unwrap().policy_document.clone())
    }
}
