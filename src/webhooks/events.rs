//! Typed branch-change events.
//!
//! This module defines the two webhook events the bot acts on. Each variant
//! carries only the fields GitHub guarantees for that event: a `create` event
//! has no prior history to pin to, so only `Pushed` carries a head commit SHA.

use serde::{Deserialize, Serialize};

use crate::types::{RepoId, Sha};

/// A change to a branch on the parent repository.
///
/// Produced by the webhook parser; consumed exactly once by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchChangeEvent {
    /// A branch was created on the parent repository.
    Created {
        /// The parent repository.
        repo: RepoId,
        /// The new branch's name (without the `refs/heads/` prefix).
        branch: String,
    },

    /// Commits were pushed to an existing branch on the parent repository.
    Pushed {
        /// The parent repository.
        repo: RepoId,
        /// The branch that was pushed to (without the `refs/heads/` prefix).
        branch: String,
        /// The new head commit of the branch.
        head_sha: Sha,
    },
}

impl BranchChangeEvent {
    /// Returns the parent repository this event belongs to.
    pub fn repo(&self) -> &RepoId {
        match self {
            BranchChangeEvent::Created { repo, .. } => repo,
            BranchChangeEvent::Pushed { repo, .. } => repo,
        }
    }

    /// Returns the branch name this event is about.
    pub fn branch(&self) -> &str {
        match self {
            BranchChangeEvent::Created { branch, .. } => branch,
            BranchChangeEvent::Pushed { branch, .. } => branch,
        }
    }

    /// Returns the new head commit SHA, if this event carries one.
    pub fn head_sha(&self) -> Option<&Sha> {
        match self {
            BranchChangeEvent::Created { .. } => None,
            BranchChangeEvent::Pushed { head_sha, .. } => Some(head_sha),
        }
    }
}
