//! The event-driven sync engine.
//!
//! One call to [`handle_branch_change`] drives one webhook event through the
//! full flow: load policy, enumerate forks, and for each fork authorize,
//! propose, and land - each fork independently.
//!
//! # Failure isolation
//!
//! Every error inside a per-fork sync is caught at the fork boundary and
//! converted to a [`SyncOutcome`]; nothing propagates out of the engine.
//! The one fatal case is fork enumeration: with no fork list there is no
//! per-fork work to isolate, so the whole event fails and is left to
//! GitHub's webhook redelivery.
//!
//! # Concurrency
//!
//! Per-fork syncs have no ordering requirement among themselves. They are
//! fanned out on a [`JoinSet`] bounded by a semaphore so a repository with
//! many forks does not trample GitHub's rate limits.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::{load_policy, SyncPolicy};
use crate::github::{GitHubApi, SyncErrorKind};
use crate::types::RepoId;
use crate::webhooks::BranchChangeEvent;

use super::authorize::client_for_owner;
use super::land::{land, LandingMode};
use super::outcome::{EventOutcome, SkipReason, SyncOutcome, SyncResult};
use super::propose::propose_sync;

/// Resource limits for one event's fan-out.
#[derive(Debug, Clone, Copy)]
pub struct SyncLimits {
    /// Maximum number of forks synced concurrently within one event.
    pub max_concurrent_forks: usize,
}

impl Default for SyncLimits {
    fn default() -> Self {
        Self {
            max_concurrent_forks: 4,
        }
    }
}

/// Handles one branch-change event end to end.
///
/// Safe to re-run from scratch on webhook redelivery: proposing against an
/// already-synced fork classifies as `AlreadyInSync` and skips, and the
/// fast-forward-only ref update cannot repeat destructively.
pub async fn handle_branch_change<C>(app_client: &C, event: &BranchChangeEvent) -> EventOutcome
where
    C: GitHubApi + Clone + 'static,
{
    handle_branch_change_with_limits(app_client, event, SyncLimits::default()).await
}

/// [`handle_branch_change`] with explicit limits.
pub async fn handle_branch_change_with_limits<C>(
    app_client: &C,
    event: &BranchChangeEvent,
    limits: SyncLimits,
) -> EventOutcome
where
    C: GitHubApi + Clone + 'static,
{
    let parent = event.repo();
    let branch = event.branch();

    let policy = load_policy(app_client, parent).await;

    if policy.is_blacklisted(branch) {
        info!(repo = %parent, branch = branch, "Branch is blacklisted, skipping event");
        return EventOutcome::SkippedByPolicy {
            branch: branch.to_string(),
        };
    }

    let forks = match app_client.list_forks(parent).await {
        Ok(forks) => forks,
        Err(e) => {
            error!(repo = %parent, error = %e, "Fork enumeration failed, aborting event");
            return EventOutcome::EnumerationFailed(e);
        }
    };

    info!(
        repo = %parent,
        branch = branch,
        forks = forks.len(),
        "Syncing branch change to forks"
    );

    let mode = landing_mode(event, &policy);
    let outcomes = fan_out(app_client, parent, branch, &mode, forks, limits).await;

    let outcome = EventOutcome::Completed { outcomes };
    info!(
        repo = %parent,
        branch = branch,
        landed = outcome.landed(),
        skipped = outcome.skipped(),
        failed = outcome.failed(),
        "Branch sync completed"
    );
    outcome
}

/// Selects how this event's sync PRs are landed.
///
/// A push pins the fork to the parent's exact head commit. Branch creation
/// has no anchoring SHA, so it falls back to merging the PR with the
/// policy's strategy.
fn landing_mode(event: &BranchChangeEvent, policy: &SyncPolicy) -> LandingMode {
    match event.head_sha() {
        Some(sha) => LandingMode::RefReset { sha: sha.clone() },
        None => LandingMode::MergePr {
            strategy: policy.merge_strategy,
        },
    }
}

/// Runs the per-fork pipeline for every fork, bounded by the concurrency
/// limit, and collects one outcome per fork.
async fn fan_out<C>(
    app_client: &C,
    parent: &RepoId,
    branch: &str,
    mode: &LandingMode,
    forks: Vec<RepoId>,
    limits: SyncLimits,
) -> Vec<SyncOutcome>
where
    C: GitHubApi + Clone + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limits.max_concurrent_forks.max(1)));
    let mut tasks = JoinSet::new();

    for fork in forks {
        let semaphore = Arc::clone(&semaphore);
        let app_client = app_client.clone();
        let parent = parent.clone();
        let branch = branch.to_string();
        let mode = mode.clone();

        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("sync semaphore is never closed");
            sync_one_fork(&app_client, &parent, &branch, &mode, fork).await
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => error!(error = %e, "Fork sync task panicked"),
        }
    }
    outcomes
}

/// Syncs one fork, converting every error into an outcome at this boundary.
async fn sync_one_fork<C: GitHubApi>(
    app_client: &C,
    parent: &RepoId,
    branch: &str,
    mode: &LandingMode,
    fork: RepoId,
) -> SyncOutcome {
    let result = match sync_fork_pipeline(app_client, parent, branch, mode, &fork).await {
        Ok(()) => {
            info!(fork = %fork, branch = branch, "Landed sync on fork");
            SyncResult::Landed
        }
        Err(e) => match SkipReason::from_kind(e.kind) {
            Some(reason) => {
                info!(fork = %fork, branch = branch, reason = %reason, "Skipped fork");
                SyncResult::Skipped(reason)
            }
            None => {
                if e.kind == SyncErrorKind::UnknownUpstream {
                    // Unrecognized upstream shapes must be fully visible.
                    error!(fork = %fork, branch = branch, error = ?e, "Unrecognized upstream error");
                } else {
                    warn!(fork = %fork, branch = branch, error = %e, "Fork sync failed");
                }
                SyncResult::Failed(e)
            }
        },
    };

    SyncOutcome { fork, result }
}

/// The per-fork pipeline: authorize, propose, land.
///
/// The scoped client is acquired fresh for this fork and dropped afterwards;
/// credentials are never shared across forks.
async fn sync_fork_pipeline<C: GitHubApi>(
    app_client: &C,
    parent: &RepoId,
    branch: &str,
    mode: &LandingMode,
    fork: &RepoId,
) -> Result<(), crate::github::SyncApiError> {
    let client = client_for_owner(app_client, &fork.owner).await?;
    let pr = propose_sync(&client, parent, branch, fork).await?;
    land(&client, fork, branch, pr, mode).await
}
