//! Fork Sync Bot - A GitHub App that fans parent-branch changes out to forks.
//!
//! When a branch is created or pushed on a parent repository, the bot
//! proposes the change as a pull request on the same-named branch of every
//! fork and lands it: by fast-forwarding the fork's branch reference to the
//! parent's head for pushes, or by merging the pull request for branch
//! creations. A per-repository policy file can blacklist branches and pick
//! the merge strategy. Forks fail or skip individually; one diverged or
//! uninstalled fork never blocks the rest.

pub mod config;
pub mod github;
pub mod server;
pub mod sync;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub mod test_utils;
