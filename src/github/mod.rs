//! GitHub API access for fork syncing.
//!
//! This module provides the outbound API seam ([`GitHubApi`]), the
//! octocrab-backed production client, and the error taxonomy that maps
//! GitHub's rejection shapes onto per-fork sync outcomes.

mod api;
mod client;
mod error;

pub use api::{GitHubApi, Installation, MergeReceipt, SyncProposal};
pub use client::OctocrabApi;
pub use error::{classify_validation_errors, SyncApiError, SyncErrorKind};
