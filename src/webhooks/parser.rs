//! GitHub webhook payload parser.
//!
//! This module parses raw webhook JSON payloads into typed
//! [`BranchChangeEvent`] values. The parser is deliberately strict about the
//! fields it needs and tolerant of everything else:
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. `create` and `push` payloads are parsed into tagged variants
//! 3. Unknown event types return `Ok(None)` (ignored, not an error)
//! 4. Events with nothing to sync (tag creation, branch deletion) also
//!    return `Ok(None)`
//! 5. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{RepoId, Sha};

use super::events::BranchChangeEvent;

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed branch-change event.
///
/// # Arguments
///
/// * `event_type` - The value of the `X-GitHub-Event` header
/// * `payload` - The raw JSON payload bytes
///
/// # Returns
///
/// * `Ok(Some(event))` - A branch creation or push worth syncing
/// * `Ok(None)` - An event the bot ignores (unknown type, tag creation,
///   branch deletion)
/// * `Err(e)` - Malformed payload or missing required fields
pub fn parse_webhook(
    event_type: &str,
    payload: &[u8],
) -> Result<Option<BranchChangeEvent>, ParseError> {
    match event_type {
        "create" => parse_create(payload),
        "push" => parse_push(payload),
        // Unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

/// Strips the `refs/heads/` prefix from a fully-qualified git ref.
///
/// `create` payloads carry the bare branch name while `push` payloads carry
/// the full ref, so callers normalize through this in both cases.
pub fn strip_heads_prefix(git_ref: &str) -> &str {
    git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref)
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON structure. We use Option<T> for fields
// that are absent in some deliveries, then validate explicitly.
// ============================================================================

/// Minimal repository info present in both payloads.
#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawOwner,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

impl RawRepository {
    /// Normalizes the platform repository object into a [`RepoId`].
    fn into_repo_id(self) -> RepoId {
        RepoId::new(self.owner.login, self.name)
    }
}

// ============================================================================
// create event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawCreatePayload {
    #[serde(rename = "ref")]
    git_ref: String,
    ref_type: String,
    repository: RawRepository,
}

fn parse_create(payload: &[u8]) -> Result<Option<BranchChangeEvent>, ParseError> {
    let raw: RawCreatePayload = serde_json::from_slice(payload)?;

    // `create` fires for tags too; only branch creation is a sync trigger.
    match raw.ref_type.as_str() {
        "branch" => {}
        "tag" => return Ok(None),
        other => {
            return Err(ParseError::InvalidField {
                field: "ref_type",
                value: other.to_string(),
            });
        }
    }

    Ok(Some(BranchChangeEvent::Created {
        repo: raw.repository.into_repo_id(),
        branch: strip_heads_prefix(&raw.git_ref).to_string(),
    }))
}

// ============================================================================
// push event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    #[serde(default)]
    deleted: bool,
    head_commit: Option<RawHeadCommit>,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawHeadCommit {
    id: String,
}

fn parse_push(payload: &[u8]) -> Result<Option<BranchChangeEvent>, ParseError> {
    let raw: RawPushPayload = serde_json::from_slice(payload)?;

    // Pushes to tags are not branch changes.
    let Some(branch) = raw.git_ref.strip_prefix("refs/heads/") else {
        return Ok(None);
    };

    // Branch deletions arrive as pushes with no head commit; there is no
    // commit to pin forks to, so there is nothing to sync.
    if raw.deleted {
        return Ok(None);
    }
    let Some(head_commit) = raw.head_commit else {
        return Ok(None);
    };

    Ok(Some(BranchChangeEvent::Pushed {
        repo: raw.repository.into_repo_id(),
        branch: branch.to_string(),
        head_sha: Sha::new(head_commit.id),
    }))
}
