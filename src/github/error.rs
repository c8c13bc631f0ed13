//! GitHub API error taxonomy for fork syncing.
//!
//! Every upstream failure is categorized into a [`SyncErrorKind`] so the sync
//! engine can decide, per fork, whether a condition is an expected skip
//! (missing base branch, app not installed, nothing to sync) or a failure
//! that only affects that fork. Transport problems and 5xx responses become
//! `UpstreamUnavailable`; retry is driven by GitHub's webhook redelivery, not
//! by this crate.
//!
//! GitHub rejects pull request creation with a structured validation payload
//! (HTTP 422) whose `errors` array entries carry `resource`, `field`, and
//! `code`. The classifiers here parse that payload; shapes they do not
//! recognize become `UnknownUpstream` and are logged in full, never silently
//! swallowed.

use std::fmt;
use thiserror::Error;

/// The kind of upstream error, categorized for per-fork outcome decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    /// Transport failure, timeout, rate limit, or 5xx. The event can be
    /// re-driven by webhook redelivery.
    UpstreamUnavailable,

    /// No installation grants the app access to this fork's owner.
    /// Operator-actionable, not a bug.
    NotInstalled,

    /// The fork has no branch with the parent's branch name (validation
    /// error on field `base`, code `invalid`, resource `PullRequest`).
    /// Expected topology mismatch.
    BaseBranchMissing,

    /// The fork's branch already contains the parent's commits
    /// ("No commits between ..."). Nothing to do; makes re-runs idempotent.
    AlreadyInSync,

    /// GitHub rejected the pull request proposal for some other reason
    /// (e.g., a sync PR for this branch is already open).
    ProposalRejected,

    /// The pull request cannot be merged cleanly.
    MergeConflict,

    /// The merge call completed but the merge record's `merged` flag was
    /// false, or GitHub refused the merge outright.
    MergeRejected,

    /// The fork's branch has commits not reachable from the parent's new
    /// head; the fast-forward-only ref update refused to discard them.
    NonFastForward,

    /// A rejection shape the classifier does not recognize. Always logged
    /// with full detail.
    UnknownUpstream,
}

impl SyncErrorKind {
    /// Returns true if this condition is an expected per-fork skip rather
    /// than a failure.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            SyncErrorKind::NotInstalled
                | SyncErrorKind::BaseBranchMissing
                | SyncErrorKind::AlreadyInSync
        )
    }
}

impl fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncErrorKind::UpstreamUnavailable => "upstream unavailable",
            SyncErrorKind::NotInstalled => "app not installed for owner",
            SyncErrorKind::BaseBranchMissing => "base branch missing on fork",
            SyncErrorKind::AlreadyInSync => "fork already in sync",
            SyncErrorKind::ProposalRejected => "pull request proposal rejected",
            SyncErrorKind::MergeConflict => "merge conflict",
            SyncErrorKind::MergeRejected => "merge rejected",
            SyncErrorKind::NonFastForward => "non-fast-forward ref update",
            SyncErrorKind::UnknownUpstream => "unrecognized upstream error",
        };
        f.write_str(s)
    }
}

/// A categorized GitHub API error.
#[derive(Debug, Error)]
pub struct SyncApiError {
    /// The kind of error.
    pub kind: SyncErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for SyncApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl SyncApiError {
    /// Creates an error with no underlying octocrab source.
    pub fn new(kind: SyncErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an `UpstreamUnavailable` error for a timed-out call.
    pub fn timeout(operation: &str) -> Self {
        Self::new(
            SyncErrorKind::UpstreamUnavailable,
            format!("{} timed out", operation),
        )
    }

    /// Creates a `NotInstalled` error for the given owner.
    pub fn not_installed(owner: &str) -> Self {
        Self::new(
            SyncErrorKind::NotInstalled,
            format!("no installation found for owner {}", owner),
        )
    }

    /// Categorizes a generic octocrab error (transport, auth, 5xx).
    ///
    /// Calls that can fail with operation-specific rejections (PR creation,
    /// merge, ref update) have their own entry points below which fall back
    /// to this one.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { ref source, .. } => {
                let status = source.status_code.as_u16();
                let message = source.message.clone();
                let kind = classify_status(status, &message);
                Self {
                    kind,
                    status_code: Some(status),
                    message,
                    source: Some(err),
                }
            }
            other => {
                let message = other.to_string();
                let kind = if is_network_error(&message) {
                    SyncErrorKind::UpstreamUnavailable
                } else {
                    SyncErrorKind::UnknownUpstream
                };
                Self {
                    kind,
                    status_code: None,
                    message,
                    source: Some(other),
                }
            }
        }
    }

    /// Categorizes an error from pull request creation.
    ///
    /// HTTP 422 responses carry the validation payload; everything else is
    /// handled like a generic error.
    pub fn from_proposal_error(err: octocrab::Error) -> Self {
        if let octocrab::Error::GitHub { ref source, .. } = err {
            if source.status_code.as_u16() == 422 {
                let kind = classify_validation_errors(
                    &source.message,
                    source.errors.as_deref().unwrap_or(&[]),
                );
                let message = validation_detail(&source.message, source.errors.as_deref());
                return Self {
                    kind,
                    status_code: Some(422),
                    message,
                    source: Some(err),
                };
            }
        }
        Self::from_octocrab(err)
    }

    /// Categorizes an error from a pull request merge call.
    pub fn from_merge_error(err: octocrab::Error) -> Self {
        if let octocrab::Error::GitHub { ref source, .. } = err {
            let status = source.status_code.as_u16();
            let message = source.message.clone();
            if is_merge_conflict(status, &message) {
                return Self {
                    kind: SyncErrorKind::MergeConflict,
                    status_code: Some(status),
                    message,
                    source: Some(err),
                };
            }
            if status == 405 || status == 409 {
                return Self {
                    kind: SyncErrorKind::MergeRejected,
                    status_code: Some(status),
                    message,
                    source: Some(err),
                };
            }
        }
        Self::from_octocrab(err)
    }

    /// Categorizes an error from a git reference update.
    pub fn from_ref_update_error(err: octocrab::Error) -> Self {
        if let octocrab::Error::GitHub { ref source, .. } = err {
            let status = source.status_code.as_u16();
            let message = source.message.clone();
            if is_non_fast_forward(&message) {
                return Self {
                    kind: SyncErrorKind::NonFastForward,
                    status_code: Some(status),
                    message,
                    source: Some(err),
                };
            }
        }
        Self::from_octocrab(err)
    }
}

/// Classifies the entries of a 422 validation payload.
///
/// Recognized shapes:
/// - `{resource: "PullRequest", field: "base", code: "invalid"}` - the fork
///   has no branch with the parent's branch name
/// - `{resource: "PullRequest", code: "custom"}` with a "No commits between"
///   message - the fork is already in sync
///
/// Anything else is a `ProposalRejected` if it at least looks like a
/// pull-request validation error, otherwise `UnknownUpstream`.
pub fn classify_validation_errors(
    message: &str,
    errors: &[serde_json::Value],
) -> SyncErrorKind {
    let mut saw_pull_request_error = false;

    for entry in errors {
        let resource = entry.get("resource").and_then(|v| v.as_str());
        if resource != Some("PullRequest") {
            continue;
        }
        saw_pull_request_error = true;

        let field = entry.get("field").and_then(|v| v.as_str());
        let code = entry.get("code").and_then(|v| v.as_str());
        let detail = entry.get("message").and_then(|v| v.as_str()).unwrap_or("");

        if field == Some("base") && code == Some("invalid") {
            return SyncErrorKind::BaseBranchMissing;
        }
        if code == Some("custom") && detail.starts_with("No commits between") {
            return SyncErrorKind::AlreadyInSync;
        }
    }

    if saw_pull_request_error || message.to_lowercase().contains("validation failed") {
        SyncErrorKind::ProposalRejected
    } else {
        SyncErrorKind::UnknownUpstream
    }
}

/// Renders a validation failure with its error entries for logging.
fn validation_detail(message: &str, errors: Option<&[serde_json::Value]>) -> String {
    match errors {
        Some(errors) if !errors.is_empty() => {
            let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            format!("{} [{}]", message, rendered.join(", "))
        }
        _ => message.to_string(),
    }
}

/// Classifies a GitHub error response by status code and message.
fn classify_status(status: u16, message: &str) -> SyncErrorKind {
    match status {
        429 => SyncErrorKind::UpstreamUnavailable,
        403 if is_rate_limit_error(message) => SyncErrorKind::UpstreamUnavailable,
        500..=599 => SyncErrorKind::UpstreamUnavailable,
        _ => SyncErrorKind::UnknownUpstream,
    }
}

/// Checks if a merge rejection indicates a merge conflict. Only merge calls
/// refused with 405 or 409 qualify.
fn is_merge_conflict(status: u16, message: &str) -> bool {
    let message_lower = message.to_lowercase();
    (status == 405 || status == 409)
        && (message_lower.contains("not mergeable") || message_lower.contains("merge conflict"))
}

/// Checks if an error message indicates a rejected non-fast-forward update.
fn is_non_fast_forward(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("not a fast forward") || message_lower.contains("not a fast-forward")
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("timed out")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
}
