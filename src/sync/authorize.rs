//! Installation authorization.
//!
//! Maps a fork's owner to the GitHub App installation authorized to act on
//! that owner's repositories, and exchanges it for a scoped client.

use crate::github::{GitHubApi, SyncApiError};

/// Resolves a scoped client for the given repository owner.
///
/// Fetches the installations visible to the app-level client and scans them
/// linearly for one whose account login matches `owner`. This runs on every
/// single fork sync: O(installations), unpaginated, uncached. A stale cache
/// could authorize against the wrong tenant, so there is none.
///
/// Fails with `NotInstalled` when no installation matches; that is an
/// operator-actionable gap for that fork only, not a bug.
pub async fn client_for_owner<C: GitHubApi>(app_client: &C, owner: &str) -> Result<C, SyncApiError> {
    let installations = app_client.list_installations().await?;

    let installation = installations
        .iter()
        .find(|i| i.account_login == owner)
        .ok_or_else(|| SyncApiError::not_installed(owner))?;

    app_client.installation_client(installation.id).await
}
