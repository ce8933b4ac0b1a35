use async_trait::async_trait;

use crate::{
    error::Result,
    types::{DirectoryListing, RepositoryCoordinate},
};

/// Core abstraction over the code-hosting service
///
/// Implementors provide read-only access to a repository's directory
/// listings and file texts. Both calls are single-shot: no retries.
#[async_trait]
pub trait TreeProvider: Send + Sync {
    /// List the entries at `path` (`""` for the repository root)
    ///
    /// Returns `BrowseError::NotFound` if the path doesn't exist and
    /// `BrowseError::RateLimited` when the calling quota is exhausted
    async fn list_directory(
        &self,
        coordinate: &RepositoryCoordinate,
        path: &str,
    ) -> Result<DirectoryListing>;

    /// Fetch the decoded text behind a file entry's fetch URL
    async fn fetch_file_text(&self, fetch_url: &str) -> Result<String>;

    /// Get a human-readable identifier for this provider (for logging/debugging)
    fn identifier(&self) -> String;
}
