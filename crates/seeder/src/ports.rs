//! Port traits implemented by infrastructure crates.
//!
//! The domain defines *what* it needs from the outside world; adapters
//! (the `github` crate, the CLI's stdout preview) define *how*. Tests inject
//! in-memory fakes, so the two-pass contract is exercised without a live
//! tracker.

use async_trait::async_trait;

use crate::errors::RemoteError;
use crate::identifiers::IssueNumber;

/// Remote issue-tracking collaborator.
///
/// Both operations are attempted exactly once per call; retry and back-off
/// are deliberately absent (any failure aborts the whole run).
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Creates an issue and returns the number the tracker assigned to it.
    async fn create_issue(&self, title: &str, body: &str) -> Result<IssueNumber, RemoteError>;

    /// Attaches a comment to an existing issue.
    async fn comment_on_issue(&self, issue: IssueNumber, body: &str) -> Result<(), RemoteError>;
}

/// Inspection collaborator for dry runs.
///
/// Receives each specification's 1-based catalog position, title, and
/// rendered body. Performs no remote I/O.
pub trait PreviewSink {
    /// Accepts one rendered specification for human review.
    fn preview(&mut self, position: usize, title: &str, body: &str);
}
