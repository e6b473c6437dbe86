//! GitHub infrastructure adapter.
//!
//! Implements the [`seeder::IssueTracker`] port over the GitHub REST API:
//! `POST /repos/{owner}/{repo}/issues` for creation and
//! `POST /repos/{owner}/{repo}/issues/{number}/comments` for annotation.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. All HTTP
//! details (headers, status classification, the per-call deadline) are
//! handled here; the [`seeder`] crate sees only [`seeder::IssueTracker`] and
//! [`seeder::RemoteError`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use seeder::{IssueNumber, IssueTracker, RemoteError, RepositoryId, SeederError};

/// Public GitHub API root. Overridable for tests and GitHub Enterprise.
pub const DEFAULT_API_ROOT: &str = "https://api.github.com";

/// Default per-call deadline.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

const ACCEPT_HEADER: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateCommentRequest<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    number: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`IssueTracker`] implementation backed by the GitHub REST API.
///
/// Every call is attempted exactly once, with the configured deadline; the
/// domain treats any failure as fatal, so there is no retry or back-off here.
pub struct GithubClient {
    http: reqwest::Client,
    api_root: String,
    repository: RepositoryId,
    token: String,
    timeout_seconds: u64,
}

impl GithubClient {
    /// Builds a client for `repository` authenticating with `token`.
    ///
    /// `call_timeout` is the per-request deadline; an elapsed deadline is
    /// reported as [`RemoteError::Timeout`].
    pub fn new(
        repository: RepositoryId,
        token: String,
        call_timeout: Duration,
    ) -> Result<Self, SeederError> {
        let http = reqwest::Client::builder()
            .timeout(call_timeout)
            .user_agent(concat!("issue-seeder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| SeederError::Configuration {
                message: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self {
            http,
            api_root: DEFAULT_API_ROOT.to_string(),
            repository,
            token,
            timeout_seconds: call_timeout.as_secs(),
        })
    }

    /// Replaces the API root (tests, GitHub Enterprise).
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    fn issues_url(&self) -> String {
        format!("{}/repos/{}/issues", self.api_root, self.repository)
    }

    fn comments_url(&self, issue: IssueNumber) -> String {
        format!(
            "{}/repos/{}/issues/{}/comments",
            self.api_root, self.repository, issue
        )
    }

    /// POSTs `payload` and returns the response body of a 2xx answer.
    async fn post<T: Serialize>(&self, url: &str, payload: &T) -> Result<String, RemoteError> {
        debug!(url, "issuing POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .header(API_VERSION_HEADER, API_VERSION)
            .json(payload)
            .send()
            .await
            .map_err(|err| classify_send_error(err, self.timeout_seconds))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            Ok(body)
        } else {
            Err(RemoteError::Protocol {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl IssueTracker for GithubClient {
    async fn create_issue(&self, title: &str, body: &str) -> Result<IssueNumber, RemoteError> {
        let payload = CreateIssueRequest { title, body };
        let response = self.post(&self.issues_url(), &payload).await?;
        let created: CreatedIssue =
            serde_json::from_str(&response).map_err(|err| RemoteError::Transport {
                message: format!("failed to decode issue-creation response: {err}"),
            })?;
        Ok(IssueNumber::new(created.number))
    }

    async fn comment_on_issue(&self, issue: IssueNumber, body: &str) -> Result<(), RemoteError> {
        let payload = CreateCommentRequest { body };
        self.post(&self.comments_url(issue), &payload).await?;
        Ok(())
    }
}

/// Maps a request-sending failure to the port failure shape.
fn classify_send_error(err: reqwest::Error, timeout_seconds: u64) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout {
            seconds: timeout_seconds,
        }
    } else {
        RemoteError::Transport {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn client() -> GithubClient {
        GithubClient::new(
            RepositoryId::new("octocat/hello-world").unwrap(),
            "token".to_string(),
            DEFAULT_CALL_TIMEOUT,
        )
        .unwrap()
    }

    #[test]
    fn issue_urls_follow_rest_layout() {
        let client = client();
        assert_eq!(
            client.issues_url(),
            "https://api.github.com/repos/octocat/hello-world/issues"
        );
        assert_eq!(
            client.comments_url(IssueNumber::new(7)),
            "https://api.github.com/repos/octocat/hello-world/issues/7/comments"
        );
    }

    #[test]
    fn api_root_is_overridable() {
        let client = client().with_api_root("http://127.0.0.1:8080");
        assert_eq!(
            client.issues_url(),
            "http://127.0.0.1:8080/repos/octocat/hello-world/issues"
        );
    }

    #[test]
    fn creation_payload_has_title_and_body() {
        let payload = CreateIssueRequest {
            title: "T",
            body: "B",
        };
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            serde_json::json!({ "title": "T", "body": "B" })
        );
    }

    #[test]
    fn created_issue_decodes_number_only() {
        let created: CreatedIssue =
            serde_json::from_str(r#"{"number": 12, "state": "open", "title": "T"}"#).unwrap();
        assert_eq!(created.number, 12);
    }
}
