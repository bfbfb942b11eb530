use std::fmt::Display;

use serde::Deserialize;
use url::Url;

use crate::utils::shorten_content;

mod ping;
mod pull_request;

pub use ping::*;
pub use pull_request::*;

/// Value of the `X-GitHub-Event` header of a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubEventType {
    Ping,
    PullRequest,
    Other(String),
}

impl From<&str> for GitHubEventType {
    fn from(event_type: &str) -> Self {
        match event_type {
            "ping" => Self::Ping,
            "pull_request" => Self::PullRequest,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl Display for GitHubEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ping => f.write_str("ping"),
            Self::PullRequest => f.write_str("pull_request"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

#[derive(Debug)]
pub enum GitHubEvent {
    Ping(PingEvent),
    PullRequest(PullRequestEvent),
}

impl GitHubEvent {
    /// Parses the payload of a delivery according to its event type. Event types the bot
    /// doesn't care about give `None`, without looking at the payload.
    pub fn from_payload(
        event_type: &GitHubEventType,
        payload: &str,
    ) -> serde_json::Result<Option<Self>> {
        let event = match event_type {
            GitHubEventType::Ping => Self::Ping(serde_json::from_str(payload)?),
            GitHubEventType::PullRequest => Self::PullRequest(serde_json::from_str(payload)?),
            GitHubEventType::Other(_) => return Ok(None),
        };

        Ok(Some(event))
    }
}

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: GitHubUser,
}

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: Url,
    pub title: String,
    pub user: GitHubUser,
    pub head: PrRef,
    /// Number of commits in the pull request
    pub commits: u64,
}

impl Display for PullRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PR #{}: {} by {}",
            self.number,
            shorten_content(&self.title),
            self.user.login
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct PrRef {
    pub r#ref: String,
    pub sha: String,
}
