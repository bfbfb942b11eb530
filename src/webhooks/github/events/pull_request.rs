use std::fmt::Display;

use serde::Deserialize;

use crate::webhooks::github::events::{GitHubUser, PullRequest, Repository};

#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    pub repository: Repository,
    pub sender: GitHubUser,
    pub pull_request: PullRequest,
    pub action: PullRequestAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    Opened,
    Edited,
    Reopened,
    Synchronize,
    Closed,
    Assigned,
    Unassigned,
    Labeled,
    Unlabeled,
    ReviewRequested,
    ReviewRequestRemoved,
    ReadyForReview,
    ConvertedToDraft,
    #[serde(other)]
    Other,
}

impl PullRequestAction {
    /// Whether the commits of the pull request should be inspected after this action.
    pub fn is_inspected(&self) -> bool {
        matches!(
            self,
            Self::Opened | Self::Edited | Self::Reopened | Self::Synchronize
        )
    }
}

impl Display for PullRequestAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self {
            Self::Opened => "opened",
            Self::Edited => "edited",
            Self::Reopened => "reopened",
            Self::Synchronize => "synchronize",
            Self::Closed => "closed",
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
            Self::Labeled => "labeled",
            Self::Unlabeled => "unlabeled",
            Self::ReviewRequested => "review_requested",
            Self::ReviewRequestRemoved => "review_request_removed",
            Self::ReadyForReview => "ready_for_review",
            Self::ConvertedToDraft => "converted_to_draft",
            Self::Other => "other",
        };
        f.write_str(action)
    }
}
