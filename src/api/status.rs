use std::fmt::Display;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
}

impl Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
        };
        f.write_str(state)
    }
}

/// A status attached to a commit, shown in the checks section of a pull request.
///
/// Statuses are built once per commit and never updated in place: posting a new status with
/// the same `context` replaces the previous one on GitHub's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitStatus {
    #[serde(skip)]
    pub sha: String,
    pub state: StatusState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub context: String,
}

impl CommitStatus {
    pub fn new(
        sha: impl Into<String>,
        context: impl Into<String>,
        state: StatusState,
        description: Option<String>,
    ) -> Self {
        Self {
            sha: sha.into(),
            state,
            description,
            context: context.into(),
        }
    }

    pub fn pending(sha: impl Into<String>, context: impl Into<String>) -> Self {
        Self::new(sha, context, StatusState::Pending, None)
    }
}
