use serde::Deserialize;

use crate::webhooks::github::events::{GitHubUser, Repository};

/// Sent by GitHub when a webhook is created.
#[derive(Debug, Deserialize)]
pub struct PingEvent {
    pub zen: String,
    pub hook_id: u64,
    /// Absent for organization hooks
    pub repository: Option<Repository>,
    pub sender: GitHubUser,
}
