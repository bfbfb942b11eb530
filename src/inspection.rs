use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::{
    api::{ApiError, CommitStatus, GitHubClient, StatusState},
    config::InsomniacConfig,
    webhooks::github::PullRequestEvent,
};

pub mod classifier;
use classifier::{SleepClassifier, Verdict};

mod walker;
use walker::CommitWalker;

pub const FAILURE_DESCRIPTION: &str = "no. stop it!";
pub const SUCCESS_DESCRIPTION: &str = "yay!";

#[derive(Debug, Error)]
pub enum InspectionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("commit {sha} has no parent")]
    NoParent { sha: String },
}

/// Checks the commits of a pull request for hardcoded sleeps, and reports the result of each
/// commit as a commit status.
pub struct Inspector {
    client: GitHubClient,
    classifier: SleepClassifier,
    context: String,
}

impl Inspector {
    pub fn new(client: GitHubClient, classifier: SleepClassifier, context: String) -> Self {
        Self {
            client,
            classifier,
            context,
        }
    }

    pub fn from_config(config: &InsomniacConfig) -> anyhow::Result<Self> {
        let client = GitHubClient::new(
            config.github_api_url.clone(),
            &config.github_token,
            config.request_timeout(),
        )
        .context("couldn't create GitHub client")?;
        let classifier = SleepClassifier::new(config.sleep_pattern.clone());

        Ok(Self::new(client, classifier, config.status_context.clone()))
    }

    /// Marks the head of the pull request as pending, then walks its commits and posts a
    /// verdict on each of them.
    ///
    /// Returns the verdict statuses that were posted. The walk stops at the first error,
    /// commits inspected before it keep their status.
    pub async fn inspect(
        &self,
        event: &PullRequestEvent,
    ) -> Result<Vec<CommitStatus>, InspectionError> {
        let owner = event.repository.owner.login.as_str();
        let repo = event.repository.name.as_str();
        let pr = &event.pull_request;

        if pr.commits == 0 {
            info!("{} has no commits, nothing to inspect", pr);
            return Ok(Vec::new());
        }

        debug!("setting status of {} to pending", pr.head.sha);
        let pending = CommitStatus::pending(&pr.head.sha, &self.context);
        self.client.create_status(owner, repo, &pending).await?;

        let mut walker = CommitWalker::new(&self.client, owner, repo, &pr.head.sha, pr.commits);
        let mut posted = Vec::new();

        while let Some(commit) = walker.next_commit().await? {
            let patch = self.client.get_commit_patch(owner, repo, &commit.sha).await?;
            trace!("commit patch is:\n{}", patch.0);

            let verdict = self.classifier.classify(&patch);
            match &verdict {
                Verdict::HardcodedSleep { line } => info!(
                    "discovered hardcoded sleep call in {} ({}): `{}`",
                    commit.sha,
                    commit.title(),
                    line
                ),
                Verdict::Clean => debug!("did not find hardcoded sleep call in {}", commit.sha),
            }

            let status = self.verdict_status(&commit.sha, &verdict);
            info!("setting status of {} to {}", status.sha, status.state);
            self.client.create_status(owner, repo, &status).await?;
            posted.push(status);
        }

        Ok(posted)
    }

    fn verdict_status(&self, sha: &str, verdict: &Verdict) -> CommitStatus {
        let (state, description) = if verdict.is_clean() {
            (StatusState::Success, SUCCESS_DESCRIPTION)
        } else {
            (StatusState::Failure, FAILURE_DESCRIPTION)
        };

        CommitStatus::new(sha, &self.context, state, Some(description.to_owned()))
    }
}
