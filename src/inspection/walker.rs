use tracing::debug;

use crate::{
    api::{Commit, GitHubClient},
    inspection::InspectionError,
};

/// Walks the first-parent chain of a repository, starting at a given commit.
///
/// Commits are fetched one at a time, on each call to [`CommitWalker::next_commit`].
pub struct CommitWalker<'a> {
    client: &'a GitHubClient,
    owner: &'a str,
    repo: &'a str,
    head: String,
    remaining: u64,
    last: Option<Commit>,
}

impl<'a> CommitWalker<'a> {
    pub fn new(
        client: &'a GitHubClient,
        owner: &'a str,
        repo: &'a str,
        head: impl Into<String>,
        count: u64,
    ) -> Self {
        Self {
            client,
            owner,
            repo,
            head: head.into(),
            remaining: count,
            last: None,
        }
    }

    /// Fetches the next commit of the chain, or `None` once `count` commits were produced.
    ///
    /// A commit without parents is still returned; the walk only fails when asked for a commit
    /// past it.
    pub async fn next_commit(&mut self) -> Result<Option<Commit>, InspectionError> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let sha = match &self.last {
            None => self.head.clone(),
            Some(commit) => commit
                .first_parent()
                .ok_or_else(|| InspectionError::NoParent {
                    sha: commit.sha.clone(),
                })?
                .to_owned(),
        };

        debug!(
            "fetching commit {} of {}/{} ({} left)",
            sha, self.owner, self.repo, self.remaining
        );
        let commit = self.client.get_commit(self.owner, self.repo, &sha).await?;

        self.remaining -= 1;
        self.last = Some(commit.clone());

        Ok(Some(commit))
    }
}
