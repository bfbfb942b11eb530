use serde::Deserialize;

/// A commit as returned by the git database API (`/repos/{owner}/{repo}/git/commits/{sha}`).
#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub sha: String,
    #[serde(default)]
    pub message: String,
    pub parents: Vec<ParentRef>,
}

impl Commit {
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(|parent| parent.sha.as_str())
    }

    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParentRef {
    pub sha: String,
}

/// Unified diff introduced by a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch(pub String);

impl Patch {
    /// Lines of the patch, file headers (`--- a/...`, `+++ b/...`) excluded. Change markers are
    /// kept.
    pub fn hunk_lines(&self) -> impl Iterator<Item = &str> {
        self.0
            .lines()
            .filter(|line| !line.starts_with("+++ ") && !line.starts_with("--- "))
    }
}
