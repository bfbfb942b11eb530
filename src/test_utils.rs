//! Fixtures shared by the test suites: webhook payloads and GitHub API mocks.

use mockito::{Mock, ServerGuard};
use serde_json::{json, Value};

/// A `pull_request` webhook payload for `octo/repo`, trimmed to the fields GitHub always sends.
pub(crate) fn pull_request_payload(action: &str, head: &str, commits: u64) -> Value {
    let octo = json!({ "login": "octo", "id": 2 });
    let octocat = json!({ "login": "octocat", "id": 1 });

    json!({
        "action": action,
        "number": 42,
        "pull_request": {
            "number": 42,
            "html_url": "https://github.com/octo/repo/pull/42",
            "title": "Wait for the database to be ready",
            "user": octocat,
            "head": { "ref": "feature", "sha": head },
            "base": { "ref": "main", "sha": "base" },
            "commits": commits,
        },
        "repository": {
            "name": "repo",
            "full_name": "octo/repo",
            "html_url": "https://github.com/octo/repo",
            "owner": octo,
        },
        "sender": octocat,
    })
}

pub(crate) async fn mock_commit(server: &mut ServerGuard, sha: &str, parents: &[&str]) -> Mock {
    let parents: Vec<_> = parents.iter().map(|sha| json!({ "sha": sha })).collect();

    server
        .mock("GET", format!("/repos/octo/repo/git/commits/{}", sha).as_str())
        .with_header("content-type", "application/json")
        .with_body(json!({ "sha": sha, "message": "wip", "parents": parents }).to_string())
        .expect(1)
        .create_async()
        .await
}

pub(crate) async fn mock_patch(server: &mut ServerGuard, sha: &str, diff: &str) -> Mock {
    server
        .mock("GET", format!("/repos/octo/repo/commits/{}", sha).as_str())
        .match_header("accept", "application/vnd.github.v3.diff")
        .with_body(diff)
        .expect(1)
        .create_async()
        .await
}
