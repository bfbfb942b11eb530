use anyhow::anyhow;
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    response::status::Custom,
    Request, State,
};
use tracing::{debug, info, trace, warn};

use crate::{api::StatusState, inspection::Inspector};

mod events;
pub use events::*;

mod signing;
use signing::SignedGitHubPayload;
#[cfg(test)]
pub(crate) use signing::signature_header;

const X_GITHUB_EVENT: &str = "X-GitHub-Event";

pub struct GitHubSecret(pub String);

#[rocket::post("/hook", data = "<payload>")]
pub async fn github_webhook(
    event_type: GitHubEventType,
    payload: SignedGitHubPayload,
    inspector: &State<Inspector>,
) -> Result<&'static str, Custom<String>> {
    info!("received event {}", event_type);
    trace!("signed payload:\n{}", payload.0);

    let event = match GitHubEvent::from_payload(&event_type, &payload.0) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!("event {} is not 'pull_request', ignoring it", event_type);
            return Ok("OK");
        }
        Err(e) => {
            warn!("couldn't parse {} event: {}", event_type, e);
            return Err(Custom(
                Status::BadRequest,
                format!("couldn't parse {} event: {}", event_type, e),
            ));
        }
    };

    match event {
        GitHubEvent::Ping(ping) => match &ping.repository {
            Some(repo) => info!(
                "hook {} on {} pinged by {}: {}",
                ping.hook_id, repo.full_name, ping.sender.login, ping.zen
            ),
            None => info!(
                "hook {} pinged by {}: {}",
                ping.hook_id, ping.sender.login, ping.zen
            ),
        },
        GitHubEvent::PullRequest(event) => handle_pull_request(event, inspector).await,
    }

    Ok("OK")
}

async fn handle_pull_request(event: PullRequestEvent, inspector: &Inspector) {
    if !event.action.is_inspected() {
        debug!(
            "action is {} on {}, nothing to inspect",
            event.action, event.pull_request
        );
        return;
    }

    info!(
        "inspecting {} ({}) on branch {} of {}, {} by {}",
        event.pull_request,
        event.pull_request.html_url,
        event.pull_request.head.r#ref,
        event.repository.full_name,
        event.action,
        event.sender.login
    );

    match inspector.inspect(&event).await {
        Ok(statuses) => {
            let failures = statuses
                .iter()
                .filter(|status| status.state == StatusState::Failure)
                .count();
            info!(
                "inspected {} commits of {}, {} with hardcoded sleeps",
                statuses.len(),
                event.pull_request,
                failures
            );
        }
        Err(e) => warn!(
            "inspection of {} in {} aborted: {}",
            event.pull_request, event.repository.full_name, e
        ),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GitHubEventType {
    type Error = anyhow::Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let event_types = request.headers().get(X_GITHUB_EVENT).collect::<Vec<_>>();
        if event_types.len() != 1 {
            trace!("couldn't locate {} header", X_GITHUB_EVENT);
            return Outcome::Error((
                Status::BadRequest,
                anyhow!("request header needs exactly one event type"),
            ));
        }

        Outcome::Success(GitHubEventType::from(event_types[0]))
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use rocket::{
        http::{ContentType, Header},
        local::asynchronous::Client,
    };
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::{
        config::InsomniacConfig,
        test_utils::{mock_commit, mock_patch, pull_request_payload},
    };

    const SECRET: &str = "s3cr3t";

    async fn client(server: &ServerGuard) -> Client {
        let config = InsomniacConfig {
            github_secret: SECRET.to_owned(),
            github_token: "t0k3n".to_owned(),
            github_api_url: Url::parse(&server.url()).unwrap(),
            ..Default::default()
        };

        Client::tracked(crate::build_rocket(config).unwrap())
            .await
            .expect("valid rocket instance")
    }

    async fn deliver(client: &Client, event: &str, payload: &str, signature: &str) -> Status {
        client
            .post("/hook")
            .header(ContentType::JSON)
            .header(Header::new(X_GITHUB_EVENT, event.to_owned()))
            .header(Header::new("X-Hub-Signature-256", signature.to_owned()))
            .body(payload)
            .dispatch()
            .await
            .status()
    }

    async fn deliver_signed(client: &Client, event: &str, payload: &str) -> Status {
        deliver(client, event, payload, &signature_header(SECRET, payload)).await
    }

    /// Fails the test if the GitHub API is called at all.
    async fn forbid_api_calls(server: &mut ServerGuard) -> Vec<Mock> {
        let mut mocks = Vec::new();
        for method in ["GET", "POST"] {
            mocks.push(
                server
                    .mock(method, Matcher::Any)
                    .expect(0)
                    .create_async()
                    .await,
            );
        }
        mocks
    }

    async fn mock_verdict(server: &mut ServerGuard, sha: &str, state: &str) -> Mock {
        server
            .mock("POST", format!("/repos/octo/repo/statuses/{}", sha).as_str())
            .match_body(Matcher::PartialJson(json!({ "state": state })))
            .with_status(201)
            .expect(1)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn pull_request_commits_get_statuses() {
        let mut server = Server::new_async().await;
        let _api = vec![
            mock_commit(&mut server, "c2", &["c1"]).await,
            mock_commit(&mut server, "c1", &["c0"]).await,
            mock_patch(&mut server, "c2", "+++ b/main.go\n+time.Sleep(1000)\n").await,
            mock_patch(&mut server, "c1", "+++ b/main.go\n+func foo() { doWork() }\n").await,
        ];
        let pending = mock_verdict(&mut server, "c2", "pending").await;
        let c2 = mock_verdict(&mut server, "c2", "failure").await;
        let c1 = mock_verdict(&mut server, "c1", "success").await;

        let client = client(&server).await;
        let payload = pull_request_payload("opened", "c2", 2).to_string();

        assert_eq!(
            deliver_signed(&client, "pull_request", &payload).await,
            Status::Ok
        );
        pending.assert_async().await;
        c2.assert_async().await;
        c1.assert_async().await;
    }

    #[tokio::test]
    async fn failed_inspection_still_answers_ok() {
        let mut server = Server::new_async().await;
        let pending = mock_verdict(&mut server, "c2", "pending").await;
        let commit = server
            .mock("GET", "/repos/octo/repo/git/commits/c2")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = client(&server).await;
        let payload = pull_request_payload("synchronize", "c2", 2).to_string();

        assert_eq!(
            deliver_signed(&client, "pull_request", &payload).await,
            Status::Ok
        );
        pending.assert_async().await;
        commit.assert_async().await;
    }

    #[tokio::test]
    async fn ignored_actions_make_no_api_calls() {
        let mut server = Server::new_async().await;
        let forbidden = forbid_api_calls(&mut server).await;
        let client = client(&server).await;

        for action in ["closed", "labeled", "assigned"] {
            let payload = pull_request_payload(action, "c2", 2).to_string();
            assert_eq!(
                deliver_signed(&client, "pull_request", &payload).await,
                Status::Ok
            );
        }

        for mock in forbidden {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn other_events_make_no_api_calls() {
        let mut server = Server::new_async().await;
        let forbidden = forbid_api_calls(&mut server).await;
        let client = client(&server).await;

        let push = json!({ "ref": "refs/heads/main", "commits": [] }).to_string();
        assert_eq!(deliver_signed(&client, "push", &push).await, Status::Ok);

        let ping = json!({
            "zen": "Keep it logically awesome.",
            "hook_id": 1,
            "sender": { "login": "octocat", "id": 1 },
        })
        .to_string();
        assert_eq!(deliver_signed(&client, "ping", &ping).await, Status::Ok);

        for mock in forbidden {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn bad_signature_is_rejected() {
        let mut server = Server::new_async().await;
        let forbidden = forbid_api_calls(&mut server).await;
        let client = client(&server).await;
        let payload = pull_request_payload("opened", "c2", 2).to_string();

        let forged = signature_header("not the secret", &payload);
        assert_eq!(
            deliver(&client, "pull_request", &payload, &forged).await,
            Status::BadRequest
        );

        let response = client
            .post("/hook")
            .header(ContentType::JSON)
            .header(Header::new(X_GITHUB_EVENT, "pull_request"))
            .body(&payload)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        for mock in forbidden {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn missing_event_header_is_rejected() {
        let server = Server::new_async().await;
        let client = client(&server).await;
        let payload = pull_request_payload("opened", "c2", 2).to_string();

        let response = client
            .post("/hook")
            .header(ContentType::JSON)
            .header(Header::new(
                "X-Hub-Signature-256",
                signature_header(SECRET, &payload),
            ))
            .body(&payload)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
    }

    #[tokio::test]
    async fn wrong_content_type_is_rejected() {
        let server = Server::new_async().await;
        let client = client(&server).await;
        let payload = "payload=%7B%7D";

        let response = client
            .post("/hook")
            .header(ContentType::Form)
            .header(Header::new(X_GITHUB_EVENT, "pull_request"))
            .header(Header::new(
                "X-Hub-Signature-256",
                signature_header(SECRET, payload),
            ))
            .body(payload)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
    }

    #[tokio::test]
    async fn oversized_delivery_is_rejected() {
        let mut server = Server::new_async().await;
        let forbidden = forbid_api_calls(&mut server).await;
        let client = client(&server).await;
        let payload = format!(r#"{{"padding": "{}"}}"#, "z".repeat(2 * 1024 * 1024));

        assert_eq!(
            deliver_signed(&client, "pull_request", &payload).await,
            Status::PayloadTooLarge
        );
        for mock in forbidden {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn malformed_pull_request_is_rejected() {
        let server = Server::new_async().await;
        let client = client(&server).await;
        let payload = json!({ "action": "opened" }).to_string();

        assert_eq!(
            deliver_signed(&client, "pull_request", &payload).await,
            Status::BadRequest
        );
    }
}
