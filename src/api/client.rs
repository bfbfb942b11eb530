use std::time::Duration;

use anyhow::Context;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT},
    RequestBuilder, Response,
};
use tracing::trace;
use url::Url;

use crate::api::{ApiError, Commit, CommitStatus, Patch};

const GITHUB_JSON: &str = "application/vnd.github+json";
const GITHUB_DIFF: &str = "application/vnd.github.v3.diff";
const X_GITHUB_API_VERSION: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT_NAME: &str = "insomniac";

#[derive(Clone, Debug)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
}

impl GitHubClient {
    /// Builds a client authenticated with `token` for every request.
    pub fn new(mut api_url: Url, token: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        // without the trailing slash, joining would replace the last segment of the base
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("GitHub token contains invalid characters")?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_NAME));
        headers.insert(X_GITHUB_API_VERSION, HeaderValue::from_static(API_VERSION));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("couldn't build HTTP client")?;

        Ok(Self { http, api_url })
    }

    pub async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Commit, ApiError> {
        let url = self.url(&format!("repos/{}/{}/git/commits/{}", owner, repo, sha))?;
        let response = self
            .send(self.http.get(url.clone()).header(ACCEPT, GITHUB_JSON), &url)
            .await?;

        response.json().await.map_err(|cause| ApiError::Decode {
            url: url.to_string(),
            cause,
        })
    }

    /// Fetches the unified diff introduced by a commit.
    pub async fn get_commit_patch(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Patch, ApiError> {
        let url = self.url(&format!("repos/{}/{}/commits/{}", owner, repo, sha))?;
        let response = self
            .send(self.http.get(url.clone()).header(ACCEPT, GITHUB_DIFF), &url)
            .await?;

        let text = response.text().await.map_err(|cause| ApiError::Decode {
            url: url.to_string(),
            cause,
        })?;
        Ok(Patch(text))
    }

    pub async fn create_status(
        &self,
        owner: &str,
        repo: &str,
        status: &CommitStatus,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("repos/{}/{}/statuses/{}", owner, repo, status.sha))?;
        let request = self
            .http
            .post(url.clone())
            .header(ACCEPT, GITHUB_JSON)
            .json(status);
        self.send(request, &url).await?;

        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.api_url
            .join(path)
            .map_err(|cause| ApiError::InvalidUrl {
                path: path.to_owned(),
                cause,
            })
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, ApiError> {
        trace!("sending request to {}", url);
        let response = request.send().await.map_err(|cause| ApiError::Request {
            url: url.to_string(),
            cause,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        trace!("{} answered with {}", url, status);
        Ok(response)
    }
}
