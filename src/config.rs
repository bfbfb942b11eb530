use std::{fs::File, io::BufReader, net::IpAddr, path::Path, time::Duration};

use anyhow::{bail, Context};
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::inspection::classifier::DEFAULT_SLEEP_PATTERN;

const GITHUB_SECRET: &str = "GITHUB_SECRET";
const GITHUB_ACCESS_TOKEN: &str = "GITHUB_ACCESS_TOKEN";
const PORT: &str = "PORT";

#[derive(Debug, Clone, Deserialize)]
pub struct InsomniacConfig {
    /// Secret shared with GitHub, used to sign webhook payloads
    #[serde(default)]
    pub github_secret: String,
    /// Token used to authenticate against the GitHub REST API
    #[serde(default)]
    pub github_token: String,
    /// Base URL of the GitHub REST API, override it for GitHub Enterprise
    #[serde(default = "default_github_api_url")]
    pub github_api_url: Url,
    /// Label of the commit statuses posted by the bot
    #[serde(default = "default_status_context")]
    pub status_context: String,
    /// Pattern matched against every line of a commit's diff
    #[serde(default = "default_sleep_pattern", with = "serde_regex")]
    pub sleep_pattern: Regex,
    pub address: Option<IpAddr>,
    pub port: Option<u16>,
    /// Timeout applied to every GitHub API call. Calls never time out when unset.
    pub request_timeout_secs: Option<u64>,
}

fn default_github_api_url() -> Url {
    Url::parse("https://api.github.com/").expect("default API URL is valid")
}

fn default_status_context() -> String {
    "insomniac".to_owned()
}

fn default_sleep_pattern() -> Regex {
    Regex::new(DEFAULT_SLEEP_PATTERN).expect("default sleep pattern is valid")
}

impl Default for InsomniacConfig {
    fn default() -> Self {
        Self {
            github_secret: String::new(),
            github_token: String::new(),
            github_api_url: default_github_api_url(),
            status_context: default_status_context(),
            sleep_pattern: default_sleep_pattern(),
            address: None,
            port: None,
            request_timeout_secs: None,
        }
    }
}

impl InsomniacConfig {
    /// Reads the configuration from the optional YAML file, then applies overrides from the
    /// process environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let config_file =
            File::open(path).with_context(|| format!("couldn't open {}:", path.display()))?;
        serde_yaml::from_reader(BufReader::new(config_file)).context("couldn't parse config file")
    }

    /// Overrides values with the ones found through `lookup`, empty variables are ignored.
    fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|value| !value.is_empty());

        if let Some(secret) = non_empty(GITHUB_SECRET) {
            self.github_secret = secret;
        }
        if let Some(token) = non_empty(GITHUB_ACCESS_TOKEN) {
            self.github_token = token;
        }
        if let Some(port) = non_empty(PORT) {
            let port = port
                .parse()
                .with_context(|| format!("${} isn't a valid port: `{}`", PORT, port))?;
            self.port = Some(port);
        }

        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.github_secret.is_empty() {
            bail!("${} must be set!", GITHUB_SECRET);
        }
        if self.github_token.is_empty() {
            bail!("${} must be set!", GITHUB_ACCESS_TOKEN);
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
