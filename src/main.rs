use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rocket::{routes, Build, Rocket};
use tracing::info;

mod api;

mod config;
use config::InsomniacConfig;

mod health;
use health::check;

mod inspection;
use inspection::Inspector;

mod utils;

mod webhooks;
use webhooks::{github_webhook, GitHubSecret};

#[cfg(test)]
mod test_utils;

#[derive(Parser)]
#[command(version)]
struct Opts {
    /// Configuration file for insomniac, secrets can also be given through the environment
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opts = Opts::parse();
    let config =
        InsomniacConfig::load(opts.config.as_deref()).context("couldn't load configuration")?;

    let rocket = build_rocket(config)?;
    rocket
        .launch()
        .await
        .map(|_| ())
        .map_err(|err| anyhow::anyhow!(err))
}

/// Mounts the webhook and liveness routes, with everything they need in managed state.
fn build_rocket(config: InsomniacConfig) -> anyhow::Result<Rocket<Build>> {
    let inspector = Inspector::from_config(&config).context("failed to create inspector")?;
    info!(
        "reporting statuses as `{}` through {}",
        config.status_context, config.github_api_url
    );

    let mut figment = rocket::Config::figment();
    if let Some(address) = config.address {
        figment = figment.merge(("address", address));
    }
    if let Some(port) = config.port {
        figment = figment.merge(("port", port));
    }

    Ok(rocket::custom(figment)
        .mount("/", routes![github_webhook, check])
        .manage(GitHubSecret(config.github_secret))
        .manage(inspector))
}
