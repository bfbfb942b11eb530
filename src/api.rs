//! Minimal client for the parts of the GitHub REST API the bot talks to.

mod client;
pub use client::GitHubClient;

mod commit;
pub use commit::{Commit, Patch};

mod error;
pub use error::ApiError;

mod status;
pub use status::{CommitStatus, StatusState};
