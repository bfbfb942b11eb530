use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("couldn't build API URL for `{path}`")]
    InvalidUrl {
        path: String,
        #[source]
        cause: url::ParseError,
    },
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        cause: reqwest::Error,
    },
    #[error("{url} answered with status {status}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[error("couldn't decode response from {url}")]
    Decode {
        url: String,
        #[source]
        cause: reqwest::Error,
    },
}

impl ApiError {
    /// HTTP status returned by GitHub, if the request got that far.
    #[cfg(test)]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
