use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Where a document is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedLocation {
    Remote(String),
    Local(PathBuf),
}

impl FeedLocation {
    /// `http://` and `https://` URLs are remote; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            FeedLocation::Remote(raw.to_string())
        } else {
            FeedLocation::Local(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for FeedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedLocation::Remote(url) => f.write_str(url),
            FeedLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{location} is not valid JSON")]
    Json {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}
