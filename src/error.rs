// src/error.rs
use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

/// Coarse classification used by the pipeline to decide what to skip and what to abort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    Filesystem,
    Config,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected markup at {url}: {reason}")]
    Markup { url: String, reason: String },

    #[error("bad selector `{css}`: {reason}")]
    Selector { css: &'static str, reason: String },

    #[error("invalid URL `{input}`: {source}")]
    Url {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Config(String),
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Request { .. } | Self::Status { .. } => ErrorKind::Network,
            Self::Markup { .. } | Self::Selector { .. } | Self::Url { .. } => ErrorKind::Parse,
            Self::Io { .. } => ErrorKind::Filesystem,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub fn markup(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Markup { url: url.into(), reason: reason.into() }
    }

    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { action, path: path.into(), source }
    }
}
