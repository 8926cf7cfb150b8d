//! Error taxonomy for the scraping engine.
//!
//! Only [`ConfigError`] ever reaches a caller, and only while an engine is being
//! built. Everything that can go wrong during a scrape is a value that the
//! harvesters count, log, and move past:
//!
//! | Type | Raised by | Effect |
//! |------|-----------|--------|
//! | [`FetchFailure`] | page fetcher | the URL contributes nothing |
//! | [`ParseFailure`] | feed parser | the endpoint contributes nothing |
//! | [`ValidationFailure`] | harvesters | the candidate is discarded |

use thiserror::Error;

/// A single GET that did not produce a usable body.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchFailure {
    /// Classify a transport-level `reqwest` error for `url`.
    pub fn transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchFailure::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchFailure::Transport {
                url: url.to_string(),
                source,
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchFailure::Status { url, .. }
            | FetchFailure::Timeout { url }
            | FetchFailure::Transport { url, .. } => url,
        }
    }
}

/// A feed body that could not be read as RSS 2.0 or Atom.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("malformed feed document: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("document is neither RSS 2.0 nor Atom")]
    UnrecognizedFormat,
}

/// Why a single article candidate was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("title shorter than {min} characters")]
    ShortTitle { min: usize },

    #[error("title looks like navigation: {0:?}")]
    NavigationTitle(String),

    #[error("year {year} is outside the listing window")]
    OutsideWindow { year: i32 },

    #[error("link dated {year}-{month} does not belong on this archive page")]
    MonthMismatch { year: i32, month: u32 },

    #[error("{year}-{month}-{day} is not a calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("cannot resolve link {0:?}")]
    UnresolvableLink(String),
}

/// Problems building an engine from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
