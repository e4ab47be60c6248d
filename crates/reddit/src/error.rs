use thiserror::Error;

/// Reddit's error code for write throttling.
const RATE_LIMIT_CODE: &str = "RATELIMIT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RedditError {
    #[error("reddit request failed: {0}")]
    Request(String),
    #[error("reddit returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("reddit rejected credentials: {0}")]
    Auth(String),
    #[error("unexpected reddit response: {0}")]
    Decode(String),
    #[error("reddit api error {code}: {message}")]
    Api { code: String, message: String },
    #[error("reddit client setup failed: {0}")]
    Client(String),
}

impl RedditError {
    /// Network and API hiccups that are worth retrying on the next cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(_) => true,
            // 401 means the bearer token expired; it is refreshed on the next call.
            Self::Status { status, .. } => *status >= 500 || *status == 429 || *status == 401,
            Self::Api { code, .. } => code == RATE_LIMIT_CODE,
            Self::Auth(_) | Self::Decode(_) | Self::Client(_) => false,
        }
    }
}

impl From<reqwest::Error> for RedditError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else if error.is_builder() {
            Self::Client(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}
