use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitPulseError>;

#[derive(Error, Debug)]
pub enum GitPulseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid year filter: {0} (expected a 4-digit year or \"all\")")]
    InvalidYear(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GitPulseError {
    /// Whether a retry of the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GitPulseError::Http(err) => err.is_timeout() || err.is_connect(),
            GitPulseError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
