use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Server error {status} after {attempts} attempts")]
    Server { status: u16, attempts: u32 },

    #[error("Authorization rejected by <{url}>")]
    AuthRejected { url: String },

    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Cannot parse response for {symbol}: {reason}")]
    MalformedResponse { symbol: String, reason: String },

    #[error("No data available for {symbol}")]
    NoData { symbol: String },

    #[error("Upstream error {code}: {description}")]
    Upstream { code: String, description: String },

    #[error("Invalid url <{0}>: {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("Invalid header {0}")]
    InvalidHeader(String),
}

impl Error {
    /// Worth another attempt against the same endpoint.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Server { .. })
    }

    /// The endpoint variant is unusable, try the other one.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Server { .. } | Error::AuthRejected { .. }
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}
