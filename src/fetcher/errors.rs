use thiserror::Error;

/// Any failure here aborts the run; nothing is retried.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("source did not answer within the timeout")]
    Timeout,

    #[error("redirect limit exceeded")]
    TooManyRedirects,

    #[error("cannot reach source: {0}")]
    Connect(String),

    #[error("source returned http {status}")]
    Http { status: reqwest::StatusCode },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("reading body failed: {0}")]
    Io(String),

    #[error("request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_redirect() {
            Self::TooManyRedirects
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
