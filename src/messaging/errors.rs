use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("telegram api error {status}: {description}")]
    Api {
        status: reqwest::StatusCode,
        description: String,
    },

    #[error("photo delivered but follow-up text failed: {0}")]
    PartialDelivery(Box<MessagingError>),
}

impl MessagingError {
    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        // The request URL embeds the bot token
        Self::Transport(err.without_url().to_string())
    }
}
