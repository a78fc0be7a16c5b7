use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, ClientBuilder, Response, multipart};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

use crate::extractor::model::truncate_chars;
use crate::messaging::{CAPTION_LIMIT, MESSAGE_LIMIT, Messenger, errors::MessagingError};

const API_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client bound to one bot and one chat.
pub struct TelegramClient {
    client: Client,
    api_base: Url,
    token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(
        api_base: &str,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self, MessagingError> {
        let client = ClientBuilder::new()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(MessagingError::from_reqwest_error)?;

        Ok(Self {
            client,
            api_base: Url::parse(api_base)?,
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.as_str().trim_end_matches('/'),
            self.token,
            method
        )
    }

    async fn check(response: Response) -> Result<(), MessagingError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(MessagingError::from_reqwest_error)?;
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(api) if status.is_success() && api.ok => Ok(()),
            None if status.is_success() => Ok(()),
            other => Err(MessagingError::Api {
                status,
                description: other
                    .and_then(|api| api.description)
                    .unwrap_or_else(|| status.to_string()),
            }),
        }
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    #[instrument(skip_all, fields(chat_id = %self.chat_id, bytes = photo.len()))]
    async fn send_photo(&self, photo: Bytes, caption: &str) -> Result<(), MessagingError> {
        let part = multipart::Part::bytes(photo.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")
            .map_err(MessagingError::from_reqwest_error)?;

        let form = multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", truncate_chars(caption, CAPTION_LIMIT))
            .text("disable_notification", "true")
            .part("photo", part);

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(MessagingError::from_reqwest_error)?;

        Self::check(response).await?;
        info!("photo sent");
        Ok(())
    }

    #[instrument(skip_all, fields(chat_id = %self.chat_id, chars = text.chars().count()))]
    async fn send_message(&self, text: &str) -> Result<(), MessagingError> {
        let text = truncate_chars(text, MESSAGE_LIMIT);
        let params = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text.as_str()),
            ("disable_web_page_preview", "true"),
            ("disable_notification", "true"),
        ];

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .form(&params)
            .send()
            .await
            .map_err(MessagingError::from_reqwest_error)?;

        Self::check(response).await?;
        info!("message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        let client = TelegramClient::new("https://api.telegram.org/", "123:abc", "@chan").unwrap();
        assert_eq!(
            client.method_url("sendPhoto"),
            "https://api.telegram.org/bot123:abc/sendPhoto"
        );
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(
            TelegramClient::new("not a url", "t", "c"),
            Err(MessagingError::InvalidBaseUrl(_))
        ));
    }
}
