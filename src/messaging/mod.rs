pub mod client;
pub mod errors;

pub use client::TelegramClient;
pub use errors::MessagingError;

use async_trait::async_trait;
use bytes::Bytes;

/// Longest photo caption the Bot API accepts.
pub const CAPTION_LIMIT: usize = 1024;
/// Longest text message the Bot API accepts.
pub const MESSAGE_LIMIT: usize = 4096;

/// Outbound channel for a rendered post.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_photo(&self, photo: Bytes, caption: &str) -> Result<(), MessagingError>;

    async fn send_message(&self, text: &str) -> Result<(), MessagingError>;
}
