#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;

use horocast::config::Config;
use horocast::messaging::{Messenger, MessagingError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Photo { caption: String, bytes: usize },
    Message { text: String },
}

/// Records every call; optionally fails the text message.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    fail_messages: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_messages() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_messages: true,
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_photo(&self, photo: Bytes, caption: &str) -> Result<(), MessagingError> {
        self.sent.lock().unwrap().push(Sent::Photo {
            caption: caption.to_string(),
            bytes: photo.len(),
        });
        Ok(())
    }

    async fn send_message(&self, text: &str) -> Result<(), MessagingError> {
        if self.fail_messages {
            return Err(MessagingError::Api {
                status: reqwest::StatusCode::BAD_REQUEST,
                description: "Bad Request: message is too long".to_string(),
            });
        }
        self.sent.lock().unwrap().push(Sent::Message {
            text: text.to_string(),
        });
        Ok(())
    }
}

pub fn test_config(source_url: &str, extra: &[(&str, &str)]) -> Config {
    let mut map: HashMap<String, String> = HashMap::from([
        ("TG_TOKEN".to_string(), "123:abc".to_string()),
        ("TG_CHAT_ID".to_string(), "@horoscopes".to_string()),
        ("SOURCE_URL".to_string(), source_url.to_string()),
        ("MAIN_CONTENT_DETECTOR".to_string(), "none".to_string()),
    ]);
    for (key, value) in extra {
        map.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| map.get(key).cloned()).expect("valid test config")
}

pub fn html_page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body><nav>Меню</nav>{body}<footer>Подвал</footer></body></html>")
}
