//! Splits a post between a photo caption and a follow-up message.

use bytes::Bytes;
use tracing::{error, info, instrument};

use crate::extractor::model::truncate_chars;
use crate::messaging::{CAPTION_LIMIT, MESSAGE_LIMIT, Messenger, MessagingError};

/// Posts up to this many chars go out as a single captioned photo.
pub const SINGLE_MESSAGE_MAX: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub header: String,
    pub body: String,
    pub attribution: Option<String>,
}

impl PostContent {
    pub fn new(header: impl Into<String>, body: impl Into<String>, attribution: Option<String>) -> Self {
        Self {
            header: header.into(),
            body: body.into(),
            attribution: attribution.filter(|a| !a.trim().is_empty()),
        }
    }

    pub fn full_text(&self) -> String {
        match &self.attribution {
            Some(source) => format!("{}\n\n{}\n\nИсточник: {}", self.header, self.body, source),
            None => format!("{}\n\n{}", self.header, self.body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchPlan {
    Single { caption: String },
    Split { caption: String, text: String },
}

impl DispatchPlan {
    pub fn for_post(post: &PostContent, keyphrase: &str) -> Self {
        let full_text = post.full_text();

        if full_text.chars().count() <= SINGLE_MESSAGE_MAX {
            Self::Single {
                caption: truncate_chars(&full_text, CAPTION_LIMIT),
            }
        } else {
            Self::Split {
                caption: truncate_chars(&format!("{}\n\n{}", post.header, keyphrase), CAPTION_LIMIT),
                text: truncate_chars(&full_text, MESSAGE_LIMIT),
            }
        }
    }

    pub fn message_count(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Split { .. } => 2,
        }
    }
}

/// Send the plan. A failed follow-up after a delivered photo is reported as
/// [`MessagingError::PartialDelivery`]; nothing is retried or rolled back.
#[instrument(skip_all, fields(messages = plan.message_count()))]
pub async fn dispatch(
    messenger: &dyn Messenger,
    plan: &DispatchPlan,
    photo: Bytes,
) -> Result<(), MessagingError> {
    match plan {
        DispatchPlan::Single { caption } => messenger.send_photo(photo, caption).await,
        DispatchPlan::Split { caption, text } => {
            messenger.send_photo(photo, caption).await?;
            if let Err(e) = messenger.send_message(text).await {
                error!(error = %e, "photo is already posted; full text was not delivered");
                return Err(MessagingError::PartialDelivery(Box::new(e)));
            }
            info!("split post delivered");
            Ok(())
        }
    }
}
