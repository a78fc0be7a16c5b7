pub mod html;
pub mod rss;

pub use rss::FeedEntry;

use thiserror::Error;
use tracing::{info, instrument};

use crate::extractor::{ExtractError, ExtractionMode, Extractor, model::truncate_chars};
use crate::fetcher::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Html,
    Rss,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("feed has no entries: {0}")]
    FeedEmpty(String),
}

/// Produces the horoscope body from the configured page or feed.
pub struct SourceAdapter {
    kind: SourceKind,
    url: String,
    mode: ExtractionMode,
    extractor: Extractor,
    text_limit: usize,
}

impl SourceAdapter {
    pub fn new(
        kind: SourceKind,
        url: impl Into<String>,
        mode: ExtractionMode,
        extractor: Extractor,
        text_limit: usize,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            mode,
            extractor,
            text_limit,
        }
    }

    #[instrument(skip(self), fields(kind = ?self.kind, url = %self.url))]
    pub async fn fetch_body(&self) -> Result<String, SourceError> {
        let text = match self.kind {
            SourceKind::Html => html::fetch_text(&self.url, &self.extractor).await?,
            SourceKind::Rss => self.fetch_from_feed().await?,
        };

        let body = truncate_chars(&text, self.text_limit);
        info!(chars = body.chars().count(), "body ready");
        Ok(body)
    }

    async fn fetch_from_feed(&self) -> Result<String, SourceError> {
        let entries = rss::fetch_entries(&self.url).await;

        match rss::most_recent(entries) {
            Some(entry) => Ok(rss::entry_text(&entry, &self.extractor).await),
            None if self.mode == ExtractionMode::Lenient => {
                info!("feed empty, reading feed url as a page");
                html::fetch_text(&self.url, &self.extractor).await
            }
            None => Err(SourceError::FeedEmpty(self.url.clone())),
        }
    }
}
