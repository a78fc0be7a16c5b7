use chrono::{DateTime, Utc};
use feed_rs::parser;
use html_escape::decode_html_entities;
use tracing::{info, instrument, warn};

use crate::extractor::{Extractor, strip_html};
use crate::fetcher::fetch;
use crate::source::html;

/// Feed text shorter than this triggers a fetch of the linked article.
pub const MIN_ENTRY_CHARS: usize = 300;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

impl FeedEntry {
    /// First non-empty of content, summary, description, title.
    pub fn best_text(&self) -> Option<&str> {
        [&self.content, &self.summary, &self.description, &self.title]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.trim().is_empty())
    }
}

impl From<feed_rs::model::Entry> for FeedEntry {
    fn from(entry: feed_rs::model::Entry) -> Self {
        Self {
            title: entry.title.map(|t| decode_html_entities(&t.content).to_string()),
            summary: entry.summary.map(|s| s.content),
            description: entry
                .media
                .into_iter()
                .find_map(|m| m.description)
                .map(|d| d.content),
            content: entry.content.and_then(|c| c.body),
            link: entry.links.into_iter().next().map(|l| l.href),
            published: entry.published.or(entry.updated),
        }
    }
}

/// Unparsable input yields no entries.
pub fn parse_entries(body: &[u8]) -> Vec<FeedEntry> {
    match parser::parse(body) {
        Ok(feed) => feed.entries.into_iter().map(FeedEntry::from).collect(),
        Err(e) => {
            warn!(error = %e, "feed did not parse");
            Vec::new()
        }
    }
}

/// Network failures yield no entries.
#[instrument]
pub async fn fetch_entries(url: &str) -> Vec<FeedEntry> {
    match fetch(url).await {
        Ok(resp) => {
            let entries = parse_entries(&resp.body_raw);
            info!(entries = entries.len(), "feed parsed");
            entries
        }
        Err(e) => {
            warn!(error = %e, "feed fetch failed");
            Vec::new()
        }
    }
}

/// Latest by published/updated date. Undated entries and ties keep feed order.
pub fn most_recent(entries: Vec<FeedEntry>) -> Option<FeedEntry> {
    entries
        .into_iter()
        .reduce(|best, next| if next.published > best.published { next } else { best })
}

/// Plain text for an entry, upgraded to the linked article when the feed
/// only carries a teaser.
pub async fn entry_text(entry: &FeedEntry, extractor: &Extractor) -> String {
    let text = entry.best_text().map(strip_html).unwrap_or_default();

    // Without strategies a linked page could never yield text
    if extractor.strategy_names().is_empty() {
        return text;
    }

    match entry.link.as_deref() {
        Some(link) if text.chars().count() < MIN_ENTRY_CHARS => {
            upgrade_from_link(text, link, extractor).await
        }
        _ => text,
    }
}

async fn upgrade_from_link(text: String, link: &str, extractor: &Extractor) -> String {
    match html::fetch_text(link, extractor).await {
        Ok(full) if full.chars().count() > text.chars().count() => {
            info!(link, chars = full.chars().count(), "using linked article");
            full
        }
        Ok(_) => text,
        Err(e) => {
            warn!(link, error = %e, "linked article unavailable, keeping feed text");
            text
        }
    }
}
