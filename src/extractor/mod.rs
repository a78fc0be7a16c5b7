pub mod cleaner;
pub mod model;
pub mod reader;
pub mod reject;
pub mod selector;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use cleaner::{FullStripStrategy, strip_html};
pub use reader::{DetectorError, MainContentDetector, MainContentStrategy, NullDetector, ReadabilityDetector};
pub use selector::SelectorStrategy;
pub use strategy::ExtractionStrategy;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::fetcher::types::PageResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Selector only; no match is an error.
    Strict,
    /// Selector, then main-content detection, then a full-document strip.
    #[default]
    Lenient,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid css selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("no text extracted (tried: {})", .tried.join(", "))]
    NotFound { tried: Vec<&'static str> },
}

/// Ordered extraction strategies; the first non-empty result wins. An empty
/// result from a last-resort strategy is returned as is and left to the
/// caller's length check.
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Extractor {
    pub fn new(
        selector: Option<&str>,
        mode: ExtractionMode,
        detector: impl MainContentDetector + 'static,
    ) -> Result<Self, ExtractError> {
        let mut strategies: Vec<Box<dyn ExtractionStrategy>> = Vec::new();

        if let Some(raw) = selector.map(str::trim).filter(|s| !s.is_empty()) {
            strategies.push(Box::new(SelectorStrategy::new(raw)?));
        }

        if mode == ExtractionMode::Lenient {
            strategies.push(Box::new(MainContentStrategy::new(detector)));
            strategies.push(Box::new(FullStripStrategy));
        }

        Ok(Self::from_strategies(strategies))
    }

    pub fn from_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn extract(&self, html: &str) -> Result<String, ExtractError> {
        for strategy in &self.strategies {
            match strategy.attempt(html) {
                Some(text) if !text.trim().is_empty() => {
                    debug!(strategy = strategy.name(), chars = text.chars().count(), "extracted");
                    return Ok(text);
                }
                Some(text) if strategy.is_last_resort() => {
                    debug!(strategy = strategy.name(), "last resort produced no text");
                    return Ok(text);
                }
                _ => debug!(strategy = strategy.name(), "strategy produced nothing"),
            }
        }

        Err(ExtractError::NotFound {
            tried: self.strategy_names(),
        })
    }

    #[instrument(skip_all, fields(url = %resp.url_final))]
    pub fn extract_page(&self, resp: &PageResponse) -> Result<String, ExtractError> {
        self.extract(&resp.body_utf8)
    }
}
