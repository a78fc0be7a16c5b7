use scraper::{Html, Selector};

use crate::extractor::{ExtractError, model::join_lines, strategy::ExtractionStrategy};

/// Text of the first node matching a configured CSS selector.
pub struct SelectorStrategy {
    raw: String,
    selector: Selector,
}

impl SelectorStrategy {
    pub fn new(raw: &str) -> Result<Self, ExtractError> {
        let selector = Selector::parse(raw).map_err(|e| ExtractError::InvalidSelector {
            selector: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_string(),
            selector,
        })
    }

    pub fn selector(&self) -> &str {
        &self.raw
    }
}

impl ExtractionStrategy for SelectorStrategy {
    fn name(&self) -> &'static str {
        "selector"
    }

    fn attempt(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let node = document.select(&self.selector).next()?;
        Some(join_lines(node.text()))
    }
}
