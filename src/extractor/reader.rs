use readability::extractor;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::extractor::{cleaner::strip_html, strategy::ExtractionStrategy};

/// Readability resolves relative links against this; only text is kept.
const PLACEHOLDER_BASE: &str = "http://localhost/";

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("main-content detector unavailable")]
    Unavailable,

    #[error("main-content detection failed: {0}")]
    Failed(String),
}

/// Optional capability that reduces a full page to its main article HTML.
pub trait MainContentDetector: Send + Sync {
    fn summarize(&self, html: &str) -> Result<String, DetectorError>;
}

/// Stands in when no detector is deployed.
pub struct NullDetector;

impl MainContentDetector for NullDetector {
    fn summarize(&self, _html: &str) -> Result<String, DetectorError> {
        Err(DetectorError::Unavailable)
    }
}

pub struct ReadabilityDetector {
    base: Url,
}

impl ReadabilityDetector {
    pub fn new() -> Self {
        Self {
            base: Url::parse(PLACEHOLDER_BASE).expect("placeholder base url is valid"),
        }
    }
}

impl Default for ReadabilityDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MainContentDetector for ReadabilityDetector {
    fn summarize(&self, html: &str) -> Result<String, DetectorError> {
        // readability indexes into the DOM freely and can panic on odd markup
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            extractor::extract(&mut html.as_bytes(), &self.base)
        }));

        match outcome {
            Ok(Ok(article)) => Ok(article.content),
            Ok(Err(e)) => Err(DetectorError::Failed(e.to_string())),
            Err(_) => Err(DetectorError::Failed("detector panicked".to_string())),
        }
    }
}

/// Runs a detector and strips its fragment. Any detector error yields nothing.
pub struct MainContentStrategy<D> {
    detector: D,
}

impl<D: MainContentDetector> MainContentStrategy<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }
}

impl<D: MainContentDetector> ExtractionStrategy for MainContentStrategy<D> {
    fn name(&self) -> &'static str {
        "main_content"
    }

    fn attempt(&self, html: &str) -> Option<String> {
        match self.detector.summarize(html) {
            Ok(fragment) => Some(strip_html(&fragment)),
            Err(e) => {
                debug!(error = %e, "skipping main-content tier");
                None
            }
        }
    }
}
