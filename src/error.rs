use thiserror::Error;

use crate::extractor::ExtractError;
use crate::messaging::MessagingError;
use crate::render::RenderError;
use crate::source::SourceError;

/// Anything that aborts a run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("extraction setup failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("extracted text too short ({chars} chars, need {min})")]
    ContentTooShort { chars: usize, min: usize },

    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("publishing failed: {0}")]
    Messaging(#[from] MessagingError),
}
