//! One end-to-end run: fetch, dedup, render, publish.

use tracing::{error, info, instrument};

use crate::config::{Config, DetectorKind};
use crate::dedup::{StateStore, content_digest};
use crate::dispatch::{DispatchPlan, PostContent, dispatch};
use crate::error::RunError;
use crate::extractor::{Extractor, NullDetector, ReadabilityDetector, reject};
use crate::keyphrase::pick_keyphrase;
use crate::messaging::Messenger;
use crate::render::{CardFonts, CardRenderer};
use crate::source::SourceAdapter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Published { messages: usize, content_hash: String },
    SkippedDuplicate { content_hash: String },
}

pub fn build_extractor(config: &Config) -> Result<Extractor, RunError> {
    let selector = config.css_selector();
    let mode = config.extraction_mode();
    let extractor = match config.detector() {
        DetectorKind::Readability => Extractor::new(selector, mode, ReadabilityDetector::new())?,
        DetectorKind::None => Extractor::new(selector, mode, NullDetector)?,
    };
    Ok(extractor)
}

pub fn build_source(config: &Config) -> Result<SourceAdapter, RunError> {
    Ok(SourceAdapter::new(
        config.source_kind(),
        config.source_url(),
        config.extraction_mode(),
        build_extractor(config)?,
        config.text_limit(),
    ))
}

pub fn build_renderer(config: &Config) -> CardRenderer {
    let fonts = CardFonts::load(
        config.font_path().map(|p| p.as_path()),
        config.font_bold_path().map(|p| p.as_path()),
    );
    CardRenderer::new(fonts, config.footer_text())
}

/// Run with collaborators built from `config`.
pub async fn run(config: &Config, messenger: &dyn Messenger) -> Result<RunOutcome, RunError> {
    let source = build_source(config)?;
    let renderer = build_renderer(config);
    run_with(config, &source, &renderer, messenger).await
}

#[instrument(skip_all, fields(topic = %config.zodiac_name()))]
pub async fn run_with(
    config: &Config,
    source: &SourceAdapter,
    renderer: &CardRenderer,
    messenger: &dyn Messenger,
) -> Result<RunOutcome, RunError> {
    let body = source.fetch_body().await?;

    if reject::is_too_short(&body) {
        return Err(RunError::ContentTooShort {
            chars: body.trim().chars().count(),
            min: reject::MIN_BODY_CHARS,
        });
    }

    let content_hash = content_digest(&body);
    let store = config.state_file().map(StateStore::new);

    if let Some(store) = &store
        && let Some(previous) = store.load_or_empty()
        && previous.content_hash == content_hash
    {
        info!(hash = %content_hash, "content unchanged since last post, skipping");
        return Ok(RunOutcome::SkippedDuplicate { content_hash });
    }

    let keyphrase = pick_keyphrase(&body, config.keyphrase_max_len());
    let image = renderer.render(config.zodiac_name(), &keyphrase)?;

    let post = PostContent::new(
        config.post_title(),
        body,
        config.attribution().map(str::to_string),
    );
    let plan = DispatchPlan::for_post(&post, &keyphrase);
    dispatch(messenger, &plan, image.bytes).await?;

    if let Some(store) = &store
        && let Err(e) = store.save(&content_hash)
    {
        error!(path = %store.path().display(), error = %e, "post published but dedup state not saved");
    }

    info!(messages = plan.message_count(), hash = %content_hash, "published");
    Ok(RunOutcome::Published {
        messages: plan.message_count(),
        content_hash,
    })
}
