use tracing::{debug, instrument};

use crate::extractor::Extractor;
use crate::fetcher::fetch;
use crate::source::SourceError;

#[instrument(skip(extractor))]
pub async fn fetch_text(url: &str, extractor: &Extractor) -> Result<String, SourceError> {
    let page = fetch(url).await?;

    debug!(
        charset = ?page.charset,
        declared = ?page.declared_charset,
        size = page.body_raw.len(),
        "decoded page"
    );

    Ok(extractor.extract_page(&page)?)
}
