use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::extractor::{model::join_lines, strategy::ExtractionStrategy};

static BOILERPLATE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"script, style, noscript, header, footer, nav, aside, [class*="comment"], [id*="comment"]"#,
    )
    .unwrap()
});

/// Upper bound on re-stripping text that decoded into fresh markup.
const MAX_PASSES: usize = 8;

/// Remove boilerplate and comment blocks, then flatten what remains to
/// trimmed, non-empty lines. Works on whole documents and fragments alike.
///
/// Escaped markup (`&lt;b&gt;`) decodes into tags, so the strip repeats
/// until the text stops changing.
pub fn strip_html(html: &str) -> String {
    let mut text = strip_once(html);
    for _ in 1..MAX_PASSES {
        let next = strip_once(&text);
        if next == text {
            break;
        }
        text = next;
    }
    text
}

fn strip_once(html: &str) -> String {
    let mut document = Html::parse_document(html);

    let doomed: Vec<_> = document.select(&BOILERPLATE).map(|el| el.id()).collect();
    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    join_lines(document.root_element().text())
}

pub struct FullStripStrategy;

impl ExtractionStrategy for FullStripStrategy {
    fn name(&self) -> &'static str {
        "full_strip"
    }

    fn attempt(&self, html: &str) -> Option<String> {
        Some(strip_html(html))
    }

    fn is_last_resort(&self) -> bool {
        true
    }
}
