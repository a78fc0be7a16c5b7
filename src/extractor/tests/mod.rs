use std::fs;

use crate::extractor::{
    DetectorError, ExtractError, ExtractionMode, Extractor, MainContentDetector, NullDetector,
    ReadabilityDetector, strip_html,
};

struct BrokenDetector;

impl MainContentDetector for BrokenDetector {
    fn summarize(&self, _html: &str) -> Result<String, DetectorError> {
        Err(DetectorError::Failed("parse tree exploded".to_string()))
    }
}

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

#[test]
fn test_selector_tier_returns_matched_node_text() {
    let html = fixture("horoscope.html");
    let extractor =
        Extractor::new(Some("div.horo-text"), ExtractionMode::Lenient, BrokenDetector).unwrap();

    let text = extractor.extract(&html).unwrap();
    assert_eq!(
        text,
        "Эта неделя станет для Овнов временем смелых начинаний. Звёзды советуют не откладывать важные разговоры.\n\
         В середине недели возможны неожиданные финансовые поступления. Потратьте их с умом.\n\
         Выходные лучше провести с близкими людьми."
    );
}

#[test]
fn test_selector_tier_is_independent_of_detector() {
    let html = fixture("horoscope.html");
    let with_null =
        Extractor::new(Some("div.horo-text"), ExtractionMode::Lenient, NullDetector).unwrap();
    let strict = Extractor::new(Some("div.horo-text"), ExtractionMode::Strict, NullDetector).unwrap();

    assert_eq!(with_null.extract(&html).unwrap(), strict.extract(&html).unwrap());
}

#[test]
fn test_falls_through_to_full_strip_when_detector_unavailable() {
    let html = fixture("horoscope.html");
    let extractor = Extractor::new(Some("#nope"), ExtractionMode::Lenient, NullDetector).unwrap();

    let text = extractor.extract(&html).unwrap();
    assert_eq!(text, strip_html(&html));
    assert!(text.starts_with("Гороскоп для Овна на неделю\nОвен\nЭта неделя"));
    assert!(!text.contains("Астро-портал"));
    assert!(!text.contains("Телец"));
    assert!(!text.contains("Ирина"));
    assert!(!text.contains("Реклама"));
    assert!(!text.contains("dataLayer"));
}

#[test]
fn test_falls_through_when_detector_errors() {
    let html = fixture("horoscope.html");
    let extractor = Extractor::new(None, ExtractionMode::Lenient, BrokenDetector).unwrap();

    assert_eq!(extractor.extract(&html).unwrap(), strip_html(&html));
}

#[test]
fn test_readability_tier_keeps_article_text() {
    let html = fixture("horoscope.html");
    let extractor = Extractor::new(None, ExtractionMode::Lenient, ReadabilityDetector::new()).unwrap();

    let text = extractor.extract(&html).unwrap();
    assert!(text.contains("смелых начинаний"));
    assert!(!text.contains("dataLayer"));
}

#[test]
fn test_strict_mode_has_no_fallback() {
    let html = fixture("horoscope.html");
    let extractor = Extractor::new(Some("#nope"), ExtractionMode::Strict, ReadabilityDetector::new()).unwrap();

    match extractor.extract(&html) {
        Err(ExtractError::NotFound { tried }) => assert_eq!(tried, vec!["selector"]),
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_strategy_order() {
    let extractor = Extractor::new(Some("p"), ExtractionMode::Lenient, NullDetector).unwrap();
    assert_eq!(
        extractor.strategy_names(),
        vec!["selector", "main_content", "full_strip"]
    );

    let without_selector = Extractor::new(Some("   "), ExtractionMode::Lenient, NullDetector).unwrap();
    assert_eq!(without_selector.strategy_names(), vec!["main_content", "full_strip"]);
}

#[test]
fn test_boilerplate_only_page_is_empty_in_lenient_mode() {
    let html = fixture("empty.html");
    let extractor = Extractor::new(None, ExtractionMode::Lenient, NullDetector).unwrap();

    assert_eq!(extractor.extract(&html).unwrap(), "");
}

#[test]
fn test_boilerplate_only_page_is_not_found_in_strict_mode() {
    let html = fixture("empty.html");
    let extractor = Extractor::new(Some("article"), ExtractionMode::Strict, NullDetector).unwrap();

    assert!(matches!(
        extractor.extract(&html),
        Err(ExtractError::NotFound { .. })
    ));
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Broken</title><body><p>Unclosed tags<div>More content";
    let extractor = Extractor::new(None, ExtractionMode::Lenient, NullDetector).unwrap();

    assert_eq!(extractor.extract(html).unwrap(), "Broken\nUnclosed tags\nMore content");
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let extractor = Extractor::new(Some("article"), ExtractionMode::Lenient, ReadabilityDetector::new()).unwrap();
            let _ = extractor.extract(&html);
        }

        #[test]
        fn test_strip_output_has_clean_lines(html in ".*") {
            let text = strip_html(&html);
            for line in text.lines() {
                prop_assert!(!line.is_empty());
                prop_assert_eq!(line, line.trim());
            }
        }

        #[test]
        fn test_strip_idempotent_on_markup_and_entities(
            tokens in proptest::collection::vec(
                proptest::sample::select(vec![
                    "Овен", "неделя", "luck", " ", "\n", "<", ">", "&", ";",
                    "<p>", "</p>", "<b>", "</b>", "<nav>", "</nav>",
                    "&lt;", "&gt;", "&amp;", "&lt;b&gt;", "&lt;/b&gt;", "&lt;nav&gt;",
                ]),
                0..40,
            )
        ) {
            let html = tokens.concat();
            let once = strip_html(&html);
            prop_assert_eq!(strip_html(&once), once.clone());
        }
    }
}
