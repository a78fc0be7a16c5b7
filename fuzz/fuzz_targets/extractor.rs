#![no_main]

use libfuzzer_sys::fuzz_target;

use horocast::extractor::{ExtractionMode, Extractor, ReadabilityDetector, strip_html};
use horocast::keyphrase::pick_keyphrase;

fuzz_target!(|data: &[u8]| {
    // Convert raw bytes to string, handling invalid UTF-8 gracefully
    let html = String::from_utf8_lossy(data);

    let extractor = Extractor::new(Some("article"), ExtractionMode::Lenient, ReadabilityDetector::new())
        .expect("static selector parses");

    // Neither the extractor chain nor the keyphrase cut may panic
    if let Ok(text) = extractor.extract(&html) {
        let phrase = pick_keyphrase(&text, 130);
        assert!(phrase.chars().count() <= 130);
    }

    let stripped = strip_html(&html);
    assert!(stripped.lines().all(|line| !line.is_empty() && line == line.trim()));
});
