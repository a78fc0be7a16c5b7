use crate::fetcher::types::{Charset, PageResponse};
use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::{StatusCode, header::HeaderMap};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

/// Labels HTTP stacks report when the server sent no charset at all.
const UNRELIABLE_DECLARED: &[&str] = &[
    "iso-8859-1",
    "iso8859-1",
    "latin1",
    "latin-1",
    "l1",
    "us-ascii",
    "ascii",
    "windows-1252",
    "cp1252",
];

const SNIFF_WINDOW: usize = 4096;

pub fn process_response(
    url_final: Url,
    status: StatusCode,
    headers: HeaderMap,
    body_bytes: Bytes,
    content_type: Option<&str>,
) -> PageResponse {
    let (declared_charset, charset) = resolve_charset(content_type, &body_bytes);
    let (body_utf8, had_replacements) = decode_to_utf8(&body_bytes, &charset);

    if had_replacements {
        warn!(
            url = %url_final,
            charset = ?charset,
            "malformed byte sequences replaced while decoding"
        );
    }

    PageResponse {
        url_final,
        status,
        headers,
        body_raw: body_bytes,
        body_utf8,
        declared_charset,
        charset,
        had_replacements,
        fetched_at: Utc::now(),
    }
}

/// Returns the declared label (if any) and the charset actually used.
pub fn resolve_charset(content_type: Option<&str>, body_bytes: &[u8]) -> (Option<String>, Charset) {
    let declared = content_type
        .and_then(|ct| CHARSET_REGEX.captures(ct))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_lowercase());

    // 1. Trust an explicit, non-default Content-Type charset
    if let Some(label) = declared.as_deref()
        && !UNRELIABLE_DECLARED.contains(&label)
        && let Some(encoding) = Encoding::for_label(label.as_bytes())
    {
        return (declared, Charset::from_encoding(encoding));
    }

    if let Some(label) = declared.as_deref() {
        debug!(label, "ignoring default or unknown declared charset");
    }

    (declared, sniff_charset(body_bytes))
}

fn sniff_charset(body_bytes: &[u8]) -> Charset {
    // 2. Byte order mark
    if let Some((encoding, _)) = Encoding::for_bom(body_bytes) {
        return Charset::from_encoding(encoding);
    }

    // 3. In-document <meta> hints in the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(SNIFF_WINDOW)];
    let search_str = String::from_utf8_lossy(search_bytes);

    for regex in [&*META_CHARSET_REGEX, &*META_HTTP_EQUIV_REGEX] {
        if let Some(captures) = regex.captures(&search_str)
            && let Some(charset_str) = captures.get(1)
        {
            let charset_name = charset_str.as_str().to_lowercase();
            if let Some(encoding) = Encoding::for_label(charset_name.as_bytes()) {
                // A meta tag claiming UTF-16 means UTF-8 for an ASCII-compatible document
                return Charset::from_encoding(encoding.output_encoding());
            }
        }
    }

    // 4. Statistical detection over the whole body
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body_bytes, true);
    Charset::from_encoding(detector.guess(None, true))
}

fn decode_to_utf8(body_bytes: &[u8], charset: &Charset) -> (String, bool) {
    let (decoded, _encoding, had_errors) = charset.encoding().decode(body_bytes);
    (decoded.into_owned(), had_errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_charset_from_content_type() {
        let body = b"<html><head><title>Test</title></head></html>";

        let (declared, charset) = resolve_charset(Some("text/html; charset=utf-8"), body);
        assert_eq!(declared.as_deref(), Some("utf-8"));
        assert!(matches!(charset, Charset::Utf8));
    }

    #[test]
    fn test_detect_charset_from_meta_tag() {
        let body = b"<html><head><meta charset=\"windows-1251\"><title>Test</title></head></html>";

        let (declared, charset) = resolve_charset(Some("text/html"), body);
        assert!(declared.is_none());
        assert!(matches!(charset, Charset::Windows1251));
    }

    #[test]
    fn test_detect_charset_from_meta_http_equiv() {
        let body = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=koi8-r\"><title>Test</title></head></html>";

        let (_, charset) = resolve_charset(None, body);
        assert!(matches!(charset, Charset::Koi8R));
    }

    #[test]
    fn test_default_declared_charset_is_overridden_by_meta() {
        let body = "<html><head><meta charset=\"utf-8\"></head><body>Овен</body></html>";

        let (declared, charset) = resolve_charset(Some("text/html; charset=ISO-8859-1"), body.as_bytes());
        assert_eq!(declared.as_deref(), Some("iso-8859-1"));
        assert!(matches!(charset, Charset::Utf8));
    }

    #[test]
    fn test_meta_utf16_means_utf8() {
        let body = b"<html><head><meta charset=\"utf-16\"></head><body>plain</body></html>";

        let (_, charset) = resolve_charset(None, body);
        assert!(matches!(charset, Charset::Utf8));
    }

    #[test]
    fn test_undeclared_clean_utf8_has_no_replacements() {
        let body = "<html><body><p>Телец: неделя обещает быть спокойной. Звёзды благосклонны.</p></body></html>";

        let response = process_response(
            Url::parse("https://example.com").unwrap(),
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from(body),
            None,
        );

        assert!(matches!(response.charset, Charset::Utf8));
        assert!(!response.had_replacements);
        assert!(!response.body_utf8.contains('\u{FFFD}'));
        assert_eq!(response.body_utf8, body);
    }

    #[test]
    fn test_trusted_windows_1251() {
        // "Привет" in windows-1251
        let body = [0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];

        let (_, charset) = resolve_charset(Some("text/html; charset=windows-1251"), &body);
        let (decoded, had_errors) = decode_to_utf8(&body, &charset);
        assert_eq!(decoded, "Привет");
        assert!(!had_errors);
    }

    #[test]
    fn test_malformed_bytes_are_replaced_not_rejected() {
        let body = b"caf\xFF au lait";

        let (decoded, had_errors) = decode_to_utf8(body, &Charset::Utf8);
        assert!(had_errors);
        assert_eq!(decoded, "caf\u{FFFD} au lait");
    }
}
