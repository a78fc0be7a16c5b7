/// Bodies shorter than this are treated as a failed scrape.
pub const MIN_BODY_CHARS: usize = 30;

pub fn is_too_short(text: &str) -> bool {
    text.trim().chars().count() < MIN_BODY_CHARS
}
