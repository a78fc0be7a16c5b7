//! Configuration handling for the application.
//!
//! Everything is read from environment variables once at startup by
//! [`Config::from_env`] and then passed around explicitly. `from_lookup`
//! takes the same path with any key/value source, which keeps tests away from
//! the process environment.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::extractor::ExtractionMode;
use crate::keyphrase::DEFAULT_MAX_LEN;
use crate::render::DEFAULT_FOOTER;
use crate::source::SourceKind;

/// Environment variable names.
pub const ENV_TG_TOKEN: &str = "TG_TOKEN";
pub const ENV_TG_CHAT_ID: &str = "TG_CHAT_ID";
pub const ENV_SOURCE_URL: &str = "SOURCE_URL";
pub const ENV_SOURCE_TYPE: &str = "SOURCE_TYPE";
pub const ENV_CSS_SELECTOR: &str = "CSS_SELECTOR";
pub const ENV_ZODIAC_NAME: &str = "ZODIAC_NAME";
pub const ENV_POST_TITLE: &str = "POST_TITLE";
pub const ENV_ATTRIBUTION: &str = "ATTRIBUTION";
pub const ENV_STATE_FILE: &str = "STATE_FILE";
pub const ENV_EXTRACTION_MODE: &str = "EXTRACTION_MODE";
pub const ENV_MAIN_CONTENT_DETECTOR: &str = "MAIN_CONTENT_DETECTOR";
pub const ENV_TEXT_LIMIT: &str = "TEXT_LIMIT";
pub const ENV_KEYPHRASE_MAX_LEN: &str = "KEYPHRASE_MAX_LEN";
pub const ENV_FOOTER_TEXT: &str = "FOOTER_TEXT";
pub const ENV_FONT_PATH: &str = "FONT_PATH";
pub const ENV_FONT_BOLD_PATH: &str = "FONT_BOLD_PATH";
pub const ENV_TELEGRAM_API_BASE: &str = "TELEGRAM_API_BASE";

pub const ALL_KEYS: [&str; 17] = [
    ENV_TG_TOKEN,
    ENV_TG_CHAT_ID,
    ENV_SOURCE_URL,
    ENV_SOURCE_TYPE,
    ENV_CSS_SELECTOR,
    ENV_ZODIAC_NAME,
    ENV_POST_TITLE,
    ENV_ATTRIBUTION,
    ENV_STATE_FILE,
    ENV_EXTRACTION_MODE,
    ENV_MAIN_CONTENT_DETECTOR,
    ENV_TEXT_LIMIT,
    ENV_KEYPHRASE_MAX_LEN,
    ENV_FOOTER_TEXT,
    ENV_FONT_PATH,
    ENV_FONT_BOLD_PATH,
    ENV_TELEGRAM_API_BASE,
];

const DEFAULT_ZODIAC_NAME: &str = "Овен";
const DEFAULT_POST_TITLE: &str = "Еженедельный гороскоп: {zodiac}";
const DEFAULT_TEXT_LIMIT: usize = 2500;
const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectorKind {
    #[default]
    Readability,
    None,
}

/// Application runtime configuration. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    telegram_token: String,
    chat_id: String,
    source_url: String,
    source_kind: SourceKind,
    css_selector: Option<String>,
    zodiac_name: String,
    post_title: String,
    attribution: Option<String>,
    state_file: Option<PathBuf>,
    extraction_mode: ExtractionMode,
    detector: DetectorKind,
    text_limit: usize,
    keyphrase_max_len: usize,
    footer_text: String,
    font_path: Option<PathBuf>,
    font_bold_path: Option<PathBuf>,
    telegram_api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_token = get(ENV_TG_TOKEN);
        let chat_id = get(ENV_TG_CHAT_ID);
        let source_url = get(ENV_SOURCE_URL);

        let missing: Vec<&'static str> = [
            (ENV_TG_TOKEN, telegram_token.is_none()),
            (ENV_TG_CHAT_ID, chat_id.is_none()),
            (ENV_SOURCE_URL, source_url.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(telegram_token), Some(chat_id), Some(source_url)) =
            (telegram_token, chat_id, source_url)
        else {
            return Err(ConfigError::Missing(missing));
        };

        let source_kind = match get(ENV_SOURCE_TYPE) {
            Some(raw) => parse_source_kind(&raw)?,
            None => SourceKind::default(),
        };
        let extraction_mode = match get(ENV_EXTRACTION_MODE) {
            Some(raw) => parse_extraction_mode(&raw)?,
            None => ExtractionMode::default(),
        };
        let detector = match get(ENV_MAIN_CONTENT_DETECTOR) {
            Some(raw) => parse_detector(&raw)?,
            None => DetectorKind::default(),
        };

        let css_selector = get(ENV_CSS_SELECTOR);
        if source_kind == SourceKind::Html
            && extraction_mode == ExtractionMode::Strict
            && css_selector.is_none()
        {
            return Err(ConfigError::SelectorRequired);
        }

        let zodiac_name = get(ENV_ZODIAC_NAME).unwrap_or_else(|| DEFAULT_ZODIAC_NAME.to_string());
        let post_title = get(ENV_POST_TITLE)
            .unwrap_or_else(|| DEFAULT_POST_TITLE.to_string())
            .replace("{zodiac}", &zodiac_name);

        Ok(Self {
            telegram_token,
            chat_id,
            source_url,
            source_kind,
            css_selector,
            zodiac_name,
            post_title,
            attribution: get(ENV_ATTRIBUTION),
            state_file: get(ENV_STATE_FILE).map(PathBuf::from),
            extraction_mode,
            detector,
            text_limit: parse_positive(ENV_TEXT_LIMIT, get(ENV_TEXT_LIMIT), DEFAULT_TEXT_LIMIT)?,
            keyphrase_max_len: parse_positive(
                ENV_KEYPHRASE_MAX_LEN,
                get(ENV_KEYPHRASE_MAX_LEN),
                DEFAULT_MAX_LEN,
            )?,
            footer_text: lookup(ENV_FOOTER_TEXT).unwrap_or_else(|| DEFAULT_FOOTER.to_string()),
            font_path: get(ENV_FONT_PATH).map(PathBuf::from),
            font_bold_path: get(ENV_FONT_BOLD_PATH).map(PathBuf::from),
            telegram_api_base: get(ENV_TELEGRAM_API_BASE)
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
        })
    }

    /// Bot API token.
    pub fn telegram_token(&self) -> &str {
        &self.telegram_token
    }
    /// `@channel` handle or numeric `-100…` id.
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
    pub fn source_url(&self) -> &str {
        &self.source_url
    }
    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }
    pub fn css_selector(&self) -> Option<&str> {
        self.css_selector.as_deref()
    }
    pub fn zodiac_name(&self) -> &str {
        &self.zodiac_name
    }
    /// Header with `{zodiac}` already substituted.
    pub fn post_title(&self) -> &str {
        &self.post_title
    }
    pub fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }
    /// `None` disables deduplication.
    pub fn state_file(&self) -> Option<&PathBuf> {
        self.state_file.as_ref()
    }
    pub fn extraction_mode(&self) -> ExtractionMode {
        self.extraction_mode
    }
    pub fn detector(&self) -> DetectorKind {
        self.detector
    }
    pub fn text_limit(&self) -> usize {
        self.text_limit
    }
    pub fn keyphrase_max_len(&self) -> usize {
        self.keyphrase_max_len
    }
    pub fn footer_text(&self) -> &str {
        &self.footer_text
    }
    pub fn font_path(&self) -> Option<&PathBuf> {
        self.font_path.as_ref()
    }
    pub fn font_bold_path(&self) -> Option<&PathBuf> {
        self.font_bold_path.as_ref()
    }
    pub fn telegram_api_base(&self) -> &str {
        &self.telegram_api_base
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("source_url", &self.source_url)
            .field("source_kind", &self.source_kind)
            .field("css_selector", &self.css_selector)
            .field("zodiac_name", &self.zodiac_name)
            .field("post_title", &self.post_title)
            .field("attribution", &self.attribution)
            .field("state_file", &self.state_file)
            .field("extraction_mode", &self.extraction_mode)
            .field("detector", &self.detector)
            .field("text_limit", &self.text_limit)
            .field("keyphrase_max_len", &self.keyphrase_max_len)
            .field("footer_text", &self.footer_text)
            .field("font_path", &self.font_path)
            .field("font_bold_path", &self.font_bold_path)
            .field("telegram_api_base", &self.telegram_api_base)
            .finish()
    }
}

fn parse_source_kind(raw: &str) -> Result<SourceKind, ConfigError> {
    match raw.to_ascii_uppercase().as_str() {
        "HTML" => Ok(SourceKind::Html),
        "RSS" => Ok(SourceKind::Rss),
        _ => Err(ConfigError::invalid(ENV_SOURCE_TYPE, format!("expected HTML or RSS, got {raw:?}"))),
    }
}

fn parse_extraction_mode(raw: &str) -> Result<ExtractionMode, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "strict" => Ok(ExtractionMode::Strict),
        "lenient" => Ok(ExtractionMode::Lenient),
        _ => Err(ConfigError::invalid(
            ENV_EXTRACTION_MODE,
            format!("expected strict or lenient, got {raw:?}"),
        )),
    }
}

fn parse_detector(raw: &str) -> Result<DetectorKind, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "readability" => Ok(DetectorKind::Readability),
        "none" | "off" => Ok(DetectorKind::None),
        _ => Err(ConfigError::invalid(
            ENV_MAIN_CONTENT_DETECTOR,
            format!("expected readability or none, got {raw:?}"),
        )),
    }
}

fn parse_positive(field: &'static str, raw: Option<String>, default: usize) -> Result<usize, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match usize::from_str(&raw) {
        Ok(0) => Err(ConfigError::invalid(field, "must be greater than zero")),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::invalid(field, e.to_string())),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required settings: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("CSS_SELECTOR is required for HTML sources in strict mode")]
    SelectorRequired,

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
