//! The fixed-layout horoscope card.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use bytes::Bytes;
use image::{Rgb, RgbImage, codecs::jpeg::JpegEncoder};
use imageproc::drawing::{draw_text_mut, text_size};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub const WIDTH: u32 = 1024;
pub const HEIGHT: u32 = 1024;
pub const JPEG_QUALITY: u8 = 90;
pub const DEFAULT_FOOTER: &str = "by @your_bot";

const TITLE_PX: f32 = 72.0;
const BODY_PX: f32 = 42.0;
const TITLE_TOP: i32 = 90;
const LINE_SPACING: u32 = 6;
const WRAP_WIDTH: usize = 26;
const FOOTER_MARGIN: i32 = 30;

const TITLE_COLOR: Rgb<u8> = Rgb([240, 230, 255]);
const BODY_COLOR: Rgb<u8> = Rgb([245, 245, 250]);
const FOOTER_COLOR: Rgb<u8> = Rgb([220, 210, 235]);

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "DejaVuSans.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "DejaVuSans-Bold.ttf",
];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

pub struct CardFonts {
    title: FontArc,
    body: FontArc,
}

impl CardFonts {
    /// Explicit paths first, then the usual DejaVu locations. A missing bold
    /// face reuses the regular one.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Option<Self> {
        let body = load_first(regular, REGULAR_CANDIDATES)?;
        let title = load_first(bold, BOLD_CANDIDATES).unwrap_or_else(|| body.clone());
        Some(Self { title, body })
    }
}

fn load_first(explicit: Option<&Path>, candidates: &[&str]) -> Option<FontArc> {
    explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(candidates.iter().map(PathBuf::from))
        .find_map(|path| {
            let bytes = fs::read(&path).ok()?;
            match FontArc::try_from_vec(bytes) {
                Ok(font) => {
                    debug!(path = %path.display(), "font loaded");
                    Some(font)
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "not a usable font");
                    None
                }
            }
        })
}

pub struct CardRenderer {
    fonts: Option<CardFonts>,
    footer: String,
}

impl CardRenderer {
    pub fn new(fonts: Option<CardFonts>, footer: impl Into<String>) -> Self {
        if fonts.is_none() {
            warn!("no font available, cards will be rendered without text");
        }
        Self {
            fonts,
            footer: footer.into(),
        }
    }

    #[instrument(skip_all, fields(topic = %topic))]
    pub fn render(&self, topic: &str, keyphrase: &str) -> Result<RenderedImage, RenderError> {
        let mut canvas = gradient();

        if let Some(fonts) = &self.fonts {
            let title = format!("{topic} — Гороскоп недели");
            draw_title(&mut canvas, &fonts.title, &title);
            draw_keyphrase(&mut canvas, &fonts.body, keyphrase);
            draw_footer(&mut canvas, &fonts.body, &self.footer);
        }

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(&canvas)?;
        debug!(bytes = buf.len(), "card encoded");

        Ok(RenderedImage {
            bytes: Bytes::from(buf),
            width: WIDTH,
            height: HEIGHT,
        })
    }
}

fn gradient() -> RgbImage {
    RgbImage::from_fn(WIDTH, HEIGHT, |_, y| {
        let c = 35 + 60 * y / HEIGHT;
        Rgb([c as u8, 20, 80])
    })
}

fn centered_x(text_width: u32) -> i32 {
    ((WIDTH as i32 - text_width as i32) / 2).max(0)
}

fn draw_title(canvas: &mut RgbImage, font: &FontArc, title: &str) {
    let scale = PxScale::from(TITLE_PX);
    let (w, _) = text_size(scale, font, title);
    draw_text_mut(canvas, TITLE_COLOR, centered_x(w), TITLE_TOP, scale, font, title);
}

fn draw_keyphrase(canvas: &mut RgbImage, font: &FontArc, keyphrase: &str) {
    let scale = PxScale::from(BODY_PX);
    let line_height = font.as_scaled(scale).height().ceil() as u32;
    let lines = wrap_words(keyphrase, WRAP_WIDTH);
    if lines.is_empty() {
        return;
    }

    let block_height = lines.len() as u32 * line_height + (lines.len() as u32 - 1) * LINE_SPACING;
    let mut y = ((HEIGHT as i32 - block_height as i32) / 2).max(0);

    for line in &lines {
        let (w, _) = text_size(scale, font, line);
        draw_text_mut(canvas, BODY_COLOR, centered_x(w), y, scale, font, line);
        y += (line_height + LINE_SPACING) as i32;
    }
}

fn draw_footer(canvas: &mut RgbImage, font: &FontArc, footer: &str) {
    if footer.is_empty() {
        return;
    }
    let scale = PxScale::from(BODY_PX);
    let (w, h) = text_size(scale, font, footer);
    let x = WIDTH as i32 - w as i32 - FOOTER_MARGIN;
    let y = HEIGHT as i32 - h as i32 - FOOTER_MARGIN;
    draw_text_mut(canvas, FOOTER_COLOR, x.max(0), y.max(0), scale, font, footer);
}

/// Greedy wrap to `width` chars per line. Whitespace collapses; words longer
/// than a line are split.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(width) {
            let piece: String = chunk.iter().collect();
            if current_len == 0 {
                current = piece;
                current_len = chunk.len();
            } else if current_len + 1 + chunk.len() <= width {
                current.push(' ');
                current.push_str(&piece);
                current_len += 1 + chunk.len();
            } else {
                lines.push(std::mem::replace(&mut current, piece));
                current_len = chunk.len();
            }
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}
