//! Translation overlay rendering
//!
//! Draws translated text onto a copy of the source image using a
//! deterministic bottom-up line layout: the last line's baseline sits a
//! fixed margin above the bottom edge and earlier lines step upward by
//! 1.2x the font size. Each glyph run is stroked in black first and then
//! filled in gold so the text stays legible against arbitrary backgrounds.

use ab_glyph::{FontVec, PxScale};
use image::Rgb;
use imageproc::drawing::{draw_text_mut, text_size};

use crate::error::{LenslateError, Result};
use crate::imaging::codec::{self, TransportImage};

/// Fill color for overlay text (gold)
const FILL_COLOR: Rgb<u8> = Rgb([255, 215, 0]);

/// Stroke color for the legibility outline
const STROKE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Outline offset in pixels
const STROKE_WIDTH: i32 = 2;

/// Distance of the last line's baseline from the bottom edge
const BOTTOM_MARGIN: f32 = 10.0;

/// Line height as a multiple of the font size
const LINE_SPACING: f32 = 1.2;

/// Smallest font size used regardless of image height
const MIN_FONT_SIZE: f32 = 16.0;

/// Image height is divided by this to derive the font size
const FONT_HEIGHT_DIVISOR: f32 = 20.0;

/// JPEG quality of the rendered overlay image
const OVERLAY_JPEG_QUALITY: u8 = 90;

/// A single laid-out line of overlay text
#[derive(Debug, Clone, PartialEq)]
pub struct LinePlacement {
    /// Text of this line (may be empty for blank source lines)
    pub text: String,
    /// Baseline y position in pixels, measured from the top edge
    pub baseline_y: f32,
}

/// The computed layout for a block of overlay text
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// Font size in pixels
    pub font_size: f32,
    /// Vertical step between consecutive baselines
    pub line_height: f32,
    /// Lines in source order, top to bottom
    pub lines: Vec<LinePlacement>,
}

/// Compute the overlay layout for the given image height and text
///
/// The font size is `max(16, height / 20)`. Lines are anchored bottom-up:
/// the last line's baseline is `height - 10` and each preceding line steps
/// upward by `1.2 * font_size`. Pure and deterministic.
///
/// # Examples
///
/// ```
/// use lenslate::imaging::overlay::layout_lines;
///
/// let layout = layout_lines(400, "HELLO\nWORLD");
/// assert_eq!(layout.font_size, 20.0);
/// assert_eq!(layout.lines[1].baseline_y, 390.0);
/// assert_eq!(layout.lines[0].baseline_y, 366.0);
/// ```
pub fn layout_lines(height: u32, text: &str) -> TextLayout {
    let font_size = (height as f32 / FONT_HEIGHT_DIVISOR).max(MIN_FONT_SIZE);
    let line_height = LINE_SPACING * font_size;
    let baseline = height as f32 - BOTTOM_MARGIN;

    let raw_lines: Vec<&str> = text.split('\n').collect();
    let count = raw_lines.len();
    let lines = raw_lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| LinePlacement {
            text: line.to_string(),
            baseline_y: baseline - (count - 1 - i) as f32 * line_height,
        })
        .collect();

    TextLayout {
        font_size,
        line_height,
        lines,
    }
}

/// Renders translated text onto images
///
/// Holds the parsed overlay font. Rendering is a pure function of the
/// renderer's font and its inputs: identical inputs produce byte-identical
/// output.
pub struct OverlayRenderer {
    font: FontVec,
}

impl OverlayRenderer {
    /// Create a renderer from raw TTF/OTF font bytes
    ///
    /// # Errors
    ///
    /// Returns error if the bytes do not parse as a font.
    pub fn new(font_bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(font_bytes)
            .map_err(|e| LenslateError::Config(format!("failed to parse overlay font: {}", e)))?;
        Ok(Self { font })
    }

    /// Create a renderer from a font file on disk
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_font_path(path: &str) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| LenslateError::Config(format!("failed to read font {}: {}", path, e)))?;
        Self::new(bytes)
    }

    /// Draw `text` onto a copy of `image` and return the result
    ///
    /// Lines are centered horizontally and laid out bottom-up per
    /// [`layout_lines`]. Each run is stroked then filled.
    ///
    /// # Errors
    ///
    /// Returns `RenderFailed` if the image cannot be decoded. Callers treat
    /// this as a degrade condition, not an abort.
    pub fn render(&self, image: &TransportImage, text: &str) -> Result<TransportImage> {
        let source = codec::decode(image)
            .map_err(|e| LenslateError::RenderFailed(format!("cannot decode source: {}", e)))?;
        let mut canvas = source.to_rgb8();

        let layout = layout_lines(canvas.height(), text);
        let scale = PxScale::from(layout.font_size);

        for line in &layout.lines {
            if line.text.is_empty() {
                continue;
            }
            let (text_width, text_height) = text_size(scale, &self.font, &line.text);
            let x = (canvas.width() as i32 - text_width as i32) / 2;
            let top = line.baseline_y.round() as i32 - text_height as i32;

            for dy in [-STROKE_WIDTH, 0, STROKE_WIDTH] {
                for dx in [-STROKE_WIDTH, 0, STROKE_WIDTH] {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    draw_text_mut(
                        &mut canvas,
                        STROKE_COLOR,
                        x + dx,
                        top + dy,
                        scale,
                        &self.font,
                        &line.text,
                    );
                }
            }
            draw_text_mut(&mut canvas, FILL_COLOR, x, top, scale, &self.font, &line.text);
        }

        let bytes = codec::encode_jpeg(&canvas, OVERLAY_JPEG_QUALITY)?;
        Ok(codec::encode(&bytes))
    }
}
