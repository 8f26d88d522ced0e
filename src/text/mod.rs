//! Text shaping: lays a string out on a shared baseline and rasterizes it into
//! a single [`PixelBuffer`].
//!
//! Glyph outlines, metrics and rasterization come from a [`GlyphSource`]. The
//! shaper only walks the metrics: it scales them from font design units to the
//! requested pixel height, rounds every advance and kerning step to whole
//! pixels, and places each glyph bitmap relative to the scaled ascent.

#[cfg(feature = "truetype")]
mod truetype;

#[cfg(feature = "truetype")]
pub use truetype::FontdueGlyphSource;

use crate::rendering::PixelBuffer;
use crate::{Error, Result};

/// Font-wide vertical metrics in design units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerticalMetrics {
    /// Distance above the baseline (positive)
    pub ascent: f32,
    /// Distance below the baseline (usually negative)
    pub descent: f32,
    pub line_gap: f32,
}

/// Per-glyph horizontal metrics in design units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HorizontalMetrics {
    pub advance_width: f32,
    pub left_side_bearing: f32,
}

/// A rasterized glyph coverage mask.
///
/// `left` and `top` place the bitmap relative to the pen position on the
/// baseline, with `top` growing downwards (so it is negative for glyphs that
/// rise above the baseline).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    pub coverage: Vec<u8>,
}

/// Provider of glyph metrics and bitmaps.
///
/// Characters the font can't represent return `None`.
pub trait GlyphSource {
    fn vertical_metrics(&self) -> VerticalMetrics;

    fn horizontal_metrics(&self, ch: char) -> Option<HorizontalMetrics>;

    /// Kerning adjustment between two adjacent characters, in design units
    fn kerning(&self, left: char, right: char) -> f32;

    /// Rasterize `ch` at `scale` pixels per design unit
    fn rasterize(&self, ch: char, scale: f32) -> Option<GlyphBitmap>;
}

/// Turns strings into tinted-ready white coverage buffers
pub struct TextShaper {
    glyphs: Box<dyn GlyphSource>,
}

impl std::fmt::Debug for TextShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextShaper")
            .field("metrics", &self.glyphs.vertical_metrics())
            .finish()
    }
}

impl TextShaper {
    pub fn new<G: GlyphSource + 'static>(glyphs: G) -> Self {
        Self {
            glyphs: Box::new(glyphs),
        }
    }

    /// Load a TrueType/OpenType font file.
    #[cfg(feature = "truetype")]
    pub fn from_font_file(path: &std::path::Path) -> Result<Self> {
        Ok(Self::new(FontdueGlyphSource::from_file(path)?))
    }

    /// Pixels per design unit so that ascent to descent spans `pixel_height`.
    pub fn scale(&self, pixel_height: u32) -> f32 {
        let metrics = self.glyphs.vertical_metrics();
        let span = metrics.ascent - metrics.descent;
        if span > 0.0 {
            pixel_height as f32 / span
        } else {
            0.0
        }
    }

    /// Rounded pen advance after `ch`, including kerning towards `next`.
    fn advance(&self, ch: char, next: Option<char>, scale: f32) -> Result<i32> {
        let metrics = self
            .glyphs
            .horizontal_metrics(ch)
            .ok_or(Error::UnsupportedCharacter(ch))?;
        let mut advance = (metrics.advance_width * scale).round() as i32;
        if let Some(next) = next {
            advance += (self.glyphs.kerning(ch, next) * scale).round() as i32;
        }
        Ok(advance)
    }

    /// Width in pixels that [`TextShaper::shape`] will produce for `text`.
    pub fn string_width(&self, text: &str, pixel_height: u32) -> Result<u32> {
        let scale = self.scale(pixel_height);
        let chars: Vec<char> = text.chars().collect();
        let mut width = 0i32;
        for (i, &ch) in chars.iter().enumerate() {
            width += self.advance(ch, chars.get(i + 1).copied(), scale)?;
        }
        Ok(width.max(0) as u32)
    }

    /// Rasterize `text` into a white buffer `string_width` wide and
    /// `pixel_height` tall, with glyph coverage in the alpha channel.
    pub fn shape(&self, text: &str, pixel_height: u32) -> Result<PixelBuffer> {
        let width = self.string_width(text, pixel_height)?;
        let mut out = PixelBuffer::new(width, pixel_height);

        let scale = self.scale(pixel_height);
        let ascent = (self.glyphs.vertical_metrics().ascent * scale).round() as i32;
        let chars: Vec<char> = text.chars().collect();

        let mut cursor = 0i32;
        // Rows lost when a glyph would start above the buffer
        let mut correction = 0i32;

        for (i, &ch) in chars.iter().enumerate() {
            let glyph = self
                .glyphs
                .rasterize(ch, scale)
                .ok_or(Error::UnsupportedCharacter(ch))?;

            let mut y = glyph.top + ascent;
            if y < 0 {
                correction = -y;
                y = 0;
            } else {
                y += correction;
            }

            if glyph.width > 0 && glyph.height > 0 {
                let bitmap = PixelBuffer::from_coverage(&glyph.coverage, glyph.width, glyph.height)?;
                out.composite(&bitmap, cursor, y);
            }

            cursor += self.advance(ch, chars.get(i + 1).copied(), scale)?;
        }

        Ok(out)
    }
}
