//! `GlyphSource` backed by a TrueType/OpenType font parsed with `fontdue`

use super::{GlyphBitmap, GlyphSource, HorizontalMetrics, VerticalMetrics};
use crate::{Error, Result};
use fontdue::{Font, FontSettings};
use std::path::Path;

pub struct FontdueGlyphSource {
    font: Font,
    units_per_em: f32,
}

impl FontdueGlyphSource {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| Error::FontError(e.to_string()))?;
        let units_per_em = font.units_per_em();
        Ok(Self { font, units_per_em })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| Error::FontError(format!("Font {} failed to load: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }
}

// fontdue measures in pixels per em; asking for `units_per_em` pixels yields
// design units.
impl GlyphSource for FontdueGlyphSource {
    fn vertical_metrics(&self) -> VerticalMetrics {
        self.font
            .horizontal_line_metrics(self.units_per_em)
            .map(|m| VerticalMetrics {
                ascent: m.ascent,
                descent: m.descent,
                line_gap: m.line_gap,
            })
            .unwrap_or_default()
    }

    fn horizontal_metrics(&self, ch: char) -> Option<HorizontalMetrics> {
        if self.font.lookup_glyph_index(ch) == 0 {
            return None;
        }
        let metrics = self.font.metrics(ch, self.units_per_em);
        Some(HorizontalMetrics {
            advance_width: metrics.advance_width,
            left_side_bearing: metrics.bounds.xmin,
        })
    }

    fn kerning(&self, left: char, right: char) -> f32 {
        self.font
            .horizontal_kern(left, right, self.units_per_em)
            .unwrap_or(0.0)
    }

    fn rasterize(&self, ch: char, scale: f32) -> Option<GlyphBitmap> {
        if self.font.lookup_glyph_index(ch) == 0 {
            return None;
        }
        let (metrics, coverage) = self.font.rasterize(ch, scale * self.units_per_em);
        Some(GlyphBitmap {
            width: metrics.width as u32,
            height: metrics.height as u32,
            left: metrics.xmin,
            top: -(metrics.ymin + metrics.height as i32),
            coverage,
        })
    }
}
