//! Resampling capability used by `PixelBuffer::resize`

use crate::rendering::buffer::Pixel;
use image::imageops::{self, FilterType};
use image::Rgba32FImage;

/// Something that can resample a pixel grid to new dimensions.
///
/// Returning `None` signals failure; the caller keeps its original data.
pub trait Resampler {
    fn resize(
        &self,
        pixels: &[Pixel],
        width: u32,
        height: u32,
        new_width: u32,
        new_height: u32,
    ) -> Option<Vec<Pixel>>;
}

/// sRGB-aware resampler backed by `image::imageops`.
///
/// Colour channels are converted to linear light and premultiplied by alpha
/// before filtering, then converted back.
#[derive(Debug, Clone, Copy)]
pub struct FilterResampler {
    filter: FilterType,
}

impl FilterResampler {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Default for FilterResampler {
    fn default() -> Self {
        Self::new(FilterType::CatmullRom)
    }
}

impl Resampler for FilterResampler {
    fn resize(
        &self,
        pixels: &[Pixel],
        width: u32,
        height: u32,
        new_width: u32,
        new_height: u32,
    ) -> Option<Vec<Pixel>> {
        if width == 0 || height == 0 || new_width == 0 || new_height == 0 {
            return None;
        }
        if pixels.len() != width as usize * height as usize {
            return None;
        }

        let mut raw = Vec::with_capacity(pixels.len() * 4);
        for p in pixels {
            let a = p.a.clamp(0.0, 1.0);
            raw.extend_from_slice(&[
                srgb_to_linear(p.r) * a,
                srgb_to_linear(p.g) * a,
                srgb_to_linear(p.b) * a,
                a,
            ]);
        }
        let source = Rgba32FImage::from_raw(width, height, raw)?;
        let resized = imageops::resize(&source, new_width, new_height, self.filter);

        Some(
            resized
                .pixels()
                .map(|px| {
                    let [r, g, b, a] = px.0;
                    let a = a.clamp(0.0, 1.0);
                    if a > 0.0 {
                        Pixel::rgba(
                            linear_to_srgb(r / a),
                            linear_to_srgb(g / a),
                            linear_to_srgb(b / a),
                            a,
                        )
                    } else {
                        Pixel::TRANSPARENT
                    }
                })
                .collect(),
        )
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
