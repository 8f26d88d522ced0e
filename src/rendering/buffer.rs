//! Floating point RGBA pixel buffers and the compositing operations on them.
//!
//! A [`PixelBuffer`] is a row-major grid of [`Pixel`]s with its origin in the
//! top-left corner. Every operation that takes an offset clamps the affected
//! rectangle to the buffer, so content hanging off an edge is cropped rather
//! than treated as an error.

use crate::rendering::resample::{FilterResampler, Resampler};
use crate::{Error, Result};

/// A single RGBA pixel with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pixel {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Pixel {
    /// Fully transparent black
    pub const TRANSPARENT: Pixel = Pixel::rgba(0.0, 0.0, 0.0, 0.0);
    /// Opaque white, the default text colour
    pub const WHITE: Pixel = Pixel::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channel-wise comparison with an epsilon tolerance
    pub fn approx_eq(&self, other: &Pixel) -> bool {
        (self.r - other.r).abs() < f32::EPSILON
            && (self.g - other.g).abs() < f32::EPSILON
            && (self.b - other.b).abs() < f32::EPSILON
            && (self.a - other.a).abs() < f32::EPSILON
    }

    /// Draw `src` over this pixel.
    ///
    /// An exactly opaque source replaces the pixel. Otherwise source-over
    /// blending is applied; when the resulting alpha is zero the pixel keeps
    /// its current value.
    pub fn blend(&mut self, src: &Pixel) {
        if src.a == 1.0 {
            *self = *src;
            return;
        }

        let out_a = src.a + self.a * (1.0 - src.a);
        if out_a > 0.0 {
            let dst_weight = self.a * (1.0 - src.a);
            self.r = (src.r * src.a + self.r * dst_weight) / out_a;
            self.g = (src.g * src.a + self.g * dst_weight) / out_a;
            self.b = (src.b * src.a + self.b * dst_weight) / out_a;
            self.a = out_a;
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
            channel_to_u8(self.a),
        ]
    }
}

fn channel_to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Clamp the span `offset..offset + len` to `0..bound`.
fn clamp_span(offset: i64, len: i64, bound: i64) -> Option<(usize, usize)> {
    let start = offset.max(0);
    let end = (offset + len).min(bound);
    (start < end).then_some((start as usize, end as usize))
}

/// A rectangular grid of RGBA pixels
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl PixelBuffer {
    /// A fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Pixel::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width as usize * height as usize],
        }
    }

    /// Build a buffer from 8-bit samples with 1 (grey), 2 (grey + alpha),
    /// 3 (RGB) or 4 (RGBA) interleaved channels.
    pub fn from_samples(samples: &[u8], width: u32, height: u32, channels: u8) -> Result<Self> {
        if !(1..=4).contains(&channels) {
            return Err(Error::InvalidInput(format!(
                "{} channels per pixel is not supported",
                channels
            )));
        }
        let count = width as usize * height as usize;
        let stride = channels as usize;
        if samples.len() < count * stride {
            return Err(Error::InvalidInput(format!(
                "expected {} samples for a {}x{} image with {} channels, got {}",
                count * stride,
                width,
                height,
                channels,
                samples.len()
            )));
        }

        // Grey sources read green and blue from the grey sample
        let colour_step = (stride - 1) / 2;
        let g_at = colour_step;
        let b_at = colour_step * 2;
        let a_at = stride - 1;
        let has_alpha = channels == 2 || channels == 4;

        let pixels = samples
            .chunks_exact(stride)
            .take(count)
            .map(|px| Pixel {
                r: px[0] as f32 / 255.0,
                g: px[g_at] as f32 / 255.0,
                b: px[b_at] as f32 / 255.0,
                a: if has_alpha { px[a_at] as f32 / 255.0 } else { 1.0 },
            })
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a white buffer whose alpha comes from a single-channel coverage
    /// mask, as produced by a glyph rasterizer.
    pub fn from_coverage(mask: &[u8], width: u32, height: u32) -> Result<Self> {
        let count = width as usize * height as usize;
        if mask.len() < count {
            return Err(Error::InvalidInput(format!(
                "expected {} coverage samples for a {}x{} mask, got {}",
                count,
                width,
                height,
                mask.len()
            )));
        }

        let pixels = mask[..count]
            .iter()
            .map(|&c| Pixel::rgba(1.0, 1.0, 1.0, c as f32 / 255.0))
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x as usize, y as usize))
    }

    pub fn set(&mut self, x: u32, y: u32, pixel: Pixel) {
        if x < self.width && y < self.height {
            let i = self.index(x as usize, y as usize);
            self.pixels[i] = pixel;
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width as usize + x
    }

    /// Interleaved 8-bit RGBA samples, rounded to nearest
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_rgba8()).collect()
    }

    /// Draw `other` onto this buffer with its top-left corner at `(dx, dy)`.
    pub fn composite(&mut self, other: &PixelBuffer, dx: i32, dy: i32) {
        let Some((x0, x1)) = clamp_span(dx as i64, other.width as i64, self.width as i64) else {
            return;
        };
        let Some((y0, y1)) = clamp_span(dy as i64, other.height as i64, self.height as i64) else {
            return;
        };

        for y in y0..y1 {
            let sy = (y as i64 - dy as i64) as usize;
            for x in x0..x1 {
                let sx = (x as i64 - dx as i64) as usize;
                let src = other.pixels[other.index(sx, sy)];
                let i = self.index(x, y);
                self.pixels[i].blend(&src);
            }
        }
    }

    /// Resample to `width` x `height` with the default sRGB-aware filter.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.resize_with(&FilterResampler::default(), width, height)
    }

    /// Resample with a caller-provided resampler. On failure the buffer is
    /// left untouched.
    pub fn resize_with(&mut self, resampler: &dyn Resampler, width: u32, height: u32) -> Result<()> {
        let resized = resampler
            .resize(&self.pixels, self.width, self.height, width, height)
            .filter(|p| p.len() == width as usize * height as usize)
            .ok_or_else(|| {
                Error::ResizeError(format!(
                    "resampler returned no data for {}x{} -> {}x{}",
                    self.width, self.height, width, height
                ))
            })?;

        self.width = width;
        self.height = height;
        self.pixels = resized;
        Ok(())
    }

    /// Scale both dimensions by `factor`, rounding to the nearest pixel.
    pub fn scale_by(&mut self, factor: f32) -> Result<()> {
        if factor == 0.0 || !factor.is_finite() || factor < 0.0 {
            return Err(Error::InvalidInput(format!(
                "can't scale with a factor of {}",
                factor
            )));
        }
        let width = (self.width as f32 * factor).round() as u32;
        let height = (self.height as f32 * factor).round() as u32;
        self.resize(width, height)
    }

    /// Resize to `width`, keeping the aspect ratio.
    pub fn resize_to_width(&mut self, width: u32) -> Result<()> {
        if self.width == 0 {
            return Err(Error::InvalidInput(
                "can't keep the aspect ratio of a zero-width buffer".into(),
            ));
        }
        let height = (self.height as f64 * width as f64 / self.width as f64).round() as u32;
        self.resize(width, height)
    }

    /// Resize to `height`, keeping the aspect ratio.
    pub fn resize_to_height(&mut self, height: u32) -> Result<()> {
        if self.height == 0 {
            return Err(Error::InvalidInput(
                "can't keep the aspect ratio of a zero-height buffer".into(),
            ));
        }
        let width = (self.width as f64 * height as f64 / self.height as f64).round() as u32;
        self.resize(width, height)
    }

    /// Overwrite the colour of every pixel, keeping coverage unless
    /// `include_alpha` is set.
    pub fn change_color(&mut self, color: Pixel, include_alpha: bool) {
        for p in &mut self.pixels {
            p.r = color.r;
            p.g = color.g;
            p.b = color.b;
            if include_alpha {
                p.a = color.a;
            }
        }
    }

    /// Zero every channel inside the rectangle, clamped to the buffer.
    pub fn erase_region(&mut self, width: i32, height: i32, dx: i32, dy: i32) {
        let Some((x0, x1)) = clamp_span(dx as i64, width as i64, self.width as i64) else {
            return;
        };
        let Some((y0, y1)) = clamp_span(dy as i64, height as i64, self.height as i64) else {
            return;
        };

        for y in y0..y1 {
            let row = self.index(0, y);
            self.pixels[row + x0..row + x1].fill(Pixel::TRANSPARENT);
        }
    }

    /// Copy the `width` x `height` rectangle at `(dx, dy)` into a new buffer.
    /// Parts of the rectangle outside this buffer stay transparent.
    pub fn copy_section(&self, width: u32, height: u32, dx: i32, dy: i32) -> PixelBuffer {
        let mut section = PixelBuffer::new(width, height);
        let Some((x0, x1)) = clamp_span(dx as i64, width as i64, self.width as i64) else {
            return section;
        };
        let Some((y0, y1)) = clamp_span(dy as i64, height as i64, self.height as i64) else {
            return section;
        };

        for y in y0..y1 {
            let ty = (y as i64 - dy as i64) as usize;
            for x in x0..x1 {
                let tx = (x as i64 - dx as i64) as usize;
                let i = section.index(tx, ty);
                section.pixels[i] = self.pixels[self.index(x, y)];
            }
        }
        section
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Pixel = Pixel::rgba(1.0, 0.0, 0.0, 1.0);
    const GREEN: Pixel = Pixel::rgba(0.0, 1.0, 0.0, 1.0);

    #[test]
    fn new_buffer_is_transparent() {
        let b = PixelBuffer::new(4, 4);
        assert_eq!(b.pixels().len(), 16);
        assert!(b.pixels().iter().all(|p| p.approx_eq(&Pixel::TRANSPARENT)));
    }

    #[test]
    fn samples_convert_per_channel_count() {
        let grey = PixelBuffer::from_samples(&[51], 1, 1, 1).unwrap();
        assert_eq!(*grey.get(0, 0).unwrap(), Pixel::rgba(0.2, 0.2, 0.2, 1.0));

        let grey_alpha = PixelBuffer::from_samples(&[255, 0], 1, 1, 2).unwrap();
        assert_eq!(*grey_alpha.get(0, 0).unwrap(), Pixel::rgba(1.0, 1.0, 1.0, 0.0));

        let rgb = PixelBuffer::from_samples(&[255, 0, 255], 1, 1, 3).unwrap();
        assert_eq!(*rgb.get(0, 0).unwrap(), Pixel::rgba(1.0, 0.0, 1.0, 1.0));

        let rgba = PixelBuffer::from_samples(&[0, 255, 0, 0], 1, 1, 4).unwrap();
        assert_eq!(*rgba.get(0, 0).unwrap(), Pixel::rgba(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn samples_reject_bad_input() {
        assert!(PixelBuffer::from_samples(&[0; 5], 1, 1, 5).is_err());
        assert!(PixelBuffer::from_samples(&[0; 3], 2, 1, 4).is_err());
    }

    #[test]
    fn coverage_mask_is_white_with_alpha() {
        let b = PixelBuffer::from_coverage(&[0, 255], 2, 1).unwrap();
        assert_eq!(*b.get(0, 0).unwrap(), Pixel::rgba(1.0, 1.0, 1.0, 0.0));
        assert_eq!(*b.get(1, 0).unwrap(), Pixel::WHITE);
    }

    #[test]
    fn opaque_composite_replaces_and_is_idempotent() {
        let mut once = PixelBuffer::filled(4, 4, RED);
        let patch = PixelBuffer::filled(2, 2, GREEN);
        once.composite(&patch, 1, 1);
        let mut twice = once.clone();
        twice.composite(&patch, 1, 1);
        assert_eq!(once, twice);
        assert_eq!(*once.get(1, 1).unwrap(), GREEN);
        assert_eq!(*once.get(2, 2).unwrap(), GREEN);
        assert_eq!(*once.get(0, 0).unwrap(), RED);
        assert_eq!(*once.get(3, 3).unwrap(), RED);
    }

    #[test]
    fn transparent_composite_leaves_destination() {
        let mut b = PixelBuffer::filled(3, 3, RED);
        let before = b.clone();
        b.composite(&PixelBuffer::new(3, 3), 0, 0);
        assert_eq!(b, before);
    }

    #[test]
    fn half_alpha_blends_over_opaque() {
        let mut b = PixelBuffer::filled(1, 1, RED);
        b.composite(&PixelBuffer::filled(1, 1, Pixel::rgba(0.0, 0.0, 1.0, 0.5)), 0, 0);
        let p = b.get(0, 0).unwrap();
        assert!((p.r - 0.5).abs() < 1e-6);
        assert!((p.b - 0.5).abs() < 1e-6);
        assert!((p.a - 1.0).abs() < 1e-6);
    }

    #[test]
    fn blending_onto_empty_keeps_source_colour() {
        let mut b = PixelBuffer::new(1, 1);
        b.composite(&PixelBuffer::filled(1, 1, Pixel::rgba(0.2, 0.4, 0.6, 0.5)), 0, 0);
        let p = b.get(0, 0).unwrap();
        assert!((p.r - 0.2).abs() < 1e-6);
        assert!((p.g - 0.4).abs() < 1e-6);
        assert!((p.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn composite_crops_off_canvas_content() {
        let mut b = PixelBuffer::filled(4, 4, RED);
        b.composite(&PixelBuffer::filled(3, 3, GREEN), -1, 2);
        assert_eq!(*b.get(0, 2).unwrap(), GREEN);
        assert_eq!(*b.get(1, 3).unwrap(), GREEN);
        assert_eq!(*b.get(2, 2).unwrap(), RED);
        assert_eq!(*b.get(0, 1).unwrap(), RED);

        // Entirely outside
        let before = b.clone();
        b.composite(&PixelBuffer::filled(2, 2, GREEN), 10, -10);
        assert_eq!(b, before);
    }

    #[test]
    fn erase_bottom_half() {
        let mut b = PixelBuffer::filled(4, 4, RED);
        b.erase_region(4, 2, 0, 2);
        for (i, p) in b.pixels().iter().enumerate() {
            if i < 8 {
                assert_eq!(*p, RED);
            } else {
                assert_eq!(*p, Pixel::TRANSPARENT);
            }
        }
    }

    #[test]
    fn erase_clamps_negative_offsets() {
        let mut b = PixelBuffer::filled(4, 4, RED);
        b.erase_region(3, 3, -1, -1);
        assert_eq!(*b.get(0, 0).unwrap(), Pixel::TRANSPARENT);
        assert_eq!(*b.get(1, 1).unwrap(), Pixel::TRANSPARENT);
        assert_eq!(*b.get(2, 0).unwrap(), RED);
        assert_eq!(*b.get(0, 2).unwrap(), RED);
        // Negative sizes erase nothing
        b.erase_region(-4, 4, 2, 0);
        assert_eq!(*b.get(3, 3).unwrap(), RED);
    }

    #[test]
    fn copy_section_pads_outside_with_transparent() {
        let mut b = PixelBuffer::filled(4, 4, RED);
        b.set(3, 3, GREEN);
        let s = b.copy_section(2, 2, 3, 3);
        assert_eq!(s.width(), 2);
        assert_eq!(s.height(), 2);
        assert_eq!(*s.get(0, 0).unwrap(), GREEN);
        assert_eq!(*s.get(1, 0).unwrap(), Pixel::TRANSPARENT);
        assert_eq!(*s.get(0, 1).unwrap(), Pixel::TRANSPARENT);
    }

    #[test]
    fn copy_then_composite_restores_erased_region() {
        let mut b = PixelBuffer::new(5, 5);
        for y in 0..5 {
            for x in 0..5 {
                b.set(x, y, Pixel::rgba(x as f32 / 4.0, y as f32 / 4.0, 0.5, 1.0));
            }
        }
        let original = b.clone();
        let section = b.copy_section(3, 2, 1, 2);
        b.erase_region(3, 2, 1, 2);
        assert_ne!(b, original);
        b.composite(&section, 1, 2);
        assert_eq!(b, original);
    }

    #[test]
    fn change_color_keeps_alpha_by_default() {
        let mut b = PixelBuffer::from_coverage(&[128], 1, 1).unwrap();
        b.change_color(Pixel::rgba(1.0, 0.0, 0.0, 1.0), false);
        let p = *b.get(0, 0).unwrap();
        assert_eq!((p.r, p.g, p.b), (1.0, 0.0, 0.0));
        assert!((p.a - 128.0 / 255.0).abs() < 1e-6);

        b.change_color(Pixel::rgba(0.0, 0.0, 1.0, 0.25), true);
        assert_eq!(*b.get(0, 0).unwrap(), Pixel::rgba(0.0, 0.0, 1.0, 0.25));
    }

    #[test]
    fn resize_variants_compute_dimensions() {
        let mut b = PixelBuffer::filled(4, 4, RED);
        b.resize(8, 4).unwrap();
        assert_eq!((b.width(), b.height()), (8, 4));
        assert_eq!(b.pixels().len(), 32);

        let mut b = PixelBuffer::filled(4, 4, RED);
        b.scale_by(2.0).unwrap();
        assert_eq!((b.width(), b.height()), (8, 8));

        let mut b = PixelBuffer::filled(4, 2, RED);
        b.resize_to_width(6).unwrap();
        assert_eq!((b.width(), b.height()), (6, 3));

        let mut b = PixelBuffer::filled(3, 2, RED);
        b.resize_to_height(5).unwrap();
        assert_eq!((b.width(), b.height()), (8, 5));
    }

    #[test]
    fn invalid_resizes_leave_buffer_unchanged() {
        let mut b = PixelBuffer::filled(4, 4, RED);
        assert!(matches!(b.scale_by(0.0), Err(Error::InvalidInput(_))));
        assert!(matches!(b.resize(0, 4), Err(Error::ResizeError(_))));
        assert_eq!((b.width(), b.height()), (4, 4));

        let mut empty = PixelBuffer::default();
        assert!(empty.resize_to_width(10).is_err());
    }

    #[test]
    fn to_rgba8_rounds_and_clamps() {
        let b = PixelBuffer::filled(1, 1, Pixel::rgba(128.0 / 255.0, 1.5, -0.5, 1.0));
        assert_eq!(b.to_rgba8(), vec![128, 255, 0, 255]);
    }
}
