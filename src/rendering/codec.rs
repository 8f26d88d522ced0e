//! Image decode and PNG encode built on the `image` crate

use crate::rendering::buffer::PixelBuffer;
use crate::{Error, Result};
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use std::path::Path;

/// Decoded 8-bit samples straight from a codec
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    /// Interleaved channels per pixel (1 to 4)
    pub channels: u8,
    pub samples: Vec<u8>,
}

impl RawImage {
    pub fn into_buffer(self) -> Result<PixelBuffer> {
        PixelBuffer::from_samples(&self.samples, self.width, self.height, self.channels)
    }
}

/// Decode the image file at `path`.
pub fn decode(path: &Path) -> Result<RawImage> {
    let image = image::open(path)
        .map_err(|e| Error::DecodeError(format!("{} failed to load because {}", path.display(), e)))?;
    Ok(from_dynamic(image))
}

/// Decode an in-memory encoded image.
pub fn decode_bytes(bytes: &[u8]) -> Result<RawImage> {
    let image = image::load_from_memory(bytes).map_err(|e| Error::DecodeError(e.to_string()))?;
    Ok(from_dynamic(image))
}

fn from_dynamic(image: DynamicImage) -> RawImage {
    let (width, height) = (image.width(), image.height());
    let channels = image.color().channel_count();
    let samples = match channels {
        1 => image.into_luma8().into_raw(),
        2 => image.into_luma_alpha8().into_raw(),
        3 => image.into_rgb8().into_raw(),
        _ => image.into_rgba8().into_raw(),
    };
    RawImage {
        width,
        height,
        channels: channels.clamp(1, 4),
        samples,
    }
}

/// Load an image file straight into a [`PixelBuffer`].
pub fn load(path: &Path) -> Result<PixelBuffer> {
    decode(path)?.into_buffer()
}

/// Encode a buffer as an 8-bit RGBA PNG.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            &buffer.to_rgba8(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| Error::EncodeError(e.to_string()))?;
    Ok(out)
}

/// Encode a buffer as PNG and write it to `path`.
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    let bytes = encode_png(buffer)?;
    std::fs::write(path, bytes).map_err(|e| {
        Error::EncodeError(format!("image failed to save at {} because {}", path.display(), e))
    })
}
