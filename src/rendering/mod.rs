//! Pixel-level rendering: float RGBA buffers, compositing, resampling and
//! the image codecs used to load and save them.

pub mod buffer;
pub mod codec;
pub mod resample;

pub use buffer::{Pixel, PixelBuffer};
pub use codec::RawImage;
pub use resample::{FilterResampler, Resampler};
