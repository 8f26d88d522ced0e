//! Blockprint
//!
//! A batch renderer that turns a JSON template into a set of PNG images.
//!
//! # Features
//!
//! - **Block layouts**: nested image and text blocks placed by offsets,
//!   nine-point alignment and snapping against their predecessor
//! - **Per-record data**: each record binds images and text into named blocks,
//!   overrides geometry for that record only and can pull in potential layouts
//! - **TrueType text** (default `truetype` feature): glyphs rasterized with
//!   `fontdue` and tinted with the bound color
//!
//! # Example
//!
//! ```no_run
//! use blockprint::{Layout, Template};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let template = Template::from_path("cards.json".as_ref())?;
//! let mut layout = Layout::from_template(&template.layout)?;
//! let summary = layout.run_batch(&template.images);
//! println!("saved {} images", summary.saved.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod layout;
pub mod rendering;
pub mod template;
pub mod text;

pub use layout::{
    Alignment, BatchSummary, Block, BlockKind, BlockTree, BottomBand, Frame, Layout, SnapSide,
};
pub use rendering::{Pixel, PixelBuffer};
pub use template::{BindingDef, BlockDef, GeometryDef, LayoutDef, RecordDef, Template};
pub use text::{GlyphSource, TextShaper};

#[cfg(feature = "truetype")]
pub use text::FontdueGlyphSource;

/// Build the layout described by `template` and render every record in it.
///
/// Fails only when the layout itself can't be used; per-record problems are
/// logged and counted in the returned summary.
pub fn generate(template: &Template) -> Result<BatchSummary> {
    let mut layout = Layout::from_template(&template.layout)?;
    Ok(layout.run_batch(&template.images))
}
