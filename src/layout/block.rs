//! Blocks: the nodes of a layout tree.
//!
//! A block carries relative geometry (offsets from its predecessor, a target
//! size, an alignment anchor and a snap side), the per-record override state
//! for that geometry, and a variant payload. The tree-wide calculations that
//! need the predecessor chain live in [`super::tree`].

use crate::rendering::{Pixel, PixelBuffer};
use crate::template::BlockDef;
use crate::{Error, Result};

/// Which point of a block's content lands on its computed offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    TopLeft = 0,
    TopMiddle = 1,
    TopRight = 2,
    Left = 3,
    Center = 4,
    Right = 5,
    BottomLeft = 6,
    BottomMiddle = 7,
    BottomRight = 8,
}

impl Alignment {
    /// Column of the 3x3 grid: 0 left, 1 middle, 2 right
    pub fn column(self) -> i32 {
        self as i32 % 3
    }

    /// Row of the 3x3 grid: 0 top, 1 middle, 2 bottom
    pub fn row(self) -> i32 {
        self as i32 / 3
    }
}

impl TryFrom<i64> for Alignment {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Ok(match value {
            0 => Alignment::TopLeft,
            1 => Alignment::TopMiddle,
            2 => Alignment::TopRight,
            3 => Alignment::Left,
            4 => Alignment::Center,
            5 => Alignment::Right,
            6 => Alignment::BottomLeft,
            7 => Alignment::BottomMiddle,
            8 => Alignment::BottomRight,
            other => {
                return Err(Error::ConfigError(format!(
                    "alignment must be between 0 and 8, got {}",
                    other
                )))
            }
        })
    }
}

/// The side of the predecessor a block docks against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapSide {
    #[default]
    None = 0,
    Top = 1,
    Left = 2,
    Bottom = 3,
    Right = 4,
}

impl TryFrom<i64> for SnapSide {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Ok(match value {
            0 => SnapSide::None,
            1 => SnapSide::Top,
            2 => SnapSide::Left,
            3 => SnapSide::Bottom,
            4 => SnapSide::Right,
            other => {
                return Err(Error::ConfigError(format!(
                    "snap side must be between 0 and 4, got {}",
                    other
                )))
            }
        })
    }
}

/// Horizontal (width) or vertical (height) direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

/// A value that can be overridden for a single record.
///
/// The first override in a record remembers the default; reverting restores
/// it and clears the override.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Overridable<T> {
    value: T,
    default: Option<T>,
}

impl<T: Copy> Overridable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            default: None,
        }
    }

    pub fn get(&self) -> T {
        self.value
    }

    pub fn set(&mut self, value: T, overriding: bool) {
        if overriding && self.default.is_none() {
            self.default = Some(self.value);
        }
        self.value = value;
    }

    pub fn is_overridden(&self) -> bool {
        self.default.is_some()
    }

    pub fn revert(&mut self) {
        if let Some(default) = self.default.take() {
            self.value = default;
        }
    }
}

/// Relative geometry of a block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub width_offset: Overridable<i32>,
    pub height_offset: Overridable<i32>,
    /// Target width; 0 sizes from content
    pub width: Overridable<i32>,
    /// Target height; 0 sizes from content
    pub height: Overridable<i32>,
    pub alignment: Overridable<Alignment>,
    pub snap_side: Overridable<SnapSide>,
}

impl Geometry {
    pub fn offset(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Width => self.width_offset.get(),
            Axis::Height => self.height_offset.get(),
        }
    }

    pub fn is_overridden(&self) -> bool {
        self.width_offset.is_overridden()
            || self.height_offset.is_overridden()
            || self.width.is_overridden()
            || self.height.is_overridden()
            || self.alignment.is_overridden()
            || self.snap_side.is_overridden()
    }

    fn revert(&mut self) {
        self.width_offset.revert();
        self.height_offset.revert();
        self.width.revert();
        self.height.revert();
        self.alignment.revert();
        self.snap_side.revert();
    }
}

/// Stored snap offsets, valid for the current record's render pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapCorrection {
    pub width: i32,
    pub height: i32,
}

impl SnapCorrection {
    pub fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }
}

/// Image payload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageContent {
    pub buffer: Option<PixelBuffer>,
    pub retain_aspect_ratio: bool,
}

impl Default for ImageContent {
    fn default() -> Self {
        Self {
            buffer: None,
            retain_aspect_ratio: true,
        }
    }
}

impl ImageContent {
    /// Resize the stored buffer towards a `width` x `height` target, where 0
    /// leaves that dimension to the content.
    ///
    /// With the aspect ratio retained, a target width always applies and a
    /// target height only ever shrinks the image further.
    pub fn fit(&mut self, width: i32, height: i32) -> Result<()> {
        let Some(buffer) = self.buffer.as_mut() else {
            return Ok(());
        };

        if self.retain_aspect_ratio {
            if width > 0 && width as u32 != buffer.width() {
                buffer.resize_to_width(width as u32)?;
            }
            if height > 0 && (height as u32) < buffer.height() {
                buffer.resize_to_height(height as u32)?;
            }
        } else {
            let target_w = if width > 0 { width as u32 } else { buffer.width() };
            let target_h = if height > 0 { height as u32 } else { buffer.height() };
            if (target_w, target_h) != (buffer.width(), buffer.height()) {
                buffer.resize(target_w, target_h)?;
            }
        }
        Ok(())
    }
}

/// Text payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextContent {
    pub text: String,
    pub pixel_height: u32,
    /// Shaped width, cached when the text is bound
    pub content_width: u32,
    /// Tint for the shaped glyphs. Only the colour channels are applied; the
    /// alpha stays the glyph coverage, so `ColorA` has no effect.
    pub color: Option<Pixel>,
}

/// Variant payload of a block
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// The root of the tree; it has no content of its own
    Canvas,
    Image(ImageContent),
    Text(TextContent),
}

impl BlockKind {
    /// Parse the `Type` field of a block definition.
    pub fn from_type_name(name: &str) -> Result<Self> {
        match name {
            "Image" | "ImageBlock" => Ok(BlockKind::Image(ImageContent::default())),
            "Text" | "TextBlock" => Ok(BlockKind::Text(TextContent::default())),
            other => Err(Error::ConfigError(format!(
                "no valid block type given (got `{}`)",
                other
            ))),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKind::Canvas => "canvas",
            BlockKind::Image(_) => "image",
            BlockKind::Text(_) => "text",
        }
    }
}

/// A named block fragment attached to a block, built on first reference
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialLayout {
    pub name: String,
    pub fragment: BlockDef,
}

/// A node of the layout tree
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub kind: BlockKind,
    pub geometry: Geometry,
    pub snap: SnapCorrection,
    pub potential_layouts: Vec<PotentialLayout>,
    /// Set on blocks built from a potential layout; they are pruned on reset
    pub ephemeral: bool,
    /// Name of the potential layout this block was built from
    pub origin_layout: Option<String>,
}

impl Block {
    pub fn new(name: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            name: name.into(),
            kind,
            geometry: Geometry::default(),
            snap: SnapCorrection::default(),
            potential_layouts: Vec::new(),
            ephemeral: false,
            origin_layout: None,
        }
    }

    pub fn canvas(width: i32, height: i32) -> Self {
        let mut block = Self::new("Canvas", BlockKind::Canvas);
        block.set_width(width, false);
        block.set_height(height, false);
        block
    }

    pub fn image(name: impl Into<String>) -> Self {
        Self::new(name, BlockKind::Image(ImageContent::default()))
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, BlockKind::Text(TextContent::default()))
    }

    pub fn with_offset(mut self, width_offset: i32, height_offset: i32) -> Self {
        self.set_width_offset(width_offset, false);
        self.set_height_offset(height_offset, false);
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.set_width(width, false);
        self.set_height(height, false);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.set_alignment(alignment, false);
        self
    }

    pub fn with_snap_side(mut self, snap_side: SnapSide) -> Self {
        self.set_snap_side(snap_side, false);
        self
    }

    pub fn with_buffer(mut self, buffer: PixelBuffer) -> Self {
        if let BlockKind::Image(image) = &mut self.kind {
            image.buffer = Some(buffer);
        }
        self
    }

    pub fn set_width_offset(&mut self, value: i32, overriding: bool) {
        self.geometry.width_offset.set(value, overriding);
    }

    pub fn set_height_offset(&mut self, value: i32, overriding: bool) {
        self.geometry.height_offset.set(value, overriding);
    }

    pub fn set_width(&mut self, value: i32, overriding: bool) {
        self.geometry.width.set(value, overriding);
    }

    pub fn set_height(&mut self, value: i32, overriding: bool) {
        self.geometry.height.set(value, overriding);
    }

    pub fn set_alignment(&mut self, value: Alignment, overriding: bool) {
        self.geometry.alignment.set(value, overriding);
    }

    pub fn set_snap_side(&mut self, value: SnapSide, overriding: bool) {
        self.geometry.snap_side.set(value, overriding);
    }

    pub fn width(&self) -> i32 {
        self.geometry.width.get()
    }

    pub fn height(&self) -> i32 {
        self.geometry.height.get()
    }

    pub fn alignment(&self) -> Alignment {
        self.geometry.alignment.get()
    }

    pub fn snap_side(&self) -> SnapSide {
        self.geometry.snap_side.get()
    }

    pub fn content_width(&self) -> i32 {
        match &self.kind {
            BlockKind::Canvas => 0,
            BlockKind::Image(image) => image.buffer.as_ref().map_or(0, |b| b.width() as i32),
            BlockKind::Text(text) => text.content_width as i32,
        }
    }

    pub fn content_height(&self) -> i32 {
        match &self.kind {
            BlockKind::Canvas => 0,
            BlockKind::Image(image) => image.buffer.as_ref().map_or(0, |b| b.height() as i32),
            BlockKind::Text(text) => text.pixel_height as i32,
        }
    }

    pub fn content_size(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Width => self.content_width(),
            Axis::Height => self.content_height(),
        }
    }

    /// How far the alignment anchor sits from the content's top-left corner
    pub fn alignment_shift(&self, axis: Axis) -> i32 {
        let step = match axis {
            Axis::Width => self.alignment().column(),
            Axis::Height => self.alignment().row(),
        };
        self.content_size(axis) * step / 2
    }

    pub fn potential_layout(&self, name: &str) -> Option<&PotentialLayout> {
        self.potential_layouts.iter().find(|l| l.name == name)
    }

    /// Clear snap corrections, revert overrides and drop the bound payload.
    pub fn reset_own_state(&mut self) {
        self.snap = SnapCorrection::default();
        self.geometry.revert();
        match &mut self.kind {
            BlockKind::Canvas => {}
            BlockKind::Image(image) => image.buffer = None,
            BlockKind::Text(text) => {
                text.text.clear();
                text.pixel_height = 0;
                text.content_width = 0;
                text.color = None;
            }
        }
    }
}
