//! Drives a batch: builds the static tree once, then binds, renders, saves and
//! resets it for every record.

use super::block::{Alignment, Block, BlockKind, PotentialLayout, SnapSide};
use super::tree::BlockTree;
use crate::rendering::{codec, Pixel, PixelBuffer};
use crate::template::{BindingDef, BlockDef, GeometryDef, LayoutDef, PotentialLayoutDef, RecordDef};
use crate::text::TextShaper;
use crate::{Error, Result};
use indextree::NodeId;
use std::path::{Path, PathBuf};

/// Pixel height used when a text binding doesn't give one
pub const DEFAULT_PIXEL_HEIGHT: u32 = 16;

/// Relocation of the bottom band of the background so it sits a fixed
/// distance below the lowest block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BottomBand {
    /// Height of the band taken from the bottom of the background
    pub height: i32,
    /// Distance between the lowest block and the bottom of the moved band
    pub distance: i32,
}

impl BottomBand {
    pub fn disabled() -> Self {
        Self {
            height: 0,
            distance: -1,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.height > 0 && self.distance > 0
    }
}

impl Default for BottomBand {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Output of one render pass, before it is placed on the background
#[derive(Debug)]
pub struct Frame {
    /// Everything the blocks painted, on a transparent canvas
    pub canvas: PixelBuffer,
    /// Deepest bottom edge across the tree
    pub lowest_point: i32,
    /// Problems reported while painting
    pub errors: Vec<Error>,
}

/// What happened to a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub saved: Vec<PathBuf>,
    /// Filenames of records that couldn't be written
    pub failed: Vec<String>,
}

/// A template layout: the static block tree plus everything needed to turn a
/// record into an image.
#[derive(Debug)]
pub struct Layout {
    tree: BlockTree,
    background: PixelBuffer,
    shaper: Option<TextShaper>,
    save_path: PathBuf,
    bottom_band: BottomBand,
}

impl Layout {
    /// An empty layout over `background`, saving to the working directory.
    pub fn new(background: PixelBuffer) -> Self {
        let tree = BlockTree::new(background.width() as i32, background.height() as i32);
        Self {
            tree,
            background,
            shaper: None,
            save_path: PathBuf::new(),
            bottom_band: BottomBand::disabled(),
        }
    }

    pub fn with_shaper(mut self, shaper: TextShaper) -> Self {
        self.shaper = Some(shaper);
        self
    }

    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = path.into();
        self
    }

    pub fn with_bottom_band(mut self, band: BottomBand) -> Self {
        self.bottom_band = band;
        self
    }

    /// Resolve the background, font and static block tree of a template.
    pub fn from_template(def: &LayoutDef) -> Result<Self> {
        let save_path = match &def.save_file_path {
            Some(path) => path.clone(),
            None => {
                let cwd = std::env::current_dir()?;
                log::warn!(
                    "The template doesn't contain a path to save to so it will default to the working directory: {}",
                    cwd.display()
                );
                cwd
            }
        };

        let background = match (&def.background_image, def.width, def.height) {
            (Some(path), _, _) => codec::load(path).map_err(|e| {
                Error::ConfigError(format!("Failed to load background image: {}", e))
            })?,
            (None, Some(width), Some(height)) => PixelBuffer::new(width, height),
            _ => {
                return Err(Error::ConfigError(
                    "The template doesn't contain a valid background image or width and height so the layout can't be used"
                        .into(),
                ))
            }
        };

        let mut layout = Layout::new(background)
            .with_save_path(save_path)
            .with_bottom_band(BottomBand {
                height: def.bottom_height,
                distance: def.bottom_distance,
            });

        if let Some(font) = &def.font {
            match load_shaper(font) {
                Ok(shaper) => layout.shaper = Some(shaper),
                Err(e) => log::error!("{}", e),
            }
        }

        let root = layout.tree.root();
        layout.add_potential_layouts(root, &def.potential_layouts);
        for block in &def.blocks {
            if let Err(e) = layout.add_block(root, block) {
                log::error!("{}", e);
            }
        }

        Ok(layout)
    }

    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut BlockTree {
        &mut self.tree
    }

    pub fn background(&self) -> &PixelBuffer {
        &self.background
    }

    pub fn shaper(&self) -> Option<&TextShaper> {
        self.shaper.as_ref()
    }

    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    pub fn set_save_path(&mut self, path: impl Into<PathBuf>) {
        self.save_path = path.into();
    }

    pub fn bottom_band(&self) -> BottomBand {
        self.bottom_band
    }

    /// Attach named fragments to `scope`.
    pub fn add_potential_layouts(&mut self, scope: NodeId, defs: &[PotentialLayoutDef]) {
        let Some(block) = self.tree.get_mut(scope) else {
            return;
        };
        for def in defs {
            match &def.layout_name {
                Some(name) => block.potential_layouts.push(PotentialLayout {
                    name: name.clone(),
                    fragment: def.block.clone(),
                }),
                None => log::error!(
                    "Couldn't find a LayoutName for a potential layout in block {}",
                    block.name
                ),
            }
        }
    }

    /// Build `def` and its nested blocks under `parent`.
    ///
    /// Errors in nested blocks are logged and skip only that subtree.
    pub fn add_block(&mut self, parent: NodeId, def: &BlockDef) -> Result<NodeId> {
        let kind = def
            .kind
            .as_deref()
            .ok_or_else(|| Error::ConfigError("A block must be given a type".into()))
            .and_then(BlockKind::from_type_name)?;
        let name = def
            .name
            .clone()
            .ok_or_else(|| Error::ConfigError("A block must be given a name".into()))?;

        let mut block = Block::new(name, kind);
        for e in apply_geometry(&mut block, &def.geometry, false) {
            log::error!("{}", e);
        }

        let id = self.tree.append(parent, block);
        self.add_potential_layouts(id, &def.potential_layouts);
        for child in &def.blocks {
            if let Err(e) = self.add_block(id, child) {
                log::error!("{}", e);
            }
        }
        Ok(id)
    }

    /// Find the block `name` refers to under `scope`.
    ///
    /// A matching potential layout wins over a plain child; it is built the
    /// first time it is referenced in a record and reused afterwards.
    pub fn resolve(&mut self, scope: NodeId, name: &str) -> Result<NodeId> {
        let scope_block = self
            .tree
            .get(scope)
            .ok_or_else(|| Error::StructuralError("binding scope no longer exists".into()))?;

        if let Some(layout) = scope_block.potential_layout(name) {
            let fragment = layout.fragment.clone();
            let existing = self.tree.children(scope).into_iter().find(|&child| {
                self.tree
                    .get(child)
                    .is_some_and(|b| b.ephemeral && b.origin_layout.as_deref() == Some(name))
            });
            if let Some(existing) = existing {
                return Ok(existing);
            }

            let id = self.add_block(scope, &fragment)?;
            if let Some(block) = self.tree.get_mut(id) {
                block.ephemeral = true;
                block.origin_layout = Some(name.to_string());
            }
            return Ok(id);
        }

        self.tree
            .find_child(scope, name)
            .ok_or_else(|| Error::BlockNotFound {
                name: name.to_string(),
                scope: scope_block.name.clone(),
            })
    }

    /// Bind one record's data into the tree. Every failed entry is logged
    /// and returned; the rest of the record still binds.
    pub fn bind_record(&mut self, data: &[BindingDef]) -> Vec<Error> {
        let mut errors = Vec::new();
        let root = self.tree.root();
        for entry in data {
            self.bind_entry(root, entry, &mut errors);
        }
        errors
    }

    fn bind_entry(&mut self, scope: NodeId, entry: &BindingDef, errors: &mut Vec<Error>) {
        let mut report = |e: Error| {
            log::error!("{}", e);
            errors.push(e);
        };

        let Some(name) = entry.name.as_deref() else {
            report(Error::BindingError(
                "There was no Name in the binding entry so no block can be found".into(),
            ));
            return;
        };

        let id = match self.resolve(scope, name) {
            Ok(id) => id,
            Err(e) => {
                report(e);
                return;
            }
        };

        if let Err(e) = self.bind_payload(id, entry) {
            report(e);
            return;
        }

        if let Some(geometry) = &entry.override_geometry {
            if let Some(block) = self.tree.get_mut(id) {
                for e in apply_geometry(block, geometry, true) {
                    report(e);
                }
            }
        }

        for child in &entry.blocks {
            self.bind_entry(id, child, errors);
        }
    }

    fn bind_payload(&mut self, id: NodeId, entry: &BindingDef) -> Result<()> {
        let block = self
            .tree
            .get(id)
            .ok_or_else(|| Error::StructuralError("bound block no longer exists".into()))?;
        let name = block.name.clone();

        match &block.kind {
            BlockKind::Canvas => Err(Error::TypeMismatch {
                name,
                expected: "block",
                found: "canvas",
            }),
            BlockKind::Image(_) => {
                if entry.text.is_some() {
                    return Err(Error::TypeMismatch {
                        name,
                        expected: "text",
                        found: "image",
                    });
                }
                let path = entry.stored_image.as_deref().ok_or_else(|| {
                    Error::BindingError(format!("Block {} hasn't been given a StoredImage", name))
                })?;
                let buffer = codec::load(path)?;

                if let Some(BlockKind::Image(image)) = self.tree.get_mut(id).map(|b| &mut b.kind) {
                    image.buffer = Some(buffer);
                    if let Some(retain) = entry.retain_aspect_ratio {
                        image.retain_aspect_ratio = retain;
                    }
                }
                Ok(())
            }
            BlockKind::Text(_) => {
                if entry.stored_image.is_some() {
                    return Err(Error::TypeMismatch {
                        name,
                        expected: "image",
                        found: "text",
                    });
                }
                let text = entry.text.clone().ok_or_else(|| {
                    Error::BindingError(format!("Block {} hasn't been given Text", name))
                })?;
                let pixel_height = entry.pixel_height.unwrap_or_else(|| {
                    log::info!(
                        "Block {} hasn't been given a PixelHeight so it will default to {}",
                        name,
                        DEFAULT_PIXEL_HEIGHT
                    );
                    DEFAULT_PIXEL_HEIGHT
                });
                let color = Pixel::rgba(
                    entry.color_r.unwrap_or(1.0),
                    entry.color_g.unwrap_or(1.0),
                    entry.color_b.unwrap_or(1.0),
                    entry.color_a.unwrap_or(1.0),
                );
                let content_width = match &self.shaper {
                    Some(shaper) => shaper.string_width(&text, pixel_height)?,
                    None => 0,
                };

                if let Some(BlockKind::Text(content)) = self.tree.get_mut(id).map(|b| &mut b.kind) {
                    content.text = text;
                    content.pixel_height = pixel_height;
                    content.content_width = content_width;
                    content.color = Some(color);
                }
                Ok(())
            }
        }
    }

    /// Paint the tree onto a fresh transparent canvas the size of the
    /// background.
    pub fn render(&mut self) -> Frame {
        let mut canvas = PixelBuffer::new(self.background.width(), self.background.height());
        let errors = self.tree.render_into(&mut canvas, self.shaper.as_ref());
        let lowest_point = self.tree.lowest_point();
        Frame {
            canvas,
            lowest_point,
            errors,
        }
    }

    /// Place a rendered frame on a copy of the background, moving the bottom
    /// band up under the content first when configured.
    pub fn compose(&self, frame: &Frame) -> PixelBuffer {
        let mut image = self.background.clone();

        if self.bottom_band.is_enabled() {
            let BottomBand { height, distance } = self.bottom_band;
            let full_height = image.height() as i32;
            let width = image.width();
            let lowest = frame.lowest_point;

            // Rows above the background would be transparent anyway
            let height = height.min(full_height);

            let band = image.copy_section(width, height as u32, 0, full_height - height);
            let erase_from = lowest.clamp(0, full_height);
            image.erase_region(width as i32, full_height - erase_from, 0, erase_from);
            image.composite(&band, 0, lowest.saturating_add(distance).saturating_sub(height));
        }

        image.composite(&frame.canvas, 0, 0);
        image
    }

    /// Write `image` to `<save path>/<filename>.png`.
    pub fn save(&self, image: &PixelBuffer, filename: &str) -> Result<PathBuf> {
        let path = self.save_path.join(format!("{}.png", filename));
        codec::save_png(image, &path)?;
        Ok(path)
    }

    /// Restore the static tree for the next record.
    pub fn reset(&mut self) -> Vec<Error> {
        self.tree.reset_transient_state()
    }

    /// Bind, render, save and reset for one record.
    ///
    /// Binding and render problems are logged and the image is still saved;
    /// only a failed save is returned as an error.
    pub fn process_record(&mut self, record: &RecordDef) -> Result<PathBuf> {
        self.bind_record(&record.data);
        let frame = self.render();
        let image = self.compose(&frame);
        let saved = self.save(&image, &record.filename);
        self.reset();

        match &saved {
            Ok(path) => log::info!("Image saved to: {}", path.display()),
            Err(e) => log::error!("Record {} wasn't saved: {}", record.filename, e),
        }
        saved
    }

    /// Process every record in order.
    pub fn run_batch(&mut self, records: &[RecordDef]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for record in records {
            match self.process_record(record) {
                Ok(path) => summary.saved.push(path),
                Err(_) => summary.failed.push(record.filename.clone()),
            }
        }
        summary
    }
}

#[cfg(feature = "truetype")]
fn load_shaper(path: &Path) -> Result<TextShaper> {
    TextShaper::from_font_file(path)
}

#[cfg(not(feature = "truetype"))]
fn load_shaper(path: &Path) -> Result<TextShaper> {
    Err(Error::FontError(format!(
        "Font {} can't be loaded: built without the `truetype` feature",
        path.display()
    )))
}

/// Apply the geometry fields present in `def`. Out-of-range enum values are
/// skipped and returned.
fn apply_geometry(block: &mut Block, def: &GeometryDef, overriding: bool) -> Vec<Error> {
    let mut errors = Vec::new();
    if let Some(v) = def.width_offset {
        block.set_width_offset(v, overriding);
    }
    if let Some(v) = def.height_offset {
        block.set_height_offset(v, overriding);
    }
    if let Some(v) = def.width {
        block.set_width(v, overriding);
    }
    if let Some(v) = def.height {
        block.set_height(v, overriding);
    }
    if let Some(v) = def.alignment {
        match Alignment::try_from(v) {
            Ok(alignment) => block.set_alignment(alignment, overriding),
            Err(e) => errors.push(e),
        }
    }
    if let Some(v) = def.snap_side {
        match SnapSide::try_from(v) {
            Ok(side) => block.set_snap_side(side, overriding),
            Err(e) => errors.push(e),
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::block::Axis;
    use crate::text::test_glyphs::BoxGlyphs;
    use crate::Template;

    const RED: Pixel = Pixel::rgba(1.0, 0.0, 0.0, 1.0);
    const GREEN: Pixel = Pixel::rgba(0.0, 1.0, 0.0, 1.0);

    fn layout_from(json: &str) -> Layout {
        let template = Template::from_json(json).unwrap();
        let mut layout = Layout::new(PixelBuffer::filled(100, 100, RED));
        let root = layout.tree().root();
        layout.add_potential_layouts(root, &template.layout.potential_layouts);
        for def in &template.layout.blocks {
            layout.add_block(root, def).unwrap();
        }
        layout
    }

    fn text_entry(name: &str, text: &str) -> BindingDef {
        BindingDef {
            name: Some(name.into()),
            text: Some(text.into()),
            pixel_height: Some(10),
            ..Default::default()
        }
    }

    #[test]
    fn static_tree_is_built_from_template() {
        let layout = layout_from(
            r#"{ "Layout": { "Blocks": [
                { "Type": "ImageBlock", "Name": "Header", "WidthOffset": 4, "Alignment": 4,
                  "Blocks": [ { "Type": "TextBlock", "Name": "Title", "SnapSide": 3 } ] },
                { "Type": "TextBlock", "Name": "Footer", "HeightOffset": 90 }
            ] } }"#,
        );
        let tree = layout.tree();
        let header = tree.find_child(tree.root(), "Header").unwrap();
        let title = tree.find_child(header, "Title").unwrap();
        assert!(tree.find_child(tree.root(), "Footer").is_some());
        assert_eq!(tree.get(header).unwrap().alignment(), Alignment::Center);
        assert_eq!(tree.get(header).unwrap().geometry.offset(Axis::Width), 4);
        assert_eq!(tree.get(title).unwrap().snap_side(), SnapSide::Bottom);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn invalid_blocks_are_skipped() {
        let template = Template::from_json(
            r#"{ "Layout": { "Blocks": [
                { "Type": "ImageBlock" },
                { "Type": "VideoBlock", "Name": "v" },
                { "Type": "ImageBlock", "Name": "ok", "Alignment": 12 }
            ] } }"#,
        )
        .unwrap();
        let mut layout = Layout::new(PixelBuffer::new(10, 10));
        let root = layout.tree().root();
        let blocks = &template.layout.blocks;
        assert!(matches!(layout.add_block(root, &blocks[0]), Err(Error::ConfigError(_))));
        assert!(matches!(layout.add_block(root, &blocks[1]), Err(Error::ConfigError(_))));
        let ok = layout.add_block(root, &blocks[2]).unwrap();
        assert_eq!(layout.tree().get(ok).unwrap().alignment(), Alignment::TopLeft);
    }

    #[test]
    fn binding_reports_missing_and_mismatched_blocks() {
        let mut layout = layout_from(
            r#"{ "Layout": { "Blocks": [ { "Type": "ImageBlock", "Name": "Photo" } ] } }"#,
        );
        let errors = layout.bind_record(&[
            text_entry("Nobody", "x"),
            text_entry("Photo", "x"),
            BindingDef::default(),
            BindingDef {
                name: Some("Photo".into()),
                ..Default::default()
            },
        ]);
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], Error::BlockNotFound { .. }));
        assert!(matches!(errors[1], Error::TypeMismatch { expected: "text", .. }));
        assert!(matches!(errors[2], Error::BindingError(_)));
        assert!(matches!(errors[3], Error::BindingError(_)));
    }

    #[test]
    fn text_binding_caches_width_and_defaults() {
        let mut layout = layout_from(
            r#"{ "Layout": { "Blocks": [ { "Type": "TextBlock", "Name": "Title" } ] } }"#,
        )
        .with_shaper(TextShaper::new(BoxGlyphs));
        let errors = layout.bind_record(&[BindingDef {
            name: Some("Title".into()),
            text: Some("AV".into()),
            color_g: Some(0.0),
            ..Default::default()
        }]);
        assert!(errors.is_empty());

        let tree = layout.tree();
        let title = tree.get(tree.find_child(tree.root(), "Title").unwrap()).unwrap();
        match &title.kind {
            BlockKind::Text(content) => {
                assert_eq!(content.pixel_height, DEFAULT_PIXEL_HEIGHT);
                // (6 - 2 + 6) units at 1.6 px per unit, rounded per step
                assert_eq!(content.content_width, 10 - 3 + 10);
                assert_eq!(content.color, Some(Pixel::rgba(1.0, 0.0, 1.0, 1.0)));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn overrides_apply_for_one_record() {
        let mut layout = layout_from(
            r#"{ "Layout": { "Blocks": [ { "Type": "TextBlock", "Name": "Title", "WidthOffset": 5 } ] } }"#,
        );
        let mut entry = text_entry("Title", "hi");
        entry.override_geometry = Some(GeometryDef {
            width_offset: Some(40),
            alignment: Some(8),
            ..Default::default()
        });
        assert!(layout.bind_record(&[entry]).is_empty());

        let id = layout.tree().find_child(layout.tree().root(), "Title").unwrap();
        assert_eq!(layout.tree().get(id).unwrap().geometry.offset(Axis::Width), 40);
        assert_eq!(layout.tree().get(id).unwrap().alignment(), Alignment::BottomRight);

        layout.render();
        assert!(layout.reset().is_empty());
        let block = layout.tree().get(id).unwrap();
        assert_eq!(block.geometry.offset(Axis::Width), 5);
        assert_eq!(block.alignment(), Alignment::TopLeft);
        assert!(!block.geometry.is_overridden());
    }

    #[test]
    fn potential_layouts_are_ephemeral() {
        let mut layout = layout_from(
            r#"{ "Layout": {
                "PotentialLayouts": [ { "LayoutName": "Badge", "Type": "TextBlock", "Name": "BadgeText",
                    "Blocks": [ { "Type": "TextBlock", "Name": "Inner" } ] } ],
                "Blocks": [ { "Type": "TextBlock", "Name": "Title" } ]
            } }"#,
        );
        let root = layout.tree().root();
        let mut badge = text_entry("Badge", "new");
        badge.blocks.push(text_entry("Inner", "x"));
        let errors = layout.bind_record(&[badge, text_entry("Badge", "again")]);
        assert!(errors.is_empty());

        let children = layout.tree().children(root);
        assert_eq!(children.len(), 2);
        let badge_id = layout.tree().find_child(root, "BadgeText").unwrap();
        let badge_block = layout.tree().get(badge_id).unwrap();
        assert!(badge_block.ephemeral);
        match &badge_block.kind {
            BlockKind::Text(content) => assert_eq!(content.text, "again"),
            other => panic!("unexpected kind {:?}", other),
        }
        assert!(layout.tree().find_child(badge_id, "Inner").is_some());

        layout.render();
        layout.reset();
        assert_eq!(layout.tree().children(root).len(), 1);
        assert!(layout.tree().find_child(root, "BadgeText").is_none());
        assert_eq!(layout.tree().len(), 2);
    }

    #[test]
    fn green_block_on_red_background() {
        let mut layout = layout_from(
            r#"{ "Layout": { "Blocks": [ { "Type": "ImageBlock", "Name": "Patch" } ] } }"#,
        );
        let root = layout.tree().root();
        let id = layout.tree().find_child(root, "Patch").unwrap();
        if let Some(BlockKind::Image(image)) = layout.tree_mut().get_mut(id).map(|b| &mut b.kind) {
            image.buffer = Some(PixelBuffer::filled(50, 25, GREEN));
        }

        let frame = layout.render();
        assert!(frame.errors.is_empty());
        assert_eq!(frame.lowest_point, 25);
        let image = layout.compose(&frame);
        for (x, y) in [(0, 0), (49, 24), (25, 12)] {
            assert_eq!(*image.get(x, y).unwrap(), GREEN);
        }
        for (x, y) in [(50, 0), (0, 25), (99, 99)] {
            assert_eq!(*image.get(x, y).unwrap(), RED);
        }
        // The stored background is never touched
        assert_eq!(*layout.background().get(0, 0).unwrap(), RED);
    }

    #[test]
    fn bottom_band_moves_under_the_lowest_block() {
        let mut background = PixelBuffer::filled(10, 100, RED);
        for y in 80..100 {
            for x in 0..10 {
                background.set(x, y, Pixel::rgba(0.0, 0.0, y as f32 / 100.0, 1.0));
            }
        }
        let layout = Layout::new(background.clone()).with_bottom_band(BottomBand {
            height: 20,
            distance: 10,
        });
        let frame = Frame {
            canvas: PixelBuffer::new(10, 100),
            lowest_point: 30,
            errors: Vec::new(),
        };
        let image = layout.compose(&frame);

        for y in 0..20 {
            assert_eq!(image.get(3, y), background.get(3, y));
        }
        for y in 20..40 {
            assert_eq!(image.get(3, y), background.get(3, y + 60), "row {}", y);
        }
        for y in 40..100 {
            assert_eq!(*image.get(3, y).unwrap(), Pixel::TRANSPARENT, "row {}", y);
        }
    }

    #[test]
    fn bottom_band_arithmetic_saturates() {
        let layout = Layout::new(PixelBuffer::filled(4, 10, RED)).with_bottom_band(BottomBand {
            height: i32::MAX,
            distance: i32::MAX,
        });
        let frame = |lowest_point| Frame {
            canvas: PixelBuffer::new(4, 10),
            lowest_point,
            errors: Vec::new(),
        };

        // Everything below the lowest point is erased and the band lands above the image
        let image = layout.compose(&frame(i32::MIN));
        assert_eq!((image.width(), image.height()), (4, 10));
        assert_eq!(*image.get(0, 0).unwrap(), Pixel::TRANSPARENT);

        // Nothing to erase and the band lands below the image
        let image = layout.compose(&frame(i32::MAX));
        assert_eq!(*image.get(0, 0).unwrap(), RED);
        assert_eq!(*image.get(3, 9).unwrap(), RED);
    }

    #[test]
    fn bottom_band_needs_both_parameters() {
        assert!(!BottomBand::disabled().is_enabled());
        assert!(!BottomBand { height: 20, distance: 0 }.is_enabled());
        assert!(!BottomBand { height: 0, distance: 5 }.is_enabled());
        assert!(BottomBand { height: 1, distance: 1 }.is_enabled());
    }

    #[test]
    fn missing_background_is_a_configuration_error() {
        let def = LayoutDef {
            save_file_path: Some(PathBuf::from(".")),
            width: Some(10),
            ..Default::default()
        };
        assert!(matches!(Layout::from_template(&def), Err(Error::ConfigError(_))));
    }

    #[test]
    fn explicit_size_creates_transparent_background() {
        let def = LayoutDef {
            save_file_path: Some(PathBuf::from("out")),
            width: Some(30),
            height: Some(20),
            ..Default::default()
        };
        let layout = Layout::from_template(&def).unwrap();
        assert_eq!((layout.background().width(), layout.background().height()), (30, 20));
        assert_eq!(layout.tree().get(layout.tree().root()).unwrap().width(), 30);
        assert_eq!(layout.save_path(), Path::new("out"));
        assert!(layout.shaper().is_none());
    }
}
