//! Template documents: the static layout and the batch of records bound into it.
//!
//! These types only describe the JSON shape. Nothing here is validated beyond
//! what serde needs; missing names, unknown block types and out-of-range enum
//! values are reported when the template is applied to a
//! [`Layout`](crate::layout::Layout), so one bad element doesn't reject the
//! whole document.
//!
//! ```
//! let json = r#"{
//!     "Layout": { "Width": 64, "Height": 32, "Blocks": [
//!         { "Type": "ImageBlock", "Name": "Logo", "Alignment": 4 }
//!     ] },
//!     "Images": [ { "Filename": "first", "Data": [ { "Name": "Logo", "StoredImage": "logo.png" } ] } ]
//! }"#;
//! let template = blockprint::Template::from_json(json).unwrap();
//! assert_eq!(template.layout.blocks[0].name.as_deref(), Some("Logo"));
//! assert_eq!(template.images[0].filename, "first");
//! ```

use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The whole template document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    pub layout: LayoutDef,
    #[serde(default)]
    pub images: Vec<RecordDef>,
}

impl Template {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}

/// The static part of the template
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayoutDef {
    /// Directory the rendered images are written to
    pub save_file_path: Option<PathBuf>,
    #[serde(rename = "Background Image", alias = "BackgroundImage")]
    pub background_image: Option<PathBuf>,
    /// Background size when no background image is given
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub font: Option<PathBuf>,
    /// Height of the band cut from the bottom of the background
    #[serde(default)]
    pub bottom_height: i32,
    /// Distance from the lowest block to the bottom of the relocated band
    #[serde(
        rename = "BottomDistanceFromLowestLayoutBlock",
        alias = "BottomBottomDistanceFromLowestLayoutBlock",
        default = "disabled_distance"
    )]
    pub bottom_distance: i32,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
    #[serde(default)]
    pub potential_layouts: Vec<PotentialLayoutDef>,
}

fn disabled_distance() -> i32 {
    -1
}

/// Geometry fields shared by block definitions and per-record overrides
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeometryDef {
    pub width_offset: Option<i32>,
    pub height_offset: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// 0 (top left) to 8 (bottom right)
    pub alignment: Option<i64>,
    /// 0 (none), 1 (top), 2 (left), 3 (bottom), 4 (right)
    pub snap_side: Option<i64>,
}

/// One block in the static tree or inside a potential layout
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockDef {
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub geometry: GeometryDef,
    #[serde(default)]
    pub potential_layouts: Vec<PotentialLayoutDef>,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

/// A named block fragment that is only built when a record refers to it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PotentialLayoutDef {
    pub layout_name: Option<String>,
    #[serde(flatten)]
    pub block: BlockDef,
}

/// One output image
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordDef {
    pub filename: String,
    #[serde(default)]
    pub data: Vec<BindingDef>,
}

/// Data bound into one named block for a single record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BindingDef {
    pub name: Option<String>,

    // Image blocks
    pub stored_image: Option<PathBuf>,
    pub retain_aspect_ratio: Option<bool>,

    // Text blocks
    pub text: Option<String>,
    pub pixel_height: Option<u32>,
    pub color_r: Option<f32>,
    pub color_g: Option<f32>,
    pub color_b: Option<f32>,
    pub color_a: Option<f32>,

    #[serde(rename = "Override")]
    pub override_geometry: Option<GeometryDef>,
    #[serde(default)]
    pub blocks: Vec<BindingDef>,
}
