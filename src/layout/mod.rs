//! Declarative block layouts.
//!
//! A layout is a tree of blocks rooted at a canvas the size of the background.
//! The static tree comes from the template; each record binds content into
//! named blocks, may override geometry and may instantiate potential layouts.
//! After rendering, [`Layout::reset`] restores the static tree.

pub mod block;
pub mod orchestrator;
pub mod tree;

pub use block::{
    Alignment, Axis, Block, BlockKind, Geometry, ImageContent, Overridable, PotentialLayout,
    SnapCorrection, SnapSide, TextContent,
};
pub use orchestrator::{BatchSummary, BottomBand, Frame, Layout, DEFAULT_PIXEL_HEIGHT};
pub use tree::BlockTree;
