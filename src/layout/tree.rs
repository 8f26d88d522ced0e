//! The block tree and its geometry resolver.
//!
//! Blocks live in an `indextree` arena. A block's structural parent doubles as
//! its predecessor: offsets and snap corrections accumulate along the parent
//! chain, so moving a block moves everything docked to it.
//!
//! Placement is resolved on every render and never cached between records,
//! because overrides and snap corrections only hold for one record.

use super::block::{Axis, Block, BlockKind, SnapCorrection, SnapSide};
use crate::rendering::PixelBuffer;
use crate::text::TextShaper;
use crate::{Error, Result};
use indextree::{Arena, NodeId};

#[derive(Debug, Clone)]
pub struct BlockTree {
    arena: Arena<Block>,
    root: NodeId,
}

#[allow(clippy::len_without_is_empty)]
impl BlockTree {
    /// Create a tree whose root canvas spans `width` x `height`.
    pub fn new(width: i32, height: i32) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(Block::canvas(width, height));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Block> {
        self.arena
            .get(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Block> {
        self.arena
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get_mut())
    }

    fn block(&self, id: NodeId) -> &Block {
        self.arena[id].get()
    }

    /// Add `block` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, block: Block) -> NodeId {
        let id = self.arena.new_node(block);
        parent.append(id, &mut self.arena);
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// The block this one chains its offsets from
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.parent())
    }

    /// Children in paint order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        id.children(&self.arena).collect()
    }

    /// First direct child of `scope` named `name`
    pub fn find_child(&self, scope: NodeId, name: &str) -> Option<NodeId> {
        scope
            .children(&self.arena)
            .find(|&child| self.block(child).name == name)
    }

    /// All live blocks, root first, in paint order
    pub fn ids(&self) -> Vec<NodeId> {
        self.root.descendants(&self.arena).collect()
    }

    /// Number of live blocks, the root included
    pub fn len(&self) -> usize {
        self.root.descendants(&self.arena).count()
    }

    /// Sum of offsets and stored snap corrections from this block up to, but
    /// excluding, the root.
    ///
    /// Summed in `i64` and clamped to the `i32` range.
    pub fn accumulated_offset(&self, id: NodeId, axis: Axis) -> i32 {
        let mut total = 0i64;
        for ancestor in id.ancestors(&self.arena) {
            let node = &self.arena[ancestor];
            if node.parent().is_none() {
                break;
            }
            let block = node.get();
            total += i64::from(block.geometry.offset(axis)) + i64::from(block.snap.along(axis));
        }
        total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    pub fn top_edge(&self, id: NodeId) -> i32 {
        self.accumulated_offset(id, Axis::Height)
            .saturating_sub(self.block(id).alignment_shift(Axis::Height))
    }

    pub fn bottom_edge(&self, id: NodeId) -> i32 {
        self.top_edge(id).saturating_add(self.block(id).content_height())
    }

    pub fn left_edge(&self, id: NodeId) -> i32 {
        self.accumulated_offset(id, Axis::Width)
            .saturating_sub(self.block(id).alignment_shift(Axis::Width))
    }

    pub fn right_edge(&self, id: NodeId) -> i32 {
        self.left_edge(id).saturating_add(self.block(id).content_width())
    }

    /// Compute and store the correction that docks this block's chosen side
    /// against its predecessor, whatever either block's alignment.
    pub fn resolve_snap_correction(&mut self, id: NodeId) {
        let Some(pred_id) = self.predecessor(id) else {
            return;
        };
        let block = self.block(id);
        let pred = self.block(pred_id);

        let snap = match block.snap_side() {
            SnapSide::None => SnapCorrection::default(),
            SnapSide::Top => SnapCorrection {
                width: 0,
                height: -block.content_height() - pred.alignment_shift(Axis::Height)
                    + block.alignment_shift(Axis::Height),
            },
            SnapSide::Bottom => SnapCorrection {
                width: 0,
                height: pred.content_height() - pred.alignment_shift(Axis::Height)
                    + block.alignment_shift(Axis::Height),
            },
            SnapSide::Left => SnapCorrection {
                width: -block.content_width() - pred.alignment_shift(Axis::Width)
                    + block.alignment_shift(Axis::Width),
                height: 0,
            },
            SnapSide::Right => SnapCorrection {
                width: pred.content_width() - pred.alignment_shift(Axis::Width)
                    + block.alignment_shift(Axis::Width),
                height: 0,
            },
        };

        self.arena[id].get_mut().snap = snap;
    }

    /// Paint every block onto `canvas`, parents before children and siblings
    /// in order. Failures are logged and returned; the pass always completes.
    pub fn render_into(&mut self, canvas: &mut PixelBuffer, shaper: Option<&TextShaper>) -> Vec<Error> {
        let mut errors = Vec::new();
        for id in self.ids() {
            self.render_block(id, canvas, shaper, &mut errors);
        }
        errors
    }

    fn render_block(
        &mut self,
        id: NodeId,
        canvas: &mut PixelBuffer,
        shaper: Option<&TextShaper>,
        errors: &mut Vec<Error>,
    ) {
        let mut report = |e: Error| {
            log::error!("{}", e);
            errors.push(e);
        };

        // Bring the content to its drawn size first; placement depends on it
        let mut shaped = None;
        let block = self.arena[id].get_mut();
        let (width, height) = (block.width(), block.height());
        match &mut block.kind {
            BlockKind::Canvas => return,
            BlockKind::Image(image) => {
                if image.buffer.is_none() {
                    log::warn!("There was no image given to draw for block {}", block.name);
                    return;
                }
                if let Err(e) = image.fit(width, height) {
                    report(Error::ResizeError(format!("block {}: {}", block.name, e)));
                }
            }
            BlockKind::Text(text) => {
                let Some(shaper) = shaper else {
                    log::warn!("There was no font given so the text in block {} can't be drawn", block.name);
                    return;
                };
                if text.text.is_empty() {
                    log::warn!("There was no text given to draw for block {}", block.name);
                    return;
                }
                match shaper.shape(&text.text, text.pixel_height) {
                    Ok(mut buffer) => {
                        if let Some(color) = text.color {
                            buffer.change_color(color, false);
                        }
                        shaped = Some(buffer);
                    }
                    Err(e) => {
                        report(e);
                        return;
                    }
                }
            }
        }

        self.resolve_snap_correction(id);
        let (left, top) = (self.left_edge(id), self.top_edge(id));
        log::debug!("placing block {} at ({}, {})", self.block(id).name, left, top);

        match (&self.block(id).kind, &shaped) {
            (BlockKind::Image(image), _) => {
                if let Some(buffer) = &image.buffer {
                    canvas.composite(buffer, left, top);
                }
            }
            (BlockKind::Text(_), Some(buffer)) => canvas.composite(buffer, left, top),
            _ => {}
        }
    }

    /// Largest bottom edge across the tree (0 for an empty layout)
    pub fn lowest_point(&self) -> i32 {
        self.ids()
            .into_iter()
            .map(|id| self.bottom_edge(id))
            .max()
            .unwrap_or(0)
    }

    /// Undo everything a record did: clear snap corrections, revert
    /// overrides, drop bound content and prune blocks built from potential
    /// layouts.
    pub fn reset_transient_state(&mut self) -> Vec<Error> {
        let mut errors = Vec::new();
        self.reset_block(self.root, &mut errors);
        errors
    }

    fn reset_block(&mut self, id: NodeId, errors: &mut Vec<Error>) {
        let block = self.arena[id].get_mut();
        block.reset_own_state();

        if block.ephemeral {
            if let Err(e) = self.remove(id) {
                log::error!("{}", e);
                errors.push(e);
            }
            return;
        }

        // Back to front, children may remove themselves
        let children: Vec<NodeId> = id.children(&self.arena).rev().collect();
        for child in children {
            self.reset_block(child, errors);
        }
    }

    /// Remove a block and its subtree from its predecessor.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let Some(block) = self.get(id) else {
            return Err(Error::StructuralError(
                "couldn't find the block to remove".into(),
            ));
        };
        if self.predecessor(id).is_none() {
            return Err(Error::StructuralError(format!(
                "block {} has no predecessor to be removed from",
                block.name
            )));
        }
        id.remove_subtree(&mut self.arena);
        Ok(())
    }
}
