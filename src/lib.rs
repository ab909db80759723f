//! Binary-tree rectangle packing over a fixed-size page.
//!
//! A [`Packer`] partitions one rectangular page (a texture atlas sheet, a
//! glyph cache, ...) into packed sub-rectangles. Each [`insert`](Packer::insert)
//! splits a free leaf of the partition tree until one child matches the
//! request exactly; each [`remove`](Packer::remove) frees that leaf and, when
//! its sibling is free too, collapses the pair back into their parent. An
//! optional pixel gap keeps neighboring rectangles apart so texture filtering
//! never samples across an edge.

use log::{debug, trace};

mod node;
#[cfg(target_arch = "wasm32")]
mod wasm;

use node::{Node, NodeId};

/// An axis-aligned integer rectangle inside a page.
#[derive(Default, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Opaque handle to a packed rectangle, issued by [`Packer::insert`].
///
/// A handle stays valid until the [`Packer::remove`] call that frees it
/// succeeds, or until [`Packer::clear`]. Using it afterwards yields `None`
/// or `false`, never a panic.
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct SlotId(NodeId);

impl SlotId {
    #[cfg(target_arch = "wasm32")]
    pub(crate) fn to_raw(self) -> u32 {
        self.0.value() as u32
    }

    #[cfg(target_arch = "wasm32")]
    pub(crate) fn from_raw(raw: u32) -> Self {
        Self(NodeId::new(raw as usize))
    }
}

/// Rectangle packer over one fixed-size page.
///
/// The partition tree lives in a flat arena; tree links are arena indices,
/// and indices freed by a merge are recycled before the arena grows. All
/// operations are synchronous tree bookkeeping: the packer never touches
/// pixel data, it only hands out the coordinates to blit at.
pub struct Packer {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: NodeId,
    width: i32,
    height: i32,
    pixel_gap: i32,
    occupied: usize,
    used_area: i64,
}

impl Packer {
    /// Creates a packer for a `width` x `height` page whose packed
    /// rectangles are kept `pixel_gap` pixels apart.
    ///
    /// # Panics
    ///
    /// Panics if either page dimension is not positive or the gap is
    /// negative.
    pub fn new(width: i32, height: i32, pixel_gap: i32) -> Self {
        assert!(width > 0 && height > 0, "page dimensions must be positive");
        assert!(pixel_gap >= 0, "pixel gap must be non-negative");

        let mut packer = Self {
            nodes: vec![],
            free: vec![],
            root: NodeId::invalid(),
            width,
            height,
            pixel_gap,
            occupied: 0,
            used_area: 0,
        };
        packer.root = packer.alloc_node(Node::leaf(
            Rect::new(0, 0, width, height),
            NodeId::invalid(),
        ));
        packer
    }

    /// Resets the page to a single free leaf, invalidating every
    /// outstanding [`SlotId`]. The arena allocation is reused.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.occupied = 0;
        self.used_area = 0;
        self.root = self.alloc_node(Node::leaf(
            Rect::new(0, 0, self.width, self.height),
            NodeId::invalid(),
        ));
        debug!("cleared {}x{} page", self.width, self.height);
    }

    /// Packs a `width` x `height` rectangle, returning a handle to it, or
    /// `None` when no free leaf can hold it. A failed insert leaves the
    /// tree untouched.
    ///
    /// Placement is first-fit: leaves are tried in depth-first order, first
    /// child before second. A leaf bigger than the request is split on the
    /// axis with more slack until one child matches exactly.
    pub fn insert(&mut self, width: i32, height: i32) -> Option<SlotId> {
        if width <= 0 || height <= 0 {
            return None;
        }

        let root = self.root;
        let Some(id) = self.insert_at(root, width, height) else {
            debug!(
                "no room for {}x{} in {}x{} page ({} slots resident)",
                width, height, self.width, self.height, self.occupied
            );
            return None;
        };

        self.occupied += 1;
        self.used_area += i64::from(width) * i64::from(height);
        Some(SlotId(id))
    }

    fn insert_at(&mut self, id: NodeId, width: i32, height: i32) -> Option<NodeId> {
        let node = self.nodes[id.value()];

        if !node.is_leaf() {
            let first = node.first_child;
            let second = self.nodes[first.value()].next_sibling;
            return self
                .insert_at(first, width, height)
                .or_else(|| self.insert_at(second, width, height));
        }

        if node.in_use || width > node.rect.width || height > node.rect.height {
            return None;
        }

        let dw = node.rect.width - width;
        let dh = node.rect.height - height;

        if dw == 0 && dh == 0 {
            self.nodes[id.value()].in_use = true;
            return Some(id);
        }

        // Splitting down to an exact match would leave a remainder child
        // with no positive extent once the gap is taken out. Checked for
        // both axes up front so a rejected leaf is never half-split.
        if (dw > 0 && dw <= self.pixel_gap) || (dh > 0 && dh <= self.pixel_gap) {
            return None;
        }

        let (first_rect, second_rect) = if dw > dh {
            // Side by side: the left slice takes the requested width, the
            // remainder keeps the full height.
            (
                Rect::new(node.rect.x, node.rect.y, width, node.rect.height),
                Rect::new(
                    node.rect.x + width + self.pixel_gap,
                    node.rect.y,
                    dw - self.pixel_gap,
                    node.rect.height,
                ),
            )
        } else {
            // Stacked: the top slice takes the requested height.
            (
                Rect::new(node.rect.x, node.rect.y, node.rect.width, height),
                Rect::new(
                    node.rect.x,
                    node.rect.y + height + self.pixel_gap,
                    node.rect.width,
                    dh - self.pixel_gap,
                ),
            )
        };

        trace!(
            "split {:?} into {:?} and {:?}",
            node.rect,
            first_rect,
            second_rect
        );

        let first = self.alloc_node(Node::leaf(first_rect, id));
        let second = self.alloc_node(Node::leaf(second_rect, id));
        self.nodes[first.value()].next_sibling = second;
        self.nodes[id.value()].first_child = first;

        // The first child matches the request on the split axis, so this
        // recursion terminates after at most one further split.
        self.insert_at(first, width, height)
    }

    /// Frees the rectangle behind `slot`. When its sibling is also a free
    /// leaf the pair is destroyed and the parent becomes a free leaf again.
    /// The merge runs one level only; the parent's own sibling is not
    /// re-examined.
    ///
    /// Returns `false` without touching the tree for a stale, already
    /// freed, or out-of-range handle.
    pub fn remove(&mut self, slot: SlotId) -> bool {
        let SlotId(id) = slot;
        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.in_use {
            return false;
        }
        let rect = node.rect;

        self.nodes[id.value()].in_use = false;
        self.occupied -= 1;
        self.used_area -= rect.area();
        self.try_merge(id);
        true
    }

    fn try_merge(&mut self, id: NodeId) {
        let parent = self.nodes[id.value()].parent;
        if !parent.is_valid() {
            return;
        }

        let first = self.nodes[parent.value()].first_child;
        let second = self.nodes[first.value()].next_sibling;
        let sibling = if first == id { second } else { first };

        let sibling_node = self.nodes[sibling.value()];
        if !sibling_node.is_leaf() || sibling_node.in_use {
            return;
        }

        trace!(
            "merged children back into {:?}",
            self.nodes[parent.value()].rect
        );

        self.free_node(first);
        self.free_node(second);
        // The split never changed the parent's rect, so turning it back
        // into a leaf restores the pre-split geometry as-is.
        self.nodes[parent.value()].first_child = NodeId::invalid();
    }

    /// The packed rectangle behind `slot`, or `None` for a handle that is
    /// no longer live.
    pub fn rect(&self, slot: SlotId) -> Option<Rect> {
        self.node(slot.0)
            .filter(|node| node.in_use)
            .map(|node| node.rect)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn pixel_gap(&self) -> i32 {
        self.pixel_gap
    }

    /// Number of rectangles currently packed.
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Total area of the packed rectangles, for occupancy diagnostics.
    pub fn used_area(&self) -> i64 {
        self.used_area
    }

    /// Iterates over the packed rectangles in arena order. Callers use this
    /// to re-blit every resident rectangle after the backing page itself is
    /// invalidated.
    pub fn slots(&self) -> impl Iterator<Item = (SlotId, Rect)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.freed && node.in_use)
            .map(|(index, node)| (SlotId(NodeId::new(index)), node.rect))
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get(id.value()).filter(|node| !node.freed)
    }

    fn alloc_node(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.value()] = node;
            id
        } else {
            let id = NodeId::new(self.nodes.len());
            self.nodes.push(node);
            id
        }
    }

    fn free_node(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.value()];
        node.freed = true;
        node.in_use = false;
        node.parent = NodeId::invalid();
        node.first_child = NodeId::invalid();
        node.next_sibling = NodeId::invalid();
        self.free.push(id);
    }
}
