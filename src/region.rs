//! Regions: typed rectangles arranged in a strict ownership tree.
//!
//! A `Region` owns its children. Consumers may read a finished tree but
//! only the grammar engine creates children or changes a region's state.

use std::fmt;
use std::hash::Hash;

use crate::error::Result;
use crate::geometry::Rect;

/// A closed enumeration of region types for one deployment.
///
/// `ALL` must list every variant exactly once; rule tables use it to check
/// that every kind has an entry.
pub trait RegionKind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    fn name(&self) -> &'static str;
}

/// Where a region is in its lifecycle.
///
/// `Pending -> Expanded` or `Pending -> Terminal`; nothing leaves `Terminal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionState {
    Pending,
    Expanded,
    Terminal,
}

/// How a region's children were produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Production {
    /// Children tile the parent exactly with no overlap.
    Partition,
    /// First child is a full-area frame, second is the feature inset by `margin`.
    Embed { margin: f64 },
}

/// A node of the subdivision tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Region<K: RegionKind> {
    kind: K,
    bounds: Rect,
    children: Vec<Region<K>>,
    state: RegionState,
    production: Option<Production>,
}

impl<K: RegionKind> Region<K> {
    /// Create a pending region. Fails on non-positive width or height.
    pub fn new(kind: K, x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        Ok(Self::with_bounds(kind, Rect::new(x, y, width, height)?))
    }

    pub(crate) fn with_bounds(kind: K, bounds: Rect) -> Self {
        Self {
            kind,
            bounds,
            children: Vec::new(),
            state: RegionState::Pending,
            production: None,
        }
    }

    pub(crate) fn assemble(
        kind: K,
        bounds: Rect,
        state: RegionState,
        production: Option<Production>,
        children: Vec<Region<K>>,
    ) -> Self {
        Self {
            kind,
            bounds,
            children,
            state,
            production,
        }
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    pub fn children(&self) -> &[Region<K>] {
        &self.children
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    pub fn production(&self) -> Option<Production> {
        self.production
    }

    pub fn is_terminal(&self) -> bool {
        self.state == RegionState::Terminal
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Inclusive hit test against this region's own bounds.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        self.bounds.contains(px, py)
    }

    /// Depth-first pre-order walk in stored child order, starting with `self`.
    pub fn walk(&self) -> Walk<'_, K> {
        Walk { stack: vec![self] }
    }

    /// Leaves in render order. Only leaves carry visual meaning.
    pub fn leaves(&self) -> impl Iterator<Item = &Region<K>> {
        self.walk().filter(|r| r.is_leaf())
    }

    /// Total number of regions in this subtree, including `self`.
    pub fn count(&self) -> usize {
        self.walk().count()
    }

    /// Number of levels below this region (0 for a leaf).
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// The topmost leaf under a point, following painter's order.
    ///
    /// Later siblings are drawn over earlier ones, so an embedded feature
    /// wins over its frame.
    pub fn leaf_at(&self, px: f64, py: f64) -> Option<&Region<K>> {
        if !self.contains(px, py) {
            return None;
        }
        if self.is_leaf() {
            return Some(self);
        }
        self.children.iter().rev().find_map(|c| c.leaf_at(px, py))
    }
}

/// Iterator returned by [`Region::walk`].
pub struct Walk<'a, K: RegionKind> {
    stack: Vec<&'a Region<K>>,
}

impl<'a, K: RegionKind> Iterator for Walk<'a, K> {
    type Item = &'a Region<K>;

    fn next(&mut self) -> Option<Self::Item> {
        let region = self.stack.pop()?;
        self.stack.extend(region.children.iter().rev());
        Some(region)
    }
}
