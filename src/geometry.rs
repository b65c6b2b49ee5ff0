//! Axis-aligned rectangles in layout space.
//!
//! All coordinates share the root region's space: origin at the top-left,
//! x growing right and y growing down.

use crate::error::{GrammarError, Result};

/// Direction of a cut.
///
/// A `Vertical` cut runs top to bottom and divides the width, producing
/// left/right children. A `Horizontal` cut divides the height, producing
/// top/bottom children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    /// The extent of `rect` along which this cut is measured.
    pub fn extent(&self, rect: &Rect) -> f64 {
        match self {
            Axis::Vertical => rect.width,
            Axis::Horizontal => rect.height,
        }
    }
}

/// A rectangle with strictly positive width and height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge; y grows downwards.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rectangle, rejecting non-finite values and non-positive sizes.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(GrammarError::geometry(x, y, width, height, "coordinates must be finite"));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(GrammarError::geometry(
                x,
                y,
                width,
                height,
                "width and height must be positive",
            ));
        }
        Ok(Self { x, y, width, height })
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Closed-interval point test: points on the edges are inside.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Area shared with `other`; zero when they only touch along an edge.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }

    /// True if `other` lies entirely within `self` (edges may coincide).
    pub fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shrink by `margin` on all four sides.
    ///
    /// Fails unless both dimensions exceed `2 * margin`.
    pub fn inset(&self, margin: f64) -> Result<Rect> {
        if !(margin >= 0.0) {
            return Err(GrammarError::geometry(
                self.x,
                self.y,
                self.width,
                self.height,
                format!("inset margin {margin} must be non-negative"),
            ));
        }
        if self.width <= 2.0 * margin || self.height <= 2.0 * margin {
            return Err(GrammarError::geometry(
                self.x,
                self.y,
                self.width,
                self.height,
                format!("margin {margin} leaves no room inside"),
            ));
        }
        Rect::new(
            self.x + margin,
            self.y + margin,
            self.width - 2.0 * margin,
            self.height - 2.0 * margin,
        )
    }
}
