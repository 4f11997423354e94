//! Geometry primitives shared by fragments, media and tables.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in page space (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl BBox {
    /// Create a box from its left/top corner and size.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a box from two corners.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let (left, right) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (top, bottom) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Self::new(left, top, right - left, bottom - top)
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge. Also the text baseline for fragments.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    /// True when the box has no usable area or carries non-finite values.
    pub fn is_degenerate(&self) -> bool {
        !(self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Check whether a point lies inside the box (edges inclusive).
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Check whether this box's center lies inside `other`.
    pub fn center_inside(&self, other: &BBox) -> bool {
        other.contains_point(self.center_x(), self.center_y())
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BBox::new(left, top, right - left, bottom - top)
    }

    /// Horizontal gap from the right edge of `self` to the left edge of `other`.
    /// Negative when the boxes overlap horizontally.
    pub fn gap_to(&self, other: &BBox) -> f32 {
        other.left - self.right()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_edges() {
        let b = BBox::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(b.right(), 40.0);
        assert_eq!(b.bottom(), 60.0);
        assert_eq!(b.center_x(), 25.0);
        assert_eq!(b.center_y(), 40.0);
    }

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(0.0, 0.0, 40.0, 10.0);
        let b = BBox::new(42.0, 1.0, 38.0, 10.0);
        let u = a.union(&b);
        assert_eq!(u.left, 0.0);
        assert_eq!(u.right(), 80.0);
        assert_eq!(u.top, 0.0);
        assert_eq!(u.bottom(), 11.0);
    }

    #[test]
    fn test_bbox_degenerate() {
        assert!(BBox::new(0.0, 0.0, 0.0, 10.0).is_degenerate());
        assert!(BBox::new(0.0, 0.0, 10.0, -1.0).is_degenerate());
        assert!(BBox::new(f32::NAN, 0.0, 10.0, 10.0).is_degenerate());
        assert!(!BBox::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_from_corners_normalizes() {
        let b = BBox::from_corners(50.0, 80.0, 10.0, 20.0);
        assert_eq!(b, BBox::new(10.0, 20.0, 40.0, 60.0));
    }
}
