//! Axis-aligned pixel rectangles and overlap measures.
//!
//! Coordinates are integer pixels. A rectangle whose max does not exceed its
//! min on either axis is degenerate and has zero area; such rectangles are
//! representable but never contribute overlap.

/// Axis-aligned rectangle in integer pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub min_x: i32,
    /// Top edge.
    pub min_y: i32,
    /// Right edge (exclusive).
    pub max_x: i32,
    /// Bottom edge (exclusive).
    pub max_y: i32,
}

impl Rect {
    /// Creates a rectangle from its corners, stored verbatim.
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Returns the width, clamped to zero for inverted rectangles.
    pub fn width(&self) -> i64 {
        (i64::from(self.max_x) - i64::from(self.min_x)).max(0)
    }

    /// Returns the height, clamped to zero for inverted rectangles.
    pub fn height(&self) -> i64 {
        (i64::from(self.max_y) - i64::from(self.min_y)).max(0)
    }

    /// Returns the area; degenerate and inverted rectangles have area zero.
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// Returns true when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Coordinate-wise max of mins and min of maxes.
    ///
    /// The result may be inverted when the inputs are disjoint; its area is
    /// zero in that case.
    pub fn intersection(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    /// Intersection-over-union with `other`. See [`iou`].
    pub fn iou(&self, other: &Rect) -> f64 {
        iou(self, other)
    }

    /// Maps the rectangle by a uniform scale factor, truncating each corner.
    ///
    /// Used to move rectangles from model-input pixels back to the source
    /// image when it was resized before inference.
    pub fn scaled(&self, factor: f32) -> Rect {
        let scale = |v: i32| (v as f32 * factor) as i32;
        Rect {
            min_x: scale(self.min_x),
            min_y: scale(self.min_y),
            max_x: scale(self.max_x),
            max_y: scale(self.max_y),
        }
    }
}

/// Intersection-over-union of two rectangles.
///
/// Symmetric in its arguments. Returns `0.0` for disjoint inputs as long as
/// one of them has nonzero area; two degenerate inputs give `NaN`, which
/// compares false against any overlap threshold.
pub fn iou(a: &Rect, b: &Rect) -> f64 {
    let inter = a.intersection(b).area();
    let union = a.area() + b.area() - inter;
    inter as f64 / union as f64
}
