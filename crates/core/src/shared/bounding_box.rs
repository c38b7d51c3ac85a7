use serde::{Deserialize, Serialize};

/// Axis-aligned face box in pixel coordinates of a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge, widened so extreme coordinates cannot overflow.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// True when both far edges are representable as `i32` pixel coordinates.
    pub fn edges_fit_i32(&self) -> bool {
        self.x.checked_add(self.width).is_some() && self.y.checked_add(self.height).is_some()
    }

    /// Area in square pixels; zero for boxes with a non-positive side.
    pub fn area(&self) -> f64 {
        self.width.max(0) as f64 * self.height.max(0) as f64
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        overlap(self, other)
    }
}

/// Intersection-over-union of two boxes, in `[0, 1]`.
///
/// Returns 0 when the boxes do not intersect or their union is empty.
pub fn overlap(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let ix1 = a.x.max(b.x) as i64;
    let iy1 = a.y.max(b.y) as i64;
    let ix2 = a.right().min(b.right());
    let iy2 = a.bottom().min(b.bottom());

    let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
    if inter == 0.0 {
        return 0.0;
    }

    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        return 0.0;
    }
    inter / union
}
