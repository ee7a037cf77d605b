//! Page geometry in PDF points.

use serde::{Deserialize, Serialize};

/// Convert a length in points (1/72 inch) to whole millimetres.
///
/// `round(pt / 72 * 25.4)`, rounding half away from zero.
pub fn point_to_mm(points: f32) -> i64 {
    (f64::from(points) / 72.0 * 25.4).round() as i64
}

/// An axis-aligned rectangle with a top-left origin and y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle, normalising the corner order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Union of all rectangles in the iterator, `None` when it is empty.
    pub fn union_all<'a, I>(rects: I) -> Option<Rect>
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        rects
            .into_iter()
            .fold(None, |acc: Option<Rect>, r| match acc {
                Some(acc) => Some(acc.union(r)),
                None => Some(*r),
            })
    }
}
