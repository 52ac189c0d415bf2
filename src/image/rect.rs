use std::{cmp, fmt};

/// An axis-aligned rectangle.
///
/// This rectangle type uses (signed) integer coordinates and is meant to be used with the
/// [`crate::image`] module. Detectors report their bounding boxes as [`Rect`]s.
///
/// Rectangles are allowed to have zero height and/or width, and may lie partially or entirely
/// outside of the image they refer to.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl Rect {
    /// Creates a rectangle extending downwards and right from a point.
    #[inline]
    pub const fn from_top_left(top_left_x: i32, top_left_y: i32, width: u32, height: u32) -> Self {
        Self {
            x: top_left_x,
            y: top_left_y,
            width,
            height,
        }
    }

    /// Creates a rectangle from two opposing corner points (both inclusive).
    pub fn from_corners(top_left: (i32, i32), bottom_right: (i32, i32)) -> Self {
        let (x_min, y_min) = top_left;
        let (x_max, y_max) = bottom_right;
        assert!(x_min <= x_max, "x_min={}, x_max={}", x_min, x_max);
        assert!(y_min <= y_max, "y_min={}, y_max={}", y_min, y_max);
        Self::from_top_left(
            x_min,
            y_min,
            (i64::from(x_max) - i64::from(x_min) + 1) as u32,
            (i64::from(y_max) - i64::from(y_min) + 1) as u32,
        )
    }

    /// Grows each side of this rectangle by adding a margin.
    ///
    /// Negative margins shrink the rectangle. The resulting width and height saturate at 0.
    #[must_use]
    pub fn grow_sides(&self, left: i32, right: i32, top: i32, bottom: i32) -> Self {
        let width = i64::from(self.width) + i64::from(left) + i64::from(right);
        let height = i64::from(self.height) + i64::from(top) + i64::from(bottom);
        Self {
            x: self.x.saturating_sub(left),
            y: self.y.saturating_sub(top),
            width: width.clamp(0, i64::from(u32::MAX)) as u32,
            height: height.clamp(0, i64::from(u32::MAX)) as u32,
        }
    }

    /// Grows every side of this rectangle by `padding` pixels.
    #[must_use]
    pub fn grow(&self, padding: u32) -> Self {
        let p = i32::try_from(padding).unwrap_or(i32::MAX);
        self.grow_sides(p, p, p, p)
    }

    /// Returns the X coordinate of the left side of the rectangle.
    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Returns the Y coordinate of the top side of the rectangle.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the X coordinate one past the right edge.
    #[inline]
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// Returns the Y coordinate one past the bottom edge.
    #[inline]
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Returns the number of pixels covered by `self`.
    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Computes the intersection of `self` and `other`.
    ///
    /// Returns `None` when the intersection is empty (ie. the rectangles do not overlap, or either
    /// of them has zero area).
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x_min = cmp::max(self.x, other.x);
        let y_min = cmp::max(self.y, other.y);
        let x_end = cmp::min(self.right(), other.right());
        let y_end = cmp::min(self.bottom(), other.bottom());
        if i64::from(x_min) >= x_end || i64::from(y_min) >= y_end {
            return None;
        }

        let rect = Rect::from_top_left(
            x_min,
            y_min,
            (x_end - i64::from(x_min)) as u32,
            (y_end - i64::from(y_min)) as u32,
        );
        debug_assert!(self.contains_rect(&rect) && other.contains_rect(&rect));
        Some(rect)
    }

    /// Returns whether `self` contains `other`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        let (bx, by) = (self.right(), self.bottom());
        write!(f, "Rect @ ({x},{y})-({bx},{by})/{w}x{h}")
    }
}
