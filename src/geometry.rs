//! Geometry primitives: points, sizes, bounds, resize handles, and the pure
//! helpers the rest of the engine is built on.
//!
//! All coordinates are canvas pixels as `f64`. `Bounds` is the canonical
//! rectangle and is kept normalized (`left <= right`, `top <= bottom`) by every
//! constructor except the raw struct literal.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point (or position, or delta) in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - origin`.
    #[must_use]
    pub fn delta_from(self, origin: Point) -> Point {
        Point { x: self.x - origin.x, y: self.y - origin.y }
    }

    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point { x: self.x + dx, y: self.y + dy }
    }
}

/// Width and height of a component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The same size with both dimensions forced non-negative.
    #[must_use]
    pub fn abs(self) -> Size {
        Size { width: self.width.abs(), height: self.height.abs() }
    }
}

/// Axis-aligned rectangle as `(left, top, right, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    /// Build normalized bounds from four edges in any order.
    #[must_use]
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::from_corners(Point::new(left, top), Point::new(right, bottom))
    }

    /// Normalized bounds spanning two opposite corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    /// Bounds with the top-left corner at `position`. A negative size extends
    /// toward the origin instead of producing inverted bounds.
    #[must_use]
    pub fn from_position_size(position: Point, size: Size) -> Self {
        Self::from_corners(position, position.offset(size.width, size.height))
    }

    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(self.left, self.top, self.right, self.bottom)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Inclusive containment: every side of `other` lies within the matching side of `self`.
    #[must_use]
    pub fn contains(&self, other: &Bounds) -> bool {
        other.left >= self.left && other.top >= self.top && other.right <= self.right && other.bottom <= self.bottom
    }

    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    #[must_use]
    pub fn union(&self, other: &Bounds) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Position of the given handle on this rectangle.
    #[must_use]
    pub fn handle_point(&self, handle: Handle) -> Point {
        let c = self.center();
        match handle {
            Handle::TopLeft => Point::new(self.left, self.top),
            Handle::Top => Point::new(c.x, self.top),
            Handle::TopRight => Point::new(self.right, self.top),
            Handle::Right => Point::new(self.right, c.y),
            Handle::BottomRight => Point::new(self.right, self.bottom),
            Handle::Bottom => Point::new(c.x, self.bottom),
            Handle::BottomLeft => Point::new(self.left, self.bottom),
            Handle::Left => Point::new(self.left, c.y),
        }
    }
}

/// One of the eight drag points on a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl Handle {
    /// All handles, clockwise from the top-left corner.
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];

    #[must_use]
    pub fn is_corner(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight | Self::BottomRight | Self::BottomLeft)
    }

    /// Which horizontal edge this handle drags: -1 left, 1 right, 0 none.
    fn x_side(self) -> i8 {
        match self {
            Self::TopLeft | Self::Left | Self::BottomLeft => -1,
            Self::TopRight | Self::Right | Self::BottomRight => 1,
            Self::Top | Self::Bottom => 0,
        }
    }

    /// Which vertical edge this handle drags: -1 top, 1 bottom, 0 none.
    fn y_side(self) -> i8 {
        match self {
            Self::TopLeft | Self::Top | Self::TopRight => -1,
            Self::BottomLeft | Self::Bottom | Self::BottomRight => 1,
            Self::Left | Self::Right => 0,
        }
    }
}

/// Result of [`resize_from_handle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resized {
    pub position: Point,
    pub size: Size,
}

impl Resized {
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::from_position_size(self.position, self.size)
    }
}

/// Per-axis result of [`point_in_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisHit {
    pub x: bool,
    pub y: bool,
}

impl AxisHit {
    #[must_use]
    pub fn both(self) -> bool {
        self.x && self.y
    }
}

/// Resize a rectangle by dragging `handle` by `delta`.
///
/// Only the axes the handle controls change. With `anchor_from_center` the
/// opposite edge moves by the same amount in the other direction, keeping the
/// center fixed. Dragging an edge past its opposite edge flips the rectangle:
/// the position jumps to the far side and the size is committed as an
/// absolute value.
#[must_use]
pub fn resize_from_handle(
    current_size: Size,
    current_position: Point,
    delta: Point,
    handle: Handle,
    anchor_from_center: bool,
) -> Resized {
    let (x, width) = resize_axis(current_position.x, current_size.width, delta.x, handle.x_side(), anchor_from_center);
    let (y, height) = resize_axis(current_position.y, current_size.height, delta.y, handle.y_side(), anchor_from_center);
    Resized { position: Point::new(x, y), size: Size::new(width, height) }
}

fn resize_axis(start: f64, length: f64, delta: f64, side: i8, from_center: bool) -> (f64, f64) {
    let (mut pos, mut len) = match (side, from_center) {
        (0, _) => (start, length),
        (-1, false) => (start + delta, length - delta),
        (-1, true) => (start + delta, length - 2.0 * delta),
        (_, false) => (start, length + delta),
        (_, true) => (start - delta, length + 2.0 * delta),
    };
    if len < 0.0 {
        pos += len;
        len = -len;
    }
    (pos, len)
}

/// Whether `point` lies inside `[0, extent)` on each axis independently.
#[must_use]
pub fn point_in_bounds(point: Point, extent: Size) -> AxisHit {
    AxisHit {
        x: point.x >= 0.0 && point.x < extent.width,
        y: point.y >= 0.0 && point.y < extent.height,
    }
}

/// Smallest rectangle covering every rect in `rects`; `None` when empty.
#[must_use]
pub fn common_bounds(rects: &[Bounds]) -> Option<Bounds> {
    let (first, rest) = rects.split_first()?;
    Some(rest.iter().fold(*first, |acc, r| acc.union(r)))
}

/// The candidate with the smallest absolute value; the first one wins ties.
#[must_use]
pub fn closest_to_zero(candidates: &[f64]) -> Option<f64> {
    candidates
        .iter()
        .copied()
        .fold(None, |best: Option<f64>, c| match best {
            Some(b) if b.abs() <= c.abs() => Some(b),
            _ => Some(c),
        })
}
