//! Geometric primitives for canvas layout and editing.
//!
//! This module provides the geometric types shared by the resolver, the
//! alignment engine, the group calculator and the regenerator.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//! - [`Insets`] - Padding values for four sides
//!
//! # Coordinate System
//!
//! Canvas space follows the SVG convention:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner at `(0, 0)`
//! - **X-axis**: Increases rightward (positive to the right)
//! - **Y-axis**: Increases downward (positive downward)
//!
//! Document coordinates (the lengths written in the source text, Y up) are
//! converted to and from canvas space by [`crate::units::DocumentUnits`].

/// Rounds `value` to the nearest multiple of `quantum`.
///
/// A non-positive quantum leaves the value untouched.
///
/// # Examples
///
/// ```
/// # use tikzedit_core::geometry::round_to;
/// assert_eq!(round_to(29.0, 20.0), 20.0);
/// assert_eq!(round_to(31.0, 20.0), 40.0);
/// assert_eq!(round_to(0.74, 0.5), 0.5);
/// ```
pub fn round_to(value: f32, quantum: f32) -> f32 {
    if quantum <= 0.0 {
        return value;
    }
    (value / quantum).round() * quantum
}

/// A 2D point representing a position in canvas space.
///
/// Points use `f32` coordinates and provide operations for basic vector math.
/// The coordinate system has origin at top-left with Y increasing downward,
/// (see [module documentation](self) for details).
///
/// # Examples
///
/// ```
/// # use tikzedit_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Euclidean distance between two points
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Rounds both coordinates to the nearest multiple of `quantum`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tikzedit_core::geometry::Point;
    /// let snapped = Point::new(409.0, 291.0).round_to(20.0);
    /// assert_eq!(snapped, Point::new(400.0, 300.0));
    /// ```
    pub fn round_to(self, quantum: f32) -> Self {
        Self {
            x: round_to(self.x, quantum),
            y: round_to(self.y, quantum),
        }
    }

    /// Converts a point and size into a bounds rectangle
    ///
    /// The point is treated as the center of the bounds, and the size
    /// is distributed equally in all directions around that center.
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_center(self, size)
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with both dimensions at least `min`
    pub fn at_least(self, min: f32) -> Self {
        Self {
            width: self.width.max(min),
            height: self.height.max(min),
        }
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Merges two bounds to create a larger bounds that contains both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tikzedit_core::geometry::{Bounds, Point, Size};
    /// let header = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 30.0));
    /// let content = Bounds::new_from_top_left(Point::new(10.0, 40.0), Size::new(120.0, 80.0));
    ///
    /// let combined = header.merge(&content);
    /// assert_eq!(combined.min_x(), 0.0);
    /// assert_eq!(combined.width(), 130.0);
    /// assert_eq!(combined.height(), 120.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Expands the bounds by adding insets.
    ///
    /// This decreases the minimum coordinates by left/top insets and increases
    /// the maximum coordinates by right/bottom insets, effectively growing the bounds.
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left(),
            min_y: self.min_y - insets.top(),
            max_x: self.max_x + insets.right(),
            max_y: self.max_y + insets.bottom(),
        }
    }

    /// Returns true if the point lies inside the bounds (edges included)
    pub fn contains_point(self, point: Point) -> bool {
        self.min_x <= point.x
            && point.x <= self.max_x
            && self.min_y <= point.y
            && point.y <= self.max_y
    }

    /// Returns true if `other` lies entirely inside these bounds (edges included)
    pub fn contains_bounds(self, other: Bounds) -> bool {
        self.min_x <= other.min_x
            && other.max_x <= self.max_x
            && self.min_y <= other.min_y
            && other.max_y <= self.max_y
    }
}

/// Represents spacing around an element (padding, margin, etc.)
/// with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Returns the top inset value
    pub fn top(self) -> f32 {
        self.top
    }

    /// Returns the right inset value
    pub fn right(self) -> f32 {
        self.right
    }

    /// Returns the bottom inset value
    pub fn bottom(self) -> f32 {
        self.bottom
    }

    /// Returns the left inset value
    pub fn left(self) -> f32 {
        self.left
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_point_add_sub() {
        let p1 = Point::new(5.0, 8.0);
        let p2 = Point::new(2.0, 3.0);
        assert_eq!(p1.add_point(p2), Point::new(7.0, 11.0));
        assert_eq!(p1.sub_point(p2), Point::new(3.0, 5.0));
    }

    #[test]
    fn test_point_distance() {
        assert_eq!(Point::new(1.0, 1.0).distance(Point::new(4.0, 5.0)), 5.0);
        assert_eq!(Point::default().distance(Point::default()), 0.0);
    }

    #[test]
    fn test_round_to_non_positive_quantum() {
        assert_eq!(round_to(13.7, 0.0), 13.7);
        assert_eq!(round_to(13.7, -5.0), 13.7);
    }

    #[test]
    fn test_point_round_to_negative() {
        let p = Point::new(-29.0, -31.0).round_to(20.0);
        assert_eq!(p, Point::new(-20.0, -40.0));
    }

    #[test]
    fn test_bounds_new_from_center() {
        let bounds = Bounds::new_from_center(Point::new(100.0, 50.0), Size::new(120.0, 50.0));
        assert_approx_eq!(f32, bounds.min_x(), 40.0);
        assert_approx_eq!(f32, bounds.max_x(), 160.0);
        assert_approx_eq!(f32, bounds.min_y(), 25.0);
        assert_approx_eq!(f32, bounds.max_y(), 75.0);
        assert_eq!(bounds.center(), Point::new(100.0, 50.0));
        assert_eq!(bounds.to_size(), Size::new(120.0, 50.0));
    }

    #[test]
    fn test_bounds_add_padding() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(20.0, 20.0))
            .add_padding(Insets::uniform(5.0));
        assert_approx_eq!(f32, bounds.min_x(), 5.0);
        assert_approx_eq!(f32, bounds.min_y(), 5.0);
        assert_approx_eq!(f32, bounds.width(), 30.0);
        assert_approx_eq!(f32, bounds.height(), 30.0);
    }

    #[test]
    fn test_bounds_contains_point_edges() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        assert!(bounds.contains_point(Point::new(0.0, 0.0)));
        assert!(bounds.contains_point(Point::new(10.0, 10.0)));
        assert!(bounds.contains_point(Point::new(5.0, 5.0)));
        assert!(!bounds.contains_point(Point::new(10.5, 5.0)));
    }

    #[test]
    fn test_bounds_contains_bounds() {
        let outer = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
        let inner = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(20.0, 20.0));
        assert!(outer.contains_bounds(inner));
        assert!(!inner.contains_bounds(outer));
    }

    #[test]
    fn test_bounds_translate() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(50.0, 30.0));
        let moved = bounds.translate(Point::new(100.0, 50.0));
        assert_approx_eq!(f32, moved.min_x(), 110.0);
        assert_approx_eq!(f32, moved.min_y(), 70.0);
        assert_approx_eq!(f32, moved.width(), 50.0);
    }

    #[test]
    fn test_size_at_least() {
        assert_eq!(Size::new(5.0, 40.0).at_least(20.0), Size::new(20.0, 40.0));
    }

    proptest! {
        #[test]
        fn prop_round_to_is_idempotent(value in -5000.0f32..5000.0, quantum in 1u8..50) {
            let quantum = f32::from(quantum);
            let once = round_to(value, quantum);
            prop_assert_eq!(round_to(once, quantum), once);
        }

        #[test]
        fn prop_merge_contains_both(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
        ) {
            let a = Bounds::new_from_center(Point::new(ax, ay), Size::new(10.0, 10.0));
            let b = Bounds::new_from_center(Point::new(bx, by), Size::new(30.0, 20.0));
            let merged = a.merge(&b);
            prop_assert!(merged.contains_bounds(a));
            prop_assert!(merged.contains_bounds(b));
        }
    }
}
