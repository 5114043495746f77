//! Geometric primitives for diagram placement and hit testing.
//!
//! This module provides the geometric types used throughout Patchbay for
//! positioning symbols, describing cable segments, and bounding drag targets.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas or display space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//! - [`Insets`] - Padding/margin values for four sides
//!
//! # Coordinate System
//!
//! Patchbay uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! The same types are used for logical canvas units and for display pixels;
//! [`crate::viewport::Viewport`] converts between the two.

use serde::{Deserialize, Serialize};

/// A 2D point.
///
/// # Examples
///
/// ```
/// # use patchbay_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
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

    /// Returns true when both coordinates are finite numbers
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
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

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }

    /// Multiplies both coordinates by the given factor.
    ///
    /// # Examples
    ///
    /// ```
    /// # use patchbay_core::geometry::Point;
    /// let point = Point::new(10.0, 20.0);
    ///
    /// let halved = point.scale(0.5);
    /// assert_eq!(halved.x(), 5.0);
    /// assert_eq!(halved.y(), 10.0);
    /// ```
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Clamps the point into the given bounds, axis by axis.
    ///
    /// # Examples
    ///
    /// ```
    /// # use patchbay_core::geometry::{Bounds, Point};
    /// let area = Bounds::new(50.0, 50.0, 1150.0, 750.0);
    /// assert_eq!(Point::new(5.0, 5.0).clamp_within(area), Point::new(50.0, 50.0));
    /// assert_eq!(Point::new(600.0, 900.0).clamp_within(area), Point::new(600.0, 750.0));
    /// ```
    pub fn clamp_within(self, bounds: Bounds) -> Self {
        Self {
            x: self.x.max(bounds.min_x).min(bounds.max_x),
            y: self.y.max(bounds.min_y).min(bounds.max_y),
        }
    }

    /// Shortest distance from this point to the segment `a`-`b`.
    ///
    /// A degenerate segment (`a == b`) measures the distance to `a`.
    pub fn distance_to_segment(self, a: Point, b: Point) -> f32 {
        let ab = b.sub_point(a);
        let len_sq = ab.x * ab.x + ab.y * ab.y;
        if len_sq == 0.0 {
            return self.distance(a);
        }

        let ap = self.sub_point(a);
        let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
        self.distance(a.add_point(ab.scale(t)))
    }

    /// Rotates the point about the origin by `degrees`.
    ///
    /// With Y growing downward a positive angle turns clockwise on screen,
    /// matching SVG's `rotate()`.
    pub fn rotate(self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
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

    /// Multiplies both dimensions by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Returns the center point of a box of this size anchored at the origin
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Returns true if both dimensions are finite and strictly positive
    pub fn is_positive(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
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
    /// Creates bounds from explicit edges
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

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

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns true if the point lies inside or on the edge of the bounds
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Shrinks the bounds by the given insets.
    ///
    /// # Examples
    ///
    /// ```
    /// # use patchbay_core::geometry::{Bounds, Insets, Point, Size};
    /// let canvas = Bounds::new_from_top_left(Point::default(), Size::new(1200.0, 800.0));
    /// let inner = canvas.shrink(Insets::uniform(50.0));
    /// assert_eq!(inner.min_x(), 50.0);
    /// assert_eq!(inner.max_y(), 750.0);
    /// ```
    pub fn shrink(self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x + insets.left(),
            min_y: self.min_y + insets.top(),
            max_x: self.max_x - insets.right(),
            max_y: self.max_y - insets.bottom(),
        }
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
    /// Creates new insets with specified values for each side
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
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
    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_add_sub() {
        let p1 = Point::new(5.0, 8.0);
        let p2 = Point::new(2.0, 3.0);
        assert_eq!(p1.add_point(p2), Point::new(7.0, 11.0));
        assert_eq!(p1.sub_point(p2), Point::new(3.0, 5.0));
    }

    #[test]
    fn test_point_distance() {
        assert_eq!(Point::new(3.0, 4.0).hypot(), 5.0);
        assert_eq!(Point::new(1.0, 1.0).distance(Point::new(4.0, 5.0)), 5.0);
    }

    #[test]
    fn test_point_rotate_quarter_turn() {
        let rotated = Point::new(10.0, 0.0).rotate(90.0);
        assert!((rotated.x() - 0.0).abs() < 1e-4);
        assert!((rotated.y() - 10.0).abs() < 1e-4);
        assert_eq!(Point::new(3.0, -2.0).rotate(0.0), Point::new(3.0, -2.0));
    }

    #[test]
    fn test_point_is_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f32::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_clamp_within_keeps_inside_points() {
        let bounds = Bounds::new(50.0, 50.0, 1150.0, 750.0);
        let inside = Point::new(600.0, 400.0);
        assert_eq!(inside.clamp_within(bounds), inside);
    }

    #[test]
    fn test_clamp_within_each_edge() {
        let bounds = Bounds::new(50.0, 50.0, 1150.0, 750.0);
        assert_eq!(
            Point::new(-10.0, 400.0).clamp_within(bounds),
            Point::new(50.0, 400.0)
        );
        assert_eq!(
            Point::new(2000.0, 400.0).clamp_within(bounds),
            Point::new(1150.0, 400.0)
        );
        assert_eq!(
            Point::new(600.0, -1.0).clamp_within(bounds),
            Point::new(600.0, 50.0)
        );
        assert_eq!(
            Point::new(600.0, 799.0).clamp_within(bounds),
            Point::new(600.0, 750.0)
        );
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);

        // Perpendicular foot inside the segment
        assert_eq!(Point::new(5.0, 3.0).distance_to_segment(a, b), 3.0);
        // Beyond the end points the nearest end point is used
        assert_eq!(Point::new(-3.0, 4.0).distance_to_segment(a, b), 5.0);
        assert_eq!(Point::new(13.0, 4.0).distance_to_segment(a, b), 5.0);
    }

    #[test]
    fn test_distance_to_degenerate_segment() {
        let a = Point::new(2.0, 2.0);
        assert_eq!(Point::new(5.0, 6.0).distance_to_segment(a, a), 5.0);
    }

    #[test]
    fn test_bounds_new_from_center() {
        let bounds = Bounds::new_from_center(Point::new(50.0, 60.0), Size::new(20.0, 30.0));

        assert_eq!(bounds.min_x(), 40.0);
        assert_eq!(bounds.min_y(), 45.0);
        assert_eq!(bounds.max_x(), 60.0);
        assert_eq!(bounds.max_y(), 75.0);
        assert_eq!(bounds.center(), Point::new(50.0, 60.0));
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 30.0);
    }

    #[test]
    fn test_bounds_new_from_top_left() {
        let top_left = Point::new(10.0, 20.0);
        let bounds = Bounds::new_from_top_left(top_left, Size::new(30.0, 40.0));

        assert_eq!(bounds.max_x(), 40.0);
        assert_eq!(bounds.max_y(), 60.0);
        assert_eq!(bounds.min_x(), 10.0);
        assert_eq!(bounds.min_y(), 20.0);
    }

    #[test]
    fn test_bounds_contains_edges() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(bounds.contains(Point::new(0.0, 0.0)));
        assert!(bounds.contains(Point::new(10.0, 10.0)));
        assert!(bounds.contains(Point::new(5.0, 5.0)));
        assert!(!bounds.contains(Point::new(10.1, 5.0)));
        assert!(!bounds.contains(Point::new(5.0, -0.1)));
    }

    #[test]
    fn test_bounds_shrink() {
        let bounds = Bounds::new(0.0, 0.0, 100.0, 80.0);
        let shrunk = bounds.shrink(Insets::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(shrunk, Bounds::new(4.0, 1.0, 98.0, 77.0));
    }

    #[test]
    fn test_size_helpers() {
        let size = Size::new(1200.0, 800.0);
        assert_eq!(size.center(), Point::new(600.0, 400.0));
        assert_eq!(size.scale(0.5), Size::new(600.0, 400.0));
        assert!(size.is_positive());
        assert!(!Size::new(0.0, 10.0).is_positive());
        assert!(!Size::new(f32::NAN, 10.0).is_positive());
    }
}
