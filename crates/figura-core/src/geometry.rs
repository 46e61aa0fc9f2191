//! Geometric primitives for figure layout and positioning.
//!
//! This module provides the fundamental geometric types used throughout
//! Figura for calculating positions, sizes, and bounding boxes of figure
//! elements.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in figure space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular box defined by minimum and maximum coordinates
//! - [`Insets`] - Padding/margin values for four sides
//! - [`Path`] - An outline made of line and cubic bezier segments
//!
//! # Coordinate System
//!
//! Figura uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Value axes therefore map larger values to *smaller* y coordinates.

/// A 2D point in figure coordinate space.
///
/// # Examples
///
/// ```
/// # use figura_core::geometry::Point;
/// let p = Point::new(10.0, 20.0).scale(0.5);
/// assert_eq!(p.x(), 5.0);
/// assert_eq!(p.y(), 10.0);
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

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
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

    /// Returns a size with width and height exchanged.
    ///
    /// Used when text measured along one axis is drawn rotated by 90°.
    pub fn transpose(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Multiplies both dimensions by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// A rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Creates bounds spanning two corner points, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Creates bounds of the given size with the top-left corner at the origin
    pub fn from_size(size: Size) -> Self {
        Self::new_from_top_left(Point::default(), size)
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

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Merges two bounds into the smallest bounds containing both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use figura_core::geometry::{Bounds, Point, Size};
    /// let caption = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 30.0));
    /// let plot = Bounds::new_from_top_left(Point::new(10.0, 40.0), Size::new(120.0, 80.0));
    ///
    /// let combined = caption.merge(&plot);
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

    /// Shrinks the bounds by the given insets.
    ///
    /// The result never has a negative width or height; over-large insets
    /// collapse the bounds onto their inner edge.
    pub fn inset(&self, insets: Insets) -> Self {
        let min_x = self.min_x + insets.left();
        let min_y = self.min_y + insets.top();
        Self {
            min_x,
            min_y,
            max_x: (self.max_x - insets.right()).max(min_x),
            max_y: (self.max_y - insets.bottom()).max(min_y),
        }
    }

    /// Returns true if the point lies inside or on the edge of the bounds
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// Padding or margin values for the four sides of a box
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates insets with individual values (CSS order: top, right, bottom, left)
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates insets with the same value on all four sides
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }

    /// Returns the sum of left and right insets
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Returns the sum of top and bottom insets
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }

    /// Multiplies all four sides by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self::new(
            self.top * factor,
            self.right * factor,
            self.bottom * factor,
            self.left * factor,
        )
    }
}

/// A single drawing command of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic bezier segment: two control points, then the end point.
    CubicTo(Point, Point, Point),
    Close,
}

/// An outline built from straight and cubic bezier segments.
///
/// # Examples
///
/// ```
/// # use figura_core::geometry::{Path, Point};
/// let path = Path::polygon(&[
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.0),
///     Point::new(10.0, 10.0),
/// ]);
/// assert_eq!(path.to_svg_data(), "M 0 0 L 10 0 L 10 10 Z");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a closed polygon through the given vertices.
    pub fn polygon(points: &[Point]) -> Self {
        let mut path = Self::new();
        for (i, point) in points.iter().enumerate() {
            if i == 0 {
                path.move_to(*point);
            } else {
                path.line_to(*point);
            }
        }
        if !points.is_empty() {
            path.close();
        }
        path
    }

    pub fn move_to(&mut self, point: Point) {
        self.commands.push(PathCommand::MoveTo(point));
    }

    pub fn line_to(&mut self, point: Point) {
        self.commands.push(PathCommand::LineTo(point));
    }

    pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, end: Point) {
        self.commands.push(PathCommand::CubicTo(ctrl1, ctrl2, end));
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Serializes the path to SVG path data (`d` attribute).
    pub fn to_svg_data(&self) -> String {
        self.commands
            .iter()
            .map(|command| match command {
                PathCommand::MoveTo(p) => format!("M {} {}", p.x, p.y),
                PathCommand::LineTo(p) => format!("L {} {}", p.x, p.y),
                PathCommand::CubicTo(c1, c2, p) => {
                    format!("C {} {}, {} {}, {} {}", c1.x, c1.y, c2.x, c2.y, p.x, p.y)
                }
                PathCommand::Close => "Z".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    /// Insetting stays inside the original bounds and never goes negative.
    fn check_inset_stays_inside(bounds: Bounds, inset: f32) -> Result<(), TestCaseError> {
        let inner = bounds.inset(Insets::uniform(inset));
        prop_assert!(inner.width() >= 0.0 && inner.height() >= 0.0);
        prop_assert!(inner.min_x() >= bounds.min_x() && inner.min_y() >= bounds.min_y());
        if inner.width() > 0.0 {
            prop_assert!(approx_eq!(
                f32,
                inner.width(),
                bounds.width() - 2.0 * inset,
                epsilon = 0.01
            ));
        }
        Ok(())
    }

    /// Merged bounds contain both inputs' centers.
    fn check_merge_contains_centers(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged = b1.merge(&b2);
        prop_assert!(merged.contains(b1.center()));
        prop_assert!(merged.contains(b2.center()));
        Ok(())
    }

    proptest! {
        #[test]
        fn inset_stays_inside(bounds in bounds_strategy(), inset in 0.0f32..300.0) {
            check_inset_stays_inside(bounds, inset)?;
        }

        #[test]
        fn merge_contains_centers(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_merge_contains_centers(b1, b2)?;
        }
    }
}
