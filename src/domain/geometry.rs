//! Geometric primitives shared by the map and network views
//!
//! Map coordinates are in the view's coordinate reference system;
//! network diagram coordinates are in the layout's paper space.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance for treating two positions as the same physical anchor
const COINCIDENT_EPSILON: f64 = 1e-9;

/// A 2D position in some coordinate reference
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between this point and another
    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Whether two points occupy the same physical position
    ///
    /// Used to collapse duplicate endpoint anchors (e.g. a reach whose
    /// upstream and downstream structures sit on the same node).
    pub fn coincident(&self, other: Point) -> bool {
        self.distance(other) < COINCIDENT_EPSILON
    }
}

/// Axis-aligned rectangle in view coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// Create a new rectangle from edge coordinates
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Degenerate rectangle covering a single point
    pub fn at_point(p: Point) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left <= right && top <= bottom {
            Some(Rect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Smallest rectangle covering both this one and another
    pub fn union(&self, other: Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Grow the rectangle to cover the given point
    pub fn expand_to(&self, p: Point) -> Rect {
        self.union(Rect::at_point(p))
    }

    /// Translate the rectangle by the given offset
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Get the width of the rectangle
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Get the height of the rectangle
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Check if this rectangle contains a point
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Identifier for a coordinate reference system (e.g. "EPSG:4326")
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs(String);

impl Crs {
    /// Create a CRS identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier string
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Crs {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 15.0, 15.0);
        let c = a.intersect(b).unwrap();
        assert_eq!(c, Rect::new(5.0, 5.0, 10.0, 10.0));

        let far = Rect::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.intersect(far).is_none());
    }

    #[test]
    fn test_rect_expand_to() {
        let r = Rect::at_point(Point::new(1.0, 1.0));
        let r = r.expand_to(Point::new(-2.0, 4.0));
        assert_eq!(r, Rect::new(-2.0, 1.0, 1.0, 4.0));
    }

    #[test]
    fn test_point_coincident() {
        let a = Point::new(100.0, 200.0);
        let b = Point::new(100.0, 200.0);
        let c = Point::new(100.0, 200.1);
        assert!(a.coincident(b));
        assert!(!a.coincident(c));
    }

    #[test]
    fn test_crs_equality() {
        assert_eq!(Crs::new("EPSG:4326"), Crs::from("EPSG:4326"));
        assert_ne!(Crs::new("EPSG:4326"), Crs::new("EPSG:26913"));
    }
}
