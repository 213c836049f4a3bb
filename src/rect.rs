// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A rectangle.

use core::ops::{Add, Sub};

use crate::{Point, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// An axis-aligned rectangle.
///
/// Used throughout the crate as a bounding box. A rectangle built by
/// [`Rect::from_points`] or grown with [`Rect::union_pt`] always has
/// `x0 <= x1` and `y0 <= y1`.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// The minimum x coordinate.
    pub x0: f64,
    /// The minimum y coordinate.
    pub y0: f64,
    /// The maximum x coordinate.
    pub x1: f64,
    /// The maximum y coordinate.
    pub y1: f64,
}

impl Rect {
    /// A new rectangle from minimum and maximum coordinates.
    #[inline(always)]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect { x0, y0, x1, y1 }
    }

    /// A new rectangle from two points.
    ///
    /// The result will have non-negative width and height.
    #[inline]
    pub fn from_points(p0: impl Into<Point>, p1: impl Into<Point>) -> Rect {
        let p0 = p0.into();
        let p1 = p1.into();
        Rect {
            x0: p0.x,
            y0: p0.y,
            x1: p1.x,
            y1: p1.y,
        }
        .abs()
    }

    /// A degenerate rectangle containing only `p`.
    #[inline]
    pub fn from_point(p: Point) -> Rect {
        Rect::new(p.x, p.y, p.x, p.y)
    }

    /// The width of the rectangle.
    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// The height of the rectangle.
    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The larger of width and height.
    #[inline]
    pub fn max_extent(&self) -> f64 {
        self.width().max(self.height())
    }

    /// The center point of the rectangle.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(0.5 * (self.x0 + self.x1), 0.5 * (self.y0 + self.y1))
    }

    /// Take absolute value of width and height.
    ///
    /// The resulting rect has the same extents as the original, but is
    /// guaranteed to have non-negative width and height.
    #[inline]
    pub fn abs(&self) -> Rect {
        let Rect { x0, y0, x1, y1 } = *self;
        Rect::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    /// The smallest rectangle enclosing two rectangles.
    #[inline]
    pub fn union(&self, other: Rect) -> Rect {
        Rect::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Compute the union with one point.
    ///
    /// This method includes the perimeter of zero-area rectangles.
    #[inline]
    pub fn union_pt(&self, pt: Point) -> Rect {
        Rect::new(
            self.x0.min(pt.x),
            self.y0.min(pt.y),
            self.x1.max(pt.x),
            self.y1.max(pt.y),
        )
    }

    /// Expand the rectangle by `margin` on every side.
    #[inline]
    pub fn inflate(&self, margin: f64) -> Rect {
        Rect::new(
            self.x0 - margin,
            self.y0 - margin,
            self.x1 + margin,
            self.y1 + margin,
        )
    }

    /// Do the two rectangles share at least one point?
    ///
    /// Touching edges count as overlapping.
    #[inline]
    pub fn overlaps(&self, other: Rect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    /// Does the rectangle contain `pt`, boundary included?
    #[inline]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x0 && pt.x <= self.x1 && pt.y >= self.y0 && pt.y <= self.y1
    }

    /// Euclidean distance from `pt` to the closest point of the rectangle.
    ///
    /// Zero when the point is inside.
    #[inline]
    pub fn distance_to_point(&self, pt: Point) -> f64 {
        let dx = (self.x0 - pt.x).max(pt.x - self.x1).max(0.0);
        let dy = (self.y0 - pt.y).max(pt.y - self.y1).max(0.0);
        Vec2::new(dx, dy).hypot()
    }

    /// Is this rectangle finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.x1.is_finite() && self.y0.is_finite() && self.y1.is_finite()
    }
}

impl From<(Point, Point)> for Rect {
    fn from(points: (Point, Point)) -> Rect {
        Rect::from_points(points.0, points.1)
    }
}

impl Add<Vec2> for Rect {
    type Output = Rect;

    #[inline]
    fn add(self, v: Vec2) -> Rect {
        Rect::new(self.x0 + v.x, self.y0 + v.y, self.x1 + v.x, self.y1 + v.y)
    }
}

impl Sub<Vec2> for Rect {
    type Output = Rect;

    #[inline]
    fn sub(self, v: Vec2) -> Rect {
        Rect::new(self.x0 - v.x, self.y0 - v.y, self.x1 - v.x, self.y1 - v.y)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Point, Rect};

    #[test]
    fn union_pt_grows() {
        let r = Rect::from_point(Point::new(1.0, 1.0))
            .union_pt(Point::new(-1.0, 3.0))
            .union_pt(Point::new(2.0, 0.0));
        assert_eq!(r, Rect::new(-1.0, 0.0, 2.0, 3.0));
    }

    #[test]
    fn distance() {
        let r = Rect::new(0.0, 0.0, 2.0, 1.0);
        assert_eq!(r.distance_to_point(Point::new(1.0, 0.5)), 0.0);
        assert_eq!(r.distance_to_point(Point::new(5.0, 0.5)), 3.0);
        assert_eq!(r.distance_to_point(Point::new(5.0, 5.0)), 5.0);
    }

    #[test]
    fn overlap() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(a.overlaps(Rect::new(1.0, 1.0, 2.0, 2.0)));
        assert!(a.overlaps(Rect::new(0.25, 0.25, 0.5, 0.5)));
        assert!(!a.overlaps(Rect::new(1.5, 0.0, 2.0, 1.0)));
    }
}
