// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lines.

use core::ops::{Mul, Range};

use arrayvec::ArrayVec;

use crate::common::{DEGENERATE_EPSILON, SEGMENT_EPSILON};
use crate::param_curve::{bbox_from_extrema, poly_line_intersections};
use crate::{
    Affine, LineIntersection, LineIntersections, Nearest, ParamCurve, ParamCurveBounds,
    ParamCurveExtrema, ParamCurveIntersect, ParamCurveNearest, Point, Rect, Vec2, MAX_EXTREMA,
};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A single line.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The line's start point.
    pub p0: Point,
    /// The line's end point.
    pub p1: Point,
}

impl Line {
    /// Create a new line.
    #[inline(always)]
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Line {
        Line {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// The length of the line.
    #[inline]
    pub fn length(self) -> f64 {
        (self.p1 - self.p0).hypot()
    }

    /// The midpoint of the line.
    #[must_use]
    #[inline(always)]
    pub fn midpoint(&self) -> Point {
        self.p0.midpoint(self.p1)
    }

    /// Is this line degenerate, with both end points (nearly) equal?
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        let scale = self.p0.to_vec2().hypot2().max(self.p1.to_vec2().hypot2()).max(1.0);
        (self.p1 - self.p0).hypot2() <= DEGENERATE_EPSILON * scale
    }

    /// Is this line [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.p0.is_finite() && self.p1.is_finite()
    }

    /// The parameter of the orthogonal projection of `p` onto the infinite
    /// line.
    #[inline]
    fn project(&self, p: Point) -> f64 {
        let d = self.p1 - self.p0;
        d.dot(p - self.p0) / d.hypot2()
    }

    /// Crossings with a line lying along this one.
    ///
    /// The overlap of the two is reported by its ends.
    fn overlap(&self, line: &Line, range: Range<f64>, infinite: bool) -> LineIntersections {
        let mut result = LineIntersections::new();
        let (mut lo, mut hi) = (range.start, range.end);
        if !infinite {
            let a = self.project(line.p0);
            let b = self.project(line.p1);
            lo = lo.max(a.min(b));
            hi = hi.min(a.max(b));
        }
        if lo > hi + SEGMENT_EPSILON {
            return result;
        }
        let hi = hi.max(lo);
        for t in [lo, hi] {
            if result.last().is_some_and(|last: &LineIntersection| last.segment_t == t) {
                continue;
            }
            result.push(LineIntersection {
                line_t: line.project(self.eval(t)),
                segment_t: t,
            });
        }
        result
    }
}

impl From<(Point, Point)> for Line {
    #[inline(always)]
    fn from((from, to): (Point, Point)) -> Self {
        Line::new(from, to)
    }
}

impl ParamCurve for Line {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        self.p0.lerp(self.p1, t)
    }

    #[inline]
    fn deriv(&self, _t: f64) -> Vec2 {
        self.p1 - self.p0
    }

    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p1
    }
}

impl ParamCurveBounds for Line {
    #[inline]
    fn bounding_box(&self, range: Range<f64>) -> Rect {
        bbox_from_extrema(self, range)
    }

    #[inline]
    fn speed_bound(&self, _range: Range<f64>) -> f64 {
        (self.p1 - self.p0).hypot()
    }

    #[inline]
    fn accel_bound(&self, _range: Range<f64>) -> Option<f64> {
        Some(0.0)
    }

    fn nearest_closed_form(&self, p: Point, range: Range<f64>) -> Option<Nearest> {
        if self.is_degenerate() {
            return Some(Nearest {
                distance_sq: p.distance_squared(self.p0),
                t: range.start,
            });
        }
        #[expect(
            clippy::manual_clamp,
            reason = "the projection may be NaN, which clamp would propagate"
        )]
        let t = self.project(p).max(range.start).min(range.end);
        Some(Nearest {
            distance_sq: p.distance_squared(self.eval(t)),
            t,
        })
    }
}

impl ParamCurveNearest for Line {
    fn nearest(&self, p: Point, _accuracy: f64) -> Nearest {
        let d = self.p1 - self.p0;
        let dotp = d.dot(p - self.p0);
        let d_squared = d.dot(d);
        let t = if d_squared == 0.0 {
            0.0
        } else {
            (dotp / d_squared).clamp(0.0, 1.0)
        };
        Nearest {
            distance_sq: p.distance_squared(self.eval(t)),
            t,
        }
    }
}

impl ParamCurveIntersect for Line {
    fn line_intersections(
        &self,
        line: &Line,
        range: Range<f64>,
        infinite: bool,
    ) -> LineIntersections {
        if line.is_degenerate() {
            return LineIntersections::new();
        }
        let d = self.p1 - self.p0;
        let dir = line.p1 - line.p0;
        let offset = (self.p0 - line.p0).cross(dir);
        let parallel = d.cross(dir);
        let scale = (d.hypot() * dir.hypot()).max(DEGENERATE_EPSILON);
        if parallel.abs() <= SEGMENT_EPSILON * scale {
            if offset.abs() <= SEGMENT_EPSILON * scale * (1.0 + (self.p0 - line.p0).hypot()) {
                return self.overlap(line, range, infinite);
            }
            return LineIntersections::new();
        }
        poly_line_intersections(&[self.p0.to_vec2(), d], line, range, infinite)
    }
}

impl ParamCurveExtrema for Line {
    #[inline]
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        ArrayVec::new()
    }
}

impl Mul<Line> for Affine {
    type Output = Line;

    #[inline]
    fn mul(self, other: Line) -> Line {
        Line {
            p0: self * other.p0,
            p1: self * other.p1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_nearest() {
        let l = Line::new((0.0, 0.0), (10.0, 0.0));
        let n = l.nearest(Point::new(3.0, 4.0), 1e-9);
        assert_eq!(n.t, 0.3);
        assert_eq!(n.distance_sq, 16.0);
        let n = l.nearest(Point::new(-3.0, 4.0), 1e-9);
        assert_eq!(n.t, 0.0);
        assert_eq!(n.distance_sq, 25.0);

        let n = l.nearest_closed_form(Point::new(3.0, 4.0), 0.5..1.0).unwrap();
        assert_eq!(n.t, 0.5);
        assert_eq!(n.distance_sq, 4.0 + 16.0);

        let dot = Line::new((1.0, 1.0), (1.0, 1.0));
        assert_eq!(dot.nearest(Point::new(4.0, 5.0), 1e-9).distance_sq, 25.0);
    }

    #[test]
    fn line_crossings() {
        let l = Line::new((0.0, 0.0), (4.0, 0.0));
        let cross = Line::new((1.0, -1.0), (1.0, 1.0));
        let hits = l.line_intersections(&cross, 0.0..1.0, false);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].segment_t - 0.25).abs() < 1e-12);
        assert!((hits[0].line_t - 0.5).abs() < 1e-12);

        let short = Line::new((1.0, 1.0), (1.0, 2.0));
        assert!(l.line_intersections(&short, 0.0..1.0, false).is_empty());
        assert_eq!(l.line_intersections(&short, 0.0..1.0, true).len(), 1);
        assert!(l.line_intersections(&cross, 0.5..1.0, true).is_empty());

        let parallel = Line::new((0.0, 1.0), (4.0, 1.0));
        assert!(l.line_intersections(&parallel, 0.0..1.0, true).is_empty());
    }

    #[test]
    fn line_overlap() {
        let l = Line::new((0.0, 0.0), (4.0, 0.0));
        let along = Line::new((3.0, 0.0), (6.0, 0.0));
        let hits = l.line_intersections(&along, 0.0..1.0, false);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].segment_t - 0.75).abs() < 1e-12);
        assert!(hits[0].line_t.abs() < 1e-12);
        assert!((hits[1].segment_t - 1.0).abs() < 1e-12);

        let hits = l.line_intersections(&along, 0.0..1.0, true);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].segment_t, 0.0);

        let touching = Line::new((4.0, 0.0), (5.0, 0.0));
        assert_eq!(l.line_intersections(&touching, 0.0..1.0, false).len(), 1);
        let apart = Line::new((5.0, 0.0), (6.0, 0.0));
        assert!(l.line_intersections(&apart, 0.0..1.0, false).is_empty());
    }

    #[test]
    fn line_bounds() {
        let l = Line::new((0.0, 4.0), (2.0, 0.0));
        assert_eq!(l.bounding_box(0.0..1.0), Rect::new(0.0, 0.0, 2.0, 4.0));
        assert_eq!(l.bounding_box(0.0..0.5), Rect::new(0.0, 2.0, 1.0, 4.0));
        assert!((l.speed_bound(0.0..1.0) - 20f64.sqrt()).abs() < 1e-12);
    }
}
