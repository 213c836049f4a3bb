// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The closed set of curve kinds.

use core::ops::Range;

use crate::common::SEGMENT_EPSILON;
use crate::{
    Affine, Arc, CubicBez, CurvePath, Line, LineIntersection, LineIntersections, Nearest,
    ParamCurve, ParamCurveBounds, ParamCurveIntersect, ParamCurveNearest, Point, QuadBez, Rect,
    Vec2,
};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Any of the supported curves.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Curve {
    /// A single point, constant over `0..1`.
    Point(Point),
    /// A line segment.
    Line(Line),
    /// A quadratic Bézier segment.
    Quad(QuadBez),
    /// A cubic Bézier segment.
    Cubic(CubicBez),
    /// An elliptical arc, parametrized in degrees.
    Arc(Arc),
    /// Pieces joined end to end.
    Path(CurvePath),
}

impl Curve {
    /// Apply an affine map, keeping the parametrization.
    pub fn transform(&self, affine: Affine) -> Curve {
        match self {
            Curve::Point(p) => Curve::Point(affine * *p),
            Curve::Line(l) => Curve::Line(affine * *l),
            Curve::Quad(q) => Curve::Quad(affine * *q),
            Curve::Cubic(c) => Curve::Cubic(affine * *c),
            Curve::Arc(a) => Curve::Arc(affine * *a),
            Curve::Path(path) => Curve::Path(
                path.pieces()
                    .iter()
                    .map(|piece| piece.transform(affine))
                    .collect(),
            ),
        }
    }

    /// Is this a line segment?
    #[inline]
    pub fn as_line(&self) -> Option<Line> {
        match self {
            Curve::Line(l) => Some(*l),
            _ => None,
        }
    }
}

/// Crossing of a single point with a line: the point must lie on it.
fn point_on_line(p: Point, line: &Line, t: f64, infinite: bool) -> LineIntersections {
    let mut result = LineIntersections::new();
    let dir = line.p1 - line.p0;
    let len2 = dir.hypot2();
    if len2 == 0.0 {
        return result;
    }
    let line_t = (p - line.p0).dot(dir) / len2;
    let off = (p - line.p0).cross(dir).abs() / len2.sqrt();
    let scale = (p - line.p0).hypot().max(1.0);
    let on_segment = (-SEGMENT_EPSILON..=1.0 + SEGMENT_EPSILON).contains(&line_t);
    if off <= SEGMENT_EPSILON * scale && (infinite || on_segment) {
        result.push(LineIntersection {
            line_t,
            segment_t: t,
        });
    }
    result
}

impl ParamCurve for Curve {
    fn eval(&self, t: f64) -> Point {
        match self {
            Curve::Point(p) => *p,
            Curve::Line(l) => l.eval(t),
            Curve::Quad(q) => q.eval(t),
            Curve::Cubic(c) => c.eval(t),
            Curve::Arc(a) => a.eval(t),
            Curve::Path(path) => path.eval(t),
        }
    }

    fn deriv(&self, t: f64) -> Vec2 {
        match self {
            Curve::Point(_) => Vec2::ZERO,
            Curve::Line(l) => l.deriv(t),
            Curve::Quad(q) => q.deriv(t),
            Curve::Cubic(c) => c.deriv(t),
            Curve::Arc(a) => a.deriv(t),
            Curve::Path(path) => path.deriv(t),
        }
    }

    fn domain(&self) -> Range<f64> {
        match self {
            Curve::Arc(a) => a.domain(),
            Curve::Path(path) => path.domain(),
            _ => 0.0..1.0,
        }
    }
}

impl ParamCurveBounds for Curve {
    fn bounding_box(&self, range: Range<f64>) -> Rect {
        match self {
            Curve::Point(p) => Rect::from_point(*p),
            Curve::Line(l) => l.bounding_box(range),
            Curve::Quad(q) => q.bounding_box(range),
            Curve::Cubic(c) => c.bounding_box(range),
            Curve::Arc(a) => a.bounding_box(range),
            Curve::Path(path) => path.bounding_box(range),
        }
    }

    fn speed_bound(&self, range: Range<f64>) -> f64 {
        match self {
            Curve::Point(_) => 0.0,
            Curve::Line(l) => l.speed_bound(range),
            Curve::Quad(q) => q.speed_bound(range),
            Curve::Cubic(c) => c.speed_bound(range),
            Curve::Arc(a) => a.speed_bound(range),
            Curve::Path(path) => path.speed_bound(range),
        }
    }

    fn accel_bound(&self, range: Range<f64>) -> Option<f64> {
        match self {
            Curve::Point(_) => Some(0.0),
            Curve::Line(l) => l.accel_bound(range),
            Curve::Quad(q) => q.accel_bound(range),
            Curve::Cubic(c) => c.accel_bound(range),
            Curve::Arc(a) => a.accel_bound(range),
            Curve::Path(path) => path.accel_bound(range),
        }
    }

    fn nearest_closed_form(&self, p: Point, range: Range<f64>) -> Option<Nearest> {
        match self {
            Curve::Point(q) => Some(Nearest {
                distance_sq: p.distance_squared(*q),
                t: range.start,
            }),
            Curve::Line(l) => l.nearest_closed_form(p, range),
            Curve::Quad(q) => q.nearest_closed_form(p, range),
            Curve::Cubic(c) => c.nearest_closed_form(p, range),
            Curve::Arc(a) => a.nearest_closed_form(p, range),
            Curve::Path(path) => path.nearest_closed_form(p, range),
        }
    }
}

impl ParamCurveNearest for Curve {
    fn nearest(&self, p: Point, accuracy: f64) -> Nearest {
        match self {
            Curve::Point(q) => Nearest {
                distance_sq: p.distance_squared(*q),
                t: 0.0,
            },
            Curve::Line(l) => l.nearest(p, accuracy),
            Curve::Quad(q) => q.nearest(p, accuracy),
            Curve::Cubic(c) => c.nearest(p, accuracy),
            Curve::Arc(a) => a.nearest(p, accuracy),
            Curve::Path(path) => path.nearest(p, accuracy),
        }
    }
}

impl ParamCurveIntersect for Curve {
    fn line_intersections(
        &self,
        line: &Line,
        range: Range<f64>,
        infinite: bool,
    ) -> LineIntersections {
        match self {
            Curve::Point(p) => point_on_line(*p, line, range.start, infinite),
            Curve::Line(l) => l.line_intersections(line, range, infinite),
            Curve::Quad(q) => q.line_intersections(line, range, infinite),
            Curve::Cubic(c) => c.line_intersections(line, range, infinite),
            Curve::Arc(a) => a.line_intersections(line, range, infinite),
            Curve::Path(path) => path.line_intersections(line, range, infinite),
        }
    }
}

impl From<Point> for Curve {
    #[inline]
    fn from(p: Point) -> Curve {
        Curve::Point(p)
    }
}

impl From<Line> for Curve {
    #[inline]
    fn from(l: Line) -> Curve {
        Curve::Line(l)
    }
}

impl From<QuadBez> for Curve {
    #[inline]
    fn from(q: QuadBez) -> Curve {
        Curve::Quad(q)
    }
}

impl From<CubicBez> for Curve {
    #[inline]
    fn from(c: CubicBez) -> Curve {
        Curve::Cubic(c)
    }
}

impl From<Arc> for Curve {
    #[inline]
    fn from(a: Arc) -> Curve {
        Curve::Arc(a)
    }
}

impl From<CurvePath> for Curve {
    #[inline]
    fn from(path: CurvePath) -> Curve {
        Curve::Path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_matches_variants() {
        let q = QuadBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 0.0));
        let c: Curve = q.into();
        assert_eq!(c.eval(0.3), q.eval(0.3));
        assert_eq!(c.deriv(0.3), q.deriv(0.3));
        assert_eq!(c.domain(), 0.0..1.0);
        assert_eq!(c.bounding_box(0.0..1.0), q.bounding_box(0.0..1.0));

        let a = Arc::circle((0.0, 0.0), 1.0);
        assert_eq!(Curve::from(a).domain(), 0.0..360.0);
        assert!(Curve::from(a).as_line().is_none());
    }

    #[test]
    fn point_curve() {
        let c = Curve::Point(Point::new(1.0, 1.0));
        assert_eq!(c.deriv(0.5), Vec2::ZERO);
        assert_eq!(c.speed_bound(0.0..1.0), 0.0);
        assert_eq!(c.nearest(Point::new(4.0, 5.0), 0.0).distance_sq, 25.0);
        let through = Line::new((0.0, 0.0), (2.0, 2.0));
        let hits = c.line_intersections(&through, 0.0..1.0, false);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line_t, 0.5);
        let beside = Line::new((0.0, 0.0), (2.0, 0.0));
        assert!(c.line_intersections(&beside, 0.0..1.0, true).is_empty());
    }

    #[test]
    fn transform_keeps_parameters() {
        let cubic = CubicBez::new((0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0));
        let mut path = CurvePath::new();
        path.push(cubic);
        path.push(Arc::new((5.0, 0.0), (1.0, 1.0), 0.0, 180.0, -180.0));
        let affine = Affine::translate((1.0, -2.0)) * Affine::rotate(0.7) * Affine::scale(2.0);
        for curve in [Curve::from(cubic), Curve::from(path)] {
            let moved = curve.transform(affine);
            assert_eq!(moved.domain(), curve.domain());
            let d = curve.domain();
            for i in 0..=8 {
                let t = d.start + (d.end - d.start) * (i as f64 / 8.0);
                assert!(moved.eval(t).distance(affine * curve.eval(t)) < 1e-9);
            }
        }
    }
}
