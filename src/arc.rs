// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elliptical arcs.

use core::f64::consts::PI;
use core::ops::{Mul, Range};

use arrayvec::ArrayVec;

use crate::common::{clamp_to_domain, solve_quadratic, SEGMENT_EPSILON};
use crate::nearest::nearest_single;
use crate::param_curve::bbox_from_extrema;
use crate::poly::solve_linear_system;
use crate::{
    Affine, Error, Line, LineIntersection, LineIntersections, Nearest, ParamCurve,
    ParamCurveBounds, ParamCurveExtrema, ParamCurveIntersect, ParamCurveNearest, Point, Rect,
    Result, Vec2, MAX_EXTREMA,
};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// An elliptical arc.
///
/// The arc is the image of part of the unit circle under an affine map.
/// It is parametrized by angle in degrees, measured on the unit circle with
/// `0` pointing along the positive x axis, and runs counterclockwise (in the
/// unit circle's frame) over `start..start + sweep`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arc {
    inner: Affine,
    start: f64,
    sweep: f64,
}

/// Reduce an angle in degrees into `0..360`.
#[inline]
fn wrap_degrees(th: f64) -> f64 {
    th - 360.0 * (th / 360.0).floor()
}

#[inline]
fn unit(th: f64) -> Vec2 {
    Vec2::from_angle(th.to_radians())
}

impl Arc {
    /// Create an arc from its unit circle map, start angle and sweep, in
    /// degrees.
    ///
    /// A negative sweep is turned around by reflecting the unit circle, so
    /// the arc covers the same points in the same direction with an
    /// increasing parameter. Sweeps beyond a full turn are clamped to one.
    pub fn from_affine(inner: Affine, start: f64, sweep: f64) -> Arc {
        let (inner, start, sweep) = if sweep < 0.0 {
            (inner * Affine::scale_non_uniform(1.0, -1.0), -start, -sweep)
        } else {
            (inner, start, sweep)
        };
        Arc {
            inner,
            start,
            sweep: sweep.min(360.0),
        }
    }

    /// Create an arc of the ellipse with the given center and radii, its x
    /// axis rotated counterclockwise by `x_rotation` degrees.
    pub fn new(
        center: impl Into<Point>,
        radii: impl Into<Vec2>,
        x_rotation: f64,
        start: f64,
        sweep: f64,
    ) -> Arc {
        let radii = radii.into();
        let inner = Affine::translate(center.into().to_vec2())
            * Affine::rotate(x_rotation.to_radians())
            * Affine::scale_non_uniform(radii.x, radii.y);
        Arc::from_affine(inner, start, sweep)
    }

    /// A full circle.
    pub fn circle(center: impl Into<Point>, radius: f64) -> Arc {
        Arc::new(center, (radius, radius), 0.0, 0.0, 360.0)
    }

    /// Fit an arc through two to four points, in order.
    ///
    /// * Two points are the ends of a counterclockwise half circle.
    /// * Three points determine a circle; the arc runs from the first to the
    ///   last through the middle one.
    /// * Four points determine an ellipse with axes along x and y, solved
    ///   from `x² + C y² + D x + E y + F = 0`. The arc runs from the first
    ///   point to the last through the others.
    ///
    /// Collinear points, points on no such ellipse, and intermediate points
    /// out of order along the arc are [`Error::Unsolvable`].
    pub fn from_points(points: &[Point]) -> Result<Arc> {
        match *points {
            [p0, p1] => {
                let center = p0.midpoint(p1);
                let r = 0.5 * p0.distance(p1);
                if r == 0.0 || !r.is_finite() {
                    return Err(Error::Unsolvable("arc ends coincide"));
                }
                let start = (p0 - center).atan2().to_degrees();
                Ok(Arc::from_affine(
                    Affine::translate(center.to_vec2()) * Affine::scale(r),
                    start,
                    180.0,
                ))
            }
            [p0, p1, p2] => {
                let row = |p: Point| [p.x, p.y, 1.0];
                let rhs = |p: Point| -p.to_vec2().hypot2();
                let [d, e, f] =
                    solve_linear_system([row(p0), row(p1), row(p2)], [rhs(p0), rhs(p1), rhs(p2)])?;
                let center = Vec2::new(-0.5 * d, -0.5 * e);
                let r2 = center.hypot2() - f;
                if r2 <= 0.0 || !r2.is_finite() {
                    return Err(Error::Unsolvable("points lie on no circle"));
                }
                let inner = Affine::translate(center) * Affine::scale(r2.sqrt());
                Arc::through(inner, p0, &[p1], p2)
            }
            [p0, p1, p2, p3] => {
                let row = |p: Point| [p.y * p.y, p.x, p.y, 1.0];
                let rhs = |p: Point| -p.x * p.x;
                let [c, d, e, f] = solve_linear_system(
                    [row(p0), row(p1), row(p2), row(p3)],
                    [rhs(p0), rhs(p1), rhs(p2), rhs(p3)],
                )?;
                if c <= 0.0 || !c.is_finite() {
                    return Err(Error::Unsolvable("points lie on no axis-aligned ellipse"));
                }
                let center = Vec2::new(-0.5 * d, -0.5 * e / c);
                let k = center.x * center.x + c * center.y * center.y - f;
                if k <= 0.0 || !k.is_finite() {
                    return Err(Error::Unsolvable("points lie on no axis-aligned ellipse"));
                }
                let inner = Affine::translate(center)
                    * Affine::scale_non_uniform(k.sqrt(), (k / c).sqrt());
                Arc::through(inner, p0, &[p1, p2], p3)
            }
            _ => Err(Error::Unsolvable("an arc is fitted through two to four points")),
        }
    }

    /// The arc of the ellipse `inner` from `first` to `last` that visits
    /// `mid` in order.
    fn through(inner: Affine, first: Point, mid: &[Point], last: Point) -> Result<Arc> {
        let inv = inner.try_inverse()?;
        let angle = |p: Point| (inv * p).to_vec2().atan2().to_degrees();
        let a0 = angle(first);
        let mut end = wrap_degrees(angle(last) - a0);
        if end == 0.0 {
            end = 360.0;
        }
        let mut rel: ArrayVec<f64, 2> = mid.iter().map(|&p| wrap_degrees(angle(p) - a0)).collect();
        let in_order = |rel: &[f64], end: f64| {
            rel.iter().all(|&r| r > 0.0 && r < end) && rel.windows(2).all(|w| w[0] < w[1])
        };
        if in_order(rel.as_slice(), end) {
            return Ok(Arc::from_affine(inner, a0, end));
        }
        for r in &mut rel {
            *r = wrap_degrees(-*r);
        }
        let cw_end = 360.0 - end;
        if cw_end > 0.0 && in_order(rel.as_slice(), cw_end) {
            return Ok(Arc::from_affine(inner, a0, -cw_end));
        }
        Err(Error::Unsolvable("points are out of order along the arc"))
    }

    /// The map from the unit circle.
    #[inline]
    pub fn inner(&self) -> Affine {
        self.inner
    }

    /// The start angle, in degrees.
    #[inline]
    pub fn start_angle(&self) -> f64 {
        self.start
    }

    /// The sweep, in degrees.
    #[inline]
    pub fn sweep_angle(&self) -> f64 {
        self.sweep
    }

    /// The end angle, in degrees.
    #[inline]
    pub fn end_angle(&self) -> f64 {
        self.start + self.sweep
    }

    /// The center of the ellipse.
    #[inline]
    pub fn center(&self) -> Point {
        self.inner.translation().to_point()
    }

    /// Is the ellipse a circle?
    pub fn is_circular(&self) -> bool {
        let [a, b, c, d, _, _] = self.inner.as_coeffs();
        let tol = SEGMENT_EPSILON * self.inner.frobenius_norm();
        ((a - d).abs() <= tol && (b + c).abs() <= tol)
            || ((a + d).abs() <= tol && (b - c).abs() <= tol)
    }

    /// Is this arc finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.inner.is_finite() && self.start.is_finite() && self.sweep.is_finite()
    }

    /// Map an angle into the domain, if some turn of it lies there.
    fn to_domain(&self, th: f64) -> Option<f64> {
        let t = self.start + wrap_degrees(th - self.start);
        clamp_to_domain(t, self.start, self.end_angle())
            .or_else(|| clamp_to_domain(t - 360.0, self.start, self.end_angle()))
    }
}

impl ParamCurve for Arc {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        self.inner * unit(t).to_point()
    }

    /// The derivative with respect to the angle in degrees.
    #[inline]
    fn deriv(&self, t: f64) -> Vec2 {
        self.inner.transform_vec(unit(t).turn_90()) * (PI / 180.0)
    }

    #[inline]
    fn domain(&self) -> Range<f64> {
        self.start..self.end_angle()
    }
}

impl ParamCurveBounds for Arc {
    #[inline]
    fn bounding_box(&self, range: Range<f64>) -> Rect {
        bbox_from_extrema(self, range)
    }

    #[inline]
    fn speed_bound(&self, _range: Range<f64>) -> f64 {
        self.inner.frobenius_norm() * (PI / 180.0)
    }

    #[inline]
    fn accel_bound(&self, _range: Range<f64>) -> Option<f64> {
        Some(self.inner.frobenius_norm() * (PI / 180.0) * (PI / 180.0))
    }

    /// Circular arcs have a closed form: the angle towards the point.
    fn nearest_closed_form(&self, p: Point, range: Range<f64>) -> Option<Nearest> {
        if !self.is_circular() {
            return None;
        }
        let inv = self.inner.try_inverse().ok()?;
        let mut best = Nearest {
            distance_sq: p.distance_squared(self.eval(range.start)),
            t: range.start,
        };
        let mut consider = |t: f64| {
            best = best.min(Nearest {
                distance_sq: p.distance_squared(self.eval(t)),
                t,
            });
        };
        consider(range.end);
        let q = (inv * p).to_vec2();
        if q.hypot2() > 0.0 {
            let th = q.atan2().to_degrees();
            let t = range.start + wrap_degrees(th - range.start);
            if let Some(t) = clamp_to_domain(t, range.start, range.end) {
                consider(t);
            }
        }
        Some(best)
    }
}

impl ParamCurveNearest for Arc {
    fn nearest(&self, p: Point, accuracy: f64) -> Nearest {
        nearest_single(self, p, accuracy)
    }
}

impl ParamCurveIntersect for Arc {
    /// Crossings found on the unit circle, after mapping the line back
    /// through the inverse of the arc's map.
    fn line_intersections(
        &self,
        line: &Line,
        range: Range<f64>,
        infinite: bool,
    ) -> LineIntersections {
        let mut result = LineIntersections::new();
        let Ok(inv) = self.inner.try_inverse() else {
            return result;
        };
        if line.is_degenerate() {
            return result;
        }
        let a = (inv * line.p0).to_vec2();
        let b = inv.transform_vec(line.p1 - line.p0);
        for line_t in solve_quadratic(a.hypot2() - 1.0, 2.0 * a.dot(b), b.hypot2()) {
            if !infinite && !(-SEGMENT_EPSILON..=1.0 + SEGMENT_EPSILON).contains(&line_t) {
                continue;
            }
            let th = (a + b * line_t).atan2().to_degrees();
            let Some(t) = self.to_domain(th) else {
                continue;
            };
            if clamp_to_domain(t, range.start, range.end).is_none() {
                continue;
            }
            result.push(LineIntersection {
                line_t,
                segment_t: t.max(range.start).min(range.end),
            });
        }
        result.sort_by(|x, y| x.segment_t.total_cmp(&y.segment_t));
        result
    }
}

impl ParamCurveExtrema for Arc {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        let [a, b, c, d, _, _] = self.inner.as_coeffs();
        let (lo, hi) = (self.start, self.end_angle());
        let mut result = ArrayVec::new();
        // x' = -a sin + c cos vanishes at atan2(c, a), and y likewise.
        for (s, k) in [(c, a), (d, b)] {
            if s == 0.0 && k == 0.0 {
                continue;
            }
            let base = s.atan2(k).to_degrees();
            let mut th = base + 180.0 * ((lo - base) / 180.0).floor();
            while th < hi {
                if th > lo && result.try_push(th).is_err() {
                    break;
                }
                th += 180.0;
            }
        }
        result.sort_by(f64::total_cmp);
        result
    }
}

impl Mul<Arc> for Affine {
    type Output = Arc;

    #[inline]
    fn mul(self, arc: Arc) -> Arc {
        Arc {
            inner: self * arc.inner,
            ..arc
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(p: Point, q: impl Into<Point>) {
        let q = q.into();
        assert!(p.distance(q) < 1e-9, "{p:?} != {q:?}");
    }

    #[test]
    fn circle_eval() {
        let c = Arc::circle((1.0, 2.0), 3.0);
        assert_eq!(c.domain(), 0.0..360.0);
        assert_near(c.eval(0.0), (4.0, 2.0));
        assert_near(c.eval(90.0), (1.0, 5.0));
        assert_near(c.eval(180.0), (-2.0, 2.0));
        assert_near(c.start(), c.end());
        assert!(c.is_circular());
    }

    #[test]
    fn arc_deriv() {
        let a = Arc::new((1.0, -1.0), (3.0, 1.5), 17.0, 20.0, 200.0);
        let delta = 1e-6;
        for i in 0..10 {
            let t = 20.0 + i as f64 * 20.0;
            let d_approx = (a.eval(t + delta) - a.eval(t)) * (1.0 / delta);
            assert!((a.deriv(t) - d_approx).hypot() < 1e-6);
            assert!(a.deriv(t).hypot() <= a.speed_bound(a.domain()));
            let accel = (a.deriv(t + delta) - a.deriv(t)).hypot() / delta;
            assert!(accel <= a.accel_bound(a.domain()).unwrap() + 1e-6);
        }
    }

    #[test]
    fn rotation_in_degrees() {
        let a = Arc::new((1.0, 1.0), (2.0, 1.0), 90.0, 0.0, 360.0);
        assert_near(a.eval(0.0), (1.0, 3.0));
        assert_near(a.eval(90.0), (0.0, 1.0));
        let b = Arc::new((0.0, 0.0), (2.0, 1.0), 45.0, 0.0, 90.0);
        let s = 2f64.sqrt();
        assert_near(b.start(), (s, s));
    }

    #[test]
    fn negative_sweep() {
        let a = Arc::new((0.0, 0.0), (1.0, 1.0), 0.0, 0.0, -90.0);
        assert_eq!(a.sweep_angle(), 90.0);
        assert_near(a.start(), (1.0, 0.0));
        assert_near(a.end(), (0.0, -1.0));
        assert_near(a.eval(a.start_angle() + 45.0), Vec2::from_angle(-PI / 4.0).to_point());
    }

    #[test]
    fn from_two_points() {
        let a = Arc::from_points(&[Point::new(0.0, 0.0), Point::new(2.0, 0.0)]).unwrap();
        assert_near(a.start(), (0.0, 0.0));
        assert_near(a.end(), (2.0, 0.0));
        assert_near(a.eval(a.start_angle() + 90.0), (1.0, -1.0));
        assert_eq!(a.sweep_angle(), 180.0);
    }

    #[test]
    fn from_three_points() {
        let ccw = [
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, 0.0),
        ];
        let a = Arc::from_points(&ccw).unwrap();
        assert_near(a.center(), (0.0, 0.0));
        assert!((a.sweep_angle() - 180.0).abs() < 1e-9);
        assert_near(a.start(), ccw[0]);
        assert_near(a.end(), ccw[2]);
        assert_near(a.eval(a.start_angle() + 90.0), ccw[1]);

        let cw = [
            Point::new(1.0, 0.0),
            Point::new(0.0, -1.0),
            Point::new(-1.0, 0.0),
        ];
        let a = Arc::from_points(&cw).unwrap();
        assert!((a.sweep_angle() - 180.0).abs() < 1e-9);
        assert_near(a.start(), cw[0]);
        assert_near(a.end(), cw[2]);
        assert_near(a.eval(a.start_angle() + 90.0), cw[1]);

        // Long way round.
        let long = [
            Point::new(1.0, 0.0),
            Point::new(-1.0, 0.0),
            Point::new(0.0, 1.0),
        ];
        let a = Arc::from_points(&long).unwrap();
        assert!((a.sweep_angle() - 270.0).abs() < 1e-9);
        assert_near(a.end(), long[2]);
    }

    #[test]
    fn from_four_points() {
        let h = 0.5f64.sqrt();
        let pts = [
            Point::new(2.0, 0.0),
            Point::new(2.0 * h, h),
            Point::new(0.0, 1.0),
            Point::new(-2.0, 0.0),
        ];
        let a = Arc::from_points(&pts).unwrap();
        assert_near(a.center(), (0.0, 0.0));
        let [rx, _, _, ry, _, _] = a.inner().as_coeffs();
        assert!((rx - 2.0).abs() < 1e-9);
        assert!((ry - 1.0).abs() < 1e-9);
        assert!((a.sweep_angle() - 180.0).abs() < 1e-9);
        assert_near(a.eval(a.start_angle() + 45.0), pts[1]);
        assert!(!a.is_circular());

        let out_of_order = [pts[0], pts[2], pts[1], pts[3]];
        assert!(matches!(
            Arc::from_points(&out_of_order),
            Err(Error::Unsolvable(_))
        ));
    }

    #[test]
    fn unsolvable_points() {
        let collinear = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        ];
        assert!(matches!(
            Arc::from_points(&collinear),
            Err(Error::Unsolvable(_))
        ));
        assert!(Arc::from_points(&[Point::ZERO]).is_err());
        assert!(Arc::from_points(&[Point::ZERO, Point::ZERO]).is_err());
        // A hyperbola through these points, not an ellipse.
        let hyperbola = [
            Point::new(1.0, 0.0),
            Point::new(2.0, 3f64.sqrt()),
            Point::new(3.0, 8f64.sqrt()),
            Point::new(4.0, 15f64.sqrt()),
        ];
        assert!(matches!(
            Arc::from_points(&hyperbola),
            Err(Error::Unsolvable(_))
        ));
    }

    #[test]
    fn arc_bounds() {
        let a = Arc::new((0.0, 0.0), (1.0, 1.0), 0.0, 45.0, 90.0);
        let h = 0.5f64.sqrt();
        let bbox = a.bounding_box(a.domain());
        assert!((bbox.x0 + h).abs() < 1e-12);
        assert!((bbox.x1 - h).abs() < 1e-12);
        assert!((bbox.y0 - h).abs() < 1e-12);
        assert!((bbox.y1 - 1.0).abs() < 1e-12);
        assert_eq!(a.extrema().len(), 1);

        let full = Arc::new((0.0, 0.0), (2.0, 1.0), 0.0, 0.0, 360.0);
        let bbox = full.bounding_box(full.domain());
        assert!((bbox.x0 + 2.0).abs() < 1e-12 && (bbox.x1 - 2.0).abs() < 1e-12);
        assert!((bbox.y0 + 1.0).abs() < 1e-12 && (bbox.y1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn arc_crossings() {
        let c = Arc::circle((0.0, 0.0), 1.0);
        let line = Line::new((-2.0, 0.5), (2.0, 0.5));
        let hits = c.line_intersections(&line, c.domain(), false);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].segment_t - 30.0).abs() < 1e-9);
        assert!((hits[1].segment_t - 150.0).abs() < 1e-9);
        let x = 0.75f64.sqrt();
        assert!((hits[0].line_t - (x + 2.0) / 4.0).abs() < 1e-12);

        let upper = Arc::new((0.0, 0.0), (1.0, 1.0), 0.0, 90.0, 180.0);
        let hits = upper.line_intersections(&line, upper.domain(), false);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].segment_t - 150.0).abs() < 1e-9);

        let miss = Line::new((-2.0, 2.0), (2.0, 2.0));
        assert!(c.line_intersections(&miss, c.domain(), true).is_empty());
    }

    #[test]
    fn arc_nearest() {
        let c = Arc::new((0.0, 0.0), (2.0, 2.0), 0.0, 0.0, 90.0);
        let n = c.nearest(Point::new(3.0, 3.0), 1e-9);
        assert!((n.t - 45.0).abs() < 1e-9);
        assert!((n.distance_sq.sqrt() - (18f64.sqrt() - 2.0)).abs() < 1e-9);
        // Outside the sweep, an end wins.
        let n = c.nearest(Point::new(-3.0, -1.0), 1e-9);
        assert!(n.t == 90.0 || n.t == 0.0);
        // Every point is equally near the center.
        let n = c.nearest(Point::ZERO, 1e-9);
        assert!((n.distance_sq - 4.0).abs() < 1e-12);

        let e = Arc::new((0.0, 0.0), (3.0, 1.0), 23.0, 0.0, 300.0);
        let p = Point::new(0.5, 2.0);
        let n = e.nearest(p, 1e-10);
        let brute = (0..=30_000)
            .map(|i| p.distance_squared(e.eval(i as f64 * 0.01)))
            .fold(f64::INFINITY, f64::min);
        assert!(n.distance_sq <= brute + 1e-9);
    }
}
