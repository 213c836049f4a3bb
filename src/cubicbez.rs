// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic Bézier segments.

use core::ops::{Mul, Range};

use arrayvec::ArrayVec;

use crate::common::solve_quadratic;
use crate::nearest::nearest_single;
use crate::param_curve::{bbox_from_extrema, poly_line_intersections};
use crate::{
    Affine, Line, LineIntersections, Nearest, ParamCurve, ParamCurveBounds, ParamCurveExtrema,
    ParamCurveIntersect, ParamCurveNearest, Point, QuadBez, Rect, Vec2, MAX_EXTREMA,
};

/// A single cubic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(missing_docs, reason = "A type should be obvious enough")]
pub struct CubicBez {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicBez {
    /// Create a new cubic Bézier segment.
    #[inline(always)]
    pub fn new<P: Into<Point>>(p0: P, p1: P, p2: P, p3: P) -> CubicBez {
        CubicBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
            p3: p3.into(),
        }
    }

    /// The power basis coefficients, so that
    /// `B(t) = c0 + c1 t + c2 t² + c3 t³`.
    #[inline]
    pub(crate) fn coefficients(&self) -> [Vec2; 4] {
        let c0 = self.p0.to_vec2();
        let c1 = 3.0 * (self.p1 - self.p0);
        let c2 = 3.0 * ((self.p2 - self.p1) - (self.p1 - self.p0));
        let c3 = (self.p3 - self.p0) + 3.0 * (self.p1 - self.p2);
        [c0, c1, c2, c3]
    }

    /// The derivative as a quadratic Bézier whose control points are
    /// velocity vectors.
    #[inline]
    pub fn hodograph(&self) -> QuadBez {
        QuadBez::new(
            (3.0 * (self.p1 - self.p0)).to_point(),
            (3.0 * (self.p2 - self.p1)).to_point(),
            (3.0 * (self.p3 - self.p2)).to_point(),
        )
    }

    /// The segment covering `range` of this one, reparametrized to `0..1`.
    pub fn subsegment(&self, range: Range<f64>) -> CubicBez {
        let (t0, t1) = (range.start, range.end);
        let p0 = self.eval(t0);
        let p3 = self.eval(t1);
        let scale = (t1 - t0) * (1.0 / 3.0);
        let p1 = p0 + scale * self.deriv(t0);
        let p2 = p3 - scale * self.deriv(t1);
        CubicBez { p0, p1, p2, p3 }
    }

    /// Subdivide into halves, using de Casteljau.
    #[inline]
    pub fn subdivide(&self) -> (CubicBez, CubicBez) {
        let pm = self.eval(0.5);
        (
            CubicBez::new(
                self.p0,
                self.p0.midpoint(self.p1),
                ((self.p0.to_vec2() + self.p1.to_vec2() * 2.0 + self.p2.to_vec2()) * 0.25)
                    .to_point(),
                pm,
            ),
            CubicBez::new(
                pm,
                ((self.p1.to_vec2() + self.p2.to_vec2() * 2.0 + self.p3.to_vec2()) * 0.25)
                    .to_point(),
                self.p2.midpoint(self.p3),
                self.p3,
            ),
        )
    }

    /// Is this cubic Bezier curve finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite() && self.p3.is_finite()
    }
}

impl ParamCurve for CubicBez {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let v = self.p0.to_vec2() * (mt * mt * mt)
            + (self.p1.to_vec2() * (mt * mt * 3.0)
                + (self.p2.to_vec2() * (mt * 3.0) + self.p3.to_vec2() * t) * t)
                * t;
        v.to_point()
    }

    #[inline]
    fn deriv(&self, t: f64) -> Vec2 {
        self.hodograph().eval(t).to_vec2()
    }

    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p3
    }
}

impl ParamCurveBounds for CubicBez {
    #[inline]
    fn bounding_box(&self, range: Range<f64>) -> Rect {
        bbox_from_extrema(self, range)
    }

    /// The velocity over `range` lies in the hull of the hodograph's
    /// control points.
    fn speed_bound(&self, range: Range<f64>) -> f64 {
        let h = self.hodograph().subsegment(range);
        h.p0.to_vec2()
            .hypot()
            .max(h.p1.to_vec2().hypot())
            .max(h.p2.to_vec2().hypot())
    }

    #[inline]
    fn accel_bound(&self, range: Range<f64>) -> Option<f64> {
        Some(self.hodograph().speed_bound(range))
    }
}

impl ParamCurveNearest for CubicBez {
    /// Find the nearest point, by bisection with pruning.
    fn nearest(&self, p: Point, accuracy: f64) -> Nearest {
        nearest_single(self, p, accuracy)
    }
}

impl ParamCurveIntersect for CubicBez {
    fn line_intersections(
        &self,
        line: &Line,
        range: Range<f64>,
        infinite: bool,
    ) -> LineIntersections {
        if line.is_degenerate() {
            return LineIntersections::new();
        }
        poly_line_intersections(&self.coefficients(), line, range, infinite)
    }
}

impl ParamCurveExtrema for CubicBez {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        fn one_coord(result: &mut ArrayVec<f64, MAX_EXTREMA>, d0: f64, d1: f64, d2: f64) {
            let a = d0 - 2.0 * d1 + d2;
            let b = 2.0 * (d1 - d0);
            let c = d0;
            for t in solve_quadratic(c, b, a) {
                if t > 0.0 && t < 1.0 {
                    result.push(t);
                }
            }
        }
        let mut result = ArrayVec::new();
        let d0 = self.p1 - self.p0;
        let d1 = self.p2 - self.p1;
        let d2 = self.p3 - self.p2;
        one_coord(&mut result, d0.x, d1.x, d2.x);
        one_coord(&mut result, d0.y, d1.y, d2.y);
        result.sort_by(f64::total_cmp);
        result
    }
}

impl From<QuadBez> for CubicBez {
    #[inline]
    fn from(q: QuadBez) -> CubicBez {
        q.raise()
    }
}

impl Mul<CubicBez> for Affine {
    type Output = CubicBez;

    #[inline]
    fn mul(self, c: CubicBez) -> CubicBez {
        CubicBez {
            p0: self * c.p0,
            p1: self * c.p1,
            p2: self * c.p2,
            p3: self * c.p3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CubicBez {
        CubicBez::new((0.0, 0.0), (1.0, 3.0), (3.0, -2.0), (4.0, 1.0))
    }

    #[test]
    fn cubicbez_deriv() {
        let c = sample();
        let delta = 1e-6;
        for i in 0..10 {
            let t = i as f64 * 0.1;
            let p = c.eval(t);
            let p1 = c.eval(t + delta);
            let d_approx = (p1 - p) * (1.0 / delta);
            assert!((c.deriv(t) - d_approx).hypot() < delta * 20.0);
        }
    }

    #[test]
    fn cubicbez_coefficients() {
        let c = sample();
        let [c0, c1, c2, c3] = c.coefficients();
        for i in 0..=10 {
            let t = i as f64 * 0.1;
            let p = (c0 + (c1 + (c2 + c3 * t) * t) * t).to_point();
            assert!(p.distance(c.eval(t)) < 1e-12);
        }
    }

    #[test]
    fn cubicbez_subsegment() {
        let c = CubicBez::new((3.1, 4.1), (5.9, 2.6), (5.3, 5.8), (9.7, 9.3));
        let t0 = 0.1;
        let t1 = 0.8;
        let cs = c.subsegment(t0..t1);
        let epsilon = 1e-12;
        let n = 10;
        for i in 0..=n {
            let t = (i as f64) * (n as f64).recip();
            let ts = t0 + t * (t1 - t0);
            assert!(c.eval(ts).distance(cs.eval(t)) < epsilon);
        }
        let (a, b) = c.subdivide();
        assert!(a.eval(0.5).distance(c.eval(0.25)) < epsilon);
        assert!(b.eval(0.5).distance(c.eval(0.75)) < epsilon);
    }

    #[test]
    fn cubicbez_extrema_and_bounds() {
        // y = x^2
        let q = QuadBez::new((-1.0, 1.0), (0.0, -1.0), (1.0, 1.0));
        let c = q.raise();
        let extrema = c.extrema();
        assert_eq!(extrema.len(), 1);
        assert!((extrema[0] - 0.5).abs() < 1e-12);

        let c = sample();
        let bbox = c.bounding_box(0.0..1.0);
        for i in 0..=1000 {
            let p = c.eval(i as f64 * 1e-3);
            assert!(bbox.inflate(1e-12).contains(p));
        }
        let sub = c.bounding_box(0.2..0.4);
        assert!(sub.contains(c.eval(0.3)));
        assert!(!sub.inflate(1e-9).contains(c.eval(0.9)));
    }

    #[test]
    fn cubicbez_speed_bound() {
        let c = sample();
        for (lo, hi) in [(0.0, 1.0), (0.25, 0.5), (0.9, 1.0)] {
            let bound = c.speed_bound(lo..hi);
            for i in 0..=100 {
                let t = lo + (hi - lo) * (i as f64 / 100.0);
                assert!(c.deriv(t).hypot() <= bound + 1e-12);
            }
        }
    }

    #[test]
    fn cubicbez_accel_bound() {
        let c = sample();
        let delta = 1e-7;
        for (lo, hi) in [(0.0, 1.0), (0.25, 0.5), (0.9, 1.0)] {
            let bound = c.accel_bound(lo..hi).unwrap();
            for i in 0..100 {
                let t = lo + (hi - lo) * (i as f64 / 100.0);
                let accel = (c.deriv(t + delta) - c.deriv(t)).hypot() / delta;
                assert!(accel <= bound + 1e-5, "{t} {accel} {bound}");
            }
        }
    }

    #[test]
    fn cubicbez_nearest() {
        let c = sample();
        for p in [(2.0, 2.0), (0.0, 1.0), (5.0, 0.0), (2.0, -0.1)] {
            let p = Point::from(p);
            let n = c.nearest(p, 1e-10);
            let brute = (0..=20_000)
                .map(|i| p.distance_squared(c.eval(i as f64 / 20_000.0)))
                .fold(f64::INFINITY, f64::min);
            assert!(n.distance_sq <= brute + 1e-9, "{p:?}: {n:?} vs {brute}");
            assert!((p.distance_squared(c.eval(n.t)) - n.distance_sq).abs() < 1e-9);
        }
    }

    #[test]
    fn cubicbez_crossings() {
        let c = sample();
        let line = Line::new((-1.0, 0.5), (5.0, 0.5));
        let hits = c.line_intersections(&line, 0.0..1.0, false);
        assert_eq!(hits.len(), 3);
        for w in hits.windows(2) {
            assert!(w[0].segment_t < w[1].segment_t);
        }
        for hit in &hits {
            assert!((c.eval(hit.segment_t).y - 0.5).abs() < 1e-12);
        }
        let upper = c.line_intersections(&line, 0.5..1.0, false);
        assert!(upper.len() < 3);
    }
}
