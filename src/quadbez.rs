// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadratic Bézier segments.

use core::ops::{Mul, Range};

use arrayvec::ArrayVec;

use crate::common::{clamp_to_domain, solve_cubic, DEGENERATE_EPSILON};
use crate::param_curve::{bbox_from_extrema, poly_line_intersections};
use crate::{
    Affine, CubicBez, Line, LineIntersections, Nearest, ParamCurve, ParamCurveBounds,
    ParamCurveExtrema, ParamCurveIntersect, ParamCurveNearest, Point, Rect, Vec2, MAX_EXTREMA,
};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A single quadratic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(missing_docs, reason = "A type should be obvious enough")]
pub struct QuadBez {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
}

impl QuadBez {
    /// Create a new quadratic Bézier segment.
    #[inline(always)]
    pub fn new<V: Into<Point>>(p0: V, p1: V, p2: V) -> QuadBez {
        QuadBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
        }
    }

    /// Raise the order by 1.
    ///
    /// Returns a cubic Bézier segment that exactly represents this quadratic.
    #[inline]
    pub fn raise(&self) -> CubicBez {
        CubicBez::new(
            self.p0,
            self.p0 + (2.0 / 3.0) * (self.p1 - self.p0),
            self.p2 + (2.0 / 3.0) * (self.p1 - self.p2),
            self.p2,
        )
    }

    /// The power basis coefficients, so that `B(t) = c0 + c1 t + c2 t²`.
    #[inline]
    pub(crate) fn coefficients(&self) -> [Vec2; 3] {
        let c0 = self.p0.to_vec2();
        let c1 = 2.0 * (self.p1 - self.p0);
        let c2 = (self.p2 - self.p1) - (self.p1 - self.p0);
        [c0, c1, c2]
    }

    /// The segment covering `range` of this one, reparametrized to `0..1`.
    pub fn subsegment(&self, range: Range<f64>) -> QuadBez {
        let (t0, t1) = (range.start, range.end);
        let p0 = self.eval(t0);
        let p2 = self.eval(t1);
        let p1 = p0 + (self.p1 - self.p0).lerp(self.p2 - self.p1, t0) * (t1 - t0);
        QuadBez { p0, p1, p2 }
    }

    /// Subdivide into halves.
    #[inline]
    pub fn subdivide(&self) -> (QuadBez, QuadBez) {
        let pm = self.eval(0.5);
        (
            QuadBez::new(self.p0, self.p0.midpoint(self.p1), pm),
            QuadBez::new(pm, self.p1.midpoint(self.p2), self.p2),
        )
    }

    /// Is this quadratic Bezier curve finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite()
    }
}

impl ParamCurve for QuadBez {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        (self.p0.to_vec2() * (mt * mt)
            + (self.p1.to_vec2() * (mt * 2.0) + self.p2.to_vec2() * t) * t)
            .to_point()
    }

    #[inline]
    fn deriv(&self, t: f64) -> Vec2 {
        2.0 * (self.p1 - self.p0).lerp(self.p2 - self.p1, t)
    }

    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p2
    }
}

impl ParamCurveBounds for QuadBez {
    #[inline]
    fn bounding_box(&self, range: Range<f64>) -> Rect {
        bbox_from_extrema(self, range)
    }

    /// The derivative is linear in `t`, so its norm peaks at an end.
    #[inline]
    fn speed_bound(&self, range: Range<f64>) -> f64 {
        self.deriv(range.start)
            .hypot()
            .max(self.deriv(range.end).hypot())
    }

    #[inline]
    fn accel_bound(&self, _range: Range<f64>) -> Option<f64> {
        Some((self.deriv(1.0) - self.deriv(0.0)).hypot())
    }

    /// The nearest point in closed form.
    ///
    /// Around its vertex `t*` the curve is the parabola
    /// `P0 + V s + A s²` with `s = t - t*` and `V ⟂ A`. In the frame along
    /// `V` and `A` the distance is stationary where
    ///
    /// ```text
    /// 2c²x³ + (1 - 2c·qy)x - qx = 0,   c = |A| / |V|²,   x = |V| s
    /// ```
    ///
    /// whose real roots join the ends of `range` as candidates.
    fn nearest_closed_form(&self, p: Point, range: Range<f64>) -> Option<Nearest> {
        let (lo, hi) = (range.start, range.end);
        let mut best = Nearest {
            distance_sq: p.distance_squared(self.eval(lo)),
            t: lo,
        };
        let mut consider = |t: f64| {
            if let Some(t) = clamp_to_domain(t, lo, hi) {
                best = best.min(Nearest {
                    distance_sq: p.distance_squared(self.eval(t)),
                    t,
                });
            }
        };
        consider(hi);
        let [c0, c1, c2] = self.coefficients();
        let size2 = (self.p1 - self.p0)
            .hypot2()
            .max((self.p2 - self.p1).hypot2());
        if size2 == 0.0 {
            return Some(best);
        }
        let a2 = c2.hypot2();
        if a2 <= DEGENERATE_EPSILON * size2 {
            // Straight line at constant speed.
            consider((p.to_vec2() - c0).dot(c1) / c1.hypot2());
            return Some(best);
        }
        let t_star = -c1.dot(c2) / (2.0 * a2);
        let w = p - self.eval(t_star);
        let v = self.deriv(t_star);
        let u2 = v.hypot2();
        consider(t_star);
        if u2 <= DEGENERATE_EPSILON * size2 {
            // The control points are collinear and the curve doubles back
            // along `A`: B(t) = P0 + A s².
            let sigma = w.dot(c2) / a2;
            if sigma > 0.0 {
                let s = sigma.sqrt();
                consider(t_star - s);
                consider(t_star + s);
            }
            return Some(best);
        }
        let u = u2.sqrt();
        let a = a2.sqrt();
        let c = a / u2;
        let qx = w.dot(v) / u;
        let qy = w.dot(c2) / a;
        for x in solve_cubic(-qx, 1.0 - 2.0 * c * qy, 0.0, 2.0 * c * c) {
            consider(t_star + x / u);
        }
        Some(best)
    }
}

impl ParamCurveNearest for QuadBez {
    #[inline]
    fn nearest(&self, p: Point, _accuracy: f64) -> Nearest {
        self.nearest_closed_form(p, 0.0..1.0).unwrap_or(Nearest {
            distance_sq: p.distance_squared(self.p0),
            t: 0.0,
        })
    }
}

impl ParamCurveIntersect for QuadBez {
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

impl ParamCurveExtrema for QuadBez {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        let mut result = ArrayVec::new();
        let d0 = self.p1 - self.p0;
        let d1 = self.p2 - self.p1;
        let dd = d1 - d0;
        if dd.x != 0.0 {
            let t = -d0.x / dd.x;
            if t > 0.0 && t < 1.0 {
                result.push(t);
            }
        }
        if dd.y != 0.0 {
            let t = -d0.y / dd.y;
            if t > 0.0 && t < 1.0 {
                result.push(t);
                if result.len() == 2 && result[0] > t {
                    result.swap(0, 1);
                }
            }
        }
        result
    }
}

impl Mul<QuadBez> for Affine {
    type Output = QuadBez;

    #[inline]
    fn mul(self, other: QuadBez) -> QuadBez {
        QuadBez {
            p0: self * other.p0,
            p1: self * other.p1,
            p2: self * other.p2,
        }
    }
}
