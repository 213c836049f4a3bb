// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traits for curves parametrized by a scalar.

use core::ops::Range;

use arrayvec::ArrayVec;
use smallvec::SmallVec;

use crate::common::{clamp_to_domain, SEGMENT_EPSILON};
use crate::poly::{solve_poly, Roots};
use crate::{Line, Point, Rect, Vec2};

/// The maximum number of extrema that can be reported in the
/// [`ParamCurveExtrema`] trait.
pub const MAX_EXTREMA: usize = 4;

/// A curve parametrized by a scalar over a bounded domain.
pub trait ParamCurve {
    /// Evaluate the curve at parameter `t`.
    fn eval(&self, t: f64) -> Point;

    /// The derivative with respect to `t`.
    fn deriv(&self, t: f64) -> Vec2;

    /// The parameter domain.
    #[inline]
    fn domain(&self) -> Range<f64> {
        0.0..1.0
    }

    /// The start point.
    #[inline]
    fn start(&self) -> Point {
        self.eval(self.domain().start)
    }

    /// The end point.
    #[inline]
    fn end(&self) -> Point {
        self.eval(self.domain().end)
    }
}

/// The result of a nearest point query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// The square of the distance from the nearest position on the curve
    /// to the given point.
    pub distance_sq: f64,
    /// The position on the curve of the nearest point, as a parameter.
    pub t: f64,
}

impl Nearest {
    /// Keep whichever of `self` and `other` is closer.
    #[inline]
    #[must_use]
    pub fn min(self, other: Nearest) -> Nearest {
        if other.distance_sq < self.distance_sq {
            other
        } else {
            self
        }
    }
}

/// Bounds over parameter ranges, as needed by the bisection engines.
pub trait ParamCurveBounds: ParamCurve {
    /// An axis-aligned box containing the curve over `range`.
    fn bounding_box(&self, range: Range<f64>) -> Rect;

    /// An upper bound on the speed `|deriv(t)|` for `t` in `range`.
    fn speed_bound(&self, range: Range<f64>) -> f64;

    /// An upper bound on `|B''(t)|` for `t` in `range`.
    ///
    /// `None` when the curve is not twice differentiable across `range`,
    /// such as at the joint between two pieces of a path.
    #[inline]
    fn accel_bound(&self, _range: Range<f64>) -> Option<f64> {
        None
    }

    /// The exact nearest point over `range`, for curves that have a closed
    /// form for it.
    #[inline]
    fn nearest_closed_form(&self, _p: Point, _range: Range<f64>) -> Option<Nearest> {
        None
    }
}

/// A parametrized curve that reports its nearest point.
pub trait ParamCurveNearest {
    /// Find the position on the curve that is nearest to the given point.
    ///
    /// Curves without a closed form are searched to within `accuracy`.
    fn nearest(&self, p: Point, accuracy: f64) -> Nearest;
}

/// A crossing of a curve with a line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineIntersection {
    /// The parameter along the line, `0` at `p0` and `1` at `p1`.
    pub line_t: f64,
    /// The parameter on the curve.
    pub segment_t: f64,
}

/// The crossings of a curve with a line, in order of `segment_t`.
pub type LineIntersections = SmallVec<[LineIntersection; 4]>;

/// A parametrized curve that can be intersected with a line.
pub trait ParamCurveIntersect {
    /// The crossings with `line` for curve parameters in `range`.
    ///
    /// With `infinite` set the line extends in both directions, otherwise
    /// only crossings on the segment from `p0` to `p1` count.
    fn line_intersections(&self, line: &Line, range: Range<f64>, infinite: bool)
        -> LineIntersections;
}

/// A parametrized curve that reports its extrema.
pub trait ParamCurveExtrema: ParamCurve {
    /// Compute the extrema of the curve.
    ///
    /// Only extrema within the interior of the domain are reported, in
    /// increasing order.
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA>;
}

/// The tight bounding box over `range` of a curve with known extrema.
pub(crate) fn bbox_from_extrema<C: ParamCurveExtrema + ?Sized>(
    curve: &C,
    range: Range<f64>,
) -> Rect {
    let mut bbox = Rect::from_points(curve.eval(range.start), curve.eval(range.end));
    for t in curve.extrema() {
        if t > range.start && t < range.end {
            bbox = bbox.union_pt(curve.eval(t));
        }
    }
    bbox
}

/// Crossings of a polynomial curve with a line.
///
/// `coeffs` are the vector coefficients of the curve, lowest degree first,
/// so that `B(t) = coeffs[0] + coeffs[1] t + ...`. The line is written in
/// implicit form, which turns the crossings into the roots of a scalar
/// polynomial. A curve lying along the line has infinitely many crossings;
/// none are reported for it here.
pub(crate) fn poly_line_intersections(
    coeffs: &[Vec2],
    line: &Line,
    range: Range<f64>,
    infinite: bool,
) -> LineIntersections {
    let mut result = LineIntersections::new();
    let dir = line.p1 - line.p0;
    let normal = dir.turn_90();
    let mut scalar = [0.0; 4];
    for (s, c) in scalar.iter_mut().zip(coeffs) {
        *s = normal.dot(*c);
    }
    scalar[0] -= normal.dot(line.p0.to_vec2());
    let Ok(Roots::Finite(roots)) = solve_poly(&scalar[..coeffs.len()]) else {
        return result;
    };
    let len2 = dir.hypot2();
    for t in roots {
        let Some(t) = clamp_to_domain(t, range.start, range.end) else {
            continue;
        };
        let p = coeffs
            .iter()
            .rev()
            .fold(Vec2::ZERO, |acc, c| acc * t + *c)
            .to_point();
        let line_t = (p - line.p0).dot(dir) / len2;
        if !infinite && !(-SEGMENT_EPSILON..=1.0 + SEGMENT_EPSILON).contains(&line_t) {
            continue;
        }
        result.push(LineIntersection {
            line_t,
            segment_t: t,
        });
    }
    result
}
