// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A curve restricted to part of its domain.

use alloc::vec::Vec;
use core::ops::Range;

use smallvec::SmallVec;

use crate::common::clamp_to_domain;
use crate::error::check_bounds;
use crate::intersect::{intersect_curves, CurveIntersection, IntersectOptions};
use crate::nearest::{nearest_point, CurveDistance, CurveDistanceRange, NearestOptions};
use crate::{
    Affine, Curve, Error, Line, LineIntersections, Nearest, NumericEstimate, ParamCurve,
    ParamCurveBounds, ParamCurveIntersect, ParamCurveNearest, Point, Precision, Rect, Result,
    RombergTree, Vec2,
};

/// A [`Curve`] together with the part of its domain in use.
///
/// `Param2D` owns its curve. Its parameter may be shifted and scaled
/// against the curve's own; the methods here all speak in the outer
/// parameter `t = offset + scale * u`, where `u` is the curve parameter.
/// Reparametrizing consumes the value, so no two wrappers ever share or
/// alias a curve.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param2D {
    curve: Curve,
    lo: f64,
    hi: f64,
    offset: f64,
    scale: f64,
}

impl Param2D {
    /// Wrap a curve, using its whole domain.
    pub fn new(curve: impl Into<Curve>) -> Param2D {
        let curve = curve.into();
        let domain = curve.domain();
        Param2D {
            curve,
            lo: domain.start,
            hi: domain.end,
            offset: 0.0,
            scale: 1.0,
        }
    }

    /// Wrap a curve, using only `range` of its domain.
    ///
    /// The range must be finite, ordered, and inside the curve's domain.
    pub fn with_domain(curve: impl Into<Curve>, range: Range<f64>) -> Result<Param2D> {
        let curve = curve.into();
        check_bounds(range.start, range.end)?;
        let domain = curve.domain();
        let lo = clamp_to_domain(range.start, domain.start, domain.end);
        let hi = clamp_to_domain(range.end, domain.start, domain.end);
        let (Some(lo), Some(hi)) = (lo, hi) else {
            return Err(Error::Unsolvable("range lies outside the curve's domain"));
        };
        Ok(Param2D {
            curve,
            lo,
            hi,
            offset: 0.0,
            scale: 1.0,
        })
    }

    /// The wrapped curve.
    #[inline]
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Give back the wrapped curve.
    #[inline]
    pub fn into_curve(self) -> Curve {
        self.curve
    }

    /// Shift the parameter by `dt`.
    #[must_use]
    pub fn offset_t(mut self, dt: f64) -> Param2D {
        self.offset += dt;
        self
    }

    /// Stretch the parameter by `factor`, which must be positive and finite.
    pub fn scale_t(mut self, factor: f64) -> Result<Param2D> {
        if factor <= 0.0 || !factor.is_finite() {
            return Err(Error::Unsolvable("parameter scale must be positive and finite"));
        }
        self.offset *= factor;
        self.scale *= factor;
        Ok(self)
    }

    #[inline]
    fn to_curve_t(&self, t: f64) -> f64 {
        (t - self.offset) / self.scale
    }

    #[inline]
    fn from_curve_t(&self, u: f64) -> f64 {
        self.offset + self.scale * u
    }

    #[inline]
    fn curve_range(&self, range: Range<f64>) -> Range<f64> {
        let lo = self.to_curve_t(range.start).max(self.lo);
        let hi = self.to_curve_t(range.end).min(self.hi);
        lo..hi.max(lo)
    }

    /// The bounding box of the active part.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.curve.bounding_box(self.lo..self.hi)
    }

    /// The nearest point on the active part, with default search options.
    ///
    /// This drops the bounds. Use [`distance_within`](Self::distance_within)
    /// to learn whether the search met its error bound.
    pub fn distance(&self, p: Point) -> CurveDistance {
        self.distance_within(p, &NearestOptions::default())
            .to_distance()
    }

    /// The nearest point on the active part, with bounds on the distance.
    pub fn distance_within(&self, p: Point, options: &NearestOptions) -> CurveDistanceRange {
        nearest_point(core::slice::from_ref(self), p, options).unwrap_or_else(|| {
            let t = self.domain().start;
            let point = self.eval(t);
            let distance = p.distance(point);
            CurveDistanceRange {
                index: 0,
                t,
                point,
                distance,
                min_distance: 0.0,
                converged: false,
            }
        })
    }

    fn hits(&self, line: &Line, infinite: bool) -> LineIntersections {
        let mut hits = self
            .curve
            .line_intersections(line, self.lo..self.hi, infinite);
        for hit in &mut hits {
            hit.segment_t = self.from_curve_t(hit.segment_t);
        }
        hits
    }

    /// Parameters where the curve crosses the segment `line`.
    pub fn seg_intersections(&self, line: &Line) -> SmallVec<[f64; 4]> {
        self.hits(line, false).iter().map(|h| h.segment_t).collect()
    }

    /// Parameters where the curve crosses `line` extended in both directions.
    pub fn line_intersections(&self, line: &Line) -> SmallVec<[f64; 4]> {
        self.hits(line, true).iter().map(|h| h.segment_t).collect()
    }

    /// Where this curve meets `other`.
    ///
    /// A line segment on either side is solved exactly against the other
    /// curve; other pairs go through [`intersect_curves`].
    pub fn intersections(
        &self,
        other: &Param2D,
        options: &IntersectOptions,
    ) -> Result<Vec<CurveIntersection>> {
        if let Some(line) = other.curve.as_line() {
            return Ok(self.line_crossings(other, line));
        }
        if let Some(line) = self.curve.as_line() {
            let mut result = other.line_crossings(self, line);
            for hit in &mut result {
                core::mem::swap(&mut hit.t0, &mut hit.t1);
            }
            return Ok(result);
        }
        intersect_curves(self, other, options)
    }

    /// Crossings with `other`, whose curve is `line`.
    fn line_crossings(&self, other: &Param2D, line: Line) -> Vec<CurveIntersection> {
        self.hits(&line, false)
            .into_iter()
            .filter_map(|hit| {
                let u = clamp_to_domain(hit.line_t, other.lo, other.hi)?;
                Some(CurveIntersection {
                    t0: hit.segment_t,
                    t1: other.from_curve_t(u),
                    point: self.eval(hit.segment_t),
                })
            })
            .collect()
    }

    /// Split the active part in two at its parameter midpoint.
    pub fn subdivide(&self) -> (Param2D, Param2D) {
        let mid = 0.5 * (self.lo + self.hi);
        (
            Param2D {
                hi: mid,
                ..self.clone()
            },
            Param2D {
                lo: mid,
                ..self.clone()
            },
        )
    }

    /// Apply an affine map to the curve, keeping the parametrization.
    pub fn transform(&self, affine: Affine) -> Param2D {
        Param2D {
            curve: self.curve.transform(affine),
            ..*self
        }
    }

    /// The arc length of the active part.
    ///
    /// The speed is integrated with an adaptive [`RombergTree`].
    pub fn arclen(&self, precision: &Precision) -> Result<NumericEstimate> {
        let d = self.domain();
        let mut tree = RombergTree::new(|t| self.deriv(t).hypot(), d.start, d.end)?;
        tree.integral(precision)
    }

    /// The parameter at which the arc length from the start reaches `s`.
    ///
    /// Beyond the total length the result has status
    /// [`Impossible`](crate::EstimateStatus::Impossible).
    pub fn inv_arclen(&self, s: f64, precision: &Precision) -> Result<NumericEstimate> {
        let d = self.domain();
        let mut tree = RombergTree::new(|t| self.deriv(t).hypot(), d.start, d.end)?;
        tree.solve_integral(s, precision, false)
    }
}

impl ParamCurve for Param2D {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        self.curve.eval(self.to_curve_t(t))
    }

    #[inline]
    fn deriv(&self, t: f64) -> Vec2 {
        self.curve.deriv(self.to_curve_t(t)) * self.scale.recip()
    }

    #[inline]
    fn domain(&self) -> Range<f64> {
        self.from_curve_t(self.lo)..self.from_curve_t(self.hi)
    }
}

impl ParamCurveBounds for Param2D {
    fn bounding_box(&self, range: Range<f64>) -> Rect {
        self.curve.bounding_box(self.curve_range(range))
    }

    fn speed_bound(&self, range: Range<f64>) -> f64 {
        self.curve.speed_bound(self.curve_range(range)) / self.scale
    }

    fn accel_bound(&self, range: Range<f64>) -> Option<f64> {
        let a = self.curve.accel_bound(self.curve_range(range))?;
        Some(a / (self.scale * self.scale))
    }

    fn nearest_closed_form(&self, p: Point, range: Range<f64>) -> Option<Nearest> {
        let n = self.curve.nearest_closed_form(p, self.curve_range(range))?;
        Some(Nearest {
            t: self.from_curve_t(n.t),
            ..n
        })
    }
}

impl ParamCurveNearest for Param2D {
    fn nearest(&self, p: Point, accuracy: f64) -> Nearest {
        let r = self.distance_within(p, &NearestOptions::new(accuracy.max(0.0)));
        Nearest {
            distance_sq: r.distance * r.distance,
            t: r.t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arc, CubicBez, CurvePath, EstimateStatus, QuadBez};
    use core::f64::consts::PI;

    fn zigzag() -> Param2D {
        let path: CurvePath = [
            Line::new((0.0, 0.0), (1.0, 1.0)),
            Line::new((1.0, 1.0), (2.0, 0.0)),
        ]
        .into_iter()
        .collect();
        Param2D::new(path)
    }

    #[test]
    fn path_crossings() {
        let path = zigzag();
        let line = Line::new((-1.0, 0.5), (3.0, 0.5));
        let ts = path.seg_intersections(&line);
        assert_eq!(ts.len(), 2);
        assert!((ts[0] - 0.5).abs() < 1e-12);
        assert!((ts[1] - 1.5).abs() < 1e-12);
        assert!(path.eval(ts[0]).distance(Point::new(0.5, 0.5)) < 1e-12);
        assert!(path.eval(ts[1]).distance(Point::new(1.5, 0.5)) < 1e-12);

        let short = Line::new((-1.0, 0.5), (0.0, 0.5));
        assert!(path.seg_intersections(&short).is_empty());
        assert_eq!(path.line_intersections(&short).len(), 2);
    }

    #[test]
    fn restricted_domain() {
        let l = Line::new((0.0, 0.0), (4.0, 0.0));
        let half = Param2D::with_domain(l, 0.5..1.0).unwrap();
        assert_eq!(half.domain(), 0.5..1.0);
        assert_eq!(half.bounds(), Rect::new(2.0, 0.0, 4.0, 0.0));
        let cross = Line::new((1.0, -1.0), (1.0, 1.0));
        assert!(half.seg_intersections(&cross).is_empty());
        let d = half.distance(Point::new(0.0, 1.0));
        assert_eq!(d.t, 0.5);
        assert_eq!(d.point, Point::new(2.0, 0.0));

        assert_eq!(
            Param2D::with_domain(l, 1.0..0.5),
            Err(Error::InvertedBounds { lo: 1.0, hi: 0.5 })
        );
        assert!(Param2D::with_domain(l, 0.5..2.0).is_err());
        assert_eq!(Param2D::with_domain(l, 0.0..1.0).unwrap(), Param2D::new(l));
    }

    #[test]
    fn reparametrized() {
        let l = Line::new((0.0, 0.0), (4.0, 0.0));
        let p = Param2D::new(l).scale_t(2.0).unwrap().offset_t(10.0);
        assert_eq!(p.domain(), 10.0..12.0);
        assert_eq!(p.eval(11.0), Point::new(2.0, 0.0));
        assert_eq!(p.deriv(11.0), Vec2::new(2.0, 0.0));
        let ts = p.seg_intersections(&Line::new((1.0, -1.0), (1.0, 1.0)));
        assert_eq!(ts.len(), 1);
        assert!((ts[0] - 10.5).abs() < 1e-12);
        assert!((p.distance(Point::new(3.0, 1.0)).t - 11.5).abs() < 1e-12);
        assert!(Param2D::new(l).scale_t(0.0).is_err());
        assert_eq!(p.into_curve(), Curve::Line(l));
    }

    #[test]
    fn quad_distance() {
        let q = Param2D::new(QuadBez::new((0.0, 5.0), (1.0, 3.0), (2.0, 5.0)));
        let d = q.distance(Point::new(1.0, 0.0));
        assert!((d.t - 0.5).abs() < 1e-12);
        assert!(d.point.distance(Point::new(1.0, 4.0)) < 1e-12);
        assert!((d.distance - 4.0).abs() < 1e-12);
    }

    #[test]
    fn cubic_distance_range() {
        let c = Param2D::new(CubicBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 2.0), (3.0, 0.0)));
        let r = c.distance_within(Point::new(1.5, 2.0), &NearestOptions::new(1e-10));
        assert!(r.converged);
        assert!(r.min_distance <= r.distance);
        assert!((r.distance - 0.5).abs() < 1e-9, "{r:?}");
        assert!((r.t - 0.5).abs() < 1e-4);
    }

    #[test]
    fn curve_intersections() {
        let c = Param2D::new(CubicBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 2.0), (3.0, 0.0)));
        let l = Param2D::new(Line::new((0.0, 1.0), (3.0, 1.0)));
        let options = IntersectOptions::default();
        let hits = c.intersections(&l, &options).unwrap();
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert!(c.eval(hit.t0).distance(l.eval(hit.t1)) < 1e-9);
        }
        let swapped = l.intersections(&c, &options).unwrap();
        assert_eq!(swapped.len(), 2);
        assert_eq!(swapped[0].t0, hits[0].t1);
        assert_eq!(swapped[0].t1, hits[0].t0);

        let circle = Param2D::new(Arc::circle((1.5, 1.5), 1.0));
        let hits = c.intersections(&circle, &options).unwrap();
        assert_eq!(hits.len(), 2, "{hits:?}");
        for hit in &hits {
            assert!(c.eval(hit.t0).distance(circle.eval(hit.t1)) < 1e-8);
        }
    }

    #[test]
    fn subdivide_and_transform() {
        let c = Param2D::new(CubicBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 2.0), (3.0, 0.0)));
        let (a, b) = c.subdivide();
        assert_eq!(a.domain(), 0.0..0.5);
        assert_eq!(b.domain(), 0.5..1.0);
        assert_eq!(a.end(), b.start());
        let moved = c.transform(Affine::translate((1.0, 1.0)));
        assert!(moved.eval(0.25).distance(c.eval(0.25) + Vec2::new(1.0, 1.0)) < 1e-12);
    }

    #[test]
    fn arc_length() {
        let p = Precision::default();
        let line = Param2D::new(Line::new((0.0, 0.0), (3.0, 4.0)));
        let len = line.arclen(&p).unwrap();
        assert!((len.value - 5.0).abs() < 1e-12, "{len}");

        let quarter = Param2D::new(Arc::new((0.0, 0.0), (2.0, 2.0), 0.0, 0.0, 90.0));
        let len = quarter.arclen(&p).unwrap();
        assert!((len.value - PI).abs() < 1e-9, "{len}");
        let t = quarter.inv_arclen(0.5 * PI, &p).unwrap();
        assert!((t.value - 45.0).abs() < 1e-6, "{t}");
        let beyond = quarter.inv_arclen(4.0, &p).unwrap();
        assert_eq!(beyond.status, EstimateStatus::Impossible);

        let cubic = Param2D::new(CubicBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 2.0), (3.0, 0.0)));
        let n = 100_000;
        let polyline: f64 = (0..n)
            .map(|i| {
                let t0 = i as f64 / n as f64;
                let t1 = (i + 1) as f64 / n as f64;
                cubic.eval(t0).distance(cubic.eval(t1))
            })
            .sum();
        let len = cubic.arclen(&p).unwrap();
        assert!((len.value - polyline).abs() < 1e-8, "{len} vs {polyline}");
    }

    #[test]
    fn rescaled_search_converges() {
        let c = CubicBez::new((0.0, 0.0), (1.0, 3.0), (3.0, -2.0), (4.0, 1.0));
        let p = Param2D::new(c).scale_t(4.0).unwrap().offset_t(1.0);
        let accel = p.accel_bound(p.domain()).unwrap();
        assert!((accel - c.accel_bound(0.0..1.0).unwrap() / 16.0).abs() < 1e-12);
        let r = p.distance_within(Point::new(2.0, 2.0), &NearestOptions::default());
        assert!(r.converged, "{r:?}");
        assert!(c.eval((r.t - 1.0) / 4.0).distance(r.point) < 1e-12);
    }
}
