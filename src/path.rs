// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Curves made of consecutive pieces.

use alloc::vec::Vec;
use core::ops::Range;

use crate::common::DOMAIN_EPSILON;
use crate::nearest::{nearest_point, NearestOptions};
use crate::{
    Curve, Line, LineIntersection, LineIntersections, Nearest, ParamCurve, ParamCurveBounds,
    ParamCurveIntersect, ParamCurveNearest, Point, Rect, Vec2,
};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A sequence of curves joined into one parametrized curve.
///
/// The path parameter starts at `0`. Each piece takes up as much of it as
/// the length of its own domain, and consecutive pieces share the boundary
/// value, so parameter `t` on piece `i` sits at `offset(i) + t - start_i`.
/// An empty path has the domain `0..0` and evaluates to the origin.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvePath {
    pieces: Vec<Curve>,
    offsets: Vec<f64>,
    end: f64,
}

impl CurvePath {
    /// An empty path.
    #[inline]
    pub fn new() -> CurvePath {
        CurvePath::default()
    }

    /// Append a piece.
    pub fn push(&mut self, curve: impl Into<Curve>) {
        let curve = curve.into();
        let domain = curve.domain();
        self.offsets.push(self.end);
        self.end += domain.end - domain.start;
        self.pieces.push(curve);
    }

    /// The pieces, in order.
    #[inline]
    pub fn pieces(&self) -> &[Curve] {
        &self.pieces
    }

    /// The path parameter where piece `index` starts.
    #[inline]
    pub fn offset(&self, index: usize) -> f64 {
        self.offsets[index]
    }

    /// Number of pieces.
    #[inline]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Does the path have no pieces?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Convert a piece parameter to a path parameter.
    #[inline]
    pub fn to_path_t(&self, index: usize, t: f64) -> f64 {
        self.offsets[index] + (t - self.pieces[index].domain().start)
    }

    /// Find the piece holding path parameter `t`, and the parameter on it.
    ///
    /// Values outside the domain are clamped to the first or last piece. At
    /// a boundary between pieces the later one is chosen. Returns `None` for
    /// an empty path.
    pub fn locate(&self, t: f64) -> Option<(usize, f64)> {
        if self.pieces.is_empty() {
            return None;
        }
        let index = self
            .offsets
            .partition_point(|&o| o <= t)
            .saturating_sub(1);
        let domain = self.pieces[index].domain();
        let local = domain.start + (t - self.offsets[index]);
        Some((index, local.max(domain.start).min(domain.end)))
    }

    /// The pieces overlapping `range`, with the overlap in their own
    /// parameters.
    fn overlapping(&self, range: Range<f64>) -> impl Iterator<Item = (usize, Range<f64>)> + '_ {
        self.pieces.iter().enumerate().filter_map(move |(i, piece)| {
            let domain = piece.domain();
            let shift = domain.start - self.offsets[i];
            let lo = range.start.max(self.offsets[i]);
            let hi = range.end.min(self.offsets[i] + (domain.end - domain.start));
            (lo <= hi).then(|| {
                let lo = (lo + shift).max(domain.start);
                let hi = (hi + shift).min(domain.end).max(lo);
                (i, lo..hi)
            })
        })
    }
}

impl<C: Into<Curve>> FromIterator<C> for CurvePath {
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        let mut path = CurvePath::new();
        for curve in iter {
            path.push(curve);
        }
        path
    }
}

impl<C: Into<Curve>> Extend<C> for CurvePath {
    fn extend<T: IntoIterator<Item = C>>(&mut self, iter: T) {
        for curve in iter {
            self.push(curve);
        }
    }
}

impl ParamCurve for CurvePath {
    fn eval(&self, t: f64) -> Point {
        match self.locate(t) {
            Some((i, t)) => self.pieces[i].eval(t),
            None => Point::ZERO,
        }
    }

    fn deriv(&self, t: f64) -> Vec2 {
        match self.locate(t) {
            Some((i, t)) => self.pieces[i].deriv(t),
            None => Vec2::ZERO,
        }
    }

    #[inline]
    fn domain(&self) -> Range<f64> {
        0.0..self.end
    }
}

impl ParamCurveBounds for CurvePath {
    fn bounding_box(&self, range: Range<f64>) -> Rect {
        self.overlapping(range.clone())
            .map(|(i, r)| self.pieces[i].bounding_box(r))
            .reduce(|a, b| a.union(b))
            .unwrap_or_else(|| Rect::from_point(self.eval(range.start)))
    }

    fn speed_bound(&self, range: Range<f64>) -> f64 {
        self.overlapping(range)
            .map(|(i, r)| self.pieces[i].speed_bound(r))
            .fold(0.0, f64::max)
    }

    /// Only defined within a single piece.
    fn accel_bound(&self, range: Range<f64>) -> Option<f64> {
        let mut inside = self.overlapping(range).filter(|(_, r)| r.start < r.end);
        let (i, r) = inside.next()?;
        if inside.next().is_some() {
            return None;
        }
        self.pieces[i].accel_bound(r)
    }

    /// Exact when every overlapping piece has a closed form.
    fn nearest_closed_form(&self, p: Point, range: Range<f64>) -> Option<Nearest> {
        let mut best: Option<Nearest> = None;
        for (i, r) in self.overlapping(range) {
            let n = self.pieces[i].nearest_closed_form(p, r)?;
            let n = Nearest {
                t: self.to_path_t(i, n.t),
                ..n
            };
            best = Some(match best {
                Some(b) => b.min(n),
                None => n,
            });
        }
        best
    }
}

impl ParamCurveNearest for CurvePath {
    fn nearest(&self, p: Point, accuracy: f64) -> Nearest {
        match nearest_point(&self.pieces, p, &NearestOptions::new(accuracy.max(0.0))) {
            Some(r) => Nearest {
                distance_sq: r.distance * r.distance,
                t: self.to_path_t(r.index, r.t),
            },
            None => Nearest {
                distance_sq: p.to_vec2().hypot2(),
                t: 0.0,
            },
        }
    }
}

impl ParamCurveIntersect for CurvePath {
    /// Crossings of every piece, in path parameters.
    ///
    /// A crossing exactly at a joint is found by both pieces and reported
    /// once.
    fn line_intersections(
        &self,
        line: &Line,
        range: Range<f64>,
        infinite: bool,
    ) -> LineIntersections {
        let eps = DOMAIN_EPSILON * self.end.abs().max(1.0);
        let mut result = LineIntersections::new();
        for (i, r) in self.overlapping(range) {
            for hit in self.pieces[i].line_intersections(line, r, infinite) {
                let t = self.to_path_t(i, hit.segment_t);
                if result
                    .last()
                    .is_some_and(|last: &LineIntersection| (t - last.segment_t).abs() <= eps)
                {
                    continue;
                }
                result.push(LineIntersection {
                    line_t: hit.line_t,
                    segment_t: t,
                });
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arc, QuadBez};

    fn zigzag() -> CurvePath {
        [
            Line::new((0.0, 0.0), (1.0, 1.0)),
            Line::new((1.0, 1.0), (2.0, 0.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn offsets_share_boundaries() {
        let mut path = zigzag();
        path.push(Arc::new((3.0, 0.0), (1.0, 1.0), 0.0, 180.0, 180.0));
        assert_eq!(path.len(), 3);
        assert_eq!(path.domain(), 0.0..182.0);
        assert_eq!(path.offset(2), 2.0);
        assert_eq!(path.locate(1.0), Some((1, 0.0)));
        assert_eq!(path.locate(2.5), Some((2, 180.5)));
        assert_eq!(path.locate(-1.0), Some((0, 0.0)));
        assert_eq!(path.locate(500.0), Some((2, 360.0)));
        assert!(path.eval(2.0).distance(Point::new(2.0, 0.0)) < 1e-12);
        assert!(path.eval(182.0).distance(Point::new(4.0, 0.0)) < 1e-12);
        assert_eq!(CurvePath::new().locate(0.0), None);
    }

    #[test]
    fn crossing_two_segments() {
        let path = zigzag();
        let line = Line::new((-1.0, 0.5), (3.0, 0.5));
        let hits = path.line_intersections(&line, path.domain(), false);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].segment_t - 0.5).abs() < 1e-12);
        assert!((hits[1].segment_t - 1.5).abs() < 1e-12);
        for hit in &hits {
            let p = path.eval(hit.segment_t);
            assert!((p.y - 0.5).abs() < 1e-12);
            assert!(line.eval(hit.line_t).distance(p) < 1e-12);
        }
    }

    #[test]
    fn crossing_at_joint_is_merged() {
        let path = zigzag();
        let line = Line::new((1.0, -1.0), (1.0, 3.0));
        let hits = path.line_intersections(&line, path.domain(), false);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].segment_t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn path_bounds() {
        let mut path = zigzag();
        path.push(QuadBez::new((2.0, 0.0), (3.0, -2.0), (4.0, 0.0)));
        let bbox = path.bounding_box(path.domain());
        assert_eq!(bbox.x0, 0.0);
        assert_eq!(bbox.x1, 4.0);
        assert_eq!(bbox.y1, 1.0);
        assert!((bbox.y0 + 1.0).abs() < 1e-12);
        let first = path.bounding_box(0.0..0.5);
        assert_eq!(first, Rect::new(0.0, 0.0, 0.5, 0.5));
        assert!((path.speed_bound(0.0..1.5) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn path_nearest() {
        let path = zigzag();
        let p = Point::new(1.5, 1.0);
        let n = path.nearest(p, 1e-9);
        assert!((n.t - 1.25).abs() < 1e-12, "{n:?}");
        assert!((n.distance_sq - 0.125).abs() < 1e-12);
        let exact = path.nearest_closed_form(p, path.domain()).unwrap();
        assert_eq!(exact.t, n.t);
        let restricted = path.nearest_closed_form(p, 0.0..0.5).unwrap();
        assert_eq!(restricted.t, 0.5);
    }
}
