// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersections between two curves by bounding box subdivision.

use alloc::vec::Vec;
use core::ops::Range;

use crate::{Error, ParamCurve, ParamCurveBounds, Point, Rect, Result};

/// Controls for [`intersect_curves`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntersectOptions {
    /// Size below which a bounding box counts as a single point.
    pub tolerance: f64,
    /// Maximum number of subdivision rounds.
    pub max_iterations: usize,
    /// Maximum number of interval pairs alive at once.
    pub max_pairs: usize,
}

impl IntersectOptions {
    /// Options with the given tolerance and default budgets.
    #[inline]
    pub fn new(tolerance: f64) -> Self {
        IntersectOptions {
            tolerance,
            ..Default::default()
        }
    }
}

impl Default for IntersectOptions {
    fn default() -> Self {
        IntersectOptions {
            tolerance: 1e-9,
            max_iterations: 64,
            max_pairs: 4096,
        }
    }
}

/// A point where two curves meet.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveIntersection {
    /// The parameter on the first curve.
    pub t0: f64,
    /// The parameter on the second curve.
    pub t1: f64,
    /// The meeting point.
    pub point: Point,
}

#[derive(Clone, Debug)]
struct Span {
    range: Range<f64>,
    bbox: Rect,
}

impl Span {
    fn new<C: ParamCurveBounds>(curve: &C, range: Range<f64>) -> Span {
        let bbox = curve.bounding_box(range.clone());
        Span { range, bbox }
    }

    fn mid(&self) -> f64 {
        0.5 * (self.range.start + self.range.end)
    }

    /// Split in two, unless the interval is too small to split or already
    /// within `tolerance`.
    fn split<C: ParamCurveBounds>(&self, curve: &C, tolerance: f64) -> Option<[Span; 2]> {
        let mid = self.mid();
        if self.bbox.max_extent() <= tolerance || mid <= self.range.start || mid >= self.range.end
        {
            return None;
        }
        Some([
            Span::new(curve, self.range.start..mid),
            Span::new(curve, mid..self.range.end),
        ])
    }
}

/// Find where `a` and `b` cross.
///
/// Pairs of parameter intervals whose bounding boxes overlap are split
/// until both boxes are within `tolerance`. Pairs left over whose parameter
/// intervals touch on both curves form one crossing, reported at the pair
/// where the curves come closest. Results are ordered by `t0`.
///
/// Curves that overlap along a stretch keep every pair alive, and run into
/// [`Error::FailedToConverge`] once `max_pairs` or `max_iterations` is
/// exceeded.
pub fn intersect_curves<A, B>(
    a: &A,
    b: &B,
    options: &IntersectOptions,
) -> Result<Vec<CurveIntersection>>
where
    A: ParamCurveBounds,
    B: ParamCurveBounds,
{
    let tol = options.tolerance.max(0.0);
    let mut pairs = alloc::vec![(Span::new(a, a.domain()), Span::new(b, b.domain()))];
    let mut found = Vec::new();
    let mut iterations = 0;
    while !pairs.is_empty() {
        if iterations >= options.max_iterations {
            return Err(Error::FailedToConverge { iterations });
        }
        let mut next = Vec::new();
        for (sa, sb) in pairs {
            if !sa.bbox.inflate(tol).overlaps(sb.bbox) {
                continue;
            }
            match (sa.split(a, tol), sb.split(b, tol)) {
                (None, None) => found.push(Terminal::new(a, b, sa.range, sb.range)),
                (Some(ha), None) => next.extend(ha.into_iter().map(|h| (h, sb.clone()))),
                (None, Some(hb)) => next.extend(hb.into_iter().map(|h| (sa.clone(), h))),
                (Some(ha), Some(hb)) => {
                    for x in &ha {
                        for y in &hb {
                            next.push((x.clone(), y.clone()));
                        }
                    }
                }
            }
        }
        if next.len() > options.max_pairs {
            log::debug!(
                "curve intersection gave up with {} candidate pairs after {iterations} rounds",
                next.len()
            );
            return Err(Error::FailedToConverge { iterations });
        }
        pairs = next;
        iterations += 1;
    }
    Ok(merge(a, b, found))
}

/// A pair of parameter intervals that could not be split any further.
#[derive(Clone, Debug)]
struct Terminal {
    t0: Range<f64>,
    t1: Range<f64>,
    /// Distance between the two curves at the interval midpoints.
    gap: f64,
}

impl Terminal {
    fn new<A: ParamCurve, B: ParamCurve>(a: &A, b: &B, t0: Range<f64>, t1: Range<f64>) -> Self {
        let gap = a.eval(mid(&t0)).distance(b.eval(mid(&t1)));
        Terminal { t0, t1, gap }
    }

    /// Whether the two pairs share a point in `(t0, t1)` space.
    fn touches(&self, other: &Terminal) -> bool {
        touch(&self.t0, &other.t0) && touch(&self.t1, &other.t1)
    }
}

fn mid(range: &Range<f64>) -> f64 {
    0.5 * (range.start + range.end)
}

fn touch(x: &Range<f64>, y: &Range<f64>) -> bool {
    x.start <= y.end && y.start <= x.end
}

fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Group terminal pairs into connected components of touching parameter
/// boxes, and report the member with the smallest gap from each.
///
/// A single crossing at a shallow angle leaves a long diagonal band of
/// terminal pairs; every cell of the band touches the next one.
fn merge<A: ParamCurve, B: ParamCurve>(
    a: &A,
    b: &B,
    mut found: Vec<Terminal>,
) -> Vec<CurveIntersection> {
    found.sort_by(|x, y| x.t0.start.total_cmp(&y.t0.start));
    let mut parent: Vec<usize> = (0..found.len()).collect();
    for i in 0..found.len() {
        for j in i + 1..found.len() {
            if found[j].t0.start > found[i].t0.end {
                break;
            }
            if found[i].touches(&found[j]) {
                let (ri, rj) = (find_root(&mut parent, i), find_root(&mut parent, j));
                if ri != rj {
                    parent[rj.max(ri)] = ri.min(rj);
                }
            }
        }
    }
    let mut best: Vec<Option<usize>> = alloc::vec![None; found.len()];
    for i in 0..found.len() {
        let r = find_root(&mut parent, i);
        match best[r] {
            Some(k) if found[k].gap <= found[i].gap => {}
            _ => best[r] = Some(i),
        }
    }
    let mut result: Vec<CurveIntersection> = best
        .into_iter()
        .flatten()
        .map(|k| {
            let (t0, t1) = (mid(&found[k].t0), mid(&found[k].t1));
            CurveIntersection {
                t0,
                t1,
                point: a.eval(t0).midpoint(b.eval(t1)),
            }
        })
        .collect();
    result.sort_by(|x, y| x.t0.total_cmp(&y.t0));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arc, CubicBez, Line, QuadBez};

    #[test]
    fn crossing_lines() {
        let a = Line::new((0.0, 0.0), (2.0, 2.0));
        let b = Line::new((0.0, 2.0), (2.0, 0.0));
        let hits = intersect_curves(&a, &b, &IntersectOptions::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].t0 - 0.5).abs() < 1e-8);
        assert!((hits[0].t1 - 0.5).abs() < 1e-8);
        assert!(hits[0].point.distance(Point::new(1.0, 1.0)) < 1e-8);
    }

    #[test]
    fn disjoint_curves() {
        let a = QuadBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 0.0));
        let b = QuadBez::new((0.0, 3.0), (1.0, 2.0), (2.0, 3.0));
        assert!(intersect_curves(&a, &b, &IntersectOptions::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn cubic_against_circle() {
        let circle = Arc::circle((0.0, 0.0), 1.0);
        let c = CubicBez::new((-2.0, 0.0), (-1.0, 0.5), (1.0, -0.5), (2.0, 0.0));
        let hits = intersect_curves(&c, &circle, &IntersectOptions::new(1e-10)).unwrap();
        assert_eq!(hits.len(), 2, "{hits:?}");
        for hit in &hits {
            assert!((hit.point.to_vec2().hypot() - 1.0).abs() < 1e-8);
            assert!(c.eval(hit.t0).distance(hit.point) < 1e-8);
            assert!(circle.eval(hit.t1).distance(hit.point) < 1e-8);
        }
        assert!(hits[0].t0 < hits[1].t0);
    }

    #[test]
    fn overlapping_curves_fail() {
        let a = Line::new((0.0, 0.0), (2.0, 0.0));
        let b = Line::new((1.0, 0.0), (3.0, 0.0));
        let options = IntersectOptions {
            max_pairs: 64,
            ..Default::default()
        };
        assert!(matches!(
            intersect_curves(&a, &b, &options),
            Err(Error::FailedToConverge { .. })
        ));
    }

    #[test]
    fn merge_joins_touching_cells() {
        let a = Line::new((0.0, 0.0), (1.0, 0.0));
        let b = Line::new((0.0, 0.0), (1.0, 0.0));
        let cell = |t0: Range<f64>, t1: Range<f64>| Terminal::new(&a, &b, t0, t1);
        let merged = merge(
            &a,
            &b,
            alloc::vec![
                cell(0.5..0.5001, 0.5..0.5001),
                cell(0.1..0.1001, 0.1..0.1001),
                cell(0.5001..0.5002, 0.5001..0.5002),
                // Shares t0 with the first cell but not t1.
                cell(0.5..0.5001, 0.7..0.7001),
            ],
        );
        assert_eq!(merged.len(), 3, "{merged:?}");
        assert!((merged[0].t0 - 0.10005).abs() < 1e-12);
        assert!((merged[1].t0 - 0.50005).abs() < 1e-12);
        assert!((merged[1].t1 - 0.50005).abs() < 1e-12);
        assert!((merged[2].t1 - 0.70005).abs() < 1e-12);
    }

    #[test]
    fn shallow_crossings_are_reported_once() {
        // y = 0.4 t (1 - t) against y = 0.05 + 0.1 t, meeting at t = 1/4 and 1/2.
        let q = QuadBez::new((0.0, 0.0), (1.0, 0.2), (2.0, 0.0));
        let l = Line::new((0.0, 0.05), (2.0, 0.15));
        let hits = intersect_curves(&q, &l, &IntersectOptions::default()).unwrap();
        assert_eq!(hits.len(), 2, "{hits:?}");
        assert!((hits[0].t0 - 0.25).abs() < 1e-6, "{hits:?}");
        assert!((hits[1].t0 - 0.5).abs() < 1e-6, "{hits:?}");
        for hit in &hits {
            assert!(q.eval(hit.t0).distance(hit.point) < 1e-7);
            assert!(l.eval(hit.t1).distance(hit.point) < 1e-7);
        }
    }
}
