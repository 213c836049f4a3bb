// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest point search over a set of curves.
//!
//! Curves with a [closed form] are solved directly. The others are bisected:
//! each parameter interval gets a lower bound on its distance to the query
//! point, from its bounding box, from the distance at its midpoint less the
//! furthest the curve can travel in half the interval, and, for curves with
//! an [acceleration bound], from a second order expansion of the distance
//! along the direction from the query point to the midpoint. Intervals whose
//! lower bound cannot beat the best distance found so far are dropped.

//!
//! [closed form]: ParamCurveBounds::nearest_closed_form
//! [acceleration bound]: ParamCurveBounds::accel_bound

use alloc::vec::Vec;

use crate::{Nearest, ParamCurve, ParamCurveBounds, Point};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Intervals kept alive at once before the search gives up.
const MAX_INTERVALS: usize = 1 << 12;

/// Controls for [`nearest_point`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NearestOptions {
    /// How far the reported distance may be above the true minimum.
    pub max_error: f64,
    /// Maximum number of bisection rounds.
    pub max_iterations: usize,
}

impl NearestOptions {
    /// Options with the given error and the default iteration limit.
    #[inline]
    pub fn new(max_error: f64) -> Self {
        NearestOptions {
            max_error,
            ..Default::default()
        }
    }
}

impl Default for NearestOptions {
    fn default() -> Self {
        NearestOptions {
            max_error: 1e-9,
            max_iterations: 64,
        }
    }
}

/// A point on a curve and its distance to a query point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveDistance {
    /// The curve parameter of the point.
    pub t: f64,
    /// The point on the curve.
    pub point: Point,
    /// Its distance to the query point.
    pub distance: f64,
}

/// The result of a bounded nearest point search.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveDistanceRange {
    /// Which of the searched curves holds the point.
    pub index: usize,
    /// The curve parameter of the point.
    pub t: f64,
    /// The best point found.
    pub point: Point,
    /// Its distance to the query point.
    pub distance: f64,
    /// A lower bound on the distance from the query point to any curve.
    pub min_distance: f64,
    /// Whether `distance - min_distance` is within the requested error.
    pub converged: bool,
}

impl CurveDistanceRange {
    /// How far `distance` may be above the true minimum.
    #[inline]
    pub fn error(&self) -> f64 {
        self.distance - self.min_distance
    }

    /// Drop the bounds.
    #[inline]
    pub fn to_distance(&self) -> CurveDistance {
        CurveDistance {
            t: self.t,
            point: self.point,
            distance: self.distance,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Interval {
    index: usize,
    lo: f64,
    hi: f64,
}

#[derive(Clone, Copy, Debug)]
struct Best {
    index: usize,
    t: f64,
    distance_sq: f64,
}

impl Best {
    fn offer(&mut self, index: usize, n: Nearest) {
        if n.distance_sq < self.distance_sq {
            *self = Best {
                index,
                t: n.t,
                distance_sq: n.distance_sq,
            };
        }
    }
}

/// Find the point nearest to `p` on any of `curves`.
///
/// Returns `None` when `curves` is empty. When several points are equally
/// near, any of them may be reported; the search then usually runs out of
/// iterations or intervals, and `converged` is false.
pub fn nearest_point<C: ParamCurveBounds>(
    curves: &[C],
    p: Point,
    options: &NearestOptions,
) -> Option<CurveDistanceRange> {
    let mut best = Best {
        index: 0,
        t: 0.0,
        distance_sq: f64::INFINITY,
    };
    let mut work = Vec::with_capacity(curves.len());
    for (index, curve) in curves.iter().enumerate() {
        let domain = curve.domain();
        for t in [domain.start, domain.end] {
            best.offer(
                index,
                Nearest {
                    distance_sq: p.distance_squared(curve.eval(t)),
                    t,
                },
            );
        }
        work.push(Interval {
            index,
            lo: domain.start,
            hi: domain.end,
        });
    }
    if work.is_empty() {
        return None;
    }
    // Lowest lower bound over everything no longer searched.
    let mut floor = f64::INFINITY;
    let mut survivors: Vec<(Interval, f64)> = Vec::new();
    let mut iterations = 0;
    loop {
        let mut bounded = Vec::with_capacity(work.len());
        for iv in work.drain(..) {
            let curve = &curves[iv.index];
            if let Some(n) = curve.nearest_closed_form(p, iv.lo..iv.hi) {
                best.offer(iv.index, n);
                floor = floor.min(n.distance_sq.sqrt());
                continue;
            }
            let tm = 0.5 * (iv.lo + iv.hi);
            let half = 0.5 * (iv.hi - iv.lo);
            let pm = curve.eval(tm);
            let d2 = p.distance_squared(pm);
            best.offer(
                iv.index,
                Nearest {
                    distance_sq: d2,
                    t: tm,
                },
            );
            let dm = d2.sqrt();
            let mut lower = curve
                .bounding_box(iv.lo..iv.hi)
                .distance_to_point(p)
                .max(dm - curve.speed_bound(iv.lo..iv.hi) * half);
            if let Some(accel) = curve.accel_bound(iv.lo..iv.hi) {
                if dm > 0.0 {
                    // |B(t) - p| >= (B(t) - p)·u, expanded around tm.
                    let u = (pm - p) * dm.recip();
                    let slope = curve.deriv(tm).dot(u).abs();
                    lower = lower.max(dm - slope * half - 0.5 * accel * half * half);
                }
            }
            bounded.push((iv, lower.max(0.0)));
        }
        let cutoff = best.distance_sq.sqrt() - options.max_error;
        survivors.clear();
        for (iv, lower) in bounded {
            if lower < cutoff {
                survivors.push((iv, lower));
            } else {
                floor = floor.min(lower);
            }
        }
        if survivors.is_empty() {
            break;
        }
        if iterations >= options.max_iterations || 2 * survivors.len() > MAX_INTERVALS {
            log::debug!(
                "nearest point search stopped after {iterations} rounds with {} open intervals",
                survivors.len()
            );
            break;
        }
        for &(iv, lower) in &survivors {
            let mid = 0.5 * (iv.lo + iv.hi);
            if mid <= iv.lo || mid >= iv.hi {
                floor = floor.min(lower);
                continue;
            }
            work.push(Interval { hi: mid, ..iv });
            work.push(Interval { lo: mid, ..iv });
        }
        if work.is_empty() {
            survivors.clear();
            break;
        }
        iterations += 1;
    }
    for &(_, lower) in &survivors {
        floor = floor.min(lower);
    }
    let distance = best.distance_sq.sqrt();
    let min_distance = floor.min(distance);
    Some(CurveDistanceRange {
        index: best.index,
        t: best.t,
        point: curves[best.index].eval(best.t),
        distance,
        min_distance,
        converged: distance - min_distance <= options.max_error,
    })
}

/// Nearest point on a single curve, in the shape of
/// [`ParamCurveNearest::nearest`](crate::ParamCurveNearest::nearest).
pub(crate) fn nearest_single<C: ParamCurveBounds>(curve: &C, p: Point, accuracy: f64) -> Nearest {
    let options = NearestOptions::new(accuracy.max(0.0));
    match nearest_point(core::slice::from_ref(curve), p, &options) {
        Some(r) => Nearest {
            distance_sq: r.distance * r.distance,
            t: r.t,
        },
        None => Nearest {
            distance_sq: f64::INFINITY,
            t: curve.domain().start,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arc, CubicBez, CurvePath, Line, QuadBez};
    use rand::{Rng, SeedableRng};

    #[test]
    fn empty_input() {
        let curves: [CubicBez; 0] = [];
        assert!(nearest_point(&curves, Point::ZERO, &NearestOptions::default()).is_none());
    }

    #[test]
    fn picks_nearer_curve() {
        let curves = [
            CubicBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 2.0), (3.0, 0.0)),
            CubicBez::new((0.0, 5.0), (1.0, 4.0), (2.0, 4.0), (3.0, 5.0)),
        ];
        let p = Point::new(1.5, 3.9);
        let r = nearest_point(&curves, p, &NearestOptions::new(1e-10)).unwrap();
        assert_eq!(r.index, 1);
        assert!(r.converged, "{r:?}");
        assert!(r.error() <= 1e-10);
        assert!((r.t - 0.5).abs() < 1e-6, "{r:?}");
        // The second curve bottoms out at y = 4.25.
        assert!((r.distance - 0.35).abs() < 1e-9, "{r:?}");
        assert!(r.point.distance(curves[1].eval(r.t)) == 0.0);
    }

    #[test]
    fn closed_forms_are_exact() {
        let lines = [
            Line::new((0.0, 0.0), (10.0, 0.0)),
            Line::new((0.0, 3.0), (10.0, 3.0)),
        ];
        let r = nearest_point(&lines, Point::new(4.0, 2.0), &NearestOptions::new(0.0)).unwrap();
        assert_eq!(r.index, 1);
        assert_eq!(r.t, 0.4);
        assert_eq!(r.distance, 1.0);
        assert!(r.converged);

        let quads = [QuadBez::new((0.0, 5.0), (1.0, 3.0), (2.0, 5.0))];
        let r = nearest_point(&quads, Point::new(1.0, 0.0), &NearestOptions::default()).unwrap();
        assert!((r.distance - 4.0).abs() < 1e-12);
        assert_eq!(r.min_distance, r.distance);
    }

    #[test]
    fn lower_bound_is_sound() {
        let c = [CubicBez::new((0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0))];
        let p = Point::new(2.0, 1.0);
        let coarse = NearestOptions {
            max_error: 1e-3,
            max_iterations: 3,
        };
        let r = nearest_point(&c, p, &coarse).unwrap();
        let fine = nearest_point(&c, p, &NearestOptions::new(1e-12)).unwrap();
        assert!(r.min_distance <= fine.distance + 1e-12);
        assert!(r.distance >= fine.distance - 1e-12);
        assert!(fine.converged);
    }

    #[test]
    fn endpoint_is_nearest() {
        let c = [CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0))];
        let r = nearest_point(&c, Point::new(-1.0, -1.0), &NearestOptions::default()).unwrap();
        assert_eq!(r.t, 0.0);
        assert_eq!(r.distance, 2f64.sqrt());
        assert!(r.converged);
    }

    #[test]
    fn random_cubics_converge() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let pt = |rng: &mut rand::rngs::StdRng| {
            Point::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
        };
        for _ in 0..300 {
            let c = [CubicBez::new(pt(&mut rng), pt(&mut rng), pt(&mut rng), pt(&mut rng))];
            let p = pt(&mut rng);
            let r = nearest_point(&c, p, &NearestOptions::default()).unwrap();
            assert!(r.converged, "{c:?} {p:?} {r:?}");
            let sampled = (0..=1000)
                .map(|i| c[0].eval(f64::from(i) / 1000.0).distance(p))
                .fold(f64::INFINITY, f64::min);
            assert!(r.distance <= sampled + 1e-9, "{c:?} {p:?} {r:?}");
            assert!(r.min_distance <= sampled, "{c:?} {p:?} {r:?}");
        }
    }

    #[test]
    fn elliptic_arc_and_path_converge() {
        let arc = [Arc::new((0.0, 0.0), (3.0, 1.0), 0.0, 0.0, 270.0)];
        let r = nearest_point(&arc, Point::new(1.0, 2.0), &NearestOptions::default()).unwrap();
        assert!(r.converged, "{r:?}");

        let path: CurvePath = [
            CubicBez::new((0.0, 0.0), (1.0, 2.0), (2.0, -1.0), (3.0, 1.0)),
            CubicBez::new((3.0, 1.0), (4.0, 3.0), (5.0, 0.0), (6.0, 0.5)),
        ]
        .into_iter()
        .collect();
        let r = nearest_point(&[path], Point::new(2.5, 2.0), &NearestOptions::default()).unwrap();
        assert!(r.converged, "{r:?}");
    }
}
