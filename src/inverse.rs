// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inverse integration: finding where an integral reaches a given area.

use crate::adaptive::{sample_x, NodeId};
use crate::error::check_bounds;
use crate::poly::{eval_poly, solve_poly, Roots};
use crate::romberg::romberg_samples;
use crate::{Error, EstimateStatus, NumericEstimate, Precision, Result, RombergTree};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Solve `∫_lo^x f = y` from five evenly spaced samples of `f` on `lo..=hi`.
///
/// An exact quadratic is fitted through the left or the right half of the
/// window, whichever Simpson's rule says contains the target; its integral
/// is a cubic in `x` whose root nearest the middle of that half is returned.
/// The quadratic through samples 0, 2 and 4 is compared with samples 1 and
/// 3 to estimate the fit error, which is turned into bounds on `x` through
/// the local density.
///
/// Targets outside the window's area extrapolate the fitted quadratic.
///
/// # Examples
///
/// ```
/// use kvadraturo::integraly5;
///
/// // f(x) = x on [0, 10]: the area up to 8 is 32.
/// let ys = [0.0, 2.5, 5.0, 7.5, 10.0];
/// let x = integraly5(&ys, 0.0, 10.0, 32.0).unwrap();
/// assert!((x.value - 8.0).abs() < 1e-12);
/// ```
pub fn integraly5(ys: &[f64], lo: f64, hi: f64, y: f64) -> Result<NumericEstimate> {
    solve_window(ys, lo, hi, y).map(|(x, _)| x)
}

/// [`integraly5`], also returning the local density at the solution.
///
/// The density is zero when the samples give no usable slope.
fn solve_window(ys: &[f64], lo: f64, hi: f64, y: f64) -> Result<(NumericEstimate, f64)> {
    let &[y0, y1, y2, y3, y4] = ys else {
        return Err(Error::InvalidSampleCount(ys.len()));
    };
    check_bounds(lo, hi)?;
    let h = 0.25 * (hi - lo);
    if h == 0.0 {
        return Ok((NumericEstimate::exact(lo), 0.0));
    }
    let simpson_left = h / 3.0 * (y0 + 4.0 * y1 + y2);
    let (base, target, ya, yb, yc) = if y <= simpson_left {
        (lo, y, y0, y1, y2)
    } else {
        (lo + 2.0 * h, y - simpson_left, y2, y3, y4)
    };
    // q(u) = c0 + c1 u + c2 u² through (0, ya), (1, yb), (2, yc), u in steps of h.
    let c2 = 0.5 * (ya - 2.0 * yb + yc);
    let c1 = yb - ya - c2;
    let c0 = ya;
    let density_poly = [c0, c1, c2];
    let area_poly = [-target / h, c0, 0.5 * c1, c2 / 3.0];
    let u = match solve_poly(&area_poly)? {
        Roots::Infinite => Some(0.0),
        Roots::Finite(roots) => roots
            .iter()
            .copied()
            .min_by(|a, b| (a - 1.0).abs().total_cmp(&(b - 1.0).abs())),
    };
    let Some(u) = u else {
        // The fitted area never reaches the target.
        return Ok((NumericEstimate::new(base + 2.0 * h, lo, hi, 0), 0.0));
    };
    let x = base + u * h;

    let fit_err = ((3.0 * y0 + 6.0 * y2 - y4) / 8.0 - y1)
        .abs()
        .max(((-y0 + 6.0 * y2 + 3.0 * y4) / 8.0 - y3).abs());
    // Halving the spacing shrinks a quadratic fit's error about eightfold.
    let area_err = fit_err / 8.0 * (2.0 * h);
    let mut density = eval_poly(&density_poly, u);
    if !(density > 0.0) {
        density = (ya + 4.0 * yb + yc) / 6.0;
    }
    let dx = if density > 0.0 {
        area_err / density
    } else {
        density = 0.0;
        2.0 * h
    };
    Ok((NumericEstimate::new(x, x - dx, x + dx, 0), density))
}

/// Where a tree descent for a target area ended.
#[derive(Debug)]
struct Descent {
    leaf: NodeId,
    remaining: f64,
    /// Total estimate width of the subtrees left of the path whose area was
    /// subtracted from the target or that the target fell into.
    skipped_width: f64,
    widest_skipped: Option<NodeId>,
}

/// A 5-sample window of a leaf around the target.
#[derive(Debug)]
struct Window {
    lo: f64,
    hi: f64,
    ys: [f64; 5],
    target: f64,
    area_err: f64,
}

/// Narrow a leaf's samples down to the 5-sample window containing `y`.
fn bisect_window(ys: &[f64], lo: f64, hi: f64, y: f64) -> Result<Window> {
    let last = ys.len() - 1;
    let (mut a, mut b) = (0, last);
    let mut target = y;
    let mut area_err = 0.0;
    while b - a > 4 {
        let m = (a + b) / 2;
        let width = sample_x(lo, hi, m, last) - sample_x(lo, hi, a, last);
        let left = romberg_samples(&ys[a..=m], width)?;
        if target <= left.value {
            b = m;
        } else {
            target -= left.value;
            area_err += left.width();
            a = m;
        }
    }
    let window: [f64; 5] = ys[a..=b]
        .try_into()
        .map_err(|_| Error::InvalidSampleCount(b - a + 1))?;
    Ok(Window {
        lo: sample_x(lo, hi, a, last),
        hi: sample_x(lo, hi, b, last),
        ys: window,
        target,
        area_err,
    })
}

fn check_samples(ys: &[f64], lo: f64, hi: f64) -> Result<()> {
    let last = ys.len().saturating_sub(1).max(1);
    match ys.iter().position(|&v| v < 0.0) {
        Some(i) => Err(Error::NegativeIntegrand {
            x: sample_x(lo, hi, i, last),
            value: ys[i],
        }),
        None => Ok(()),
    }
}

impl<F: FnMut(f64) -> f64> RombergTree<F> {
    /// Find `x` with `∫_lo^x f = y`.
    ///
    /// The tree is refined as needed until the bounds on `x` satisfy
    /// `precision`. Uncertainty in the areas of the subtrees to the left of
    /// the solution is carried into the bounds along with the error of the
    /// local fit; when the former dominates, the widest such subtree is
    /// refined first.
    ///
    /// If `y` exceeds the whole integral, the domain is grown to the right
    /// when `extrapolate` is set and the domain is not empty. Otherwise the
    /// result has status
    /// [`Impossible`](EstimateStatus::Impossible) once the total is known to
    /// `precision`.
    ///
    /// `f` must not be negative: negative samples met at entry or in the
    /// leaf holding the solution are reported as
    /// [`Error::NegativeIntegrand`].
    pub fn solve_integral(
        &mut self,
        y: f64,
        precision: &Precision,
        extrapolate: bool,
    ) -> Result<NumericEstimate> {
        precision.validate()?;
        if y.is_nan() || y < 0.0 {
            return Err(Error::NegativeTarget(y));
        }
        self.check_nonnegative()?;
        if y == 0.0 {
            return Ok(NumericEstimate::exact(self.lo()).with_sample_cnt(self.sample_cnt()));
        }
        let mut last: Option<NumericEstimate> = None;
        loop {
            let give_up = |status: EstimateStatus, cnt: usize| {
                last.unwrap_or_else(NumericEstimate::unknown)
                    .with_sample_cnt(cnt)
                    .with_status(status)
            };
            let total = self.estimate();
            let root = self.node(self.root());
            let stuck = root.efficiency() <= 0.0;
            let over_budget = self.sample_cnt() + self.refine_cost(root.best_leaf())
                > precision.max_sample_cnt;

            if y > total.upper_bound {
                if over_budget {
                    return Ok(give_up(EstimateStatus::TooManySteps, self.sample_cnt()));
                }
                if extrapolate && self.hi() > self.lo() {
                    self.expand_right()?;
                    self.check_nonnegative()?;
                    continue;
                }
                if stuck || precision.is_satisfied_by(&total) {
                    log::debug!("target area {y} exceeds the whole integral {total}");
                    return Ok(NumericEstimate {
                        value: self.hi(),
                        lower_bound: self.hi(),
                        upper_bound: f64::INFINITY,
                        sample_cnt: self.sample_cnt(),
                        status: EstimateStatus::Impossible,
                    });
                }
                self.refine();
                continue;
            }
            if self.sample_cnt() < precision.min_sample_cnt {
                if over_budget {
                    return Ok(give_up(EstimateStatus::TooManySteps, self.sample_cnt()));
                }
                self.refine();
                continue;
            }

            let descent = self.descend(y);
            let leaf = self.node(descent.leaf);
            let Some(ys) = leaf.samples() else {
                if self.sample_cnt() + self.refine_cost(descent.leaf) > precision.max_sample_cnt {
                    return Ok(give_up(EstimateStatus::TooManySteps, self.sample_cnt()));
                }
                self.refine_leaf(descent.leaf);
                continue;
            };
            check_samples(ys, leaf.lo(), leaf.hi())?;
            let window = bisect_window(ys, leaf.lo(), leaf.hi(), descent.remaining)?;
            let (local, density) = solve_window(&window.ys, window.lo, window.hi, window.target)?;

            let to_x = |area: f64| {
                if area == 0.0 {
                    0.0
                } else if density > 0.0 {
                    area / density
                } else {
                    f64::INFINITY
                }
            };
            let skipped_dx = to_x(descent.skipped_width);
            let local_dx = to_x(window.area_err);
            let lower = local.lower_bound - 0.5 * (skipped_dx + local_dx);
            let upper = local.upper_bound + 0.5 * (skipped_dx + local_dx);
            let result = NumericEstimate::new(local.value, lower, upper, self.sample_cnt());
            log::trace!("inverse integral of {y}: {result}");
            if precision.is_satisfied_by(&result) {
                return Ok(result);
            }
            last = Some(result);

            let allowed = precision.tolerance_at(local.value);
            let skipped_leaf = descent
                .widest_skipped
                .map(|id| self.node(id))
                .filter(|n| n.efficiency() > 0.0)
                .map(|n| n.best_leaf());
            let leaf_refinable = !leaf.is_exhausted();
            let next = match skipped_leaf {
                Some(s) if skipped_dx > 0.5 * allowed || !leaf_refinable => Some(s),
                _ if leaf_refinable => Some(descent.leaf),
                _ => None,
            };
            let Some(next) = next else {
                log::debug!("inverse integral of {y} stopped: responsible leaf is exhausted");
                return Ok(result.with_status(EstimateStatus::TooSmallStepSize));
            };
            if self.sample_cnt() + self.refine_cost(next) > precision.max_sample_cnt {
                log::debug!(
                    "inverse integral of {y} stopped: budget of {} samples exhausted",
                    precision.max_sample_cnt
                );
                return Ok(result.with_status(EstimateStatus::TooManySteps));
            }
            self.refine_leaf(next);
        }
    }

    /// Find the `q`-quantile of the distribution with density proportional
    /// to `f` on the tree's domain.
    ///
    /// The target `q * total` is solved with half of `precision`. The
    /// uncertainty of the total widens the bounds through the density at
    /// the solution, so the total is refined until that widening fits in
    /// the other half. In the tails, where the density is small, this asks
    /// for a total far more accurate than `precision` itself.
    ///
    /// The status is [`Ok`](EstimateStatus::Ok) only when the widened
    /// bounds satisfy `precision`.
    pub fn quantile(
        &mut self,
        q: f64,
        precision: &Precision,
        extrapolate: bool,
    ) -> Result<NumericEstimate> {
        if !(0.0..=1.0).contains(&q) {
            return Err(Error::InvalidQuantile(q));
        }
        let half = precision.scaled(0.5);
        let mut total = self.integral(&half)?;
        if !(total.value > 0.0) {
            return Ok(NumericEstimate::new(self.lo(), self.lo(), self.hi(), self.sample_cnt())
                .with_status(EstimateStatus::Impossible));
        }
        loop {
            log::trace!("quantile {q}: total {total}");
            let x = self.solve_integral(q * total.value, &half, extrapolate)?;
            let density = self.eval(x.value);
            let widen = if density > 0.0 {
                0.5 * q * total.width() / density
            } else {
                self.hi() - self.lo()
            };
            let result = NumericEstimate {
                value: x.value,
                lower_bound: x.lower_bound - widen,
                upper_bound: x.upper_bound + widen,
                sample_cnt: self.sample_cnt(),
                status: x.status.merge(total.status),
            };
            if !result.is_ok() || precision.is_satisfied_by(&result) {
                return Ok(result);
            }
            if !(density > 0.0) {
                log::debug!("quantile {q} stopped: zero density at {}", x.value);
                return Ok(result.with_status(EstimateStatus::TooSmallStepSize));
            }
            // Total width whose widening fits in the other half of the budget.
            let allowed = 0.45 * precision.tolerance_at(x.value) * density / q;
            let tighter = precision
                .with_relative_error(0.0)
                .with_absolute_error(allowed);
            let refined = self.integral(&tighter)?;
            if !refined.is_ok() {
                log::debug!("quantile {q} stopped: total {refined} cannot reach {allowed:e}");
                return Ok(result.with_status(refined.status));
            }
            if !(refined.width() < total.width()) {
                log::debug!("quantile {q} stopped: total {refined} no longer narrows");
                return Ok(result.with_status(EstimateStatus::TooSmallStepSize));
            }
            total = refined;
        }
    }

    fn check_nonnegative(&self) -> Result<()> {
        for leaf in self.leaves() {
            let node = self.node(leaf);
            if let Some(ys) = node.samples() {
                check_samples(ys, node.lo(), node.hi())?;
            }
        }
        Ok(())
    }

    /// Walk from the root towards the leaf holding the area `y`.
    fn descend(&self, y: f64) -> Descent {
        let mut id = self.root();
        let mut remaining = y;
        let mut skipped_width = 0.0;
        let mut widest: Option<(NodeId, f64)> = None;
        while let Some((l, r)) = self.node(id).children() {
            let left = self.node(l).estimate();
            if remaining > left.lower_bound {
                let w = left.width();
                skipped_width += w;
                match widest {
                    Some((_, best)) if best >= w => {}
                    _ => widest = Some((l, w)),
                }
            }
            if remaining <= left.value {
                id = l;
            } else {
                remaining -= left.value;
                id = r;
            }
        }
        Descent {
            leaf: id,
            remaining,
            skipped_width,
            widest_skipped: widest.map(|(id, _)| id),
        }
    }
}
