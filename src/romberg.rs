// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Romberg integration over a fixed interval.

use alloc::vec::Vec;

use crate::error::check_bounds;
use crate::{Error, EstimateStatus, NumericEstimate, Precision, Result};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// The Richardson extrapolation table of a Romberg integration.
///
/// Only the newest row is kept. Each call to [`push`](Self::push) adds a
/// trapezoid estimate with twice as many intervals as the previous one and
/// extrapolates it as far as the row allows, using
///
/// ```text
/// R(n, k) = R(n, k-1) + (R(n, k-1) - R(n-1, k-1)) / (4^k - 1)
/// ```
#[derive(Clone, Debug)]
pub struct RombergTable {
    row: Vec<f64>,
    previous: Option<f64>,
}

impl RombergTable {
    /// Start a table from the single-interval trapezoid estimate.
    pub fn new(trapezoid: f64) -> Self {
        RombergTable {
            row: alloc::vec![trapezoid],
            previous: None,
        }
    }

    /// Add the trapezoid estimate for the next step halving.
    pub fn push(&mut self, trapezoid: f64) {
        self.previous = Some(self.estimate());
        let mut cur = trapezoid;
        let mut factor = 1.0;
        for slot in &mut self.row {
            factor *= 4.0;
            let prev = core::mem::replace(slot, cur);
            cur += (cur - prev) / (factor - 1.0);
        }
        self.row.push(cur);
    }

    /// The latest trapezoid estimate, without extrapolation.
    #[inline]
    pub fn trapezoid(&self) -> f64 {
        self.row[0]
    }

    /// The most extrapolated estimate.
    #[inline]
    pub fn estimate(&self) -> f64 {
        self.row[self.row.len() - 1]
    }

    /// The most extrapolated estimate before the last [`push`](Self::push).
    #[inline]
    pub fn previous(&self) -> Option<f64> {
        self.previous
    }

    /// Number of step halvings performed so far.
    #[inline]
    pub fn levels(&self) -> usize {
        self.row.len() - 1
    }

    /// Has the estimate stopped moving, as judged by `precision`?
    pub fn converged(&self, precision: &Precision) -> bool {
        self.previous
            .is_some_and(|prev| precision.close_enough(self.estimate(), prev))
    }

    /// The current estimate, bounded by its distance to the previous one.
    ///
    /// This bound is a heuristic. A function with features narrower than
    /// the sample spacing can fool it. Without a previous estimate the bounds
    /// are infinite.
    pub fn to_estimate(&self, sample_cnt: usize) -> NumericEstimate {
        let value = self.estimate();
        match self.previous {
            Some(prev) => {
                let err = (value - prev).abs();
                NumericEstimate::new(value, value - err, value + err, sample_cnt)
            }
            None => NumericEstimate {
                value,
                sample_cnt,
                ..NumericEstimate::unknown()
            },
        }
    }
}

/// Is `n` of the form `2^k + 1`?
#[inline]
pub(crate) fn is_romberg_len(n: usize) -> bool {
    n >= 2 && (n - 1).is_power_of_two()
}

/// Integrate `f` over `lo..=hi` by Romberg's method.
///
/// Starts from the trapezoid through the endpoints and halves the step
/// until two successive extrapolations are [close enough] and
/// `min_sample_cnt` samples have been taken. Samples are never recomputed.
///
/// The result has status [`TooManySteps`] if the next halving would exceed
/// `max_sample_cnt`, and [`TooSmallStepSize`] if halving no longer moves
/// the sample locations in floating point. `lo == hi` gives an exact zero
/// without sampling.
///
/// [close enough]: Precision::close_enough
/// [`TooManySteps`]: EstimateStatus::TooManySteps
/// [`TooSmallStepSize`]: EstimateStatus::TooSmallStepSize
///
/// # Examples
///
/// ```
/// use kvadraturo::{romberg, Precision};
///
/// let est = romberg(|x| x * x, 0.0, 3.0, &Precision::default()).unwrap();
/// assert!((est.value - 9.0).abs() < 1e-9);
/// assert!(est.contains(9.0) || est.width() < 1e-9);
/// ```
pub fn romberg<F>(mut f: F, lo: f64, hi: f64, precision: &Precision) -> Result<NumericEstimate>
where
    F: FnMut(f64) -> f64,
{
    precision.validate()?;
    check_bounds(lo, hi)?;
    if lo == hi {
        return Ok(NumericEstimate::exact(0.0));
    }
    let width = hi - lo;
    let mut table = RombergTable::new(0.5 * width * (f(lo) + f(hi)));
    let mut sample_cnt = 2;
    let mut intervals: usize = 1;
    loop {
        if sample_cnt >= precision.min_sample_cnt && table.converged(precision) {
            return Ok(table.to_estimate(sample_cnt));
        }
        let next_cnt = sample_cnt + intervals;
        if next_cnt > precision.max_sample_cnt {
            log::debug!(
                "romberg on [{lo}, {hi}] stopped at {sample_cnt} samples: budget of {} exhausted",
                precision.max_sample_cnt
            );
            return Ok(table
                .to_estimate(sample_cnt)
                .with_status(EstimateStatus::TooManySteps));
        }
        let n = (2 * intervals) as f64;
        let h = width / n;
        if lo + h <= lo || hi - h >= hi {
            log::debug!("romberg on [{lo}, {hi}] reached the smallest step size {h:e}");
            return Ok(table
                .to_estimate(sample_cnt)
                .with_status(EstimateStatus::TooSmallStepSize));
        }
        let mut sum = 0.0;
        for i in 0..intervals {
            sum += f(lo + width * ((2 * i + 1) as f64 / n));
        }
        table.push(0.5 * table.trapezoid() + h * sum);
        sample_cnt = next_cnt;
        intervals *= 2;
        log::trace!(
            "romberg level {}: {} ({sample_cnt} samples)",
            table.levels(),
            table.estimate()
        );
    }
}

/// Run Romberg extrapolation over evenly spaced samples.
///
/// `ys` holds samples at `lo, lo + h, ..., lo + width`; its length must be
/// `2^k + 1`. With only the two endpoints there is nothing to compare
/// against, so the bounds are infinite.
pub fn romberg_samples(ys: &[f64], width: f64) -> Result<NumericEstimate> {
    let n = ys.len();
    if !is_romberg_len(n) {
        return Err(Error::InvalidSampleCount(n));
    }
    let last = n - 1;
    let mut table = RombergTable::new(0.5 * width * (ys[0] + ys[last]));
    let mut stride = last;
    while stride > 1 {
        let half = stride / 2;
        let sum: f64 = ys[half..last].iter().step_by(stride).sum();
        let h = width * (half as f64 / last as f64);
        table.push(0.5 * table.trapezoid() + h * sum);
        stride = half;
    }
    Ok(table.to_estimate(n))
}
