// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric estimates with error bounds.

use core::fmt;

/// How a computation that produced a [`NumericEstimate`] ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EstimateStatus {
    /// The requested precision was reached.
    #[default]
    Ok,
    /// The sample budget ran out before the precision was reached.
    TooManySteps,
    /// The sample spacing could not be reduced any further in floating point.
    TooSmallStepSize,
    /// The problem has no solution; for example a target area larger than
    /// the whole integral.
    Impossible,
}

impl EstimateStatus {
    /// The worse of two statuses.
    ///
    /// Statuses are ordered `Ok < TooManySteps < TooSmallStepSize <
    /// Impossible`.
    #[inline]
    #[must_use]
    pub fn merge(self, other: EstimateStatus) -> EstimateStatus {
        self.max(other)
    }
}

impl fmt::Display for EstimateStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            EstimateStatus::Ok => "ok",
            EstimateStatus::TooManySteps => "too many steps",
            EstimateStatus::TooSmallStepSize => "too small step size",
            EstimateStatus::Impossible => "impossible",
        };
        f.write_str(s)
    }
}

/// A numeric result together with bounds on where the true value lies.
///
/// When `status` is [`EstimateStatus::Ok`], `lower_bound <= value <=
/// upper_bound`. The bounds of the Romberg estimates are heuristic: they are
/// derived from the difference between successive extrapolations, not from
/// a proof.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericEstimate {
    /// The best estimate.
    pub value: f64,
    /// A lower bound on the true value.
    pub lower_bound: f64,
    /// An upper bound on the true value.
    pub upper_bound: f64,
    /// Number of function samples spent.
    pub sample_cnt: usize,
    /// How the computation ended.
    pub status: EstimateStatus,
}

impl NumericEstimate {
    /// An estimate with explicit bounds and status `Ok`.
    ///
    /// The bounds are reordered if they are given the wrong way around, and
    /// widened to contain `value`.
    #[inline]
    pub fn new(value: f64, lower_bound: f64, upper_bound: f64, sample_cnt: usize) -> Self {
        let (lo, hi) = if lower_bound <= upper_bound {
            (lower_bound, upper_bound)
        } else {
            (upper_bound, lower_bound)
        };
        NumericEstimate {
            value,
            lower_bound: lo.min(value),
            upper_bound: hi.max(value),
            sample_cnt,
            status: EstimateStatus::Ok,
        }
    }

    /// An estimate known exactly.
    #[inline]
    pub fn exact(value: f64) -> Self {
        NumericEstimate {
            value,
            lower_bound: value,
            upper_bound: value,
            sample_cnt: 0,
            status: EstimateStatus::Ok,
        }
    }

    /// An estimate about which nothing is known yet.
    #[inline]
    pub fn unknown() -> Self {
        NumericEstimate {
            value: 0.0,
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
            sample_cnt: 0,
            status: EstimateStatus::Ok,
        }
    }

    /// `upper_bound - lower_bound`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    /// Did the computation reach its precision?
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status == EstimateStatus::Ok
    }

    /// Are both bounds finite?
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.lower_bound.is_finite() && self.upper_bound.is_finite()
    }

    /// Is `x` within the bounds?
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower_bound && x <= self.upper_bound
    }

    /// Replace the status.
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: EstimateStatus) -> Self {
        self.status = status;
        self
    }

    /// Replace the sample count.
    #[inline]
    #[must_use]
    pub fn with_sample_cnt(mut self, sample_cnt: usize) -> Self {
        self.sample_cnt = sample_cnt;
        self
    }

    /// Keep the worse of the current status and `status`.
    #[inline]
    #[must_use]
    pub fn merge_status(mut self, status: EstimateStatus) -> Self {
        self.status = self.status.merge(status);
        self
    }

    /// Sum of two independent estimates.
    ///
    /// Values, bounds and sample counts add; the worse status wins.
    #[inline]
    #[must_use]
    pub fn add(self, other: NumericEstimate) -> Self {
        NumericEstimate {
            value: self.value + other.value,
            lower_bound: self.lower_bound + other.lower_bound,
            upper_bound: self.upper_bound + other.upper_bound,
            sample_cnt: self.sample_cnt + other.sample_cnt,
            status: self.status.merge(other.status),
        }
    }

    /// Multiply by a constant.
    ///
    /// A negative factor swaps the bounds.
    #[inline]
    #[must_use]
    pub fn scale(self, k: f64) -> Self {
        let a = self.lower_bound * k;
        let b = self.upper_bound * k;
        NumericEstimate {
            value: self.value * k,
            lower_bound: a.min(b),
            upper_bound: a.max(b),
            ..self
        }
    }

    /// Interval division by a strictly positive estimate.
    ///
    /// If the denominator's lower bound is not positive the result has
    /// infinite bounds.
    #[must_use]
    pub fn div(self, denominator: NumericEstimate) -> Self {
        let value = self.value / denominator.value;
        let (lower_bound, upper_bound) = if denominator.lower_bound > 0.0 {
            let candidates = [
                self.lower_bound / denominator.lower_bound,
                self.lower_bound / denominator.upper_bound,
                self.upper_bound / denominator.lower_bound,
                self.upper_bound / denominator.upper_bound,
            ];
            let lo = candidates.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = candidates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (lo.min(value), hi.max(value))
        } else {
            (f64::NEG_INFINITY, f64::INFINITY)
        };
        NumericEstimate {
            value,
            lower_bound,
            upper_bound,
            sample_cnt: self.sample_cnt + denominator.sample_cnt,
            status: self.status.merge(denominator.status),
        }
    }
}

impl Default for NumericEstimate {
    fn default() -> Self {
        NumericEstimate::unknown()
    }
}

impl From<f64> for NumericEstimate {
    #[inline]
    fn from(value: f64) -> Self {
        NumericEstimate::exact(value)
    }
}

impl fmt::Display for NumericEstimate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)?;
        write!(f, " [")?;
        fmt::Display::fmt(&self.lower_bound, f)?;
        write!(f, ", ")?;
        fmt::Display::fmt(&self.upper_bound, f)?;
        write!(f, "] ({} samples, {})", self.sample_cnt, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn construction() {
        let e = NumericEstimate::new(1.0, 1.5, 0.5, 9);
        assert_eq!(e.lower_bound, 0.5);
        assert_eq!(e.upper_bound, 1.5);
        assert_eq!(e.width(), 1.0);
        assert!(e.is_ok() && e.contains(1.2) && !e.contains(2.0));

        let widened = NumericEstimate::new(3.0, 0.0, 1.0, 0);
        assert_eq!(widened.upper_bound, 3.0);

        let u = NumericEstimate::unknown();
        assert!(!u.is_bounded());
        assert_eq!(u.width(), f64::INFINITY);
    }

    #[test]
    fn arithmetic() {
        let a = NumericEstimate::new(1.0, 0.9, 1.1, 5);
        let b = NumericEstimate::new(2.0, 1.8, 2.2, 9).with_status(EstimateStatus::TooManySteps);
        let s = a.add(b);
        assert!((s.value - 3.0).abs() < 1e-15);
        assert!((s.lower_bound - 2.7).abs() < 1e-15);
        assert!((s.upper_bound - 3.3).abs() < 1e-15);
        assert_eq!(s.sample_cnt, 14);
        assert_eq!(s.status, EstimateStatus::TooManySteps);

        let n = a.scale(-2.0);
        assert_eq!(n.value, -2.0);
        assert_eq!(n.lower_bound, -2.2);
        assert_eq!(n.upper_bound, -1.8);

        let q = NumericEstimate::new(4.0, 3.0, 5.0, 0).div(NumericEstimate::new(2.0, 1.0, 4.0, 0));
        assert_eq!(q.value, 2.0);
        assert_eq!(q.lower_bound, 0.75);
        assert_eq!(q.upper_bound, 5.0);

        let z = a.div(NumericEstimate::new(0.0, -1.0, 1.0, 0));
        assert!(!z.is_bounded());
    }

    #[test]
    fn status_ordering() {
        assert_eq!(
            EstimateStatus::Ok.merge(EstimateStatus::TooSmallStepSize),
            EstimateStatus::TooSmallStepSize
        );
        assert_eq!(
            EstimateStatus::Impossible.merge(EstimateStatus::TooManySteps),
            EstimateStatus::Impossible
        );
        let e = NumericEstimate::exact(1.0)
            .merge_status(EstimateStatus::TooManySteps)
            .merge_status(EstimateStatus::Ok);
        assert_eq!(e.status, EstimateStatus::TooManySteps);
    }

    #[test]
    fn display() {
        let e = NumericEstimate::new(1.5, 1.0, 2.0, 17);
        assert_eq!(format!("{e}"), "1.5 [1, 2] (17 samples, ok)");
        let e = e.with_status(EstimateStatus::TooManySteps);
        assert_eq!(format!("{e:.1}"), "1.5 [1.0, 2.0] (17 samples, too many steps)");
    }
}
