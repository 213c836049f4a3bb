// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accuracy and work budgets for numeric computations.

use crate::{Error, NumericEstimate, Result};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Requested accuracy and sample budget.
///
/// Two numbers are close enough when they agree to within
/// `absolute_error`, or to within `relative_error` of the larger magnitude.
/// Either tolerance suffices; set one of them to zero to demand the other.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Precision {
    /// Acceptable error relative to the magnitude of the result.
    pub relative_error: f64,
    /// Acceptable absolute error.
    pub absolute_error: f64,
    /// Samples to take before convergence may be declared.
    pub min_sample_cnt: usize,
    /// Samples after which the computation stops with
    /// [`EstimateStatus::TooManySteps`](crate::EstimateStatus::TooManySteps).
    pub max_sample_cnt: usize,
}

impl Default for Precision {
    fn default() -> Self {
        Precision {
            relative_error: 1e-10,
            absolute_error: 1e-12,
            min_sample_cnt: 5,
            max_sample_cnt: 1 << 20,
        }
    }
}

impl Precision {
    /// A precision with the given tolerances and the default sample budget.
    #[inline]
    pub fn new(relative_error: f64, absolute_error: f64) -> Self {
        Precision {
            relative_error,
            absolute_error,
            ..Precision::default()
        }
    }

    /// Replace the relative tolerance.
    #[inline]
    #[must_use]
    pub fn with_relative_error(mut self, relative_error: f64) -> Self {
        self.relative_error = relative_error;
        self
    }

    /// Replace the absolute tolerance.
    #[inline]
    #[must_use]
    pub fn with_absolute_error(mut self, absolute_error: f64) -> Self {
        self.absolute_error = absolute_error;
        self
    }

    /// Replace the minimum sample count.
    #[inline]
    #[must_use]
    pub fn with_min_sample_cnt(mut self, min_sample_cnt: usize) -> Self {
        self.min_sample_cnt = min_sample_cnt;
        self
    }

    /// Replace the maximum sample count.
    #[inline]
    #[must_use]
    pub fn with_max_sample_cnt(mut self, max_sample_cnt: usize) -> Self {
        self.max_sample_cnt = max_sample_cnt;
        self
    }

    /// Both tolerances multiplied by `k`; sample budgets unchanged.
    #[inline]
    #[must_use]
    pub fn scaled(self, k: f64) -> Self {
        Precision {
            relative_error: self.relative_error * k,
            absolute_error: self.absolute_error * k,
            ..self
        }
    }

    /// The share of this budget given to one of `n` sub-computations.
    ///
    /// Tolerances and the maximum sample count are divided by `n`.
    #[must_use]
    pub fn split(self, n: usize) -> Self {
        let n = n.max(1);
        Precision {
            relative_error: self.relative_error / n as f64,
            absolute_error: self.absolute_error / n as f64,
            min_sample_cnt: self.min_sample_cnt,
            max_sample_cnt: (self.max_sample_cnt / n).max(self.min_sample_cnt),
        }
    }

    /// Reject negative or NaN tolerances and `min_sample_cnt > max_sample_cnt`.
    pub fn validate(&self) -> Result<()> {
        let tolerance_ok = |e: f64| e >= 0.0;
        if !tolerance_ok(self.relative_error)
            || !tolerance_ok(self.absolute_error)
            || self.min_sample_cnt > self.max_sample_cnt
        {
            return Err(Error::InvalidPrecision);
        }
        Ok(())
    }

    /// Absolute error allowed around `magnitude`.
    #[inline]
    pub fn tolerance_at(&self, magnitude: f64) -> f64 {
        self.absolute_error.max(self.relative_error * magnitude.abs())
    }

    /// Do `a` and `b` agree within either tolerance?
    #[inline]
    pub fn close_enough(&self, a: f64, b: f64) -> bool {
        let diff = (a - b).abs();
        diff <= self.absolute_error || diff <= self.relative_error * a.abs().max(b.abs())
    }

    /// Do `a` and `b` agree within both tolerances?
    #[inline]
    pub fn close_enough_both(&self, a: f64, b: f64) -> bool {
        let diff = (a - b).abs();
        diff <= self.absolute_error && diff <= self.relative_error * a.abs().max(b.abs())
    }

    /// Are the bounds of `estimate` finite and close enough?
    #[inline]
    pub fn is_satisfied_by(&self, estimate: &NumericEstimate) -> bool {
        estimate.is_bounded() && self.close_enough(estimate.lower_bound, estimate.upper_bound)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, NumericEstimate, Precision};

    #[test]
    fn either_tolerance() {
        let p = Precision::new(1e-3, 1e-6);
        // relative suffices
        assert!(p.close_enough(1000.0, 1000.5));
        // absolute suffices
        assert!(p.close_enough(0.0, 5e-7));
        assert!(!p.close_enough(1.0, 1.01));
        assert!(!p.close_enough_both(1000.0, 1000.5));
        assert!(p.close_enough_both(1000.0, 1000.0 + 5e-7));
    }

    #[test]
    fn zero_tolerance_demands_the_other() {
        let absolute_only = Precision::new(0.0, 1e-3);
        assert!(!absolute_only.close_enough(1e6, 1e6 + 1.0));
        assert!(absolute_only.close_enough(1e6, 1e6 + 1e-4));
    }

    #[test]
    fn satisfied_by() {
        let p = Precision::default();
        assert!(p.is_satisfied_by(&NumericEstimate::exact(3.0)));
        assert!(!p.is_satisfied_by(&NumericEstimate::unknown()));
        assert!(!p.is_satisfied_by(&NumericEstimate::new(1.0, 0.9, 1.1, 3)));
    }

    #[test]
    fn budgets() {
        let p = Precision::default();
        let half = p.split(2);
        assert_eq!(half.relative_error, 0.5e-10);
        assert_eq!(half.max_sample_cnt, 1 << 19);
        let s = p.scaled(0.5);
        assert_eq!(s.absolute_error, 0.5e-12);
        assert_eq!(s.max_sample_cnt, p.max_sample_cnt);
    }

    #[test]
    fn validation() {
        assert_eq!(Precision::default().validate(), Ok(()));
        assert_eq!(
            Precision::new(-1.0, 0.0).validate(),
            Err(Error::InvalidPrecision)
        );
        assert_eq!(
            Precision::new(f64::NAN, 0.0).validate(),
            Err(Error::InvalidPrecision)
        );
        assert_eq!(
            Precision::default()
                .with_min_sample_cnt(10)
                .with_max_sample_cnt(9)
                .validate(),
            Err(Error::InvalidPrecision)
        );
    }
}
