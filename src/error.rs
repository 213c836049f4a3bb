// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported for invalid input.
//!
//! Running out of samples or step size is not an error; that is reported
//! through the [`EstimateStatus`](crate::EstimateStatus) of the returned
//! estimate.

/// Everything that can go wrong before or during a computation.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The lower bound of a domain lies above its upper bound.
    #[error("inverted bounds: lower bound {lo} is greater than upper bound {hi}")]
    InvertedBounds {
        /// The requested lower bound.
        lo: f64,
        /// The requested upper bound.
        hi: f64,
    },
    /// A domain bound is infinite or NaN.
    #[error("domain bounds must be finite")]
    NonFiniteBounds,
    /// A leaf size is not of the form `2^i + 1` with at least 5 samples.
    #[error("leaf size {0} is not 2^i + 1 with i >= 2")]
    InvalidLeafSize(usize),
    /// A sample slice does not have `2^k + 1` entries.
    #[error("sample count {0} is not 2^k + 1")]
    InvalidSampleCount(usize),
    /// Inverse integration met a negative integrand sample.
    #[error("integrand is negative ({value}) at x = {x}")]
    NegativeIntegrand {
        /// Where the sample was taken.
        x: f64,
        /// The offending sample value.
        value: f64,
    },
    /// Inverse integration was asked for a negative area.
    #[error("target integral {0} is negative")]
    NegativeTarget(f64),
    /// A quantile lies outside `[0, 1]`.
    #[error("quantile {0} is outside [0, 1]")]
    InvalidQuantile(f64),
    /// A precision has a negative or NaN tolerance, or its minimum sample
    /// count exceeds the maximum.
    #[error("invalid precision settings")]
    InvalidPrecision,
    /// A geometric construction has no solution for the given input.
    #[error("unsolvable: {0}")]
    Unsolvable(&'static str),
    /// An iterative curve computation ran out of its work budget.
    #[error("failed to converge after {iterations} iterations")]
    FailedToConverge {
        /// Iterations spent before giving up.
        iterations: usize,
    },
}

/// Result alias with the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Check that `lo..=hi` is a usable integration domain.
pub(crate) fn check_bounds(lo: f64, hi: f64) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() {
        return Err(Error::NonFiniteBounds);
    }
    if lo > hi {
        return Err(Error::InvertedBounds { lo, hi });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn bounds_checks() {
        assert_eq!(check_bounds(0.0, 1.0), Ok(()));
        assert_eq!(check_bounds(1.0, 1.0), Ok(()));
        assert_eq!(
            check_bounds(2.0, 1.0),
            Err(Error::InvertedBounds { lo: 2.0, hi: 1.0 })
        );
        assert_eq!(check_bounds(0.0, f64::NAN), Err(Error::NonFiniteBounds));
        assert_eq!(
            check_bounds(f64::NEG_INFINITY, 0.0),
            Err(Error::NonFiniteBounds)
        );
    }

    #[test]
    fn messages() {
        let msg = Error::NegativeIntegrand { x: 0.5, value: -1.0 }.to_string();
        assert_eq!(msg, "integrand is negative (-1) at x = 0.5");
        assert_eq!(
            Error::InvalidLeafSize(6).to_string(),
            "leaf size 6 is not 2^i + 1 with i >= 2"
        );
    }
}
