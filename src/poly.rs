// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small polynomials and linear systems.
//!
//! Coefficients are stored lowest degree first, so `[c0, c1, c2]` is
//! `c0 + c1 x + c2 x²`.

use alloc::vec::Vec;

use arrayvec::ArrayVec;

use crate::common::{solve_cubic, solve_linear, solve_quadratic};
use crate::{Error, Result};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Evaluate a polynomial with Horner's scheme.
#[inline]
pub fn eval_poly(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Evaluate a polynomial and its derivative in one pass.
///
/// Returns `(p(x), p'(x))`.
#[inline]
pub fn eval_poly_deriv(coeffs: &[f64], x: f64) -> (f64, f64) {
    let mut p = 0.0;
    let mut dp = 0.0;
    for &c in coeffs.iter().rev() {
        dp = dp * x + p;
        p = p * x + c;
    }
    (p, dp)
}

/// Coefficients of the derivative.
pub fn deriv_poly(coeffs: &[f64]) -> Vec<f64> {
    coeffs
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, &c)| c * i as f64)
        .collect()
}

/// Coefficients of the antiderivative taking the value `constant` at zero.
pub fn integrate_poly(coeffs: &[f64], constant: f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(coeffs.len() + 1);
    result.push(constant);
    result.extend(
        coeffs
            .iter()
            .enumerate()
            .map(|(i, &c)| c / (i + 1) as f64),
    );
    result
}

/// Real roots of a polynomial of degree at most three.
#[derive(Clone, Debug, PartialEq)]
pub enum Roots {
    /// Finitely many roots, possibly none.
    Finite(ArrayVec<f64, 3>),
    /// The polynomial is identically zero.
    Infinite,
}

impl Roots {
    /// Is there no root at all?
    pub fn is_empty(&self) -> bool {
        matches!(self, Roots::Finite(r) if r.is_empty())
    }
}

/// Find the real roots of `c[0] + c[1] x + c[2] x² + c[3] x³`.
///
/// Vanishing leading coefficients fall back to the lower degree solver. A
/// nonzero constant gives `Finite` with no roots, an all-zero polynomial
/// gives `Infinite`. Roots are sorted in increasing order.
///
/// Polynomials above degree three are rejected with
/// [`Error::Unsolvable`] unless their extra coefficients are zero.
pub fn solve_poly(coeffs: &[f64]) -> Result<Roots> {
    let degree = coeffs.iter().rposition(|&c| c != 0.0);
    let Some(degree) = degree else {
        return Ok(Roots::Infinite);
    };
    let c = |i: usize| coeffs.get(i).copied().unwrap_or(0.0);
    let mut roots: ArrayVec<f64, 3> = match degree {
        0 => ArrayVec::new(),
        1 => solve_linear(c(0), c(1)).into_iter().collect(),
        2 => solve_quadratic(c(0), c(1), c(2)).into_iter().collect(),
        3 => solve_cubic(c(0), c(1), c(2), c(3)),
        _ => return Err(Error::Unsolvable("polynomial degree above three")),
    };
    roots.sort_by(f64::total_cmp);
    Ok(Roots::Finite(roots))
}

/// Solve the square system `a x = b` by Gaussian elimination with partial
/// pivoting.
///
/// `a` is given row by row. A pivot that vanishes relative to the size of
/// the matrix makes the system [`Error::Unsolvable`].
pub fn solve_linear_system<const N: usize>(
    mut a: [[f64; N]; N],
    mut b: [f64; N],
) -> Result<[f64; N]> {
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |m, v| m.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(Error::Unsolvable("singular linear system"));
    }
    let tiny = scale * 1e-13;
    for col in 0..N {
        let mut pivot = col;
        for row in col + 1..N {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() <= tiny {
            return Err(Error::Unsolvable("singular linear system"));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..N {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..N {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = [0.0; N];
    for row in (0..N).rev() {
        let mut sum = b[row];
        for k in row + 1..N {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Ok(x)
}
