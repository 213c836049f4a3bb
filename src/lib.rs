// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numerical integration and curve queries with explicit error bounds.
//!
//! The kvadraturo library computes definite integrals of one-dimensional
//! functions with adaptive Romberg quadrature, inverts them (finding where
//! an integral reaches a given area, including quantiles of a density), and
//! answers nearest point and intersection queries on Bézier curves, elliptic
//! arcs, and paths made of them. Every numeric answer comes as a
//! [`NumericEstimate`]: a value, a lower and upper bound, the number of
//! function samples spent, and a status telling whether the requested
//! [`Precision`] was met.
//!
//! # Examples
//!
//! Integrating a function:
//! ```
//! use kvadraturo::{Precision, RombergTree};
//!
//! let mut tree = RombergTree::new(f64::sin, 0.0, core::f64::consts::PI).unwrap();
//! let area = tree.integral(&Precision::default()).unwrap();
//! assert!(area.is_ok());
//! assert!((area.value - 2.0).abs() < 1e-9);
//! ```
//!
//! Finding the median of a density:
//! ```
//! use kvadraturo::{Precision, RombergTree};
//!
//! let mut tree = RombergTree::new(|x: f64| 2.0 * x, 0.0, 1.0).unwrap();
//! let median = tree.quantile(0.5, &Precision::default(), false).unwrap();
//! assert!((median.value - 0.5f64.sqrt()).abs() < 1e-8);
//! ```
//!
//! The nearest point on a curve:
//! ```
//! use kvadraturo::{Param2D, Point, QuadBez};
//!
//! let curve = Param2D::new(QuadBez::new((0.0, 5.0), (1.0, 3.0), (2.0, 5.0)));
//! let nearest = curve.distance(Point::new(1.0, 0.0));
//! assert!((nearest.t - 0.5).abs() < 1e-12);
//! assert!((nearest.distance - 4.0).abs() < 1e-12);
//! ```
//!
//! # Features
//!
//! This crate either uses the standard library or the [`libm`] crate for
//! math functionality. The `std` feature is enabled by default, but can be
//! disabled, as long as the `libm` feature is enabled. This is useful for
//! `no_std` environments. The `alloc` crate is used regardless.
//!
//! [`libm`]: https://docs.rs/libm

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision,
    clippy::bool_to_int_with_if
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("kvadraturo requires either the `std` or `libm` feature");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use libm as _;

extern crate alloc;

mod adaptive;
mod affine;
mod arc;
pub mod common;
mod cubicbez;
mod curve;
mod error;
mod estimate;
mod intersect;
mod inverse;
mod line;
mod nearest;
mod param2d;
mod param_curve;
mod path;
mod point;
mod poly;
mod precision;
mod quadbez;
mod rect;
mod romberg;
mod vec2;

pub use crate::adaptive::*;
pub use crate::affine::*;
pub use crate::arc::*;
pub use crate::cubicbez::*;
pub use crate::curve::*;
pub use crate::error::*;
pub use crate::estimate::*;
pub use crate::intersect::*;
pub use crate::inverse::*;
pub use crate::line::*;
pub use crate::nearest::*;
pub use crate::param2d::*;
pub use crate::param_curve::*;
pub use crate::path::*;
pub use crate::point::*;
pub use crate::poly::*;
pub use crate::precision::*;
pub use crate::quadbez::*;
pub use crate::rect::*;
pub use crate::romberg::*;
pub use crate::vec2::*;
