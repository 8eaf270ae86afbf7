//! function::types — shared numeric aliases and engine constants.
//!
//! Purpose
//! -------
//! Centralize the numeric container types used across the function engine.
//! The rest of the crate imports these aliases instead of spelling out
//! `ndarray` generics, so the backing representation can evolve in one
//! place.
//!
//! Conventions
//! -----------
//! - A [`Point`] is a column vector; its length is the input (or output)
//!   dimension of the function it is fed to (or produced by).
//! - A [`Matrix`] holding a gradient follows the transposed-Jacobian
//!   convention used throughout the crate: shape `inputDim × outputDim`,
//!   with column `k` holding `∂y_k/∂x`.
//! - A [`SymTensor`] holding a Hessian has shape
//!   `inputDim × inputDim × outputDim` and is symmetric in its first two
//!   axes for every output slice.
//! - A [`Sample`] is an ordered batch of points; batching is purely a
//!   throughput device and never changes semantics.
//!
//! Testing notes
//! -------------
//! - This module only defines aliases and constants; correctness is
//!   exercised by every other module's tests.
use ndarray::{Array1, Array2, Array3};

/// Input or output vector of a function.
pub type Point = Array1<f64>;

/// Transposed Jacobian: `inputDim × outputDim`, column `k` = `∂y_k/∂x`.
pub type Matrix = Array2<f64>;

/// Second-derivative tensor: `inputDim × inputDim × outputDim`.
pub type SymTensor = Array3<f64>;

/// Ordered batch of points, evaluated element-wise.
pub type Sample = Vec<Point>;

/// Default step for centered/forward finite-difference gradients.
pub const DEFAULT_GRADIENT_STEP: f64 = 1.0e-5;

/// Default step for finite-difference Hessians.
pub const DEFAULT_HESSIAN_STEP: f64 = 1.0e-4;

/// Default bound on the evaluation cache, in entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;
