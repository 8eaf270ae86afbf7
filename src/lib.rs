//! rust_numfunc — composable numeric functions ℝⁿ→ℝᵏ with derivative semantics.
//!
//! Purpose
//! -------
//! Represent mathematical functions as first-class values carrying three
//! coupled capabilities — evaluation, gradient (transposed Jacobian) and
//! Hessian — and provide an algebra of combinators (linear combination,
//! dual linear combination, product, composition, aggregation, parametric
//! restriction, marginal extraction, indicator, database lookup) that
//! propagates the correct calculus rule through every construction.
//!
//! Key behaviors
//! -------------
//! - [`function::Function`] is a cheap-to-clone, copy-on-write handle over a
//!   shared [`function::FunctionCore`]; mutation never leaks to value-equal
//!   peers.
//! - A core built from an evaluation alone synthesizes finite-difference
//!   gradient/Hessian fallbacks automatically; analytic combinators carry
//!   their exact derivative rules instead.
//! - Every call is routed through a per-core instrumentation layer: a
//!   bounded point→value cache, monotonic call counters, and an optional
//!   evaluation history log.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numeric containers are `ndarray` types over `f64`; a gradient is
//!   stored transposed (`inputDim × outputDim`, column `k` holding
//!   `∂y_k/∂x`), a Hessian as `inputDim × inputDim × outputDim` symmetric
//!   in its first two axes.
//! - Combinator constructors validate operand dimensions eagerly and fail
//!   with [`function::FuncError`] before any core is built.
//! - Concurrent read-only calls on one shared handle are safe; counters are
//!   atomic and cache/history updates are lock-protected.
//!
//! Conventions
//! -----------
//! - Errors bubble up as [`function::FuncResult`]; the library never panics
//!   on user input and uses no `unsafe`.
//! - Numerical quadrature, ODE integration, symbolic parsing, persistence
//!   and plotting are external collaborators: they consume this crate only
//!   through the evaluation surface and the structural accessors.

pub mod combinators;
pub mod function;

pub use crate::combinators::ComparisonOperator;
pub use crate::function::{
    Evaluation, FiniteDifferenceGradient, FiniteDifferenceHessian, FiniteDifferenceScheme,
    FuncError, FuncResult, Function, FunctionCore, Gradient, Hessian, Matrix, Point, Sample,
    SymTensor,
};
