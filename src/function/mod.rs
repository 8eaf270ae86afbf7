//! function — the derivative-dispatch engine.
//!
//! Purpose
//! -------
//! House the polymorphic evaluation/gradient/Hessian triple, the numeric
//! finite-difference fallbacks, the instrumented owning core, and the
//! copy-on-write [`Function`] handle that callers actually hold.
//!
//! Key behaviors
//! -------------
//! - [`traits`] defines the three object-safe capabilities every function
//!   object is assembled from.
//! - [`finite_diff`] synthesizes derivative fallbacks so any evaluation,
//!   however opaque, still exposes the full triple.
//! - [`core`] owns one triple, keeps it dimensionally consistent, and
//!   threads every call through [`instrument`].
//! - [`handle`] wraps the core in a cheap-to-clone value type with
//!   copy-before-write mutation and the algebraic operators.
//!
//! Conventions
//! -----------
//! - Errors bubble up as [`FuncResult`] / [`FuncError`]; construction-time
//!   compatibility checks fail fast, observability never raises.
//! - Downstream consumers (quadrature, ODE solvers, samplers) interact
//!   only with the re-exported surface below.

pub mod core;
pub mod errors;
pub mod finite_diff;
pub mod handle;
pub mod instrument;
pub mod no_derivative;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::FunctionCore;
pub use self::errors::{FuncError, FuncResult};
pub use self::finite_diff::{
    FiniteDifferenceGradient, FiniteDifferenceHessian, FiniteDifferenceScheme,
};
pub use self::handle::Function;
pub use self::instrument::{HistoryEntry, Instrumentation};
pub use self::no_derivative::{NoGradient, NoHessian};
pub use self::traits::{Evaluation, Gradient, Hessian};
pub use self::types::{Matrix, Point, Sample, SymTensor};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{FuncError, FuncResult};
    pub use super::handle::Function;
    pub use super::traits::{Evaluation, Gradient, Hessian};
    pub use super::types::{Matrix, Point, Sample, SymTensor};
}
