//! combinators — the function composition algebra.
//!
//! Purpose
//! -------
//! House the evaluation/gradient/Hessian triples that build new functions
//! out of existing [`crate::function::Function`] handles: weighted sums,
//! products, compositions, output stacking, coordinate freezing, marginal
//! extraction, level-set indicators and sample-backed lookups.
//!
//! Key behaviors
//! -------------
//! - Every combinator validates operand compatibility at construction so
//!   call sites never discover a dimension clash mid-evaluation.
//! - Analytic derivative rules (linearity, product rule, chain rule,
//!   block stacking, row/column restriction) apply whenever the operands
//!   expose derivatives; fallback-differentiated operands compose
//!   transparently.
//! - Operands are held as `Function` handles, so combinators share
//!   structure with their inputs until someone mutates.
//!
//! Conventions
//! -----------
//! - Construction returns [`crate::function::FuncResult`]; evaluation and
//!   derivative calls propagate operand errors unchanged.
//! - Callers normally reach these through the constructors on
//!   [`crate::function::Function`] rather than instantiating the triples
//!   directly.

pub mod aggregated;
pub mod composed;
pub mod database;
pub mod dual_linear;
pub mod indicator;
pub mod linear;
pub mod marginal;
pub mod parametric;
pub mod product;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::aggregated::{AggregatedEvaluation, AggregatedGradient, AggregatedHessian};
pub use self::composed::{ComposedEvaluation, ComposedGradient, ComposedHessian};
pub use self::database::DatabaseEvaluation;
pub use self::dual_linear::{
    DualLinearCombinationEvaluation, DualLinearCombinationGradient, DualLinearCombinationHessian,
};
pub use self::indicator::{ComparisonOperator, IndicatorEvaluation};
pub use self::linear::{
    LinearCombinationEvaluation, LinearCombinationGradient, LinearCombinationHessian,
};
pub use self::marginal::{MarginalEvaluation, MarginalGradient, MarginalHessian};
pub use self::parametric::{ParametricEvaluation, ParametricGradient, ParametricHessian};
pub use self::product::{ProductEvaluation, ProductGradient, ProductHessian};
