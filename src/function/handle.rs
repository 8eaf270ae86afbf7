//! function::handle — the copy-on-write handle callers hold.
//!
//! Purpose
//! -------
//! [`Function`] is the value type of this crate: a cheap-to-clone wrapper
//! around a shared [`FunctionCore`]. Clones alias the same core, so
//! combinator trees share structure with their operands until the first
//! mutation, which detaches a private deep copy before applying.
//!
//! Key behaviors
//! -------------
//! - The read surface (`evaluate`, `gradient`, `hessian`, the
//!   `*_with_parameter` twins, dimensions, descriptions, counters,
//!   cache/history controls) delegates to the shared core untouched.
//! - Mutators (`set_evaluation`, `set_gradient`, `set_hessian`,
//!   `set_parameter`, description setters) go through `Arc::make_mut`:
//!   a uniquely owned core mutates in place, a shared one is cloned
//!   first. Instrumentation toggles are interior-mutable and do NOT
//!   detach.
//! - The combinator constructors (`linear_combination`, `product`,
//!   `compose`, `aggregate`, …) assemble the triples from
//!   [`crate::combinators`] and wire the analytic derivative rules;
//!   `indicator` installs refusing derivatives, `from_database` a
//!   finite-difference fallback.
//! - `+`, `-` and `*` on `&Function` are sugar for two-term linear
//!   combinations and the scalar product, returning [`FuncResult`]
//!   because operand compatibility can fail.
//!
//! Invariants & assumptions
//! ------------------------
//! - After any mutator returns, no other handle observes the change.
//! - A handle is `Send + Sync`; concurrent read calls on clones of one
//!   handle are safe and share one cache and one set of counters.
use std::sync::Arc;

use crate::combinators::{
    AggregatedEvaluation, AggregatedGradient, AggregatedHessian, ComparisonOperator,
    ComposedEvaluation, ComposedGradient, ComposedHessian, DatabaseEvaluation,
    DualLinearCombinationEvaluation, DualLinearCombinationGradient, DualLinearCombinationHessian,
    IndicatorEvaluation, LinearCombinationEvaluation, LinearCombinationGradient,
    LinearCombinationHessian, ParametricEvaluation, ParametricGradient, ParametricHessian,
    ProductEvaluation, ProductGradient, ProductHessian,
};
use crate::function::{
    core::FunctionCore,
    errors::FuncResult,
    instrument::{HistoryEntry, Instrumentation},
    no_derivative::{NoGradient, NoHessian},
    traits::{Evaluation, Gradient, Hessian},
    types::{Matrix, Point, Sample, SymTensor},
};

/// Cheap-to-clone, copy-on-write handle to one function core.
#[derive(Clone, Debug)]
pub struct Function {
    core: Arc<FunctionCore>,
}

impl Function {
    // ---- Construction ----

    /// Wrap an evaluation; derivatives become finite-difference fallbacks.
    pub fn from_evaluation(evaluation: Box<dyn Evaluation>) -> Self {
        Self { core: Arc::new(FunctionCore::from_evaluation(evaluation)) }
    }

    /// Wrap a full evaluation/gradient/Hessian triple.
    ///
    /// # Errors
    /// [`crate::function::errors::FuncError::DimensionMismatch`] if the
    /// derivative dimensions disagree with the evaluation's.
    pub fn new(
        evaluation: Box<dyn Evaluation>, gradient: Box<dyn Gradient>, hessian: Box<dyn Hessian>,
    ) -> FuncResult<Self> {
        Ok(Self { core: Arc::new(FunctionCore::new(evaluation, gradient, hessian)?) })
    }

    fn from_core(core: FunctionCore) -> Self {
        Self { core: Arc::new(core) }
    }

    /// The shared core. Read-only; mutation goes through the setters.
    pub fn core(&self) -> &FunctionCore {
        &self.core
    }

    /// Exclusive access to the core, detaching from sharers first.
    fn core_mut(&mut self) -> &mut FunctionCore {
        Arc::make_mut(&mut self.core)
    }

    /// `true` when both handles alias the same core.
    pub fn shares_core_with(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    // ---- Call surface ----

    /// Evaluate at one point, through cache, counters and history.
    ///
    /// # Errors
    /// See [`FunctionCore::evaluate`].
    pub fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        self.core.evaluate(point)
    }

    /// Evaluate a batch of points; cached points skip dispatch.
    ///
    /// # Errors
    /// See [`FunctionCore::evaluate_sample`].
    pub fn evaluate_sample(&self, sample: &[Point]) -> FuncResult<Sample> {
        self.core.evaluate_sample(sample)
    }

    /// Evaluate under a one-call parameter override.
    ///
    /// # Errors
    /// See [`FunctionCore::evaluate_with_parameter`].
    pub fn evaluate_with_parameter(&self, point: &Point, parameter: &Point) -> FuncResult<Point> {
        self.core.evaluate_with_parameter(point, parameter)
    }

    /// Transposed Jacobian at a point.
    ///
    /// # Errors
    /// See [`FunctionCore::gradient`].
    pub fn gradient(&self, point: &Point) -> FuncResult<Matrix> {
        self.core.gradient(point)
    }

    /// Transposed Jacobian under a one-call parameter override.
    pub fn gradient_with_parameter(&self, point: &Point, parameter: &Point) -> FuncResult<Matrix> {
        self.core.gradient_with_parameter(point, parameter)
    }

    /// Second-derivative tensor at a point.
    ///
    /// # Errors
    /// See [`FunctionCore::hessian`].
    pub fn hessian(&self, point: &Point) -> FuncResult<SymTensor> {
        self.core.hessian(point)
    }

    /// Second-derivative tensor under a one-call parameter override.
    pub fn hessian_with_parameter(
        &self, point: &Point, parameter: &Point,
    ) -> FuncResult<SymTensor> {
        self.core.hessian_with_parameter(point, parameter)
    }

    /// Derivatives of the output with respect to the parameter vector.
    pub fn parameter_gradient(&self, point: &Point) -> FuncResult<Matrix> {
        self.core.parameter_gradient(point)
    }

    // ---- Dimensions & metadata ----

    pub fn input_dimension(&self) -> usize {
        self.core.input_dimension()
    }

    pub fn output_dimension(&self) -> usize {
        self.core.output_dimension()
    }

    pub fn parameter_dimension(&self) -> usize {
        self.core.parameter_dimension()
    }

    pub fn description(&self) -> String {
        self.core.description()
    }

    pub fn input_description(&self) -> &[String] {
        self.core.input_description()
    }

    pub fn output_description(&self) -> &[String] {
        self.core.output_description()
    }

    pub fn parameter(&self) -> Point {
        self.core.parameter()
    }

    pub fn parameter_description(&self) -> Vec<String> {
        self.core.parameter_description()
    }

    /// `true` while the gradient is the synthesized numeric fallback.
    pub fn use_default_gradient(&self) -> bool {
        self.core.use_default_gradient()
    }

    /// `true` while the Hessian is the synthesized numeric fallback.
    pub fn use_default_hessian(&self) -> bool {
        self.core.use_default_hessian()
    }

    // ---- Copy-on-write mutators ----

    /// Replace the input component names on a private copy of the core.
    ///
    /// # Errors
    /// See [`FunctionCore::set_input_description`].
    pub fn set_input_description(&mut self, names: Vec<String>) -> FuncResult<()> {
        self.core_mut().set_input_description(names)
    }

    /// Replace the output component names on a private copy of the core.
    ///
    /// # Errors
    /// See [`FunctionCore::set_output_description`].
    pub fn set_output_description(&mut self, names: Vec<String>) -> FuncResult<()> {
        self.core_mut().set_output_description(names)
    }

    /// Rebind the stored parameter vector on a private copy of the core.
    ///
    /// # Errors
    /// See [`FunctionCore::set_parameter`].
    pub fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        self.core_mut().set_parameter(parameter)
    }

    /// Replace the evaluation on a private copy of the core.
    ///
    /// # Errors
    /// See [`FunctionCore::set_evaluation`].
    pub fn set_evaluation(&mut self, evaluation: Box<dyn Evaluation>) -> FuncResult<()> {
        self.core_mut().set_evaluation(evaluation)
    }

    /// Replace the gradient on a private copy of the core.
    ///
    /// # Errors
    /// See [`FunctionCore::set_gradient`].
    pub fn set_gradient(&mut self, gradient: Box<dyn Gradient>) -> FuncResult<()> {
        self.core_mut().set_gradient(gradient)
    }

    /// Replace the Hessian on a private copy of the core.
    ///
    /// # Errors
    /// See [`FunctionCore::set_hessian`].
    pub fn set_hessian(&mut self, hessian: Box<dyn Hessian>) -> FuncResult<()> {
        self.core_mut().set_hessian(hessian)
    }

    // ---- Instrumentation surface (interior-mutable, shared) ----

    pub fn instrumentation(&self) -> &Instrumentation {
        self.core.instrumentation()
    }

    pub fn enable_cache(&self) {
        self.core.instrumentation().enable_cache();
    }

    pub fn disable_cache(&self) {
        self.core.instrumentation().disable_cache();
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.core.instrumentation().is_cache_enabled()
    }

    pub fn clear_cache(&self) {
        self.core.instrumentation().clear_cache();
    }

    pub fn enable_history(&self) {
        self.core.instrumentation().enable_history();
    }

    pub fn disable_history(&self) {
        self.core.instrumentation().disable_history();
    }

    pub fn is_history_enabled(&self) -> bool {
        self.core.instrumentation().is_history_enabled()
    }

    pub fn clear_history(&self) {
        self.core.instrumentation().clear_history();
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.core.history()
    }

    pub fn evaluation_calls(&self) -> u64 {
        self.core.evaluation_calls()
    }

    pub fn gradient_calls(&self) -> u64 {
        self.core.gradient_calls()
    }

    pub fn hessian_calls(&self) -> u64 {
        self.core.hessian_calls()
    }

    // ---- Combinator constructors ----

    /// Weighted sum `Σ cᵢ·fᵢ` with linearity of both derivatives.
    ///
    /// # Errors
    /// See [`LinearCombinationEvaluation::new`].
    pub fn linear_combination(functions: &[Function], coefficients: &[f64]) -> FuncResult<Self> {
        let evaluation =
            LinearCombinationEvaluation::new(functions.to_vec(), coefficients.to_vec())?;
        let gradient = LinearCombinationGradient::new(evaluation.clone());
        let hessian = LinearCombinationHessian::new(evaluation.clone());
        Ok(Self::from_core(FunctionCore::new(
            Box::new(evaluation),
            Box::new(gradient),
            Box::new(hessian),
        )?))
    }

    /// Sum of vector coefficients scaled by scalar functions,
    /// `Σ fᵢ(x)·cᵢ`.
    ///
    /// # Errors
    /// See [`DualLinearCombinationEvaluation::new`].
    pub fn dual_linear_combination(
        functions: &[Function], coefficients: &[Point],
    ) -> FuncResult<Self> {
        let evaluation =
            DualLinearCombinationEvaluation::new(functions.to_vec(), coefficients.to_vec())?;
        let gradient = DualLinearCombinationGradient::new(evaluation.clone());
        let hessian = DualLinearCombinationHessian::new(evaluation.clone());
        Ok(Self::from_core(FunctionCore::new(
            Box::new(evaluation),
            Box::new(gradient),
            Box::new(hessian),
        )?))
    }

    /// Stack operand outputs into one vector-valued function.
    ///
    /// # Errors
    /// See [`AggregatedEvaluation::new`].
    pub fn aggregate(functions: &[Function]) -> FuncResult<Self> {
        let evaluation = AggregatedEvaluation::new(functions.to_vec())?;
        let gradient = AggregatedGradient::new(evaluation.clone());
        let hessian = AggregatedHessian::new(evaluation.clone());
        Ok(Self::from_core(FunctionCore::new(
            Box::new(evaluation),
            Box::new(gradient),
            Box::new(hessian),
        )?))
    }

    /// Pointwise sum, a two-term linear combination with coefficients
    /// `[1, 1]`.
    ///
    /// # Errors
    /// Operand dimension mismatches, as in [`Self::linear_combination`].
    pub fn sum(&self, other: &Function) -> FuncResult<Self> {
        Self::linear_combination(&[self.clone(), other.clone()], &[1.0, 1.0])
    }

    /// Pointwise difference, a two-term linear combination with
    /// coefficients `[1, -1]`.
    ///
    /// # Errors
    /// Operand dimension mismatches, as in [`Self::linear_combination`].
    pub fn sub(&self, other: &Function) -> FuncResult<Self> {
        Self::linear_combination(&[self.clone(), other.clone()], &[1.0, -1.0])
    }

    /// Pointwise product of two scalar functions, with the product rule
    /// for both derivative orders.
    ///
    /// # Errors
    /// See [`ProductEvaluation::new`].
    pub fn product(&self, other: &Function) -> FuncResult<Self> {
        let evaluation = ProductEvaluation::new(self.clone(), other.clone())?;
        let gradient = ProductGradient::new(evaluation.clone());
        let hessian = ProductHessian::new(evaluation.clone());
        Ok(Self::from_core(FunctionCore::new(
            Box::new(evaluation),
            Box::new(gradient),
            Box::new(hessian),
        )?))
    }

    /// Composition `self ∘ inner`, i.e. `x ↦ self(inner(x))`, with the
    /// chain rule for both derivative orders.
    ///
    /// # Errors
    /// See [`ComposedEvaluation::new`].
    pub fn compose(&self, inner: &Function) -> FuncResult<Self> {
        let evaluation = ComposedEvaluation::new(self.clone(), inner.clone())?;
        let gradient = ComposedGradient::new(evaluation.clone());
        let hessian = ComposedHessian::new(evaluation.clone());
        Ok(Self::from_core(FunctionCore::new(
            Box::new(evaluation),
            Box::new(gradient),
            Box::new(hessian),
        )?))
    }

    /// Freeze input coordinates into a parameter vector. `parameters_set`
    /// selects whether `indices` names the frozen set (`true`) or the
    /// free set (`false`); `reference_point` supplies the initial frozen
    /// values.
    ///
    /// # Errors
    /// See [`ParametricEvaluation::new`].
    pub fn parametric(
        &self, indices: &[usize], reference_point: &Point, parameters_set: bool,
    ) -> FuncResult<Self> {
        let evaluation =
            ParametricEvaluation::new(self.clone(), indices, reference_point, parameters_set)?;
        let gradient = ParametricGradient::new(evaluation.clone());
        let hessian = ParametricHessian::new(evaluation.clone());
        Ok(Self::from_core(FunctionCore::new(
            Box::new(evaluation),
            Box::new(gradient),
            Box::new(hessian),
        )?))
    }

    /// Level-set indicator `1{self(x) ⋈ threshold}` for a scalar
    /// function. The result is discontinuous, so both derivatives refuse
    /// with a not-implemented error instead of falling back numerically.
    ///
    /// # Errors
    /// See [`IndicatorEvaluation::new`].
    pub fn indicator(&self, operator: ComparisonOperator, threshold: f64) -> FuncResult<Self> {
        let evaluation =
            IndicatorEvaluation::new(self.core.evaluation().clone_box(), operator, threshold)?;
        let input_dimension = evaluation.input_dimension();
        let gradient = NoGradient::new(input_dimension, 1);
        let hessian = NoHessian::new(input_dimension, 1);
        Ok(Self::from_core(FunctionCore::new(
            Box::new(evaluation),
            Box::new(gradient),
            Box::new(hessian),
        )?))
    }

    /// Nearest-neighbour lookup over precomputed input/output pairs, with
    /// finite-difference derivative fallbacks.
    ///
    /// # Errors
    /// See [`DatabaseEvaluation::new`].
    pub fn from_database(inputs: Sample, outputs: Sample) -> FuncResult<Self> {
        let evaluation = DatabaseEvaluation::new(inputs, outputs)?;
        Ok(Self::from_core(FunctionCore::from_evaluation(Box::new(evaluation))))
    }

    /// Restrict to the requested output components, preserving derivative
    /// consistency and the fallback flags.
    ///
    /// # Errors
    /// See [`FunctionCore::marginal`].
    pub fn marginal(&self, indices: &[usize]) -> FuncResult<Self> {
        Ok(Self::from_core(self.core.marginal(indices)?))
    }
}

// ---- Operator sugar --------------------------------------------------------

impl std::ops::Add for &Function {
    type Output = FuncResult<Function>;

    fn add(self, other: &Function) -> Self::Output {
        self.sum(other)
    }
}

impl std::ops::Sub for &Function {
    type Output = FuncResult<Function>;

    fn sub(self, other: &Function) -> Self::Output {
        Function::sub(self, other)
    }
}

impl std::ops::Mul for &Function {
    type Output = FuncResult<Function>;

    fn mul(self, other: &Function) -> Self::Output {
        self.product(other)
    }
}
