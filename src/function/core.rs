//! function::core — the owning aggregate behind every function handle.
//!
//! Purpose
//! -------
//! [`FunctionCore`] owns exactly one [`Evaluation`], one [`Gradient`] and
//! one [`Hessian`], keeps them dimensionally consistent, and routes every
//! call through the instrumentation layer. It is the unit of copy-on-write
//! sharing: handles clone it lazily, and all structural mutation happens
//! here on an exclusively owned value.
//!
//! Key behaviors
//! -------------
//! - [`FunctionCore::from_evaluation`] synthesizes centered
//!   finite-difference fallbacks for both derivatives and records that
//!   choice in the `use_default_gradient` / `use_default_hessian` flags.
//! - [`FunctionCore::new`] accepts explicit derivative implementations and
//!   rejects any whose dimensions disagree with the evaluation.
//! - The call surface (`evaluate`, `evaluate_sample`, `gradient`,
//!   `hessian`) checks the point dimension, consults the cache (values
//!   only), increments the matching counter on dispatch, and appends to
//!   the history on evaluation calls.
//! - `*_with_parameter` twins rebind the parameter vector on a deep copy
//!   for that single call; stored state is untouched and the cache is
//!   bypassed in both directions.
//! - Structural mutators (`set_evaluation`, `set_gradient`, `set_hessian`,
//!   `set_parameter`, description setters) invalidate the cache wholesale.
//!
//! Invariants & assumptions
//! ------------------------
//! - Gradient and Hessian dimensions always match the evaluation's; the
//!   finite-difference fallbacks self-adapt by construction.
//! - Input/output/parameter descriptions are length-consistent with the
//!   dimensions they label at all times.
//! - `&self` calls are safe from many threads at once; `&mut self`
//!   mutators are reached only through an exclusively owned handle.
use crate::combinators::marginal::{MarginalEvaluation, MarginalGradient, MarginalHessian};
use crate::function::{
    errors::{FuncError, FuncResult},
    finite_diff::{FiniteDifferenceGradient, FiniteDifferenceHessian},
    instrument::{HistoryEntry, Instrumentation},
    traits::{Evaluation, Gradient, Hessian},
    types::{Matrix, Point, Sample, SymTensor},
    validation::{check_description_length, check_indices, check_point_dimension},
};

/// Owning aggregate of one evaluation and its two derivative capabilities.
#[derive(Clone)]
pub struct FunctionCore {
    evaluation: Box<dyn Evaluation>,
    gradient: Box<dyn Gradient>,
    hessian: Box<dyn Hessian>,
    use_default_gradient: bool,
    use_default_hessian: bool,
    input_description: Vec<String>,
    output_description: Vec<String>,
    instrumentation: Instrumentation,
}

impl std::fmt::Debug for FunctionCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionCore")
            .field("description", &self.evaluation.description())
            .field("input_dimension", &self.input_dimension())
            .field("output_dimension", &self.output_dimension())
            .field("use_default_gradient", &self.use_default_gradient)
            .field("use_default_hessian", &self.use_default_hessian)
            .finish()
    }
}

impl FunctionCore {
    /// Build a core from an evaluation alone; both derivatives become
    /// centered finite-difference fallbacks over a deep copy of it.
    pub fn from_evaluation(evaluation: Box<dyn Evaluation>) -> Self {
        log::debug!(
            "no analytic derivatives supplied for '{}': synthesizing finite-difference fallbacks",
            evaluation.description()
        );
        let gradient = Box::new(FiniteDifferenceGradient::new(evaluation.as_ref()));
        let hessian = Box::new(FiniteDifferenceHessian::new(evaluation.as_ref()));
        let input_description = crate::function::validation::default_description(
            "x",
            evaluation.input_dimension(),
        );
        let output_description = crate::function::validation::default_description(
            "y",
            evaluation.output_dimension(),
        );
        Self {
            evaluation,
            gradient,
            hessian,
            use_default_gradient: true,
            use_default_hessian: true,
            input_description,
            output_description,
            instrumentation: Instrumentation::default(),
        }
    }

    /// Build a core from a full triple.
    ///
    /// # Errors
    /// [`FuncError::DimensionMismatch`] if the gradient or Hessian
    /// dimensions disagree with the evaluation's.
    pub fn new(
        evaluation: Box<dyn Evaluation>, gradient: Box<dyn Gradient>, hessian: Box<dyn Hessian>,
    ) -> FuncResult<Self> {
        check_member_dimensions(
            "gradient",
            evaluation.as_ref(),
            gradient.input_dimension(),
            gradient.output_dimension(),
        )?;
        check_member_dimensions(
            "hessian",
            evaluation.as_ref(),
            hessian.input_dimension(),
            hessian.output_dimension(),
        )?;
        let use_default_gradient = gradient.is_fallback();
        let use_default_hessian = hessian.is_fallback();
        let input_description = crate::function::validation::default_description(
            "x",
            evaluation.input_dimension(),
        );
        let output_description = crate::function::validation::default_description(
            "y",
            evaluation.output_dimension(),
        );
        Ok(Self {
            evaluation,
            gradient,
            hessian,
            use_default_gradient,
            use_default_hessian,
            input_description,
            output_description,
            instrumentation: Instrumentation::default(),
        })
    }

    // ---- Dimensions & metadata ----

    pub fn input_dimension(&self) -> usize {
        self.evaluation.input_dimension()
    }

    pub fn output_dimension(&self) -> usize {
        self.evaluation.output_dimension()
    }

    pub fn parameter_dimension(&self) -> usize {
        self.evaluation.parameter_dimension()
    }

    /// Human-readable description, taken from the evaluation.
    pub fn description(&self) -> String {
        self.evaluation.description()
    }

    pub fn input_description(&self) -> &[String] {
        &self.input_description
    }

    pub fn output_description(&self) -> &[String] {
        &self.output_description
    }

    /// Replace the input component names.
    ///
    /// # Errors
    /// [`FuncError::DescriptionLengthMismatch`] unless one name per input
    /// component is given.
    pub fn set_input_description(&mut self, names: Vec<String>) -> FuncResult<()> {
        check_description_length("input description", self.input_dimension(), names.len())?;
        self.input_description = names;
        Ok(())
    }

    /// Replace the output component names.
    ///
    /// # Errors
    /// [`FuncError::DescriptionLengthMismatch`] unless one name per output
    /// component is given.
    pub fn set_output_description(&mut self, names: Vec<String>) -> FuncResult<()> {
        check_description_length("output description", self.output_dimension(), names.len())?;
        self.output_description = names;
        Ok(())
    }

    pub fn parameter(&self) -> Point {
        self.evaluation.parameter()
    }

    pub fn parameter_description(&self) -> Vec<String> {
        self.evaluation.parameter_description()
    }

    /// Rebind the stored parameter vector across the whole triple and
    /// invalidate the cache.
    ///
    /// # Errors
    /// [`FuncError::ParameterDimMismatch`] if the length is wrong for any
    /// member.
    pub fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        self.evaluation.set_parameter(parameter)?;
        self.gradient.set_parameter(parameter)?;
        self.hessian.set_parameter(parameter)?;
        self.instrumentation.clear_cache();
        Ok(())
    }

    // ---- Triple members ----

    pub fn evaluation(&self) -> &dyn Evaluation {
        self.evaluation.as_ref()
    }

    pub fn gradient_impl(&self) -> &dyn Gradient {
        self.gradient.as_ref()
    }

    pub fn hessian_impl(&self) -> &dyn Hessian {
        self.hessian.as_ref()
    }

    /// Replace the evaluation. Fallback derivatives are rebuilt around the
    /// new evaluation; analytic ones must be replaced by the caller if
    /// they no longer apply dimensionally.
    ///
    /// # Errors
    /// [`FuncError::DimensionMismatch`] if a kept analytic derivative no
    /// longer matches the new evaluation's dimensions.
    pub fn set_evaluation(&mut self, evaluation: Box<dyn Evaluation>) -> FuncResult<()> {
        if self.use_default_gradient {
            self.gradient = Box::new(FiniteDifferenceGradient::new(evaluation.as_ref()));
        } else {
            check_member_dimensions(
                "gradient",
                evaluation.as_ref(),
                self.gradient.input_dimension(),
                self.gradient.output_dimension(),
            )?;
        }
        if self.use_default_hessian {
            self.hessian = Box::new(FiniteDifferenceHessian::new(evaluation.as_ref()));
        } else {
            check_member_dimensions(
                "hessian",
                evaluation.as_ref(),
                self.hessian.input_dimension(),
                self.hessian.output_dimension(),
            )?;
        }
        if evaluation.input_dimension() != self.input_dimension() {
            self.input_description = crate::function::validation::default_description(
                "x",
                evaluation.input_dimension(),
            );
        }
        if evaluation.output_dimension() != self.output_dimension() {
            self.output_description = crate::function::validation::default_description(
                "y",
                evaluation.output_dimension(),
            );
        }
        self.evaluation = evaluation;
        self.instrumentation.clear_cache();
        Ok(())
    }

    /// Replace the gradient; the default-derivative flag follows the new
    /// member's fallback flag.
    ///
    /// # Errors
    /// [`FuncError::DimensionMismatch`] on dimension disagreement.
    pub fn set_gradient(&mut self, gradient: Box<dyn Gradient>) -> FuncResult<()> {
        check_member_dimensions(
            "gradient",
            self.evaluation.as_ref(),
            gradient.input_dimension(),
            gradient.output_dimension(),
        )?;
        self.use_default_gradient = gradient.is_fallback();
        self.gradient = gradient;
        self.instrumentation.clear_cache();
        Ok(())
    }

    /// Replace the Hessian; the default-derivative flag follows the new
    /// member's fallback flag.
    ///
    /// # Errors
    /// [`FuncError::DimensionMismatch`] on dimension disagreement.
    pub fn set_hessian(&mut self, hessian: Box<dyn Hessian>) -> FuncResult<()> {
        check_member_dimensions(
            "hessian",
            self.evaluation.as_ref(),
            hessian.input_dimension(),
            hessian.output_dimension(),
        )?;
        self.use_default_hessian = hessian.is_fallback();
        self.hessian = hessian;
        self.instrumentation.clear_cache();
        Ok(())
    }

    /// `true` while the gradient is the synthesized numeric fallback.
    pub fn use_default_gradient(&self) -> bool {
        self.use_default_gradient
    }

    /// `true` while the Hessian is the synthesized numeric fallback.
    pub fn use_default_hessian(&self) -> bool {
        self.use_default_hessian
    }

    // ---- Call surface ----

    /// Evaluate at one point, through cache, counters and history.
    ///
    /// # Errors
    /// [`FuncError::InputDimMismatch`] on a wrong-sized point, plus
    /// whatever the underlying evaluation raises.
    pub fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        check_point_dimension(self.input_dimension(), point)?;
        if let Some(cached) = self.instrumentation.cache_lookup(point) {
            return Ok(cached);
        }
        let output = self.evaluation.evaluate(point)?;
        self.instrumentation.record_evaluation_calls(1);
        let parameter = self.active_parameter();
        self.instrumentation.record_history(point, parameter.as_ref());
        self.instrumentation.cache_insert(point, output.clone());
        Ok(output)
    }

    /// Evaluate a batch; cached points are answered from the cache, the
    /// misses go through the evaluation's batched form in one dispatch.
    ///
    /// # Errors
    /// Point-dimension and evaluation errors, as in [`Self::evaluate`].
    pub fn evaluate_sample(&self, sample: &[Point]) -> FuncResult<Sample> {
        let dim = self.input_dimension();
        for point in sample {
            check_point_dimension(dim, point)?;
        }
        let mut slots: Vec<Option<Point>> =
            sample.iter().map(|point| self.instrumentation.cache_lookup(point)).collect();
        let miss_indices: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| i)
            .collect();
        if !miss_indices.is_empty() {
            let misses: Sample = miss_indices.iter().map(|&i| sample[i].clone()).collect();
            let outputs = self.evaluation.evaluate_sample(&misses)?;
            self.instrumentation.record_evaluation_calls(miss_indices.len() as u64);
            let parameter = self.active_parameter();
            for (&i, output) in miss_indices.iter().zip(outputs) {
                self.instrumentation.record_history(&sample[i], parameter.as_ref());
                self.instrumentation.cache_insert(&sample[i], output.clone());
                slots[i] = Some(output);
            }
        }
        // Every slot is filled: either a cache hit or a dispatched miss.
        Ok(slots.into_iter().flatten().collect())
    }

    /// Evaluate under a one-call parameter override; stored state and the
    /// cache are untouched.
    ///
    /// # Errors
    /// [`FuncError::ParameterDimMismatch`] for a wrong-sized override,
    /// plus the usual evaluation errors.
    pub fn evaluate_with_parameter(&self, point: &Point, parameter: &Point) -> FuncResult<Point> {
        check_point_dimension(self.input_dimension(), point)?;
        let mut bound = self.evaluation.clone_box();
        bound.set_parameter(parameter)?;
        let output = bound.evaluate(point)?;
        self.instrumentation.record_evaluation_calls(1);
        self.instrumentation.record_history(point, Some(parameter));
        Ok(output)
    }

    /// Transposed Jacobian at a point.
    ///
    /// # Errors
    /// [`FuncError::InputDimMismatch`], [`FuncError::NotImplemented`] for
    /// absent derivatives, or the underlying gradient's errors.
    pub fn gradient(&self, point: &Point) -> FuncResult<Matrix> {
        check_point_dimension(self.input_dimension(), point)?;
        let output = self.gradient.gradient(point)?;
        self.instrumentation.record_gradient_call();
        Ok(output)
    }

    /// Transposed Jacobian under a one-call parameter override.
    pub fn gradient_with_parameter(&self, point: &Point, parameter: &Point) -> FuncResult<Matrix> {
        check_point_dimension(self.input_dimension(), point)?;
        let mut bound = self.gradient.clone_box();
        bound.set_parameter(parameter)?;
        let output = bound.gradient(point)?;
        self.instrumentation.record_gradient_call();
        Ok(output)
    }

    /// Second-derivative tensor at a point.
    ///
    /// # Errors
    /// [`FuncError::InputDimMismatch`], [`FuncError::NotImplemented`] for
    /// absent derivatives, or the underlying Hessian's errors.
    pub fn hessian(&self, point: &Point) -> FuncResult<SymTensor> {
        check_point_dimension(self.input_dimension(), point)?;
        let output = self.hessian.hessian(point)?;
        self.instrumentation.record_hessian_call();
        Ok(output)
    }

    /// Second-derivative tensor under a one-call parameter override.
    pub fn hessian_with_parameter(
        &self, point: &Point, parameter: &Point,
    ) -> FuncResult<SymTensor> {
        check_point_dimension(self.input_dimension(), point)?;
        let mut bound = self.hessian.clone_box();
        bound.set_parameter(parameter)?;
        let output = bound.hessian(point)?;
        self.instrumentation.record_hessian_call();
        Ok(output)
    }

    /// Derivatives of the output with respect to the parameter vector.
    pub fn parameter_gradient(&self, point: &Point) -> FuncResult<Matrix> {
        check_point_dimension(self.input_dimension(), point)?;
        self.evaluation.parameter_gradient(point)
    }

    /// Restrict the core to the requested output components, preserving
    /// evaluation/gradient/Hessian consistency and the fallback flags.
    ///
    /// # Errors
    /// [`FuncError::IndexOutOfRange`] / [`FuncError::DuplicateIndex`] /
    /// [`FuncError::EmptyCollection`] for a bad index set.
    pub fn marginal(&self, indices: &[usize]) -> FuncResult<FunctionCore> {
        check_indices("marginal", indices, self.output_dimension())?;
        let evaluation = MarginalEvaluation::new(self.evaluation.clone_box(), indices.to_vec());
        let gradient = MarginalGradient::new(self.gradient.clone_box(), indices.to_vec());
        let hessian = MarginalHessian::new(self.hessian.clone_box(), indices.to_vec());
        let mut core = FunctionCore::new(Box::new(evaluation), Box::new(gradient), Box::new(hessian))?;
        core.use_default_gradient = self.use_default_gradient;
        core.use_default_hessian = self.use_default_hessian;
        core.input_description = self.input_description.clone();
        core.output_description =
            indices.iter().map(|&i| self.output_description[i].clone()).collect();
        Ok(core)
    }

    // ---- Instrumentation surface ----

    pub fn instrumentation(&self) -> &Instrumentation {
        &self.instrumentation
    }

    pub fn evaluation_calls(&self) -> u64 {
        self.instrumentation.evaluation_calls()
    }

    pub fn gradient_calls(&self) -> u64 {
        self.instrumentation.gradient_calls()
    }

    pub fn hessian_calls(&self) -> u64 {
        self.instrumentation.hessian_calls()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.instrumentation.history()
    }

    fn active_parameter(&self) -> Option<Point> {
        let parameter = self.evaluation.parameter();
        if parameter.is_empty() {
            None
        } else {
            Some(parameter)
        }
    }
}

/// Shared dimension check for derivative members against the evaluation.
fn check_member_dimensions(
    context: &'static str, evaluation: &dyn Evaluation, input: usize, output: usize,
) -> FuncResult<()> {
    if input != evaluation.input_dimension() {
        return Err(FuncError::DimensionMismatch {
            context,
            expected: evaluation.input_dimension(),
            found: input,
        });
    }
    if output != evaluation.output_dimension() {
        return Err(FuncError::DimensionMismatch {
            context,
            expected: evaluation.output_dimension(),
            found: output,
        });
    }
    Ok(())
}
