//! function::finite_diff — finite-difference gradient and Hessian fallbacks.
//!
//! Purpose
//! -------
//! Synthesize [`Gradient`] and [`Hessian`] capabilities for any
//! [`Evaluation`] that ships without analytic derivatives, using a
//! configurable finite-difference scheme and step size, so the rest of the
//! engine can always offer a derivative surface.
//!
//! Key behaviors
//! -------------
//! - [`FiniteDifferenceGradient`] differentiates a vector-valued evaluation
//!   column by column: centered differences by default, forward on request.
//! - [`FiniteDifferenceHessian`] builds the full second-derivative tensor
//!   and enforces symmetry of the first two axes by construction.
//! - Both validate the step at construction and the computed entries for
//!   finiteness after the fact, mirroring the validate-then-return pattern
//!   used everywhere in this crate.
//! - Both report `is_fallback() == true`, keeping the numeric substitution
//!   visible to callers and tests.
//!
//! Invariants & assumptions
//! ------------------------
//! - The wrapped evaluation is deep-copied in (`clone_box`), so a fallback
//!   derivative never shares mutable state with the function it was
//!   derived from.
//! - Steps are absolute, finite and strictly positive; the centered scheme
//!   is second-order accurate, the forward scheme first-order.
//!
//! Conventions
//! -----------
//! - Gradients follow the crate-wide transposed-Jacobian convention
//!   (`inputDim × outputDim`); Hessians are
//!   `inputDim × inputDim × outputDim`.
//! - Composing a fallback-differentiated function inside an analytic outer
//!   combinator is allowed and degrades accuracy gracefully; the fallback
//!   flag is how downstream consumers detect it.
use crate::function::{
    errors::{FuncError, FuncResult},
    traits::{Evaluation, Gradient, Hessian},
    types::{Matrix, Point, SymTensor, DEFAULT_GRADIENT_STEP, DEFAULT_HESSIAN_STEP},
    validation::{check_point_dimension, check_step},
};

/// Finite-difference stencil used by the fallback differentiators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiniteDifferenceScheme {
    /// Two-sided stencil, second-order accurate. The default.
    Centered,
    /// One-sided stencil, first-order accurate but cheaper (one base
    /// evaluation shared across directions).
    Forward,
}

/// Numeric-fallback gradient for an arbitrary evaluation.
#[derive(Clone)]
pub struct FiniteDifferenceGradient {
    evaluation: Box<dyn Evaluation>,
    step: f64,
    scheme: FiniteDifferenceScheme,
}

impl FiniteDifferenceGradient {
    /// Centered-difference gradient with the default step.
    pub fn new(evaluation: &dyn Evaluation) -> Self {
        Self {
            evaluation: evaluation.clone_box(),
            step: DEFAULT_GRADIENT_STEP,
            scheme: FiniteDifferenceScheme::Centered,
        }
    }

    /// Gradient with an explicit scheme and step.
    ///
    /// # Errors
    /// [`FuncError::InvalidStep`] if `step` is non-finite or ≤ 0.
    pub fn with_step(
        evaluation: &dyn Evaluation, scheme: FiniteDifferenceScheme, step: f64,
    ) -> FuncResult<Self> {
        check_step(step)?;
        Ok(Self { evaluation: evaluation.clone_box(), step, scheme })
    }

    /// Step size used by the stencil.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Stencil in use.
    pub fn scheme(&self) -> FiniteDifferenceScheme {
        self.scheme
    }
}

impl Gradient for FiniteDifferenceGradient {
    fn gradient(&self, point: &Point) -> FuncResult<Matrix> {
        let n = self.input_dimension();
        let k = self.output_dimension();
        check_point_dimension(n, point)?;
        let h = self.step;
        let mut result = Matrix::zeros((n, k));
        match self.scheme {
            FiniteDifferenceScheme::Centered => {
                for j in 0..n {
                    let mut up = point.clone();
                    up[j] += h;
                    let mut down = point.clone();
                    down[j] -= h;
                    let column =
                        (self.evaluation.evaluate(&up)? - self.evaluation.evaluate(&down)?)
                            / (2.0 * h);
                    result.row_mut(j).assign(&column);
                }
            }
            FiniteDifferenceScheme::Forward => {
                let base = self.evaluation.evaluate(point)?;
                for j in 0..n {
                    let mut up = point.clone();
                    up[j] += h;
                    let column = (self.evaluation.evaluate(&up)? - &base) / h;
                    result.row_mut(j).assign(&column);
                }
            }
        }
        validate_entries("finite-difference gradient", result.iter())?;
        Ok(result)
    }

    fn input_dimension(&self) -> usize {
        self.evaluation.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.evaluation.output_dimension()
    }

    fn is_fallback(&self) -> bool {
        true
    }

    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        self.evaluation.set_parameter(parameter)
    }

    fn description(&self) -> String {
        format!(
            "{:?} finite-difference gradient (step {}) of {}",
            self.scheme,
            self.step,
            self.evaluation.description()
        )
    }

    fn clone_box(&self) -> Box<dyn Gradient> {
        Box::new(self.clone())
    }
}

/// Numeric-fallback Hessian for an arbitrary evaluation.
#[derive(Clone)]
pub struct FiniteDifferenceHessian {
    evaluation: Box<dyn Evaluation>,
    step: f64,
    scheme: FiniteDifferenceScheme,
}

impl FiniteDifferenceHessian {
    /// Centered-difference Hessian with the default step.
    pub fn new(evaluation: &dyn Evaluation) -> Self {
        Self {
            evaluation: evaluation.clone_box(),
            step: DEFAULT_HESSIAN_STEP,
            scheme: FiniteDifferenceScheme::Centered,
        }
    }

    /// Hessian with an explicit scheme and step.
    ///
    /// # Errors
    /// [`FuncError::InvalidStep`] if `step` is non-finite or ≤ 0.
    pub fn with_step(
        evaluation: &dyn Evaluation, scheme: FiniteDifferenceScheme, step: f64,
    ) -> FuncResult<Self> {
        check_step(step)?;
        Ok(Self { evaluation: evaluation.clone_box(), step, scheme })
    }

    /// Step size used by the stencil.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Stencil in use.
    pub fn scheme(&self) -> FiniteDifferenceScheme {
        self.scheme
    }

    fn centered(&self, point: &Point) -> FuncResult<SymTensor> {
        let n = self.input_dimension();
        let k = self.output_dimension();
        let h = self.step;
        let base = self.evaluation.evaluate(point)?;
        let mut result = SymTensor::zeros((n, n, k));
        for i in 0..n {
            // Diagonal: (f(x+h) - 2f(x) + f(x-h)) / h².
            let mut up = point.clone();
            up[i] += h;
            let mut down = point.clone();
            down[i] -= h;
            let diag = (self.evaluation.evaluate(&up)? - 2.0 * &base
                + self.evaluation.evaluate(&down)?)
                / (h * h);
            for out in 0..k {
                result[[i, i, out]] = diag[out];
            }
            // Off-diagonal: four-point cross stencil, assigned symmetrically.
            for j in 0..i {
                let mut pp = point.clone();
                pp[i] += h;
                pp[j] += h;
                let mut pm = point.clone();
                pm[i] += h;
                pm[j] -= h;
                let mut mp = point.clone();
                mp[i] -= h;
                mp[j] += h;
                let mut mm = point.clone();
                mm[i] -= h;
                mm[j] -= h;
                let cross = (self.evaluation.evaluate(&pp)? - self.evaluation.evaluate(&pm)?
                    - self.evaluation.evaluate(&mp)?
                    + self.evaluation.evaluate(&mm)?)
                    / (4.0 * h * h);
                for out in 0..k {
                    result[[i, j, out]] = cross[out];
                    result[[j, i, out]] = cross[out];
                }
            }
        }
        Ok(result)
    }

    fn forward(&self, point: &Point) -> FuncResult<SymTensor> {
        let n = self.input_dimension();
        let k = self.output_dimension();
        let h = self.step;
        let base = self.evaluation.evaluate(point)?;
        // One shifted evaluation per direction, shared across the stencil.
        let mut shifted = Vec::with_capacity(n);
        for i in 0..n {
            let mut up = point.clone();
            up[i] += h;
            shifted.push(self.evaluation.evaluate(&up)?);
        }
        let mut result = SymTensor::zeros((n, n, k));
        for i in 0..n {
            for j in 0..=i {
                let mut both = point.clone();
                both[i] += h;
                both[j] += h;
                let cross = (self.evaluation.evaluate(&both)? - &shifted[i] - &shifted[j]
                    + &base)
                    / (h * h);
                for out in 0..k {
                    result[[i, j, out]] = cross[out];
                    result[[j, i, out]] = cross[out];
                }
            }
        }
        Ok(result)
    }
}

impl Hessian for FiniteDifferenceHessian {
    fn hessian(&self, point: &Point) -> FuncResult<SymTensor> {
        check_point_dimension(self.input_dimension(), point)?;
        let result = match self.scheme {
            FiniteDifferenceScheme::Centered => self.centered(point)?,
            FiniteDifferenceScheme::Forward => self.forward(point)?,
        };
        validate_entries("finite-difference hessian", result.iter())?;
        Ok(result)
    }

    fn input_dimension(&self) -> usize {
        self.evaluation.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.evaluation.output_dimension()
    }

    fn is_fallback(&self) -> bool {
        true
    }

    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        self.evaluation.set_parameter(parameter)
    }

    fn description(&self) -> String {
        format!(
            "{:?} finite-difference hessian (step {}) of {}",
            self.scheme,
            self.step,
            self.evaluation.description()
        )
    }

    fn clone_box(&self) -> Box<dyn Hessian> {
        Box::new(self.clone())
    }
}

/// Reject non-finite entries produced by a stencil.
fn validate_entries<'a>(
    context: &'static str, entries: impl Iterator<Item = &'a f64>,
) -> FuncResult<()> {
    for (index, &value) in entries.enumerate() {
        if !value.is_finite() {
            return Err(FuncError::NonFiniteValue { context, index, value });
        }
    }
    Ok(())
}
