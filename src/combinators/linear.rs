//! combinators::linear — scalar-coefficient linear combination.
//!
//! Purpose
//! -------
//! Implement `x ↦ Σ cᵢ·fᵢ(x)` over functions sharing both dimensions,
//! together with its derivative pair. Differentiation is linear, so the
//! gradient and Hessian are the same combination of the inner gradients
//! and Hessians with the same coefficients.
//!
//! The `+` and `-` operators on function handles are two-term instances
//! of this combinator with coefficients `[1, 1]` and `[1, -1]`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The function collection is non-empty, carries one coefficient per
//!   function, and all operands share input and output dimensions;
//!   all of this is validated at construction, never at call time.
//! - The gradient and Hessian hold a deep copy of the evaluation, sharing
//!   functions and coefficients with it structurally but never mutably.
use crate::function::{
    errors::FuncResult,
    handle::Function,
    traits::{Evaluation, Gradient, Hessian},
    types::{Matrix, Point, SymTensor},
    validation::{check_coefficient_count, check_same_dimensions},
};

/// Evaluation side of `Σ cᵢ·fᵢ(x)`.
#[derive(Clone)]
pub struct LinearCombinationEvaluation {
    functions: Vec<Function>,
    coefficients: Vec<f64>,
}

impl LinearCombinationEvaluation {
    /// Validate and build the combination.
    ///
    /// # Errors
    /// - [`crate::function::FuncError::EmptyCollection`] for no operands.
    /// - [`crate::function::FuncError::CoefficientCountMismatch`] when
    ///   counts disagree.
    /// - [`crate::function::FuncError::DimensionMismatch`] when operands
    ///   disagree on input or output dimension.
    pub fn new(functions: Vec<Function>, coefficients: Vec<f64>) -> FuncResult<Self> {
        check_coefficient_count(functions.len(), coefficients.len())?;
        let operands: Vec<&dyn Evaluation> =
            functions.iter().map(|f| f.core().evaluation()).collect();
        check_same_dimensions("linear combination", &operands, true)?;
        Ok(Self { functions, coefficients })
    }

    /// Inner functions, in combination order.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Scalar coefficients, one per function.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl Evaluation for LinearCombinationEvaluation {
    fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        let mut output = Point::zeros(self.output_dimension());
        for (function, &coefficient) in self.functions.iter().zip(&self.coefficients) {
            output = output + coefficient * function.evaluate(point)?;
        }
        Ok(output)
    }

    fn input_dimension(&self) -> usize {
        self.functions[0].input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.functions[0].output_dimension()
    }

    fn description(&self) -> String {
        format!("linear combination of {} functions", self.functions.len())
    }

    fn clone_box(&self) -> Box<dyn Evaluation> {
        Box::new(self.clone())
    }
}

/// Gradient side: `Σ cᵢ·∇fᵢ(x)` by linearity of differentiation.
#[derive(Clone)]
pub struct LinearCombinationGradient {
    evaluation: LinearCombinationEvaluation,
}

impl LinearCombinationGradient {
    pub fn new(evaluation: LinearCombinationEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Gradient for LinearCombinationGradient {
    fn gradient(&self, point: &Point) -> FuncResult<Matrix> {
        let mut output =
            Matrix::zeros((self.input_dimension(), self.output_dimension()));
        for (function, &coefficient) in
            self.evaluation.functions.iter().zip(&self.evaluation.coefficients)
        {
            output = output + coefficient * function.gradient(point)?;
        }
        Ok(output)
    }

    fn input_dimension(&self) -> usize {
        self.evaluation.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.evaluation.output_dimension()
    }

    fn description(&self) -> String {
        format!("gradient of {}", self.evaluation.description())
    }

    fn clone_box(&self) -> Box<dyn Gradient> {
        Box::new(self.clone())
    }
}

/// Hessian side: `Σ cᵢ·∇²fᵢ(x)` by linearity of differentiation.
#[derive(Clone)]
pub struct LinearCombinationHessian {
    evaluation: LinearCombinationEvaluation,
}

impl LinearCombinationHessian {
    pub fn new(evaluation: LinearCombinationEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Hessian for LinearCombinationHessian {
    fn hessian(&self, point: &Point) -> FuncResult<SymTensor> {
        let n = self.input_dimension();
        let k = self.output_dimension();
        let mut output = SymTensor::zeros((n, n, k));
        for (function, &coefficient) in
            self.evaluation.functions.iter().zip(&self.evaluation.coefficients)
        {
            output = output + coefficient * function.hessian(point)?;
        }
        Ok(output)
    }

    fn input_dimension(&self) -> usize {
        self.evaluation.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.evaluation.output_dimension()
    }

    fn description(&self) -> String {
        format!("hessian of {}", self.evaluation.description())
    }

    fn clone_box(&self) -> Box<dyn Hessian> {
        Box::new(self.clone())
    }
}
