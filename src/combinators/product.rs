//! combinators::product — pointwise product of two scalar functions.
//!
//! Purpose
//! -------
//! Implement `x ↦ f(x)·g(x)` for two scalar-valued operands over one input
//! space, with the product rule for the gradient and the four-term
//! second-order product rule for the Hessian:
//!
//! ```text
//! ∇(fg)  = f·∇g + g·∇f
//! ∇²(fg) = f·∇²g + g·∇²f + ∇f⊗∇g + ∇g⊗∇f
//! ```
//!
//! Invariants & assumptions
//! ------------------------
//! - Both operands share the input dimension and have output dimension 1;
//!   validated at construction. The result is scalar-valued.
use crate::function::{
    errors::FuncResult,
    handle::Function,
    traits::{Evaluation, Gradient, Hessian},
    types::{Matrix, Point, SymTensor},
    validation::{check_same_dimensions, check_scalar_output},
};

/// Evaluation side of `f(x)·g(x)`.
#[derive(Clone)]
pub struct ProductEvaluation {
    left: Function,
    right: Function,
}

impl ProductEvaluation {
    /// Validate and build the product.
    ///
    /// # Errors
    /// - [`crate::function::FuncError::DimensionMismatch`] if the operands
    ///   disagree on input dimension.
    /// - [`crate::function::FuncError::ScalarOutputRequired`] for a
    ///   non-scalar operand.
    pub fn new(left: Function, right: Function) -> FuncResult<Self> {
        let operands: [&dyn Evaluation; 2] =
            [left.core().evaluation(), right.core().evaluation()];
        check_same_dimensions("product", &operands, false)?;
        check_scalar_output("product", operands[0])?;
        check_scalar_output("product", operands[1])?;
        Ok(Self { left, right })
    }

    pub fn left(&self) -> &Function {
        &self.left
    }

    pub fn right(&self) -> &Function {
        &self.right
    }
}

impl Evaluation for ProductEvaluation {
    fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        let left = self.left.evaluate(point)?[0];
        let right = self.right.evaluate(point)?[0];
        Ok(Point::from_elem(1, left * right))
    }

    fn input_dimension(&self) -> usize {
        self.left.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        1
    }

    fn description(&self) -> String {
        format!("({}) * ({})", self.left.description(), self.right.description())
    }

    fn clone_box(&self) -> Box<dyn Evaluation> {
        Box::new(self.clone())
    }
}

/// Gradient side: the product rule.
#[derive(Clone)]
pub struct ProductGradient {
    evaluation: ProductEvaluation,
}

impl ProductGradient {
    pub fn new(evaluation: ProductEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Gradient for ProductGradient {
    fn gradient(&self, point: &Point) -> FuncResult<Matrix> {
        let left_value = self.evaluation.left.evaluate(point)?[0];
        let right_value = self.evaluation.right.evaluate(point)?[0];
        let left_gradient = self.evaluation.left.gradient(point)?;
        let right_gradient = self.evaluation.right.gradient(point)?;
        Ok(left_value * right_gradient + right_value * left_gradient)
    }

    fn input_dimension(&self) -> usize {
        self.evaluation.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        1
    }

    fn description(&self) -> String {
        format!("gradient of {}", self.evaluation.description())
    }

    fn clone_box(&self) -> Box<dyn Gradient> {
        Box::new(self.clone())
    }
}

/// Hessian side: the second-order product rule, four cross terms.
#[derive(Clone)]
pub struct ProductHessian {
    evaluation: ProductEvaluation,
}

impl ProductHessian {
    pub fn new(evaluation: ProductEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Hessian for ProductHessian {
    fn hessian(&self, point: &Point) -> FuncResult<SymTensor> {
        let n = self.input_dimension();
        let left_value = self.evaluation.left.evaluate(point)?[0];
        let right_value = self.evaluation.right.evaluate(point)?[0];
        let left_gradient = self.evaluation.left.gradient(point)?;
        let right_gradient = self.evaluation.right.gradient(point)?;
        let left_hessian = self.evaluation.left.hessian(point)?;
        let right_hessian = self.evaluation.right.hessian(point)?;
        let mut output = SymTensor::zeros((n, n, 1));
        for i in 0..n {
            for j in 0..n {
                output[[i, j, 0]] = left_value * right_hessian[[i, j, 0]]
                    + right_value * left_hessian[[i, j, 0]]
                    + left_gradient[[i, 0]] * right_gradient[[j, 0]]
                    + right_gradient[[i, 0]] * left_gradient[[j, 0]];
            }
        }
        Ok(output)
    }

    fn input_dimension(&self) -> usize {
        self.evaluation.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        1
    }

    fn description(&self) -> String {
        format!("hessian of {}", self.evaluation.description())
    }

    fn clone_box(&self) -> Box<dyn Hessian> {
        Box::new(self.clone())
    }
}
