//! combinators::composed — function composition `left ∘ right`.
//!
//! Purpose
//! -------
//! Implement `x ↦ left(right(x))` with the chain rule for both derivative
//! orders. In this crate's transposed-Jacobian convention the first-order
//! rule reads
//!
//! ```text
//! ∇h(x) = ∇right(x) · ∇left(right(x))        (n×m · m×k = n×k)
//! ```
//!
//! and the second-order rule combines the outer Hessian contracted with
//! two inner Jacobians plus the inner Hessian contracted with the outer
//! Jacobian:
//!
//! ```text
//! ∇²h[i,j,o] = Σ_{a,b} ∇²left[a,b,o]·∇right[i,a]·∇right[j,b]
//!            + Σ_a    ∇left[a,o]·∇²right[i,j,a]
//! ```
//!
//! Invariants & assumptions
//! ------------------------
//! - `left.input_dimension() == right.output_dimension()`, validated at
//!   construction. The composite maps `right`'s input space to `left`'s
//!   output space.
//! - A fallback-differentiated operand composes transparently; accuracy
//!   degrades gracefully and the operand's fallback flag remains
//!   inspectable through its own handle.
use crate::function::{
    errors::{FuncError, FuncResult},
    handle::Function,
    traits::{Evaluation, Gradient, Hessian},
    types::{Matrix, Point, SymTensor},
};

/// Evaluation side of `left(right(x))`.
#[derive(Clone)]
pub struct ComposedEvaluation {
    left: Function,
    right: Function,
}

impl ComposedEvaluation {
    /// Validate and build the composition.
    ///
    /// # Errors
    /// [`FuncError::DimensionMismatch`] unless the left operand consumes
    /// exactly what the right operand produces.
    pub fn new(left: Function, right: Function) -> FuncResult<Self> {
        if left.input_dimension() != right.output_dimension() {
            return Err(FuncError::DimensionMismatch {
                context: "composition",
                expected: right.output_dimension(),
                found: left.input_dimension(),
            });
        }
        Ok(Self { left, right })
    }

    pub fn left(&self) -> &Function {
        &self.left
    }

    pub fn right(&self) -> &Function {
        &self.right
    }
}

impl Evaluation for ComposedEvaluation {
    fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        let inner = self.right.evaluate(point)?;
        self.left.evaluate(&inner)
    }

    fn input_dimension(&self) -> usize {
        self.right.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.left.output_dimension()
    }

    fn description(&self) -> String {
        format!("({}) o ({})", self.left.description(), self.right.description())
    }

    fn clone_box(&self) -> Box<dyn Evaluation> {
        Box::new(self.clone())
    }
}

/// Gradient side: the chain rule.
#[derive(Clone)]
pub struct ComposedGradient {
    evaluation: ComposedEvaluation,
}

impl ComposedGradient {
    pub fn new(evaluation: ComposedEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Gradient for ComposedGradient {
    fn gradient(&self, point: &Point) -> FuncResult<Matrix> {
        let inner_value = self.evaluation.right.evaluate(point)?;
        let inner_gradient = self.evaluation.right.gradient(point)?;
        let outer_gradient = self.evaluation.left.gradient(&inner_value)?;
        Ok(inner_gradient.dot(&outer_gradient))
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

/// Hessian side: the full second-order chain rule.
#[derive(Clone)]
pub struct ComposedHessian {
    evaluation: ComposedEvaluation,
}

impl ComposedHessian {
    pub fn new(evaluation: ComposedEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Hessian for ComposedHessian {
    fn hessian(&self, point: &Point) -> FuncResult<SymTensor> {
        let n = self.input_dimension();
        let m = self.evaluation.right.output_dimension();
        let k = self.output_dimension();
        let inner_value = self.evaluation.right.evaluate(point)?;
        let inner_gradient = self.evaluation.right.gradient(point)?;
        let inner_hessian = self.evaluation.right.hessian(point)?;
        let outer_gradient = self.evaluation.left.gradient(&inner_value)?;
        let outer_hessian = self.evaluation.left.hessian(&inner_value)?;
        let mut output = SymTensor::zeros((n, n, k));
        for i in 0..n {
            for j in 0..n {
                for out in 0..k {
                    let mut entry = 0.0;
                    for a in 0..m {
                        for b in 0..m {
                            entry += outer_hessian[[a, b, out]]
                                * inner_gradient[[i, a]]
                                * inner_gradient[[j, b]];
                        }
                        entry += outer_gradient[[a, out]] * inner_hessian[[i, j, a]];
                    }
                    output[[i, j, out]] = entry;
                }
            }
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
