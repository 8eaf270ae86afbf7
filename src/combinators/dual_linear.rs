//! combinators::dual_linear — vector-coefficient combination of scalar functions.
//!
//! Purpose
//! -------
//! Implement `x ↦ Σ fᵢ(x)·cᵢ` where every `fᵢ` is scalar-valued and every
//! `cᵢ` is a vector in the aggregate output space. This is the functional
//! expansion shape used by spectral and chaos decompositions: the basis
//! functions are scalar, the coefficients carry the output structure.
//!
//! Derivatives follow from linearity: the gradient is
//! `Σ ∇fᵢ(x) ⊗ cᵢ` (an `inputDim × outputDim` matrix), the Hessian the
//! analogous tensor contraction with the inner second derivatives.
//!
//! Invariants & assumptions
//! ------------------------
//! - All operands share the input dimension and have output dimension 1;
//!   all coefficient vectors share one length, which becomes the
//!   aggregate output dimension. Validated at construction.
use crate::function::{
    errors::{FuncError, FuncResult},
    handle::Function,
    traits::{Evaluation, Gradient, Hessian},
    types::{Matrix, Point, SymTensor},
    validation::{check_coefficient_count, check_same_dimensions, check_scalar_output},
};

/// Evaluation side of `Σ fᵢ(x)·cᵢ`.
#[derive(Clone)]
pub struct DualLinearCombinationEvaluation {
    functions: Vec<Function>,
    coefficients: Vec<Point>,
}

impl DualLinearCombinationEvaluation {
    /// Validate and build the combination.
    ///
    /// # Errors
    /// - [`FuncError::EmptyCollection`] / [`FuncError::CoefficientCountMismatch`]
    ///   for malformed collections.
    /// - [`FuncError::DimensionMismatch`] when operands disagree on input
    ///   dimension or coefficient vectors on length.
    /// - [`FuncError::ScalarOutputRequired`] for a non-scalar operand.
    pub fn new(functions: Vec<Function>, coefficients: Vec<Point>) -> FuncResult<Self> {
        check_coefficient_count(functions.len(), coefficients.len())?;
        let operands: Vec<&dyn Evaluation> =
            functions.iter().map(|f| f.core().evaluation()).collect();
        check_same_dimensions("dual linear combination", &operands, false)?;
        for operand in &operands {
            check_scalar_output("dual linear combination", *operand)?;
        }
        let output_dimension = coefficients[0].len();
        for coefficient in &coefficients[1..] {
            if coefficient.len() != output_dimension {
                return Err(FuncError::DimensionMismatch {
                    context: "dual linear combination coefficients",
                    expected: output_dimension,
                    found: coefficient.len(),
                });
            }
        }
        Ok(Self { functions, coefficients })
    }

    /// Inner scalar functions, in combination order.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Vector coefficients, one per function.
    pub fn coefficients(&self) -> &[Point] {
        &self.coefficients
    }
}

impl Evaluation for DualLinearCombinationEvaluation {
    fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        let mut output = Point::zeros(self.output_dimension());
        for (function, coefficient) in self.functions.iter().zip(&self.coefficients) {
            let value = function.evaluate(point)?[0];
            output = output + value * coefficient;
        }
        Ok(output)
    }

    fn input_dimension(&self) -> usize {
        self.functions[0].input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.coefficients[0].len()
    }

    fn description(&self) -> String {
        format!(
            "dual linear combination of {} scalar functions into dimension {}",
            self.functions.len(),
            self.output_dimension()
        )
    }

    fn clone_box(&self) -> Box<dyn Evaluation> {
        Box::new(self.clone())
    }
}

/// Gradient side: `Σ ∇fᵢ(x) ⊗ cᵢ`.
#[derive(Clone)]
pub struct DualLinearCombinationGradient {
    evaluation: DualLinearCombinationEvaluation,
}

impl DualLinearCombinationGradient {
    pub fn new(evaluation: DualLinearCombinationEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Gradient for DualLinearCombinationGradient {
    fn gradient(&self, point: &Point) -> FuncResult<Matrix> {
        let n = self.input_dimension();
        let k = self.output_dimension();
        let mut output = Matrix::zeros((n, k));
        for (function, coefficient) in
            self.evaluation.functions.iter().zip(&self.evaluation.coefficients)
        {
            let inner = function.gradient(point)?;
            for j in 0..n {
                for out in 0..k {
                    output[[j, out]] += inner[[j, 0]] * coefficient[out];
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
        format!("gradient of {}", self.evaluation.description())
    }

    fn clone_box(&self) -> Box<dyn Gradient> {
        Box::new(self.clone())
    }
}

/// Hessian side: `Σ ∇²fᵢ(x) ⊗ cᵢ`.
#[derive(Clone)]
pub struct DualLinearCombinationHessian {
    evaluation: DualLinearCombinationEvaluation,
}

impl DualLinearCombinationHessian {
    pub fn new(evaluation: DualLinearCombinationEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Hessian for DualLinearCombinationHessian {
    fn hessian(&self, point: &Point) -> FuncResult<SymTensor> {
        let n = self.input_dimension();
        let k = self.output_dimension();
        let mut output = SymTensor::zeros((n, n, k));
        for (function, coefficient) in
            self.evaluation.functions.iter().zip(&self.evaluation.coefficients)
        {
            let inner = function.hessian(point)?;
            for j1 in 0..n {
                for j2 in 0..n {
                    for out in 0..k {
                        output[[j1, j2, out]] += inner[[j1, j2, 0]] * coefficient[out];
                    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::validation::check_point_dimension;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The canonical basis scenario: coefficients [[1,0],[0,1]] over
    //   f(x)=x, g(x)=x² at x=3 giving [3, 9].
    // - Gradient structure against analytic inner derivatives.
    // - Scalar-output and coefficient-length validation.
    // -------------------------------------------------------------------------

    #[derive(Clone)]
    struct Power {
        exponent: i32,
    }

    impl Evaluation for Power {
        fn evaluate(&self, point: &Point) -> FuncResult<Point> {
            check_point_dimension(1, point)?;
            Ok(array![point[0].powi(self.exponent)])
        }

        fn input_dimension(&self) -> usize {
            1
        }

        fn output_dimension(&self) -> usize {
            1
        }

        fn description(&self) -> String {
            format!("x^{}", self.exponent)
        }

        fn clone_box(&self) -> Box<dyn Evaluation> {
            Box::new(self.clone())
        }
    }

    fn power(exponent: i32) -> Function {
        Function::from_evaluation(Box::new(Power { exponent }))
    }

    #[test]
    // Purpose
    // -------
    // With basis coefficients the combination stacks the scalar values:
    // [1,0]·x + [0,1]·x² at x=3 is [3, 9].
    fn basis_coefficients_stack_scalar_values() {
        // Arrange
        let eval = DualLinearCombinationEvaluation::new(
            vec![power(1), power(2)],
            vec![array![1.0, 0.0], array![0.0, 1.0]],
        )
        .unwrap();

        // Act
        let out = eval.evaluate(&array![3.0]).unwrap();

        // Assert
        assert_eq!(eval.output_dimension(), 2);
        assert_abs_diff_eq!(out[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 9.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The gradient must be Σ ∇fᵢ ⊗ cᵢ: at x=3 the two columns hold
    // d(x)/dx = 1 and d(x²)/dx = 6.
    fn gradient_is_outer_product_sum() {
        // Arrange
        let eval = DualLinearCombinationEvaluation::new(
            vec![power(1), power(2)],
            vec![array![1.0, 0.0], array![0.0, 1.0]],
        )
        .unwrap();
        let grad = DualLinearCombinationGradient::new(eval);

        // Act
        let g = grad.gradient(&array![3.0]).unwrap();

        // Assert
        assert_eq!(g.shape(), &[1, 2]);
        assert_abs_diff_eq!(g[[0, 0]], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(g[[0, 1]], 6.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Non-scalar operands and ragged coefficient vectors are rejected at
    // construction.
    fn construction_validates_operands() {
        // Non-scalar operand: aggregate a 2-output function first.
        let vector_valued = Function::aggregate(&[power(1), power(2)]).unwrap();
        assert!(matches!(
            DualLinearCombinationEvaluation::new(
                vec![vector_valued],
                vec![array![1.0, 0.0]],
            ),
            Err(FuncError::ScalarOutputRequired { .. })
        ));

        // Ragged coefficients.
        assert!(matches!(
            DualLinearCombinationEvaluation::new(
                vec![power(1), power(2)],
                vec![array![1.0, 0.0], array![1.0]],
            ),
            Err(FuncError::DimensionMismatch { .. })
        ));
    }
}
