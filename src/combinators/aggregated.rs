//! combinators::aggregated — vertical stacking of function outputs.
//!
//! Purpose
//! -------
//! Implement `x ↦ [f₁(x), f₂(x), …, fₖ(x)]`: every operand sees the same
//! input and the outputs are concatenated in operand order. Derivatives
//! stack the same way, along the output axis of the transposed Jacobian
//! (`Axis(1)`) and of the symmetric tensor (`Axis(2)`).
//!
//! Invariants & assumptions
//! ------------------------
//! - The collection is non-empty and every operand shares one input
//!   dimension; output dimensions are free.
//! - The aggregate output dimension is the sum of operand output
//!   dimensions and component order follows operand order exactly.
use ndarray::{concatenate, Axis};

use crate::function::{
    errors::FuncResult,
    handle::Function,
    traits::{Evaluation, Gradient, Hessian},
    types::{Matrix, Point, SymTensor},
    validation::{check_collection_not_empty, check_same_dimensions},
};

/// Evaluation side of an output-stacking aggregate.
#[derive(Clone)]
pub struct AggregatedEvaluation {
    functions: Vec<Function>,
    output_dimension: usize,
}

impl AggregatedEvaluation {
    /// Validate and build the aggregate.
    ///
    /// # Errors
    /// [`crate::function::errors::FuncError::EmptyCollection`] on an empty
    /// operand list, [`crate::function::errors::FuncError::DimensionMismatch`]
    /// when input dimensions disagree.
    pub fn new(functions: Vec<Function>) -> FuncResult<Self> {
        check_collection_not_empty("aggregation", functions.len())?;
        let operands: Vec<&dyn Evaluation> =
            functions.iter().map(|f| f.core().evaluation()).collect();
        check_same_dimensions("aggregation", &operands, false)?;
        let output_dimension = functions.iter().map(|f| f.output_dimension()).sum();
        Ok(Self { functions, output_dimension })
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }
}

impl Evaluation for AggregatedEvaluation {
    fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        let mut output = Point::zeros(self.output_dimension);
        let mut offset = 0;
        for function in &self.functions {
            let value = function.evaluate(point)?;
            output.slice_mut(ndarray::s![offset..offset + value.len()]).assign(&value);
            offset += value.len();
        }
        Ok(output)
    }

    fn input_dimension(&self) -> usize {
        self.functions[0].input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.output_dimension
    }

    fn description(&self) -> String {
        let parts: Vec<String> = self.functions.iter().map(|f| f.description()).collect();
        format!("[{}]", parts.join("; "))
    }

    fn clone_box(&self) -> Box<dyn Evaluation> {
        Box::new(self.clone())
    }
}

/// Gradient side: operand Jacobians stacked along the output axis.
#[derive(Clone)]
pub struct AggregatedGradient {
    evaluation: AggregatedEvaluation,
}

impl AggregatedGradient {
    pub fn new(evaluation: AggregatedEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Gradient for AggregatedGradient {
    fn gradient(&self, point: &Point) -> FuncResult<Matrix> {
        let blocks: Vec<Matrix> = self
            .evaluation
            .functions
            .iter()
            .map(|f| f.gradient(point))
            .collect::<FuncResult<_>>()?;
        let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
        concatenate(Axis(1), &views)
            .map_err(|err| crate::function::errors::FuncError::InvalidArgument {
                context: "aggregation",
                reason: err.to_string(),
            })
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

/// Hessian side: operand tensors stacked along the component axis.
#[derive(Clone)]
pub struct AggregatedHessian {
    evaluation: AggregatedEvaluation,
}

impl AggregatedHessian {
    pub fn new(evaluation: AggregatedEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Hessian for AggregatedHessian {
    fn hessian(&self, point: &Point) -> FuncResult<SymTensor> {
        let blocks: Vec<SymTensor> = self
            .evaluation
            .functions
            .iter()
            .map(|f| f.hessian(point))
            .collect::<FuncResult<_>>()?;
        let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
        concatenate(Axis(2), &views)
            .map_err(|err| crate::function::errors::FuncError::InvalidArgument {
                context: "aggregation",
                reason: err.to_string(),
            })
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
    use crate::function::{errors::FuncError, validation::check_point_dimension};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Output ordering and block layout of aggregated values and Jacobians.
    // - Validation of empty collections and mismatched input dimensions.
    // -------------------------------------------------------------------------

    /// x ↦ [x²] over ℝ¹.
    #[derive(Clone)]
    struct Square;

    impl Evaluation for Square {
        fn evaluate(&self, point: &Point) -> FuncResult<Point> {
            check_point_dimension(1, point)?;
            Ok(array![point[0] * point[0]])
        }

        fn input_dimension(&self) -> usize {
            1
        }

        fn output_dimension(&self) -> usize {
            1
        }

        fn description(&self) -> String {
            "x^2".to_string()
        }

        fn clone_box(&self) -> Box<dyn Evaluation> {
            Box::new(self.clone())
        }
    }

    /// x ↦ [x, 3x] over ℝ¹.
    #[derive(Clone)]
    struct Pair;

    impl Evaluation for Pair {
        fn evaluate(&self, point: &Point) -> FuncResult<Point> {
            check_point_dimension(1, point)?;
            Ok(array![point[0], 3.0 * point[0]])
        }

        fn input_dimension(&self) -> usize {
            1
        }

        fn output_dimension(&self) -> usize {
            2
        }

        fn description(&self) -> String {
            "[x, 3x]".to_string()
        }

        fn clone_box(&self) -> Box<dyn Evaluation> {
            Box::new(self.clone())
        }
    }

    /// (x, y) ↦ [x + y] over ℝ².
    #[derive(Clone)]
    struct Sum2;

    impl Evaluation for Sum2 {
        fn evaluate(&self, point: &Point) -> FuncResult<Point> {
            check_point_dimension(2, point)?;
            Ok(array![point[0] + point[1]])
        }

        fn input_dimension(&self) -> usize {
            2
        }

        fn output_dimension(&self) -> usize {
            1
        }

        fn description(&self) -> String {
            "x + y".to_string()
        }

        fn clone_box(&self) -> Box<dyn Evaluation> {
            Box::new(self.clone())
        }
    }

    #[test]
    // Purpose
    // -------
    // Aggregating [x²] and [x, 3x] yields [x², x, 3x] with operand order
    // preserved and the Jacobian blocks stacked in the same order.
    fn aggregate_preserves_operand_order() {
        // Arrange
        let eval = AggregatedEvaluation::new(vec![
            Function::from_evaluation(Box::new(Square)),
            Function::from_evaluation(Box::new(Pair)),
        ])
        .unwrap();
        let grad = AggregatedGradient::new(eval.clone());

        // Act
        let value = eval.evaluate(&array![2.0]).unwrap();
        let g = grad.gradient(&array![2.0]).unwrap();

        // Assert
        assert_eq!(eval.output_dimension(), 3);
        assert_abs_diff_eq!(value[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(value[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(value[2], 6.0, epsilon = 1e-12);
        assert_eq!(g.shape(), &[1, 3]);
        assert_abs_diff_eq!(g[[0, 0]], 4.0, epsilon = 1e-3);
        assert_abs_diff_eq!(g[[0, 1]], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(g[[0, 2]], 3.0, epsilon = 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // An empty operand list and operands with different input dimensions
    // must both be rejected at construction.
    fn invalid_collections_fail_at_construction() {
        // Act + Assert
        assert!(matches!(
            AggregatedEvaluation::new(Vec::new()),
            Err(FuncError::EmptyCollection { context: "aggregation" })
        ));
        assert!(matches!(
            AggregatedEvaluation::new(vec![
                Function::from_evaluation(Box::new(Square)),
                Function::from_evaluation(Box::new(Sum2)),
            ]),
            Err(FuncError::DimensionMismatch { context: "aggregation", .. })
        ));
    }
}
