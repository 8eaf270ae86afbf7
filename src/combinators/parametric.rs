//! combinators::parametric — freezing input coordinates into parameters.
//!
//! Purpose
//! -------
//! Implement the partial application `x_free ↦ f(assemble(x_free, θ))`
//! where θ holds the frozen coordinates of the inner function's input.
//! The frozen set is chosen at construction, either directly or as the
//! complement of a free set, and the reference point supplies the initial
//! frozen values.
//!
//! Key behaviors
//! -------------
//! - `evaluate` scatters the free input and the current parameter into a
//!   full inner point and delegates to the inner function.
//! - The gradient and Hessian restrict the inner derivatives to the free
//!   rows (`Axis(0)`, and both point axes of the tensor); the parameter
//!   gradient restricts to the frozen rows instead.
//! - `set_parameter` replaces the frozen values without touching the
//!   inner function.
//!
//! Invariants & assumptions
//! ------------------------
//! - Indices are validated against the inner input dimension: in range
//!   and free of duplicates. The reference point carries the inner input
//!   dimension.
//! - Free and frozen index lists are each sorted ascending, matching the
//!   coordinate order of the inner input.
use ndarray::Axis;

use crate::function::{
    errors::{FuncError, FuncResult},
    handle::Function,
    traits::{Evaluation, Gradient, Hessian},
    types::{Matrix, Point, SymTensor},
    validation::{check_indices, check_point_dimension},
};

fn complement(indices: &[usize], dimension: usize) -> Vec<usize> {
    let mut member = vec![false; dimension];
    for &index in indices {
        member[index] = true;
    }
    (0..dimension).filter(|i| !member[*i]).collect()
}

/// Evaluation side of a partially applied function.
#[derive(Clone)]
pub struct ParametricEvaluation {
    function: Function,
    free_indices: Vec<usize>,
    frozen_indices: Vec<usize>,
    parameter: Point,
}

impl ParametricEvaluation {
    /// Validate and build the partial application.
    ///
    /// `parameters_set` selects how `indices` is read: `true` marks them
    /// as the frozen set, `false` as the free set whose complement is
    /// frozen. `reference_point` must span the inner input; its frozen
    /// coordinates become the initial parameter.
    ///
    /// # Errors
    /// [`FuncError::IndexOutOfRange`] or [`FuncError::DuplicateIndex`]
    /// on malformed indices, [`FuncError::InputDimMismatch`] when the
    /// reference point does not match the inner input dimension.
    pub fn new(
        function: Function,
        indices: &[usize],
        reference_point: &Point,
        parameters_set: bool,
    ) -> FuncResult<Self> {
        let dimension = function.input_dimension();
        check_indices("parametric restriction", indices, dimension)?;
        check_point_dimension(dimension, reference_point)?;
        let mut chosen: Vec<usize> = indices.to_vec();
        chosen.sort_unstable();
        let (frozen_indices, free_indices) = if parameters_set {
            (chosen.clone(), complement(&chosen, dimension))
        } else {
            (complement(&chosen, dimension), chosen)
        };
        let parameter = reference_point.select(Axis(0), &frozen_indices);
        Ok(Self { function, free_indices, frozen_indices, parameter })
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn free_indices(&self) -> &[usize] {
        &self.free_indices
    }

    pub fn frozen_indices(&self) -> &[usize] {
        &self.frozen_indices
    }

    /// Scatter a free point and the current parameter into an inner point.
    fn assemble(&self, point: &Point) -> Point {
        let mut full = Point::zeros(self.function.input_dimension());
        for (slot, &index) in self.free_indices.iter().enumerate() {
            full[index] = point[slot];
        }
        for (slot, &index) in self.frozen_indices.iter().enumerate() {
            full[index] = self.parameter[slot];
        }
        full
    }
}

impl Evaluation for ParametricEvaluation {
    fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        check_point_dimension(self.input_dimension(), point)?;
        self.function.evaluate(&self.assemble(point))
    }

    fn input_dimension(&self) -> usize {
        self.free_indices.len()
    }

    fn output_dimension(&self) -> usize {
        self.function.output_dimension()
    }

    fn parameter(&self) -> Point {
        self.parameter.clone()
    }

    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        if parameter.len() != self.frozen_indices.len() {
            return Err(FuncError::ParameterDimMismatch {
                expected: self.frozen_indices.len(),
                found: parameter.len(),
            });
        }
        self.parameter = parameter.clone();
        Ok(())
    }

    fn parameter_description(&self) -> Vec<String> {
        let input = self.function.input_description();
        self.frozen_indices.iter().map(|&index| input[index].clone()).collect()
    }

    /// Sensitivity of the output to the frozen coordinates: the frozen
    /// rows of the inner transposed Jacobian at the assembled point.
    fn parameter_gradient(&self, point: &Point) -> FuncResult<Matrix> {
        check_point_dimension(self.input_dimension(), point)?;
        let full = self.function.gradient(&self.assemble(point))?;
        Ok(full.select(Axis(0), &self.frozen_indices))
    }

    fn description(&self) -> String {
        format!("{} restricted to {:?}", self.function.description(), self.free_indices)
    }

    fn clone_box(&self) -> Box<dyn Evaluation> {
        Box::new(self.clone())
    }
}

/// Gradient side: free rows of the inner transposed Jacobian.
#[derive(Clone)]
pub struct ParametricGradient {
    evaluation: ParametricEvaluation,
}

impl ParametricGradient {
    pub fn new(evaluation: ParametricEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Gradient for ParametricGradient {
    fn gradient(&self, point: &Point) -> FuncResult<Matrix> {
        check_point_dimension(self.input_dimension(), point)?;
        let full = self.evaluation.function.gradient(&self.evaluation.assemble(point))?;
        Ok(full.select(Axis(0), &self.evaluation.free_indices))
    }

    fn input_dimension(&self) -> usize {
        self.evaluation.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.evaluation.output_dimension()
    }

    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        self.evaluation.set_parameter(parameter)
    }

    fn description(&self) -> String {
        format!("gradient of {}", self.evaluation.description())
    }

    fn clone_box(&self) -> Box<dyn Gradient> {
        Box::new(self.clone())
    }
}

/// Hessian side: the free-by-free subtensor of the inner Hessian.
#[derive(Clone)]
pub struct ParametricHessian {
    evaluation: ParametricEvaluation,
}

impl ParametricHessian {
    pub fn new(evaluation: ParametricEvaluation) -> Self {
        Self { evaluation }
    }
}

impl Hessian for ParametricHessian {
    fn hessian(&self, point: &Point) -> FuncResult<SymTensor> {
        check_point_dimension(self.input_dimension(), point)?;
        let full = self.evaluation.function.hessian(&self.evaluation.assemble(point))?;
        let restricted = full
            .select(Axis(0), &self.evaluation.free_indices)
            .select(Axis(1), &self.evaluation.free_indices);
        Ok(restricted)
    }

    fn input_dimension(&self) -> usize {
        self.evaluation.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.evaluation.output_dimension()
    }

    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        self.evaluation.set_parameter(parameter)
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
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Freezing by parameter set and by free-set complement.
    // - Parameter replacement through set_parameter.
    // - Free-row restriction of the gradient and frozen-row parameter
    //   gradient.
    // - Index validation at construction.
    // -------------------------------------------------------------------------

    /// (x, y, z) ↦ [x·y + z²] over ℝ³.
    #[derive(Clone)]
    struct Trivar;

    impl Evaluation for Trivar {
        fn evaluate(&self, point: &Point) -> FuncResult<Point> {
            check_point_dimension(3, point)?;
            Ok(array![point[0] * point[1] + point[2] * point[2]])
        }

        fn input_dimension(&self) -> usize {
            3
        }

        fn output_dimension(&self) -> usize {
            1
        }

        fn description(&self) -> String {
            "x*y + z^2".to_string()
        }

        fn clone_box(&self) -> Box<dyn Evaluation> {
            Box::new(self.clone())
        }
    }

    fn trivar() -> Function {
        Function::from_evaluation(Box::new(Trivar))
    }

    #[test]
    // Purpose
    // -------
    // Freezing y at 5 turns f(x, y, z) = x·y + z² into g(x, z) = 5x + z²;
    // g(2, 3) = 19 and the free gradient is [5, 6].
    fn frozen_coordinate_becomes_parameter() {
        // Arrange
        let eval =
            ParametricEvaluation::new(trivar(), &[1], &array![0.0, 5.0, 0.0], true).unwrap();
        let grad = ParametricGradient::new(eval.clone());

        // Act
        let value = eval.evaluate(&array![2.0, 3.0]).unwrap();
        let g = grad.gradient(&array![2.0, 3.0]).unwrap();

        // Assert
        assert_eq!(eval.input_dimension(), 2);
        assert_eq!(eval.parameter(), array![5.0]);
        assert_abs_diff_eq!(value[0], 19.0, epsilon = 1e-12);
        assert_eq!(g.shape(), &[2, 1]);
        assert_abs_diff_eq!(g[[0, 0]], 5.0, epsilon = 1e-3);
        assert_abs_diff_eq!(g[[1, 0]], 6.0, epsilon = 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // With parameters_set = false the index list names the free set and
    // its complement freezes; replacing the parameter changes the value.
    fn free_set_complement_and_parameter_replacement() {
        // Arrange: free = {0}, frozen = {1, 2} with y = 5, z = 1.
        let mut eval =
            ParametricEvaluation::new(trivar(), &[0], &array![0.0, 5.0, 1.0], false).unwrap();

        // Act
        let before = eval.evaluate(&array![2.0]).unwrap();
        eval.set_parameter(&array![4.0, 2.0]).unwrap();
        let after = eval.evaluate(&array![2.0]).unwrap();

        // Assert
        assert_abs_diff_eq!(before[0], 11.0, epsilon = 1e-12);
        assert_abs_diff_eq!(after[0], 12.0, epsilon = 1e-12);
        assert!(matches!(
            eval.set_parameter(&array![1.0]),
            Err(FuncError::ParameterDimMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // The parameter gradient holds the frozen rows: ∂f/∂y at
    // (x, y, z) = (2, 5, 3) is x = 2.
    fn parameter_gradient_holds_frozen_rows() {
        // Arrange
        let eval =
            ParametricEvaluation::new(trivar(), &[1], &array![0.0, 5.0, 0.0], true).unwrap();

        // Act
        let pg = eval.parameter_gradient(&array![2.0, 3.0]).unwrap();

        // Assert
        assert_eq!(pg.shape(), &[1, 1]);
        assert_abs_diff_eq!(pg[[0, 0]], 2.0, epsilon = 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // Out-of-range and duplicate indices must be rejected at construction.
    fn malformed_indices_fail_at_construction() {
        // Act + Assert
        assert!(matches!(
            ParametricEvaluation::new(trivar(), &[3], &array![0.0, 0.0, 0.0], true),
            Err(FuncError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            ParametricEvaluation::new(trivar(), &[1, 1], &array![0.0, 0.0, 0.0], true),
            Err(FuncError::DuplicateIndex { .. })
        ));
    }
}
