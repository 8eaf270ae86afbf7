//! combinators::marginal — restriction to a subset of output components.
//!
//! Backs `getMarginal`: the marginal triple wraps deep copies of a core's
//! evaluation, gradient and Hessian and selects the requested output
//! components from each. Selection commutes with differentiation, so the
//! gradient takes the matching columns and the Hessian the matching
//! output slices; nothing is recomputed and the fallback/analytic nature
//! of the wrapped members is preserved.
use crate::function::{
    errors::FuncResult,
    traits::{Evaluation, Gradient, Hessian},
    types::{Matrix, Point, SymTensor},
};
use ndarray::Axis;

/// Marginal view over an evaluation: `y -> y[indices]`.
#[derive(Clone)]
pub struct MarginalEvaluation {
    base: Box<dyn Evaluation>,
    indices: Vec<usize>,
}

impl MarginalEvaluation {
    /// Indices are validated by the caller against the base's output
    /// dimension.
    pub fn new(base: Box<dyn Evaluation>, indices: Vec<usize>) -> Self {
        Self { base, indices }
    }

    /// Selected output components, in order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl Evaluation for MarginalEvaluation {
    fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        let full = self.base.evaluate(point)?;
        Ok(self.indices.iter().map(|&i| full[i]).collect())
    }

    fn input_dimension(&self) -> usize {
        self.base.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.indices.len()
    }

    fn parameter(&self) -> Point {
        self.base.parameter()
    }

    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        self.base.set_parameter(parameter)
    }

    fn parameter_description(&self) -> Vec<String> {
        self.base.parameter_description()
    }

    fn parameter_gradient(&self, point: &Point) -> FuncResult<Matrix> {
        let full = self.base.parameter_gradient(point)?;
        Ok(full.select(Axis(1), &self.indices))
    }

    fn description(&self) -> String {
        format!("marginal {:?} of {}", self.indices, self.base.description())
    }

    fn clone_box(&self) -> Box<dyn Evaluation> {
        Box::new(self.clone())
    }
}

/// Marginal view over a gradient: the selected columns.
#[derive(Clone)]
pub struct MarginalGradient {
    base: Box<dyn Gradient>,
    indices: Vec<usize>,
}

impl MarginalGradient {
    pub fn new(base: Box<dyn Gradient>, indices: Vec<usize>) -> Self {
        Self { base, indices }
    }
}

impl Gradient for MarginalGradient {
    fn gradient(&self, point: &Point) -> FuncResult<Matrix> {
        let full = self.base.gradient(point)?;
        Ok(full.select(Axis(1), &self.indices))
    }

    fn input_dimension(&self) -> usize {
        self.base.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.indices.len()
    }

    fn is_fallback(&self) -> bool {
        self.base.is_fallback()
    }

    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        self.base.set_parameter(parameter)
    }

    fn description(&self) -> String {
        format!("marginal {:?} of {}", self.indices, self.base.description())
    }

    fn clone_box(&self) -> Box<dyn Gradient> {
        Box::new(self.clone())
    }
}

/// Marginal view over a Hessian: the selected output slices.
#[derive(Clone)]
pub struct MarginalHessian {
    base: Box<dyn Hessian>,
    indices: Vec<usize>,
}

impl MarginalHessian {
    pub fn new(base: Box<dyn Hessian>, indices: Vec<usize>) -> Self {
        Self { base, indices }
    }
}

impl Hessian for MarginalHessian {
    fn hessian(&self, point: &Point) -> FuncResult<SymTensor> {
        let full = self.base.hessian(point)?;
        Ok(full.select(Axis(2), &self.indices))
    }

    fn input_dimension(&self) -> usize {
        self.base.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        self.indices.len()
    }

    fn is_fallback(&self) -> bool {
        self.base.is_fallback()
    }

    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        self.base.set_parameter(parameter)
    }

    fn description(&self) -> String {
        format!("marginal {:?} of {}", self.indices, self.base.description())
    }

    fn clone_box(&self) -> Box<dyn Hessian> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::validation::check_point_dimension;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover component selection and reordering at the
    // evaluation level. Gradient/Hessian selection consistency is covered
    // through `FunctionCore::marginal` and the integration suite.
    // -------------------------------------------------------------------------

    #[derive(Clone)]
    struct Triple;

    impl Evaluation for Triple {
        fn evaluate(&self, point: &Point) -> FuncResult<Point> {
            check_point_dimension(1, point)?;
            let x = point[0];
            Ok(array![x, 2.0 * x, 3.0 * x])
        }

        fn input_dimension(&self) -> usize {
            1
        }

        fn output_dimension(&self) -> usize {
            3
        }

        fn description(&self) -> String {
            "[x, 2x, 3x]".to_string()
        }

        fn clone_box(&self) -> Box<dyn Evaluation> {
            Box::new(self.clone())
        }
    }

    #[test]
    // Purpose
    // -------
    // Selection must follow the requested order, including reversal.
    fn selection_preserves_requested_order() {
        // Arrange
        let marginal = MarginalEvaluation::new(Box::new(Triple), vec![2, 0]);

        // Act
        let out = marginal.evaluate(&array![1.0]).unwrap();

        // Assert
        assert_eq!(out, array![3.0, 1.0]);
        assert_eq!(marginal.output_dimension(), 2);
        assert_eq!(marginal.input_dimension(), 1);
    }
}
