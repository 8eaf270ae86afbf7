//! Explicit absent-derivative markers.
//!
//! Some evaluations — the indicator is the canonical case — have no
//! meaningful derivative anywhere a caller would want one, and a
//! finite-difference approximation of a step function is noise rather
//! than a degraded answer. [`NoGradient`] and [`NoHessian`] make that
//! absence explicit: they satisfy the [`Gradient`] / [`Hessian`] contracts
//! structurally but fail every call with [`FuncError::NotImplemented`].
use crate::function::{
    errors::{FuncError, FuncResult},
    traits::{Gradient, Hessian},
    types::{Matrix, Point, SymTensor},
};

/// Gradient marker for functions with no usable derivative.
#[derive(Debug, Clone)]
pub struct NoGradient {
    input_dimension: usize,
    output_dimension: usize,
}

impl NoGradient {
    pub fn new(input_dimension: usize, output_dimension: usize) -> Self {
        Self { input_dimension, output_dimension }
    }
}

impl Gradient for NoGradient {
    fn gradient(&self, _point: &Point) -> FuncResult<Matrix> {
        Err(FuncError::not_implemented("gradient of a function with no derivative"))
    }

    fn input_dimension(&self) -> usize {
        self.input_dimension
    }

    fn output_dimension(&self) -> usize {
        self.output_dimension
    }

    fn description(&self) -> String {
        "no gradient".to_string()
    }

    fn clone_box(&self) -> Box<dyn Gradient> {
        Box::new(self.clone())
    }
}

/// Hessian marker for functions with no usable second derivative.
#[derive(Debug, Clone)]
pub struct NoHessian {
    input_dimension: usize,
    output_dimension: usize,
}

impl NoHessian {
    pub fn new(input_dimension: usize, output_dimension: usize) -> Self {
        Self { input_dimension, output_dimension }
    }
}

impl Hessian for NoHessian {
    fn hessian(&self, _point: &Point) -> FuncResult<SymTensor> {
        Err(FuncError::not_implemented("hessian of a function with no derivative"))
    }

    fn input_dimension(&self) -> usize {
        self.input_dimension
    }

    fn output_dimension(&self) -> usize {
        self.output_dimension
    }

    fn description(&self) -> String {
        "no hessian".to_string()
    }

    fn clone_box(&self) -> Box<dyn Hessian> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Both markers must refuse every call with `NotImplemented` while still
    // reporting the dimensions they were built with.
    fn markers_report_dimensions_and_refuse_calls() {
        // Arrange
        let g = NoGradient::new(2, 1);
        let h = NoHessian::new(2, 1);

        // Assert
        assert_eq!((g.input_dimension(), g.output_dimension()), (2, 1));
        assert_eq!((h.input_dimension(), h.output_dimension()), (2, 1));
        assert!(matches!(
            g.gradient(&array![0.0, 0.0]),
            Err(FuncError::NotImplemented { .. })
        ));
        assert!(matches!(
            h.hessian(&array![0.0, 0.0]),
            Err(FuncError::NotImplemented { .. })
        ));
    }
}
