//! function::traits — the evaluation / gradient / Hessian contracts.
//!
//! Purpose
//! -------
//! Define the three object-safe capabilities every function object is built
//! from: [`Evaluation`] (value at a point), [`Gradient`] (transposed
//! Jacobian at a point) and [`Hessian`] (second-derivative tensor at a
//! point). Combinators, finite-difference fallbacks and user-supplied
//! implementations all plug in through these traits.
//!
//! Key behaviors
//! -------------
//! - Each trait exposes `clone_box`, producing an independent deep copy
//!   with no shared mutable sub-state; `Clone` is implemented for the
//!   boxed trait objects on top of it.
//! - [`Evaluation`] carries the batched overload [`Evaluation::evaluate_sample`]
//!   (default: element-wise over rayon, semantically equivalent to the
//!   point-wise form) and the optional parameter surface (`parameter`,
//!   `set_parameter`, `parameter_description`, `parameter_gradient`).
//! - [`Gradient`] and [`Hessian`] report whether they are a numeric
//!   fallback via `is_fallback`, so callers and tests can distinguish the
//!   analytic path from the finite-difference path.
//!
//! Invariants & assumptions
//! ------------------------
//! - Implementations validate the incoming point against their input
//!   dimension and fail with [`FuncError::InputDimMismatch`], never panic.
//! - A gradient matrix has shape `inputDim × outputDim` (transposed
//!   Jacobian); a Hessian tensor `inputDim × inputDim × outputDim`,
//!   symmetric in its first two axes.
//! - `parameter().len() == parameter_description().len()` at all times.
//!
//! Conventions
//! -----------
//! - All three traits are `Send + Sync` so a shared function handle can be
//!   evaluated from many threads at once.
//! - Defaulted methods express "no parameters": zero-length parameter
//!   vector, empty description, and a parameter gradient computed by
//!   centered finite differences over the parameter vector (a no-op for
//!   parameterless functions).
use crate::function::{
    errors::{FuncError, FuncResult},
    types::{Matrix, Point, Sample, SymTensor, DEFAULT_GRADIENT_STEP},
};
use rayon::prelude::*;

/// Value-evaluation capability of a function ℝⁿ→ℝᵏ.
pub trait Evaluation: Send + Sync {
    /// Evaluate the function at `point`.
    ///
    /// # Errors
    /// [`FuncError::InputDimMismatch`] if `point.len() != input_dimension()`.
    fn evaluate(&self, point: &Point) -> FuncResult<Point>;

    /// Evaluate the function over a batch of points.
    ///
    /// Semantically equivalent to mapping [`Evaluation::evaluate`] over the
    /// batch; the default implementation does exactly that in parallel.
    /// Implementations may override it for throughput, never for meaning.
    fn evaluate_sample(&self, sample: &[Point]) -> FuncResult<Sample> {
        sample.par_iter().map(|point| self.evaluate(point)).collect()
    }

    /// Dimension n of the input space.
    fn input_dimension(&self) -> usize;

    /// Dimension k of the output space.
    fn output_dimension(&self) -> usize;

    /// Current parameter vector (empty when the function has none).
    fn parameter(&self) -> Point {
        Point::zeros(0)
    }

    /// Replace the parameter vector.
    ///
    /// # Errors
    /// [`FuncError::ParameterDimMismatch`] if the length differs from
    /// [`Evaluation::parameter_dimension`].
    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        if parameter.len() != 0 {
            return Err(FuncError::ParameterDimMismatch {
                expected: 0,
                found: parameter.len(),
            });
        }
        Ok(())
    }

    /// Names of the parameter components; always length-consistent with
    /// [`Evaluation::parameter`].
    fn parameter_description(&self) -> Vec<String> {
        Vec::new()
    }

    /// Number of parameter components.
    fn parameter_dimension(&self) -> usize {
        self.parameter().len()
    }

    /// Derivatives of the output with respect to the parameter vector,
    /// as a `parameterDim × outputDim` matrix.
    ///
    /// The default implementation uses centered finite differences over
    /// the parameter vector on an internal deep copy, so any evaluation
    /// with parameters gets a usable parameter gradient for free.
    fn parameter_gradient(&self, point: &Point) -> FuncResult<Matrix> {
        let parameter = self.parameter();
        let mut result = Matrix::zeros((parameter.len(), self.output_dimension()));
        let step = DEFAULT_GRADIENT_STEP;
        for i in 0..parameter.len() {
            let mut up = self.clone_box();
            let mut down = self.clone_box();
            let mut shifted = parameter.clone();
            shifted[i] += step;
            up.set_parameter(&shifted)?;
            shifted[i] = parameter[i] - step;
            down.set_parameter(&shifted)?;
            let delta = (up.evaluate(point)? - down.evaluate(point)?) / (2.0 * step);
            result.row_mut(i).assign(&delta);
        }
        Ok(result)
    }

    /// Human-readable description of the evaluation.
    fn description(&self) -> String;

    /// Independent deep copy; no mutable state is shared with `self`.
    fn clone_box(&self) -> Box<dyn Evaluation>;
}

/// Gradient capability: transposed Jacobian at a point.
pub trait Gradient: Send + Sync {
    /// Compute the `inputDim × outputDim` transposed Jacobian at `point`.
    ///
    /// # Errors
    /// - [`FuncError::InputDimMismatch`] on a wrong-sized point.
    /// - [`FuncError::NotImplemented`] if this capability is an explicit
    ///   absent-derivative marker.
    fn gradient(&self, point: &Point) -> FuncResult<Matrix>;

    /// Dimension n of the input space.
    fn input_dimension(&self) -> usize;

    /// Dimension k of the output space.
    fn output_dimension(&self) -> usize;

    /// `true` when this gradient is a numeric finite-difference fallback
    /// rather than an analytic rule.
    fn is_fallback(&self) -> bool {
        false
    }

    /// Rebind the parameter vector this gradient differentiates under.
    ///
    /// Implementations wrapping a parametrized evaluation must forward the
    /// rebinding to their copy; the default covers parameterless gradients
    /// only.
    ///
    /// # Errors
    /// [`FuncError::ParameterDimMismatch`] if the length is unsupported.
    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        if parameter.len() != 0 {
            return Err(FuncError::ParameterDimMismatch {
                expected: 0,
                found: parameter.len(),
            });
        }
        Ok(())
    }

    /// Human-readable description of the gradient.
    fn description(&self) -> String;

    /// Independent deep copy; no mutable state is shared with `self`.
    fn clone_box(&self) -> Box<dyn Gradient>;
}

/// Hessian capability: second-derivative tensor at a point.
pub trait Hessian: Send + Sync {
    /// Compute the `inputDim × inputDim × outputDim` tensor at `point`,
    /// symmetric in its first two axes for every output slice.
    ///
    /// # Errors
    /// - [`FuncError::InputDimMismatch`] on a wrong-sized point.
    /// - [`FuncError::NotImplemented`] if this capability is an explicit
    ///   absent-derivative marker.
    fn hessian(&self, point: &Point) -> FuncResult<SymTensor>;

    /// Dimension n of the input space.
    fn input_dimension(&self) -> usize;

    /// Dimension k of the output space.
    fn output_dimension(&self) -> usize;

    /// `true` when this Hessian is a numeric finite-difference fallback.
    fn is_fallback(&self) -> bool {
        false
    }

    /// Rebind the parameter vector this Hessian differentiates under.
    /// See [`Gradient::set_parameter`].
    ///
    /// # Errors
    /// [`FuncError::ParameterDimMismatch`] if the length is unsupported.
    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        if parameter.len() != 0 {
            return Err(FuncError::ParameterDimMismatch {
                expected: 0,
                found: parameter.len(),
            });
        }
        Ok(())
    }

    /// Human-readable description of the Hessian.
    fn description(&self) -> String;

    /// Independent deep copy; no mutable state is shared with `self`.
    fn clone_box(&self) -> Box<dyn Hessian>;
}

impl Clone for Box<dyn Evaluation> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl Clone for Box<dyn Gradient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl Clone for Box<dyn Hessian> {
    fn clone(&self) -> Self {
        self.clone_box()
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
    // - Default batched evaluation matching the point-wise form.
    // - Default parameter surface for parameterless evaluations.
    // - Default finite-difference parameter gradient on a parametrized toy.
    //
    // They intentionally DO NOT cover:
    // - Combinator or fallback implementations (own modules).
    // -------------------------------------------------------------------------

    /// f(x) = [x0 + x1, x0 * x1], no parameters.
    #[derive(Clone)]
    struct Toy;

    impl Evaluation for Toy {
        fn evaluate(&self, point: &Point) -> FuncResult<Point> {
            check_point_dimension(2, point)?;
            Ok(array![point[0] + point[1], point[0] * point[1]])
        }

        fn input_dimension(&self) -> usize {
            2
        }

        fn output_dimension(&self) -> usize {
            2
        }

        fn description(&self) -> String {
            "toy".to_string()
        }

        fn clone_box(&self) -> Box<dyn Evaluation> {
            Box::new(self.clone())
        }
    }

    /// f(x) = [a * x0] with parameter [a].
    #[derive(Clone)]
    struct Scaled {
        a: f64,
    }

    impl Evaluation for Scaled {
        fn evaluate(&self, point: &Point) -> FuncResult<Point> {
            check_point_dimension(1, point)?;
            Ok(array![self.a * point[0]])
        }

        fn input_dimension(&self) -> usize {
            1
        }

        fn output_dimension(&self) -> usize {
            1
        }

        fn parameter(&self) -> Point {
            array![self.a]
        }

        fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
            if parameter.len() != 1 {
                return Err(FuncError::ParameterDimMismatch {
                    expected: 1,
                    found: parameter.len(),
                });
            }
            self.a = parameter[0];
            Ok(())
        }

        fn parameter_description(&self) -> Vec<String> {
            vec!["a".to_string()]
        }

        fn description(&self) -> String {
            "a * x0".to_string()
        }

        fn clone_box(&self) -> Box<dyn Evaluation> {
            Box::new(self.clone())
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that the default batched form returns exactly the point-wise
    // results, in order.
    //
    // Given
    // -----
    // - The toy evaluation and a 3-point batch.
    //
    // Expect
    // ------
    // - `evaluate_sample(pts)[i] == evaluate(pts[i])` for every i.
    fn default_evaluate_sample_matches_pointwise() {
        // Arrange
        let f = Toy;
        let sample = vec![array![1.0, 2.0], array![0.5, -3.0], array![0.0, 0.0]];

        // Act
        let batch = f.evaluate_sample(&sample).expect("batch over valid points succeeds");

        // Assert
        assert_eq!(batch.len(), sample.len());
        for (point, out) in sample.iter().zip(&batch) {
            assert_eq!(out, &f.evaluate(point).unwrap());
        }
    }

    #[test]
    // Purpose
    // -------
    // Confirm the parameterless defaults: empty parameter, empty
    // description, rejection of any non-empty parameter vector.
    fn parameterless_defaults_are_empty_and_strict() {
        // Arrange
        let mut f = Toy;

        // Assert
        assert_eq!(f.parameter_dimension(), 0);
        assert!(f.parameter_description().is_empty());
        assert!(f.set_parameter(&array![1.0]).is_err());
        assert!(f.set_parameter(&Point::zeros(0)).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Verify the default finite-difference parameter gradient on
    // f(x) = a * x0, whose exact parameter derivative is x0.
    //
    // Given
    // -----
    // - Parameter a = 2, evaluation point x = [3].
    //
    // Expect
    // ------
    // - parameter_gradient ≈ [[3.0]] within FD tolerance.
    fn default_parameter_gradient_matches_analytic() {
        // Arrange
        let f = Scaled { a: 2.0 };

        // Act
        let pg = f.parameter_gradient(&array![3.0]).expect("FD parameter gradient succeeds");

        // Assert
        assert_eq!(pg.shape(), &[1, 1]);
        assert_abs_diff_eq!(pg[[0, 0]], 3.0, epsilon = 1e-6);
    }
}
