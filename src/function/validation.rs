//! Validation helpers shared by the function engine and its combinators.
//!
//! This module centralizes the consistency checks used across the crate:
//!
//! - **Call-time checks**: [`check_point_dimension`] rejects points whose
//!   length does not match a function's input dimension.
//! - **Construction-time checks**: [`check_same_dimensions`],
//!   [`check_scalar_output`], [`check_collection_not_empty`],
//!   [`check_coefficient_count`] enforce the compatibility rules of the
//!   combinator algebra before any core is built.
//! - **Index checks**: [`check_indices`] validates marginal / parametric
//!   index sets against a dimension (range and uniqueness).
//! - **Metadata checks**: [`check_description_length`] keeps name lists
//!   length-consistent with the dimension they label.
//!
//! Returning domain-specific [`FuncError`] variants here keeps error
//! reporting uniform across every combinator constructor.
use crate::function::{
    errors::{FuncError, FuncResult},
    traits::Evaluation,
    types::Point,
};

/// Validate a point against an expected input dimension.
///
/// # Errors
/// Returns [`FuncError::InputDimMismatch`] if `point.len() != expected`.
pub fn check_point_dimension(expected: usize, point: &Point) -> FuncResult<()> {
    if point.len() != expected {
        return Err(FuncError::input_dim(expected, point));
    }
    Ok(())
}

/// Validate that every operand shares the first operand's input dimension
/// and, when `same_output` is set, its output dimension as well.
///
/// # Errors
/// - [`FuncError::EmptyCollection`] if `operands` is empty.
/// - [`FuncError::DimensionMismatch`] naming `context` on the first
///   operand that disagrees.
pub fn check_same_dimensions(
    context: &'static str, operands: &[&dyn Evaluation], same_output: bool,
) -> FuncResult<()> {
    check_collection_not_empty(context, operands.len())?;
    let input_dim = operands[0].input_dimension();
    let output_dim = operands[0].output_dimension();
    for op in &operands[1..] {
        if op.input_dimension() != input_dim {
            return Err(FuncError::DimensionMismatch {
                context,
                expected: input_dim,
                found: op.input_dimension(),
            });
        }
        if same_output && op.output_dimension() != output_dim {
            return Err(FuncError::DimensionMismatch {
                context,
                expected: output_dim,
                found: op.output_dimension(),
            });
        }
    }
    Ok(())
}

/// Validate that an operand is scalar-valued (output dimension 1).
///
/// # Errors
/// Returns [`FuncError::ScalarOutputRequired`] otherwise.
pub fn check_scalar_output(context: &'static str, operand: &dyn Evaluation) -> FuncResult<()> {
    if operand.output_dimension() != 1 {
        return Err(FuncError::ScalarOutputRequired {
            context,
            found: operand.output_dimension(),
        });
    }
    Ok(())
}

/// Reject empty operand collections at construction time.
///
/// # Errors
/// Returns [`FuncError::EmptyCollection`] if `len == 0`.
pub fn check_collection_not_empty(context: &'static str, len: usize) -> FuncResult<()> {
    if len == 0 {
        return Err(FuncError::EmptyCollection { context });
    }
    Ok(())
}

/// Validate that a combination supplies one coefficient per function.
///
/// # Errors
/// Returns [`FuncError::CoefficientCountMismatch`] on disagreement.
pub fn check_coefficient_count(functions: usize, coefficients: usize) -> FuncResult<()> {
    if functions != coefficients {
        return Err(FuncError::CoefficientCountMismatch { functions, coefficients });
    }
    Ok(())
}

/// Validate an index collection against a dimension: non-empty, in range,
/// and free of duplicates.
///
/// # Errors
/// - [`FuncError::EmptyCollection`] if `indices` is empty.
/// - [`FuncError::IndexOutOfRange`] for the first index `>= dimension`.
/// - [`FuncError::DuplicateIndex`] for the first repeated index.
pub fn check_indices(context: &'static str, indices: &[usize], dimension: usize) -> FuncResult<()> {
    check_collection_not_empty(context, indices.len())?;
    let mut seen = vec![false; dimension];
    for &index in indices {
        if index >= dimension {
            return Err(FuncError::IndexOutOfRange { context, index, dimension });
        }
        if seen[index] {
            return Err(FuncError::DuplicateIndex { context, index });
        }
        seen[index] = true;
    }
    Ok(())
}

/// Validate a description list against the dimension it labels.
///
/// # Errors
/// Returns [`FuncError::DescriptionLengthMismatch`] on disagreement.
pub fn check_description_length(
    context: &'static str, expected: usize, found: usize,
) -> FuncResult<()> {
    if expected != found {
        return Err(FuncError::DescriptionLengthMismatch { context, expected, found });
    }
    Ok(())
}

/// Validate a finite-difference step: finite and strictly positive.
///
/// # Errors
/// Returns [`FuncError::InvalidStep`] otherwise.
pub fn check_step(step: f64) -> FuncResult<()> {
    if !step.is_finite() {
        return Err(FuncError::InvalidStep { step, reason: "Step must be finite." });
    }
    if step <= 0.0 {
        return Err(FuncError::InvalidStep { step, reason: "Step must be strictly positive." });
    }
    Ok(())
}

/// Build the default name list for a dimension: `prefix0`, `prefix1`, …
pub fn default_description(prefix: &str, dimension: usize) -> Vec<String> {
    (0..dimension).map(|i| format!("{prefix}{i}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Point / dimension checks accepting matches and rejecting mismatches.
    // - Index-set validation (range, duplicates, emptiness).
    // - Step and coefficient-count validation.
    //
    // They intentionally DO NOT cover:
    // - Combinator construction paths (covered in combinator modules).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Confirm that a point of the expected length passes and a shorter one
    // is rejected with `InputDimMismatch`.
    fn check_point_dimension_accepts_match_rejects_mismatch() {
        let p: Point = array![1.0, 2.0];
        assert!(check_point_dimension(2, &p).is_ok());
        let err = check_point_dimension(3, &p).expect_err("short point must be rejected");
        assert_eq!(err, FuncError::InputDimMismatch { expected: 3, found: 2 });
    }

    #[test]
    // Purpose
    // -------
    // Verify range and duplicate detection in `check_indices`.
    fn check_indices_rejects_out_of_range_and_duplicates() {
        assert!(check_indices("marginal", &[0, 2], 3).is_ok());
        let err = check_indices("marginal", &[0, 3], 3).expect_err("index 3 out of range");
        assert_eq!(
            err,
            FuncError::IndexOutOfRange { context: "marginal", index: 3, dimension: 3 }
        );
        let err = check_indices("marginal", &[1, 1], 3).expect_err("duplicate index 1");
        assert_eq!(err, FuncError::DuplicateIndex { context: "marginal", index: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Verify that non-finite or non-positive steps are rejected.
    fn check_step_rejects_bad_steps() {
        assert!(check_step(1e-5).is_ok());
        assert!(check_step(0.0).is_err());
        assert!(check_step(-1e-3).is_err());
        assert!(check_step(f64::NAN).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Confirm the default description layout `x0, x1, ...`.
    fn default_description_numbers_from_zero() {
        assert_eq!(default_description("x", 3), vec!["x0", "x1", "x2"]);
    }
}
