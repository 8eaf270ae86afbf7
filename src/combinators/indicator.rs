//! combinators::indicator — level-set membership as a 0/1 function.
//!
//! Purpose
//! -------
//! Implement `x ↦ 1{f(x) ⋈ s}` for a scalar function `f`, a comparison
//! operator `⋈` and a threshold `s`. The result is a discontinuous
//! function, so a `Function` built from it pairs the evaluation with the
//! refusing derivative implementations from
//! [`crate::function::no_derivative`] rather than a finite-difference
//! fallback.
//!
//! Invariants & assumptions
//! ------------------------
//! - The wrapped function must be scalar-valued; validated at
//!   construction.
//! - `Equal` compares with exact floating-point equality. Callers who
//!   need a tolerance should express it through the wrapped function.
use std::str::FromStr;

use crate::function::{
    errors::{FuncError, FuncResult},
    traits::Evaluation,
    types::Point,
    validation::check_scalar_output,
};

/// Scalar comparison applied between a function value and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
}

impl ComparisonOperator {
    /// Apply the comparison to `value ⋈ threshold`.
    pub fn compare(self, value: f64, threshold: f64) -> bool {
        match self {
            ComparisonOperator::Less => value < threshold,
            ComparisonOperator::LessOrEqual => value <= threshold,
            ComparisonOperator::Greater => value > threshold,
            ComparisonOperator::GreaterOrEqual => value >= threshold,
            ComparisonOperator::Equal => value == threshold,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::Equal => "==",
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = FuncError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "<" | "less" => Ok(ComparisonOperator::Less),
            "<=" | "leq" => Ok(ComparisonOperator::LessOrEqual),
            ">" | "greater" => Ok(ComparisonOperator::Greater),
            ">=" | "geq" => Ok(ComparisonOperator::GreaterOrEqual),
            "==" | "equal" => Ok(ComparisonOperator::Equal),
            other => Err(FuncError::InvalidArgument {
                context: "comparison operator",
                reason: format!("unrecognized operator '{other}'"),
            }),
        }
    }
}

/// Evaluation side of a level-set indicator.
#[derive(Clone)]
pub struct IndicatorEvaluation {
    evaluation: Box<dyn Evaluation>,
    operator: ComparisonOperator,
    threshold: f64,
}

impl IndicatorEvaluation {
    /// Validate and build the indicator.
    ///
    /// # Errors
    /// [`FuncError::ScalarOutputRequired`] when the wrapped function is
    /// not scalar-valued.
    pub fn new(
        evaluation: Box<dyn Evaluation>,
        operator: ComparisonOperator,
        threshold: f64,
    ) -> FuncResult<Self> {
        check_scalar_output("indicator", evaluation.as_ref())?;
        Ok(Self { evaluation, operator, threshold })
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Evaluation for IndicatorEvaluation {
    fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        let value = self.evaluation.evaluate(point)?;
        let inside = self.operator.compare(value[0], self.threshold);
        Ok(Point::from_elem(1, if inside { 1.0 } else { 0.0 }))
    }

    fn input_dimension(&self) -> usize {
        self.evaluation.input_dimension()
    }

    fn output_dimension(&self) -> usize {
        1
    }

    fn parameter(&self) -> Point {
        self.evaluation.parameter()
    }

    fn set_parameter(&mut self, parameter: &Point) -> FuncResult<()> {
        self.evaluation.set_parameter(parameter)
    }

    fn parameter_description(&self) -> Vec<String> {
        self.evaluation.parameter_description()
    }

    fn description(&self) -> String {
        format!(
            "1{{{} {} {}}}",
            self.evaluation.description(),
            self.operator.symbol(),
            self.threshold
        )
    }

    fn clone_box(&self) -> Box<dyn Evaluation> {
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
    // These tests cover:
    // - Indicator values on both sides of the threshold and on it.
    // - Operator parsing from text.
    // - Rejection of non-scalar wrapped functions.
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

    /// x ↦ [x, x] over ℝ¹.
    #[derive(Clone)]
    struct Duplicate;

    impl Evaluation for Duplicate {
        fn evaluate(&self, point: &Point) -> FuncResult<Point> {
            check_point_dimension(1, point)?;
            Ok(array![point[0], point[0]])
        }

        fn input_dimension(&self) -> usize {
            1
        }

        fn output_dimension(&self) -> usize {
            2
        }

        fn description(&self) -> String {
            "[x, x]".to_string()
        }

        fn clone_box(&self) -> Box<dyn Evaluation> {
            Box::new(self.clone())
        }
    }

    #[test]
    // Purpose
    // -------
    // 1{x² <= 4} is 1 inside the level set, 1 on its boundary and 0
    // outside.
    fn indicator_tracks_level_set_membership() {
        // Arrange
        let eval = IndicatorEvaluation::new(
            Box::new(Square),
            ComparisonOperator::LessOrEqual,
            4.0,
        )
        .unwrap();

        // Act + Assert
        assert_eq!(eval.evaluate(&array![1.0]).unwrap()[0], 1.0);
        assert_eq!(eval.evaluate(&array![2.0]).unwrap()[0], 1.0);
        assert_eq!(eval.evaluate(&array![3.0]).unwrap()[0], 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Operators parse from both symbolic and word forms; garbage is
    // rejected.
    fn operator_parsing() {
        // Act + Assert
        assert_eq!("<".parse::<ComparisonOperator>().unwrap(), ComparisonOperator::Less);
        assert_eq!("geq".parse::<ComparisonOperator>().unwrap(), ComparisonOperator::GreaterOrEqual);
        assert_eq!("==".parse::<ComparisonOperator>().unwrap(), ComparisonOperator::Equal);
        assert!(matches!(
            "~=".parse::<ComparisonOperator>(),
            Err(FuncError::InvalidArgument { context: "comparison operator", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // A vector-valued wrapped function has no defined level set and is
    // rejected at construction.
    fn non_scalar_function_is_rejected() {
        // Act + Assert
        assert!(matches!(
            IndicatorEvaluation::new(Box::new(Duplicate), ComparisonOperator::Less, 0.0),
            Err(FuncError::ScalarOutputRequired { context: "indicator", found: 2 })
        ));
    }
}
