//! combinators::database — lookup functions backed by precomputed samples.
//!
//! Purpose
//! -------
//! Implement `x ↦ output[argmin_i ‖x − input[i]‖²]`: a function defined
//! by a table of input/output pairs that answers every query with the
//! output of the nearest stored input. Useful for wrapping expensive
//! solver runs or measured data as a `Function`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The input and output samples are non-empty, equal in length and
//!   internally consistent in dimension; validated at construction.
//! - Ties on the squared distance resolve to the earliest stored index,
//!   which makes lookups deterministic.
//! - The table is immutable after construction; derivatives of a
//!   database function come from the finite-difference fallback the
//!   handle installs, and carry the usual piecewise-constant caveats.
use crate::function::{
    errors::{FuncError, FuncResult},
    traits::Evaluation,
    types::{Point, Sample},
    validation::{check_collection_not_empty, check_point_dimension},
};

/// Evaluation side of a nearest-neighbour lookup table.
#[derive(Clone)]
pub struct DatabaseEvaluation {
    inputs: Sample,
    outputs: Sample,
}

impl DatabaseEvaluation {
    /// Validate and build the lookup table.
    ///
    /// # Errors
    /// [`FuncError::EmptyCollection`] on an empty table,
    /// [`FuncError::InvalidArgument`] when the samples differ in length,
    /// [`FuncError::InputDimMismatch`] or [`FuncError::DimensionMismatch`]
    /// when a row disagrees with the first row's dimensions.
    pub fn new(inputs: Sample, outputs: Sample) -> FuncResult<Self> {
        check_collection_not_empty("database", inputs.len())?;
        if inputs.len() != outputs.len() {
            return Err(FuncError::InvalidArgument {
                context: "database",
                reason: format!(
                    "input sample has {} points but output sample has {}",
                    inputs.len(),
                    outputs.len()
                ),
            });
        }
        let input_dimension = inputs[0].len();
        let output_dimension = outputs[0].len();
        for input in &inputs {
            check_point_dimension(input_dimension, input)?;
        }
        for output in &outputs {
            if output.len() != output_dimension {
                return Err(FuncError::DimensionMismatch {
                    context: "database",
                    expected: output_dimension,
                    found: output.len(),
                });
            }
        }
        Ok(Self { inputs, outputs })
    }

    pub fn inputs(&self) -> &Sample {
        &self.inputs
    }

    pub fn outputs(&self) -> &Sample {
        &self.outputs
    }

    /// Index of the stored input closest to `point`, earliest index on
    /// ties.
    fn nearest_index(&self, point: &Point) -> usize {
        let mut best_index = 0;
        let mut best_distance = f64::INFINITY;
        for (index, input) in self.inputs.iter().enumerate() {
            let difference = input - point;
            let distance = difference.dot(&difference);
            if distance < best_distance {
                best_distance = distance;
                best_index = index;
            }
        }
        best_index
    }
}

impl Evaluation for DatabaseEvaluation {
    fn evaluate(&self, point: &Point) -> FuncResult<Point> {
        check_point_dimension(self.input_dimension(), point)?;
        Ok(self.outputs[self.nearest_index(point)].clone())
    }

    fn input_dimension(&self) -> usize {
        self.inputs[0].len()
    }

    fn output_dimension(&self) -> usize {
        self.outputs[0].len()
    }

    fn description(&self) -> String {
        format!("database lookup over {} points", self.inputs.len())
    }

    fn clone_box(&self) -> Box<dyn Evaluation> {
        Box::new(self.clone())
    }
}
