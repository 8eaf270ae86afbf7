use crate::function::types::Point;

/// Crate-wide result alias for function-engine operations.
pub type FuncResult<T> = Result<T, FuncError>;

/// Errors raised by function construction, evaluation and differentiation.
///
/// Variants fall into three families: dimension incompatibilities
/// (construction- or call-time), unavailable capabilities, and malformed
/// arguments. All are synchronous and surfaced at the offending call;
/// nothing is retried or silently downgraded.
#[derive(Debug, Clone, PartialEq)]
pub enum FuncError {
    // ---- Dimension mismatches ----
    /// A point fed to a call does not match the expected input dimension.
    InputDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Two operands of a combinator disagree on a dimension.
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// A combinator operand must be scalar-valued (output dimension 1).
    ScalarOutputRequired {
        context: &'static str,
        found: usize,
    },

    /// A parameter vector does not match the declared parameter dimension.
    ParameterDimMismatch {
        expected: usize,
        found: usize,
    },

    /// A description list does not match the dimension it labels.
    DescriptionLengthMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    // ---- Unavailable capabilities ----
    /// A derivative (or other capability) was requested but no analytic
    /// rule and no numeric fallback is available for it.
    NotImplemented {
        what: String,
    },

    // ---- Invalid arguments ----
    /// A combinator was given an empty function collection.
    EmptyCollection {
        context: &'static str,
    },

    /// Function and coefficient counts disagree in a combination.
    CoefficientCountMismatch {
        functions: usize,
        coefficients: usize,
    },

    /// A finite-difference step must be finite and strictly positive.
    InvalidStep {
        step: f64,
        reason: &'static str,
    },

    /// An input/output index is out of range for the dimension it addresses.
    IndexOutOfRange {
        context: &'static str,
        index: usize,
        dimension: usize,
    },

    /// An index collection contains a duplicate entry.
    DuplicateIndex {
        context: &'static str,
        index: usize,
    },

    /// A reference point or stored sample is malformed.
    InvalidArgument {
        context: &'static str,
        reason: String,
    },

    /// The cache capacity must be at least one entry.
    InvalidCacheCapacity {
        capacity: usize,
    },

    /// A computed value contains a non-finite entry.
    NonFiniteValue {
        context: &'static str,
        index: usize,
        value: f64,
    },
}

impl FuncError {
    /// Shorthand for the `NotImplemented` family.
    pub fn not_implemented(what: impl Into<String>) -> Self {
        FuncError::NotImplemented { what: what.into() }
    }

    /// Build an `InputDimMismatch` for a point checked against a dimension.
    pub fn input_dim(expected: usize, point: &Point) -> Self {
        FuncError::InputDimMismatch { expected, found: point.len() }
    }
}

impl std::error::Error for FuncError {}

impl std::fmt::Display for FuncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Dimension mismatches ----
            FuncError::InputDimMismatch { expected, found } => {
                write!(f, "Input dimension mismatch: expected {expected}, found {found}")
            }
            FuncError::DimensionMismatch { context, expected, found } => {
                write!(f, "Dimension mismatch in {context}: expected {expected}, found {found}")
            }
            FuncError::ScalarOutputRequired { context, found } => {
                write!(
                    f,
                    "{context} requires scalar-valued operands, found output dimension {found}"
                )
            }
            FuncError::ParameterDimMismatch { expected, found } => {
                write!(f, "Parameter dimension mismatch: expected {expected}, found {found}")
            }
            FuncError::DescriptionLengthMismatch { context, expected, found } => {
                write!(
                    f,
                    "Description length mismatch for {context}: expected {expected}, found {found}"
                )
            }

            // ---- Unavailable capabilities ----
            FuncError::NotImplemented { what } => {
                write!(f, "Not implemented: {what}")
            }

            // ---- Invalid arguments ----
            FuncError::EmptyCollection { context } => {
                write!(f, "Empty function collection in {context}")
            }
            FuncError::CoefficientCountMismatch { functions, coefficients } => {
                write!(
                    f,
                    "Coefficient count mismatch: {functions} functions, {coefficients} coefficients"
                )
            }
            FuncError::InvalidStep { step, reason } => {
                write!(f, "Invalid finite-difference step {step}: {reason}")
            }
            FuncError::IndexOutOfRange { context, index, dimension } => {
                write!(f, "Index {index} out of range in {context}: dimension is {dimension}")
            }
            FuncError::DuplicateIndex { context, index } => {
                write!(f, "Duplicate index {index} in {context}")
            }
            FuncError::InvalidArgument { context, reason } => {
                write!(f, "Invalid argument in {context}: {reason}")
            }
            FuncError::InvalidCacheCapacity { capacity } => {
                write!(f, "Invalid cache capacity {capacity}: must be at least 1")
            }
            FuncError::NonFiniteValue { context, index, value } => {
                write!(f, "Non-finite value in {context} at index {index}: {value}")
            }
        }
    }
}
