use thiserror::Error;

// ─────────────────────────────────────────────
// MalformedTableError
// ─────────────────────────────────────────────

/// Structural defects of a piecewise-polynomial table.
///
/// Raised only while constructing a table; a table that exists is valid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedTableError {
    #[error("at least two breakpoints are required, found {0}")]
    TooFewBreakpoints(usize),

    #[error("breakpoint {index} is not finite ({value})")]
    NonFiniteBreakpoint { index: usize, value: f64 },

    #[error("breakpoints must be strictly increasing: breakpoint {index} ({value}) does not exceed {previous}")]
    NonIncreasingBreakpoints {
        index: usize,
        previous: f64,
        value: f64,
    },

    #[error("{segments} segments require {segments} coefficient rows, found {rows}")]
    SegmentCountMismatch { segments: usize, rows: usize },

    #[error("coefficient row {row} is empty")]
    EmptyCoefficientRow { row: usize },

    #[error("coefficient row {row} has {found} coefficients, expected {expected}")]
    RaggedCoefficients {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("coefficient ({row}, {column}) is not finite ({value})")]
    NonFiniteCoefficient {
        row: usize,
        column: usize,
        value: f64,
    },

    #[error("declared {field} {declared} does not match the coefficient table ({actual})")]
    DeclaredShapeMismatch {
        field: &'static str,
        declared: usize,
        actual: usize,
    },
}

// ─────────────────────────────────────────────
// InvalidInputError
// ─────────────────────────────────────────────

/// Call-time rejection of a query point or sample vector.
///
/// Kernels never clamp NaN or infinite input to a default value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInputError {
    #[error("query point is not finite ({value})")]
    NonFiniteQuery { value: f64 },

    #[error("query point {index} of the batch is not finite ({value})")]
    NonFiniteBatchElement { index: usize, value: f64 },

    #[error("sample {index} is not finite ({value})")]
    NonFiniteSample { index: usize, value: f64 },

    #[error("sample vector is empty")]
    EmptySample,

    #[error("vector of length {found} given where length {expected} is required")]
    DimensionMismatch { expected: usize, found: usize },
}
