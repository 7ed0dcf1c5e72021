use thiserror::Error;

#[derive(Error, Debug)]
pub enum GnomonError {
    #[error("Dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Matrix is singular: zero pivot in column {0}")]
    SingularMatrix(usize),

    #[error("Arithmetic degeneracy: {0}")]
    ArithmeticDegeneracy(&'static str),

    #[error("Operation requires a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Permutation-expansion determinant is limited to order {max}, got {order}")]
    DeterminantOrderTooLarge { order: usize, max: usize },

    #[error("Step size {h} fell below the minimum at t = {t}")]
    StepSizeTooSmall { t: f64, h: f64 },

    #[error("Maximum number of integration steps ({steps}) exceeded at t = {t}")]
    MaxStepsExceeded { t: f64, steps: u64 },

    #[error("Non-finite state produced at t = {t}")]
    NonFiniteState { t: f64 },

    #[error("Invalid integrator parameter: {0}")]
    InvalidIntegratorParameter(String),

    #[error("Invalid scenario parameter: {0}")]
    InvalidScenarioParameter(String),

    #[error("Unable to write the result table: {0}")]
    SinkFailure(#[from] std::io::Error),

    #[error("Result table encoding error: {0}")]
    TableFormat(#[from] csv::Error),

    #[error("Malformed result table row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
}

impl PartialEq for GnomonError {
    fn eq(&self, other: &Self) -> bool {
        use GnomonError::*;
        match (self, other) {
            (
                DimensionMismatch {
                    context: c1,
                    expected: e1,
                    found: f1,
                },
                DimensionMismatch {
                    context: c2,
                    expected: e2,
                    found: f2,
                },
            ) => c1 == c2 && e1 == e2 && f1 == f2,
            (
                IndexOutOfRange { index: i1, len: l1 },
                IndexOutOfRange { index: i2, len: l2 },
            ) => i1 == i2 && l1 == l2,
            (SingularMatrix(a), SingularMatrix(b)) => a == b,
            (ArithmeticDegeneracy(a), ArithmeticDegeneracy(b)) => a == b,
            (NotSquare { rows: r1, cols: c1 }, NotSquare { rows: r2, cols: c2 }) => {
                r1 == r2 && c1 == c2
            }
            (
                DeterminantOrderTooLarge { order: o1, max: m1 },
                DeterminantOrderTooLarge { order: o2, max: m2 },
            ) => o1 == o2 && m1 == m2,
            (StepSizeTooSmall { t: t1, h: h1 }, StepSizeTooSmall { t: t2, h: h2 }) => {
                t1 == t2 && h1 == h2
            }
            (
                MaxStepsExceeded { t: t1, steps: s1 },
                MaxStepsExceeded { t: t2, steps: s2 },
            ) => t1 == t2 && s1 == s2,
            (NonFiniteState { t: a }, NonFiniteState { t: b }) => a == b,
            (InvalidIntegratorParameter(a), InvalidIntegratorParameter(b)) => a == b,
            (InvalidScenarioParameter(a), InvalidScenarioParameter(b)) => a == b,
            (MalformedRow { row: r1, reason: a }, MalformedRow { row: r2, reason: b }) => {
                r1 == r2 && a == b
            }

            // Wrapped foreign errors: same variant is enough
            (SinkFailure(_), SinkFailure(_)) => true,
            (TableFormat(_), TableFormat(_)) => true,

            _ => false,
        }
    }
}
