// posefuse_core/src/error.rs

use thiserror::Error;

/// Shape violations in the dense matrix helpers.
///
/// These indicate a defect in Jacobian or covariance bookkeeping, never a
/// runtime sensor condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinalgError {
    #[error("dimension mismatch in {op}: left is {left:?}, right is {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
}

/// A luminance buffer that cannot be interpreted as an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame has zero area ({width}x{height})")]
    EmptyFrame { width: usize, height: usize },
    #[error("luma buffer holds {actual} bytes, {width}x{height} frame needs {expected}")]
    BufferTooShort {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised by the estimators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error(transparent)]
    Linalg(#[from] LinalgError),
    /// A measurement that would divide by (near) zero in the measurement model.
    #[error("degenerate measurement for landmark {id}: range {range}")]
    DegenerateMeasurement { id: u64, range: f64 },
    #[error("non-finite input to {0}")]
    NonFiniteInput(&'static str),
    #[error("landmark slot {slot} out of range (have {count})")]
    LandmarkSlotOutOfRange { slot: usize, count: usize },
}

/// A tunable outside the range the estimators can work with.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid configuration value `{field}`: {reason}")]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
