//! Error type shared by every stage of the simulation pipeline.

use thiserror::Error;

/// Result alias used throughout `chsh-core`.
pub type ChshResult<T> = Result<T, ChshError>;

/// Everything that can go wrong while sampling or aggregating an ensemble.
///
/// All variants are input-validation failures: they are raised before any
/// random draw happens, so an error never leaves partial output behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChshError {
    /// Sample count must be at least one.
    #[error("sample count must be positive, got {n}")]
    InvalidSampleCount { n: usize },
    /// A measurement angle is NaN or infinite.
    #[error("angle {name} must be finite, got {value}")]
    InvalidAngle { name: &'static str, value: f64 },
    /// The outcome distribution is not a probability vector.
    #[error("invalid outcome distribution: {reason}")]
    InvalidDistribution { reason: String },
    /// Averaging was requested over zero products.
    #[error("cannot average an empty sample set")]
    EmptySampleSet,
    /// Ensemble label did not parse.
    #[error("unknown ensemble '{0}', expected one of A, B, C, D")]
    UnknownEnsemble(String),
    /// The categorical sampler rejected its weights.
    #[error("sampler construction failed: {0}")]
    Sampling(String),
}
