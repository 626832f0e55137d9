//! Error handling for the ECG classification pipeline
//!
//! Each pipeline stage validates its own preconditions and fails fast with
//! a specific condition instead of letting degenerate numeric results flow
//! downstream into the classifier.

use core::fmt;

/// Result type alias for pipeline operations
pub type EcgResult<T> = Result<T, EcgError>;

/// Error type covering every stage of the pipeline
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EcgError {
    /// Malformed or inconsistent batch geometry, or invalid filter parameters
    InvalidInput {
        /// Description of the input problem
        reason: String,
    },

    /// Requested wavelet kind is not recognized
    UnsupportedWavelet {
        /// The name that failed to parse
        name: String,
    },

    /// Feature dimensionality does not match what the model was trained with
    SchemaMismatch {
        /// Feature dimensionality the model expects
        expected: usize,
        /// Feature dimensionality that was supplied
        actual: usize,
    },

    /// Zero-variance input to a statistic that divides by the variance
    NumericDegenerate {
        /// Statistic that could not be computed
        statistic: &'static str,
    },

    /// Record file could not be parsed
    FormatError {
        /// 1-based line number where parsing failed
        line: usize,
        /// Description of the parse failure
        reason: String,
    },

    /// Model artifact could not be loaded or is internally inconsistent
    ModelError {
        /// Description of the model problem
        reason: String,
    },
}

impl fmt::Display for EcgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcgError::InvalidInput { reason } => {
                write!(f, "Invalid input: {}", reason)
            }
            EcgError::UnsupportedWavelet { name } => {
                write!(f, "Unsupported wavelet: '{}'", name)
            }
            EcgError::SchemaMismatch { expected, actual } => {
                write!(
                    f,
                    "Feature schema mismatch: model expects {} columns, got {}",
                    expected, actual
                )
            }
            EcgError::NumericDegenerate { statistic } => {
                write!(f, "Degenerate input: {} is undefined on zero variance", statistic)
            }
            EcgError::FormatError { line, reason } => {
                write!(f, "Format error at line {}: {}", line, reason)
            }
            EcgError::ModelError { reason } => {
                write!(f, "Model error: {}", reason)
            }
        }
    }
}

impl std::error::Error for EcgError {}
