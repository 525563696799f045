//! Error types for grid construction, rule induction and task I/O

use std::fmt;
use std::path::PathBuf;

/// Main error type for all induction operations
#[derive(Debug)]
pub enum InductionError {
    /// Grid data is not a valid rectangular finite-palette grid
    ///
    /// Raised at grid construction when:
    /// - Rows have unequal lengths
    /// - The grid has no rows or no columns
    /// - A symbol lies outside the palette
    MalformedGrid {
        /// Description of what's wrong with the grid
        reason: String,
    },

    /// No transformation candidate reproduced every training pair
    ///
    /// Not fatal: the predictor replaces it with a fallback prediction.
    NoValidCandidate {
        /// Number of distinct hypotheses replayed against the training pairs
        examined: usize,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Task file is not valid task JSON
    TaskFormat {
        /// Path of the offending task file
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for InductionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedGrid { reason } => {
                write!(f, "Malformed grid: {reason}")
            }
            Self::NoValidCandidate { examined } => {
                write!(
                    f,
                    "No valid transformation candidate among {examined} examined hypotheses"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::TaskFormat { path, source } => {
                write!(f, "Invalid task file '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for InductionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TaskFormat { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for induction results
pub type Result<T> = std::result::Result<T, InductionError>;

impl From<std::io::Error> for InductionError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> InductionError {
    InductionError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a malformed grid error
pub fn malformed_grid(reason: &impl ToString) -> InductionError {
    InductionError::MalformedGrid {
        reason: reason.to_string(),
    }
}

/// Attach a path and operation to a file system error
pub fn file_system(
    path: impl Into<PathBuf>,
    operation: &'static str,
) -> impl FnOnce(std::io::Error) -> InductionError {
    let path = path.into();
    move |source| InductionError::FileSystem {
        path,
        operation,
        source,
    }
}
