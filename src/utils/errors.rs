//! Error types for the dependence engine.
//!
//! This module defines all error types used throughout the crate,
//! organized by the phase that produces them.

use thiserror::Error;
use std::fmt;

/// Top-level error type for dependence analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The pairwise dependence test (and with it the whole unit of work)
    /// could not be completed
    #[error("Dependence test failure: {0}")]
    TestFailure(#[from] DependenceTestFailure),

    /// A dependence system violated an internal invariant
    #[error("Invalid dependence system: {0}")]
    Internal(#[from] InvalidSystemError),

    /// The caller cancelled the analysis
    #[error("Analysis cancelled")]
    Cancelled,
}

/// Error reducing a subscript expression to affine form.
#[derive(Error, Debug, Clone)]
pub struct NonAffineError {
    /// The error message
    pub message: String,
    /// The kind of non-affine construct
    pub kind: NonAffineErrorKind,
}

impl fmt::Display for NonAffineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// The construct that prevented affine extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonAffineErrorKind {
    /// Product of two non-constant subexpressions
    Product,
    /// Division by a non-constant expression
    NonConstantDivisor,
    /// Division by zero
    DivisionByZero,
    /// Operator with no affine meaning (e.g. modulo)
    UnsupportedOperator,
    /// Array access nested inside a subscript
    NestedAccess,
}

/// Failure of a dependence test.
///
/// Raised when an access pair (and therefore the statement list it belongs
/// to) cannot be analyzed. Callers treat this as "the transformation must be
/// rejected", never as "no dependence".
#[derive(Error, Debug, Clone)]
pub struct DependenceTestFailure {
    /// The error message
    pub message: String,
    /// Source line of the offending access, where known
    pub line: Option<u32>,
    /// The kind of failure
    pub kind: FailureKind,
    /// The affine-extraction error that triggered the failure, if any
    pub source: Option<NonAffineError>,
}

impl fmt::Display for DependenceTestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {})", self.message, line),
            None => write!(f, "{}", self.message),
        }
    }
}

/// The kind of dependence-test failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A subscript could not be reduced to affine form
    NonAffine,
    /// A statement writes to an enclosing loop's index variable
    WritesIndex,
    /// Unsupported statement or loop form
    Unsupported,
}

impl DependenceTestFailure {
    /// Failure for an unsupported statement or loop form.
    pub fn unsupported(message: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            message: message.into(),
            line,
            kind: FailureKind::Unsupported,
            source: None,
        }
    }

    /// Failure for a write to an enclosing loop's index variable.
    pub fn writes_index(variable: &str, line: u32) -> Self {
        Self {
            message: format!("write to loop index variable '{}'", variable),
            line: Some(line),
            kind: FailureKind::WritesIndex,
            source: None,
        }
    }

    /// Attach the source line of the offending access.
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl From<NonAffineError> for DependenceTestFailure {
    fn from(err: NonAffineError) -> Self {
        Self {
            message: format!("non-affine subscript: {}", err.message),
            line: None,
            kind: FailureKind::NonAffine,
            source: Some(err),
        }
    }
}

/// Invariant violation in a dependence system or constraint matrix.
///
/// Raised by the builders before the eliminator ever runs; well-formed input
/// can never produce one.
#[derive(Error, Debug, Clone)]
pub struct InvalidSystemError {
    /// The error message
    pub message: String,
    /// The kind of invariant violation
    pub kind: InvalidSystemKind,
}

impl fmt::Display for InvalidSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// The kind of system invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSystemKind {
    /// A row's length does not match the matrix width
    RaggedRow,
    /// A row index is out of range
    RowIndex,
    /// Lower- and upper-bound counts disagree
    MismatchedBounds,
    /// Write- and read-side subscript dimension counts disagree
    MismatchedSubscripts,
    /// Direction vector length does not match the nest depth
    DirectionLength,
}

/// Result type using AnalysisError.
pub type DepResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let err = DependenceTestFailure {
            message: "non-affine subscript: product of variables".to_string(),
            line: Some(12),
            kind: FailureKind::NonAffine,
            source: None,
        };
        let s = format!("{}", err);
        assert!(s.contains("non-affine"));
        assert!(s.contains("line 12"));
    }

    #[test]
    fn test_non_affine_conversion() {
        let inner = NonAffineError {
            message: "product of variables".to_string(),
            kind: NonAffineErrorKind::Product,
        };
        let failure: DependenceTestFailure = inner.into();
        assert_eq!(failure.kind, FailureKind::NonAffine);
        assert!(failure.source.is_some());
    }

    #[test]
    fn test_top_level_conversion() {
        let err: AnalysisError = InvalidSystemError {
            message: "row has 3 entries, expected 5".to_string(),
            kind: InvalidSystemKind::RaggedRow,
        }
        .into();
        assert!(format!("{}", err).contains("Invalid dependence system"));
    }
}
