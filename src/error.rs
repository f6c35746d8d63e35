// src/error.rs
use std::fmt;

/// Custom error types for the fast-pricer library
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Invalid model or spec parameter values
    InvalidParameter {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Risk-neutral up-move probability fell outside (0, 1)
    DegenerateLattice { prob_up: f64 },

    /// Malformed or disallowed payoff expression, detected at compile time
    ParseError { message: String, position: usize },

    /// Runtime failure evaluating a compiled payoff expression.
    ///
    /// `path` carries the index of the offending simulation path when the
    /// error surfaced inside a Monte Carlo run.
    EvaluationError {
        reason: String,
        path: Option<usize>,
    },

    /// Unrecognized option kind string (expected "call" or "put")
    UnsupportedOptionKind(String),

    /// Unrecognized exercise style string (expected "european" or "american")
    UnsupportedExercise(String),

    /// Numerical instability in an aggregate (non-finite or negative variance)
    NumericalInstability { method: String, reason: String },
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidParameter {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            PricingError::DegenerateLattice { prob_up } => {
                write!(
                    f,
                    "Degenerate lattice: risk-neutral probability {} is outside (0, 1); \
                     increase steps or adjust rate/volatility",
                    prob_up
                )
            }
            PricingError::ParseError { message, position } => {
                write!(
                    f,
                    "Payoff expression error at byte {}: {}",
                    position, message
                )
            }
            PricingError::EvaluationError { reason, path } => match path {
                Some(idx) => write!(f, "Payoff evaluation failed on path {}: {}", idx, reason),
                None => write!(f, "Payoff evaluation failed: {}", reason),
            },
            PricingError::UnsupportedOptionKind(kind) => {
                write!(
                    f,
                    "Unsupported option kind '{}' (expected \"call\" or \"put\")",
                    kind
                )
            }
            PricingError::UnsupportedExercise(style) => {
                write!(
                    f,
                    "Unsupported exercise style '{}' (expected \"european\" or \"american\")",
                    style
                )
            }
            PricingError::NumericalInstability { method, reason } => {
                write!(f, "Numerical instability in {}: {}", method, reason)
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// Result type alias for fast-pricer operations
pub type PricerResult<T> = Result<T, PricingError>;

/// Validation utilities
pub mod validation {
    use super::{PricerResult, PricingError};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> PricerResult<()> {
        if value > 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(PricingError::InvalidParameter {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        }
    }

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> PricerResult<()> {
        if value >= 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(PricingError::InvalidParameter {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> PricerResult<()> {
        if !value.is_finite() {
            Err(PricingError::InvalidParameter {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate paths count
    pub fn validate_paths(paths: usize) -> PricerResult<()> {
        if paths == 0 {
            Err(PricingError::InvalidParameter {
                parameter: "paths".to_string(),
                value: 0.0,
                constraint: "must be at least 1".to_string(),
            })
        } else if paths > 1_000_000_000 {
            Err(PricingError::InvalidParameter {
                parameter: "paths".to_string(),
                value: paths as f64,
                constraint: "exceeds maximum allowed (1 billion)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate steps count
    pub fn validate_steps(steps: usize) -> PricerResult<()> {
        if steps == 0 {
            Err(PricingError::InvalidParameter {
                parameter: "steps".to_string(),
                value: 0.0,
                constraint: "must be at least 1".to_string(),
            })
        } else if steps > 100_000 {
            Err(PricingError::InvalidParameter {
                parameter: "steps".to_string(),
                value: steps as f64,
                constraint: "exceeds maximum allowed (100,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("spot", 100.0).is_ok());
        assert!(validate_positive("spot", 0.0).is_err());
        assert!(validate_positive("spot", -5.0).is_err());
        assert!(validate_positive("spot", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("volatility", 0.0).is_ok());
        assert!(validate_non_negative("volatility", 0.2).is_ok());
        assert!(validate_non_negative("volatility", -0.1).is_err());
        assert!(validate_non_negative("volatility", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("rate", 0.05).is_ok());
        assert!(validate_finite("rate", -0.01).is_ok());
        assert!(validate_finite("rate", f64::NAN).is_err());
        assert!(validate_finite("rate", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_counts() {
        assert!(validate_steps(1).is_ok());
        assert!(validate_steps(0).is_err());
        assert!(validate_steps(200_000).is_err());
        assert!(validate_paths(1).is_ok());
        assert!(validate_paths(0).is_err());
    }

    #[test]
    fn test_error_display() {
        let error = PricingError::InvalidParameter {
            parameter: "strike".to_string(),
            value: -5.0,
            constraint: "must be positive".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("strike"));
        assert!(display.contains("-5"));
        assert!(display.contains("positive"));
    }

    #[test]
    fn test_degenerate_lattice_display() {
        let error = PricingError::DegenerateLattice { prob_up: 1.25 };
        let display = format!("{}", error);
        assert!(display.contains("1.25"));
        assert!(display.contains("(0, 1)"));
    }

    #[test]
    fn test_evaluation_error_carries_path_index() {
        let error = PricingError::EvaluationError {
            reason: "division by zero".to_string(),
            path: Some(17),
        };
        let display = format!("{}", error);
        assert!(display.contains("path 17"));
        assert!(display.contains("division by zero"));
    }
}
