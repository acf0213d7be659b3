//! Error type for the column stepping engine.
//!
//! Every variant signals a programming or configuration error rather than a
//! transient fault, so nothing here is retried: the caller gets the error
//! back from the first operation that detects it.

use thiserror::Error;

use crate::params::ParameterError;
use crate::types::Material;

/// Errors raised by layer and cell updates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnError {
    /// A scalar input outside its allowed range (negative duration,
    /// negative surface concentration, negative depth, ...).
    #[error("{name} must be {expected}, got {value}")]
    InvalidRange {
        name: &'static str,
        expected: &'static str,
        value: f64,
    },

    /// A depth interval that is negative or not ascending.
    #[error("invalid depth interval ({top}, {bottom}): expected 0 <= top <= bottom")]
    InvalidInterval { top: f64, bottom: f64 },

    /// Erosion requested for a layer is larger than what the layer holds.
    ///
    /// The cell clamps erosion per layer and carries the remainder down, so
    /// seeing this from [`crate::column::Cell::advance`] indicates a bug.
    #[error("erosion of {erosion} cm exceeds layer depth of {depth} cm")]
    ErosionExceedsDepth { erosion: f64, depth: f64 },

    /// A stock went negative after a flux was applied.
    #[error("{material} stock became negative ({value} g)")]
    NegativeStock { material: Material, value: f64 },

    /// A sub-step longer than the sediment loss rates allow.
    #[error(
        "sub-step of {step} yr exceeds the {limit} yr limit set by the sediment loss rates; \
         use at least {sub_steps} sub-steps"
    )]
    StepTooLong {
        step: f64,
        limit: f64,
        sub_steps: usize,
    },

    /// A cell was advanced with zero sub-steps.
    #[error("sub_steps must be at least 1")]
    NoSubSteps,

    /// A cell was built from an inconsistent parameter set.
    #[error(transparent)]
    InvalidParameters(#[from] ParameterError),
}

impl ColumnError {
    /// Fails with [`ColumnError::InvalidRange`] when `value` is not finite.
    pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::InvalidRange {
                name,
                expected: "finite",
                value,
            })
        }
    }

    /// Fails with [`ColumnError::InvalidRange`] when `value` is negative or NaN.
    pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<f64, Self> {
        if value >= 0.0 {
            Ok(value)
        } else {
            Err(Self::InvalidRange {
                name,
                expected: "non-negative",
                value,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_non_negative() {
        assert_eq!(ColumnError::check_non_negative("years", 0.0), Ok(0.0));
        assert_eq!(ColumnError::check_non_negative("years", 2.5), Ok(2.5));
        assert!(ColumnError::check_non_negative("years", -1.0).is_err());
        assert!(ColumnError::check_non_negative("years", f64::NAN).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = ColumnError::ErosionExceedsDepth {
            erosion: 3.0,
            depth: 2.0,
        };
        assert!(err.to_string().contains("exceeds layer depth"));

        let err = ColumnError::InvalidRange {
            name: "duration",
            expected: "non-negative",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "duration must be non-negative, got -1");
    }
}
