//! Core error types for the pricing engine.

use thiserror::Error;

/// Core error type for the pricing engine.
///
/// Mirrors the three-way taxonomy the engine is specified against: bad
/// caller input, input outside the validated numerical ranges, and a
/// solver that produced a non-finite or otherwise unusable intermediate.
/// None of these are recovered internally — they propagate to the caller
/// unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("out of bounds: {name} = {value}, {reason}")]
    OutOfBounds {
        name: String,
        value: String,
        reason: String,
    },

    #[error("numerical breakdown: {0}")]
    NumericalBreakdown(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Collects parameter violations from a chain of checks and turns them
/// into a single `InvalidParameter`/`OutOfBounds` error at the end, so
/// validation call sites stay linear instead of bailing on the first
/// failed check.
#[derive(Default)]
pub struct ValidationBuilder {
    errors: Vec<(String, String, String)>,
    out_of_bounds: Vec<(String, String, String)>,
}

impl ValidationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value must be finite (not NaN, not +/-infinity).
    pub fn check_finite(mut self, value: f64, name: &str) -> Self {
        if !value.is_finite() {
            self.errors.push((
                name.to_string(),
                value.to_string(),
                "must be finite".to_string(),
            ));
        }
        self
    }

    /// Value must be finite and strictly positive.
    pub fn check_positive(mut self, value: f64, name: &str) -> Self {
        if !value.is_finite() {
            self.errors.push((
                name.to_string(),
                value.to_string(),
                "must be finite".to_string(),
            ));
        } else if value <= 0.0 {
            self.errors.push((
                name.to_string(),
                value.to_string(),
                "must be positive".to_string(),
            ));
        }
        self
    }

    /// Value must be finite and non-negative.
    pub fn check_non_negative(mut self, value: f64, name: &str) -> Self {
        if !value.is_finite() {
            self.errors.push((
                name.to_string(),
                value.to_string(),
                "must be finite".to_string(),
            ));
        } else if value < 0.0 {
            self.errors.push((
                name.to_string(),
                value.to_string(),
                "must be non-negative".to_string(),
            ));
        }
        self
    }

    /// Value must fall in `[min, max]`. Recorded as an out-of-bounds
    /// violation rather than an invalid-parameter one.
    pub fn check_range(mut self, value: f64, min: f64, max: f64, name: &str) -> Self {
        if !(min..=max).contains(&value) {
            self.out_of_bounds.push((
                name.to_string(),
                value.to_string(),
                format!("must be between {min} and {max}"),
            ));
        }
        self
    }

    /// Returns the first violation encountered, if any — `InvalidParameter`
    /// checks take priority over `OutOfBounds` ones so a caller always sees
    /// the more fundamental problem first (e.g. NaN before range).
    pub fn build(self) -> EngineResult<()> {
        if let Some((name, value, reason)) = self.errors.into_iter().next() {
            return Err(EngineError::InvalidParameter {
                name,
                value,
                reason,
            });
        }
        if let Some((name, value, reason)) = self.out_of_bounds.into_iter().next() {
            return Err(EngineError::OutOfBounds {
                name,
                value,
                reason,
            });
        }
        Ok(())
    }
}
