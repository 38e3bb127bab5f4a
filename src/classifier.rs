//! Regime Classifier (C1) — maps `(r, q, option kind)` to a [`RateRegime`].

use crate::error::{EngineError, EngineResult};
use crate::types::{OptionKind, RateRegime};

/// Classify the rate regime for a given risk-free rate `r`, dividend
/// yield `q`, and option kind.
///
/// Total over finite `(r, q)`; fails with `InvalidParameter` if either
/// rate is NaN or infinite. Ties at `r == q` fall out of the table below
/// without special-casing: they land on `SingleBoundaryNegative` whenever
/// a rate is negative, `Standard` otherwise.
pub fn classify(r: f64, q: f64, kind: OptionKind) -> EngineResult<RateRegime> {
    if !r.is_finite() {
        return Err(EngineError::InvalidParameter {
            name: "r".to_string(),
            value: r.to_string(),
            reason: "must be finite".to_string(),
        });
    }
    if !q.is_finite() {
        return Err(EngineError::InvalidParameter {
            name: "q".to_string(),
            value: q.to_string(),
            reason: "must be finite".to_string(),
        });
    }

    Ok(match kind {
        OptionKind::Put => {
            if q < r && r < 0.0 {
                RateRegime::DoubleBoundary
            } else if r < 0.0 && r <= q {
                RateRegime::SingleBoundaryNegative
            } else {
                RateRegime::Standard
            }
        }
        OptionKind::Call => {
            if 0.0 < r && r < q {
                RateRegime::DoubleBoundary
            } else if r < 0.0 {
                RateRegime::SingleBoundaryNegative
            } else {
                RateRegime::Standard
            }
        }
    })
}
