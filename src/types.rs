//! Value types shared across the pricing pipeline.
//!
//! Everything here is plain data: no identity, constructed fresh for each
//! `price()` call and dropped when it returns.

use serde::{Deserialize, Serialize};

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    Call,
    Put,
}

/// Rate regime as classified from `(r, q, kind)`. See `classifier::classify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateRegime {
    /// Ordinary free-boundary problem with one exercise frontier.
    Standard,
    /// A single exercise frontier persists under negative rates.
    SingleBoundaryNegative,
    /// Two exercise frontiers bracket a continuation region.
    DoubleBoundary,
}

/// Always `FiniteDifference` — kept as a field (rather than hard-coded)
/// so `PricingResult` stays self-describing if a second solver is ever
/// added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingMethod {
    FiniteDifference,
}

/// Result of a pricing call.
///
/// `early_exercise_premium` is only populated by
/// [`crate::engine::PricingEngine::price_with_details`] — the cheaper
/// `price()`/Greek entry points leave it `None` rather than paying for an
/// extra European solve nobody asked for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
    pub regime: RateRegime,
    pub method: PricingMethod,
    pub early_exercise_premium: Option<f64>,
}

impl OptionKind {
    /// `max(S - K, 0)` for calls, `max(K - S, 0)` for puts.
    #[inline]
    pub fn intrinsic(self, s: f64, k: f64) -> f64 {
        match self {
            OptionKind::Call => (s - k).max(0.0),
            OptionKind::Put => (k - s).max(0.0),
        }
    }
}
