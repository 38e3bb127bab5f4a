//! Payoff & Boundary Provider (C3) — terminal payoff and regime-aware
//! spatial boundary conditions (§4.3).

use crate::types::{OptionKind, RateRegime};

/// Terminal payoff at `t = tau` on every spot node.
pub fn terminal_payoff(kind: OptionKind, spot_nodes: &[f64], k: f64) -> Vec<f64> {
    spot_nodes.iter().map(|&s| kind.intrinsic(s, k)).collect()
}

/// Spatial boundary value at `S_min`, at time-to-expiry `u = tau - t`.
///
/// Negative-rate regimes (`SingleBoundaryNegative`, `DoubleBoundary`) clamp
/// to the intrinsic floor: the discounted analytical boundary can
/// undershoot the exercise payoff there, which would otherwise violate
/// `price >= intrinsic` right at the edge of the domain (§4.3).
pub fn lower_boundary(
    kind: OptionKind,
    regime: RateRegime,
    s_min: f64,
    k: f64,
    r: f64,
    q: f64,
    u: f64,
) -> f64 {
    let intrinsic = kind.intrinsic(s_min, k);
    let value = match kind {
        OptionKind::Call => 0.0,
        OptionKind::Put => match regime {
            RateRegime::DoubleBoundary => k - s_min,
            RateRegime::Standard | RateRegime::SingleBoundaryNegative => {
                k * (-r * u).exp() - s_min * (-q * u).exp()
            }
        },
    };
    value.max(intrinsic)
}

/// Spatial boundary value at `S_max`, at time-to-expiry `u = tau - t`.
pub fn upper_boundary(
    kind: OptionKind,
    regime: RateRegime,
    s_max: f64,
    k: f64,
    r: f64,
    q: f64,
    u: f64,
) -> f64 {
    let intrinsic = kind.intrinsic(s_max, k);
    let value = match kind {
        OptionKind::Call => match regime {
            RateRegime::DoubleBoundary => s_max - k,
            RateRegime::Standard | RateRegime::SingleBoundaryNegative => {
                s_max * (-q * u).exp() - k * (-r * u).exp()
            }
        },
        OptionKind::Put => 0.0,
    };
    value.max(intrinsic)
}
