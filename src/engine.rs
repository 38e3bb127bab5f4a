//! `PricingEngine` — the single call-site the rest of the system sees
//! (§2, §6): `price`, `delta`, `gamma`, `vega`, `theta`, `rho`,
//! `price_with_details`, and the supplemented `exercise_boundary` query
//! (`SPEC_FULL.md` F.1).

use rayon::join;
use tracing::debug;

use crate::black_scholes::european_price;
use crate::boundary::terminal_payoff;
use crate::classifier::classify;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, ValidationBuilder};
use crate::greeks::delta_gamma;
use crate::grid::{build_grid, Grid, MAX_LOG_MONEYNESS, SIGMA_MAX, SIGMA_MIN, TAU_MAX};
use crate::interp::interpolate;
use crate::stepper::{step_backward, ValueGrid};
use crate::types::{OptionKind, PricingMethod, PricingResult, RateRegime};

/// Vega bump, one vol point (§4.5).
const VEGA_BUMP: f64 = 0.01;
/// Theta bump, one calendar day.
const THETA_BUMP: f64 = 1.0 / 365.0;
/// Rho bump, one basis point.
const RHO_BUMP: f64 = 1e-4;

/// Immutable, `Copy`, safely shared across threads (§5) — the engine holds
/// nothing but its configuration between calls.
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine {
    config: EngineConfig,
}

impl PricingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// `DoubleBoundary` regimes widen the far-field multiplier so both
    /// exercise frontiers sit well inside the domain (§4.4.3).
    fn far_field_k(&self, regime: RateRegime) -> f64 {
        match regime {
            RateRegime::DoubleBoundary => self.config.far_field_k.max(4.0),
            RateRegime::Standard | RateRegime::SingleBoundaryNegative => self.config.far_field_k,
        }
    }

    fn validate(&self, s: f64, k: f64, tau: f64, r: f64, q: f64, sigma: f64) -> EngineResult<()> {
        ValidationBuilder::new()
            .check_positive(s, "S")
            .check_positive(k, "K")
            .check_non_negative(tau, "tau")
            .check_positive(sigma, "sigma")
            .check_finite(r, "r")
            .check_finite(q, "q")
            .build()?;

        ValidationBuilder::new()
            .check_range(sigma, SIGMA_MIN, SIGMA_MAX, "sigma")
            .check_range(tau, 0.0, TAU_MAX, "tau")
            .build()?;

        if tau > 0.0 {
            let log_moneyness = (k / s).ln().abs();
            if log_moneyness > MAX_LOG_MONEYNESS {
                return Err(EngineError::OutOfBounds {
                    name: "ln(K/S)".to_string(),
                    value: log_moneyness.to_string(),
                    reason: format!("must satisfy |ln(K/S)| <= {MAX_LOG_MONEYNESS}"),
                });
            }
        }
        Ok(())
    }

    /// Classify, build the grid, and sweep. Shared by `price()` and every
    /// Greek re-solve so the pipeline order (C1 -> C2 -> C3 -> C4) only
    /// lives in one place.
    fn solve(
        &self,
        s: f64,
        k: f64,
        tau: f64,
        r: f64,
        q: f64,
        sigma: f64,
        kind: OptionKind,
    ) -> EngineResult<(Grid, RateRegime, ValueGrid)> {
        self.validate(s, k, tau, r, q, sigma)?;
        let regime = classify(r, q, kind)?;
        debug!(?regime, n_s = self.config.spot_steps, n_t = self.config.time_steps, "regime classified");
        let grid = build_grid(s, k, tau, sigma, &self.config, self.far_field_k(regime))?;
        let values = step_backward(&grid, &self.config, k, kind, regime, r, q, sigma)?;
        Ok((grid, regime, values))
    }

    /// `price(S, K, tau, r, q, sigma, kind) -> value` (§6).
    pub fn price(
        &self,
        s: f64,
        k: f64,
        tau: f64,
        r: f64,
        q: f64,
        sigma: f64,
        kind: OptionKind,
    ) -> EngineResult<f64> {
        if tau <= 0.0 {
            self.validate(s, k, tau, r, q, sigma)?;
            return Ok(kind.intrinsic(s, k));
        }
        let (grid, _, values) = self.solve(s, k, tau, r, q, sigma, kind)?;
        let price = interpolate(&grid.spot_nodes, &values, s);
        Ok(price.max(kind.intrinsic(s, k)))
    }

    pub fn delta(&self, s: f64, k: f64, tau: f64, r: f64, q: f64, sigma: f64, kind: OptionKind) -> EngineResult<f64> {
        if tau <= 0.0 {
            self.validate(s, k, tau, r, q, sigma)?;
            return Ok(intrinsic_delta(kind, s, k));
        }
        let (grid, _, values) = self.solve(s, k, tau, r, q, sigma, kind)?;
        let (delta, _) = delta_gamma(&grid.spot_nodes, &values, s);
        Ok(delta)
    }

    pub fn gamma(&self, s: f64, k: f64, tau: f64, r: f64, q: f64, sigma: f64, kind: OptionKind) -> EngineResult<f64> {
        if tau <= 0.0 {
            self.validate(s, k, tau, r, q, sigma)?;
            return Ok(0.0);
        }
        let (grid, _, values) = self.solve(s, k, tau, r, q, sigma, kind)?;
        let (_, gamma) = delta_gamma(&grid.spot_nodes, &values, s);
        Ok(gamma)
    }

    /// Central difference in `sigma`, `h = 0.01`, two full re-solves run
    /// concurrently — they are independent, so no ordering or locking is
    /// needed (§4.5, §5).
    pub fn vega(&self, s: f64, k: f64, tau: f64, r: f64, q: f64, sigma: f64, kind: OptionKind) -> EngineResult<f64> {
        if tau <= 0.0 {
            self.validate(s, k, tau, r, q, sigma)?;
            return Ok(0.0);
        }
        let (up, down) = join(
            || self.price(s, k, tau, r, q, sigma + VEGA_BUMP, kind),
            || self.price(s, k, tau, r, q, sigma - VEGA_BUMP, kind),
        );
        Ok((up? - down?) / (2.0 * VEGA_BUMP))
    }

    /// One-sided forward difference `(V(tau - h) - V(tau)) / h` (§4.5):
    /// this is `dV/d(tau)`, i.e. time-to-expiry decreasing as calendar
    /// time passes, the conventional sign (decay shows up negative).
    pub fn theta(&self, s: f64, k: f64, tau: f64, r: f64, q: f64, sigma: f64, kind: OptionKind) -> EngineResult<f64> {
        if tau <= 0.0 {
            self.validate(s, k, tau, r, q, sigma)?;
            return Ok(0.0);
        }
        let base = self.price(s, k, tau, r, q, sigma, kind)?;
        let bumped = self.price(s, k, (tau - THETA_BUMP).max(0.0), r, q, sigma, kind)?;
        Ok((bumped - base) / THETA_BUMP)
    }

    /// Central difference in `r`, `h = 1e-4`, run concurrently.
    pub fn rho(&self, s: f64, k: f64, tau: f64, r: f64, q: f64, sigma: f64, kind: OptionKind) -> EngineResult<f64> {
        if tau <= 0.0 {
            self.validate(s, k, tau, r, q, sigma)?;
            return Ok(0.0);
        }
        let (up, down) = join(
            || self.price(s, k, tau, r + RHO_BUMP, q, sigma, kind),
            || self.price(s, k, tau, r - RHO_BUMP, q, sigma, kind),
        );
        Ok((up? - down?) / (2.0 * RHO_BUMP))
    }

    /// Price plus every Greek, the classified regime, and the
    /// early-exercise premium over the European reference (§6).
    pub fn price_with_details(
        &self,
        s: f64,
        k: f64,
        tau: f64,
        r: f64,
        q: f64,
        sigma: f64,
        kind: OptionKind,
    ) -> EngineResult<PricingResult> {
        if tau <= 0.0 {
            self.validate(s, k, tau, r, q, sigma)?;
            let regime = classify(r, q, kind)?;
            return Ok(PricingResult {
                price: kind.intrinsic(s, k),
                delta: intrinsic_delta(kind, s, k),
                gamma: 0.0,
                vega: 0.0,
                theta: 0.0,
                rho: 0.0,
                regime,
                method: PricingMethod::FiniteDifference,
                early_exercise_premium: Some(0.0),
            });
        }

        let (grid, regime, values) = self.solve(s, k, tau, r, q, sigma, kind)?;
        let price = interpolate(&grid.spot_nodes, &values, s).max(kind.intrinsic(s, k));
        let (delta, gamma) = delta_gamma(&grid.spot_nodes, &values, s);
        let vega = self.vega(s, k, tau, r, q, sigma, kind)?;
        let theta = self.theta(s, k, tau, r, q, sigma, kind)?;
        let rho = self.rho(s, k, tau, r, q, sigma, kind)?;
        let european = european_price(kind, s, k, tau, r, q, sigma);

        Ok(PricingResult {
            price,
            delta,
            gamma,
            vega,
            theta,
            rho,
            regime,
            method: PricingMethod::FiniteDifference,
            early_exercise_premium: Some(price - european),
        })
    }

    /// Supplemented feature (`SPEC_FULL.md` F.1): the spot price at which
    /// the Bermudan projection first binds at the final time slice,
    /// nearest `S0`. `None` when no node on the grid is in the exercise
    /// region (e.g. a non-dividend call, where early exercise is never
    /// optimal).
    pub fn exercise_boundary(
        &self,
        s: f64,
        k: f64,
        tau: f64,
        r: f64,
        q: f64,
        sigma: f64,
        kind: OptionKind,
    ) -> EngineResult<Option<f64>> {
        if tau <= 0.0 {
            self.validate(s, k, tau, r, q, sigma)?;
            return Ok(Some(k));
        }
        let (grid, _, values) = self.solve(s, k, tau, r, q, sigma, kind)?;
        let payoff = terminal_payoff(kind, &grid.spot_nodes, k);
        Ok(nearest_exercise_boundary(&grid.spot_nodes, &values, &payoff, s))
    }
}

fn intrinsic_delta(kind: OptionKind, s: f64, k: f64) -> f64 {
    match kind {
        OptionKind::Call if s > k => 1.0,
        OptionKind::Call => 0.0,
        OptionKind::Put if s < k => -1.0,
        OptionKind::Put => 0.0,
    }
}

/// Scan outward from the node nearest `s0` for the first node where the
/// projected value is (within tolerance) equal to the intrinsic payoff,
/// and return the midpoint between that node and its continuation-side
/// neighbour as the grid-implied trigger price.
fn nearest_exercise_boundary(spot_nodes: &[f64], values: &[f64], payoff: &[f64], s0: f64) -> Option<f64> {
    let is_exercised = |i: usize| payoff[i] > 0.0 && (values[i] - payoff[i]).abs() <= 1e-6 * payoff[i].max(1.0);

    let i0 = spot_nodes.partition_point(|&s| s < s0).min(spot_nodes.len() - 1);

    let left = (0..=i0).rev().find(|&i| is_exercised(i)).map(|i| {
        let j = (i + 1).min(spot_nodes.len() - 1);
        0.5 * (spot_nodes[i] + spot_nodes[j])
    });
    let right = (i0..spot_nodes.len()).find(|&i| is_exercised(i)).map(|i| {
        let j = i.saturating_sub(1);
        0.5 * (spot_nodes[j] + spot_nodes[i])
    });

    match (left, right) {
        (Some(l), Some(r)) => Some(if (s0 - l).abs() <= (r - s0).abs() { l } else { r }),
        (Some(l), None) => Some(l),
        (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn engine() -> PricingEngine {
        PricingEngine::new(EngineConfig::default())
    }

    #[test]
    fn price_is_at_least_intrinsic() {
        let e = engine();
        let p = e.price(150.0, 100.0, 0.5, 0.05, 0.02, 0.2, OptionKind::Call).unwrap();
        assert!(p >= (150.0_f64 - 100.0).max(0.0) - 1e-6);
    }

    #[test]
    fn american_at_least_european_for_dividend_put() {
        let e = engine();
        let american = e.price(100.0, 100.0, 1.0, 0.05, 0.0, 0.25, OptionKind::Put).unwrap();
        let european = european_price(OptionKind::Put, 100.0, 100.0, 1.0, 0.05, 0.0, 0.25);
        assert!(american >= european - 1e-3);
    }

    #[test]
    fn non_dividend_american_call_matches_european() {
        let e = engine();
        let american = e.price(100.0, 100.0, 0.5, 0.05, 0.0, 0.2, OptionKind::Call).unwrap();
        let european = european_price(OptionKind::Call, 100.0, 100.0, 0.5, 0.05, 0.0, 0.2);
        assert_relative_eq!(american, european, max_relative = 0.05);
    }

    #[test]
    fn tau_zero_short_circuits() {
        let e = engine();
        let result = e.price_with_details(110.0, 100.0, 0.0, 0.05, 0.02, 0.2, OptionKind::Call).unwrap();
        assert_eq!(result.price, 10.0);
        assert_eq!(result.delta, 1.0);
        assert_eq!(result.gamma, 0.0);
        assert_eq!(result.vega, 0.0);
        assert_eq!(result.theta, 0.0);
        assert_eq!(result.rho, 0.0);
    }

    #[test]
    fn delta_bounds_hold() {
        let e = engine();
        let call_delta = e.delta(100.0, 100.0, 0.5, 0.05, 0.02, 0.2, OptionKind::Call).unwrap();
        assert!((0.0..=1.0).contains(&call_delta));
        let put_delta = e.delta(100.0, 100.0, 0.5, 0.05, 0.02, 0.2, OptionKind::Put).unwrap();
        assert!((-1.0..=0.0).contains(&put_delta));
    }

    #[test]
    fn vega_is_non_negative() {
        let e = engine();
        let v = e.vega(100.0, 100.0, 0.5, 0.05, 0.02, 0.2, OptionKind::Put).unwrap();
        assert!(v >= -1e-6);
    }

    #[test]
    fn rejects_nan_inputs() {
        let e = engine();
        assert!(matches!(
            e.price(f64::NAN, 100.0, 0.5, 0.05, 0.02, 0.2, OptionKind::Call),
            Err(EngineError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn deep_dividend_call_exercise_boundary_exists() {
        let e = engine();
        let boundary = e
            .exercise_boundary(100.0, 100.0, 1.0, 0.05, 0.08, 0.2, OptionKind::Call)
            .unwrap();
        assert!(boundary.is_some());
    }
}
