//! Time Stepper (C4) — marches the value grid backward under the
//! Black-Scholes operator with the American early-exercise constraint
//! (§4.4).

use tracing::trace;

use crate::boundary;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::grid::Grid;
use crate::thomas::TridiagonalOperator;
use crate::types::{OptionKind, RateRegime};

/// Scratch buffer holding one time slice of option values, one per spot
/// node (§3). Owned exclusively by a single `price()` invocation.
pub type ValueGrid = Vec<f64>;

/// Run the full backward sweep from the terminal payoff (`u = 0`) to
/// `u = tau` (`t = 0`), applying the Bermudan projection at every interior
/// node of every step (§4.4.2). Returns the value slice at `u = tau`.
#[allow(clippy::too_many_arguments)]
pub fn step_backward(
    grid: &Grid,
    config: &EngineConfig,
    k: f64,
    kind: OptionKind,
    regime: RateRegime,
    r: f64,
    q: f64,
    sigma: f64,
) -> EngineResult<ValueGrid> {
    let n = grid.spot_nodes.len();
    let payoff = boundary::terminal_payoff(kind, &grid.spot_nodes, k);
    let mut values = payoff.clone();

    let m = n.saturating_sub(2);
    if m == 0 {
        return Ok(values);
    }

    let (pde_lower, pde_diag, pde_upper) = pde_coefficients(&grid.spot_nodes, sigma, r, q)?;

    let n_t = grid.time_grid.len() - 1;
    for step in 0..n_t {
        let u_old = grid.time_grid[step];
        let u_new = grid.time_grid[step + 1];
        // Rannacher smoothing (§4.4.1): fully implicit for the first few
        // steps to damp the non-smooth terminal payoff, then
        // Crank-Nicolson.
        let theta = if step < config.rannacher_steps {
            1.0
        } else {
            0.5
        };

        let lo_old = boundary::lower_boundary(kind, regime, grid.s_min(), k, r, q, u_old);
        let hi_old = boundary::upper_boundary(kind, regime, grid.s_max(), k, r, q, u_old);
        let lo_new = boundary::lower_boundary(kind, regime, grid.s_min(), k, r, q, u_new);
        let hi_new = boundary::upper_boundary(kind, regime, grid.s_max(), k, r, q, u_new);
        if ![lo_old, hi_old, lo_new, hi_new].into_iter().all(f64::is_finite) {
            return Err(EngineError::NumericalBreakdown(
                "boundary evaluation produced a non-finite value".to_string(),
            ));
        }
        values[0] = lo_old;
        values[n - 1] = hi_old;

        // Explicit side `B = I + (1-theta) dt L`, built the same way as the
        // implicit `lhs` below and applied via `TridiagonalOperator::apply`
        // rather than folded into an inline loop.
        let mut explicit_op = TridiagonalOperator::zeros(m);
        for j in 0..m {
            explicit_op.diag[j] = 1.0 + (1.0 - theta) * grid.dt * pde_diag[j];
            if j > 0 {
                explicit_op.lower[j] = (1.0 - theta) * grid.dt * pde_lower[j];
            }
            if j + 1 < m {
                explicit_op.upper[j] = (1.0 - theta) * grid.dt * pde_upper[j];
            }
        }
        let mut rhs = explicit_op.apply(&values[1..=m]);
        rhs[0] += (1.0 - theta) * grid.dt * pde_lower[0] * lo_old;
        rhs[m - 1] += (1.0 - theta) * grid.dt * pde_upper[m - 1] * hi_old;
        rhs[0] += theta * grid.dt * pde_lower[0] * lo_new;
        rhs[m - 1] += theta * grid.dt * pde_upper[m - 1] * hi_new;

        let mut lhs = TridiagonalOperator::zeros(m);
        for j in 0..m {
            lhs.diag[j] = 1.0 - theta * grid.dt * pde_diag[j];
            if j > 0 {
                lhs.lower[j] = -theta * grid.dt * pde_lower[j];
            }
            if j + 1 < m {
                lhs.upper[j] = -theta * grid.dt * pde_upper[j];
            }
        }

        let continuation = lhs.solve(&rhs)?;

        values[0] = lo_new;
        values[n - 1] = hi_new;
        for j in 0..m {
            // Bermudan projection (§4.4.2): boundary nodes are set
            // directly above and never projected.
            values[j + 1] = continuation[j].max(payoff[j + 1]);
        }
    }

    trace!(n_t, n_s = n - 1, "backward sweep complete");
    Ok(values)
}

/// Non-uniform three-point central-difference coefficients of the
/// Black-Scholes operator `L V = 1/2 sigma^2 S^2 V'' + (r-q) S V' - r V` at
/// every interior node (§4.4.1). Coefficients depend only on `S_i`,
/// `sigma`, `r`, `q` and are reused across every time step.
fn pde_coefficients(
    spot_nodes: &[f64],
    sigma: f64,
    r: f64,
    q: f64,
) -> EngineResult<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let n = spot_nodes.len();
    let m = n - 2;
    let sigma2 = sigma * sigma;
    let mut lower = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut upper = vec![0.0; m];

    for j in 0..m {
        let i = j + 1;
        let s = spot_nodes[i];
        let h_m = s - spot_nodes[i - 1];
        let h_p = spot_nodes[i + 1] - s;
        let s2 = s * s;

        lower[j] = (sigma2 * s2 - (r - q) * s * h_p) / (h_m * (h_m + h_p));
        diag[j] = (-sigma2 * s2 + (r - q) * s * (h_p - h_m)) / (h_m * h_p) - r;
        upper[j] = (sigma2 * s2 + (r - q) * s * h_m) / (h_p * (h_m + h_p));
    }

    if lower.iter().chain(&diag).chain(&upper).any(|v| !v.is_finite()) {
        return Err(EngineError::NumericalBreakdown(
            "PDE coefficient computation produced a non-finite value".to_string(),
        ));
    }

    Ok((lower, diag, upper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::grid::build_grid;

    fn engine_config() -> EngineConfig {
        EngineConfig::new(200, 400, 0.1).unwrap()
    }

    #[test]
    fn atm_call_sweep_stays_non_negative_and_bounded() {
        let cfg = engine_config();
        let grid = build_grid(100.0, 100.0, 0.5, 0.2, &cfg, 3.0).unwrap();
        let regime = classify(0.05, 0.02, OptionKind::Call).unwrap();
        let values = step_backward(&grid, &cfg, 100.0, OptionKind::Call, regime, 0.05, 0.02, 0.2).unwrap();
        for (&s, &v) in grid.spot_nodes.iter().zip(values.iter()) {
            assert!(v >= -1e-9);
            assert!(v >= OptionKind::Call.intrinsic(s, 100.0) - 1e-6);
            assert!(v <= s + 1e-6);
        }
    }

    #[test]
    fn put_sweep_never_drops_below_intrinsic() {
        let cfg = engine_config();
        let grid = build_grid(100.0, 100.0, 1.0, 0.25, &cfg, 3.0).unwrap();
        let regime = classify(0.05, 0.0, OptionKind::Put).unwrap();
        let values = step_backward(&grid, &cfg, 100.0, OptionKind::Put, regime, 0.05, 0.0, 0.25).unwrap();
        for (&s, &v) in grid.spot_nodes.iter().zip(values.iter()) {
            assert!(v >= OptionKind::Put.intrinsic(s, 100.0) - 1e-6);
        }
    }

    #[test]
    fn double_boundary_put_sweep_is_finite_and_positive_near_atm() {
        let cfg = EngineConfig::with_far_field(200, 400, 0.1, 4.0, 2).unwrap();
        let grid = build_grid(100.0, 100.0, 0.25, 0.20, &cfg, 4.0).unwrap();
        let regime = classify(-0.005, -0.01, OptionKind::Put).unwrap();
        assert_eq!(regime, RateRegime::DoubleBoundary);
        let values = step_backward(&grid, &cfg, 100.0, OptionKind::Put, regime, -0.005, -0.01, 0.20).unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
        assert!(values[grid.strike_index] > 0.0);
    }
}
