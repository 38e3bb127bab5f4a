//! Grid Builder (C2) — non-uniform spot grid and uniform time grid (§3, §4.2).

use tracing::trace;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, ValidationBuilder};

/// Minimum and maximum admissible volatility, per §6.
pub const SIGMA_MIN: f64 = 0.001;
pub const SIGMA_MAX: f64 = 5.0;
/// Admissible time-to-expiry range (years) for a non-degenerate grid build.
pub const TAU_MIN: f64 = 1.0 / 252.0;
pub const TAU_MAX: f64 = 30.0;
/// Maximum admissible absolute log-moneyness, `|ln(K/S)|`.
pub const MAX_LOG_MONEYNESS: f64 = 3.0;

/// A non-uniform spatial grid in underlying price, plus a uniform temporal
/// grid, produced for one `price()` call and discarded when it returns.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Strictly increasing spot nodes spanning `[S_min, S_max]`. The strike
    /// is always present as one of the nodes (§3: "the strike K lies
    /// strictly interior to the spot range", §4.2: "the node coincident
    /// with K must exist").
    pub spot_nodes: Vec<f64>,
    /// `N_t + 1` equally spaced points from `0` to `tau`.
    pub time_grid: Vec<f64>,
    /// Uniform per-step time increment, `tau / N_t`.
    pub dt: f64,
    /// Index of the strike node within `spot_nodes`.
    pub strike_index: usize,
}

impl Grid {
    pub fn n_s(&self) -> usize {
        self.spot_nodes.len() - 1
    }

    pub fn s_min(&self) -> f64 {
        self.spot_nodes[0]
    }

    pub fn s_max(&self) -> f64 {
        *self.spot_nodes.last().expect("grid always has >= 2 nodes")
    }
}

/// Validate the inputs to `build_grid` against §4.2's admissible ranges.
fn validate_inputs(s0: f64, k: f64, tau: f64, sigma: f64) -> EngineResult<()> {
    ValidationBuilder::new()
        .check_positive(s0, "S")
        .check_positive(k, "K")
        .check_positive(tau, "tau")
        .check_positive(sigma, "sigma")
        .build()?;

    ValidationBuilder::new()
        .check_range(sigma, SIGMA_MIN, SIGMA_MAX, "sigma")
        .check_range(tau, TAU_MIN, TAU_MAX, "tau")
        .build()?;

    let log_moneyness = (k / s0).ln().abs();
    if log_moneyness > MAX_LOG_MONEYNESS {
        return Err(EngineError::OutOfBounds {
            name: "ln(K/S)".to_string(),
            value: log_moneyness.to_string(),
            reason: format!("must satisfy |ln(K/S)| <= {MAX_LOG_MONEYNESS}"),
        });
    }
    Ok(())
}

/// Build the spatial and temporal grids for one pricing call.
///
/// `far_field_k` is `EngineConfig::far_field_k`, possibly widened by the
/// caller for `DoubleBoundary` regimes (§4.4.3: "stricter grid bounds
/// (k >= 4) may be required so both frontiers sit well inside the
/// domain").
pub fn build_grid(
    s0: f64,
    k: f64,
    tau: f64,
    sigma: f64,
    config: &EngineConfig,
    far_field_k: f64,
) -> EngineResult<Grid> {
    validate_inputs(s0, k, tau, sigma)?;

    let spread = far_field_k * sigma * tau.sqrt() + 2.0;
    let s_max = k * spread.exp();
    let s_min = k * (-spread).exp();

    let spot_nodes = sinh_concentrated_nodes(s_min, s_max, k, config.spot_steps, config.grid_concentration)?;
    let strike_index = locate_strike(&spot_nodes, k);

    let n_t = config.time_steps;
    let dt = tau / n_t as f64;
    let time_grid: Vec<f64> = (0..=n_t).map(|i| i as f64 * dt).collect();

    trace!(n_s = spot_nodes.len() - 1, n_t, s_min, s_max, "grid built");

    Ok(Grid {
        spot_nodes,
        time_grid,
        dt,
        strike_index,
    })
}

/// Tavella-Randall sinh transform: `N_s + 1` nodes uniform in a latent
/// variable `xi in [0, 1]` are mapped through `x(xi) = K + alpha . sinh(c1
/// (1 - xi) + c2 . xi)`, with `c1 = asinh((S_min - K) / alpha)` and `c2 =
/// asinh((S_max - K) / alpha)`. This hits `x(0) = S_min` and `x(1) =
/// S_max` exactly by construction; `alpha` (the configured
/// `grid_concentration`) controls how tightly nodes cluster near `K` —
/// smaller `alpha` clusters more tightly.
///
/// The strike itself generally does not land on a uniform `xi` node, so it
/// is inserted explicitly and the array re-sorted (§4.2).
fn sinh_concentrated_nodes(
    s_min: f64,
    s_max: f64,
    k: f64,
    n_s: usize,
    alpha: f64,
) -> EngineResult<Vec<f64>> {
    let c1 = ((s_min - k) / alpha).asinh();
    let c2 = ((s_max - k) / alpha).asinh();

    let mut nodes: Vec<f64> = (0..=n_s)
        .map(|i| {
            let xi = i as f64 / n_s as f64;
            k + alpha * (c1 * (1.0 - xi) + c2 * xi).sinh()
        })
        .collect();

    // Floating point round-trip through asinh/sinh can miss the exact
    // endpoints by a few ULPs; pin them so `Grid::s_min`/`s_max` are exact.
    nodes[0] = s_min;
    *nodes.last_mut().expect("n_s >= 1") = s_max;

    insert_strike(&mut nodes, k);

    for w in nodes.windows(2) {
        if !(w[1] > w[0]) {
            return Err(EngineError::NumericalBreakdown(
                "grid construction produced non-increasing spot nodes".to_string(),
            ));
        }
    }

    Ok(nodes)
}

/// Insert `k` into the sorted `nodes` unless a node within relative
/// tolerance already occupies that slot.
fn insert_strike(nodes: &mut Vec<f64>, k: f64) {
    const REL_TOL: f64 = 1e-9;
    let pos = nodes.partition_point(|&x| x < k);
    if let Some(&nearby) = nodes.get(pos) {
        if (nearby - k).abs() <= REL_TOL * k {
            return;
        }
    }
    if pos > 0 && (nodes[pos - 1] - k).abs() <= REL_TOL * k {
        return;
    }
    nodes.insert(pos, k);
}

fn locate_strike(nodes: &[f64], k: f64) -> usize {
    nodes
        .iter()
        .position(|&x| (x - k).abs() <= 1e-6 * k.abs().max(1.0))
        .expect("insert_strike guarantees K is present in the node array")
}
