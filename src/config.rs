//! Engine configuration (immutable after construction).

use crate::error::{EngineResult, ValidationBuilder};

/// Tunables for the finite-difference engine. Immutable once built, `Copy`,
/// and safely shared across threads — there is no interior mutability here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Number of time steps, `N_t >= 10`.
    pub time_steps: usize,
    /// Number of spatial (spot) steps, `N_s >= 20`.
    pub spot_steps: usize,
    /// Sinh-grid concentration parameter, `c > 0`. Smaller values cluster
    /// nodes more tightly around the strike.
    pub grid_concentration: f64,
    /// Far-field multiplier `k` used to size `[S_min, S_max]` (`§4.2`).
    /// `k >= 3` for `Standard`/`SingleBoundaryNegative`; `DoubleBoundary`
    /// wants `k >= 4` so both frontiers sit well inside the domain.
    pub far_field_k: f64,
    /// Number of initial fully-implicit (Rannacher) steps used to damp
    /// the non-smooth terminal payoff before switching to Crank-Nicolson.
    pub rannacher_steps: usize,
}

impl EngineConfig {
    /// Construct a validated configuration.
    pub fn new(
        time_steps: usize,
        spot_steps: usize,
        grid_concentration: f64,
    ) -> EngineResult<Self> {
        Self::with_far_field(time_steps, spot_steps, grid_concentration, 3.0, 2)
    }

    /// Construct a validated configuration with explicit far-field
    /// multiplier and Rannacher-step count, for callers (and tests) that
    /// need to pin the grid-construction heuristics of `§9`.
    pub fn with_far_field(
        time_steps: usize,
        spot_steps: usize,
        grid_concentration: f64,
        far_field_k: f64,
        rannacher_steps: usize,
    ) -> EngineResult<Self> {
        ValidationBuilder::new()
            .check_positive(time_steps as f64, "time_steps")
            .check_positive(spot_steps as f64, "spot_steps")
            .check_positive(grid_concentration, "grid_concentration")
            .check_positive(far_field_k, "far_field_k")
            .build()?;

        ValidationBuilder::new()
            .check_range(time_steps as f64, 10.0, f64::MAX, "time_steps")
            .check_range(spot_steps as f64, 20.0, f64::MAX, "spot_steps")
            .check_range(far_field_k, 3.0, f64::MAX, "far_field_k")
            .build()?;

        Ok(Self {
            time_steps,
            spot_steps,
            grid_concentration,
            far_field_k,
            rannacher_steps,
        })
    }
}

impl Default for EngineConfig {
    /// `N_t = 200`, `N_s = 400`, `c = 0.1` — the size this crate's
    /// latency target (`§5`, a few ms per call) and its test suite are
    /// tuned against.
    fn default() -> Self {
        Self {
            time_steps: 200,
            spot_steps: 400,
            grid_concentration: 0.1,
            far_field_k: 3.0,
            rannacher_steps: 2,
        }
    }
}
