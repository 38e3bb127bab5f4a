//! Greeks Extractor (C5) — Delta/Gamma by central differencing the
//! terminal value slice; Vega/Theta/Rho orchestration lives in
//! [`crate::engine`] because they require additional re-solves (§4.5).

/// Delta and Gamma at `s0`, central-differenced from the final value slice
/// across the three grid nodes bracketing `s0`, using the non-uniform
/// second-derivative stencil of §4.4.1. No re-solve required.
pub fn delta_gamma(spot_nodes: &[f64], values: &[f64], s0: f64) -> (f64, f64) {
    debug_assert_eq!(spot_nodes.len(), values.len());
    let n = spot_nodes.len();

    // Locate the interior node closest to s0 so the stencil straddles it
    // as evenly as possible.
    let i = spot_nodes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (**a - s0).abs().total_cmp(&(**b - s0).abs()))
        .map(|(idx, _)| idx)
        .unwrap_or(0)
        .clamp(1, n - 2);

    let h_m = spot_nodes[i] - spot_nodes[i - 1];
    let h_p = spot_nodes[i + 1] - spot_nodes[i];
    let (v_m, v_0, v_p) = (values[i - 1], values[i], values[i + 1]);

    let delta = -h_p / (h_m * (h_m + h_p)) * v_m + (h_p - h_m) / (h_m * h_p) * v_0
        + h_m / (h_p * (h_m + h_p)) * v_p;

    let gamma =
        2.0 / (h_m * (h_m + h_p)) * v_m - 2.0 / (h_m * h_p) * v_0 + 2.0 / (h_p * (h_m + h_p)) * v_p;

    (delta, gamma)
}
