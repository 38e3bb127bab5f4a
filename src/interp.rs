//! Interpolation of a value slice at an arbitrary spot `S0` not
//! necessarily on the grid (§4.4.5).

use tracing::warn;

/// Interpolate `values` (defined on `nodes`) at `x`.
///
/// Uses a local cubic (4-point Lagrange) interpolation across the nodes
/// bracketing `x` when at least four are available; falls back to linear
/// interpolation across the two bracketing nodes otherwise, which
/// degrades Gamma accuracy but keeps the call total (§4.4.5 permits this
/// fallback explicitly).
pub fn interpolate(nodes: &[f64], values: &[f64], x: f64) -> f64 {
    debug_assert_eq!(nodes.len(), values.len());
    let n = nodes.len();

    // Index of the first node >= x; the bracket is (idx-1, idx).
    let idx = nodes.partition_point(|&s| s < x).clamp(1, n - 1);

    if idx >= 2 && idx + 1 < n {
        let lo = idx - 2;
        cubic_lagrange(&nodes[lo..lo + 4], &values[lo..lo + 4], x)
    } else {
        warn!(n, idx, "fewer than four bracketing nodes; falling back to linear interpolation");
        linear(nodes[idx - 1], values[idx - 1], nodes[idx], values[idx], x)
    }
}

fn linear(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// 4-point Lagrange interpolation through `(xs[i], ys[i])`.
fn cubic_lagrange(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), 4);
    let mut total = 0.0;
    for i in 0..4 {
        let mut term = ys[i];
        for j in 0..4 {
            if i != j {
                term *= (x - xs[j]) / (xs[i] - xs[j]);
            }
        }
        total += term;
    }
    total
}
