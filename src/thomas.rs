//! Tridiagonal operator and Thomas-algorithm solver (§4.4.4).
//!
//! The operator stores only the interior-node bands of the discretised
//! Black-Scholes operator; boundary rows are handled separately by the
//! time stepper because they are set directly from [`crate::boundary`]
//! rather than solved for.

use crate::error::{EngineError, EngineResult};

/// A tridiagonal matrix over the interior nodes of a [`crate::grid::Grid`].
///
/// `lower[0]` and `upper[n-1]` are unused (there is no sub-diagonal entry
/// on the first row or super-diagonal entry on the last), kept only so the
/// three bands stay the same length for indexing convenience.
#[derive(Debug, Clone)]
pub struct TridiagonalOperator {
    pub lower: Vec<f64>,
    pub diag: Vec<f64>,
    pub upper: Vec<f64>,
}

impl TridiagonalOperator {
    pub fn zeros(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    pub fn size(&self) -> usize {
        self.diag.len()
    }

    /// Apply the operator: `y = A . x`.
    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        let n = self.size();
        debug_assert_eq!(x.len(), n);
        let mut y = vec![0.0; n];
        if n == 0 {
            return y;
        }
        y[0] = self.diag[0] * x[0] + self.upper[0] * x.get(1).copied().unwrap_or(0.0);
        for i in 1..n.saturating_sub(1) {
            y[i] = self.lower[i] * x[i - 1] + self.diag[i] * x[i] + self.upper[i] * x[i + 1];
        }
        if n > 1 {
            y[n - 1] = self.lower[n - 1] * x[n - 2] + self.diag[n - 1] * x[n - 1];
        }
        y
    }

    /// Solve `A . x = rhs` via the Thomas algorithm, `O(n)`.
    ///
    /// Fails with `NumericalBreakdown` if a pivot underflows machine
    /// epsilon or the resulting solution contains a non-finite entry —
    /// per §4.4.6, recovery is not attempted.
    pub fn solve(&self, rhs: &[f64]) -> EngineResult<Vec<f64>> {
        let n = self.size();
        debug_assert_eq!(rhs.len(), n);
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        if self.diag[0].abs() < f64::EPSILON {
            return Err(EngineError::NumericalBreakdown(
                "Thomas algorithm: pivot underflow at row 0".to_string(),
            ));
        }
        c_prime[0] = self.upper[0] / self.diag[0];
        d_prime[0] = rhs[0] / self.diag[0];

        for i in 1..n {
            let m = self.diag[i] - self.lower[i] * c_prime[i - 1];
            if m.abs() < f64::EPSILON {
                return Err(EngineError::NumericalBreakdown(format!(
                    "Thomas algorithm: pivot underflow at row {i}"
                )));
            }
            if i < n - 1 {
                c_prime[i] = self.upper[i] / m;
            }
            d_prime[i] = (rhs[i] - self.lower[i] * d_prime[i - 1]) / m;
        }

        let mut x = vec![0.0; n];
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }

        if x.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::NumericalBreakdown(
                "Thomas algorithm: non-finite solution".to_string(),
            ));
        }

        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_identity() {
        let mut op = TridiagonalOperator::zeros(4);
        for d in &mut op.diag {
            *d = 1.0;
        }
        let rhs = vec![1.0, 2.0, 3.0, 4.0];
        let x = op.solve(&rhs).unwrap();
        assert_eq!(x, rhs);
    }

    #[test]
    fn solves_known_tridiagonal_system() {
        // A = [[2,-1,0],[-1,2,-1],[0,-1,2]], x = [1,2,3] => Ax = [0,0,4]
        let op = TridiagonalOperator {
            diag: vec![2.0, 2.0, 2.0],
            lower: vec![0.0, -1.0, -1.0],
            upper: vec![-1.0, -1.0, 0.0],
        };
        let x = op.solve(&[0.0, 0.0, 4.0]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-10);
        assert!((x[1] - 2.0).abs() < 1e-10);
        assert!((x[2] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn apply_matches_hand_computed_product() {
        let op = TridiagonalOperator {
            diag: vec![2.0, 2.0, 2.0],
            lower: vec![0.0, -1.0, -1.0],
            upper: vec![-1.0, -1.0, 0.0],
        };
        let y = op.apply(&[1.0, 2.0, 3.0]);
        assert!((y[0] - 0.0).abs() < 1e-10);
        assert!((y[1] - 0.0).abs() < 1e-10);
        assert!((y[2] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn zero_pivot_is_numerical_breakdown() {
        let op = TridiagonalOperator {
            diag: vec![0.0],
            lower: vec![0.0],
            upper: vec![0.0],
        };
        assert!(matches!(
            op.solve(&[1.0]),
            Err(EngineError::NumericalBreakdown(_))
        ));
    }
}
