//! Closed-form European Black-Scholes-Merton reference.
//!
//! Exposed alongside the American finite-difference engine so the test
//! suite can assert the American >= European invariant (§8.2) and spot
//! check convergence under vanishing early-exercise premium (§8.3), and so
//! `price_with_details` can report the early-exercise premium without a
//! second implementation of Black-Scholes living in the crate
//! (`SPEC_FULL.md` F.2).

use std::sync::OnceLock;

use statrs::distribution::{ContinuousCDF, Normal};

use crate::types::OptionKind;

fn standard_normal() -> &'static Normal {
    static CELL: OnceLock<Normal> = OnceLock::new();
    CELL.get_or_init(|| Normal::new(0.0, 1.0).expect("standard normal parameters are always valid"))
}

/// Standard normal CDF.
fn norm_cdf(x: f64) -> f64 {
    standard_normal().cdf(x)
}

/// Standard normal PDF.
fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

fn d1_d2(s: f64, k: f64, t: f64, r: f64, q: f64, sigma: f64) -> (f64, f64) {
    let sqrt_t = t.sqrt();
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
    (d1, d1 - sigma * sqrt_t)
}

/// European option price under Black-Scholes-Merton, with a continuous
/// dividend yield `q`. `t = 0` short-circuits to intrinsic value.
pub fn european_price(kind: OptionKind, s: f64, k: f64, t: f64, r: f64, q: f64, sigma: f64) -> f64 {
    if t <= 0.0 {
        return kind.intrinsic(s, k);
    }
    let (d1, d2) = d1_d2(s, k, t, r, q, sigma);
    let price = match kind {
        OptionKind::Call => s * (-q * t).exp() * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2),
        OptionKind::Put => k * (-r * t).exp() * norm_cdf(-d2) - s * (-q * t).exp() * norm_cdf(-d1),
    };
    price.max(0.0)
}

/// European Greeks, analytic (§6: "a closed-form European Black-Scholes
/// price/greeks routine is exposed alongside the American engine").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EuropeanGreeks {
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
}

pub fn european_greeks(kind: OptionKind, s: f64, k: f64, t: f64, r: f64, q: f64, sigma: f64) -> EuropeanGreeks {
    if t <= 0.0 {
        let delta = match kind {
            OptionKind::Call if s > k => 1.0,
            OptionKind::Call => 0.0,
            OptionKind::Put if s < k => -1.0,
            OptionKind::Put => 0.0,
        };
        return EuropeanGreeks {
            delta,
            gamma: 0.0,
            vega: 0.0,
            theta: 0.0,
            rho: 0.0,
        };
    }

    let (d1, d2) = d1_d2(s, k, t, r, q, sigma);
    let sqrt_t = t.sqrt();
    let disc_q = (-q * t).exp();
    let disc_r = (-r * t).exp();
    let pdf_d1 = norm_pdf(d1);

    let gamma = disc_q * pdf_d1 / (s * sigma * sqrt_t);
    let vega = s * disc_q * pdf_d1 * sqrt_t;

    let (delta, theta, rho) = match kind {
        OptionKind::Call => {
            let delta = disc_q * norm_cdf(d1);
            let theta = -s * disc_q * pdf_d1 * sigma / (2.0 * sqrt_t) - r * k * disc_r * norm_cdf(d2)
                + q * s * disc_q * norm_cdf(d1);
            let rho = k * t * disc_r * norm_cdf(d2);
            (delta, theta, rho)
        }
        OptionKind::Put => {
            let delta = -disc_q * norm_cdf(-d1);
            let theta = -s * disc_q * pdf_d1 * sigma / (2.0 * sqrt_t) + r * k * disc_r * norm_cdf(-d2)
                - q * s * disc_q * norm_cdf(-d1);
            let rho = -k * t * disc_r * norm_cdf(-d2);
            (delta, theta, rho)
        }
    };

    EuropeanGreeks {
        delta,
        gamma,
        vega,
        theta,
        rho,
    }
}
