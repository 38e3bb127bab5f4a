//! Finite-difference American option pricing engine.
//!
//! Values early-exercisable vanilla options (call/put) on a single
//! dividend-paying underlying under the Black-Scholes diffusion. The
//! engine is a five-stage pipeline — regime classifier, grid builder,
//! payoff/boundary provider, time stepper, Greeks extractor — with no
//! shared mutable state: every `PricingEngine` method is a pure function
//! of its inputs, safe to call concurrently from any number of threads.
//!
//! ```
//! use amerix_engine::{EngineConfig, OptionKind, PricingEngine};
//!
//! let engine = PricingEngine::new(EngineConfig::default());
//! let price = engine
//!     .price(100.0, 100.0, 0.5, 0.05, 0.02, 0.20, OptionKind::Call)
//!     .unwrap();
//! assert!(price > 0.0);
//! ```

mod black_scholes;
mod boundary;
mod classifier;
mod config;
mod engine;
mod error;
mod greeks;
mod grid;
mod interp;
mod stepper;
mod thomas;
mod types;

pub use black_scholes::{european_greeks, european_price, EuropeanGreeks};
pub use classifier::classify;
pub use config::EngineConfig;
pub use engine::PricingEngine;
pub use error::{EngineError, EngineResult};
pub use grid::Grid;
pub use stepper::ValueGrid;
pub use types::{OptionKind, PricingMethod, PricingResult, RateRegime};
