//! # fast-pricer: Lattice and Monte Carlo Option Pricing
//!
//! A Rust library pricing derivative contracts on a single underlying
//! under two independent numerical models: a Cox-Ross-Rubinstein
//! binomial lattice (european and american exercise) and a parallel
//! Monte Carlo simulator under risk-neutral geometric Brownian motion.
//!
//! ## Key Features
//!
//! - **Safe custom payoffs**: user-supplied payoff expressions compile
//!   through a closed-grammar, whitelist-only expression engine, never
//!   a scripting runtime
//! - **Reproducible randomness**: a documented per-path seed derivation
//!   makes every simulated path bit-identical for a fixed seed
//!   regardless of thread count (aggregates reproduce up to
//!   floating-point summation order)
//! - **Parallel Monte Carlo**: paths distributed with Rayon, aggregated
//!   through a tree-shaped reduction
//! - **Strict failure semantics**: validation before any work, and a
//!   single path evaluation failure aborts the whole run rather than
//!   corrupting the aggregate
//!
//! ## Quick Start
//!
//! ```rust
//! use fast_pricer::lattice::{ExerciseStyle, OptionKind};
//! use fast_pricer::market::MarketModel;
//! use fast_pricer::pricing::{price_lattice, price_monte_carlo};
//!
//! let market = MarketModel::new(100.0, 105.0, 0.05, 0.2, 1.0).unwrap();
//!
//! // Binomial lattice, american put
//! let lattice = price_lattice(&market, 500, OptionKind::Put, ExerciseStyle::American)
//!     .expect("valid model");
//!
//! // Monte Carlo with a custom payoff expression
//! let mc = price_monte_carlo(&market, 50, 10_000, "max(s - strike, 0)", Some(42))
//!     .expect("valid model and expression");
//!
//! println!("american put: {:.4}", lattice.price);
//! println!("european call: {:.4} ± {:.4}", mc.price, mc.standard_error.unwrap());
//! ```
//!
//! ## Payoff Expressions
//!
//! Expressions may reference `path`, `s`/`st` (terminal price), `spot`,
//! `strike`, and `step`, call `max`, `min`, `abs`, `exp`, `ln`/`log`,
//! `sqrt`, `pow`, and combine them with arithmetic, comparisons, and
//! `if c then a else b`. Everything else is rejected at compile time;
//! see [`payoff`] for the full grammar.

// Module declarations
pub mod analytics;
pub mod error;
pub mod lattice;
pub mod market;
pub mod math_utils;
pub mod mc;
pub mod payoff;
pub mod pricing;
pub mod rng;

// Re-export commonly used types for convenience
pub use error::{PricerResult, PricingError};
pub use market::MarketModel;
pub use pricing::{price_lattice, price_monte_carlo, PriceReport};
